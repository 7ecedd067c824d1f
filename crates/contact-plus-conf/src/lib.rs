//! # contact-plus configuration
//!
//! Typed settings for the contact form engine, loaded from layered sources:
//! built-in defaults, a TOML file and `CONTACT_PLUS_*` environment variables
//! (`__` separates nested keys, e.g. `CONTACT_PLUS_RECAPTCHA__PRIVATE_KEY`).
//!
//! ```no_run
//! use contact_plus_conf::SettingsBuilder;
//!
//! let settings = SettingsBuilder::standard("contact_plus.toml").build()?;
//! println!("sending from {}", settings.from_email);
//! # Ok::<(), contact_plus_conf::SettingsError>(())
//! ```

pub mod builder;
pub mod secret;
pub mod settings;
pub mod sources;

pub use builder::SettingsBuilder;
pub use secret::{ExposeSecret, SecretString};
pub use settings::{
	ContactPlusSettings, DEFAULT_VERIFY_URL, EmailSettings, MailBackendKind, RecaptchaSettings,
	SettingsError, ValidatorConfig,
};
