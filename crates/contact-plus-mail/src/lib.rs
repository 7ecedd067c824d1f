//! # contact-plus mail
//!
//! Outgoing email for contact form submissions.
//!
//! ## Features
//!
//! - **EmailMessage**: validated message builder (addresses, header injection)
//! - **Backends**: memory (tests), console (development) and SMTP (`smtp` feature)
//! - **Templates**: Tera-rendered plain-text bodies with a built-in default
//!
//! ## Examples
//!
//! ```rust
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use contact_plus_mail::{EmailBackend, EmailMessage, MemoryBackend};
//!
//! let backend = MemoryBackend::new();
//!
//! let email = EmailMessage::builder()
//!     .from("webmaster@example.com")
//!     .to(vec!["sales@example.com".to_string()])
//!     .subject("New enquiry")
//!     .body("name: Ana")
//!     .build()?;
//!
//! email.send(&backend).await?;
//! assert_eq!(backend.count(), 1);
//! # Ok(())
//! # }
//! ```

pub mod backends;
pub mod message;
pub mod templates;
pub mod validation;

use thiserror::Error;

#[cfg(feature = "smtp")]
pub use backends::{SmtpBackend, SmtpConfig, SmtpSecurity};
pub use backends::{ConsoleBackend, EmailBackend, MemoryBackend, backend_from_settings};
pub use message::{EmailMessage, EmailMessageBuilder};
pub use templates::{DEFAULT_EMAIL_TEMPLATE, EmailTemplate};
pub use validation::{MAX_EMAIL_LENGTH, is_valid_email};

#[derive(Debug, Error)]
pub enum EmailError {
	#[error("Invalid email address: {0}")]
	InvalidAddress(String),

	#[error("Missing required field: {0}")]
	MissingField(String),

	#[error("Backend error: {0}")]
	BackendError(String),

	#[error("SMTP error: {0}")]
	SmtpError(String),

	#[error("IO error: {0}")]
	IoError(#[from] std::io::Error),

	#[error("Template error: {0}")]
	TemplateError(String),

	#[error("Header injection attempt detected: {0}")]
	HeaderInjection(String),
}

pub type EmailResult<T> = std::result::Result<T, EmailError>;
