//! Typed settings

use crate::secret::{SecretString, is_blank, optional_secret};
use crate::sources::SourceError;
use contact_plus_forms::fields::is_valid_email;
use contact_plus_forms::validators::{
	MaxLengthValidator, MinLengthValidator, NoHtmlValidator, NoUrlsValidator,
	ProhibitedWordsValidator, RegexValidator, SharedValidator,
};
use serde::{Deserialize, Deserializer};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Default reCAPTCHA verification endpoint
pub const DEFAULT_VERIFY_URL: &str = "https://www.google.com/recaptcha/api/siteverify";

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
	#[error("Source error: {0}")]
	Source(#[from] SourceError),

	#[error("Invalid settings structure: {0}")]
	Deserialize(#[from] serde_json::Error),

	#[error("Invalid value for {field}: {reason}")]
	InvalidValue { field: String, reason: String },
}

impl SettingsError {
	fn invalid(field: &str, reason: impl Into<String>) -> Self {
		SettingsError::InvalidValue {
			field: field.to_string(),
			reason: reason.into(),
		}
	}
}

/// Accept strings, numbers and booleans as a string.
pub(crate) fn scalar_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
	match serde_json::Value::deserialize(deserializer)? {
		serde_json::Value::String(s) => Ok(s),
		serde_json::Value::Number(n) => Ok(n.to_string()),
		serde_json::Value::Bool(b) => Ok(b.to_string()),
		other => Err(serde::de::Error::custom(format!(
			"expected a string, found {}",
			other
		))),
	}
}

fn optional_scalar_string<'de, D: Deserializer<'de>>(
	deserializer: D,
) -> Result<Option<String>, D::Error> {
	match Option::<serde_json::Value>::deserialize(deserializer)? {
		None | Some(serde_json::Value::Null) => Ok(None),
		Some(value) => scalar_string(value).map(Some).map_err(serde::de::Error::custom),
	}
}

/// Settings for the contact form engine.
///
/// Every field has a default, so an empty configuration is valid apart from
/// what [`validate`](Self::validate) checks.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ContactPlusSettings {
	/// CSS class added to rows of required fields
	pub required_css_class: String,
	pub from_email: String,
	/// Prepended to every notification subject
	#[serde(deserialize_with = "scalar_string")]
	pub subject_prefix: String,
	/// Label slug of the field whose value becomes the Reply-To address
	pub reply_email_label: Option<String>,
	pub send_copy_to_reply_email: bool,
	/// Tera template for the email body; the built-in template when unset
	pub email_template: Option<PathBuf>,
	pub media_url: String,
	pub media_root: PathBuf,
	/// Signs math captcha challenges
	#[serde(deserialize_with = "optional_secret")]
	pub secret_key: Option<SecretString>,
	pub recaptcha: RecaptchaSettings,
	pub email: EmailSettings,
	/// Extra validators for `CharFieldWithValidator` fields
	pub validators: Vec<ValidatorConfig>,
}

impl Default for ContactPlusSettings {
	fn default() -> Self {
		Self {
			required_css_class: "required".to_string(),
			from_email: "webmaster@localhost".to_string(),
			subject_prefix: String::new(),
			reply_email_label: None,
			send_copy_to_reply_email: false,
			email_template: None,
			media_url: "/media/".to_string(),
			media_root: PathBuf::from("media"),
			secret_key: None,
			recaptcha: RecaptchaSettings::default(),
			email: EmailSettings::default(),
			validators: Vec::new(),
		}
	}
}

impl ContactPlusSettings {
	/// Check invariants that serde cannot express.
	///
	/// # Examples
	///
	/// ```
	/// use contact_plus_conf::ContactPlusSettings;
	///
	/// let mut settings = ContactPlusSettings::default();
	/// assert!(settings.validate().is_ok());
	///
	/// settings.recaptcha.max_retries = 3;
	/// assert!(settings.validate().is_err());
	/// ```
	pub fn validate(&self) -> Result<(), SettingsError> {
		if !is_valid_sender(&self.from_email) {
			return Err(SettingsError::invalid(
				"from_email",
				format!("{:?} is not a valid address", self.from_email),
			));
		}

		if !self.media_url.ends_with('/') {
			return Err(SettingsError::invalid("media_url", "must end with a slash"));
		}

		if self.recaptcha.max_retries > 1 {
			return Err(SettingsError::invalid(
				"recaptcha.max_retries",
				"at most one retry is allowed",
			));
		}

		if self.recaptcha.timeout_secs == 0 {
			return Err(SettingsError::invalid(
				"recaptcha.timeout_secs",
				"must be greater than zero",
			));
		}

		if self.email.backend == MailBackendKind::Smtp && self.email.host.trim().is_empty() {
			return Err(SettingsError::invalid(
				"email.host",
				"required by the smtp backend",
			));
		}

		self.build_validators()?;
		Ok(())
	}

	/// The math captcha signing key, if one is configured and not blank
	pub fn signing_key(&self) -> Option<&SecretString> {
		self.secret_key.as_ref().filter(|k| !is_blank(k))
	}

	/// Instantiate the configured validators in order.
	pub fn build_validators(&self) -> Result<Vec<SharedValidator>, SettingsError> {
		self.validators.iter().map(ValidatorConfig::build).collect()
	}
}

fn is_valid_sender(email: &str) -> bool {
	let is_local = email
		.rsplit_once('@')
		.is_some_and(|(local, domain)| !local.is_empty() && domain == "localhost");
	is_local || is_valid_email(email)
}

/// Bot verification service settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecaptchaSettings {
	#[serde(deserialize_with = "optional_secret")]
	pub private_key: Option<SecretString>,
	pub verify_url: String,
	pub timeout_secs: u64,
	/// Retries on transport errors; at most one
	pub max_retries: u32,
}

impl Default for RecaptchaSettings {
	fn default() -> Self {
		Self {
			private_key: None,
			verify_url: DEFAULT_VERIFY_URL.to_string(),
			timeout_secs: 5,
			max_retries: 1,
		}
	}
}

impl RecaptchaSettings {
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}

	/// The private key, if one is configured and not blank
	pub fn secret(&self) -> Option<&SecretString> {
		self.private_key.as_ref().filter(|k| !is_blank(k))
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MailBackendKind {
	#[default]
	Console,
	Memory,
	Smtp,
}

/// Outgoing mail settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
	pub backend: MailBackendKind,
	pub host: String,
	pub port: u16,
	#[serde(deserialize_with = "optional_scalar_string")]
	pub username: Option<String>,
	#[serde(deserialize_with = "optional_secret")]
	pub password: Option<SecretString>,
	/// STARTTLS on connect
	pub use_tls: bool,
	pub timeout_secs: u64,
}

impl Default for EmailSettings {
	fn default() -> Self {
		Self {
			backend: MailBackendKind::Console,
			host: "localhost".to_string(),
			port: 25,
			username: None,
			password: None,
			use_tls: false,
			timeout_secs: 10,
		}
	}
}

impl EmailSettings {
	pub fn timeout(&self) -> Duration {
		Duration::from_secs(self.timeout_secs)
	}
}

/// A text validator as written in configuration.
///
/// ```toml
/// [[validators]]
/// kind = "regex"
/// pattern = "^[^<>]*$"
/// message = "No angle brackets"
///
/// [[validators]]
/// kind = "no_urls"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidatorConfig {
	Regex {
		pattern: String,
		#[serde(default)]
		inverse: bool,
		#[serde(default)]
		message: Option<String>,
	},
	MaxLength {
		max: usize,
	},
	MinLength {
		min: usize,
	},
	ProhibitedWords {
		words: Vec<String>,
	},
	NoUrls,
	NoHtml,
}

impl ValidatorConfig {
	pub fn build(&self) -> Result<SharedValidator, SettingsError> {
		Ok(match self {
			ValidatorConfig::Regex {
				pattern,
				inverse,
				message,
			} => {
				let mut validator = RegexValidator::new(pattern)
					.map_err(|e| SettingsError::invalid("validators.pattern", e.to_string()))?;
				if *inverse {
					validator = validator.inverse();
				}
				if let Some(message) = message {
					validator = validator.with_message(message.clone());
				}
				Arc::new(validator)
			}
			ValidatorConfig::MaxLength { max } => Arc::new(MaxLengthValidator::new(*max)),
			ValidatorConfig::MinLength { min } => Arc::new(MinLengthValidator::new(*min)),
			ValidatorConfig::ProhibitedWords { words } => {
				Arc::new(ProhibitedWordsValidator::new(words.clone()))
			}
			ValidatorConfig::NoUrls => Arc::new(NoUrlsValidator),
			ValidatorConfig::NoHtml => Arc::new(NoHtmlValidator),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::secret::ExposeSecret;
	use contact_plus_forms::validators::Validator;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_defaults() {
		let settings = ContactPlusSettings::default();

		assert_eq!(settings.required_css_class, "required");
		assert_eq!(settings.from_email, "webmaster@localhost");
		assert_eq!(settings.media_url, "/media/");
		assert_eq!(settings.recaptcha.verify_url, DEFAULT_VERIFY_URL);
		assert_eq!(settings.recaptcha.timeout(), Duration::from_secs(5));
		assert_eq!(settings.email.backend, MailBackendKind::Console);
		assert!(settings.recaptcha.secret().is_none());
		assert!(settings.signing_key().is_none());
		assert!(settings.validate().is_ok());
	}

	#[rstest]
	fn test_deserialize_partial_document() {
		// Arrange
		let value = json!({
			"from_email": "forms@example.com",
			"subject_prefix": 2024,
			"recaptcha": {"private_key": "6Lc-secret"},
			"email": {"backend": "smtp", "host": "smtp.example.com", "port": 587},
			"validators": [{"kind": "no_urls"}, {"kind": "max_length", "max": 500}],
		});

		// Act
		let settings: ContactPlusSettings = serde_json::from_value(value).unwrap();

		// Assert
		assert_eq!(settings.subject_prefix, "2024");
		assert_eq!(settings.recaptcha.timeout_secs, 5);
		assert_eq!(
			settings.recaptcha.secret().map(|s| s.expose_secret()),
			Some("6Lc-secret")
		);
		assert_eq!(settings.email.backend, MailBackendKind::Smtp);
		assert_eq!(settings.email.port, 587);
		assert_eq!(settings.build_validators().unwrap().len(), 2);
	}

	#[rstest]
	fn test_blank_private_key_counts_as_missing() {
		let mut settings = RecaptchaSettings::default();
		settings.private_key = Some(SecretString::from(String::new()));
		assert!(settings.secret().is_none());
	}

	#[rstest]
	#[case::bad_sender(json!({"from_email": "not an address"}), "from_email")]
	#[case::media_url(json!({"media_url": "/media"}), "media_url")]
	#[case::retries(json!({"recaptcha": {"max_retries": 2}}), "recaptcha.max_retries")]
	#[case::timeout(json!({"recaptcha": {"timeout_secs": 0}}), "recaptcha.timeout_secs")]
	#[case::smtp_host(json!({"email": {"backend": "smtp", "host": " "}}), "email.host")]
	#[case::regex(json!({"validators": [{"kind": "regex", "pattern": "("}]}), "validators.pattern")]
	fn test_validate_rejects(#[case] value: serde_json::Value, #[case] expected_field: &str) {
		// Arrange
		let settings: ContactPlusSettings = serde_json::from_value(value).unwrap();

		// Act
		let err = settings.validate().unwrap_err();

		// Assert
		match err {
			SettingsError::InvalidValue { field, .. } => assert_eq!(field, expected_field),
			other => panic!("unexpected error: {other}"),
		}
	}

	#[rstest]
	fn test_regex_validator_config() {
		// Arrange
		let config = ValidatorConfig::Regex {
			pattern: "viagra".to_string(),
			inverse: true,
			message: Some("No spam".to_string()),
		};

		// Act
		let validator = config.build().unwrap();

		// Assert
		assert_eq!(validator.validate("buy viagra").unwrap_err().to_string(), "No spam");
		assert!(validator.validate("hello").is_ok());
	}
}
