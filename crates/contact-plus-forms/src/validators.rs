//! Pluggable text validators
//!
//! These run after a text field has been cleaned. Forms built from stored
//! definitions attach them to `CharFieldWithValidator` fields, so the set of
//! validators is configuration rather than code.

use crate::field::{FieldError, FieldResult};
use regex::Regex;
use std::fmt;
use std::sync::{Arc, LazyLock};

// Anything that looks like a link: a scheme, a `www.` prefix or a bare
// domain with a common TLD.
static URL_LIKE_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(r"(?i)(\b[a-z][a-z0-9+.-]*://|\bwww\.|\b[a-z0-9-]+\.(com|net|org|info|biz|ru|cn|xyz|top)\b)")
		.expect("URL_LIKE_REGEX: invalid regex pattern")
});

static HTML_TAG_REGEX: LazyLock<Regex> =
	LazyLock::new(|| Regex::new(r"</?[a-zA-Z][^>]*>").expect("HTML_TAG_REGEX: invalid regex pattern"));

/// A validator applied to the cleaned string value of a field.
pub trait Validator: Send + Sync + fmt::Debug {
	fn validate(&self, value: &str) -> FieldResult<()>;
}

/// Shared handle, so one configured validator set can back many fields
pub type SharedValidator = Arc<dyn Validator>;

/// Run every validator, returning the first failure.
pub fn run_validators(validators: &[SharedValidator], value: &str) -> FieldResult<()> {
	validators.iter().try_for_each(|v| v.validate(value))
}

/// Accepts or rejects values matching a regular expression.
///
/// # Examples
///
/// ```
/// use contact_plus_forms::validators::{RegexValidator, Validator};
///
/// let digits = RegexValidator::new(r"^\d+$").unwrap();
/// assert!(digits.validate("12345").is_ok());
/// assert!(digits.validate("12a45").is_err());
///
/// let no_shouting = RegexValidator::new(r"^[^a-z]+$").unwrap().inverse();
/// assert!(no_shouting.validate("HELLO").is_err());
/// ```
#[derive(Debug, Clone)]
pub struct RegexValidator {
	regex: Regex,
	inverse_match: bool,
	message: Option<String>,
}

impl RegexValidator {
	pub fn new(pattern: &str) -> Result<Self, regex::Error> {
		Ok(Self {
			regex: Regex::new(pattern)?,
			inverse_match: false,
			message: None,
		})
	}

	/// Fail when the pattern matches instead of when it does not
	pub fn inverse(mut self) -> Self {
		self.inverse_match = true;
		self
	}

	pub fn with_message(mut self, message: impl Into<String>) -> Self {
		self.message = Some(message.into());
		self
	}
}

impl Validator for RegexValidator {
	fn validate(&self, value: &str) -> FieldResult<()> {
		if self.regex.is_match(value) != self.inverse_match {
			Ok(())
		} else {
			let msg = self.message.as_deref().unwrap_or("Enter a valid value.");
			Err(FieldError::validation(msg))
		}
	}
}

/// Limits the number of characters (not bytes).
#[derive(Debug, Clone)]
pub struct MaxLengthValidator {
	max: usize,
}

impl MaxLengthValidator {
	pub fn new(max: usize) -> Self {
		Self { max }
	}
}

impl Validator for MaxLengthValidator {
	fn validate(&self, value: &str) -> FieldResult<()> {
		let count = value.chars().count();
		if count > self.max {
			return Err(FieldError::validation(format!(
				"Ensure this value has at most {} characters (it has {}).",
				self.max, count
			)));
		}
		Ok(())
	}
}

/// Requires a minimum number of characters.
#[derive(Debug, Clone)]
pub struct MinLengthValidator {
	min: usize,
}

impl MinLengthValidator {
	pub fn new(min: usize) -> Self {
		Self { min }
	}
}

impl Validator for MinLengthValidator {
	fn validate(&self, value: &str) -> FieldResult<()> {
		let count = value.chars().count();
		if count < self.min {
			return Err(FieldError::validation(format!(
				"Ensure this value has at least {} characters (it has {}).",
				self.min, count
			)));
		}
		Ok(())
	}
}

/// Rejects values containing any of the listed words (case-insensitive).
///
/// # Examples
///
/// ```
/// use contact_plus_forms::validators::{ProhibitedWordsValidator, Validator};
///
/// let v = ProhibitedWordsValidator::new(vec!["casino".to_string()]);
/// assert!(v.validate("Best CASINO offers").is_err());
/// assert!(v.validate("Hello there").is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct ProhibitedWordsValidator {
	words: Vec<String>,
}

impl ProhibitedWordsValidator {
	pub fn new(words: Vec<String>) -> Self {
		Self {
			words: words
				.into_iter()
				.map(|w| w.trim().to_lowercase())
				.filter(|w| !w.is_empty())
				.collect(),
		}
	}
}

impl Validator for ProhibitedWordsValidator {
	fn validate(&self, value: &str) -> FieldResult<()> {
		let lowered = value.to_lowercase();
		match self.words.iter().find(|w| lowered.contains(w.as_str())) {
			Some(word) => Err(FieldError::validation(format!(
				"The word \"{}\" is not allowed.",
				word
			))),
			None => Ok(()),
		}
	}
}

/// Rejects values that contain links.
#[derive(Debug, Clone, Default)]
pub struct NoUrlsValidator;

impl Validator for NoUrlsValidator {
	fn validate(&self, value: &str) -> FieldResult<()> {
		if URL_LIKE_REGEX.is_match(value) {
			return Err(FieldError::validation("Links are not allowed."));
		}
		Ok(())
	}
}

/// Rejects values that contain HTML tags.
#[derive(Debug, Clone, Default)]
pub struct NoHtmlValidator;

impl Validator for NoHtmlValidator {
	fn validate(&self, value: &str) -> FieldResult<()> {
		if HTML_TAG_REGEX.is_match(value) {
			return Err(FieldError::validation("HTML markup is not allowed."));
		}
		Ok(())
	}
}
