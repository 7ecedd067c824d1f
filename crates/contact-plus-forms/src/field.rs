//! Field trait, widgets and field-level errors

use serde::Serialize;

/// Widget used to render a field.
///
/// Rendering itself happens outside this crate; the widget tells the renderer
/// which kind of input to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Widget {
	TextInput,
	EmailInput,
	NumberInput,
	Textarea,
	HiddenInput,
	CheckboxInput,
	FileInput,
	DateInput,
	DateTimeInput,
	/// Question plus a signed token in a hidden input
	MathCaptchaInput,
	/// Third-party challenge widget (e.g. reCAPTCHA v2 checkbox)
	ReCaptcha,
}

impl Widget {
	/// Whether the widget renders without a visible control
	pub fn is_hidden(&self) -> bool {
		matches!(self, Widget::HiddenInput)
	}
}

/// HTML attributes attached to a widget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WidgetAttrs {
	pub placeholder: Option<String>,
	pub class: Option<String>,
}

impl WidgetAttrs {
	/// Build attributes from possibly-empty strings; empty strings are dropped.
	///
	/// # Examples
	///
	/// ```
	/// use contact_plus_forms::field::WidgetAttrs;
	///
	/// let attrs = WidgetAttrs::new("Your name", "");
	/// assert_eq!(attrs.placeholder.as_deref(), Some("Your name"));
	/// assert_eq!(attrs.class, None);
	/// ```
	pub fn new(placeholder: &str, class: &str) -> Self {
		let non_empty = |s: &str| {
			let s = s.trim();
			(!s.is_empty()).then(|| s.to_string())
		};
		Self {
			placeholder: non_empty(placeholder),
			class: non_empty(class),
		}
	}

	pub fn is_empty(&self) -> bool {
		self.placeholder.is_none() && self.class.is_none()
	}
}

/// Default message for a missing required value
pub const REQUIRED_MESSAGE: &str = "This field is required.";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldError {
	#[error("{0}")]
	Required(String),
	#[error("{0}")]
	Invalid(String),
	#[error("{0}")]
	Validation(String),
}

impl FieldError {
	/// Required-value error with an optional custom message
	pub fn required(message: Option<&str>) -> Self {
		FieldError::Required(message.unwrap_or(REQUIRED_MESSAGE).to_string())
	}

	pub fn invalid(message: impl Into<String>) -> Self {
		FieldError::Invalid(message.into())
	}

	pub fn validation(message: impl Into<String>) -> Self {
		FieldError::Validation(message.into())
	}
}

pub type FieldResult<T> = Result<T, FieldError>;

/// A single form field: metadata plus the cleaning rule that turns submitted
/// data into a validated value.
pub trait FormField: Send + Sync {
	fn name(&self) -> &str;

	fn label(&self) -> Option<&str>;

	fn required(&self) -> bool;

	fn help_text(&self) -> Option<&str> {
		None
	}

	fn widget(&self) -> &Widget;

	fn widget_attrs(&self) -> Option<&WidgetAttrs> {
		None
	}

	fn initial(&self) -> Option<&serde_json::Value>;

	/// Validate and coerce a submitted value.
	///
	/// `None` means the key was absent from the submitted data.
	fn clean(&self, value: Option<&serde_json::Value>) -> FieldResult<serde_json::Value>;
}

/// Interpret an absent, null or blank-string value as "empty".
///
/// Returns `Ok(None)` for empty input, `Ok(Some(trimmed))` for a non-empty
/// string and an `Invalid` error for non-string JSON.
pub(crate) fn optional_str(value: Option<&serde_json::Value>) -> FieldResult<Option<&str>> {
	match value {
		None => Ok(None),
		Some(v) if v.is_null() => Ok(None),
		Some(v) => {
			let s = v
				.as_str()
				.ok_or_else(|| FieldError::invalid("Value must be a string"))?
				.trim();
			Ok((!s.is_empty()).then_some(s))
		}
	}
}
