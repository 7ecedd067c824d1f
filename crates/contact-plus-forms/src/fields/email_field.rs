//! Email address field

use crate::field::{FieldError, FieldResult, FormField, Widget, WidgetAttrs, optional_str};
use regex::Regex;
use std::sync::LazyLock;

// Pragmatic address check: one `@`, a dot-separated domain with an
// alphabetic TLD, no whitespace.
static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*\.[A-Za-z]{2,63}$",
	)
	.expect("EMAIL_REGEX: invalid regex pattern")
});

/// Maximum address length (RFC 5321 path limit)
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Check whether a string is a plausible email address.
///
/// # Examples
///
/// ```
/// use contact_plus_forms::fields::is_valid_email;
///
/// assert!(is_valid_email("ana@example.com"));
/// assert!(!is_valid_email("ana@localhost"));
/// assert!(!is_valid_email("not an address"));
/// ```
pub fn is_valid_email(value: &str) -> bool {
	value.len() <= MAX_EMAIL_LENGTH && !value.contains("..") && EMAIL_REGEX.is_match(value)
}

/// Email input field
#[derive(Debug, Clone)]
pub struct EmailField {
	pub name: String,
	pub label: Option<String>,
	pub required: bool,
	pub help_text: Option<String>,
	pub widget: Widget,
	pub attrs: WidgetAttrs,
	pub initial: Option<serde_json::Value>,
}

impl EmailField {
	pub fn new(name: String) -> Self {
		Self {
			name,
			label: None,
			required: false,
			help_text: None,
			widget: Widget::EmailInput,
			attrs: WidgetAttrs::default(),
			initial: None,
		}
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_required(mut self, required: bool) -> Self {
		self.required = required;
		self
	}

	pub fn with_widget(mut self, widget: Widget) -> Self {
		self.widget = widget;
		self
	}

	pub fn with_attrs(mut self, attrs: WidgetAttrs) -> Self {
		self.attrs = attrs;
		self
	}

	pub fn with_initial_value(mut self, initial: Option<serde_json::Value>) -> Self {
		self.initial = initial;
		self
	}
}

impl FormField for EmailField {
	fn name(&self) -> &str {
		&self.name
	}

	fn label(&self) -> Option<&str> {
		self.label.as_deref()
	}

	fn required(&self) -> bool {
		self.required
	}

	fn help_text(&self) -> Option<&str> {
		self.help_text.as_deref()
	}

	fn widget(&self) -> &Widget {
		&self.widget
	}

	fn widget_attrs(&self) -> Option<&WidgetAttrs> {
		(!self.attrs.is_empty()).then_some(&self.attrs)
	}

	fn initial(&self) -> Option<&serde_json::Value> {
		self.initial.as_ref()
	}

	fn clean(&self, value: Option<&serde_json::Value>) -> FieldResult<serde_json::Value> {
		match optional_str(value)? {
			None if self.required => Err(FieldError::required(None)),
			None => Ok(serde_json::Value::String(String::new())),
			Some(s) if is_valid_email(s) => Ok(serde_json::Value::String(s.to_string())),
			Some(_) => Err(FieldError::validation("Enter a valid email address.")),
		}
	}
}
