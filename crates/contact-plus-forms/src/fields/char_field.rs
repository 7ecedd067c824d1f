//! Character field for text input

use crate::field::{FieldError, FieldResult, FormField, Widget, WidgetAttrs};
use crate::validators::{SharedValidator, run_validators};

/// Character field with length validation and optional extra validators.
///
/// The same type backs single-line inputs, textareas and hidden inputs; only
/// the widget differs.
#[derive(Debug, Clone)]
pub struct CharField {
	pub name: String,
	pub label: Option<String>,
	pub required: bool,
	pub help_text: Option<String>,
	pub widget: Widget,
	pub attrs: WidgetAttrs,
	pub initial: Option<serde_json::Value>,
	pub max_length: Option<usize>,
	pub min_length: Option<usize>,
	pub strip: bool,
	pub validators: Vec<SharedValidator>,
}

impl CharField {
	/// Create a new CharField with the given name
	///
	/// # Examples
	///
	/// ```
	/// use contact_plus_forms::fields::CharField;
	///
	/// let field = CharField::new("subject".to_string());
	/// assert_eq!(field.name, "subject");
	/// assert!(!field.required);
	/// assert_eq!(field.max_length, None);
	/// ```
	pub fn new(name: String) -> Self {
		Self {
			name,
			label: None,
			required: false,
			help_text: None,
			widget: Widget::TextInput,
			attrs: WidgetAttrs::default(),
			initial: None,
			max_length: None,
			min_length: None,
			strip: true,
			validators: Vec::new(),
		}
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	/// Set required-ness from a stored flag
	pub fn with_required(mut self, required: bool) -> Self {
		self.required = required;
		self
	}

	pub fn with_max_length(mut self, max_length: usize) -> Self {
		self.max_length = Some(max_length);
		self
	}

	pub fn with_min_length(mut self, min_length: usize) -> Self {
		self.min_length = Some(min_length);
		self
	}

	/// Set the label for the field
	///
	/// # Examples
	///
	/// ```
	/// use contact_plus_forms::fields::CharField;
	///
	/// let field = CharField::new("name".to_string()).with_label("Your name");
	/// assert_eq!(field.label, Some("Your name".to_string()));
	/// ```
	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_help_text(mut self, help_text: impl Into<String>) -> Self {
		self.help_text = Some(help_text.into());
		self
	}

	/// Set the initial value for the field
	///
	/// # Examples
	///
	/// ```
	/// use contact_plus_forms::fields::CharField;
	///
	/// let field = CharField::new("source".to_string()).with_initial("newsletter");
	/// assert_eq!(field.initial, Some(serde_json::json!("newsletter")));
	/// ```
	pub fn with_initial(mut self, initial: impl Into<String>) -> Self {
		self.initial = Some(serde_json::json!(initial.into()));
		self
	}

	pub fn with_initial_value(mut self, initial: Option<serde_json::Value>) -> Self {
		self.initial = initial;
		self
	}

	pub fn no_strip(mut self) -> Self {
		self.strip = false;
		self
	}

	/// Set the widget for the field
	///
	/// # Examples
	///
	/// ```
	/// use contact_plus_forms::fields::CharField;
	/// use contact_plus_forms::field::Widget;
	///
	/// let field = CharField::new("message".to_string()).with_widget(Widget::Textarea);
	/// assert_eq!(field.widget, Widget::Textarea);
	/// ```
	pub fn with_widget(mut self, widget: Widget) -> Self {
		self.widget = widget;
		self
	}

	pub fn with_attrs(mut self, attrs: WidgetAttrs) -> Self {
		self.attrs = attrs;
		self
	}

	pub fn with_validators(mut self, validators: Vec<SharedValidator>) -> Self {
		self.validators.extend(validators);
		self
	}
}

impl FormField for CharField {
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
		let str_value = match value {
			Some(v) if !v.is_null() => Some(
				v.as_str()
					.ok_or_else(|| FieldError::validation("Value must be a string"))?,
			),
			_ => None,
		};

		let processed = match str_value {
			Some(v) => {
				let v = if self.strip { v.trim() } else { v };
				if v.is_empty() { None } else { Some(v) }
			}
			None => None,
		};

		let Some(processed) = processed else {
			if self.required {
				return Err(FieldError::required(None));
			}
			return Ok(serde_json::Value::String(String::new()));
		};

		// Character count, not bytes
		let char_count = processed.chars().count();
		if let Some(max_length) = self.max_length
			&& char_count > max_length
		{
			return Err(FieldError::validation(format!(
				"Ensure this value has at most {} characters (it has {})",
				max_length, char_count
			)));
		}

		if let Some(min_length) = self.min_length
			&& char_count < min_length
		{
			return Err(FieldError::validation(format!(
				"Ensure this value has at least {} characters (it has {})",
				min_length, char_count
			)));
		}

		run_validators(&self.validators, processed)?;

		Ok(serde_json::Value::String(processed.to_string()))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::validators::NoUrlsValidator;
	use rstest::rstest;
	use serde_json::json;
	use std::sync::Arc;

	#[rstest]
	fn test_char_field_required() {
		// Arrange
		let field = CharField::new("test".to_string()).required();

		// Act & Assert
		assert!(field.clean(None).is_err());
		assert!(field.clean(Some(&json!(""))).is_err());
		assert!(field.clean(Some(&json!("  "))).is_err());
	}

	#[rstest]
	fn test_char_field_optional_empty_is_empty_string() {
		// Arrange
		let field = CharField::new("test".to_string());

		// Act & Assert
		assert_eq!(field.clean(None).unwrap(), json!(""));
		assert_eq!(field.clean(Some(&json!(null))).unwrap(), json!(""));
	}

	#[rstest]
	fn test_char_field_strips_whitespace() {
		let field = CharField::new("test".to_string());
		assert_eq!(field.clean(Some(&json!("  Ana  "))).unwrap(), json!("Ana"));
	}

	#[rstest]
	fn test_char_field_length_uses_char_count_not_bytes() {
		// Arrange
		let field = CharField::new("test".to_string()).with_max_length(5);

		// Act & Assert
		assert!(field.clean(Some(&json!("ÄÖÜäö"))).is_ok());
		assert!(field.clean(Some(&json!("ÄÖÜäöü"))).is_err());
	}

	#[rstest]
	fn test_char_field_runs_extra_validators() {
		// Arrange
		let field = CharField::new("message".to_string())
			.with_widget(Widget::Textarea)
			.with_validators(vec![Arc::new(NoUrlsValidator)]);

		// Act
		let rejected = field.clean(Some(&json!("buy at http://spam.example")));
		let accepted = field.clean(Some(&json!("Please call me back")));

		// Assert
		assert_eq!(
			rejected.unwrap_err(),
			FieldError::validation("Links are not allowed.")
		);
		assert_eq!(accepted.unwrap(), json!("Please call me back"));
	}

	#[rstest]
	fn test_char_field_rejects_non_string() {
		let field = CharField::new("test".to_string());
		assert!(field.clean(Some(&json!(["a"]))).is_err());
	}

	#[rstest]
	fn test_widget_attrs_only_reported_when_set() {
		let plain = CharField::new("a".to_string());
		let styled = CharField::new("b".to_string()).with_attrs(WidgetAttrs::new("Name", "wide"));

		assert!(plain.widget_attrs().is_none());
		assert_eq!(
			styled.widget_attrs().and_then(|a| a.placeholder.as_deref()),
			Some("Name")
		);
	}
}
