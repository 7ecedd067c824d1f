//! Decimal field
//!
//! Values are validated on their string form and returned as strings, so no
//! precision is lost to binary floating point.

use crate::field::{FieldError, FieldResult, FormField, Widget, WidgetAttrs};

/// Fixed-point decimal input with digit and precision validation
#[derive(Debug, Clone)]
pub struct DecimalField {
	pub name: String,
	pub label: Option<String>,
	pub required: bool,
	pub help_text: Option<String>,
	pub widget: Widget,
	pub attrs: WidgetAttrs,
	pub initial: Option<serde_json::Value>,
	pub max_digits: Option<usize>,
	pub decimal_places: Option<usize>,
}

impl DecimalField {
	pub fn new(name: String) -> Self {
		Self {
			name,
			label: None,
			required: false,
			help_text: None,
			widget: Widget::NumberInput,
			attrs: WidgetAttrs::default(),
			initial: None,
			max_digits: None,
			decimal_places: None,
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

	pub fn with_precision(mut self, max_digits: usize, decimal_places: usize) -> Self {
		self.max_digits = Some(max_digits);
		self.decimal_places = Some(decimal_places);
		self
	}

	/// Validate the textual form and return it normalized (no leading `+`).
	fn validate_decimal(&self, s: &str) -> Result<String, String> {
		let unsigned = s.strip_prefix(['+', '-']).unwrap_or(s);
		let negative = s.starts_with('-');

		let (int_part, frac_part) = match unsigned.split_once('.') {
			Some((i, f)) => (i, f),
			None => (unsigned, ""),
		};

		let all_digits = |p: &str| p.chars().all(|c| c.is_ascii_digit());
		if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part)
		{
			return Err("Enter a number.".to_string());
		}

		let int_digits = int_part.trim_start_matches('0').len();
		if let Some(max_digits) = self.max_digits
			&& int_digits + frac_part.len() > max_digits
		{
			return Err(format!(
				"Ensure that there are no more than {} digits in total.",
				max_digits
			));
		}
		if let Some(places) = self.decimal_places
			&& frac_part.len() > places
		{
			return Err(format!(
				"Ensure that there are no more than {} decimal places.",
				places
			));
		}

		let int_part = if int_part.is_empty() { "0" } else { int_part };
		let mut normalized = String::new();
		if negative {
			normalized.push('-');
		}
		normalized.push_str(int_part);
		if !frac_part.is_empty() {
			normalized.push('.');
			normalized.push_str(frac_part);
		}
		Ok(normalized)
	}
}

impl FormField for DecimalField {
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
		let text = match value {
			None | Some(serde_json::Value::Null) => None,
			Some(serde_json::Value::String(s)) => {
				let s = s.trim();
				(!s.is_empty()).then(|| s.to_string())
			}
			Some(serde_json::Value::Number(n)) => Some(n.to_string()),
			Some(_) => return Err(FieldError::invalid("Expected number or string")),
		};

		let Some(text) = text else {
			if self.required {
				return Err(FieldError::required(None));
			}
			return Ok(serde_json::Value::Null);
		};

		let normalized = self.validate_decimal(&text).map_err(FieldError::Validation)?;
		Ok(serde_json::Value::String(normalized))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	#[case("12.50", "12.50")]
	#[case("+3", "3")]
	#[case("-0.5", "-0.5")]
	#[case(".75", "0.75")]
	fn test_decimal_field_normalizes(#[case] input: &str, #[case] expected: &str) {
		let field = DecimalField::new("price".to_string());
		assert_eq!(field.clean(Some(&json!(input))).unwrap(), json!(expected));
	}

	#[rstest]
	fn test_decimal_field_precision() {
		// Arrange
		let field = DecimalField::new("price".to_string()).with_precision(5, 2);

		// Act & Assert
		assert!(field.clean(Some(&json!("123.45"))).is_ok());
		assert!(field.clean(Some(&json!("123.456"))).is_err());
		assert!(field.clean(Some(&json!("1234.56"))).is_err());
	}

	#[rstest]
	#[case("1e5")]
	#[case("12,5")]
	#[case(".")]
	#[case("--1")]
	fn test_decimal_field_rejects(#[case] input: &str) {
		let field = DecimalField::new("price".to_string());
		assert!(field.clean(Some(&json!(input))).is_err());
	}

	#[rstest]
	fn test_decimal_field_accepts_json_numbers() {
		let field = DecimalField::new("price".to_string());
		assert_eq!(field.clean(Some(&json!(7))).unwrap(), json!("7"));
	}
}
