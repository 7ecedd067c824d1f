//! Floating-point field

use crate::field::{FieldError, FieldResult, FormField, Widget, WidgetAttrs};

/// Floating-point number input
#[derive(Debug, Clone)]
pub struct FloatField {
	pub name: String,
	pub label: Option<String>,
	pub required: bool,
	pub help_text: Option<String>,
	pub widget: Widget,
	pub attrs: WidgetAttrs,
	pub initial: Option<serde_json::Value>,
	pub max_value: Option<f64>,
	pub min_value: Option<f64>,
}

impl FloatField {
	pub fn new(name: String) -> Self {
		Self {
			name,
			label: None,
			required: false,
			help_text: None,
			widget: Widget::NumberInput,
			attrs: WidgetAttrs::default(),
			initial: None,
			max_value: None,
			min_value: None,
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

impl FormField for FloatField {
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
		let num = match value {
			None | Some(serde_json::Value::Null) => None,
			Some(v) => {
				if let Some(f) = v.as_f64() {
					Some(f)
				} else if let Some(s) = v.as_str() {
					let s = s.trim();
					if s.is_empty() {
						None
					} else {
						Some(
							s.parse::<f64>()
								.map_err(|_| FieldError::invalid("Enter a number."))?,
						)
					}
				} else {
					return Err(FieldError::invalid("Expected number or string"));
				}
			}
		};

		let Some(num) = num else {
			if self.required {
				return Err(FieldError::required(None));
			}
			return Ok(serde_json::Value::Null);
		};

		if !num.is_finite() {
			return Err(FieldError::invalid("Enter a valid number."));
		}

		if let Some(max) = self.max_value
			&& num > max
		{
			return Err(FieldError::validation(format!(
				"Ensure this value is less than or equal to {}",
				max
			)));
		}

		if let Some(min) = self.min_value
			&& num < min
		{
			return Err(FieldError::validation(format!(
				"Ensure this value is greater than or equal to {}",
				min
			)));
		}

		Ok(serde_json::json!(num))
	}
}
