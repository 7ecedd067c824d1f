//! Integer field

use crate::field::{FieldError, FieldResult, FormField, Widget, WidgetAttrs};

/// Whole-number input with optional bounds
#[derive(Debug, Clone)]
pub struct IntegerField {
	pub name: String,
	pub label: Option<String>,
	pub required: bool,
	pub help_text: Option<String>,
	pub widget: Widget,
	pub attrs: WidgetAttrs,
	pub initial: Option<serde_json::Value>,
	pub max_value: Option<i64>,
	pub min_value: Option<i64>,
}

impl IntegerField {
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

	pub fn with_range(mut self, min: Option<i64>, max: Option<i64>) -> Self {
		self.min_value = min;
		self.max_value = max;
		self
	}

	fn parse(s: &str) -> FieldResult<i64> {
		if let Ok(i) = s.parse::<i64>() {
			return Ok(i);
		}
		// "12.0" is accepted, "12.5" is not
		match s.parse::<f64>() {
			Ok(f) if f.is_finite() && f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Ok(f as i64),
			_ => Err(FieldError::invalid("Enter a whole number.")),
		}
	}
}

impl FormField for IntegerField {
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
				if let Some(i) = v.as_i64() {
					Some(i)
				} else if let Some(s) = v.as_str() {
					let s = s.trim();
					if s.is_empty() { None } else { Some(Self::parse(s)?) }
				} else {
					return Err(FieldError::invalid("Enter a whole number."));
				}
			}
		};

		let Some(num) = num else {
			if self.required {
				return Err(FieldError::required(None));
			}
			return Ok(serde_json::Value::Null);
		};

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
