//! Checkbox field

use crate::field::{FieldError, FieldResult, FormField, Widget, WidgetAttrs};

/// Boolean checkbox. A required boolean field must be checked.
#[derive(Debug, Clone)]
pub struct BooleanField {
	pub name: String,
	pub label: Option<String>,
	pub required: bool,
	pub help_text: Option<String>,
	pub widget: Widget,
	pub attrs: WidgetAttrs,
	pub initial: Option<serde_json::Value>,
}

impl BooleanField {
	/// Create a new BooleanField
	///
	/// # Examples
	///
	/// ```
	/// use contact_plus_forms::fields::BooleanField;
	///
	/// let field = BooleanField::new("newsletter".to_string());
	/// assert!(!field.required);
	/// ```
	pub fn new(name: String) -> Self {
		Self {
			name,
			label: None,
			required: false,
			help_text: None,
			widget: Widget::CheckboxInput,
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

	pub fn with_attrs(mut self, attrs: WidgetAttrs) -> Self {
		self.attrs = attrs;
		self
	}

	pub fn with_initial_value(mut self, initial: Option<serde_json::Value>) -> Self {
		self.initial = initial;
		self
	}

	fn to_bool(value: &serde_json::Value) -> FieldResult<bool> {
		match value {
			serde_json::Value::Null => Ok(false),
			serde_json::Value::Bool(b) => Ok(*b),
			serde_json::Value::Number(n) => Ok(n.as_f64().is_some_and(|f| f != 0.0)),
			serde_json::Value::String(s) => {
				match s.trim().to_ascii_lowercase().as_str() {
					"" | "false" | "0" | "off" | "no" => Ok(false),
					_ => Ok(true),
				}
			}
			_ => Err(FieldError::invalid("Expected a boolean")),
		}
	}
}

impl FormField for BooleanField {
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
		let checked = match value {
			Some(v) => Self::to_bool(v)?,
			None => false,
		};

		if !checked && self.required {
			return Err(FieldError::required(None));
		}

		Ok(serde_json::Value::Bool(checked))
	}
}
