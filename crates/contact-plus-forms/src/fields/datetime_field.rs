use crate::field::{FieldError, FieldResult, FormField, Widget, WidgetAttrs, optional_str};
use chrono::{DateTime, NaiveDateTime};

/// DateTimeField for date and time input
#[derive(Debug, Clone)]
pub struct DateTimeField {
	pub name: String,
	pub label: Option<String>,
	pub required: bool,
	pub help_text: Option<String>,
	pub widget: Widget,
	pub attrs: WidgetAttrs,
	pub initial: Option<serde_json::Value>,
	pub input_formats: Vec<String>,
}

impl DateTimeField {
	pub fn new(name: String) -> Self {
		Self {
			name,
			label: None,
			required: false,
			help_text: None,
			widget: Widget::DateTimeInput,
			attrs: WidgetAttrs::default(),
			initial: None,
			input_formats: vec![
				"%Y-%m-%d %H:%M:%S".to_string(),
				"%Y-%m-%d %H:%M".to_string(),
				"%Y-%m-%dT%H:%M:%S".to_string(),
				"%Y-%m-%dT%H:%M".to_string(),
				"%m/%d/%Y %H:%M:%S".to_string(),
				"%m/%d/%Y %H:%M".to_string(),
			],
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

	fn parse_datetime(&self, s: &str) -> Result<NaiveDateTime, String> {
		// Offsets are accepted and dropped; values are stored as submitted wall time.
		if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
			return Ok(dt.naive_local());
		}
		for fmt in &self.input_formats {
			if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
				return Ok(dt);
			}
		}
		Err("Enter a valid date/time.".to_string())
	}
}

impl FormField for DateTimeField {
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
			None => Ok(serde_json::Value::Null),
			Some(s) => {
				let dt = self.parse_datetime(s).map_err(FieldError::Validation)?;
				Ok(serde_json::json!(dt.format("%Y-%m-%d %H:%M:%S").to_string()))
			}
		}
	}
}
