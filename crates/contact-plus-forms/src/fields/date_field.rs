use crate::field::{FieldError, FieldResult, FormField, Widget, WidgetAttrs, optional_str};
use chrono::{Datelike, NaiveDate};

/// DateField for date input
#[derive(Debug, Clone)]
pub struct DateField {
	pub name: String,
	pub label: Option<String>,
	pub required: bool,
	pub help_text: Option<String>,
	pub widget: Widget,
	pub attrs: WidgetAttrs,
	pub initial: Option<serde_json::Value>,
	pub input_formats: Vec<String>,
}

impl DateField {
	/// Create a new DateField with the given name
	///
	/// # Examples
	///
	/// ```
	/// use contact_plus_forms::fields::DateField;
	///
	/// let field = DateField::new("preferred_date".to_string());
	/// assert_eq!(field.name, "preferred_date");
	/// assert!(!field.required);
	/// ```
	pub fn new(name: String) -> Self {
		Self {
			name,
			label: None,
			required: false,
			help_text: None,
			widget: Widget::DateInput,
			attrs: WidgetAttrs::default(),
			initial: None,
			input_formats: vec![
				"%Y-%m-%d".to_string(),  // 2025-01-15
				"%m/%d/%Y".to_string(),  // 01/15/2025
				"%b %d %Y".to_string(),  // Jan 15 2025
				"%b %d, %Y".to_string(), // Jan 15, 2025
				"%d %b %Y".to_string(),  // 15 Jan 2025
				"%B %d, %Y".to_string(), // January 15, 2025
				"%d %B %Y".to_string(),  // 15 January 2025
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

	fn parse_date(&self, s: &str) -> Result<NaiveDate, String> {
		for format in &self.input_formats {
			if let Ok(date) = NaiveDate::parse_from_str(s, format) {
				// Reject years outside the 4-digit range
				if !(1000..=9999).contains(&date.year()) {
					continue;
				}
				return Ok(date);
			}
		}
		Err("Enter a valid date.".to_string())
	}
}

impl FormField for DateField {
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
				let date = self.parse_date(s).map_err(FieldError::Validation)?;
				// ISO 8601
				Ok(serde_json::json!(date.format("%Y-%m-%d").to_string()))
			}
		}
	}
}
