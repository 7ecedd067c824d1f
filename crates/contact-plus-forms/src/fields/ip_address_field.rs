//! IP address field

use crate::field::{FieldError, FieldResult, FormField, Widget, WidgetAttrs, optional_str};
use std::net::IpAddr;

/// IPv4 or IPv6 address input; the cleaned value is the canonical textual form.
#[derive(Debug, Clone)]
pub struct IPAddressField {
	pub name: String,
	pub label: Option<String>,
	pub required: bool,
	pub help_text: Option<String>,
	pub widget: Widget,
	pub attrs: WidgetAttrs,
	pub initial: Option<serde_json::Value>,
}

impl IPAddressField {
	pub fn new(name: String) -> Self {
		Self {
			name,
			label: None,
			required: false,
			help_text: None,
			widget: Widget::TextInput,
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
}

impl FormField for IPAddressField {
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
			Some(s) => s
				.parse::<IpAddr>()
				.map(|ip| serde_json::Value::String(ip.to_string()))
				.map_err(|_| FieldError::validation("Enter a valid IPv4 or IPv6 address.")),
		}
	}
}
