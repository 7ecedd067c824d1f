use crate::field::{FormField, Widget, WidgetAttrs};

/// A field paired with the data and errors of the form it belongs to.
///
/// This is what a renderer iterates over: it knows the name the field is
/// submitted under, which may differ from the internal key.
pub struct BoundField<'a> {
	field: &'a dyn FormField,
	data: Option<&'a serde_json::Value>,
	errors: &'a [String],
	html_name: String,
	required_css_class: &'a str,
}

impl<'a> BoundField<'a> {
	/// # Examples
	///
	/// ```
	/// use contact_plus_forms::{BoundField, CharField, FormField};
	///
	/// let field: Box<dyn FormField> = Box::new(CharField::new("name".to_string()));
	/// let data = serde_json::json!("John");
	///
	/// let bound = BoundField::new(field.as_ref(), Some(&data), &[], "name".to_string(), "required");
	/// assert_eq!(bound.name(), "name");
	/// assert_eq!(bound.value(), Some(&data));
	/// ```
	pub fn new(
		field: &'a dyn FormField,
		data: Option<&'a serde_json::Value>,
		errors: &'a [String],
		html_name: String,
		required_css_class: &'a str,
	) -> Self {
		Self {
			field,
			data,
			errors,
			html_name,
			required_css_class,
		}
	}

	/// Internal key of the field
	pub fn name(&self) -> &str {
		self.field.name()
	}

	/// Name the field is submitted under (wire mapping applied)
	///
	/// # Examples
	///
	/// ```
	/// use contact_plus_forms::{BoundField, FormField, ReCaptchaField};
	///
	/// let field: Box<dyn FormField> = Box::new(ReCaptchaField::new("g_recaptcha_response".to_string()));
	/// let bound = BoundField::new(field.as_ref(), None, &[], "g-recaptcha-response".to_string(), "");
	/// assert_eq!(bound.html_name(), "g-recaptcha-response");
	/// assert_eq!(bound.id_for_label(), "id_g-recaptcha-response");
	/// ```
	pub fn html_name(&self) -> &str {
		&self.html_name
	}

	pub fn id_for_label(&self) -> String {
		format!("id_{}", self.html_name)
	}

	pub fn label(&self) -> Option<&str> {
		self.field.label()
	}

	/// Submitted value, falling back to the field's initial value
	pub fn value(&self) -> Option<&serde_json::Value> {
		self.data.or_else(|| self.field.initial())
	}

	pub fn errors(&self) -> &[String] {
		self.errors
	}

	pub fn has_errors(&self) -> bool {
		!self.errors.is_empty()
	}

	pub fn widget(&self) -> &Widget {
		self.field.widget()
	}

	pub fn widget_attrs(&self) -> Option<&WidgetAttrs> {
		self.field.widget_attrs()
	}

	pub fn help_text(&self) -> Option<&str> {
		self.field.help_text()
	}

	pub fn is_required(&self) -> bool {
		self.field.required()
	}

	pub fn is_hidden(&self) -> bool {
		self.field.widget().is_hidden()
	}

	/// CSS classes for the row wrapping this field.
	///
	/// # Examples
	///
	/// ```
	/// use contact_plus_forms::{BoundField, CharField, FormField};
	///
	/// let field: Box<dyn FormField> = Box::new(CharField::new("name".to_string()).required());
	/// let bound = BoundField::new(field.as_ref(), None, &[], "name".to_string(), "required");
	/// assert_eq!(bound.css_classes(), "required");
	/// ```
	pub fn css_classes(&self) -> String {
		let mut classes = Vec::new();
		if self.is_required() && !self.required_css_class.is_empty() {
			classes.push(self.required_css_class);
		}
		if self.has_errors() {
			classes.push("error");
		}
		classes.join(" ")
	}
}
