use crate::bound_field::BoundField;
use crate::field::FormField;
use std::collections::HashMap;

/// Special key for form-level (non-field-specific) errors.
pub const ALL_FIELDS_KEY: &str = "_all";

/// An ordered collection of fields that validates submitted data.
///
/// Submitted data is keyed by each field's wire name: the internal name after
/// the field-name mapping has been applied. Cleaned data and errors are keyed
/// by internal name.
pub struct Form {
	fields: Vec<Box<dyn FormField>>,
	data: HashMap<String, serde_json::Value>,
	cleaned_data: HashMap<String, serde_json::Value>,
	errors: HashMap<String, Vec<String>>,
	is_bound: bool,
	field_name_mapping: HashMap<String, String>,
	required_css_class: String,
}

impl Form {
	/// Create a new empty form
	///
	/// # Examples
	///
	/// ```
	/// use contact_plus_forms::Form;
	///
	/// let form = Form::new();
	/// assert!(!form.is_bound());
	/// assert!(form.fields().is_empty());
	/// ```
	pub fn new() -> Self {
		Self {
			fields: vec![],
			data: HashMap::new(),
			cleaned_data: HashMap::new(),
			errors: HashMap::new(),
			is_bound: false,
			field_name_mapping: HashMap::new(),
			required_css_class: String::new(),
		}
	}

	/// Add a field to the form.
	///
	/// A field whose name is already taken replaces the existing one at the
	/// same position.
	///
	/// # Examples
	///
	/// ```
	/// use contact_plus_forms::{CharField, EmailField, Form};
	///
	/// let mut form = Form::new();
	/// form.add_field(Box::new(CharField::new("name".to_string())));
	/// form.add_field(Box::new(CharField::new("contact".to_string())));
	/// form.add_field(Box::new(EmailField::new("name".to_string())));
	///
	/// let names: Vec<_> = form.fields().iter().map(|f| f.name()).collect();
	/// assert_eq!(names, ["name", "contact"]);
	/// ```
	pub fn add_field(&mut self, field: Box<dyn FormField>) {
		match self.fields.iter().position(|f| f.name() == field.name()) {
			Some(pos) => {
				tracing::warn!(
					field = field.name(),
					"duplicate field name, replacing earlier field"
				);
				self.fields[pos] = field;
			}
			None => self.fields.push(field),
		}
	}

	/// Bind submitted data for validation
	///
	/// # Examples
	///
	/// ```
	/// use contact_plus_forms::Form;
	/// use std::collections::HashMap;
	/// use serde_json::json;
	///
	/// let mut form = Form::new();
	/// let mut data = HashMap::new();
	/// data.insert("name".to_string(), json!("Ana"));
	///
	/// form.bind(data);
	/// assert!(form.is_bound());
	/// ```
	pub fn bind(&mut self, data: HashMap<String, serde_json::Value>) {
		self.data = data;
		self.is_bound = true;
		self.cleaned_data.clear();
		self.errors.clear();
	}

	/// Validate the form and return true if all fields are valid
	///
	/// # Examples
	///
	/// ```
	/// use contact_plus_forms::{CharField, Form};
	/// use std::collections::HashMap;
	/// use serde_json::json;
	///
	/// let mut form = Form::new();
	/// form.add_field(Box::new(CharField::new("name".to_string()).required()));
	///
	/// let mut data = HashMap::new();
	/// data.insert("name".to_string(), json!("Ana"));
	/// form.bind(data);
	///
	/// assert!(form.is_valid());
	/// assert_eq!(form.cleaned_data().get("name"), Some(&json!("Ana")));
	/// ```
	pub fn is_valid(&mut self) -> bool {
		if !self.is_bound {
			return false;
		}

		self.errors.clear();
		self.cleaned_data.clear();

		for field in &self.fields {
			let key = self.html_name(field.name());
			match field.clean(self.data.get(&key)) {
				Ok(cleaned) => {
					self.cleaned_data.insert(field.name().to_string(), cleaned);
				}
				Err(e) => {
					self.errors
						.entry(field.name().to_string())
						.or_default()
						.push(e.to_string());
				}
			}
		}

		self.errors.is_empty()
	}

	/// Record an error after validation; `None` targets the whole form.
	///
	/// A field error also drops that field from the cleaned data.
	pub fn add_error(&mut self, field: Option<&str>, message: impl Into<String>) {
		let key = field.unwrap_or(ALL_FIELDS_KEY);
		if field.is_some() {
			self.cleaned_data.remove(key);
		}
		self.errors
			.entry(key.to_string())
			.or_default()
			.push(message.into());
	}

	pub fn cleaned_data(&self) -> &HashMap<String, serde_json::Value> {
		&self.cleaned_data
	}

	pub fn errors(&self) -> &HashMap<String, Vec<String>> {
		&self.errors
	}

	pub fn non_field_errors(&self) -> &[String] {
		self.errors
			.get(ALL_FIELDS_KEY)
			.map(Vec::as_slice)
			.unwrap_or(&[])
	}

	pub fn is_bound(&self) -> bool {
		self.is_bound
	}

	pub fn fields(&self) -> &[Box<dyn FormField>] {
		&self.fields
	}

	pub fn get_field(&self, name: &str) -> Option<&dyn FormField> {
		self.fields
			.iter()
			.find(|f| f.name() == name)
			.map(|f| f.as_ref())
	}

	pub fn field_count(&self) -> usize {
		self.fields.len()
	}

	/// Submit `internal` under a different name on the wire
	///
	/// # Examples
	///
	/// ```
	/// use contact_plus_forms::Form;
	///
	/// let mut form = Form::new();
	/// form.map_field_name("g_recaptcha_response", "g-recaptcha-response");
	/// assert_eq!(form.html_name("g_recaptcha_response"), "g-recaptcha-response");
	/// assert_eq!(form.html_name("name"), "name");
	/// ```
	pub fn map_field_name(&mut self, internal: impl Into<String>, wire: impl Into<String>) {
		self.field_name_mapping.insert(internal.into(), wire.into());
	}

	/// Wire name for an internal field name
	pub fn html_name(&self, name: &str) -> String {
		self.field_name_mapping
			.get(name)
			.map(String::as_str)
			.unwrap_or(name)
			.to_string()
	}

	pub fn required_css_class(&self) -> &str {
		&self.required_css_class
	}

	pub fn set_required_css_class(&mut self, class: impl Into<String>) {
		self.required_css_class = class.into();
	}

	pub fn get_bound_field<'a>(&'a self, name: &str) -> Option<BoundField<'a>> {
		let field = self.get_field(name)?;
		Some(self.bind_field(field))
	}

	/// Bound fields in display order
	pub fn bound_fields(&self) -> Vec<BoundField<'_>> {
		self.fields
			.iter()
			.map(|f| self.bind_field(f.as_ref()))
			.collect()
	}

	fn bind_field<'a>(&'a self, field: &'a dyn FormField) -> BoundField<'a> {
		let html_name = self.html_name(field.name());
		let data = if self.is_bound {
			self.data.get(&html_name)
		} else {
			None
		};
		let errors = self
			.errors
			.get(field.name())
			.map(Vec::as_slice)
			.unwrap_or(&[]);

		BoundField::new(field, data, errors, html_name, &self.required_css_class)
	}
}

impl Default for Form {
	fn default() -> Self {
		Self::new()
	}
}
