//! Administrator-authored form schema

use contact_plus_forms::slugify;
use serde::{Deserialize, Serialize};

/// Field type tags understood by the default registry
pub mod tags {
	pub const CHAR_FIELD: &str = "CharField";
	pub const EMAIL_FIELD: &str = "EmailField";
	pub const DECIMAL_FIELD: &str = "DecimalField";
	pub const FLOAT_FIELD: &str = "FloatField";
	pub const INTEGER_FIELD: &str = "IntegerField";
	pub const IP_ADDRESS_FIELD: &str = "IPAddressField";
	pub const BOOLEAN_FIELD: &str = "BooleanField";
	pub const FILE_FIELD: &str = "FileField";
	pub const IMAGE_FIELD: &str = "ImageField";
	pub const DATE_FIELD: &str = "DateField";
	pub const DATE_TIME_FIELD: &str = "DateTimeField";
	pub const TEXTAREA: &str = "auto_Textarea";
	pub const HIDDEN_INPUT: &str = "auto_hidden_input";
	pub const REFERRAL_PAGE: &str = "auto_referral_page";
	pub const GET_PARAMETER: &str = "auto_GET_parameter";
	pub const MATH_CAPTCHA: &str = "MathCaptcha";
	pub const RECAPTCHA: &str = "ReCaptcha";
	pub const INVISIBLE_RECAPTCHA: &str = "InvisibleRecaptcha";
	pub const CHAR_FIELD_WITH_VALIDATOR: &str = "CharFieldWithValidator";

	/// Tags whose values never appear in notifications or records
	pub const CAPTCHA_TAGS: [&str; 3] = [MATH_CAPTCHA, RECAPTCHA, INVISIBLE_RECAPTCHA];

	pub fn is_captcha(tag: &str) -> bool {
		CAPTCHA_TAGS.contains(&tag)
	}

	pub fn is_upload(tag: &str) -> bool {
		tag == FILE_FIELD || tag == IMAGE_FIELD
	}
}

/// One field of a contact form, as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
	pub label: String,
	pub field_type: String,
	#[serde(default)]
	pub initial: Option<String>,
	#[serde(default)]
	pub placeholder: String,
	#[serde(default)]
	pub css_classes: String,
	#[serde(default)]
	pub required: bool,
	#[serde(default)]
	pub ordering_position: i32,
}

impl FieldDefinition {
	/// # Examples
	///
	/// ```
	/// use contact_plus::FieldDefinition;
	///
	/// let def = FieldDefinition::new("Your Name", "CharField").required();
	/// assert_eq!(def.key(), "your-name");
	/// assert!(def.required);
	/// ```
	pub fn new(label: impl Into<String>, field_type: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			field_type: field_type.into(),
			initial: None,
			placeholder: String::new(),
			css_classes: String::new(),
			required: false,
			ordering_position: 0,
		}
	}

	pub fn required(mut self) -> Self {
		self.required = true;
		self
	}

	pub fn with_initial(mut self, initial: impl Into<String>) -> Self {
		self.initial = Some(initial.into());
		self
	}

	pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
		self.placeholder = placeholder.into();
		self
	}

	pub fn with_css_classes(mut self, classes: impl Into<String>) -> Self {
		self.css_classes = classes.into();
		self
	}

	pub fn with_position(mut self, position: i32) -> Self {
		self.ordering_position = position;
		self
	}

	/// Runtime key of the field
	pub fn key(&self) -> String {
		slugify(&self.label)
	}

	pub fn is_captcha(&self) -> bool {
		tags::is_captcha(&self.field_type)
	}
}

/// A contact form: where submissions go plus its ordered fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormConfiguration {
	pub id: i64,
	pub subject: String,
	pub recipient_email: String,
	#[serde(default)]
	pub collect_records: bool,
	#[serde(default)]
	pub thanks: String,
	#[serde(default = "default_submit_label")]
	pub submit_label: String,
	fields: Vec<FieldDefinition>,
}

fn default_submit_label() -> String {
	"Submit".to_string()
}

impl FormConfiguration {
	pub fn new(id: i64, subject: impl Into<String>, recipient_email: impl Into<String>) -> Self {
		Self {
			id,
			subject: subject.into(),
			recipient_email: recipient_email.into(),
			collect_records: false,
			thanks: String::new(),
			submit_label: default_submit_label(),
			fields: Vec::new(),
		}
	}

	pub fn with_collect_records(mut self, collect: bool) -> Self {
		self.collect_records = collect;
		self
	}

	pub fn with_thanks(mut self, thanks: impl Into<String>) -> Self {
		self.thanks = thanks.into();
		self
	}

	/// Append a field, keeping fields ordered by position
	pub fn with_field(mut self, field: FieldDefinition) -> Self {
		self.push_field(field);
		self
	}

	pub fn with_fields(mut self, fields: impl IntoIterator<Item = FieldDefinition>) -> Self {
		for field in fields {
			self.push_field(field);
		}
		self
	}

	/// Insert after every field with a lower or equal position
	pub fn push_field(&mut self, field: FieldDefinition) {
		let at = self
			.fields
			.partition_point(|f| f.ordering_position <= field.ordering_position);
		self.fields.insert(at, field);
	}

	/// Fields in display order
	pub fn fields(&self) -> &[FieldDefinition] {
		&self.fields
	}

	/// Restore ordering after deserializing unsorted data
	pub fn sort_fields(&mut self) {
		self.fields.sort_by_key(|f| f.ordering_position);
	}
}
