//! Upload fields
//!
//! Uploaded files arrive as `{"filename": ..., "size": ..., "content_type": ...}`
//! objects (a bare string is treated as a filename). Storing the bytes is the
//! caller's job; these fields only validate the metadata.

use crate::field::{FieldError, FieldResult, FormField, Widget, WidgetAttrs};

/// Extract and validate the upload object shared by both upload fields.
fn clean_upload(
	value: Option<&serde_json::Value>,
	required: bool,
	max_length: Option<usize>,
	allow_empty_file: bool,
) -> FieldResult<Option<serde_json::Map<String, serde_json::Value>>> {
	let obj = match value {
		None | Some(serde_json::Value::Null) => None,
		Some(serde_json::Value::String(s)) if s.trim().is_empty() => None,
		Some(serde_json::Value::String(s)) => {
			let mut obj = serde_json::Map::new();
			obj.insert("filename".to_string(), serde_json::json!(s.trim()));
			Some(obj)
		}
		Some(serde_json::Value::Object(obj)) => Some(obj.clone()),
		Some(_) => return Err(FieldError::invalid("Expected an uploaded file")),
	};

	let Some(obj) = obj else {
		if required {
			return Err(FieldError::required(None));
		}
		return Ok(None);
	};

	let filename = obj
		.get("filename")
		.and_then(|f| f.as_str())
		.ok_or_else(|| FieldError::invalid("No file was submitted."))?;

	if filename.is_empty() {
		if required {
			return Err(FieldError::required(None));
		}
		return Ok(None);
	}

	if let Some(max) = max_length
		&& filename.chars().count() > max
	{
		return Err(FieldError::validation(format!(
			"Ensure this filename has at most {} characters.",
			max
		)));
	}

	if !allow_empty_file
		&& let Some(size) = obj.get("size").and_then(|s| s.as_u64())
		&& size == 0
	{
		return Err(FieldError::validation("The submitted file is empty."));
	}

	Ok(Some(obj))
}

/// Returns the filename stored in a cleaned upload value.
///
/// # Examples
///
/// ```
/// use contact_plus_forms::fields::upload_filename;
/// use serde_json::json;
///
/// assert_eq!(upload_filename(&json!({"filename": "cv.pdf", "size": 10})), Some("cv.pdf"));
/// assert_eq!(upload_filename(&json!("cv.pdf")), Some("cv.pdf"));
/// assert_eq!(upload_filename(&json!(null)), None);
/// ```
pub fn upload_filename(value: &serde_json::Value) -> Option<&str> {
	match value {
		serde_json::Value::String(s) if !s.is_empty() => Some(s.as_str()),
		serde_json::Value::Object(obj) => obj.get("filename").and_then(|f| f.as_str()),
		_ => None,
	}
}

/// FileField for file upload
#[derive(Debug, Clone)]
pub struct FileField {
	pub name: String,
	pub label: Option<String>,
	pub required: bool,
	pub help_text: Option<String>,
	pub widget: Widget,
	pub attrs: WidgetAttrs,
	pub initial: Option<serde_json::Value>,
	pub max_length: Option<usize>,
	pub allow_empty_file: bool,
}

impl FileField {
	/// Create a new FileField
	///
	/// # Examples
	///
	/// ```
	/// use contact_plus_forms::fields::FileField;
	///
	/// let field = FileField::new("attachment".to_string());
	/// assert_eq!(field.name, "attachment");
	/// ```
	pub fn new(name: String) -> Self {
		Self {
			name,
			label: None,
			required: false,
			help_text: None,
			widget: Widget::FileInput,
			attrs: WidgetAttrs::default(),
			initial: None,
			max_length: Some(255),
			allow_empty_file: false,
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

impl FormField for FileField {
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
		Ok(
			clean_upload(value, self.required, self.max_length, self.allow_empty_file)?
				.map(serde_json::Value::Object)
				.unwrap_or(serde_json::Value::Null),
		)
	}
}

/// ImageField for image upload with extension and content-type checks
#[derive(Debug, Clone)]
pub struct ImageField {
	pub name: String,
	pub label: Option<String>,
	pub required: bool,
	pub help_text: Option<String>,
	pub widget: Widget,
	pub attrs: WidgetAttrs,
	pub initial: Option<serde_json::Value>,
	pub max_length: Option<usize>,
	pub allow_empty_file: bool,
}

impl ImageField {
	pub fn new(name: String) -> Self {
		Self {
			name,
			label: None,
			required: false,
			help_text: None,
			widget: Widget::FileInput,
			attrs: WidgetAttrs::default(),
			initial: None,
			max_length: Some(255),
			allow_empty_file: false,
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

	fn is_valid_image_extension(filename: &str) -> bool {
		// NOTE: SVG is excluded, it can carry script.
		let valid_extensions = ["jpg", "jpeg", "png", "gif", "webp", "bmp"];
		filename
			.rsplit_once('.')
			.map(|(_, ext)| valid_extensions.contains(&ext.to_lowercase().as_str()))
			.unwrap_or(false)
	}
}

impl FormField for ImageField {
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
		let Some(obj) = clean_upload(value, self.required, self.max_length, self.allow_empty_file)?
		else {
			return Ok(serde_json::Value::Null);
		};

		let invalid_image = || {
			FieldError::validation(
				"Upload a valid image. The file you uploaded was either not an image or a corrupted image.",
			)
		};

		let filename = obj.get("filename").and_then(|f| f.as_str()).unwrap_or_default();
		if !Self::is_valid_image_extension(filename) {
			return Err(invalid_image());
		}
		if let Some(content_type) = obj.get("content_type").and_then(|c| c.as_str())
			&& !content_type.starts_with("image/")
		{
			return Err(invalid_image());
		}

		Ok(serde_json::Value::Object(obj))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_file_field_accepts_upload_object() {
		// Arrange
		let field = FileField::new("cv".to_string()).with_required(true);
		let upload = json!({"filename": "cv.pdf", "size": 2048});

		// Act
		let cleaned = field.clean(Some(&upload)).unwrap();

		// Assert
		assert_eq!(cleaned, upload);
		assert_eq!(upload_filename(&cleaned), Some("cv.pdf"));
	}

	#[rstest]
	fn test_file_field_bare_filename() {
		let field = FileField::new("cv".to_string());
		assert_eq!(
			field.clean(Some(&json!("notes.txt"))).unwrap(),
			json!({"filename": "notes.txt"})
		);
	}

	#[rstest]
	fn test_file_field_empty_file_rejected() {
		let field = FileField::new("cv".to_string());
		assert!(field.clean(Some(&json!({"filename": "a.txt", "size": 0}))).is_err());
	}

	#[rstest]
	fn test_file_field_optional_missing() {
		let field = FileField::new("cv".to_string());
		assert_eq!(field.clean(None).unwrap(), serde_json::Value::Null);
		assert!(FileField::new("cv".to_string()).with_required(true).clean(None).is_err());
	}

	#[rstest]
	#[case("photo.png", true)]
	#[case("photo.JPG", true)]
	#[case("photo.svg", false)]
	#[case("photo", false)]
	fn test_image_field_extension(#[case] filename: &str, #[case] ok: bool) {
		let field = ImageField::new("photo".to_string());
		let result = field.clean(Some(&json!({"filename": filename, "size": 10})));
		assert_eq!(result.is_ok(), ok);
	}

	#[rstest]
	fn test_image_field_content_type_mismatch() {
		let field = ImageField::new("photo".to_string());
		let upload = json!({"filename": "photo.png", "size": 10, "content_type": "text/html"});
		assert!(field.clean(Some(&upload)).is_err());
	}
}
