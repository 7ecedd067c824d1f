//! Tera templates for notification bodies
//!
//! Templates are compiled when loaded so syntax errors surface at startup
//! rather than on the first submission.

use crate::{EmailError, EmailResult};
use serde::Serialize;
use std::path::Path;
use tera::{Context, Tera};

const TEMPLATE_NAME: &str = "contact_plus/email.txt";

/// Built-in body: one `label: value` line per submitted field.
pub const DEFAULT_EMAIL_TEMPLATE: &str = "\
{% for entry in ordered_data -%}
{{ entry.label }}: {{ entry.value }}
{% endfor -%}
";

/// A compiled plain-text body template.
///
/// # Examples
///
/// ```
/// use contact_plus_mail::EmailTemplate;
/// use serde_json::json;
///
/// let template = EmailTemplate::default();
/// let body = template
///     .render(&json!({"ordered_data": [{"label": "Name", "value": "Ana"}]}))
///     .unwrap();
/// assert_eq!(body, "Name: Ana\n");
/// ```
pub struct EmailTemplate {
	tera: Tera,
}

impl EmailTemplate {
	/// Compile a template from source
	pub fn from_source(source: &str) -> EmailResult<Self> {
		let mut tera = Tera::default();
		// Plain text: never HTML-escape submitted values
		tera.autoescape_on(vec![]);
		tera.add_raw_template(TEMPLATE_NAME, source)
			.map_err(|e| EmailError::TemplateError(describe(&e)))?;
		Ok(Self { tera })
	}

	/// Compile a template file
	pub fn from_file(path: impl AsRef<Path>) -> EmailResult<Self> {
		let source = std::fs::read_to_string(path.as_ref())?;
		Self::from_source(&source)
	}

	/// The configured file if any, else the built-in template
	pub fn load(path: Option<&Path>) -> EmailResult<Self> {
		match path {
			Some(path) => Self::from_file(path),
			None => Ok(Self::default()),
		}
	}

	/// Render with any serializable map as the context
	pub fn render<T: Serialize>(&self, context: &T) -> EmailResult<String> {
		let context =
			Context::from_serialize(context).map_err(|e| EmailError::TemplateError(describe(&e)))?;
		self.tera
			.render(TEMPLATE_NAME, &context)
			.map_err(|e| EmailError::TemplateError(describe(&e)))
	}
}

impl Default for EmailTemplate {
	fn default() -> Self {
		let mut tera = Tera::default();
		tera.autoescape_on(vec![]);
		if let Err(e) = tera.add_raw_template(TEMPLATE_NAME, DEFAULT_EMAIL_TEMPLATE) {
			tracing::error!(error = %describe(&e), "built-in email template failed to compile");
		}
		Self { tera }
	}
}

/// Tera nests the useful message in the error source chain.
fn describe(error: &tera::Error) -> String {
	let mut message = error.to_string();
	let mut source = std::error::Error::source(error);
	while let Some(inner) = source {
		message.push_str(": ");
		message.push_str(&inner.to_string());
		source = std::error::Error::source(inner);
	}
	message
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;
	use std::io::Write;
	use tempfile::NamedTempFile;

	#[rstest]
	fn test_default_template_lists_entries_in_order() {
		// Arrange
		let template = EmailTemplate::default();
		let context = json!({
			"ordered_data": [
				{"label": "Name", "value": "Ana"},
				{"label": "Email", "value": "ana@example.com"},
			],
		});

		// Act
		let body = template.render(&context).unwrap();

		// Assert
		assert_eq!(body, "Name: Ana\nEmail: ana@example.com\n");
	}

	#[rstest]
	fn test_values_are_not_html_escaped() {
		let template = EmailTemplate::default();
		let body = template
			.render(&json!({"ordered_data": [{"label": "Msg", "value": "<b>&</b>"}]}))
			.unwrap();
		assert_eq!(body, "Msg: <b>&</b>\n");
	}

	#[rstest]
	fn test_custom_template_sees_data_and_instance() {
		// Arrange
		let template =
			EmailTemplate::from_source("{{ instance.subject }} from {{ data.name }}").unwrap();

		// Act
		let body = template
			.render(&json!({"instance": {"subject": "Hello"}, "data": {"name": "Ana"}}))
			.unwrap();

		// Assert
		assert_eq!(body, "Hello from Ana");
	}

	#[rstest]
	fn test_syntax_error_is_reported_at_load() {
		let result = EmailTemplate::from_source("{% for x in %}");
		assert!(matches!(result, Err(EmailError::TemplateError(_))));
	}

	#[rstest]
	fn test_template_from_file() {
		let mut file = NamedTempFile::new().unwrap();
		write!(file, "Subject: {{{{ instance.subject }}}}").unwrap();

		let template = EmailTemplate::load(Some(file.path())).unwrap();

		assert_eq!(
			template.render(&json!({"instance": {"subject": "Quote"}})).unwrap(),
			"Subject: Quote"
		);
	}
}
