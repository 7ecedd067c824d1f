//! Human-readable rendering of accepted submissions

use crate::context::RequestContext;
use crate::definition::{FormConfiguration, tags};
use chrono::{DateTime, Utc};
use contact_plus_conf::ContactPlusSettings;
use contact_plus_forms::fields::upload_filename;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Shown for fields that have no cleaned value
pub const NO_INPUT: &str = "(no input)";

/// One `label: value` line of a submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionEntry {
	pub label: String,
	pub value: String,
}

impl SubmissionEntry {
	pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
		Self {
			label: label.into(),
			value: value.into(),
		}
	}
}

/// Prefix given to uploaded filenames for a submission received at `now`
pub fn timestamp_prefix(now: DateTime<Utc>) -> String {
	now.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[derive(Debug, Clone)]
pub struct SubmissionFormatter {
	media_url: String,
}

impl Default for SubmissionFormatter {
	fn default() -> Self {
		Self::new("/media/")
	}
}

impl SubmissionFormatter {
	pub fn new(media_url: impl Into<String>) -> Self {
		Self {
			media_url: media_url.into(),
		}
	}

	pub fn from_settings(settings: &ContactPlusSettings) -> Self {
		Self::new(settings.media_url.clone())
	}

	/// Entries in field order, without challenge fields.
	///
	/// # Examples
	///
	/// ```
	/// use contact_plus::{FieldDefinition, FormConfiguration, RequestContext, SubmissionFormatter};
	/// use serde_json::json;
	/// use std::collections::HashMap;
	///
	/// let config = FormConfiguration::new(1, "Hi", "owner@example.com").with_fields([
	///     FieldDefinition::new("Name", "CharField"),
	///     FieldDefinition::new("Phone", "CharField").with_position(1),
	/// ]);
	/// let cleaned = HashMap::from([("name".to_string(), json!("Ana"))]);
	///
	/// let entries = SubmissionFormatter::default().format(&config, &cleaned, &RequestContext::new(), "ts");
	/// assert_eq!(entries[0].value, "Ana");
	/// assert_eq!(entries[1].value, "(no input)");
	/// ```
	pub fn format(
		&self,
		config: &FormConfiguration,
		cleaned_data: &HashMap<String, Value>,
		request: &RequestContext,
		timestamp_prefix: &str,
	) -> Vec<SubmissionEntry> {
		config
			.fields()
			.iter()
			.filter(|def| !def.is_captcha())
			.map(|def| {
				let value = cleaned_data.get(&def.key());
				let display = match value {
					None => NO_INPUT.to_string(),
					Some(value) if tags::is_upload(&def.field_type) => match upload_filename(value) {
						Some(filename) => {
							self.file_url(request.site_host(), timestamp_prefix, filename)
						}
						None => NO_INPUT.to_string(),
					},
					Some(value) => display_value(value),
				};
				SubmissionEntry::new(def.label.clone(), display)
			})
			.collect()
	}

	/// Absolute URL of an uploaded file.
	///
	/// # Examples
	///
	/// ```
	/// use contact_plus::SubmissionFormatter;
	///
	/// let formatter = SubmissionFormatter::new("/media/");
	/// assert_eq!(
	///     formatter.file_url("example.com", "2024-01-01T00:00Z", "photo.png"),
	///     "http://example.com/media/2024-01-01T00%3A00Z-photo.png"
	/// );
	///
	/// let cdn = SubmissionFormatter::new("https://cdn.example.com/u/");
	/// assert_eq!(cdn.file_url("example.com", "ts", "a b.png"), "https://cdn.example.com/u/ts-a b.png");
	/// ```
	pub fn file_url(&self, site_host: &str, timestamp_prefix: &str, filename: &str) -> String {
		let stored = format!("{}-{}", timestamp_prefix, filename);
		if self.media_url.starts_with("http") {
			return format!("{}{}", self.media_url, stored);
		}
		let escaped = stored
			.split('/')
			.map(|segment| urlencoding::encode(segment).into_owned())
			.collect::<Vec<_>>()
			.join("/");
		format!("http://{}{}{}", site_host, self.media_url, escaped)
	}
}

fn display_value(value: &Value) -> String {
	match value {
		Value::Null => String::new(),
		Value::Bool(true) => "True".to_string(),
		Value::Bool(false) => "False".to_string(),
		Value::String(s) => s.clone(),
		other => other.to_string(),
	}
}
