//! Layered settings loading

use crate::settings::{ContactPlusSettings, SettingsError};
use crate::sources::{ConfigSource, EnvSource, TomlFileSource};
use serde_json::{Map, Value};
use std::path::Path;

/// Merges configuration sources by priority and produces validated settings.
///
/// # Examples
///
/// ```
/// use contact_plus_conf::SettingsBuilder;
/// use contact_plus_conf::sources::DefaultSource;
/// use serde_json::json;
///
/// let settings = SettingsBuilder::new()
///     .add_source(DefaultSource::new().with_value("subject_prefix", json!("[web] ")))
///     .build()
///     .unwrap();
/// assert_eq!(settings.subject_prefix, "[web] ");
/// ```
#[derive(Default)]
pub struct SettingsBuilder {
	sources: Vec<Box<dyn ConfigSource>>,
}

impl SettingsBuilder {
	pub fn new() -> Self {
		Self::default()
	}

	/// Defaults, then the TOML file, then `CONTACT_PLUS_*` variables
	pub fn standard(path: impl AsRef<Path>) -> Self {
		Self::new()
			.add_source(TomlFileSource::new(path.as_ref()))
			.add_source(EnvSource::contact_plus())
	}

	pub fn add_source(mut self, source: impl ConfigSource + 'static) -> Self {
		self.sources.push(Box::new(source));
		self
	}

	/// Merge all sources into one JSON document
	pub fn merged(&self) -> Result<Value, SettingsError> {
		let mut sources: Vec<&dyn ConfigSource> = self.sources.iter().map(|s| s.as_ref()).collect();
		sources.sort_by_key(|s| s.priority());

		let mut merged = Value::Object(Map::new());
		for source in sources {
			tracing::debug!(source = %source.description(), "loading settings source");
			let layer: Map<String, Value> = source.load()?.into_iter().collect();
			merge(&mut merged, Value::Object(layer));
		}
		Ok(merged)
	}

	/// Deserialize and validate the merged settings.
	pub fn build(&self) -> Result<ContactPlusSettings, SettingsError> {
		let settings: ContactPlusSettings = serde_json::from_value(self.merged()?)?;
		settings.validate()?;
		Ok(settings)
	}
}

/// Tables merge key by key; any other value replaces what was there.
fn merge(base: &mut Value, layer: Value) {
	match (base, layer) {
		(Value::Object(base), Value::Object(layer)) => {
			for (key, value) in layer {
				match base.get_mut(&key) {
					Some(existing) => merge(existing, value),
					None => {
						base.insert(key, value);
					}
				}
			}
		}
		(base, layer) => *base = layer,
	}
}
