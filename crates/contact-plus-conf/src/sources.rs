//! Configuration sources for layered settings
//!
//! Sources are merged in priority order
//! (environment variables > config file > defaults).

use indexmap::IndexMap;
use serde_json::Value;
use std::fs;
use std::path::PathBuf;

/// Prefix of environment variables read by [`EnvSource::contact_plus`]
pub const ENV_PREFIX: &str = "CONTACT_PLUS_";

/// Separator for nested keys in environment variable names
pub const NESTING_SEPARATOR: &str = "__";

/// Trait for configuration sources
pub trait ConfigSource: Send + Sync {
	/// Load configuration from this source
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError>;

	/// Get the priority of this source (higher = more important)
	fn priority(&self) -> u8;

	/// Get a description of this source
	fn description(&self) -> String;
}

/// Error type for configuration sources
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),

	#[error("Parse error: {0}")]
	Parse(String),

	#[error("TOML error: {0}")]
	Toml(#[from] toml::de::Error),

	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

/// Environment variable configuration source.
///
/// `CONTACT_PLUS_EMAIL__HOST=smtp.example.com` becomes `email.host`.
pub struct EnvSource {
	prefix: String,
	vars: Option<Vec<(String, String)>>,
}

impl EnvSource {
	/// Read variables with the given prefix
	///
	/// # Examples
	///
	/// ```
	/// use contact_plus_conf::sources::{ConfigSource, EnvSource};
	///
	/// let source = EnvSource::new("MYAPP_");
	/// assert_eq!(source.description(), "Environment variables (prefix: MYAPP_)");
	/// ```
	pub fn new(prefix: impl Into<String>) -> Self {
		Self {
			prefix: prefix.into(),
			vars: None,
		}
	}

	/// Read `CONTACT_PLUS_*` variables
	pub fn contact_plus() -> Self {
		Self::new(ENV_PREFIX)
	}

	/// Use a fixed set of variables instead of the process environment
	pub fn with_vars(mut self, vars: Vec<(String, String)>) -> Self {
		self.vars = Some(vars);
		self
	}

	fn parse_value(value: String) -> Value {
		match value.trim().to_lowercase().as_str() {
			"true" | "yes" | "on" => return Value::Bool(true),
			"false" | "no" | "off" => return Value::Bool(false),
			_ => {}
		}
		if let Ok(num) = value.trim().parse::<i64>() {
			Value::Number(num.into())
		} else {
			Value::String(value)
		}
	}
}

impl Default for EnvSource {
	fn default() -> Self {
		Self::contact_plus()
	}
}

impl ConfigSource for EnvSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		let vars = match &self.vars {
			Some(vars) => vars.clone(),
			None => std::env::vars().collect(),
		};

		let mut config = IndexMap::new();
		for (key, value) in vars {
			let Some(clean_key) = key.strip_prefix(&self.prefix) else {
				continue;
			};
			let path: Vec<String> = clean_key
				.to_lowercase()
				.split(NESTING_SEPARATOR)
				.map(str::to_string)
				.collect();
			if path.iter().any(String::is_empty) {
				tracing::warn!(variable = %key, "ignoring malformed settings variable");
				continue;
			}
			insert_path(&mut config, &path, Self::parse_value(value))?;
		}

		Ok(config)
	}

	fn priority(&self) -> u8 {
		100
	}

	fn description(&self) -> String {
		format!("Environment variables (prefix: {})", self.prefix)
	}
}

fn insert_path(
	config: &mut IndexMap<String, Value>,
	path: &[String],
	value: Value,
) -> Result<(), SourceError> {
	let Some((last, parents)) = path.split_last() else {
		return Ok(());
	};
	let Some((first, rest)) = parents.split_first() else {
		config.insert(last.clone(), value);
		return Ok(());
	};

	let mut node = config
		.entry(first.clone())
		.or_insert_with(|| Value::Object(Default::default()));
	for key in rest {
		node = node
			.as_object_mut()
			.ok_or_else(|| SourceError::Parse(format!("{} is not a table", key)))?
			.entry(key.clone())
			.or_insert_with(|| Value::Object(Default::default()));
	}
	node.as_object_mut()
		.ok_or_else(|| SourceError::Parse(format!("{} is not a table", parents.join("."))))?
		.insert(last.clone(), value);
	Ok(())
}

/// TOML file configuration source. A missing file contributes nothing.
pub struct TomlFileSource {
	path: PathBuf,
}

impl TomlFileSource {
	pub fn new(path: impl Into<PathBuf>) -> Self {
		Self { path: path.into() }
	}
}

impl ConfigSource for TomlFileSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		if !self.path.exists() {
			tracing::debug!(path = %self.path.display(), "settings file not found, skipping");
			return Ok(IndexMap::new());
		}

		let content = fs::read_to_string(&self.path)?;
		let toml_value: toml::Value = toml::from_str(&content)?;
		let json_value = serde_json::to_value(toml_value)?;

		let map = json_value
			.as_object()
			.ok_or_else(|| SourceError::Parse("Expected table at root".to_string()))?;

		Ok(map.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
	}

	fn priority(&self) -> u8 {
		50
	}

	fn description(&self) -> String {
		format!("TOML file: {}", self.path.display())
	}
}

/// In-code values with the lowest priority
#[derive(Default)]
pub struct DefaultSource {
	values: IndexMap<String, Value>,
}

impl DefaultSource {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_value(mut self, key: impl Into<String>, value: Value) -> Self {
		self.values.insert(key.into(), value);
		self
	}
}

impl ConfigSource for DefaultSource {
	fn load(&self) -> Result<IndexMap<String, Value>, SourceError> {
		Ok(self.values.clone())
	}

	fn priority(&self) -> u8 {
		0
	}

	fn description(&self) -> String {
		"Default values".to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;
	use std::fs::File;
	use std::io::Write;
	use tempfile::TempDir;

	fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
		pairs
			.iter()
			.map(|(k, v)| (k.to_string(), v.to_string()))
			.collect()
	}

	#[rstest]
	fn test_env_source_nesting_and_types() {
		// Arrange
		let source = EnvSource::contact_plus().with_vars(vars(&[
			("CONTACT_PLUS_FROM_EMAIL", "forms@example.com"),
			("CONTACT_PLUS_EMAIL__PORT", "587"),
			("CONTACT_PLUS_EMAIL__USE_TLS", "true"),
			("CONTACT_PLUS_RECAPTCHA__PRIVATE_KEY", "6Lc-secret"),
			("UNRELATED", "x"),
		]));

		// Act
		let config = source.load().unwrap();

		// Assert
		assert_eq!(config["from_email"], json!("forms@example.com"));
		assert_eq!(config["email"], json!({"port": 587, "use_tls": true}));
		assert_eq!(config["recaptcha"]["private_key"], json!("6Lc-secret"));
		assert!(!config.contains_key("unrelated"));
	}

	#[rstest]
	fn test_env_source_skips_malformed_keys() {
		let source = EnvSource::contact_plus().with_vars(vars(&[("CONTACT_PLUS_EMAIL____HOST", "x")]));
		assert!(source.load().unwrap().is_empty());
	}

	#[rstest]
	fn test_env_source_scalar_then_table_conflict() {
		let source = EnvSource::contact_plus().with_vars(vars(&[
			("CONTACT_PLUS_EMAIL", "plain"),
			("CONTACT_PLUS_EMAIL__HOST", "smtp.example.com"),
		]));
		assert!(matches!(source.load(), Err(SourceError::Parse(_))));
	}

	#[rstest]
	fn test_toml_source() {
		// Arrange
		let temp_dir = TempDir::new().unwrap();
		let config_path = temp_dir.path().join("contact_plus.toml");
		let mut file = File::create(&config_path).unwrap();
		writeln!(
			file,
			r#"
from_email = "forms@example.com"

[recaptcha]
timeout_secs = 3
"#
		)
		.unwrap();

		// Act
		let config = TomlFileSource::new(&config_path).load().unwrap();

		// Assert
		assert_eq!(config["from_email"], json!("forms@example.com"));
		assert_eq!(config["recaptcha"]["timeout_secs"], json!(3));
	}

	#[rstest]
	fn test_missing_toml_file_is_empty() {
		let config = TomlFileSource::new("/nonexistent/contact_plus.toml")
			.load()
			.unwrap();
		assert!(config.is_empty());
	}

	#[rstest]
	fn test_source_priority() {
		assert_eq!(EnvSource::contact_plus().priority(), 100);
		assert_eq!(TomlFileSource::new("test.toml").priority(), 50);
		assert_eq!(DefaultSource::new().priority(), 0);
	}
}
