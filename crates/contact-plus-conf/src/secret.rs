//! Credentials in settings
//!
//! Secrets are [`secrecy::SecretString`] values. The helpers here let them be
//! read from any scalar, since environment sources turn all-digit values into
//! numbers.

pub use secrecy::{ExposeSecret, SecretString};

use crate::settings::scalar_string;
use serde::{Deserialize, Deserializer};

/// `true` when the secret is empty or only whitespace
pub fn is_blank(secret: &SecretString) -> bool {
	secret.expose_secret().trim().is_empty()
}

pub(crate) fn optional_secret<'de, D: Deserializer<'de>>(
	deserializer: D,
) -> Result<Option<SecretString>, D::Error> {
	match Option::<serde_json::Value>::deserialize(deserializer)? {
		None | Some(serde_json::Value::Null) => Ok(None),
		Some(value) => scalar_string(value)
			.map(|s| Some(SecretString::from(s)))
			.map_err(serde::de::Error::custom),
	}
}
