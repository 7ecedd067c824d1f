//! Top-level error type

use crate::registry::RegistryError;
use crate::storage::StorageError;
use contact_plus_conf::SettingsError;
use contact_plus_mail::EmailError;

pub type ContactResult<T> = Result<T, ContactError>;

/// Errors that stop a submission from being handled at all.
///
/// User-facing validation failures are never reported here; they end up in
/// the form's error map.
#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum ContactError {
	/// Deployment problem the operator has to fix
	#[error("Improperly configured: {0}")]
	ImproperlyConfigured(String),

	#[error("Form configuration {0} not found")]
	FormNotFound(i64),

	#[error(transparent)]
	Registry(#[from] RegistryError),

	#[error(transparent)]
	Storage(#[from] StorageError),

	#[error(transparent)]
	Email(#[from] EmailError),

	#[error(transparent)]
	Settings(#[from] SettingsError),
}
