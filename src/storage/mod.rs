//! Storage collaborators
//!
//! The engine only needs an ordered read of form configurations and an
//! insert-only write of submission records.

mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use memory::{MemoryFormConfigStore, MemoryRecordStore};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteStore;

use crate::definition::FormConfiguration;
use crate::formatter::SubmissionEntry;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
	#[error("Database error: {0}")]
	Database(String),

	#[error("Serialization error: {0}")]
	Serialization(#[from] serde_json::Error),

	#[error("Corrupt row: {0}")]
	Corrupt(String),
}

#[cfg(feature = "sqlite")]
impl From<sqlx::Error> for StorageError {
	fn from(e: sqlx::Error) -> Self {
		StorageError::Database(e.to_string())
	}
}

/// Durable copy of one accepted submission
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionRecord {
	pub id: Uuid,
	pub form_id: i64,
	pub timestamp: DateTime<Utc>,
	pub entries: Vec<SubmissionEntry>,
}

impl SubmissionRecord {
	pub fn new(form_id: i64, timestamp: DateTime<Utc>, entries: Vec<SubmissionEntry>) -> Self {
		Self {
			id: Uuid::new_v4(),
			form_id,
			timestamp,
			entries,
		}
	}
}

/// Source of form configurations
#[async_trait]
pub trait FormConfigStore: Send + Sync {
	/// The configuration with its fields in display order
	async fn load(&self, form_id: i64) -> Result<Option<FormConfiguration>, StorageError>;

	/// Insert or replace a configuration
	async fn save(&self, config: &FormConfiguration) -> Result<(), StorageError>;
}

/// Insert-only log of accepted submissions
#[async_trait]
pub trait RecordStore: Send + Sync {
	async fn insert(&self, record: &SubmissionRecord) -> Result<(), StorageError>;

	/// Records of one form, oldest first
	async fn list(&self, form_id: i64) -> Result<Vec<SubmissionRecord>, StorageError>;
}
