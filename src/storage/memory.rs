//! In-process stores

use super::{FormConfigStore, RecordStore, StorageError, SubmissionRecord};
use crate::definition::FormConfiguration;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

/// Form configurations held in memory. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryFormConfigStore {
	forms: Arc<RwLock<HashMap<i64, FormConfiguration>>>,
}

impl MemoryFormConfigStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_form(self, config: FormConfiguration) -> Self {
		self.forms.write().insert(config.id, config);
		self
	}
}

#[async_trait]
impl FormConfigStore for MemoryFormConfigStore {
	async fn load(&self, form_id: i64) -> Result<Option<FormConfiguration>, StorageError> {
		Ok(self.forms.read().get(&form_id).cloned())
	}

	async fn save(&self, config: &FormConfiguration) -> Result<(), StorageError> {
		self.forms.write().insert(config.id, config.clone());
		Ok(())
	}
}

/// Submission records held in memory. Clones share the same log.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
	records: Arc<RwLock<Vec<SubmissionRecord>>>,
}

impl MemoryRecordStore {
	pub fn new() -> Self {
		Self::default()
	}

	/// Every record, in insertion order
	pub fn records(&self) -> Vec<SubmissionRecord> {
		self.records.read().clone()
	}

	pub fn len(&self) -> usize {
		self.records.read().len()
	}

	pub fn is_empty(&self) -> bool {
		self.records.read().is_empty()
	}
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
	async fn insert(&self, record: &SubmissionRecord) -> Result<(), StorageError> {
		self.records.write().push(record.clone());
		Ok(())
	}

	async fn list(&self, form_id: i64) -> Result<Vec<SubmissionRecord>, StorageError> {
		Ok(self
			.records
			.read()
			.iter()
			.filter(|r| r.form_id == form_id)
			.cloned()
			.collect())
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::formatter::SubmissionEntry;
	use chrono::Utc;
	use rstest::rstest;

	#[rstest]
	#[tokio::test]
	async fn test_records_are_listed_per_form() {
		// Arrange
		let store = MemoryRecordStore::new();
		let entries = vec![SubmissionEntry::new("Name", "Ana")];
		store
			.insert(&SubmissionRecord::new(1, Utc::now(), entries.clone()))
			.await
			.unwrap();
		store
			.insert(&SubmissionRecord::new(2, Utc::now(), entries))
			.await
			.unwrap();

		// Act
		let listed = store.list(1).await.unwrap();

		// Assert
		assert_eq!(listed.len(), 1);
		assert_eq!(listed[0].form_id, 1);
		assert_eq!(store.len(), 2);
	}

	#[rstest]
	#[tokio::test]
	async fn test_config_store_round_trip() {
		let store = MemoryFormConfigStore::new()
			.with_form(FormConfiguration::new(4, "Quote", "sales@example.com"));

		assert_eq!(store.load(4).await.unwrap().unwrap().subject, "Quote");
		assert!(store.load(5).await.unwrap().is_none());
	}
}
