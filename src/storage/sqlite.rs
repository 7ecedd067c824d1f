//! SQLite-backed stores
//!
//! ```sql
//! CREATE TABLE contact_forms (
//!     id INTEGER PRIMARY KEY,
//!     subject TEXT NOT NULL,
//!     recipient_email TEXT NOT NULL,
//!     collect_records INTEGER NOT NULL,
//!     thanks TEXT NOT NULL,
//!     submit_label TEXT NOT NULL
//! );
//! CREATE TABLE contact_fields (
//!     id INTEGER PRIMARY KEY AUTOINCREMENT,
//!     form_id INTEGER NOT NULL REFERENCES contact_forms(id) ON DELETE CASCADE,
//!     label TEXT NOT NULL,
//!     field_type TEXT NOT NULL,
//!     initial TEXT,
//!     placeholder TEXT NOT NULL,
//!     css_classes TEXT NOT NULL,
//!     required INTEGER NOT NULL,
//!     ordering_position INTEGER NOT NULL
//! );
//! CREATE TABLE contact_records (
//!     id TEXT PRIMARY KEY,
//!     form_id INTEGER NOT NULL,
//!     created_at TEXT NOT NULL,
//!     data TEXT NOT NULL
//! );
//! ```

use super::{FormConfigStore, RecordStore, StorageError, SubmissionRecord};
use crate::definition::{FieldDefinition, FormConfiguration};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::sync::Arc;
use uuid::Uuid;

const SCHEMA: [&str; 4] = [
	"CREATE TABLE IF NOT EXISTS contact_forms (
		id INTEGER PRIMARY KEY,
		subject TEXT NOT NULL,
		recipient_email TEXT NOT NULL,
		collect_records INTEGER NOT NULL,
		thanks TEXT NOT NULL,
		submit_label TEXT NOT NULL
	)",
	"CREATE TABLE IF NOT EXISTS contact_fields (
		id INTEGER PRIMARY KEY AUTOINCREMENT,
		form_id INTEGER NOT NULL REFERENCES contact_forms(id) ON DELETE CASCADE,
		label TEXT NOT NULL,
		field_type TEXT NOT NULL,
		initial TEXT,
		placeholder TEXT NOT NULL,
		css_classes TEXT NOT NULL,
		required INTEGER NOT NULL,
		ordering_position INTEGER NOT NULL
	)",
	"CREATE TABLE IF NOT EXISTS contact_records (
		id TEXT PRIMARY KEY,
		form_id INTEGER NOT NULL,
		created_at TEXT NOT NULL,
		data TEXT NOT NULL
	)",
	"CREATE INDEX IF NOT EXISTS idx_contact_records_form_id ON contact_records(form_id)",
];

/// Both stores over one SQLite pool.
///
/// ```rust,no_run
/// use contact_plus::storage::SqliteStore;
///
/// # async fn example() {
/// let store = SqliteStore::new("sqlite://contact_plus.db?mode=rwc").await.unwrap();
/// store.create_tables().await.unwrap();
/// # }
/// # tokio::runtime::Runtime::new().unwrap().block_on(example());
/// ```
#[derive(Debug, Clone)]
pub struct SqliteStore {
	pool: Arc<SqlitePool>,
}

impl SqliteStore {
	pub async fn new(database_url: &str) -> Result<Self, StorageError> {
		let pool = SqlitePool::connect(database_url).await?;
		Ok(Self::from_pool(Arc::new(pool)))
	}

	/// A private in-memory database; one connection so every query sees it
	pub async fn in_memory() -> Result<Self, StorageError> {
		let pool = SqlitePoolOptions::new()
			.max_connections(1)
			.connect("sqlite::memory:")
			.await?;
		Ok(Self::from_pool(Arc::new(pool)))
	}

	pub fn from_pool(pool: Arc<SqlitePool>) -> Self {
		Self { pool }
	}

	pub async fn create_tables(&self) -> Result<(), StorageError> {
		for statement in SCHEMA {
			sqlx::query(statement).execute(&*self.pool).await?;
		}
		Ok(())
	}
}

fn corrupt(column: &str, e: impl std::fmt::Display) -> StorageError {
	StorageError::Corrupt(format!("{}: {}", column, e))
}

#[async_trait]
impl FormConfigStore for SqliteStore {
	async fn load(&self, form_id: i64) -> Result<Option<FormConfiguration>, StorageError> {
		let Some(row) = sqlx::query(
			"SELECT id, subject, recipient_email, collect_records, thanks, submit_label
			 FROM contact_forms WHERE id = ?",
		)
		.bind(form_id)
		.fetch_optional(&*self.pool)
		.await?
		else {
			return Ok(None);
		};

		let mut config = FormConfiguration::new(
			row.try_get("id")?,
			row.try_get::<String, _>("subject")?,
			row.try_get::<String, _>("recipient_email")?,
		)
		.with_collect_records(row.try_get("collect_records")?)
		.with_thanks(row.try_get::<String, _>("thanks")?);
		config.submit_label = row.try_get("submit_label")?;

		let field_rows = sqlx::query(
			"SELECT label, field_type, initial, placeholder, css_classes, required, ordering_position
			 FROM contact_fields WHERE form_id = ? ORDER BY ordering_position, id",
		)
		.bind(form_id)
		.fetch_all(&*self.pool)
		.await?;

		let mut fields = Vec::with_capacity(field_rows.len());
		for row in field_rows {
			fields.push(FieldDefinition {
				label: row.try_get("label")?,
				field_type: row.try_get("field_type")?,
				initial: row.try_get("initial")?,
				placeholder: row.try_get("placeholder")?,
				css_classes: row.try_get("css_classes")?,
				required: row.try_get("required")?,
				ordering_position: row.try_get("ordering_position")?,
			});
		}

		Ok(Some(config.with_fields(fields)))
	}

	async fn save(&self, config: &FormConfiguration) -> Result<(), StorageError> {
		let mut tx = self.pool.begin().await?;

		sqlx::query(
			"INSERT OR REPLACE INTO contact_forms
			 (id, subject, recipient_email, collect_records, thanks, submit_label)
			 VALUES (?, ?, ?, ?, ?, ?)",
		)
		.bind(config.id)
		.bind(&config.subject)
		.bind(&config.recipient_email)
		.bind(config.collect_records)
		.bind(&config.thanks)
		.bind(&config.submit_label)
		.execute(&mut *tx)
		.await?;

		sqlx::query("DELETE FROM contact_fields WHERE form_id = ?")
			.bind(config.id)
			.execute(&mut *tx)
			.await?;

		for field in config.fields() {
			sqlx::query(
				"INSERT INTO contact_fields
				 (form_id, label, field_type, initial, placeholder, css_classes, required, ordering_position)
				 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
			)
			.bind(config.id)
			.bind(&field.label)
			.bind(&field.field_type)
			.bind(&field.initial)
			.bind(&field.placeholder)
			.bind(&field.css_classes)
			.bind(field.required)
			.bind(field.ordering_position)
			.execute(&mut *tx)
			.await?;
		}

		tx.commit().await?;
		Ok(())
	}
}

#[async_trait]
impl RecordStore for SqliteStore {
	async fn insert(&self, record: &SubmissionRecord) -> Result<(), StorageError> {
		let data = serde_json::to_string(&record.entries)?;
		sqlx::query("INSERT INTO contact_records (id, form_id, created_at, data) VALUES (?, ?, ?, ?)")
			.bind(record.id.to_string())
			.bind(record.form_id)
			.bind(record.timestamp.to_rfc3339())
			.bind(data)
			.execute(&*self.pool)
			.await?;
		Ok(())
	}

	async fn list(&self, form_id: i64) -> Result<Vec<SubmissionRecord>, StorageError> {
		let rows = sqlx::query(
			"SELECT id, form_id, created_at, data FROM contact_records
			 WHERE form_id = ? ORDER BY created_at, rowid",
		)
		.bind(form_id)
		.fetch_all(&*self.pool)
		.await?;

		rows.into_iter()
			.map(|row| -> Result<SubmissionRecord, StorageError> {
				let id: String = row.try_get("id")?;
				let created_at: String = row.try_get("created_at")?;
				let data: String = row.try_get("data")?;
				Ok(SubmissionRecord {
					id: Uuid::parse_str(&id).map_err(|e| corrupt("id", e))?,
					form_id: row.try_get("form_id")?,
					timestamp: DateTime::parse_from_rfc3339(&created_at)
						.map(|dt| dt.with_timezone(&Utc))
						.map_err(|e| corrupt("created_at", e))?,
					entries: serde_json::from_str(&data)?,
				})
			})
			.collect()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::definition::tags;
	use crate::formatter::SubmissionEntry;
	use rstest::rstest;

	async fn store() -> SqliteStore {
		let store = SqliteStore::in_memory().await.unwrap();
		store.create_tables().await.unwrap();
		store
	}

	#[rstest]
	#[tokio::test]
	async fn test_config_is_loaded_in_field_order() {
		// Arrange
		let store = store().await;
		let config = FormConfiguration::new(9, "Support", "help@example.com")
			.with_collect_records(true)
			.with_fields([
				FieldDefinition::new("Message", tags::TEXTAREA).with_position(3),
				FieldDefinition::new("Name", tags::CHAR_FIELD)
					.required()
					.with_position(1),
				FieldDefinition::new("Source", tags::HIDDEN_INPUT)
					.with_initial("web")
					.with_position(2),
			]);
		store.save(&config).await.unwrap();

		// Act
		let loaded = store.load(9).await.unwrap().unwrap();

		// Assert
		assert_eq!(loaded, config);
		let labels: Vec<_> = loaded.fields().iter().map(|f| f.label.as_str()).collect();
		assert_eq!(labels, ["Name", "Source", "Message"]);
	}

	#[rstest]
	#[tokio::test]
	async fn test_save_replaces_fields() {
		let store = store().await;
		let first = FormConfiguration::new(1, "A", "a@example.com")
			.with_field(FieldDefinition::new("Old", tags::CHAR_FIELD));
		let second = FormConfiguration::new(1, "B", "a@example.com")
			.with_field(FieldDefinition::new("New", tags::CHAR_FIELD));

		store.save(&first).await.unwrap();
		store.save(&second).await.unwrap();

		let loaded = store.load(1).await.unwrap().unwrap();
		assert_eq!(loaded.subject, "B");
		assert_eq!(loaded.fields().len(), 1);
		assert_eq!(loaded.fields()[0].label, "New");
	}

	#[rstest]
	#[tokio::test]
	async fn test_missing_form() {
		let store = store().await;
		assert!(store.load(404).await.unwrap().is_none());
	}

	#[rstest]
	#[tokio::test]
	async fn test_records_insert_and_list() {
		// Arrange
		let store = store().await;
		let record = SubmissionRecord::new(
			5,
			Utc::now(),
			vec![
				SubmissionEntry::new("Name", "Ana"),
				SubmissionEntry::new("Email", "ana@x.com"),
			],
		);

		// Act
		store.insert(&record).await.unwrap();
		let listed = store.list(5).await.unwrap();

		// Assert
		assert_eq!(listed.len(), 1);
		assert_eq!(listed[0].id, record.id);
		assert_eq!(listed[0].entries, record.entries);
		assert!(store.list(6).await.unwrap().is_empty());
	}
}
