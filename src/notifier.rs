//! Delivery of accepted submissions
//!
//! Nothing here fails the submission: email, record and receiver problems are
//! collected as [`SoftFailure`]s and handed to a [`SoftFailureSink`].

use crate::definition::FormConfiguration;
use crate::error::ContactError;
use crate::formatter::SubmissionEntry;
use crate::signals::{ContactMessageSent, Signal, contact_message_sent};
use crate::storage::{RecordStore, SubmissionRecord};
use chrono::{DateTime, Utc};
use contact_plus_conf::ContactPlusSettings;
use contact_plus_mail::{EmailBackend, EmailMessage, EmailResult, EmailTemplate, is_valid_email};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

/// A side effect that did not happen
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SoftFailure {
	#[error("email delivery failed: {0}")]
	EmailDelivery(String),

	#[error("record persistence failed: {0}")]
	RecordPersistence(String),

	#[error("signal receiver failed: {0}")]
	Receiver(String),
}

/// Receives soft failures for logging, metrics or alerting
pub trait SoftFailureSink: Send + Sync {
	fn report(&self, form_id: i64, failure: &SoftFailure);
}

/// Logs every soft failure at `warn`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl SoftFailureSink for TracingSink {
	fn report(&self, form_id: i64, failure: &SoftFailure) {
		tracing::warn!(form_id, error = %failure, "contact submission side effect failed");
	}
}

/// What [`Notifier::send`] managed to do
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendReport {
	pub email_sent: bool,
	pub record_id: Option<Uuid>,
	pub receivers_notified: usize,
	pub failures: Vec<SoftFailure>,
}

impl SendReport {
	pub fn is_clean(&self) -> bool {
		self.failures.is_empty()
	}
}

/// Sends the notification email, stores the record and fires the signal.
pub struct Notifier {
	backend: Arc<dyn EmailBackend>,
	template: EmailTemplate,
	records: Option<Arc<dyn RecordStore>>,
	signal: Signal<ContactMessageSent>,
	sink: Arc<dyn SoftFailureSink>,
	from_email: String,
	subject_prefix: String,
	reply_email_label: Option<String>,
	send_copy_to_reply_email: bool,
}

impl Notifier {
	/// # Examples
	///
	/// ```
	/// use contact_plus::Notifier;
	/// use contact_plus_mail::MemoryBackend;
	/// use std::sync::Arc;
	///
	/// let notifier = Notifier::new(Arc::new(MemoryBackend::new()), "forms@example.com");
	/// assert_eq!(notifier.signal().receiver_count(), 0);
	/// ```
	pub fn new(backend: Arc<dyn EmailBackend>, from_email: impl Into<String>) -> Self {
		Self {
			backend,
			template: EmailTemplate::default(),
			records: None,
			signal: contact_message_sent(),
			sink: Arc::new(TracingSink),
			from_email: from_email.into(),
			subject_prefix: String::new(),
			reply_email_label: None,
			send_copy_to_reply_email: false,
		}
	}

	/// Notifier configured from settings; loads the body template
	pub fn from_settings(
		settings: &ContactPlusSettings,
		backend: Arc<dyn EmailBackend>,
	) -> Result<Self, ContactError> {
		let template = EmailTemplate::load(settings.email_template.as_deref())?;
		Ok(Self::new(backend, settings.from_email.clone())
			.with_template(template)
			.with_subject_prefix(settings.subject_prefix.clone())
			.with_reply_email_label(settings.reply_email_label.clone())
			.with_copy_to_reply_email(settings.send_copy_to_reply_email))
	}

	pub fn with_template(mut self, template: EmailTemplate) -> Self {
		self.template = template;
		self
	}

	pub fn with_record_store(mut self, records: Arc<dyn RecordStore>) -> Self {
		self.records = Some(records);
		self
	}

	pub fn with_signal(mut self, signal: Signal<ContactMessageSent>) -> Self {
		self.signal = signal;
		self
	}

	pub fn with_sink(mut self, sink: Arc<dyn SoftFailureSink>) -> Self {
		self.sink = sink;
		self
	}

	pub fn with_subject_prefix(mut self, prefix: impl Into<String>) -> Self {
		self.subject_prefix = prefix.into();
		self
	}

	/// Field whose cleaned value becomes the Reply-To address
	pub fn with_reply_email_label(mut self, label: Option<String>) -> Self {
		self.reply_email_label = label;
		self
	}

	pub fn with_copy_to_reply_email(mut self, enabled: bool) -> Self {
		self.send_copy_to_reply_email = enabled;
		self
	}

	/// The signal fired after every send; connect receivers here
	pub fn signal(&self) -> &Signal<ContactMessageSent> {
		&self.signal
	}

	fn reply_address(&self, cleaned_data: &HashMap<String, Value>) -> Option<String> {
		let label = self.reply_email_label.as_deref()?;
		let address = cleaned_data.get(label)?.as_str()?.trim();
		if is_valid_email(address) {
			Some(address.to_string())
		} else {
			tracing::debug!(field = label, "reply address is not a valid email, ignoring");
			None
		}
	}

	fn compose(
		&self,
		config: &FormConfiguration,
		entries: &[SubmissionEntry],
		cleaned_data: &HashMap<String, Value>,
	) -> EmailResult<EmailMessage> {
		let body = self.template.render(&json!({
			"data": cleaned_data,
			"ordered_data": entries,
			"instance": config,
		}))?;

		let mut builder = EmailMessage::builder()
			.from(self.from_email.clone())
			.to(vec![config.recipient_email.clone()])
			.subject(format!("{}{}", self.subject_prefix, config.subject))
			.body(body);
		if let Some(reply_to) = self.reply_address(cleaned_data) {
			if self.send_copy_to_reply_email {
				builder = builder.cc(vec![reply_to.clone()]);
			}
			builder = builder.reply_to(vec![reply_to]);
		}
		builder.build()
	}

	fn fail(&self, report: &mut SendReport, form_id: i64, failure: SoftFailure) {
		self.sink.report(form_id, &failure);
		report.failures.push(failure);
	}

	/// Email the submission, store a record when the form collects them and
	/// fire `contact_message_sent`.
	///
	/// The record is stamped with `submitted_at`, the instant upload names
	/// were prefixed with.
	pub async fn send(
		&self,
		config: &FormConfiguration,
		entries: &[SubmissionEntry],
		cleaned_data: &HashMap<String, Value>,
		submitted_at: DateTime<Utc>,
	) -> SendReport {
		let mut report = SendReport::default();

		let delivery = match self.compose(config, entries, cleaned_data) {
			Ok(message) => message.send(self.backend.as_ref()).await,
			Err(e) => Err(e),
		};
		match delivery {
			Ok(()) => report.email_sent = true,
			Err(e) => self.fail(&mut report, config.id, SoftFailure::EmailDelivery(e.to_string())),
		}

		if config.collect_records {
			match &self.records {
				Some(store) => {
					let record = SubmissionRecord::new(config.id, submitted_at, entries.to_vec());
					match store.insert(&record).await {
						Ok(()) => report.record_id = Some(record.id),
						Err(e) => self.fail(
							&mut report,
							config.id,
							SoftFailure::RecordPersistence(e.to_string()),
						),
					}
				}
				None => self.fail(
					&mut report,
					config.id,
					SoftFailure::RecordPersistence("no record store configured".to_string()),
				),
			}
		}

		let results = self
			.signal
			.send_robust(ContactMessageSent {
				form_id: config.id,
				data: cleaned_data.clone(),
			})
			.await;
		for result in results {
			match result {
				Ok(()) => report.receivers_notified += 1,
				Err(e) => self.fail(&mut report, config.id, SoftFailure::Receiver(e.message)),
			}
		}

		tracing::debug!(
			form_id = config.id,
			email_sent = report.email_sent,
			failures = report.failures.len(),
			"contact submission delivered"
		);
		report
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::signals::SignalError;
	use crate::storage::MemoryRecordStore;
	use contact_plus_mail::MemoryBackend;
	use parking_lot::Mutex;
	use rstest::rstest;

	#[derive(Default)]
	struct CollectingSink(Mutex<Vec<SoftFailure>>);

	impl SoftFailureSink for CollectingSink {
		fn report(&self, _form_id: i64, failure: &SoftFailure) {
			self.0.lock().push(failure.clone());
		}
	}

	fn entries() -> Vec<SubmissionEntry> {
		vec![
			SubmissionEntry::new("Name", "Ana"),
			SubmissionEntry::new("Email", "ana@example.com"),
		]
	}

	fn cleaned() -> HashMap<String, Value> {
		HashMap::from([
			("name".to_string(), json!("Ana")),
			("email".to_string(), json!("ana@example.com")),
		])
	}

	#[rstest]
	#[tokio::test]
	async fn test_email_has_subject_body_and_reply_to() {
		// Arrange
		let backend = MemoryBackend::new();
		let notifier = Notifier::new(Arc::new(backend.clone()), "forms@example.com")
			.with_subject_prefix("[Site] ")
			.with_reply_email_label(Some("email".to_string()))
			.with_copy_to_reply_email(true);
		let config = FormConfiguration::new(1, "Contact", "owner@example.com");

		// Act
		let report = notifier.send(&config, &entries(), &cleaned(), Utc::now()).await;

		// Assert
		assert!(report.email_sent);
		assert!(report.is_clean());
		let sent = backend.messages();
		assert_eq!(sent.len(), 1);
		assert_eq!(sent[0].subject(), "[Site] Contact");
		assert_eq!(sent[0].to(), ["owner@example.com".to_string()]);
		assert_eq!(sent[0].reply_to(), ["ana@example.com".to_string()]);
		assert_eq!(sent[0].cc(), ["ana@example.com".to_string()]);
		assert_eq!(sent[0].body(), "Name: Ana\nEmail: ana@example.com\n");
	}

	#[rstest]
	#[tokio::test]
	async fn test_invalid_reply_address_is_ignored() {
		let backend = MemoryBackend::new();
		let notifier = Notifier::new(Arc::new(backend.clone()), "forms@example.com")
			.with_reply_email_label(Some("name".to_string()));
		let config = FormConfiguration::new(1, "Contact", "owner@example.com");

		notifier.send(&config, &entries(), &cleaned(), Utc::now()).await;

		assert!(backend.messages()[0].reply_to().is_empty());
	}

	#[rstest]
	#[tokio::test]
	async fn test_bad_recipient_is_soft_failure() {
		// Arrange
		let sink = Arc::new(CollectingSink::default());
		let records = MemoryRecordStore::new();
		let notifier = Notifier::new(Arc::new(MemoryBackend::new()), "forms@example.com")
			.with_record_store(Arc::new(records.clone()))
			.with_sink(sink.clone());
		let config =
			FormConfiguration::new(1, "Contact", "not an address").with_collect_records(true);

		// Act
		let report = notifier.send(&config, &entries(), &cleaned(), Utc::now()).await;

		// Assert
		assert!(!report.email_sent);
		assert!(matches!(report.failures[..], [SoftFailure::EmailDelivery(_)]));
		assert_eq!(sink.0.lock().len(), 1);
		assert_eq!(records.len(), 1);
		assert!(report.record_id.is_some());
	}

	#[rstest]
	#[tokio::test]
	async fn test_collect_records_without_store() {
		let notifier = Notifier::new(Arc::new(MemoryBackend::new()), "forms@example.com");
		let config =
			FormConfiguration::new(1, "Contact", "owner@example.com").with_collect_records(true);

		let report = notifier.send(&config, &entries(), &cleaned(), Utc::now()).await;

		assert!(report.email_sent);
		assert!(matches!(report.failures[..], [SoftFailure::RecordPersistence(_)]));
	}

	#[rstest]
	#[tokio::test]
	async fn test_signal_carries_cleaned_data() {
		// Arrange
		let notifier = Notifier::new(Arc::new(MemoryBackend::new()), "forms@example.com");
		let seen = Arc::new(Mutex::new(None));
		let slot = Arc::clone(&seen);
		notifier.signal().connect(move |event| {
			let slot = Arc::clone(&slot);
			async move {
				*slot.lock() = Some(event.data.clone());
				Ok(())
			}
		});
		notifier
			.signal()
			.connect(|_| async { Err(SignalError::new("audit log offline")) });
		let config = FormConfiguration::new(2, "Contact", "owner@example.com");

		// Act
		let report = notifier.send(&config, &entries(), &cleaned(), Utc::now()).await;

		// Assert
		assert_eq!(report.receivers_notified, 1);
		assert_eq!(
			report.failures,
			[SoftFailure::Receiver("audit log offline".to_string())]
		);
		assert_eq!(seen.lock().as_ref(), Some(&cleaned()));
	}

	#[rstest]
	#[tokio::test]
	async fn test_record_uses_submission_instant() {
		// Arrange
		let records = MemoryRecordStore::new();
		let notifier = Notifier::new(Arc::new(MemoryBackend::new()), "forms@example.com")
			.with_record_store(Arc::new(records.clone()));
		let config = FormConfiguration::new(1, "Contact", "owner@example.com").with_collect_records(true);
		let submitted_at = DateTime::parse_from_rfc3339("2024-01-01T00:00:00Z")
			.unwrap()
			.with_timezone(&Utc);

		// Act
		notifier.send(&config, &entries(), &cleaned(), submitted_at).await;

		// Assert
		assert_eq!(records.records()[0].timestamp, submitted_at);
	}
}
