//! End-to-end handling of one submission

use crate::builder::DynamicFormBuilder;
use crate::context::RequestContext;
use crate::contact_form::ContactForm;
use crate::error::ContactError;
use crate::formatter::{SubmissionFormatter, timestamp_prefix};
use crate::notifier::{Notifier, SendReport};
use crate::storage::{FormConfigStore, RecordStore};
use chrono::{DateTime, Utc};
use contact_plus_captcha::{BotVerifier, RecaptchaVerifier};
use contact_plus_conf::{ContactPlusSettings, RecaptchaSettings};
use contact_plus_mail::backend_from_settings;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Result of a submission that reached validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
	/// Valid and sent; soft failures are in the report
	Accepted(SendReport),
	/// Errors keyed by field name, `_all` for form-wide errors
	Rejected(HashMap<String, Vec<String>>),
}

impl SubmissionOutcome {
	pub fn is_accepted(&self) -> bool {
		matches!(self, SubmissionOutcome::Accepted(_))
	}
}

/// Load, build, validate, format and notify.
pub struct SubmissionHandler {
	configs: Arc<dyn FormConfigStore>,
	builder: DynamicFormBuilder,
	verifier: Arc<dyn BotVerifier>,
	recaptcha: RecaptchaSettings,
	formatter: SubmissionFormatter,
	notifier: Notifier,
}

impl SubmissionHandler {
	pub fn new(
		configs: Arc<dyn FormConfigStore>,
		builder: DynamicFormBuilder,
		verifier: Arc<dyn BotVerifier>,
		recaptcha: RecaptchaSettings,
		formatter: SubmissionFormatter,
		notifier: Notifier,
	) -> Self {
		Self {
			configs,
			builder,
			verifier,
			recaptcha,
			formatter,
			notifier,
		}
	}

	/// Wire every collaborator from validated settings.
	///
	/// ```rust,no_run
	/// use contact_plus::{SubmissionHandler, storage::MemoryFormConfigStore};
	/// use contact_plus_conf::SettingsBuilder;
	/// use std::sync::Arc;
	///
	/// let settings = SettingsBuilder::standard("contact_plus.toml").build()?;
	/// let handler = SubmissionHandler::from_settings(
	///     &settings,
	///     Arc::new(MemoryFormConfigStore::new()),
	///     None,
	/// )?;
	/// # Ok::<(), Box<dyn std::error::Error>>(())
	/// ```
	pub fn from_settings(
		settings: &ContactPlusSettings,
		configs: Arc<dyn FormConfigStore>,
		records: Option<Arc<dyn RecordStore>>,
	) -> Result<Self, ContactError> {
		settings.validate()?;

		let verifier = RecaptchaVerifier::from_settings(&settings.recaptcha)
			.map_err(|e| ContactError::ImproperlyConfigured(e.to_string()))?;
		let backend = backend_from_settings(&settings.email)?;
		let mut notifier = Notifier::from_settings(settings, backend)?;
		if let Some(records) = records {
			notifier = notifier.with_record_store(records);
		}

		Ok(Self::new(
			configs,
			DynamicFormBuilder::from_settings(settings)?,
			Arc::new(verifier),
			settings.recaptcha.clone(),
			SubmissionFormatter::from_settings(settings),
			notifier,
		))
	}

	pub fn notifier(&self) -> &Notifier {
		&self.notifier
	}

	/// An unbound form, for rendering
	pub async fn prepare(
		&self,
		form_id: i64,
		request: &RequestContext,
	) -> Result<ContactForm, ContactError> {
		let config = self
			.configs
			.load(form_id)
			.await?
			.ok_or(ContactError::FormNotFound(form_id))?;
		Ok(self.builder.build(Arc::new(config), request)?)
	}

	/// Validate `data` (keyed by wire name) against form `form_id` and send
	/// it when valid, stamped with the current time.
	pub async fn handle(
		&self,
		form_id: i64,
		data: HashMap<String, Value>,
		request: &RequestContext,
	) -> Result<SubmissionOutcome, ContactError> {
		self.handle_at(form_id, data, request, Utc::now()).await
	}

	/// Like [`handle`](Self::handle), for a submission received at
	/// `submitted_at`.
	///
	/// Uploaded files are linked as `{timestamp_prefix(submitted_at)}-{filename}`
	/// and the record carries the same instant, so a caller that stores the
	/// files first passes the instant it named them with.
	///
	/// ```rust,no_run
	/// # use contact_plus::{RequestContext, SubmissionHandler, timestamp_prefix};
	/// # use std::collections::HashMap;
	/// # async fn run(handler: SubmissionHandler) -> Result<(), contact_plus::ContactError> {
	/// let received = chrono::Utc::now();
	/// let stored_as = format!("{}-{}", timestamp_prefix(received), "cv.pdf");
	/// // ... write the upload to media_root/stored_as ...
	/// handler
	///     .handle_at(1, HashMap::new(), &RequestContext::new(), received)
	///     .await?;
	/// # Ok(())
	/// # }
	/// ```
	pub async fn handle_at(
		&self,
		form_id: i64,
		data: HashMap<String, Value>,
		request: &RequestContext,
		submitted_at: DateTime<Utc>,
	) -> Result<SubmissionOutcome, ContactError> {
		let mut form = self.prepare(form_id, request).await?;
		form.bind(data);

		if !form
			.is_valid(request, self.verifier.as_ref(), &self.recaptcha)
			.await?
		{
			tracing::debug!(form_id, errors = form.errors().len(), "submission rejected");
			return Ok(SubmissionOutcome::Rejected(form.errors().clone()));
		}

		let entries = self.formatter.format(
			form.configuration(),
			form.cleaned_data(),
			request,
			&timestamp_prefix(submitted_at),
		);
		let report = self
			.notifier
			.send(form.configuration(), &entries, form.cleaned_data(), submitted_at)
			.await;
		Ok(SubmissionOutcome::Accepted(report))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::definition::{FieldDefinition, FormConfiguration, tags};
	use crate::storage::MemoryFormConfigStore;
	use contact_plus_mail::MemoryBackend;
	use rstest::rstest;
	use serde_json::json;

	fn handler(store: MemoryFormConfigStore) -> SubmissionHandler {
		SubmissionHandler::new(
			Arc::new(store),
			DynamicFormBuilder::default(),
			Arc::new(RecaptchaVerifier::from_settings(&RecaptchaSettings::default()).unwrap()),
			RecaptchaSettings::default(),
			SubmissionFormatter::default(),
			Notifier::new(Arc::new(MemoryBackend::new()), "forms@example.com"),
		)
	}

	#[rstest]
	#[tokio::test]
	async fn test_unknown_form() {
		let result = handler(MemoryFormConfigStore::new())
			.handle(1, HashMap::new(), &RequestContext::new())
			.await;
		assert!(matches!(result, Err(ContactError::FormNotFound(1))));
	}

	#[rstest]
	#[tokio::test]
	async fn test_invalid_data_is_rejected_with_errors() {
		// Arrange
		let store = MemoryFormConfigStore::new().with_form(
			FormConfiguration::new(1, "Contact", "owner@example.com").with_field(
				FieldDefinition::new("Email", tags::EMAIL_FIELD).required(),
			),
		);

		// Act
		let outcome = handler(store)
			.handle(
				1,
				HashMap::from([("email".to_string(), json!("not-an-email"))]),
				&RequestContext::new(),
			)
			.await
			.unwrap();

		// Assert
		match outcome {
			SubmissionOutcome::Rejected(errors) => assert!(errors.contains_key("email")),
			other => panic!("expected rejection, got {:?}", other),
		}
	}

	#[rstest]
	#[tokio::test]
	async fn test_broken_configuration_surfaces_at_prepare() {
		let store = MemoryFormConfigStore::new().with_form(
			FormConfiguration::new(1, "Contact", "owner@example.com")
				.with_field(FieldDefinition::new("Colour", "ColourPicker")),
		);

		let result = handler(store).prepare(1, &RequestContext::new()).await;

		assert!(matches!(result, Err(ContactError::Registry(_))));
	}
}
