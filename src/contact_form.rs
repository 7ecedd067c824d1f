//! A runtime contact form and its whole-form bot check

use crate::context::RequestContext;
use crate::definition::FormConfiguration;
use crate::error::ContactError;
use crate::registry::{Primitive, RECAPTCHA_RESPONSE_FIELD};
use contact_plus_captcha::BotVerifier;
use contact_plus_conf::{ExposeSecret, RecaptchaSettings};
use contact_plus_forms::{BoundField, Form};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Shown when the verification request failed: unreachable service or an
/// error status
pub const CONNECTION_ERROR_MESSAGE: &str =
	"Sorry, email was not sent. Check your internet connection!";

/// Shown when the verification service did not accept the response
pub const REJECTED_MESSAGE: &str =
	"Sorry, email was not sent. Try again later and please, DO NOT CHEAT!";

/// Where a runtime field came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldMeta {
	pub tag: String,
	pub label: String,
	pub name: String,
	pub primitive: Primitive,
}

/// Fields built from one [`FormConfiguration`] for one request.
pub struct ContactForm {
	form: Form,
	fields: Vec<FieldMeta>,
	config: Arc<FormConfiguration>,
}

impl ContactForm {
	pub(crate) fn new(form: Form, fields: Vec<FieldMeta>, config: Arc<FormConfiguration>) -> Self {
		Self {
			form,
			fields,
			config,
		}
	}

	/// Fields in display order
	pub fn fields(&self) -> &[FieldMeta] {
		&self.fields
	}

	pub fn configuration(&self) -> &FormConfiguration {
		&self.config
	}

	pub fn form(&self) -> &Form {
		&self.form
	}

	pub fn form_mut(&mut self) -> &mut Form {
		&mut self.form
	}

	pub fn bound_fields(&self) -> Vec<BoundField<'_>> {
		self.form.bound_fields()
	}

	/// Bind submitted data, keyed by wire name
	pub fn bind(&mut self, data: HashMap<String, Value>) {
		self.form.bind(data);
	}

	pub fn cleaned_data(&self) -> &HashMap<String, Value> {
		self.form.cleaned_data()
	}

	pub fn errors(&self) -> &HashMap<String, Vec<String>> {
		self.form.errors()
	}

	pub fn non_field_errors(&self) -> &[String] {
		self.form.non_field_errors()
	}

	/// The challenge response to verify, if the form carries one
	fn challenge_response(&self) -> Option<String> {
		let cleaned = self.form.cleaned_data();
		self.fields
			.iter()
			.filter(|f| f.name == RECAPTCHA_RESPONSE_FIELD || f.primitive == Primitive::ThirdPartyCaptcha)
			.find_map(|f| cleaned.get(&f.name))
			.map(|value| value.as_str().unwrap_or_default().trim().to_string())
	}

	/// Clean every field, then check any challenge response with `verifier`.
	///
	/// Verification failures become form errors. A missing private key is an
	/// error of its own, returned before the service is contacted.
	pub async fn is_valid(
		&mut self,
		request: &RequestContext,
		verifier: &dyn BotVerifier,
		settings: &RecaptchaSettings,
	) -> Result<bool, ContactError> {
		if !self.form.is_bound() {
			return Ok(false);
		}
		self.form.is_valid();

		let Some(response) = self.challenge_response() else {
			return Ok(self.form.errors().is_empty());
		};

		let secret = settings.secret().ok_or_else(|| {
			ContactError::ImproperlyConfigured(
				"a challenge response was submitted but recaptcha.private_key is not set".to_string(),
			)
		})?;

		if response.is_empty() {
			tracing::warn!(form_id = self.config.id, "empty challenge response");
			self.form.add_error(None, REJECTED_MESSAGE);
			return Ok(false);
		}

		match verifier
			.verify(secret.expose_secret(), &response, request.client_ip())
			.await
		{
			Ok(true) => {}
			Ok(false) => self.form.add_error(None, REJECTED_MESSAGE),
			Err(e) if e.is_request_failure() => {
				tracing::error!(form_id = self.config.id, error = %e, "verification request failed");
				self.form.add_error(None, CONNECTION_ERROR_MESSAGE);
			}
			Err(e) => {
				tracing::error!(form_id = self.config.id, error = %e, "verification failed");
				self.form.add_error(None, REJECTED_MESSAGE);
			}
		}

		Ok(self.form.errors().is_empty())
	}
}

impl std::fmt::Debug for ContactForm {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ContactForm")
			.field("form_id", &self.config.id)
			.field("fields", &self.fields)
			.field("is_bound", &self.form.is_bound())
			.finish()
	}
}
