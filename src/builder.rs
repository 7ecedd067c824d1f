//! Turns a stored form configuration into a runtime form

use crate::context::RequestContext;
use crate::contact_form::{ContactForm, FieldMeta};
use crate::definition::FormConfiguration;
use crate::error::ContactError;
use crate::registry::{
	BuildContext, FieldRegistry, RECAPTCHA_RESPONSE_FIELD, RECAPTCHA_RESPONSE_WIRE_NAME,
	RegistryError,
};
use contact_plus_conf::{ContactPlusSettings, ExposeSecret};
use contact_plus_forms::{ChallengeSigner, Form, SharedValidator};
use std::sync::Arc;

/// Internal field names and the names browsers submit them under
pub const FIELD_NAME_MAPPING: &[(&str, &str)] =
	&[(RECAPTCHA_RESPONSE_FIELD, RECAPTCHA_RESPONSE_WIRE_NAME)];

/// Builds a [`ContactForm`] per request.
///
/// # Examples
///
/// ```
/// use contact_plus::{DynamicFormBuilder, FieldDefinition, FormConfiguration, RequestContext};
/// use std::sync::Arc;
///
/// let config = FormConfiguration::new(1, "Hello", "owner@example.com")
///     .with_field(FieldDefinition::new("Name", "CharField").required());
///
/// let form = DynamicFormBuilder::default()
///     .build(Arc::new(config), &RequestContext::new())
///     .unwrap();
/// assert_eq!(form.fields()[0].name, "name");
/// ```
#[derive(Debug, Clone)]
pub struct DynamicFormBuilder {
	registry: FieldRegistry,
	validators: Vec<SharedValidator>,
	signer: Option<ChallengeSigner>,
	required_css_class: String,
	field_name_mapping: Vec<(String, String)>,
}

impl Default for DynamicFormBuilder {
	fn default() -> Self {
		Self::new(FieldRegistry::with_defaults())
	}
}

impl DynamicFormBuilder {
	pub fn new(registry: FieldRegistry) -> Self {
		Self {
			registry,
			validators: Vec::new(),
			signer: None,
			required_css_class: "required".to_string(),
			field_name_mapping: FIELD_NAME_MAPPING
				.iter()
				.map(|(internal, wire)| (internal.to_string(), wire.to_string()))
				.collect(),
		}
	}

	/// Builder with validators, signing key and CSS class taken from settings
	pub fn from_settings(settings: &ContactPlusSettings) -> Result<Self, ContactError> {
		let mut builder = Self::default()
			.with_validators(settings.build_validators()?)
			.with_required_css_class(settings.required_css_class.clone());
		if let Some(key) = settings.signing_key() {
			builder = builder.with_signer(ChallengeSigner::new(key.expose_secret()));
		}
		Ok(builder)
	}

	pub fn with_validators(mut self, validators: Vec<SharedValidator>) -> Self {
		self.validators = validators;
		self
	}

	pub fn with_signer(mut self, signer: ChallengeSigner) -> Self {
		self.signer = Some(signer);
		self
	}

	pub fn with_required_css_class(mut self, class: impl Into<String>) -> Self {
		self.required_css_class = class.into();
		self
	}

	/// Submit `internal` under another name
	pub fn map_field_name(mut self, internal: impl Into<String>, wire: impl Into<String>) -> Self {
		self.field_name_mapping.push((internal.into(), wire.into()));
		self
	}

	pub fn registry(&self) -> &FieldRegistry {
		&self.registry
	}

	pub fn registry_mut(&mut self) -> &mut FieldRegistry {
		&mut self.registry
	}

	/// Build every field in stored order.
	///
	/// Fails on the first unknown tag, so a broken configuration is reported
	/// before any submission is accepted.
	pub fn build(
		&self,
		config: Arc<FormConfiguration>,
		request: &RequestContext,
	) -> Result<ContactForm, RegistryError> {
		let mut ctx = BuildContext::new(request).with_validators(&self.validators);
		if let Some(signer) = &self.signer {
			ctx = ctx.with_signer(signer);
		}

		let mut form = Form::new();
		form.set_required_css_class(self.required_css_class.clone());
		for (internal, wire) in &self.field_name_mapping {
			form.map_field_name(internal.clone(), wire.clone());
		}

		let mut fields: Vec<FieldMeta> = Vec::with_capacity(config.fields().len());
		for definition in config.fields() {
			let runtime = self
				.registry
				.build(&definition.field_type, definition, &ctx)?;
			let meta = FieldMeta {
				tag: runtime.tag,
				label: runtime.label,
				name: runtime.name,
				primitive: runtime.primitive,
			};
			match fields.iter().position(|f| f.name == meta.name) {
				Some(pos) => fields[pos] = meta,
				None => fields.push(meta),
			}
			form.add_field(runtime.field);
		}

		tracing::debug!(form_id = config.id, fields = fields.len(), "built contact form");
		Ok(ContactForm::new(form, fields, config))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::definition::{FieldDefinition, tags};
	use crate::registry::Primitive;
	use rstest::rstest;

	fn config(fields: Vec<FieldDefinition>) -> Arc<FormConfiguration> {
		Arc::new(FormConfiguration::new(7, "Contact", "owner@example.com").with_fields(fields))
	}

	#[rstest]
	fn test_unknown_tag_fails_the_whole_form() {
		let builder = DynamicFormBuilder::default();
		let result = builder.build(
			config(vec![
				FieldDefinition::new("Name", tags::CHAR_FIELD),
				FieldDefinition::new("Mood", "MoodRing"),
			]),
			&RequestContext::new(),
		);
		assert!(matches!(result, Err(RegistryError::UnknownFieldType(_))));
	}

	#[rstest]
	fn test_slug_collision_replaces_in_place() {
		// Arrange
		let builder = DynamicFormBuilder::default();

		// Act
		let form = builder
			.build(
				config(vec![
					FieldDefinition::new("Name", tags::CHAR_FIELD).with_position(1),
					FieldDefinition::new("Email", tags::EMAIL_FIELD).with_position(2),
					FieldDefinition::new("name", tags::TEXTAREA).with_position(3),
				]),
				&RequestContext::new(),
			)
			.unwrap();

		// Assert
		let names: Vec<_> = form.fields().iter().map(|f| f.name.as_str()).collect();
		assert_eq!(names, ["name", "email"]);
		assert_eq!(form.fields()[0].primitive, Primitive::MultilineText);
		assert_eq!(form.form().field_count(), 2);
	}

	#[rstest]
	fn test_invisible_recaptcha_uses_wire_name() {
		let builder = DynamicFormBuilder::default();
		let form = builder
			.build(
				config(vec![FieldDefinition::new("Bot check", tags::INVISIBLE_RECAPTCHA)]),
				&RequestContext::new(),
			)
			.unwrap();

		assert_eq!(form.fields()[0].name, RECAPTCHA_RESPONSE_FIELD);
		assert_eq!(
			form.form().html_name(RECAPTCHA_RESPONSE_FIELD),
			RECAPTCHA_RESPONSE_WIRE_NAME
		);
	}

	#[rstest]
	fn test_extra_mapping() {
		let builder = DynamicFormBuilder::default().map_field_name("email", "reply-email");
		let form = builder
			.build(
				config(vec![FieldDefinition::new("Email", tags::EMAIL_FIELD)]),
				&RequestContext::new(),
			)
			.unwrap();

		assert_eq!(form.form().html_name("email"), "reply-email");
	}

	#[rstest]
	fn test_required_css_class_from_settings() {
		// Arrange
		let mut settings = ContactPlusSettings::default();
		settings.required_css_class = "is-required".to_string();
		let builder = DynamicFormBuilder::from_settings(&settings).unwrap();

		// Act
		let form = builder
			.build(
				config(vec![FieldDefinition::new("Name", tags::CHAR_FIELD).required()]),
				&RequestContext::new(),
			)
			.unwrap();

		// Assert
		let bound = form.form().get_bound_field("name").unwrap();
		assert_eq!(bound.css_classes(), "is-required");
	}

	#[rstest]
	fn test_recaptcha_uses_wire_name() {
		let form = DynamicFormBuilder::default()
			.build(
				config(vec![FieldDefinition::new("Robot", tags::RECAPTCHA)]),
				&RequestContext::new(),
			)
			.unwrap();

		assert_eq!(form.fields()[0].name, RECAPTCHA_RESPONSE_FIELD);
		assert_eq!(
			form.form().html_name(RECAPTCHA_RESPONSE_FIELD),
			RECAPTCHA_RESPONSE_WIRE_NAME
		);
	}

	#[rstest]
	#[case(None, false)]
	#[case(Some("  "), false)]
	#[case(Some("signing-key"), true)]
	fn test_signer_from_settings(#[case] key: Option<&str>, #[case] expected: bool) {
		let mut settings = ContactPlusSettings::default();
		settings.secret_key = key.map(|k| contact_plus_conf::SecretString::from(k.to_string()));

		let builder = DynamicFormBuilder::from_settings(&settings).unwrap();

		assert_eq!(builder.signer.is_some(), expected);
	}
}
