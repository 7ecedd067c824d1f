//! Field type registry
//!
//! Maps a stored field-type tag to a factory that builds the runtime field.
//! New field types are added with [`FieldRegistry::register`]; dispatch never
//! changes.

use crate::context::RequestContext;
use crate::definition::{FieldDefinition, tags};
use contact_plus_forms::{
	BooleanField, ChallengeSigner, CharField, DateField, DateTimeField, DecimalField, EmailField,
	FieldError, FileField, FloatField, FormField, IPAddressField, ImageField, IntegerField,
	MathCaptchaField, ReCaptchaField, SharedValidator, Widget, WidgetAttrs,
};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Internal name of the challenge response field
pub const RECAPTCHA_RESPONSE_FIELD: &str = "g_recaptcha_response";

/// Wire name browsers submit the challenge response under
pub const RECAPTCHA_RESPONSE_WIRE_NAME: &str = "g-recaptcha-response";

pub const NO_REFERRAL: &str = "No referral available.";

pub const MISSING_GET_PARAMETER: &str = "n/a";

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
	#[error("Unknown field type: {0}")]
	UnknownFieldType(String),

	#[error("Field type {tag} requires {what}")]
	MissingDependency { tag: String, what: &'static str },

	#[error("Could not build field {label}: {source}")]
	Field {
		label: String,
		#[source]
		source: FieldError,
	},
}

/// Kind of input a runtime field renders as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
	Text,
	Boolean,
	Upload,
	DateTime,
	MultilineText,
	HiddenText,
	ArithmeticChallenge,
	ThirdPartyCaptcha,
}

/// A field built for one request
pub struct RuntimeField {
	pub tag: String,
	pub label: String,
	pub name: String,
	pub primitive: Primitive,
	pub field: Box<dyn FormField>,
}

impl RuntimeField {
	pub fn required(&self) -> bool {
		self.field.required()
	}

	pub fn initial(&self) -> Option<&Value> {
		self.field.initial()
	}

	pub fn widget(&self) -> &Widget {
		self.field.widget()
	}
}

impl fmt::Debug for RuntimeField {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("RuntimeField")
			.field("tag", &self.tag)
			.field("name", &self.name)
			.field("primitive", &self.primitive)
			.field("required", &self.required())
			.finish()
	}
}

/// What a factory may read besides the definition
#[derive(Clone, Copy)]
pub struct BuildContext<'a> {
	pub request: &'a RequestContext,
	pub validators: &'a [SharedValidator],
	pub signer: Option<&'a ChallengeSigner>,
}

impl<'a> BuildContext<'a> {
	pub fn new(request: &'a RequestContext) -> Self {
		Self {
			request,
			validators: &[],
			signer: None,
		}
	}

	pub fn with_validators(mut self, validators: &'a [SharedValidator]) -> Self {
		self.validators = validators;
		self
	}

	pub fn with_signer(mut self, signer: &'a ChallengeSigner) -> Self {
		self.signer = Some(signer);
		self
	}
}

pub type FieldFactory = Arc<
	dyn Fn(&FieldDefinition, &BuildContext<'_>) -> Result<RuntimeField, RegistryError> + Send + Sync,
>;

/// Tag to factory table.
///
/// # Examples
///
/// ```
/// use contact_plus::{BuildContext, FieldDefinition, FieldRegistry, Primitive, RequestContext};
///
/// let registry = FieldRegistry::with_defaults();
/// let request = RequestContext::new();
/// let def = FieldDefinition::new("Message", "auto_Textarea").required();
///
/// let field = registry.build(&def.field_type, &def, &BuildContext::new(&request)).unwrap();
/// assert_eq!(field.name, "message");
/// assert_eq!(field.primitive, Primitive::MultilineText);
/// assert!(field.required());
/// ```
#[derive(Clone, Default)]
pub struct FieldRegistry {
	factories: HashMap<String, FieldFactory>,
}

impl FieldRegistry {
	/// An empty registry
	pub fn new() -> Self {
		Self::default()
	}

	/// A registry with every built-in tag
	pub fn with_defaults() -> Self {
		let mut registry = Self::new();
		for tag in [
			tags::CHAR_FIELD,
			tags::EMAIL_FIELD,
			tags::DECIMAL_FIELD,
			tags::FLOAT_FIELD,
			tags::INTEGER_FIELD,
			tags::IP_ADDRESS_FIELD,
		] {
			registry.register(tag, move |def: &FieldDefinition, _: &BuildContext<'_>| {
				Ok(build_text(tag, def))
			});
		}
		for tag in [tags::FILE_FIELD, tags::IMAGE_FIELD] {
			registry.register(tag, move |def: &FieldDefinition, _: &BuildContext<'_>| {
				Ok(build_upload(tag, def))
			});
		}
		for tag in [tags::DATE_FIELD, tags::DATE_TIME_FIELD] {
			registry.register(tag, move |def: &FieldDefinition, _: &BuildContext<'_>| {
				Ok(build_date(tag, def))
			});
		}
		registry.register(tags::BOOLEAN_FIELD, build_boolean);
		registry.register(tags::TEXTAREA, |def: &FieldDefinition, _: &BuildContext<'_>| {
			Ok(build_textarea(def, &[]))
		});
		registry.register(
			tags::CHAR_FIELD_WITH_VALIDATOR,
			|def: &FieldDefinition, ctx: &BuildContext<'_>| Ok(build_textarea(def, ctx.validators)),
		);
		registry.register(tags::HIDDEN_INPUT, build_hidden_input);
		registry.register(tags::REFERRAL_PAGE, build_referral_page);
		registry.register(tags::GET_PARAMETER, build_get_parameter);
		registry.register(tags::MATH_CAPTCHA, build_math_captcha);
		registry.register(tags::RECAPTCHA, build_recaptcha);
		registry.register(tags::INVISIBLE_RECAPTCHA, build_invisible_recaptcha);
		registry
	}

	/// Add a factory, replacing any factory already registered for `tag`.
	///
	/// Fields built through `tag` always carry `tag`, whatever the
	/// definition's stored type says.
	pub fn register<F>(&mut self, tag: impl Into<String>, factory: F)
	where
		F: Fn(&FieldDefinition, &BuildContext<'_>) -> Result<RuntimeField, RegistryError>
			+ Send
			+ Sync
			+ 'static,
	{
		self.factories.insert(tag.into(), Arc::new(factory));
	}

	pub fn contains(&self, tag: &str) -> bool {
		self.factories.contains_key(tag)
	}

	/// Registered tags, sorted
	pub fn tags(&self) -> Vec<&str> {
		let mut tags: Vec<_> = self.factories.keys().map(String::as_str).collect();
		tags.sort_unstable();
		tags
	}

	pub fn build(
		&self,
		tag: &str,
		definition: &FieldDefinition,
		ctx: &BuildContext<'_>,
	) -> Result<RuntimeField, RegistryError> {
		let factory = self
			.factories
			.get(tag)
			.ok_or_else(|| RegistryError::UnknownFieldType(tag.to_string()))?;
		tracing::debug!(tag, label = %definition.label, "building field");
		let mut field = factory(definition, ctx)?;
		field.tag = tag.to_string();
		Ok(field)
	}
}

impl fmt::Debug for FieldRegistry {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("FieldRegistry")
			.field("tags", &self.tags())
			.finish()
	}
}

fn text_initial(def: &FieldDefinition) -> Option<Value> {
	def.initial.clone().map(Value::String)
}

fn attrs(def: &FieldDefinition) -> WidgetAttrs {
	WidgetAttrs::new(&def.placeholder, &def.css_classes)
}

fn class_only(def: &FieldDefinition) -> WidgetAttrs {
	WidgetAttrs::new("", &def.css_classes)
}

fn runtime(def: &FieldDefinition, primitive: Primitive, field: Box<dyn FormField>) -> RuntimeField {
	RuntimeField {
		tag: def.field_type.clone(),
		label: def.label.clone(),
		name: field.name().to_string(),
		primitive,
		field,
	}
}

fn build_text(tag: &str, def: &FieldDefinition) -> RuntimeField {
	let name = def.key();
	let initial = text_initial(def);
	let field: Box<dyn FormField> = match tag {
		tags::EMAIL_FIELD => Box::new(
			EmailField::new(name)
				.with_label(&def.label)
				.with_required(def.required)
				.with_widget(Widget::TextInput)
				.with_attrs(attrs(def))
				.with_initial_value(initial),
		),
		tags::DECIMAL_FIELD => Box::new(
			DecimalField::new(name)
				.with_label(&def.label)
				.with_required(def.required)
				.with_widget(Widget::TextInput)
				.with_attrs(attrs(def))
				.with_initial_value(initial),
		),
		tags::FLOAT_FIELD => Box::new(
			FloatField::new(name)
				.with_label(&def.label)
				.with_required(def.required)
				.with_widget(Widget::TextInput)
				.with_attrs(attrs(def))
				.with_initial_value(initial),
		),
		tags::INTEGER_FIELD => Box::new(
			IntegerField::new(name)
				.with_label(&def.label)
				.with_required(def.required)
				.with_widget(Widget::TextInput)
				.with_attrs(attrs(def))
				.with_initial_value(initial),
		),
		tags::IP_ADDRESS_FIELD => Box::new(
			IPAddressField::new(name)
				.with_label(&def.label)
				.with_required(def.required)
				.with_attrs(attrs(def))
				.with_initial_value(initial),
		),
		_ => Box::new(
			CharField::new(name)
				.with_label(&def.label)
				.with_required(def.required)
				.with_attrs(attrs(def))
				.with_initial_value(initial),
		),
	};
	runtime(def, Primitive::Text, field)
}

fn build_boolean(
	def: &FieldDefinition,
	_ctx: &BuildContext<'_>,
) -> Result<RuntimeField, RegistryError> {
	let initial = def.initial.as_deref().map(|v| {
		Value::Bool(matches!(
			v.trim().to_lowercase().as_str(),
			"true" | "1" | "on" | "yes"
		))
	});
	let field = BooleanField::new(def.key())
		.with_label(&def.label)
		.with_required(def.required)
		.with_attrs(class_only(def))
		.with_initial_value(initial);
	Ok(runtime(def, Primitive::Boolean, Box::new(field)))
}

fn build_upload(tag: &str, def: &FieldDefinition) -> RuntimeField {
	let field: Box<dyn FormField> = if tag == tags::IMAGE_FIELD {
		Box::new(
			ImageField::new(def.key())
				.with_label(&def.label)
				.with_required(def.required)
				.with_attrs(class_only(def))
				.with_initial_value(text_initial(def)),
		)
	} else {
		Box::new(
			FileField::new(def.key())
				.with_label(&def.label)
				.with_required(def.required)
				.with_attrs(class_only(def))
				.with_initial_value(text_initial(def)),
		)
	};
	runtime(def, Primitive::Upload, field)
}

fn build_date(tag: &str, def: &FieldDefinition) -> RuntimeField {
	let field: Box<dyn FormField> = if tag == tags::DATE_TIME_FIELD {
		Box::new(
			DateTimeField::new(def.key())
				.with_label(&def.label)
				.with_required(def.required)
				.with_attrs(class_only(def))
				.with_initial_value(text_initial(def)),
		)
	} else {
		Box::new(
			DateField::new(def.key())
				.with_label(&def.label)
				.with_required(def.required)
				.with_attrs(class_only(def))
				.with_initial_value(text_initial(def)),
		)
	};
	runtime(def, Primitive::DateTime, field)
}

fn build_textarea(def: &FieldDefinition, validators: &[SharedValidator]) -> RuntimeField {
	let field = CharField::new(def.key())
		.with_label(&def.label)
		.with_required(def.required)
		.with_widget(Widget::Textarea)
		.with_attrs(attrs(def))
		.with_initial_value(text_initial(def))
		.with_validators(validators.to_vec());
	runtime(def, Primitive::MultilineText, Box::new(field))
}

fn hidden(def: &FieldDefinition, name: String, initial: Option<Value>) -> RuntimeField {
	let field = CharField::new(name)
		.with_label(&def.label)
		.with_required(false)
		.with_widget(Widget::HiddenInput)
		.with_initial_value(initial);
	runtime(def, Primitive::HiddenText, Box::new(field))
}

fn build_hidden_input(
	def: &FieldDefinition,
	_ctx: &BuildContext<'_>,
) -> Result<RuntimeField, RegistryError> {
	Ok(hidden(def, def.key(), text_initial(def)))
}

/// The stored initial value is ignored: the referrer always wins
fn build_referral_page(
	def: &FieldDefinition,
	ctx: &BuildContext<'_>,
) -> Result<RuntimeField, RegistryError> {
	let referrer = ctx.request.referrer().unwrap_or(NO_REFERRAL);
	Ok(hidden(def, def.key(), Some(Value::String(referrer.to_string()))))
}

fn build_get_parameter(
	def: &FieldDefinition,
	ctx: &BuildContext<'_>,
) -> Result<RuntimeField, RegistryError> {
	let key = def.key();
	let value = ctx
		.request
		.query_param(&key)
		.unwrap_or(MISSING_GET_PARAMETER)
		.to_string();
	Ok(hidden(def, key, Some(Value::String(value))))
}

fn build_math_captcha(
	def: &FieldDefinition,
	ctx: &BuildContext<'_>,
) -> Result<RuntimeField, RegistryError> {
	let signer = ctx.signer.ok_or_else(|| RegistryError::MissingDependency {
		tag: def.field_type.clone(),
		what: "a signing key",
	})?;
	let field = MathCaptchaField::new(def.key(), signer.clone())
		.map_err(|source| RegistryError::Field {
			label: def.label.clone(),
			source,
		})?
		.with_label(&def.label)
		.with_attrs(class_only(def));
	Ok(runtime(def, Primitive::ArithmeticChallenge, Box::new(field)))
}

/// The widget posts its token as `g-recaptcha-response`, whatever the label
fn build_recaptcha(
	def: &FieldDefinition,
	_ctx: &BuildContext<'_>,
) -> Result<RuntimeField, RegistryError> {
	let field = ReCaptchaField::new(RECAPTCHA_RESPONSE_FIELD.to_string()).with_label(&def.label);
	Ok(runtime(def, Primitive::ThirdPartyCaptcha, Box::new(field)))
}

fn build_invisible_recaptcha(
	def: &FieldDefinition,
	_ctx: &BuildContext<'_>,
) -> Result<RuntimeField, RegistryError> {
	let field = CharField::new(RECAPTCHA_RESPONSE_FIELD.to_string())
		.with_label(RECAPTCHA_RESPONSE_WIRE_NAME)
		.with_required(false)
		.with_widget(Widget::HiddenInput);
	Ok(runtime(def, Primitive::HiddenText, Box::new(field)))
}

#[cfg(test)]
mod tests {
	use super::*;
	use rstest::rstest;
	use serde_json::json;

	#[rstest]
	fn test_unknown_tag_fails() {
		// Arrange
		let registry = FieldRegistry::with_defaults();
		let request = RequestContext::new();
		let def = FieldDefinition::new("Color", "ColorPicker");

		// Act
		let result = registry.build("ColorPicker", &def, &BuildContext::new(&request));

		// Assert
		assert!(matches!(result, Err(RegistryError::UnknownFieldType(tag)) if tag == "ColorPicker"));
	}

	#[rstest]
	fn test_register_replaces_factory() {
		// Arrange
		let mut registry = FieldRegistry::with_defaults();
		registry.register(tags::CHAR_FIELD, |def: &FieldDefinition, _: &BuildContext<'_>| {
			Ok(hidden(def, "custom".to_string(), None))
		});
		let request = RequestContext::new();
		let def = FieldDefinition::new("Name", tags::CHAR_FIELD);

		// Act
		let field = registry
			.build(tags::CHAR_FIELD, &def, &BuildContext::new(&request))
			.unwrap();

		// Assert
		assert_eq!(field.name, "custom");
		assert_eq!(field.primitive, Primitive::HiddenText);
	}

	#[rstest]
	fn test_math_captcha_requires_signer() {
		let registry = FieldRegistry::with_defaults();
		let request = RequestContext::new();
		let def = FieldDefinition::new("Are you human?", tags::MATH_CAPTCHA);

		let result = registry.build(tags::MATH_CAPTCHA, &def, &BuildContext::new(&request));

		assert!(matches!(result, Err(RegistryError::MissingDependency { .. })));
	}

	#[rstest]
	fn test_math_captcha_initial_is_challenge() {
		// Arrange
		let registry = FieldRegistry::with_defaults();
		let request = RequestContext::new();
		let signer = ChallengeSigner::new("secret");
		let def = FieldDefinition::new("Are you human?", tags::MATH_CAPTCHA).with_initial("ignored");

		// Act
		let field = registry
			.build(
				tags::MATH_CAPTCHA,
				&def,
				&BuildContext::new(&request).with_signer(&signer),
			)
			.unwrap();

		// Assert
		let initial = field.initial().unwrap();
		assert!(initial["question"].as_str().unwrap().starts_with("What is"));
		assert!(initial["token"].is_string());
		assert!(field.required());
	}

	#[rstest]
	#[case("true", json!(true))]
	#[case("False", json!(false))]
	fn test_boolean_initial(#[case] stored: &str, #[case] expected: Value) {
		let registry = FieldRegistry::with_defaults();
		let request = RequestContext::new();
		let def = FieldDefinition::new("Subscribe", tags::BOOLEAN_FIELD).with_initial(stored);

		let field = registry
			.build(tags::BOOLEAN_FIELD, &def, &BuildContext::new(&request))
			.unwrap();

		assert_eq!(field.initial(), Some(&expected));
	}

	#[rstest]
	fn test_text_field_carries_widget_attrs() {
		let registry = FieldRegistry::with_defaults();
		let request = RequestContext::new();
		let def = FieldDefinition::new("Email", tags::EMAIL_FIELD)
			.with_placeholder("you@example.com")
			.with_css_classes("form-control");

		let field = registry
			.build(tags::EMAIL_FIELD, &def, &BuildContext::new(&request))
			.unwrap();

		let attrs = field.field.widget_attrs().unwrap();
		assert_eq!(attrs.placeholder.as_deref(), Some("you@example.com"));
		assert_eq!(attrs.class.as_deref(), Some("form-control"));
	}

	#[rstest]
	#[case(tags::EMAIL_FIELD, "not-an-email")]
	#[case(tags::INTEGER_FIELD, "twelve")]
	#[case(tags::DATE_FIELD, "yesterday")]
	fn test_dispatch_tag_decides_field_kind(#[case] tag: &str, #[case] bad_input: &str) {
		// Arrange
		let registry = FieldRegistry::with_defaults();
		let request = RequestContext::new();
		let def = FieldDefinition::new("Value", tags::CHAR_FIELD);

		// Act
		let field = registry.build(tag, &def, &BuildContext::new(&request)).unwrap();

		// Assert
		assert_eq!(field.tag, tag);
		assert!(field.field.clean(Some(&json!(bad_input))).is_err());
	}

	#[rstest]
	fn test_recaptcha_field_uses_response_name() {
		let registry = FieldRegistry::with_defaults();
		let request = RequestContext::new();
		let def = FieldDefinition::new("Robot", tags::RECAPTCHA);

		let field = registry
			.build(tags::RECAPTCHA, &def, &BuildContext::new(&request))
			.unwrap();

		assert_eq!(field.name, RECAPTCHA_RESPONSE_FIELD);
		assert_eq!(field.label, "Robot");
		assert_eq!(field.widget(), &Widget::ReCaptcha);
	}
}
