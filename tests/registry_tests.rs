//! Field registry and dynamic form builder behaviour

use contact_plus::{
	BuildContext, DynamicFormBuilder, FieldDefinition, FieldRegistry, FormConfiguration, Primitive,
	RegistryError, RequestContext, tags,
};
use contact_plus_forms::{ChallengeSigner, FormField, NoUrlsValidator, SharedValidator, Widget};
use rstest::rstest;
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

#[rstest]
#[case(tags::CHAR_FIELD, Primitive::Text, true)]
#[case(tags::EMAIL_FIELD, Primitive::Text, true)]
#[case(tags::DECIMAL_FIELD, Primitive::Text, true)]
#[case(tags::FLOAT_FIELD, Primitive::Text, true)]
#[case(tags::INTEGER_FIELD, Primitive::Text, true)]
#[case(tags::IP_ADDRESS_FIELD, Primitive::Text, true)]
#[case(tags::BOOLEAN_FIELD, Primitive::Boolean, true)]
#[case(tags::FILE_FIELD, Primitive::Upload, true)]
#[case(tags::IMAGE_FIELD, Primitive::Upload, true)]
#[case(tags::DATE_FIELD, Primitive::DateTime, true)]
#[case(tags::DATE_TIME_FIELD, Primitive::DateTime, true)]
#[case(tags::TEXTAREA, Primitive::MultilineText, true)]
#[case(tags::HIDDEN_INPUT, Primitive::HiddenText, false)]
#[case(tags::REFERRAL_PAGE, Primitive::HiddenText, false)]
#[case(tags::GET_PARAMETER, Primitive::HiddenText, false)]
#[case(tags::MATH_CAPTCHA, Primitive::ArithmeticChallenge, true)]
#[case(tags::RECAPTCHA, Primitive::ThirdPartyCaptcha, true)]
#[case(tags::INVISIBLE_RECAPTCHA, Primitive::HiddenText, false)]
#[case(tags::CHAR_FIELD_WITH_VALIDATOR, Primitive::MultilineText, true)]
fn test_registry_table_for_required_definitions(
	#[case] tag: &str,
	#[case] primitive: Primitive,
	#[case] required: bool,
) {
	// Arrange
	let registry = FieldRegistry::with_defaults();
	let request = RequestContext::new();
	let signer = ChallengeSigner::new("test-key");
	let ctx = BuildContext::new(&request).with_signer(&signer);
	let definition = FieldDefinition::new("Some Field", tag).required();

	// Act
	let field = registry.build(tag, &definition, &ctx).unwrap();

	// Assert
	assert_eq!(field.primitive, primitive);
	assert_eq!(field.required(), required);
	assert_eq!(field.tag, tag);
}

#[rstest]
#[case(tags::CHAR_FIELD, false)]
#[case(tags::TEXTAREA, false)]
#[case(tags::MATH_CAPTCHA, true)]
#[case(tags::RECAPTCHA, true)]
fn test_required_flag_follows_definition_unless_forced(#[case] tag: &str, #[case] required: bool) {
	let registry = FieldRegistry::with_defaults();
	let request = RequestContext::new();
	let signer = ChallengeSigner::new("test-key");
	let ctx = BuildContext::new(&request).with_signer(&signer);

	let field = registry
		.build(tag, &FieldDefinition::new("Optional", tag), &ctx)
		.unwrap();

	assert_eq!(field.required(), required);
}

#[rstest]
fn test_every_default_tag_is_registered() {
	let registry = FieldRegistry::with_defaults();
	assert_eq!(registry.tags().len(), 19);
	assert!(!registry.contains("Unknown"));
}

#[rstest]
fn test_unknown_tag_is_an_error() {
	let registry = FieldRegistry::with_defaults();
	let request = RequestContext::new();

	let result = registry.build(
		"Signature",
		&FieldDefinition::new("Sign here", "Signature"),
		&BuildContext::new(&request),
	);

	assert!(matches!(result, Err(RegistryError::UnknownFieldType(t)) if t == "Signature"));
}

#[rstest]
fn test_invisible_recaptcha_field_name() {
	let registry = FieldRegistry::with_defaults();
	let request = RequestContext::new();

	let field = registry
		.build(
			tags::INVISIBLE_RECAPTCHA,
			&FieldDefinition::new("Anything", tags::INVISIBLE_RECAPTCHA),
			&BuildContext::new(&request),
		)
		.unwrap();

	assert_eq!(field.name, "g_recaptcha_response");
	assert_eq!(field.widget(), &Widget::HiddenInput);
}

#[rstest]
#[case(Some("https://example.com/pricing"), "https://example.com/pricing")]
#[case(None, "No referral available.")]
fn test_referral_page_overrides_stored_initial(#[case] referrer: Option<&str>, #[case] expected: &str) {
	// Arrange
	let registry = FieldRegistry::with_defaults();
	let mut request = RequestContext::new();
	if let Some(referrer) = referrer {
		request = request.with_referrer(referrer);
	}
	let definition =
		FieldDefinition::new("Came from", tags::REFERRAL_PAGE).with_initial("stored initial");

	// Act
	let field = registry
		.build(tags::REFERRAL_PAGE, &definition, &BuildContext::new(&request))
		.unwrap();

	// Assert
	assert_eq!(field.initial(), Some(&json!(expected)));
	assert!(!field.required());
}

#[rstest]
#[case(Some("spring-sale"), "spring-sale")]
#[case(None, "n/a")]
fn test_get_parameter_keyed_by_slug(#[case] param: Option<&str>, #[case] expected: &str) {
	// Arrange
	let registry = FieldRegistry::with_defaults();
	let mut request = RequestContext::new().with_query_param("unrelated", "x");
	if let Some(param) = param {
		request = request.with_query_param("utm-campaign", param);
	}
	let definition = FieldDefinition::new("UTM Campaign", tags::GET_PARAMETER).with_initial("ignored");

	// Act
	let field = registry
		.build(tags::GET_PARAMETER, &definition, &BuildContext::new(&request))
		.unwrap();

	// Assert
	assert_eq!(field.name, "utm-campaign");
	assert_eq!(field.initial(), Some(&json!(expected)));
}

#[rstest]
fn test_char_field_with_validator_uses_configured_validators() {
	// Arrange
	let registry = FieldRegistry::with_defaults();
	let request = RequestContext::new();
	let validators: Vec<SharedValidator> = vec![Arc::new(NoUrlsValidator)];
	let ctx = BuildContext::new(&request).with_validators(&validators);

	// Act
	let field = registry
		.build(
			tags::CHAR_FIELD_WITH_VALIDATOR,
			&FieldDefinition::new("Message", tags::CHAR_FIELD_WITH_VALIDATOR),
			&ctx,
		)
		.unwrap();

	// Assert
	assert!(field.field.clean(Some(&json!("visit www.spam.com now"))).is_err());
	assert_eq!(
		field.field.clean(Some(&json!("plain words"))).unwrap(),
		json!("plain words")
	);
}

#[rstest]
fn test_plain_textarea_ignores_configured_validators() {
	let registry = FieldRegistry::with_defaults();
	let request = RequestContext::new();
	let validators: Vec<SharedValidator> = vec![Arc::new(NoUrlsValidator)];
	let ctx = BuildContext::new(&request).with_validators(&validators);

	let field = registry
		.build(tags::TEXTAREA, &FieldDefinition::new("Message", tags::TEXTAREA), &ctx)
		.unwrap();

	assert!(field.field.clean(Some(&json!("see www.example.com"))).is_ok());
}

#[rstest]
fn test_builder_preserves_stored_order() {
	// Arrange
	let config = FormConfiguration::new(1, "Contact", "owner@example.com").with_fields([
		FieldDefinition::new("Message", tags::TEXTAREA).with_position(30),
		FieldDefinition::new("Name", tags::CHAR_FIELD).with_position(10),
		FieldDefinition::new("Email", tags::EMAIL_FIELD).with_position(20),
		FieldDefinition::new("Subscribe", tags::BOOLEAN_FIELD).with_position(20),
	]);

	// Act
	let form = DynamicFormBuilder::default()
		.build(Arc::new(config), &RequestContext::new())
		.unwrap();

	// Assert
	let names: Vec<_> = form.fields().iter().map(|f| f.name.as_str()).collect();
	assert_eq!(names, ["name", "email", "subscribe", "message"]);
	let form_names: Vec<_> = form.form().fields().iter().map(|f| f.name()).collect();
	assert_eq!(form_names, names);
}

#[rstest]
fn test_bound_data_uses_wire_names() {
	// Arrange
	let config = FormConfiguration::new(1, "Contact", "owner@example.com")
		.with_field(FieldDefinition::new("Bot", tags::INVISIBLE_RECAPTCHA));
	let mut form = DynamicFormBuilder::default()
		.build(Arc::new(config), &RequestContext::new())
		.unwrap();

	// Act
	form.bind(HashMap::from([(
		"g-recaptcha-response".to_string(),
		json!("token-123"),
	)]));
	form.form_mut().is_valid();

	// Assert
	assert_eq!(
		form.cleaned_data().get("g_recaptcha_response"),
		Some(&json!("token-123"))
	);
}
