//! Form fields, validation and bound-field rendering data for contact forms
//!
//! This crate has no knowledge of where field definitions come from. It
//! provides:
//! - Typed fields that clean `serde_json::Value` submissions
//! - Pluggable text validators
//! - A signed arithmetic challenge and a third-party challenge field
//! - [`Form`], an ordered field collection with wire-name mapping

pub mod bound_field;
pub mod field;
pub mod fields;
pub mod form;
pub mod slug;
pub mod validators;

pub use bound_field::BoundField;
pub use field::{FieldError, FieldResult, FormField, REQUIRED_MESSAGE, Widget, WidgetAttrs};
pub use fields::{
	BooleanField, ChallengeSigner, CharField, DateField, DateTimeField, DecimalField, EmailField,
	FileField, FloatField, IPAddressField, ImageField, IntegerField, MathCaptchaField,
	MathChallenge, MathOp, ReCaptchaField,
};
pub use form::{ALL_FIELDS_KEY, Form};
pub use slug::slugify;
pub use validators::{
	MaxLengthValidator, MinLengthValidator, NoHtmlValidator, NoUrlsValidator,
	ProhibitedWordsValidator, RegexValidator, SharedValidator, Validator,
};
