// Text and choice fields
pub mod boolean_field;
pub mod char_field;
pub mod email_field;

// Numeric fields
pub mod decimal_field;
pub mod float_field;
pub mod integer_field;

// Structured fields
pub mod captcha_field;
pub mod date_field;
pub mod datetime_field;
pub mod file_field;
pub mod ip_address_field;

pub use boolean_field::BooleanField;
pub use captcha_field::{ChallengeSigner, MathCaptchaField, MathChallenge, MathOp, ReCaptchaField};
pub use char_field::CharField;
pub use date_field::DateField;
pub use datetime_field::DateTimeField;
pub use decimal_field::DecimalField;
pub use email_field::{EmailField, MAX_EMAIL_LENGTH, is_valid_email};
pub use file_field::{FileField, ImageField, upload_filename};
pub use float_field::FloatField;
pub use integer_field::IntegerField;
pub use ip_address_field::IPAddressField;
