//! Human-verification fields
//!
//! [`MathCaptchaField`] is self-contained: the expected answer travels with
//! the form as an HMAC-signed token, so no server-side state is needed.
//! [`ReCaptchaField`] only checks that the widget produced a response; the
//! response is verified against the third-party service at form level.

use crate::field::{FieldError, FieldResult, FormField, Widget, WidgetAttrs, optional_str};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;
use std::fmt;

type HmacSha256 = Hmac<Sha256>;

const WRONG_ANSWER: &str = "Check your math and try again.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathOp {
	Add,
	Subtract,
	Multiply,
}

impl MathOp {
	fn symbol(&self) -> &'static str {
		match self {
			MathOp::Add => "+",
			MathOp::Subtract => "-",
			MathOp::Multiply => "×",
		}
	}
}

/// An arithmetic question with a small positive answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MathChallenge {
	pub left: i64,
	pub right: i64,
	pub op: MathOp,
}

impl MathChallenge {
	pub fn new(left: i64, right: i64, op: MathOp) -> Self {
		Self { left, right, op }
	}

	/// Random challenge; subtraction never goes negative.
	pub fn random() -> Self {
		let mut rng = rand::thread_rng();
		match rng.gen_range(0..3) {
			0 => Self::new(rng.gen_range(1..=10), rng.gen_range(1..=10), MathOp::Add),
			1 => {
				let a = rng.gen_range(1..=10);
				let b = rng.gen_range(1..=10);
				Self::new(a.max(b), a.min(b), MathOp::Subtract)
			}
			_ => Self::new(rng.gen_range(1..=5), rng.gen_range(1..=5), MathOp::Multiply),
		}
	}

	pub fn answer(&self) -> i64 {
		match self.op {
			MathOp::Add => self.left + self.right,
			MathOp::Subtract => self.left - self.right,
			MathOp::Multiply => self.left * self.right,
		}
	}

	/// # Examples
	///
	/// ```
	/// use contact_plus_forms::fields::{MathChallenge, MathOp};
	///
	/// assert_eq!(MathChallenge::new(3, 4, MathOp::Add).question(), "What is 3 + 4?");
	/// ```
	pub fn question(&self) -> String {
		format!("What is {} {} {}?", self.left, self.op.symbol(), self.right)
	}
}

/// Signs and checks challenge answers.
#[derive(Clone)]
pub struct ChallengeSigner {
	key: Vec<u8>,
}

impl fmt::Debug for ChallengeSigner {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("ChallengeSigner")
			.field("key", &"[REDACTED]")
			.finish()
	}
}

impl ChallengeSigner {
	pub fn new(key: impl AsRef<[u8]>) -> Self {
		Self {
			key: key.as_ref().to_vec(),
		}
	}

	fn mac(&self, nonce: &str, answer: i64) -> FieldResult<HmacSha256> {
		let mut mac = HmacSha256::new_from_slice(&self.key)
			.map_err(|e| FieldError::invalid(format!("captcha key rejected: {}", e)))?;
		mac.update(nonce.as_bytes());
		mac.update(b":");
		mac.update(answer.to_string().as_bytes());
		Ok(mac)
	}

	/// Produce a `nonce.signature` token for the expected answer.
	pub fn sign(&self, answer: i64) -> FieldResult<String> {
		let nonce = format!("{:016x}", rand::thread_rng().r#gen::<u64>());
		let signature = self.mac(&nonce, answer)?.finalize().into_bytes();
		Ok(format!("{}.{}", nonce, URL_SAFE_NO_PAD.encode(signature)))
	}

	/// Constant-time check of `answer` against a token from [`sign`](Self::sign).
	///
	/// # Examples
	///
	/// ```
	/// use contact_plus_forms::fields::ChallengeSigner;
	///
	/// let signer = ChallengeSigner::new("site-secret");
	/// let token = signer.sign(12).unwrap();
	/// assert!(signer.verify(&token, 12));
	/// assert!(!signer.verify(&token, 13));
	/// assert!(!ChallengeSigner::new("other").verify(&token, 12));
	/// ```
	pub fn verify(&self, token: &str, answer: i64) -> bool {
		let Some((nonce, signature)) = token.split_once('.') else {
			return false;
		};
		let Ok(signature) = URL_SAFE_NO_PAD.decode(signature) else {
			return false;
		};
		self.mac(nonce, answer)
			.map(|mac| mac.verify_slice(&signature).is_ok())
			.unwrap_or(false)
	}
}

/// Arithmetic challenge field. Always required.
///
/// The initial value is `{"question": ..., "token": ...}`; a submission must
/// send back `{"answer": ..., "token": ...}`.
#[derive(Debug, Clone)]
pub struct MathCaptchaField {
	pub name: String,
	pub label: Option<String>,
	pub widget: Widget,
	pub attrs: WidgetAttrs,
	pub challenge: MathChallenge,
	initial: serde_json::Value,
	signer: ChallengeSigner,
}

impl MathCaptchaField {
	/// Create a field with a fresh random challenge
	pub fn new(name: String, signer: ChallengeSigner) -> FieldResult<Self> {
		Self::with_challenge(name, signer, MathChallenge::random())
	}

	pub fn with_challenge(
		name: String,
		signer: ChallengeSigner,
		challenge: MathChallenge,
	) -> FieldResult<Self> {
		let token = signer.sign(challenge.answer())?;
		Ok(Self {
			name,
			label: None,
			widget: Widget::MathCaptchaInput,
			attrs: WidgetAttrs::default(),
			challenge,
			initial: serde_json::json!({
				"question": challenge.question(),
				"token": token,
			}),
			signer,
		})
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}

	pub fn with_attrs(mut self, attrs: WidgetAttrs) -> Self {
		self.attrs = attrs;
		self
	}

	fn parse_answer(value: &serde_json::Value) -> FieldResult<Option<i64>> {
		match value {
			serde_json::Value::Number(n) => n
				.as_i64()
				.map(Some)
				.ok_or_else(|| FieldError::invalid("Enter a whole number.")),
			serde_json::Value::String(s) if s.trim().is_empty() => Ok(None),
			serde_json::Value::String(s) => s
				.trim()
				.parse::<i64>()
				.map(Some)
				.map_err(|_| FieldError::invalid("Enter a whole number.")),
			serde_json::Value::Null => Ok(None),
			_ => Err(FieldError::invalid("Enter a whole number.")),
		}
	}
}

impl FormField for MathCaptchaField {
	fn name(&self) -> &str {
		&self.name
	}

	fn label(&self) -> Option<&str> {
		self.label.as_deref()
	}

	fn required(&self) -> bool {
		true
	}

	fn help_text(&self) -> Option<&str> {
		None
	}

	fn widget(&self) -> &Widget {
		&self.widget
	}

	fn widget_attrs(&self) -> Option<&WidgetAttrs> {
		(!self.attrs.is_empty()).then_some(&self.attrs)
	}

	fn initial(&self) -> Option<&serde_json::Value> {
		Some(&self.initial)
	}

	fn clean(&self, value: Option<&serde_json::Value>) -> FieldResult<serde_json::Value> {
		let Some(obj) = value.and_then(|v| v.as_object()) else {
			return Err(FieldError::required(None));
		};

		let answer = match obj.get("answer") {
			Some(a) => Self::parse_answer(a)?,
			None => None,
		};
		let Some(answer) = answer else {
			return Err(FieldError::required(None));
		};

		let token = obj.get("token").and_then(|t| t.as_str()).unwrap_or_default();
		if !self.signer.verify(token, answer) {
			return Err(FieldError::validation(WRONG_ANSWER));
		}

		Ok(serde_json::json!(answer))
	}
}

/// Third-party challenge widget field. Always required.
#[derive(Debug, Clone)]
pub struct ReCaptchaField {
	pub name: String,
	pub label: Option<String>,
	pub widget: Widget,
}

impl ReCaptchaField {
	pub fn new(name: String) -> Self {
		Self {
			name,
			label: None,
			widget: Widget::ReCaptcha,
		}
	}

	pub fn with_label(mut self, label: impl Into<String>) -> Self {
		self.label = Some(label.into());
		self
	}
}

impl FormField for ReCaptchaField {
	fn name(&self) -> &str {
		&self.name
	}

	fn label(&self) -> Option<&str> {
		self.label.as_deref()
	}

	fn required(&self) -> bool {
		true
	}

	fn widget(&self) -> &Widget {
		&self.widget
	}

	fn initial(&self) -> Option<&serde_json::Value> {
		None
	}

	fn clean(&self, value: Option<&serde_json::Value>) -> FieldResult<serde_json::Value> {
		match optional_str(value)? {
			Some(response) => Ok(serde_json::Value::String(response.to_string())),
			None => Err(FieldError::required(None)),
		}
	}
}
