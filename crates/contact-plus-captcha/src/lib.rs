//! # contact-plus captcha
//!
//! Server-side verification of third-party challenge responses.
//!
//! [`BotVerifier`] is the seam the form layer talks to; [`RecaptchaVerifier`]
//! implements it against a `siteverify`-style endpoint.

pub mod recaptcha;

use async_trait::async_trait;

pub use recaptcha::{RecaptchaVerifier, SiteVerifyResponse};

#[non_exhaustive]
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
	/// The service could not be reached or did not answer in time
	#[error("Verification service unreachable: {0}")]
	Transport(String),

	#[error("Verification service returned status {status}: {body}")]
	Status { status: u16, body: String },

	#[error("Malformed verification response: {0}")]
	Malformed(String),

	#[error("Client configuration error: {0}")]
	Client(String),
}

impl VerificationError {
	/// Whether trying again later could succeed
	pub fn is_transport(&self) -> bool {
		matches!(self, VerificationError::Transport(_))
	}

	/// The request itself failed, as opposed to the service answering with
	/// something other than a verdict
	pub fn is_request_failure(&self) -> bool {
		matches!(
			self,
			VerificationError::Transport(_)
				| VerificationError::Status { .. }
				| VerificationError::Client(_)
		)
	}
}

/// Checks a challenge response with the issuing service.
///
/// `Ok(false)` is a negative verdict; errors mean no verdict was obtained.
#[async_trait]
pub trait BotVerifier: Send + Sync {
	async fn verify(
		&self,
		secret: &str,
		response: &str,
		remote_ip: Option<&str>,
	) -> Result<bool, VerificationError>;
}
