//! reCAPTCHA `siteverify` client

use crate::{BotVerifier, VerificationError};
use async_trait::async_trait;
use contact_plus_conf::RecaptchaSettings;
use serde::Deserialize;
use std::time::Duration;

/// Body returned by the verification endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct SiteVerifyResponse {
	pub success: bool,
	#[serde(rename = "error-codes", default)]
	pub error_codes: Vec<String>,
	#[serde(default)]
	pub hostname: Option<String>,
	#[serde(default)]
	pub challenge_ts: Option<String>,
}

/// Posts `secret`, `response` and `remoteip` as a form to the verify URL.
///
/// Transport failures are retried up to `max_retries` times; HTTP and
/// decoding failures are not.
///
/// # Examples
///
/// ```
/// use contact_plus_captcha::RecaptchaVerifier;
/// use std::time::Duration;
///
/// let verifier = RecaptchaVerifier::new(
///     "https://www.google.com/recaptcha/api/siteverify",
///     Duration::from_secs(5),
///     1,
/// )
/// .unwrap();
/// assert_eq!(verifier.max_retries(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct RecaptchaVerifier {
	client: reqwest::Client,
	verify_url: String,
	max_retries: u32,
}

impl RecaptchaVerifier {
	pub fn new(
		verify_url: impl Into<String>,
		timeout: Duration,
		max_retries: u32,
	) -> Result<Self, VerificationError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| VerificationError::Client(e.to_string()))?;

		Ok(Self {
			client,
			verify_url: verify_url.into(),
			max_retries,
		})
	}

	pub fn from_settings(settings: &RecaptchaSettings) -> Result<Self, VerificationError> {
		Self::new(
			settings.verify_url.clone(),
			settings.timeout(),
			settings.max_retries,
		)
	}

	pub fn verify_url(&self) -> &str {
		&self.verify_url
	}

	pub fn max_retries(&self) -> u32 {
		self.max_retries
	}

	async fn post(&self, params: &[(&str, &str)]) -> Result<reqwest::Response, reqwest::Error> {
		let mut attempt = 0;
		loop {
			match self.client.post(&self.verify_url).form(params).send().await {
				Ok(response) => return Ok(response),
				Err(e) if attempt < self.max_retries => {
					attempt += 1;
					tracing::warn!(
						error = %e,
						attempt,
						url = %self.verify_url,
						"verification request failed, retrying"
					);
				}
				Err(e) => return Err(e),
			}
		}
	}
}

#[async_trait]
impl BotVerifier for RecaptchaVerifier {
	async fn verify(
		&self,
		secret: &str,
		response: &str,
		remote_ip: Option<&str>,
	) -> Result<bool, VerificationError> {
		let mut params = vec![("secret", secret), ("response", response)];
		if let Some(ip) = remote_ip {
			params.push(("remoteip", ip));
		}

		let http_response = self.post(&params).await.map_err(|e| {
			tracing::error!(error = %e, url = %self.verify_url, "verification service unreachable");
			VerificationError::Transport(e.to_string())
		})?;

		let status = http_response.status();
		let body = http_response
			.text()
			.await
			.map_err(|e| VerificationError::Transport(e.to_string()))?;

		if !status.is_success() {
			tracing::error!(status = status.as_u16(), body = %body, "verification service returned an error");
			return Err(VerificationError::Status {
				status: status.as_u16(),
				body,
			});
		}

		let verdict: SiteVerifyResponse = serde_json::from_str(&body).map_err(|e| {
			tracing::error!(status = status.as_u16(), body = %body, "unreadable verification response");
			VerificationError::Malformed(e.to_string())
		})?;

		if !verdict.success {
			tracing::error!(
				status = status.as_u16(),
				body = %body,
				error_codes = ?verdict.error_codes,
				"challenge response rejected"
			);
		}
		Ok(verdict.success)
	}
}
