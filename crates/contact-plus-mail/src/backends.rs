//! Email delivery backends

use crate::{EmailError, EmailMessage, EmailResult};
use async_trait::async_trait;
use contact_plus_conf::{EmailSettings, MailBackendKind};
#[cfg(feature = "smtp")]
use contact_plus_conf::ExposeSecret;
use parking_lot::Mutex;
use std::sync::Arc;

/// Delivers messages somewhere.
#[async_trait]
pub trait EmailBackend: Send + Sync {
	/// Send all messages, returning how many were sent.
	async fn send_messages(&self, messages: &[EmailMessage]) -> EmailResult<usize>;
}

/// Keeps sent messages in memory. Clones share the same outbox.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
	outbox: Arc<Mutex<Vec<EmailMessage>>>,
}

impl MemoryBackend {
	pub fn new() -> Self {
		Self::default()
	}

	/// Snapshot of every message sent so far
	pub fn messages(&self) -> Vec<EmailMessage> {
		self.outbox.lock().clone()
	}

	pub fn count(&self) -> usize {
		self.outbox.lock().len()
	}

	pub fn clear(&self) {
		self.outbox.lock().clear();
	}
}

#[async_trait]
impl EmailBackend for MemoryBackend {
	async fn send_messages(&self, messages: &[EmailMessage]) -> EmailResult<usize> {
		self.outbox.lock().extend_from_slice(messages);
		Ok(messages.len())
	}
}

/// Writes messages to stdout, for development.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleBackend;

#[async_trait]
impl EmailBackend for ConsoleBackend {
	async fn send_messages(&self, messages: &[EmailMessage]) -> EmailResult<usize> {
		for message in messages {
			println!("{}", message);
			println!("{}", "-".repeat(79));
		}
		Ok(messages.len())
	}
}

#[cfg(feature = "smtp")]
pub use smtp::{SmtpBackend, SmtpConfig, SmtpSecurity};

#[cfg(feature = "smtp")]
mod smtp {
	use super::*;
	use lettre::message::Mailbox;
	use lettre::message::header::ContentType;
	use lettre::transport::smtp::authentication::Credentials;
	use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
	use std::time::Duration;

	#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
	pub enum SmtpSecurity {
		/// Plain connection, for local relays only
		#[default]
		None,
		StartTls,
		/// Implicit TLS (usually port 465)
		Tls,
	}

	#[derive(Debug, Clone)]
	pub struct SmtpConfig {
		pub host: String,
		pub port: u16,
		pub credentials: Option<(String, String)>,
		pub security: SmtpSecurity,
		pub timeout: Duration,
	}

	impl SmtpConfig {
		pub fn new(host: impl Into<String>, port: u16) -> Self {
			Self {
				host: host.into(),
				port,
				credentials: None,
				security: SmtpSecurity::None,
				timeout: Duration::from_secs(10),
			}
		}

		pub fn with_credentials(mut self, username: String, password: String) -> Self {
			self.credentials = Some((username, password));
			self
		}

		pub fn with_security(mut self, security: SmtpSecurity) -> Self {
			self.security = security;
			self
		}

		pub fn with_timeout(mut self, timeout: Duration) -> Self {
			self.timeout = timeout;
			self
		}
	}

	pub struct SmtpBackend {
		transport: AsyncSmtpTransport<Tokio1Executor>,
	}

	impl SmtpBackend {
		pub fn new(config: SmtpConfig) -> EmailResult<Self> {
			let smtp_err = |e: lettre::transport::smtp::Error| EmailError::SmtpError(e.to_string());

			let mut builder = match config.security {
				SmtpSecurity::None => {
					AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.host)
				}
				SmtpSecurity::StartTls => {
					AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.host)
						.map_err(smtp_err)?
				}
				SmtpSecurity::Tls => {
					AsyncSmtpTransport::<Tokio1Executor>::relay(&config.host).map_err(smtp_err)?
				}
			};
			builder = builder.port(config.port).timeout(Some(config.timeout));
			if let Some((username, password)) = config.credentials {
				builder = builder.credentials(Credentials::new(username, password));
			}

			Ok(Self {
				transport: builder.build(),
			})
		}

		fn to_lettre(message: &EmailMessage) -> EmailResult<Message> {
			let mailbox = |addr: &str| {
				addr.parse::<Mailbox>()
					.map_err(|e| EmailError::InvalidAddress(format!("{}: {}", addr, e)))
			};

			let mut builder = Message::builder()
				.from(mailbox(message.from_email())?)
				.subject(message.subject());
			for to in message.to() {
				builder = builder.to(mailbox(to)?);
			}
			for cc in message.cc() {
				builder = builder.cc(mailbox(cc)?);
			}
			for reply_to in message.reply_to() {
				builder = builder.reply_to(mailbox(reply_to)?);
			}

			builder
				.header(ContentType::TEXT_PLAIN)
				.body(message.body().to_string())
				.map_err(|e| EmailError::BackendError(e.to_string()))
		}
	}

	#[async_trait]
	impl EmailBackend for SmtpBackend {
		async fn send_messages(&self, messages: &[EmailMessage]) -> EmailResult<usize> {
			let mut sent = 0;
			for message in messages {
				let email = Self::to_lettre(message)?;
				self.transport
					.send(email)
					.await
					.map_err(|e| EmailError::SmtpError(e.to_string()))?;
				sent += 1;
			}
			Ok(sent)
		}
	}
}

/// Create the backend named in settings.
///
/// # Examples
///
/// ```
/// use contact_plus_conf::{EmailSettings, MailBackendKind};
/// use contact_plus_mail::backend_from_settings;
///
/// let mut settings = EmailSettings::default();
/// settings.backend = MailBackendKind::Memory;
/// assert!(backend_from_settings(&settings).is_ok());
/// ```
pub fn backend_from_settings(settings: &EmailSettings) -> EmailResult<Arc<dyn EmailBackend>> {
	match settings.backend {
		MailBackendKind::Console => Ok(Arc::new(ConsoleBackend)),
		MailBackendKind::Memory => Ok(Arc::new(MemoryBackend::new())),
		MailBackendKind::Smtp => smtp_from_settings(settings),
	}
}

#[cfg(feature = "smtp")]
fn smtp_from_settings(settings: &EmailSettings) -> EmailResult<Arc<dyn EmailBackend>> {
	let mut config = SmtpConfig::new(settings.host.clone(), settings.port)
		.with_timeout(settings.timeout())
		.with_security(if settings.use_tls {
			SmtpSecurity::StartTls
		} else {
			SmtpSecurity::None
		});
	if let Some(username) = &settings.username {
		let password = settings
			.password
			.as_ref()
			.map(|p| p.expose_secret().to_string())
			.unwrap_or_default();
		config = config.with_credentials(username.clone(), password);
	}
	Ok(Arc::new(SmtpBackend::new(config)?))
}

#[cfg(not(feature = "smtp"))]
fn smtp_from_settings(_settings: &EmailSettings) -> EmailResult<Arc<dyn EmailBackend>> {
	Err(EmailError::BackendError(
		"the smtp backend requires the `smtp` feature".to_string(),
	))
}
