use std::fmt;

/// A plain-text email message with validated addresses.
///
/// All fields are private; construction goes through
/// [`EmailMessageBuilder::build`], which validates every address and header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailMessage {
	subject: String,
	body: String,
	from_email: String,
	to: Vec<String>,
	cc: Vec<String>,
	reply_to: Vec<String>,
	headers: Vec<(String, String)>,
}

impl EmailMessage {
	/// Create a new builder for constructing an `EmailMessage`.
	pub fn builder() -> EmailMessageBuilder {
		EmailMessageBuilder::default()
	}

	pub fn subject(&self) -> &str {
		&self.subject
	}

	pub fn body(&self) -> &str {
		&self.body
	}

	pub fn from_email(&self) -> &str {
		&self.from_email
	}

	pub fn to(&self) -> &[String] {
		&self.to
	}

	pub fn cc(&self) -> &[String] {
		&self.cc
	}

	pub fn reply_to(&self) -> &[String] {
		&self.reply_to
	}

	pub fn headers(&self) -> &[(String, String)] {
		&self.headers
	}

	/// Every address the message is delivered to
	pub fn recipients(&self) -> impl Iterator<Item = &str> {
		self.to.iter().chain(self.cc.iter()).map(String::as_str)
	}

	/// Send the email using the given backend.
	pub async fn send(
		&self,
		backend: &dyn crate::backends::EmailBackend,
	) -> crate::EmailResult<()> {
		backend.send_messages(std::slice::from_ref(self)).await?;
		Ok(())
	}
}

impl fmt::Display for EmailMessage {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		writeln!(f, "From: {}", self.from_email)?;
		writeln!(f, "To: {}", self.to.join(", "))?;
		if !self.cc.is_empty() {
			writeln!(f, "Cc: {}", self.cc.join(", "))?;
		}
		if !self.reply_to.is_empty() {
			writeln!(f, "Reply-To: {}", self.reply_to.join(", "))?;
		}
		for (name, value) in &self.headers {
			writeln!(f, "{}: {}", name, value)?;
		}
		writeln!(f, "Subject: {}", self.subject)?;
		writeln!(f)?;
		write!(f, "{}", self.body)
	}
}

#[derive(Default)]
pub struct EmailMessageBuilder {
	subject: String,
	body: String,
	from_email: String,
	to: Vec<String>,
	cc: Vec<String>,
	reply_to: Vec<String>,
	headers: Vec<(String, String)>,
}

impl EmailMessageBuilder {
	pub fn subject(mut self, subject: impl Into<String>) -> Self {
		self.subject = subject.into();
		self
	}

	pub fn body(mut self, body: impl Into<String>) -> Self {
		self.body = body.into();
		self
	}

	pub fn from(mut self, from: impl Into<String>) -> Self {
		self.from_email = from.into();
		self
	}

	pub fn to(mut self, to: Vec<String>) -> Self {
		self.to = to;
		self
	}

	pub fn cc(mut self, cc: Vec<String>) -> Self {
		self.cc = cc;
		self
	}

	pub fn reply_to(mut self, reply_to: Vec<String>) -> Self {
		self.reply_to = reply_to;
		self
	}

	pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
		self.headers.push((name.into(), value.into()));
		self
	}

	/// Build the email message with validation.
	///
	/// Requires a sender and at least one `to` recipient. Every address is
	/// validated and the subject and header values are checked for header
	/// injection.
	pub fn build(self) -> crate::EmailResult<EmailMessage> {
		use crate::EmailError;
		use crate::validation::{check_header_injection, validate_email, validate_email_list};

		if self.from_email.is_empty() {
			return Err(EmailError::MissingField("from".to_string()));
		}
		if self.to.is_empty() {
			return Err(EmailError::MissingField("to".to_string()));
		}

		validate_email(&self.from_email)?;
		validate_email_list(&self.to)?;
		validate_email_list(&self.cc)?;
		validate_email_list(&self.reply_to)?;

		check_header_injection(&self.subject)?;

		for (name, value) in &self.headers {
			if name.is_empty() || !name.chars().all(|c| c.is_ascii_graphic() && c != ':') {
				return Err(EmailError::HeaderInjection(name.escape_debug().to_string()));
			}
			check_header_injection(value)?;
		}

		Ok(EmailMessage {
			subject: self.subject,
			body: self.body,
			from_email: self.from_email,
			to: self.to,
			cc: self.cc,
			reply_to: self.reply_to,
			headers: self.headers,
		})
	}
}
