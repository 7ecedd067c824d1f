//! Address and header validation

use crate::{EmailError, EmailResult};
use regex::Regex;
use std::sync::LazyLock;

/// RFC 5321 limit on the length of a forward path
pub const MAX_EMAIL_LENGTH: usize = 254;

static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
	Regex::new(
		r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)+$",
	)
	.expect("EMAIL_REGEX: invalid regex pattern")
});

/// Check an address without producing an error value.
///
/// # Examples
///
/// ```
/// use contact_plus_mail::is_valid_email;
///
/// assert!(is_valid_email("ana@example.com"));
/// assert!(!is_valid_email("ana@localhost"));
/// assert!(!is_valid_email("ana example.com"));
/// ```
pub fn is_valid_email(email: &str) -> bool {
	email.len() <= MAX_EMAIL_LENGTH
		&& !email.contains("..")
		&& !email.starts_with('.')
		&& EMAIL_REGEX.is_match(email)
}

/// Validate a single address.
///
/// `localhost` is accepted as a domain so development defaults such as
/// `webmaster@localhost` keep working.
pub fn validate_email(email: &str) -> EmailResult<()> {
	check_header_injection(email)?;
	let is_local = email
		.rsplit_once('@')
		.is_some_and(|(local, domain)| !local.is_empty() && domain == "localhost");
	if is_local || is_valid_email(email) {
		Ok(())
	} else {
		Err(EmailError::InvalidAddress(email.to_string()))
	}
}

pub fn validate_email_list(emails: &[String]) -> EmailResult<()> {
	emails.iter().try_for_each(|e| validate_email(e))
}

/// Reject values that would start a new header line.
pub fn check_header_injection(value: &str) -> EmailResult<()> {
	if value.contains('\r') || value.contains('\n') {
		return Err(EmailError::HeaderInjection(value.escape_debug().to_string()));
	}
	Ok(())
}
