//! EmailMessage builder validation tests

use contact_plus_mail::{EmailError, EmailMessage};
use rstest::rstest;

fn base() -> contact_plus_mail::EmailMessageBuilder {
	EmailMessage::builder()
		.from("webmaster@example.com")
		.to(vec!["sales@example.com".to_string()])
		.subject("New enquiry")
		.body("Name: Ana")
}

#[rstest]
fn test_builder_minimal_message() {
	// Act
	let message = base().build().unwrap();

	// Assert
	assert_eq!(message.from_email(), "webmaster@example.com");
	assert_eq!(message.to(), ["sales@example.com"]);
	assert_eq!(message.subject(), "New enquiry");
	assert_eq!(message.body(), "Name: Ana");
	assert!(message.cc().is_empty());
	assert!(message.reply_to().is_empty());
}

#[rstest]
fn test_builder_reply_to_and_cc() {
	// Act
	let message = base()
		.reply_to(vec!["ana@example.org".to_string()])
		.cc(vec!["ana@example.org".to_string()])
		.build()
		.unwrap();

	// Assert
	assert_eq!(message.reply_to(), ["ana@example.org"]);
	assert_eq!(
		message.recipients().collect::<Vec<_>>(),
		["sales@example.com", "ana@example.org"]
	);
}

#[rstest]
fn test_builder_accepts_localhost_sender() {
	assert!(base().from("webmaster@localhost").build().is_ok());
}

#[rstest]
#[case::missing_from(EmailMessage::builder().to(vec!["a@example.com".to_string()]))]
#[case::missing_to(EmailMessage::builder().from("a@example.com"))]
fn test_builder_missing_fields(#[case] builder: contact_plus_mail::EmailMessageBuilder) {
	assert!(matches!(builder.build(), Err(EmailError::MissingField(_))));
}

#[rstest]
fn test_builder_rejects_invalid_reply_to() {
	let result = base().reply_to(vec!["not-an-address".to_string()]).build();
	assert!(matches!(result, Err(EmailError::InvalidAddress(_))));
}

#[rstest]
fn test_builder_rejects_subject_injection() {
	let result = base()
		.subject("Hello\r\nBcc: everyone@example.com")
		.build();
	assert!(matches!(result, Err(EmailError::HeaderInjection(_))));
}

#[rstest]
fn test_builder_rejects_bad_header_name() {
	let result = base().header("X-Bad Name", "value").build();
	assert!(matches!(result, Err(EmailError::HeaderInjection(_))));
}

#[rstest]
fn test_display_renders_headers_then_body() {
	let message = base()
		.reply_to(vec!["ana@example.org".to_string()])
		.build()
		.unwrap();

	let rendered = message.to_string();

	assert!(rendered.starts_with("From: webmaster@example.com\nTo: sales@example.com\n"));
	assert!(rendered.contains("Reply-To: ana@example.org\n"));
	assert!(rendered.ends_with("Subject: New enquiry\n\nName: Ana"));
}
