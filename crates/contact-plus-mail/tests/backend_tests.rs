//! Memory and console backend tests

use contact_plus_conf::{EmailSettings, MailBackendKind};
use contact_plus_mail::{ConsoleBackend, EmailBackend, EmailMessage, MemoryBackend, backend_from_settings};
use rstest::rstest;

fn message(n: usize) -> EmailMessage {
	EmailMessage::builder()
		.from("webmaster@example.com")
		.to(vec![format!("user{}@example.com", n)])
		.subject(format!("Message {}", n))
		.body("body")
		.build()
		.unwrap()
}

#[rstest]
#[tokio::test]
async fn test_memory_backend_stores_messages() {
	// Arrange
	let backend = MemoryBackend::new();
	let messages: Vec<_> = (1..=3).map(message).collect();

	// Act
	let sent = backend.send_messages(&messages).await.unwrap();

	// Assert
	assert_eq!(sent, 3);
	assert_eq!(backend.count(), 3);
	assert_eq!(backend.messages()[2].subject(), "Message 3");
}

#[rstest]
#[tokio::test]
async fn test_memory_backend_clones_share_outbox() {
	// Arrange
	let backend = MemoryBackend::new();
	let handle = backend.clone();

	// Act
	message(1).send(&backend).await.unwrap();

	// Assert
	assert_eq!(handle.count(), 1);
	handle.clear();
	assert_eq!(backend.count(), 0);
}

#[rstest]
#[tokio::test]
async fn test_console_backend_reports_count() {
	let sent = ConsoleBackend.send_messages(&[message(1), message(2)]).await.unwrap();
	assert_eq!(sent, 2);
}

#[rstest]
#[case(MailBackendKind::Console)]
#[case(MailBackendKind::Memory)]
fn test_backend_from_settings(#[case] kind: MailBackendKind) {
	let settings = EmailSettings {
		backend: kind,
		..EmailSettings::default()
	};
	assert!(backend_from_settings(&settings).is_ok());
}

#[cfg(not(feature = "smtp"))]
#[rstest]
fn test_smtp_backend_requires_feature() {
	let settings = EmailSettings {
		backend: MailBackendKind::Smtp,
		..EmailSettings::default()
	};
	assert!(backend_from_settings(&settings).is_err());
}

#[cfg(feature = "smtp")]
#[rstest]
#[tokio::test]
async fn test_smtp_backend_builds_from_settings() {
	let settings = EmailSettings {
		backend: MailBackendKind::Smtp,
		host: "localhost".to_string(),
		port: 2525,
		..EmailSettings::default()
	};
	assert!(backend_from_settings(&settings).is_ok());
}
