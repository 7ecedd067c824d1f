//! # contact-plus
//!
//! Schema-driven contact forms. An administrator stores a list of field
//! definitions; this crate turns them into a runtime form per request,
//! validates submissions (including an optional bot check), renders the
//! accepted data as ordered `label: value` entries, emails it, optionally
//! keeps a record and fires a `contact_message_sent` signal.
//!
//! ## Feature Flags
//!
//! - `sqlite` (default) - [`storage::SqliteStore`] for configurations and records
//! - `smtp` - SMTP delivery through lettre
//! - `full` - everything
//!
//! ## Pipeline
//!
//! ```text
//! FormConfigStore -> DynamicFormBuilder -> ContactForm::is_valid
//!     -> SubmissionFormatter -> Notifier (email, RecordStore, signal)
//! ```
//!
//! [`SubmissionHandler`] runs the whole pipeline.
//!
//! ## Quick Example
//!
//! ```rust
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use contact_plus::storage::{MemoryFormConfigStore, MemoryRecordStore};
//! use contact_plus::*;
//! use contact_plus_captcha::RecaptchaVerifier;
//! use contact_plus_conf::RecaptchaSettings;
//! use contact_plus_mail::MemoryBackend;
//! use serde_json::json;
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! let config = FormConfiguration::new(1, "New enquiry", "sales@example.com")
//!     .with_field(FieldDefinition::new("Name", "CharField").required());
//! let outbox = MemoryBackend::new();
//!
//! let handler = SubmissionHandler::new(
//!     Arc::new(MemoryFormConfigStore::new().with_form(config)),
//!     DynamicFormBuilder::default(),
//!     Arc::new(RecaptchaVerifier::from_settings(&RecaptchaSettings::default())?),
//!     RecaptchaSettings::default(),
//!     SubmissionFormatter::default(),
//!     Notifier::new(Arc::new(outbox.clone()), "webmaster@localhost"),
//! );
//!
//! let data = HashMap::from([("name".to_string(), json!("Ana"))]);
//! let outcome = handler.handle(1, data, &RequestContext::new()).await?;
//!
//! assert!(outcome.is_accepted());
//! assert_eq!(outbox.messages()[0].body(), "Name: Ana\n");
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod contact_form;
pub mod context;
pub mod definition;
pub mod error;
pub mod formatter;
pub mod notifier;
pub mod registry;
pub mod signals;
pub mod storage;
pub mod submission;

pub use builder::{DynamicFormBuilder, FIELD_NAME_MAPPING};
pub use contact_form::{CONNECTION_ERROR_MESSAGE, ContactForm, FieldMeta, REJECTED_MESSAGE};
pub use context::RequestContext;
pub use definition::{FieldDefinition, FormConfiguration, tags};
pub use error::{ContactError, ContactResult};
pub use formatter::{NO_INPUT, SubmissionEntry, SubmissionFormatter, timestamp_prefix};
pub use notifier::{Notifier, SendReport, SoftFailure, SoftFailureSink, TracingSink};
pub use registry::{
	BuildContext, FieldFactory, FieldRegistry, Primitive, RegistryError, RuntimeField,
};
pub use signals::{ContactMessageSent, Signal, SignalError};
pub use storage::{FormConfigStore, RecordStore, StorageError, SubmissionRecord};
pub use submission::{SubmissionHandler, SubmissionOutcome};
