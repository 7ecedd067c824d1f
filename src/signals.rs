//! Observer hook fired after a submission has been sent

use parking_lot::RwLock;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Signal receiver failed: {message}")]
pub struct SignalError {
	pub message: String,
}

impl SignalError {
	pub fn new(message: impl Into<String>) -> Self {
		Self {
			message: message.into(),
		}
	}
}

/// Signal receiver function type
pub type ReceiverFn<T> = Arc<
	dyn Fn(Arc<T>) -> Pin<Box<dyn Future<Output = Result<(), SignalError>> + Send>> + Send + Sync,
>;

struct ReceiverInfo<T: Send + Sync + 'static> {
	receiver: ReceiverFn<T>,
	dispatch_uid: Option<String>,
}

impl<T: Send + Sync + 'static> Clone for ReceiverInfo<T> {
	fn clone(&self) -> Self {
		Self {
			receiver: Arc::clone(&self.receiver),
			dispatch_uid: self.dispatch_uid.clone(),
		}
	}
}

/// Payload of the `contact_message_sent` signal
#[derive(Debug, Clone, PartialEq)]
pub struct ContactMessageSent {
	pub form_id: i64,
	/// Cleaned data keyed by field name
	pub data: HashMap<String, Value>,
}

/// Async receivers for one event type. Clones share receivers.
///
/// # Examples
///
/// ```
/// use contact_plus::signals::{ContactMessageSent, Signal};
///
/// # tokio_test_block_on(async {
/// let signal = Signal::<ContactMessageSent>::new("contact_message_sent");
/// signal.connect(|event| async move {
///     println!("form {} sent", event.form_id);
///     Ok(())
/// });
/// let results = signal
///     .send_robust(ContactMessageSent { form_id: 1, data: Default::default() })
///     .await;
/// assert!(results.iter().all(Result::is_ok));
/// # });
/// # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
/// #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
/// # }
/// ```
pub struct Signal<T: Send + Sync + 'static> {
	receivers: Arc<RwLock<Vec<ReceiverInfo<T>>>>,
	name: String,
}

impl<T: Send + Sync + 'static> Signal<T> {
	pub fn new(name: impl Into<String>) -> Self {
		Self {
			receivers: Arc::new(RwLock::new(Vec::new())),
			name: name.into(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	/// Connect a receiver
	pub fn connect<F, Fut>(&self, receiver: F)
	where
		F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<(), SignalError>> + Send + 'static,
	{
		self.connect_with_uid(receiver, None);
	}

	/// Connect a receiver, replacing any receiver registered under the same uid
	pub fn connect_with_uid<F, Fut>(&self, receiver: F, dispatch_uid: Option<String>)
	where
		F: Fn(Arc<T>) -> Fut + Send + Sync + 'static,
		Fut: Future<Output = Result<(), SignalError>> + Send + 'static,
	{
		let boxed: ReceiverFn<T> = Arc::new(move |instance| Box::pin(receiver(instance)));
		let mut receivers = self.receivers.write();

		if let Some(ref uid) = dispatch_uid {
			receivers.retain(|r| r.dispatch_uid.as_ref() != Some(uid));
		}
		receivers.push(ReceiverInfo {
			receiver: boxed,
			dispatch_uid,
		});
	}

	pub fn disconnect(&self, dispatch_uid: &str) -> bool {
		let mut receivers = self.receivers.write();
		let original_len = receivers.len();
		receivers.retain(|r| r.dispatch_uid.as_deref() != Some(dispatch_uid));
		receivers.len() < original_len
	}

	/// Run every receiver in connection order, collecting each result.
	///
	/// A failing receiver does not stop the others.
	pub async fn send_robust(&self, instance: T) -> Vec<Result<(), SignalError>> {
		let instance = Arc::new(instance);
		let receivers = self.receivers.read().clone();

		let mut results = Vec::with_capacity(receivers.len());
		for receiver_info in receivers {
			results.push((receiver_info.receiver)(Arc::clone(&instance)).await);
		}
		results
	}

	pub fn receiver_count(&self) -> usize {
		self.receivers.read().len()
	}

	pub fn disconnect_all(&self) {
		self.receivers.write().clear();
	}
}

impl<T: Send + Sync + 'static> Clone for Signal<T> {
	fn clone(&self) -> Self {
		Self {
			receivers: Arc::clone(&self.receivers),
			name: self.name.clone(),
		}
	}
}

impl<T: Send + Sync + 'static> fmt::Debug for Signal<T> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.debug_struct("Signal")
			.field("name", &self.name)
			.field("receiver_count", &self.receiver_count())
			.finish()
	}
}

/// Signal fired once per sent contact message
pub fn contact_message_sent() -> Signal<ContactMessageSent> {
	Signal::new("contact_message_sent")
}
