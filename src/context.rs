//! Per-request values the engine reads but never changes

use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Host used when the caller does not say which site served the form
pub const DEFAULT_SITE_HOST: &str = "localhost";

/// Read-only view of the incoming request.
///
/// Built once by the caller's web layer and passed down to the builder,
/// validator and formatter.
///
/// # Examples
///
/// ```
/// use contact_plus::RequestContext;
///
/// let ctx = RequestContext::new()
///     .with_remote_addr("10.0.0.1")
///     .with_forwarded_for("203.0.113.9, 10.0.0.1")
///     .with_query_param("utm-source", "newsletter");
///
/// assert_eq!(ctx.client_ip(), Some("203.0.113.9"));
/// assert_eq!(ctx.query_param("utm-source"), Some("newsletter"));
/// ```
#[derive(Debug, Clone)]
pub struct RequestContext {
	remote_addr: Option<String>,
	forwarded_for: Option<String>,
	referrer: Option<String>,
	query: HashMap<String, String>,
	upload_dir: Option<PathBuf>,
	site_host: String,
}

impl Default for RequestContext {
	fn default() -> Self {
		Self {
			remote_addr: None,
			forwarded_for: None,
			referrer: None,
			query: HashMap::new(),
			upload_dir: None,
			site_host: DEFAULT_SITE_HOST.to_string(),
		}
	}
}

impl RequestContext {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn with_remote_addr(mut self, addr: impl Into<String>) -> Self {
		self.remote_addr = Some(addr.into());
		self
	}

	/// Raw `X-Forwarded-For` header value
	pub fn with_forwarded_for(mut self, value: impl Into<String>) -> Self {
		self.forwarded_for = Some(value.into());
		self
	}

	/// `Referer` header value
	pub fn with_referrer(mut self, referrer: impl Into<String>) -> Self {
		self.referrer = Some(referrer.into());
		self
	}

	pub fn with_query_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
		self.query.insert(key.into(), value.into());
		self
	}

	pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
		self.query = query;
		self
	}

	/// Directory uploaded files were saved to
	pub fn with_upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
		self.upload_dir = Some(dir.into());
		self
	}

	pub fn with_site_host(mut self, host: impl Into<String>) -> Self {
		self.site_host = host.into();
		self
	}

	pub fn remote_addr(&self) -> Option<&str> {
		self.remote_addr.as_deref()
	}

	pub fn forwarded_for(&self) -> Option<&str> {
		self.forwarded_for.as_deref()
	}

	pub fn referrer(&self) -> Option<&str> {
		non_blank(self.referrer.as_deref())
	}

	pub fn query_param(&self, key: &str) -> Option<&str> {
		self.query.get(key).map(String::as_str)
	}

	pub fn upload_dir(&self) -> Option<&Path> {
		self.upload_dir.as_deref()
	}

	pub fn site_host(&self) -> &str {
		&self.site_host
	}

	/// Address of the client: first `X-Forwarded-For` hop, else the peer address
	pub fn client_ip(&self) -> Option<&str> {
		let forwarded = self
			.forwarded_for
			.as_deref()
			.and_then(|v| v.split(',').next())
			.map(str::trim);
		non_blank(forwarded).or_else(|| non_blank(self.remote_addr.as_deref()))
	}
}

fn non_blank(value: Option<&str>) -> Option<&str> {
	value.filter(|v| !v.trim().is_empty())
}
