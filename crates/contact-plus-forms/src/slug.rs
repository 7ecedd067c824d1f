//! Label canonicalization

/// Convert a label to the key used for form data and query parameters.
///
/// Non-ASCII and punctuation characters are dropped, underscores survive,
/// and runs of whitespace or hyphens collapse to a single hyphen.
///
/// # Examples
///
/// ```
/// use contact_plus_forms::slugify;
///
/// assert_eq!(slugify("Your Name"), "your-name");
/// assert_eq!(slugify("  E-mail  address "), "e-mail-address");
/// assert_eq!(slugify("utm_source"), "utm_source");
/// assert_eq!(slugify("Phone (optional)!"), "phone-optional");
/// ```
pub fn slugify(text: &str) -> String {
	let kept: String = text
		.chars()
		.filter(|ch| ch.is_ascii_alphanumeric() || *ch == '_' || *ch == '-' || ch.is_whitespace())
		.collect::<String>()
		.to_ascii_lowercase();

	kept.split(|ch: char| ch == '-' || ch.is_whitespace())
		.filter(|s| !s.is_empty())
		.collect::<Vec<_>>()
		.join("-")
}
