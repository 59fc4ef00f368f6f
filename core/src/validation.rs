//! Input validation helpers shared by the workflows.

/// Validate email format (basic validation).
///
/// Checks for exactly one `@`, non-empty local and domain parts, a dot in the
/// domain, and a conservative character set.
///
/// # Examples
///
/// ```
/// use clientdesk_core::validation::is_valid_email;
///
/// assert!(is_valid_email("user@example.com"));
/// assert!(is_valid_email("first.last+tag@sub.example.co"));
/// assert!(!is_valid_email("invalid"));
/// assert!(!is_valid_email("a@b@example.com"));
/// ```
#[must_use]
pub fn is_valid_email(email: &str) -> bool {
    if email.len() < 3 || email.len() > 255 {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.is_empty() || domain.contains('@') || !domain.contains('.') {
        return false;
    }
    if domain.starts_with('.') || domain.ends_with('.') {
        return false;
    }

    let valid_local = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-' | '+' | '_');
    let valid_domain = |c: char| c.is_alphanumeric() || matches!(c, '.' | '-');
    local.chars().all(valid_local) && domain.chars().all(valid_domain)
}

/// Lowercase and trim an email address.
#[must_use]
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// The trimmed value, or `None` when absent or blank.
#[must_use]
pub fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
