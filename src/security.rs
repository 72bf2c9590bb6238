use subtle::ConstantTimeEq;

/// Constant-time string comparison to prevent timing attacks
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Check an admin request's API key.
///
/// With no key configured the admin routes are open (local development);
/// otherwise the provided key must match exactly.
pub fn admin_authorized(configured: Option<&str>, provided: Option<&str>) -> bool {
    match (configured, provided) {
        (None, _) => true,
        (Some(_), None) => false,
        (Some(expected), Some(given)) => constant_time_compare(expected, given.trim()),
    }
}
