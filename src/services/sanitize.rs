/// Normalize an identity field (username, email) for storage and comparison
///
/// Pure function invoked by the API layer before every create/update or
/// lookup, so the lower-casing invariant holds no matter which path a
/// value arrives through.
pub fn normalize_identity(value: &str) -> String {
    value.trim().to_lowercase()
}

/// Strip HTML markup from a free-text search term
///
/// Search strings end up in templated output (error messages, CSV, rendered
/// lists), so markup is removed before the term is used anywhere.
pub fn strip_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_tag = false;

    for c in input.chars() {
        match c {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }

    out.trim().to_string()
}

/// Minimal shape check for email addresses; full RFC validation is not the
/// goal, catching obviously broken input with a field-level message is.
pub fn valid_email(value: &str) -> bool {
    let Some((local, domain)) = value.split_once('@') else {
        return false;
    };

    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_identity_lowercases_and_trims() {
        assert_eq!(normalize_identity("  John.Doe@Example.COM "), "john.doe@example.com");
        assert_eq!(normalize_identity("AdminUser"), "adminuser");
    }

    #[test]
    fn test_normalize_identity_is_idempotent() {
        let once = normalize_identity("MiXeD@CaSe.Org");
        assert_eq!(normalize_identity(&once), once);
    }

    #[test]
    fn test_strip_html_removes_markup() {
        assert_eq!(strip_html("<script>alert(1)</script>phone"), "alert(1)phone");
        assert_eq!(strip_html("<b>bold</b> term"), "bold term");
    }

    #[test]
    fn test_strip_html_passes_plain_text_through() {
        assert_eq!(strip_html("plain search term"), "plain search term");
    }

    #[test]
    fn test_strip_html_on_markup_only_input_yields_empty() {
        assert_eq!(strip_html("<img src=x>"), "");
    }

    #[test]
    fn test_valid_email() {
        assert!(valid_email("user@example.com"));
        assert!(!valid_email("not-an-email"));
        assert!(!valid_email("@example.com"));
        assert!(!valid_email("user@nodot"));
    }
}
