use std::sync::LazyLock;

use regex::Regex;

// local-part@domain.tld with no whitespace and a single @
static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

/// Basic email format check shared by the store and the form handlers
pub fn is_valid_email(email: &str) -> bool {
    EMAIL_PATTERN.is_match(email)
}

/// Lowercase URL slug: runs of non-alphanumerics collapse to a single dash
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.trim().chars().flat_map(char::to_lowercase) {
        if c.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_validation() {
        // Valid emails
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("user.name@example.co.uk"));
        assert!(is_valid_email("user+tag@example.com"));
        assert!(is_valid_email("a@x.com"));

        // Invalid emails
        assert!(!is_valid_email("nodomain"));
        assert!(!is_valid_email("user@example")); // Missing TLD
        assert!(!is_valid_email("user example@x.com")); // Contains space
        assert!(!is_valid_email("user@@example.com")); // Multiple @ symbols
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user@example."));
        assert!(!is_valid_email(""));
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Ada Lovelace"), "ada-lovelace");
        assert_eq!(slugify("  Neon -- Folio!  "), "neon-folio");
        assert_eq!(slugify("a@x.com"), "a-x-com");
        assert_eq!(slugify("!!!"), "");
    }
}
