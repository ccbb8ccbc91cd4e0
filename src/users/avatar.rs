use sha2::{Digest, Sha256};

/// Gravatar URL derived from the email: 200px, PG-rated, "mystery man"
/// fallback when the address has no image. Emails are trimmed and lowercased
/// first so equivalent spellings map to the same avatar.
pub fn gravatar_url(email: &str) -> String {
    let normalized = email.trim().to_lowercase();
    let digest = Sha256::digest(normalized.as_bytes());
    format!(
        "https://www.gravatar.com/avatar/{}?s=200&r=pg&d=mm",
        hex::encode(digest)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derivation_is_deterministic() {
        assert_eq!(
            gravatar_url("dev@example.com"),
            gravatar_url("dev@example.com")
        );
    }

    #[test]
    fn email_is_normalized_before_hashing() {
        assert_eq!(
            gravatar_url("  Dev@Example.COM "),
            gravatar_url("dev@example.com")
        );
    }

    #[test]
    fn distinct_emails_get_distinct_avatars() {
        assert_ne!(gravatar_url("a@example.com"), gravatar_url("b@example.com"));
    }

    #[test]
    fn url_carries_size_rating_and_default() {
        let url = gravatar_url("dev@example.com");
        assert!(url.starts_with("https://www.gravatar.com/avatar/"));
        assert!(url.ends_with("?s=200&r=pg&d=mm"));
    }
}
