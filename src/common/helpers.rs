// Helper functions for safe logging

/// Masks email addresses for safe logging
/// Prevents sensitive data exposure while preserving debugging utility
///
/// # Example
/// ```text
/// let masked = safe_email_log("user@example.com");
/// // Returns: "u***@example.com"
/// ```
pub fn safe_email_log(email: &str) -> String {
    if email.len() > 3 {
        let parts: Vec<&str> = email.split('@').collect();
        if parts.len() == 2 {
            // First character only; chars() keeps multibyte locals intact
            match parts[0].chars().next() {
                Some(first) => format!("{}***@{}", first, parts[1]),
                None => format!("***@{}", parts[1]),
            }
        } else {
            "***@***.***".to_string()
        }
    } else {
        "***@***.***".to_string()
    }
}

/// Masks bearer tokens for safe logging
/// Shows only first and last 4 characters
///
/// # Example
/// ```text
/// let masked = safe_token_log("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9");
/// // Returns: "eyJh...XVCJ9"
/// ```
pub fn safe_token_log(token: &str) -> String {
    if token.len() > 8 {
        format!("{}...{}", &token[..4], &token[token.len() - 4..])
    } else {
        "***".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_email_log_masks_local_part() {
        assert_eq!(safe_email_log("user@example.com"), "u***@example.com");
    }

    #[test]
    fn test_safe_email_log_handles_multibyte_first_char() {
        assert_eq!(safe_email_log("über@example.com"), "ü***@example.com");
        assert_eq!(safe_email_log("日本語@example.jp"), "日***@example.jp");
        assert_eq!(safe_email_log("@example.com"), "***@example.com");
    }

    #[test]
    fn test_safe_email_log_handles_garbage() {
        assert_eq!(safe_email_log(""), "***@***.***");
        assert_eq!(safe_email_log("ab"), "***@***.***");
        assert_eq!(safe_email_log("not-an-email"), "***@***.***");
        assert_eq!(safe_email_log("two@at@signs"), "***@***.***");
    }

    #[test]
    fn test_safe_token_log_keeps_edges_only() {
        let masked = safe_token_log("eyJhbGciOiJIUzI1NiJ9");
        assert_eq!(masked, "eyJh...NiJ9");
        assert_eq!(safe_token_log("short"), "***");
    }
}
