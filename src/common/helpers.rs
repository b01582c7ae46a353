// Helper functions for safe logging

use serde_json::Value;

/// JSON keys whose values are credentials and must never reach the logs
const SECRET_KEYS: &[&str] = &["accessToken", "refreshToken", "idToken", "code"];

/// JSON keys holding email addresses
const EMAIL_KEYS: &[&str] = &["email"];

/// Masks email addresses for safe logging
/// Prevents sensitive data exposure while preserving debugging utility
///
/// # Example
/// ```ignore
/// let masked = safe_email_log("user@example.com");
/// // Returns: "u***@example.com"
/// ```
pub fn safe_email_log(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && !domain.is_empty() => {
            let first: String = local.chars().take(1).collect();
            format!("{}***@{}", first, domain)
        }
        _ => "***@***.***".to_string(),
    }
}

/// Masks tokens for safe logging
/// Shows only first and last 4 characters
///
/// # Example
/// ```ignore
/// let masked = safe_token_log("eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9");
/// // Returns: "eyJh...CJ9"
/// ```
pub fn safe_token_log(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{}...{}", head, tail)
    } else {
        "***".to_string()
    }
}

/// Replaces credential and email fields anywhere in a JSON document with
/// their masked form
pub fn mask_secrets(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                match field {
                    Value::String(s) if SECRET_KEYS.contains(&key.as_str()) => {
                        *s = safe_token_log(s);
                    }
                    Value::String(s) if EMAIL_KEYS.contains(&key.as_str()) => {
                        *s = safe_email_log(s);
                    }
                    _ => mask_secrets(field),
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(mask_secrets),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_safe_email_log_masks_local_part() {
        assert_eq!(safe_email_log("user@example.com"), "u***@example.com");
        assert_eq!(safe_email_log("not-an-email"), "***@***.***");
        assert_eq!(safe_email_log("@example.com"), "***@***.***");
    }

    #[test]
    fn test_safe_token_log_keeps_only_edges() {
        assert_eq!(safe_token_log("abcdefghijkl"), "abcd...ijkl");
        assert_eq!(safe_token_log("short"), "***");
    }

    #[test]
    fn test_mask_secrets_walks_nested_values() {
        let mut body = json!({
            "accessToken": "aaaaaaaaaaaaaaaa",
            "user": { "email": "u@example.com" },
            "items": [{ "refreshToken": "bbbbbbbbbbbbbbbb" }]
        });

        mask_secrets(&mut body);

        assert_eq!(body["accessToken"], "aaaa...aaaa");
        assert_eq!(body["items"][0]["refreshToken"], "bbbb...bbbb");
        assert_eq!(body["user"]["email"], "u***@example.com");
    }
}
