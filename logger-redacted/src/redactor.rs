use base64::{engine::general_purpose, Engine as _};
use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};

lazy_static! {
    static ref EMAIL_REGEX: Regex = Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b").unwrap();
}

/// PII redaction configuration
#[derive(Debug, Clone)]
pub struct RedactionConfig {
    pub redact_emails: bool,
    /// Replace values with a short hash so redacted lines can still be correlated
    pub hash_for_correlation: bool,
}

impl Default for RedactionConfig {
    fn default() -> Self {
        Self {
            redact_emails: true,
            hash_for_correlation: true,
        }
    }
}

/// PII redactor for log messages
pub struct PiiRedactor {
    config: RedactionConfig,
}

impl PiiRedactor {
    pub fn new(config: RedactionConfig) -> Self {
        Self { config }
    }

    pub fn redact(&self, text: &str) -> String {
        if self.config.redact_emails {
            self.redact_emails(text)
        } else {
            text.to_string()
        }
    }

    fn redact_emails(&self, text: &str) -> String {
        EMAIL_REGEX
            .replace_all(text, |caps: &regex::Captures| {
                let email = &caps[0];
                if self.config.hash_for_correlation {
                    format!("EMAIL[{}]", hash_value(email))
                } else {
                    match email.split_once('@') {
                        Some((local, domain)) => {
                            format!("{}***@{}***", first_char(local), first_char(domain))
                        }
                        None => "***@***".to_string(),
                    }
                }
            })
            .to_string()
    }
}

impl Default for PiiRedactor {
    fn default() -> Self {
        Self::new(RedactionConfig::default())
    }
}

/// Redact an acting-user email for log output.
///
/// Values that do not look like an email are still hashed: an upstream gateway
/// may forward identities in other shapes and they are PII all the same.
pub fn redact_email(email: &str) -> String {
    if EMAIL_REGEX.is_match(email) {
        PiiRedactor::default().redact(email)
    } else {
        format!("USER[{}]", hash_value(email))
    }
}

fn first_char(s: &str) -> &str {
    s.char_indices()
        .nth(1)
        .map_or(s, |(idx, _)| s.get(..idx).unwrap_or(s))
}

fn hash_value(value: &str) -> String {
    let digest = Sha256::digest(value.as_bytes());
    // First 8 bytes are plenty for correlation
    general_purpose::STANDARD.encode(digest.get(..8).unwrap_or_default())
}
