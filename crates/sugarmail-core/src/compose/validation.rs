//! Draft validation.

use super::draft::Draft;

/// Why a draft cannot be sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftError {
    /// No recipient given.
    NoRecipients,
    /// A recipient address is malformed.
    InvalidRecipient(String),
}

impl DraftError {
    /// Get the field name this error relates to.
    #[must_use]
    pub const fn field(&self) -> &'static str {
        match self {
            Self::NoRecipients | Self::InvalidRecipient(_) => "to",
        }
    }
}

impl std::fmt::Display for DraftError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoRecipients => write!(f, "At least one recipient is required"),
            Self::InvalidRecipient(address) => write!(f, "Invalid recipient address: {address}"),
        }
    }
}

impl std::error::Error for DraftError {}

/// Result of validating a draft.
pub type ValidationResult = Result<(), Vec<DraftError>>;

/// Validate a draft before composing it.
///
/// # Errors
///
/// Returns every problem found, not just the first.
pub fn validate_draft(draft: &Draft) -> ValidationResult {
    let mut errors = Vec::new();

    if draft.to.iter().all(|r| r.trim().is_empty()) {
        errors.push(DraftError::NoRecipients);
    }

    for recipient in draft.to.iter().filter(|r| !r.trim().is_empty()) {
        if !is_valid_email(address_of(recipient)) {
            errors.push(DraftError::InvalidRecipient(recipient.clone()));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// The bare address of `Name <addr>`, or the input itself.
pub(crate) fn address_of(recipient: &str) -> &str {
    let recipient = recipient.trim();
    match (recipient.rfind('<'), recipient.rfind('>')) {
        (Some(open), Some(close)) if open < close => recipient[open + 1..close].trim(),
        _ => recipient,
    }
}

/// Basic email validation.
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };

    if local.is_empty() || domain.contains('@') || email.contains(char::is_whitespace) {
        return false;
    }

    // Domain must have a dot and no empty labels
    domain.contains('.') && domain.split('.').all(|p| !p.is_empty())
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::redundant_clone,
    clippy::manual_string_new,
    clippy::needless_collect,
    clippy::unreadable_literal,
    clippy::used_underscore_items,
    clippy::similar_names
)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("user.name@sub.example.com"));
    }

    #[test]
    fn test_invalid_email() {
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("user"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@example"));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("us er@example.com"));
    }

    #[test]
    fn test_address_of() {
        assert_eq!(address_of("Bob <bob@example.com>"), "bob@example.com");
        assert_eq!(address_of(" bob@example.com "), "bob@example.com");
        assert_eq!(address_of("odd > <"), "odd > <");
    }

    #[test]
    fn test_validate_empty_draft() {
        let errors = validate_draft(&Draft::default()).unwrap_err();
        assert_eq!(errors, vec![DraftError::NoRecipients]);
        assert_eq!(errors[0].field(), "to");
    }

    #[test]
    fn test_validate_reports_each_bad_recipient() {
        let draft = Draft {
            to: vec!["ok@example.com".into(), "nope".into(), "Bob <bob@>".into()],
            ..Draft::default()
        };
        let errors = validate_draft(&draft).unwrap_err();
        assert_eq!(
            errors,
            vec![
                DraftError::InvalidRecipient("nope".into()),
                DraftError::InvalidRecipient("Bob <bob@>".into()),
            ]
        );
    }

    #[test]
    fn test_validate_named_recipient() {
        let draft = Draft {
            to: vec!["Bob <bob@example.com>".into()],
            ..Draft::default()
        };
        assert!(validate_draft(&draft).is_ok());
    }
}
