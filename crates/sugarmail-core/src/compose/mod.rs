//! Writing and sending messages.
//!
//! A [`Draft`] is validated and then turned into the JSON body of a Gmail
//! `messages.send` request.

mod draft;
mod validation;

pub use draft::{ComposeContext, ComposedMessage, Draft, SENT_LABEL, parse_recipients};
pub use validation::{DraftError, ValidationResult, validate_draft};
