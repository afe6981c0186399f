//! # sugarmail-core
//!
//! Client-side logic of the sugarmail Gmail reader, built on
//! [`sugarmail_mime`].
//!
//! This crate provides:
//! - **Conversation view model**: message cards for a thread, added
//!   incrementally as the thread refreshes
//! - **Compose**: draft validation and the `messages.send` request body
//! - **Settings**: date order, quote markers, label names and tabs
//! - **Events**: a broadcast bus between the API client and the views
//! - **Labels**: an immutable label id to display name table
//!
//! Network access and OAuth are left to the host.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod compose;
pub mod conversation;
mod error;
pub mod events;
pub mod labels;
pub mod settings;

pub use compose::{ComposeContext, ComposedMessage, Draft, DraftError, validate_draft};
pub use conversation::{Conversation, DateOrder, MessageCard, format_date};
pub use error::{Error, Result};
pub use events::{ClientEvent, EventBus, Label, Profile, ThreadSummary};
pub use labels::LabelTable;
pub use settings::Settings;
