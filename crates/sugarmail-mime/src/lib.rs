//! # sugarmail-mime
//!
//! Turns Gmail API message JSON into HTML that can be shown right away.
//!
//! ## Features
//!
//! - **Message model**: `messages.get` / `threads.get` JSON via serde
//! - **Body resolution**: walks the part tree, prefers HTML, promotes plain text
//! - **Quote splitting**: separates quoted/forwarded content from the reply
//! - **Text to HTML**: paragraphs and linked URLs for plain-text bodies and replies
//! - **Lenient base64**: URL-safe or standard alphabet, padded or not
//! - **Field search**: find `threadId` or headers wherever the API put them
//!
//! ## Quick Start
//!
//! ```ignore
//! use sugarmail_mime::{Message, resolve_body};
//!
//! let message = Message::from_json(&json)?;
//! let body = resolve_body(&message)?;
//! println!("{}", body.primary_html);
//! if let Some(extra) = body.extra_html {
//!     println!("(quoted) {extra}");
//! }
//! ```
//!
//! ### Composing a reply body
//!
//! ```ignore
//! use sugarmail_mime::{compose_html, encoding::encode_url_safe};
//!
//! let html = compose_html("Thanks!\n\nSee https://example.com");
//! let data = encode_url_safe(html.as_bytes());
//! ```
//!
//! ### Searching raw JSON
//!
//! ```ignore
//! use sugarmail_mime::search::{find_str, collect_headers};
//!
//! let thread_id = find_str(&value, "threadId");
//! let recipients = collect_headers(&value, "To");
//! ```
//!
//! Everything here is pure and synchronous: no I/O, no shared state.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod content_type;
mod error;
mod header;
mod html;
mod message;
mod parts;
mod resolve;

pub mod encoding;
pub mod search;

pub use content_type::ContentType;
pub use error::{Error, Result};
pub use header::{Header, Headers};
pub use html::{compose_html, text_to_html};
pub use message::{Message, MessagePart, MessagePartBody, Thread};
pub use parts::flatten_parts;
pub use resolve::{BodyResolver, DEFAULT_QUOTE_MARKERS, RenderedBody, resolve_body};
