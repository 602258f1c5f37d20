//! Configuration file round-trip transform
//!
//! MySQL option files are sectioned key/value text with one wrinkle a
//! generic key/value reader cannot represent: options that are present but
//! carry no value (`skip-networking`). The round trip works on a cleaned
//! form of the file:
//! - a bare option is rewritten to `option = <>` (the sentinel) on fetch
//!   and rewritten back to a bare option on write
//! - any line outside the grammar is escaped with an opaque marker so it
//!   survives the trip byte-for-byte
//!
//! A document that is fetched and written without semantic edits reproduces
//! the original bytes; the sentinel substitution is exactly reversible. The
//! sentinel itself is configurable per document; a value that literally
//! equals it is indistinguishable from "no value" — a known limitation, not
//! silently repaired.

mod document;
mod errors;
mod remote;
mod transform;

pub use document::ConfigDocument;
pub use errors::{ConfigError, ConfigResult};
pub use remote::ConfigTransport;
pub use transform::DEFAULT_SENTINEL;
