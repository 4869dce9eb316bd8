//! JSON-lines protocol spoken over stdin/stdout with the desktop shell.
//!
//! One request object per line in, one response object per line out, in order.

mod error;
mod handlers;
mod helpers;
mod router;
mod types;

pub use router::handle_request;
pub use types::{AppState, Request};
