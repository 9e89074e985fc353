//! Request handling module
//!
//! Router (method gate + dispatch) and the static-file serving logic.

pub mod router;
pub mod static_files;

pub use router::{handle_request, RequestContext};
