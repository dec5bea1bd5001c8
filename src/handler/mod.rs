//! Request handler module
//!
//! Two routes: `/` lists every file under the root, `/download/...` serves one.

pub mod download;
pub mod listing;
pub mod router;

pub use listing::FileEntry;
pub use router::{classify, handle_request, Route};
