//! HTTP protocol layer module
//!
//! Response construction, kept apart from routing and filesystem logic.

pub mod response;

pub use response::{
    build_404_response, build_405_response, build_500_response, build_download_response,
    build_html_response,
};
