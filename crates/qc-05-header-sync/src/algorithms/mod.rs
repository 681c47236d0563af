//! # Algorithms
//!
//! The four steps of header processing, each a free function over ports.
//!
//! - **header_acceptor**: continuity check and commit of a header batch
//! - **unconnected**: recovery when an announced header has no known parent
//! - **direct_fetch**: bounded ancestor walk selecting blocks to fetch
//! - **download**: turning selected blocks into a `getdata` request

pub mod direct_fetch;
pub mod download;
pub mod header_acceptor;
pub mod unconnected;

pub use direct_fetch::find_missing_blocks;
pub use download::suggest_download;
pub use header_acceptor::accept_headers;
pub use unconnected::{header_connects, request_connect_headers};
