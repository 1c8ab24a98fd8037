pub mod canonical;
pub mod log;
pub mod types;

pub use canonical::{canonical_json, content_hash, sha256_hex, verify_hash};
pub use log::EventLog;
pub use types::*;
