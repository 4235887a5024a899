//! Chat transcript kept by the caller

pub mod storage;
pub mod types;

pub use storage::Transcript;
pub use types::{ChatTurn, Speaker};
