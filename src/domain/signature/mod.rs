//! Historical fault signatures and keyword matching

pub mod matcher;
pub mod table;

pub use matcher::{MatchRecord, SignatureMatcher};
pub use table::{FaultSignature, SignatureTable};
