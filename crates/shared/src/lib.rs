//! Wire types and domain values shared by the client crates.

pub mod domain;
pub mod error;
pub mod protocol;
