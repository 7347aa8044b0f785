//! # Domain Models
//!
//! Pure data types shared by the licensing crates, with `serde` as the only dependency.
//! Keep it lean: no I/O, no cryptography, no async. Hashing, sealing, and probing live
//! in the crates that own those concerns.

pub mod activation;
pub mod config;
pub mod constants;
pub mod fingerprint;
pub mod machine;
pub mod permissions;
pub mod vm;
