//! # Domain Models
//!
//! Pure data shared by every Stratus crate: configuration, well-known names and the feature
//! slice registry. The only dependency is `serde`; keep I/O and logic out of here.

pub mod config;
pub mod constants;
pub mod registry;
