//! Request and response types
//!
//! Field names follow the service's JSON documents; every numeric
//! timestamp is Unix epoch seconds on the wire and `DateTime<Utc>` in Rust.

pub mod chat;
pub mod common;
pub mod completion;
pub mod embedding;
pub mod models;
pub mod moderation;

pub use chat::*;
pub use common::*;
pub use completion::*;
pub use embedding::*;
pub use models::*;
pub use moderation::*;
