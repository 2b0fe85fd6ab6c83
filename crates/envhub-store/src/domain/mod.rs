//! # Domain Layer
//!
//! Pure domain logic for the envhub store. Nothing here performs I/O.
//!
//! ## Modules
//!
//! - `key` - Bundle keys and the path encoding
//! - `bundle` - Sealed and decrypted bundles, history entries
//! - `requests` - Write requests and outcomes
//! - `namespace` - Browse scopes over the flat key space
//! - `dotenv` - `.env` text parsing and rendering
//! - `config` - Store configuration and policies
//! - `errors` - Domain error types

pub mod bundle;
pub mod config;
pub mod dotenv;
pub mod errors;
pub mod key;
pub mod namespace;
pub mod requests;
