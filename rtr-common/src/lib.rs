//! # RTR Common Library
//!
//! Shared code for the release-to-royalty back office:
//! - Error taxonomy (`Error`, `Result`)
//! - Configuration loading (TOML bootstrap + built-in defaults)
//! - Fixed-point money and percentage arithmetic
//! - Database bootstrap (SQLite pool + schema)
//! - Utility functions

pub mod config;
pub mod db;
pub mod error;
pub mod money;
pub mod time;
pub mod uuid_utils;

pub use error::{Error, Result};
pub use money::{Money, Percentage};
