//! Core types for Stockroom.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod id;
pub mod price;
pub mod status;

pub use category::Category;
pub use id::*;
pub use price::Price;
pub use status::*;
