//! Public API module.
//!
//! This module contains the high-level user-facing API for the `iwscan` crate.

pub mod models;
pub mod scanner;
