//! Type definitions and constants.
//!
//! This module contains Wireless Extensions constants.

pub(crate) mod constants;
