//! Scan acquisition and decoding.
//!
//! The pipeline runs leaves first: [`acquire`] fills a result buffer,
//! [`decode`] walks its events, and [`assemble`] folds them into records,
//! using [`quality`] to interpret signal samples.

pub(crate) mod acquire;
pub(crate) mod assemble;
pub(crate) mod decode;
pub(crate) mod quality;
