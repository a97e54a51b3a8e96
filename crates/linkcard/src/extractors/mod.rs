// ABOUTME: Metadata extraction strategies and the selector helpers they share.
// ABOUTME: Strategies run in registration order: Open Graph, Twitter Card, standard HTML tags.

//! Metadata extraction module.
//!
//! Submodules:
//! - `fields`: selector-based lookup helpers.
//! - `strategies`: the `Strategy` rules the parser runs and merges.

pub mod fields;
pub mod strategies;

pub use strategies::Strategy;
