//! Domain types for card synthesis.
//!
//! # Modules
//!
//! * `element` - Detected UI controls and their style/content payloads
//! * `card` - The card document vocabulary and response envelope

pub mod card;
pub mod element;

pub use card::*;
pub use element::*;
