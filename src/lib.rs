//! Floating tool-icon picker.
//!
//! A field of bouncing, colliding icon tokens that a visitor clicks to mark
//! the SaaS tools they pay for, plus the catalog and savings estimate behind
//! it.  [`engine::IconField`] is the headless layout engine; the
//! [`plugin`] and [`rendering`] modules host it in a Bevy app.

pub mod catalog;
pub mod collision;
pub mod config;
pub mod constants;
pub mod engine;
pub mod error;
pub mod layout;
pub mod physics;
pub mod plugin;
pub mod random;
pub mod rendering;
pub mod token;
