//! Core types for Sugarplum.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod notice;

pub use id::*;
pub use money::{format_usd, from_cents, round_display, to_cents};
pub use notice::{Notice, Severity};
