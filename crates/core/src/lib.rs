//! Sugarplum Core - Shared types library.
//!
//! This crate provides common types used across all Sugarplum components:
//! - `storefront` - the shop/kiosk engine talking to the commerce backend
//! - `integration-tests` - HTTP-level tests against a mock backend
//!
//! # Architecture
//!
//! The core crate contains only types and helpers - no I/O, no HTTP clients.
//! This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, money arithmetic, and user-facing notices

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
