//! Sugarplum storefront engine.
//!
//! The framework-agnostic core behind the shop page, the kiosk browsing mode,
//! and checkout. Rendering layers (web, kiosk shell) sit on top of this crate
//! and translate UI events into calls on [`state::AppState`]; everything the
//! shopper should see comes back as plain data or a
//! [`sugarplum_core::Notice`].
//!
//! # Components
//!
//! - [`backend`] - HTTP client for the commerce backend (`/products`,
//!   `/checkout`, `/admin/config`)
//! - [`catalog`] - catalog normalization, variant resolution, and
//!   channel/filter logic
//! - [`cart`] - the persisted cart store and totals computation
//! - [`checkout`] - checkout submission and stock-conflict reconciliation
//! - [`state`] - the application state object owning all of the above

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod backend;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod config;
pub mod error;
pub mod state;
