//! Shared fixtures for the integration tests.
//!
//! Tests in `tests/` stand up a [`wiremock::MockServer`] playing the
//! commerce backend, point an engine at it, and drive the public API.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)]

use std::path::PathBuf;

use serde_json::{Value, json};
use sugarplum_storefront::config::{ShopSettings, StorefrontConfig};
use sugarplum_storefront::state::AppState;
use tempfile::TempDir;
use wiremock::MockServer;

/// An engine wired to a mock backend, with its cart file in a temp dir.
pub struct TestHarness {
    pub server: MockServer,
    pub state: AppState,
    // Held so the cart file outlives the test body.
    _cart_dir: TempDir,
}

pub async fn harness() -> TestHarness {
    let server = MockServer::start().await;
    let cart_dir = tempfile::tempdir().unwrap();
    let config = StorefrontConfig {
        api_base: server.uri(),
        cart_path: cart_path(&cart_dir),
        default_settings: ShopSettings::default(),
    };
    TestHarness {
        state: AppState::with_config(config),
        server,
        _cart_dir: cart_dir,
    }
}

pub fn cart_path(dir: &TempDir) -> PathBuf {
    dir.path().join("spc_cart_v1.json")
}

/// A small but representative catalog payload: tracked and untracked stock,
/// string prices, legacy quantity field names and print-location variants.
pub fn sample_catalog() -> Value {
    json!([
        {
            "id": "tee-1",
            "name": "Classic Tee",
            "type": "T-Shirts",
            "audience": ["Adult"],
            "image": "https://img.example/tee.png",
            "flags": {"isFeatured": true},
            "variations": [
                {"id": "sq-tee-red-m-f", "color": "Red", "size": "M",
                 "name": "Front Print", "price": 18, "availableQty": 5},
                {"id": "sq-tee-red-m-b", "color": "Red", "size": "M",
                 "name": "Back Print", "price": "20.00", "quantityOnHand": 2},
                {"id": "sq-tee-blk-l-f", "color": "Black", "size": "L",
                 "printLocation": "Front", "price": 18, "qty": 3}
            ]
        },
        {
            "id": "hoodie-1",
            "name": "Cozy Hoodie",
            "type": "Hoodies",
            "audience": ["Adult", "Youth"],
            "variations": [
                {"id": "sq-hood-blk-m", "color": "Black", "size": "M", "price": 42}
            ]
        }
    ])
}

pub fn sample_customer() -> sugarplum_storefront::backend::types::CustomerInfo {
    sugarplum_storefront::backend::types::CustomerInfo {
        name: "Pat Shopper".to_owned(),
        email: "pat@example.com".to_owned(),
        state: "MO".to_owned(),
        ..Default::default()
    }
}
