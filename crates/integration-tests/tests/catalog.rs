//! Catalog loading against a mock backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use rust_decimal::Decimal;
use sugarplum_integration_tests::{harness, sample_catalog};
use sugarplum_storefront::catalog::{Channel, PrintLocation, ProductFilter, visible_products};
use wiremock::matchers::{method, path};
use wiremock::{Mock, ResponseTemplate};

#[tokio::test]
async fn loads_and_normalizes_the_catalog() {
    let mut h = harness().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_catalog()))
        .mount(&h.server)
        .await;

    h.state.reload_catalog().await.unwrap();

    let tee = h.state.catalog().find("tee-1").unwrap();
    assert_eq!(tee.colors, ["Black", "Red"]);
    assert_eq!(tee.sizes, ["M", "L"]);
    assert_eq!(
        tee.print_locations,
        [PrintLocation::Front, PrintLocation::Back]
    );
    // Cheapest positive price, string-typed prices included.
    assert_eq!(tee.base_price, Decimal::from(18));
    assert_eq!(tee.aggregate_inventory, 10);
    assert!(tee.inventory_tracked);

    let hoodie = h.state.catalog().find("hoodie-1").unwrap();
    assert!(!hoodie.inventory_tracked);
    assert_eq!(hoodie.colors, ["Black"]);
}

#[tokio::test]
async fn second_load_is_served_from_cache() {
    let mut h = harness().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_catalog()))
        .expect(1)
        .mount(&h.server)
        .await;

    h.state.reload_catalog().await.unwrap();
    h.state.reload_catalog().await.unwrap();
    assert_eq!(h.state.products().len(), 2);
}

#[tokio::test]
async fn backend_failure_keeps_previous_catalog() {
    let mut h = harness().await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_catalog()))
        .up_to_n_times(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&h.server)
        .await;

    h.state.reload_catalog().await.unwrap();
    h.state.backend().invalidate_cache();
    assert!(h.state.reload_catalog().await.is_err());
    // The failed reload must not wipe what shoppers are browsing.
    assert_eq!(h.state.products().len(), 2);
}

#[tokio::test]
async fn filtering_and_channel_visibility() {
    let mut h = harness().await;
    let mut catalog = sample_catalog();
    catalog[1]["flags"] = serde_json::json!({"hideOnline": true});
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog))
        .mount(&h.server)
        .await;
    h.state.reload_catalog().await.unwrap();

    let online = visible_products(
        h.state.products(),
        Channel::Online,
        &ProductFilter::default(),
    );
    assert_eq!(online.len(), 1);
    assert_eq!(online[0].id.as_str(), "tee-1");

    let kiosk = visible_products(
        h.state.products(),
        Channel::Kiosk,
        &ProductFilter {
            audience: Some("Youth".to_owned()),
            ..ProductFilter::default()
        },
    );
    assert_eq!(kiosk.len(), 1);
    assert_eq!(kiosk[0].id.as_str(), "hoodie-1");
}
