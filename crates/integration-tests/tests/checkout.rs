//! Checkout flows against a mock backend: redirect, stock conflict repair,
//! server failures.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use sugarplum_integration_tests::{harness, sample_catalog, sample_customer};
use sugarplum_storefront::backend::BackendError;
use sugarplum_storefront::backend::types::CustomerInfo;
use sugarplum_storefront::checkout::{CheckoutError, CheckoutOutcome, Repair};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_catalog()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn successful_checkout_redirects_and_keeps_cart() {
    let mut h = harness().await;
    mount_catalog(&h.server).await;
    Mock::given(method("POST"))
        .and(path("/checkout"))
        .and(body_partial_json(serde_json::json!({
            "cart": [{"id": "tee-1", "price": 1800, "quantity": 2}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "checkoutUrl": "https://pay.example/abc"
        })))
        .mount(&h.server)
        .await;

    h.state.reload_catalog().await.unwrap();
    h.state.add_to_cart("tee-1", "Red", "M", None, 2);

    let outcome = h.state.checkout(&sample_customer()).await.unwrap();
    match outcome {
        CheckoutOutcome::Redirect(url) => assert_eq!(url, "https://pay.example/abc"),
        CheckoutOutcome::StockConflict(_) => panic!("expected redirect"),
    }
    // Payment has not completed yet, so the cart survives the redirect.
    assert_eq!(h.state.cart().lines().len(), 1);
}

#[tokio::test]
async fn stock_conflict_repairs_cart_and_refreshes_catalog() {
    let mut h = harness().await;
    mount_catalog(&h.server).await;
    Mock::given(method("POST"))
        .and(path("/checkout"))
        .respond_with(ResponseTemplate::new(409).set_body_json(serde_json::json!({
            "type": "OUT_OF_STOCK",
            "conflicts": [
                {"productId": "tee-1", "name": "Classic Tee", "color": "Red", "size": "M",
                 "requestedQty": 4, "availableQty": 2},
                {"name": "Cozy Hoodie", "requestedQty": 1, "availableQty": 0}
            ]
        })))
        .mount(&h.server)
        .await;

    h.state.reload_catalog().await.unwrap();
    h.state.add_to_cart("tee-1", "Red", "M", None, 4);
    h.state.add_to_cart("hoodie-1", "Black", "M", None, 1);

    let outcome = h.state.checkout(&sample_customer()).await.unwrap();
    let CheckoutOutcome::StockConflict(summary) = outcome else {
        panic!("expected stock conflict");
    };
    assert_eq!(summary.repairs.len(), 2);
    assert!(summary
        .repairs
        .iter()
        .any(|r| r.repair == Repair::ReducedTo(2)));
    assert!(summary.repairs.iter().any(|r| r.repair == Repair::Removed));
    assert!(summary.message.contains("reduced to 2"));

    let lines = h.state.cart().lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].product_id.as_str(), "tee-1");
    assert_eq!(lines[0].quantity, 2);
}

#[tokio::test]
async fn empty_cart_and_missing_fields_are_rejected_locally() {
    let mut h = harness().await;

    let err = h.state.checkout(&sample_customer()).await.unwrap_err();
    assert!(matches!(err, CheckoutError::EmptyCart));

    mount_catalog(&h.server).await;
    h.state.reload_catalog().await.unwrap();
    h.state.add_to_cart("tee-1", "Red", "M", None, 1);

    let no_email = CustomerInfo {
        name: "Pat Shopper".to_owned(),
        ..Default::default()
    };
    let err = h.state.checkout(&no_email).await.unwrap_err();
    assert!(matches!(err, CheckoutError::MissingField("email")));
    // Nothing reached the backend.
    assert!(h.server.received_requests().await.unwrap().iter().all(|r| {
        r.url.path() != "/checkout"
    }));
}

#[tokio::test]
async fn server_error_surfaces_its_message() {
    let mut h = harness().await;
    mount_catalog(&h.server).await;
    Mock::given(method("POST"))
        .and(path("/checkout"))
        .respond_with(
            ResponseTemplate::new(500)
                .set_body_json(serde_json::json!({"error": "square is down"})),
        )
        .mount(&h.server)
        .await;

    h.state.reload_catalog().await.unwrap();
    h.state.add_to_cart("tee-1", "Red", "M", None, 1);

    let err = h.state.checkout(&sample_customer()).await.unwrap_err();
    match err {
        CheckoutError::Backend(BackendError::Status { status, message }) => {
            assert_eq!(status, 500);
            assert_eq!(message, "square is down");
        }
        other => panic!("unexpected error: {other}"),
    }
    // The cart is untouched by a failed attempt.
    assert_eq!(h.state.cart().lines().len(), 1);
}

#[tokio::test]
async fn unreachable_backend_is_a_network_error() {
    use rust_decimal::Decimal;
    use sugarplum_core::ProductId;
    use sugarplum_storefront::cart::CartLine;
    use sugarplum_storefront::config::{ShopSettings, StorefrontConfig};
    use sugarplum_storefront::state::AppState;

    let dir = tempfile::tempdir().unwrap();
    let cart_path = sugarplum_integration_tests::cart_path(&dir);
    let lines = vec![CartLine {
        product_id: ProductId::from("tee-1"),
        product_name: "Classic Tee".to_owned(),
        kind: "T-Shirts".to_owned(),
        color: "Red".to_owned(),
        size: "M".to_owned(),
        print_location: None,
        unit_price: Decimal::new(1800, 2),
        quantity: 1,
        external_variant_id: None,
        sku: None,
        image: None,
    }];
    std::fs::write(&cart_path, serde_json::to_string(&lines).unwrap()).unwrap();

    // Port 9 (discard) refuses connections.
    let mut state = AppState::with_config(StorefrontConfig {
        api_base: "http://127.0.0.1:9".to_owned(),
        cart_path,
        default_settings: ShopSettings::default(),
    });
    let err = state.checkout(&sample_customer()).await.unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::Backend(BackendError::Network(_))
    ));
    assert_eq!(state.cart().lines().len(), 1);
}

#[tokio::test]
async fn success_without_checkout_url_is_an_error() {
    let mut h = harness().await;
    mount_catalog(&h.server).await;
    Mock::given(method("POST"))
        .and(path("/checkout"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(&h.server)
        .await;

    h.state.reload_catalog().await.unwrap();
    h.state.add_to_cart("tee-1", "Red", "M", None, 1);

    let err = h.state.checkout(&sample_customer()).await.unwrap_err();
    assert!(matches!(
        err,
        CheckoutError::Backend(BackendError::MalformedResponse(_))
    ));
}
