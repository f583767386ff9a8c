use marketplace_api::routes::{doc::ApiDoc, health::health_check};
use utoipa::OpenApi;

#[tokio::test]
async fn health_check_returns_ok() {
    let response = health_check().await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
}

#[test]
fn api_doc_lists_health_next_to_the_marketplace_routes() {
    let doc = ApiDoc::openapi();
    let paths = &doc.paths.paths;

    for path in [
        "/health",
        "/api/cart",
        "/api/cart/{line_id}",
        "/api/orders/checkout",
        "/api/chat",
        "/api/events/stream",
        "/api/services/stream",
        "/api/notifications/stream",
    ] {
        assert!(paths.contains_key(path), "{path} missing from the OpenAPI document");
    }

    let schemes = doc
        .components
        .as_ref()
        .map(|components| components.security_schemes.contains_key("bearer_auth"));
    assert_eq!(schemes, Some(true));
}
