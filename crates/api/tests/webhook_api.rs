mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_webhook_test_post_reports_success(pool: PgPool) {
    let test = common::build_test_app(pool).await;
    let response = post_json(
        test.router(),
        "/api/v1/webhooks/42/test",
        serde_json::json!({}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Webhook 42 test successful");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_webhook_test_get_reports_get(pool: PgPool) {
    let test = common::build_test_app(pool).await;
    let response = get(test.router(), "/api/v1/webhooks/7/test").await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["message"], "Webhook 7 test (GET)");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_webhook_non_numeric_id_returns_404(pool: PgPool) {
    let test = common::build_test_app(pool).await;

    let response = get(test.router(), "/api/v1/webhooks/orders-hook/test").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_json(
        test.router(),
        "/webhooks/orders-hook/test/",
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_webhook_test_served_at_root(pool: PgPool) {
    let test = common::build_test_app(pool).await;
    let response = post_json(test.router(), "/webhooks/42/test/", serde_json::json!({})).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await["message"],
        "Webhook 42 test successful"
    );
}
