//! Integration tests for the API server.

use std::sync::OnceLock;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::Response;
use cart_store::InMemoryCartStore;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

fn setup() -> axum::Router {
    let state = api::create_state(InMemoryCartStore::new(), "memory");
    api::create_app(state, get_metrics_handle())
}

async fn send(app: &axum::Router, request: Request<Body>) -> Response {
    app.clone().oneshot(request).await.unwrap()
}

async fn body_json(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn create_cart(app: &axum::Router) -> String {
    let response = send(app, post_json("/carts", json!({}))).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["cart_id"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_health_check() {
    let app = setup();

    let response = send(&app, get("/health")).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["storage"], "memory");
}

#[tokio::test]
async fn test_create_cart_with_customer() {
    let app = setup();
    let customer_id = uuid_string();

    let response = send(
        &app,
        post_json("/carts", json!({ "customer_id": customer_id })),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["customer_id"], customer_id.as_str());

    let cart_id = created["cart_id"].as_str().unwrap();
    let cart = body_json(send(&app, get(&format!("/carts/{cart_id}"))).await).await;
    assert_eq!(cart["customer_id"], customer_id.as_str());
    assert_eq!(cart["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_create_cart_rejects_bad_customer_id() {
    let app = setup();

    let response = send(&app, post_json("/carts", json!({ "customer_id": "nope" }))).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_add_item_then_increment() {
    let app = setup();
    let cart_id = create_cart(&app).await;
    let product_id = uuid_string();
    let uri = format!("/carts/{cart_id}/items");

    let response = send(
        &app,
        post_json(
            &uri,
            json!({ "product_id": product_id, "quantity": 3, "price": "9.99" }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let change = body_json(response).await;
    assert_eq!(change["events"].as_array().unwrap().len(), 1);
    assert_eq!(change["events"][0]["type"], "ItemAdded");
    assert_eq!(change["events"][0]["data"]["quantity"], 3);

    let response = send(
        &app,
        post_json(
            &uri,
            json!({ "product_id": product_id, "quantity": 2, "price": "9.99" }),
        ),
    )
    .await;
    let change = body_json(response).await;
    assert_eq!(change["events"][0]["type"], "QuantityIncremented");
    assert_eq!(change["events"][0]["data"]["quantity"], 2);

    let cart = body_json(send(&app, get(&format!("/carts/{cart_id}"))).await).await;
    assert_eq!(cart["items"][0]["product_id"], product_id.as_str());
    assert_eq!(cart["items"][0]["quantity"], 5);
    assert_eq!(cart["items"][0]["price"], "9.99");
    assert_eq!(cart["total"], "49.95");
}

#[tokio::test]
async fn test_remove_item() {
    let app = setup();
    let cart_id = create_cart(&app).await;
    let product_id = uuid_string();
    send(
        &app,
        post_json(
            &format!("/carts/{cart_id}/items"),
            json!({ "product_id": product_id, "quantity": 1, "price": "5.00" }),
        ),
    )
    .await;

    let uri = format!("/carts/{cart_id}/items/{product_id}");
    let response = send(&app, delete(&uri)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let change = body_json(response).await;
    assert_eq!(change["events"][0]["type"], "ItemRemoved");
    assert_eq!(change["cart"]["items"].as_array().unwrap().len(), 0);

    // Removing again records nothing.
    let change = body_json(send(&app, delete(&uri)).await).await;
    assert_eq!(change["events"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_add_item_with_out_of_range_total() {
    let app = setup();
    let cart_id = create_cart(&app).await;

    let response = send(
        &app,
        post_json(
            &format!("/carts/{cart_id}/items"),
            json!({
                "product_id": uuid_string(),
                "quantity": 2,
                "price": "79228162514264337593543950335"
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let cart = body_json(send(&app, get(&format!("/carts/{cart_id}"))).await).await;
    assert_eq!(cart["items"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_add_item_past_max_quantity() {
    let app = setup();
    let cart_id = create_cart(&app).await;
    let product_id = uuid_string();
    let uri = format!("/carts/{cart_id}/items");
    let body = |quantity: i32| {
        json!({ "product_id": product_id, "quantity": quantity, "price": "1" })
    };

    let response = send(&app, post_json(&uri, body(i32::MAX))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, post_json(&uri, body(1))).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let cart = body_json(send(&app, get(&format!("/carts/{cart_id}"))).await).await;
    assert_eq!(cart["items"][0]["quantity"], i32::MAX);
}

#[tokio::test]
async fn test_get_nonexistent_cart() {
    let app = setup();

    let response = send(&app, get(&format!("/carts/{}", uuid_string()))).await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_item_to_nonexistent_cart() {
    let app = setup();

    let response = send(
        &app,
        post_json(
            &format!("/carts/{}/items", uuid_string()),
            json!({ "product_id": uuid_string(), "quantity": 1, "price": "1.00" }),
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_invalid_cart_id() {
    let app = setup();

    let response = send(&app, get("/carts/not-a-uuid")).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = setup();

    let response = send(&app, get("/metrics")).await;

    assert_eq!(response.status(), StatusCode::OK);
}

fn uuid_string() -> String {
    common::CartId::new().to_string()
}
