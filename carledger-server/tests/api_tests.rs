//! REST API tests
//!
//! Requests go straight into the router with `oneshot`; no socket is bound.

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use carledger_server::{LedgerServer, ServerConfig};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn server(seeded: bool) -> LedgerServer {
    let server = LedgerServer::new(ServerConfig::builder().cors(false).build());
    if seeded {
        server.seed().unwrap();
    }
    server
}

async fn send(app: Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if body.is_some() {
        builder = builder.header("content-type", "application/json");
    }
    let request = builder
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None).await
}

#[tokio::test]
async fn health_reports_store() {
    let server = server(true);
    let (status, json) = get(server.router(), "/api/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "OK");
    assert_eq!(json["store"], "in-memory");
    assert_eq!(json["cars"], 5);
}

#[tokio::test]
async fn list_cars_uses_envelope() {
    let server = server(true);
    let (status, json) = get(server.router(), "/api/cars").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["success"], true);
    assert_eq!(json["count"], 5);
    assert_eq!(json["data"][0]["key"], "CAR0");
    assert_eq!(json["data"][0]["record"]["make"], "Toyota");
    assert!(json.get("message").is_none());
}

#[tokio::test]
async fn get_car_and_missing_car() {
    let server = server(true);

    let (status, json) = get(server.router(), "/api/cars/CAR1").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["owner"], "Brad");

    let (status, json) = get(server.router(), "/api/cars/CAR77").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "CAR77 does not exist");
}

#[tokio::test]
async fn create_car_returns_201_and_emits_event() {
    let server = server(false);
    let body = json!({
        "carNumber": "CAR12", "make": "Mazda", "model": "MX-5", "color": "red",
        "owner": "Kim", "year": 2021, "mileage": "1200", "price": 27999.5
    })
    .to_string();

    let (status, json) = send(server.router(), Method::POST, "/api/cars", Some(&body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(json["message"], "Car CAR12 created successfully");
    assert_eq!(json["data"]["year"], 2021);
    assert_eq!(json["data"]["mileage"], 1200);
    assert_eq!(json["data"]["price"], 27999.5);
    assert_eq!(json["data"]["status"], "available");

    let (_, events) = get(server.router(), "/api/events").await;
    assert_eq!(events["count"], 1);
    assert_eq!(events["data"][0]["name"], "CarCreated");
    assert_eq!(events["data"][0]["payload"]["carNumber"], "CAR12");
}

#[tokio::test]
async fn create_car_errors() {
    let server = server(true);

    let missing = json!({"carNumber": "CAR20", "make": "Kia"}).to_string();
    let (status, json) = send(server.router(), Method::POST, "/api/cars", Some(&missing)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(json["error"]
        .as_str()
        .unwrap()
        .contains("Missing required car information"));

    let duplicate = json!({
        "carNumber": "CAR0", "make": "Kia", "model": "Rio", "color": "red", "owner": "Sam"
    })
    .to_string();
    let (status, json) = send(server.router(), Method::POST, "/api/cars", Some(&duplicate)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["code"], "CONFLICT");
    assert_eq!(json["error"], "Car CAR0 already exists");

    let (status, json) = send(server.router(), Method::POST, "/api/cars", Some("{oops")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn change_owner_then_query_by_owner() {
    let server = server(true);
    let body = json!({"newOwner": "Dave"}).to_string();

    let (status, json) =
        send(server.router(), Method::PUT, "/api/cars/CAR4/owner", Some(&body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["owner"], "Dave");
    assert_eq!(json["message"], "Car CAR4 ownership changed to Dave");

    let (_, json) = get(server.router(), "/api/cars/owner/Dave").await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["data"][0]["key"], "CAR4");

    let (_, json) = get(server.router(), "/api/cars/owner/Adriana").await;
    assert_eq!(json["count"], 0);

    let (status, json) =
        send(server.router(), Method::PUT, "/api/cars/CAR4/owner", Some("{}")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn update_car_details() {
    let server = server(true);

    let (status, json) = send(
        server.router(),
        Method::PUT,
        "/api/cars/CAR2",
        Some(r#"{"color":"white","owner":"ignored"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["color"], "white");
    assert_eq!(json["data"]["owner"], "Jin Soo");

    let (status, json) =
        send(server.router(), Method::PUT, "/api/cars/CAR2", Some("not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["code"], "MALFORMED_INPUT");

    let (status, _) =
        send(server.router(), Method::PUT, "/api/cars/CAR99", Some(r#"{"color":"red"}"#)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn query_by_make_and_history() {
    let server = server(true);

    let (_, json) = get(server.router(), "/api/cars/make/Volkswagen").await;
    assert_eq!(json["count"], 1);
    assert_eq!(json["data"][0]["record"]["model"], "Passat");

    let body = json!({"newOwner": "Lee"}).to_string();
    send(server.router(), Method::PUT, "/api/cars/CAR3/owner", Some(&body)).await;

    let (status, json) = get(server.router(), "/api/cars/CAR3/history").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["count"], 2);
    assert_eq!(json["data"][0]["value"]["owner"], "Max");
    assert_eq!(json["data"][1]["value"]["owner"], "Lee");
    assert_eq!(json["data"][1]["isDelete"], false);
    assert_eq!(json["data"][1]["transactionId"].as_str().unwrap().len(), 64);
}

#[tokio::test]
async fn init_endpoint_seeds_ledger() {
    let server = server(false);

    let (status, json) = send(server.router(), Method::POST, "/api/init", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["message"], "Ledger initialized with sample cars");
    assert_eq!(server.state().store.len(), 5);
}

#[tokio::test]
async fn unknown_route_uses_error_envelope() {
    let server = server(false);
    let (status, json) = get(server.router(), "/api/trucks").await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["success"], false);
    assert_eq!(json["code"], "NO_ROUTE");
}
