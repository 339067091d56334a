//! Car routes

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    response::Json,
};
use carledger_core::{Car, HistoryEntry, NewCar, QueryResult, Record};
use serde::Deserialize;
use serde_json::Value;

use super::ApiResponse;
use crate::error::ApiResult;
use crate::AppState;

/// Create car request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCarRequest {
    #[serde(default)]
    pub car_number: String,
    #[serde(default)]
    pub make: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub owner: String,
    /// Numbers or numeric strings; the contract parses them leniently
    #[serde(default)]
    pub year: Option<Value>,
    #[serde(default)]
    pub mileage: Option<Value>,
    #[serde(default)]
    pub price: Option<Value>,
}

impl CreateCarRequest {
    fn into_new_car(self) -> NewCar {
        NewCar {
            key: self.car_number,
            make: self.make,
            model: self.model,
            color: self.color,
            owner: self.owner,
            year: self.year.as_ref().and_then(as_text),
            mileage: self.mileage.as_ref().and_then(as_text),
            price: self.price.as_ref().and_then(as_text),
        }
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// Change owner request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangeOwnerRequest {
    #[serde(default)]
    pub new_owner: String,
}

/// List every car
pub async fn list_cars(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ApiResponse<Vec<QueryResult>>>> {
    let cars = state.contract.query_all_cars(&state.transaction())?;
    tracing::info!("Retrieved {} cars", cars.len());
    Ok(Json(ApiResponse::list(cars)))
}

/// Get one car
pub async fn get_car(
    State(state): State<Arc<AppState>>,
    Path(car_number): Path<String>,
) -> ApiResult<Json<ApiResponse<Record>>> {
    let text = state.contract.query_car(&state.transaction(), &car_number)?;
    Ok(Json(ApiResponse::ok(Record::from_bytes(text.as_bytes()))))
}

/// Create a car
pub async fn create_car(
    State(state): State<Arc<AppState>>,
    body: Result<Json<CreateCarRequest>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ApiResponse<Car>>)> {
    let Json(req) = body?;
    let new_car = req.into_new_car();
    let key = new_car.key.clone();

    let car = state.contract.create_car(&state.transaction(), new_car)?;
    tracing::info!("Created car: {}", key);

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok(car).with_message(format!("Car {} created successfully", key))),
    ))
}

/// Transfer a car
pub async fn change_owner(
    State(state): State<Arc<AppState>>,
    Path(car_number): Path<String>,
    body: Result<Json<ChangeOwnerRequest>, JsonRejection>,
) -> ApiResult<Json<ApiResponse<Car>>> {
    let Json(req) = body?;
    let car = state
        .contract
        .change_car_owner(&state.transaction(), &car_number, &req.new_owner)?;
    tracing::info!("Changed owner of car {} to {}", car_number, req.new_owner);

    Ok(Json(ApiResponse::ok(car).with_message(format!(
        "Car {} ownership changed to {}",
        car_number, req.new_owner
    ))))
}

/// Update color, mileage, price or status
///
/// The body is passed to the contract as text, so malformed JSON is reported
/// by the contract like any other invalid update.
pub async fn update_car(
    State(state): State<Arc<AppState>>,
    Path(car_number): Path<String>,
    body: String,
) -> ApiResult<Json<ApiResponse<Car>>> {
    let car = state
        .contract
        .update_car_details(&state.transaction(), &car_number, &body)?;
    tracing::info!("Updated car {}", car_number);

    Ok(Json(
        ApiResponse::ok(car).with_message(format!("Car {} updated successfully", car_number)),
    ))
}

/// Cars held by an owner
pub async fn cars_by_owner(
    State(state): State<Arc<AppState>>,
    Path(owner): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<QueryResult>>>> {
    let cars = state
        .contract
        .query_cars_by_owner(&state.transaction(), &owner)?;
    tracing::info!("Found {} cars for owner {}", cars.len(), owner);
    Ok(Json(ApiResponse::list(cars)))
}

/// Cars of a make
pub async fn cars_by_make(
    State(state): State<Arc<AppState>>,
    Path(make): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<QueryResult>>>> {
    let cars = state.contract.query_cars_by_make(&state.transaction(), &make)?;
    tracing::info!("Found {} cars of make {}", cars.len(), make);
    Ok(Json(ApiResponse::list(cars)))
}

/// Committed versions of a car
pub async fn car_history(
    State(state): State<Arc<AppState>>,
    Path(car_number): Path<String>,
) -> ApiResult<Json<ApiResponse<Vec<HistoryEntry>>>> {
    let history = state
        .contract
        .get_car_history(&state.transaction(), &car_number)?;
    Ok(Json(ApiResponse::list(history)))
}

/// Seed the ledger
pub async fn init_ledger(
    State(state): State<Arc<AppState>>,
) -> ApiResult<Json<ApiResponse<Value>>> {
    state.contract.init_ledger(&state.transaction())?;
    tracing::info!("Ledger initialized");
    Ok(Json(
        ApiResponse::ok(Value::Null).with_message("Ledger initialized with sample cars"),
    ))
}
