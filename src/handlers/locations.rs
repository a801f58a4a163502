use super::common::{created_response, map_service_error, message_response, success_response};
use crate::{
    errors::{ApiError, ServiceError},
    handlers::AppState,
    services::locations::{LocationChanges, NewLocation},
};
use axum::{
    extract::{Json, Path, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::info;
use utoipa::ToSchema;
use uuid::Uuid;

// Request DTOs. Reference and coordinate fields are optional at the wire
// level so an absent field reports which field is missing instead of a
// generic deserialization rejection.

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateLocationRequest {
    pub map_id: Option<Uuid>,
    pub employee_id: Option<Uuid>,
    pub x: Option<f64>,
    pub y: Option<f64>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateLocationRequest {
    pub x: Option<f64>,
    pub y: Option<f64>,
}

fn required<T>(value: Option<T>, field: &str) -> Result<T, ApiError> {
    value.ok_or_else(|| ApiError::ServiceError(ServiceError::MissingField(field.to_string())))
}

/// List all locations with nested map and employee
#[utoipa::path(
    get,
    path = "/api/v1/locations",
    tag = "Locations",
    responses(
        (status = 200, description = "All location pins with nested map and employee"),
        (status = 401, description = "Missing or invalid credentials")
    )
)]
pub async fn list_locations(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let locations = state
        .services
        .locations
        .list_locations()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(locations))
}

/// Get a location by ID
#[utoipa::path(
    get,
    path = "/api/v1/locations/{id}",
    tag = "Locations",
    params(("id" = Uuid, Path, description = "Location id")),
    responses(
        (status = 200, description = "Location with nested map and employee"),
        (status = 404, description = "No location with this id")
    )
)]
pub async fn get_location(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let found = state
        .services
        .locations
        .get_location(location_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound("Location not found".to_string()))?;

    Ok(success_response(found))
}

/// Create a location pin
#[utoipa::path(
    post,
    path = "/api/v1/locations",
    tag = "Locations",
    request_body = CreateLocationRequest,
    responses(
        (status = 201, description = "Location created with nested map and employee"),
        (status = 400, description = "Missing field or coordinate outside [0, 1]"),
        (status = 404, description = "Referenced map or employee does not exist")
    )
)]
pub async fn create_location(
    State(state): State<AppState>,
    Json(payload): Json<CreateLocationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let new_location = NewLocation {
        map_id: required(payload.map_id, "mapId")?,
        employee_id: required(payload.employee_id, "employeeId")?,
        x: required(payload.x, "x")?,
        y: required(payload.y, "y")?,
    };

    let created = state
        .services
        .locations
        .create_location(new_location)
        .await
        .map_err(map_service_error)?;

    info!("Location created: {}", created.location.id);

    Ok(created_response(created))
}

/// Update a location pin; either coordinate may change independently
#[utoipa::path(
    put,
    path = "/api/v1/locations/{id}",
    tag = "Locations",
    params(("id" = Uuid, Path, description = "Location id")),
    request_body = UpdateLocationRequest,
    responses(
        (status = 200, description = "Updated location with nested map and employee"),
        (status = 400, description = "Coordinate outside [0, 1]"),
        (status = 404, description = "No location with this id")
    )
)]
pub async fn update_location(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
    Json(payload): Json<UpdateLocationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let updated = state
        .services
        .locations
        .update_location(
            location_id,
            LocationChanges {
                x: payload.x,
                y: payload.y,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!("Location updated: {}", updated.location.id);

    Ok(success_response(updated))
}

/// Delete a location pin
#[utoipa::path(
    delete,
    path = "/api/v1/locations/{id}",
    tag = "Locations",
    params(("id" = Uuid, Path, description = "Location id")),
    responses(
        (status = 200, description = "Confirmation message"),
        (status = 404, description = "No location with this id")
    )
)]
pub async fn delete_location(
    State(state): State<AppState>,
    Path(location_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .locations
        .delete_location(location_id)
        .await
        .map_err(map_service_error)?;

    info!("Location deleted: {}", location_id);

    Ok(message_response("Location deleted successfully"))
}
