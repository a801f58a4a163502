use super::common::{created_response, map_service_error, message_response, success_response};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::images::ImageStore,
    services::maps::{MapChanges, NewMap},
};
use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

/// Fields collected from a multipart map request. Uploading the image
/// happens while parsing, so `image_url` is already a stored reference.
#[derive(Debug, Default)]
struct MapForm {
    name: Option<String>,
    state: Option<String>,
    city: Option<String>,
    building: Option<String>,
    floor: Option<String>,
    image_url: Option<String>,
}

async fn collect_map_form(
    multipart: &mut Multipart,
    images: &ImageStore,
) -> Result<MapForm, ApiError> {
    let mut form = MapForm::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart request: {}", e)))?
    {
        let Some(field_name) = field.name().map(str::to_string) else {
            continue;
        };

        match field_name.as_str() {
            "name" => form.name = Some(read_text(field).await?),
            "state" => form.state = Some(read_text(field).await?),
            "city" => form.city = Some(read_text(field).await?),
            "building" => form.building = Some(read_text(field).await?),
            "floor" => form.floor = Some(read_text(field).await?),
            "image" => {
                let original_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| {
                    ApiError::BadRequest(format!("failed to read image upload: {}", e))
                })?;
                let url = images
                    .store(&original_name, data)
                    .await
                    .map_err(map_service_error)?;
                form.image_url = Some(url);
            }
            _ => {}
        }
    }

    Ok(form)
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String, ApiError> {
    field
        .text()
        .await
        .map_err(|e| ApiError::BadRequest(format!("malformed multipart field: {}", e)))
}

/// List all maps, sorted by state, city, and building
pub async fn list_maps(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let maps = state
        .services
        .maps
        .list_maps()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(maps))
}

/// Get a map by ID with its locations and their employees
pub async fn get_map(
    State(state): State<AppState>,
    Path(map_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let found = state
        .services
        .maps
        .get_map(map_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound("Map not found".to_string()))?;

    Ok(success_response(found))
}

/// Create a new map from a multipart form with a required image
pub async fn create_map(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = collect_map_form(&mut multipart, &state.services.images).await?;

    let created = state
        .services
        .maps
        .create_map(NewMap {
            name: form.name.unwrap_or_default(),
            state: form.state.unwrap_or_default(),
            city: form.city.unwrap_or_default(),
            building: form.building.unwrap_or_default(),
            floor: form.floor.unwrap_or_default(),
            image_url: form.image_url,
        })
        .await
        .map_err(map_service_error)?;

    info!("Map created: {}", created.id);

    Ok(created_response(created))
}

/// Update a map; any subset of fields, optionally with a replacement image
pub async fn update_map(
    State(state): State<AppState>,
    Path(map_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = collect_map_form(&mut multipart, &state.services.images).await?;

    let updated = state
        .services
        .maps
        .update_map(
            map_id,
            MapChanges {
                name: form.name,
                state: form.state,
                city: form.city,
                building: form.building,
                floor: form.floor,
                image_url: form.image_url,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!("Map updated: {}", updated.id);

    Ok(success_response(updated))
}

/// Delete a map
pub async fn delete_map(
    State(state): State<AppState>,
    Path(map_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .maps
        .delete_map(map_id)
        .await
        .map_err(map_service_error)?;

    info!("Map deleted: {}", map_id);

    Ok(message_response("Map deleted successfully"))
}
