use super::common::{map_service_error, success_response};
use crate::{errors::ApiError, handlers::AppState, services::search::SearchFilter};
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use utoipa::IntoParams;

/// Query parameters accepted by the search endpoint
#[derive(Debug, Deserialize, IntoParams)]
pub struct SearchParams {
    /// Free-text term matched against employee name, email, and phone
    pub query: Option<String>,
    /// Case-insensitive substring filter on the map's state
    pub state: Option<String>,
    /// Case-insensitive substring filter on the map's city
    pub city: Option<String>,
    /// Case-insensitive substring filter on the map's building
    pub building: Option<String>,
    /// Case-insensitive substring filter on the map's floor
    pub floor: Option<String>,
}

/// Search employees by free text and map locale filters
#[utoipa::path(
    get,
    path = "/api/v1/search",
    tag = "Search",
    params(SearchParams),
    responses(
        (status = 200, description = "Matching employees with nested locations and maps, plus a count"),
        (status = 401, description = "Missing or invalid credentials")
    )
)]
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = SearchFilter::new(
        params.query,
        params.state,
        params.city,
        params.building,
        params.floor,
    );

    let response = state
        .services
        .search
        .search(&filter)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(response))
}
