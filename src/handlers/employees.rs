use super::common::{created_response, map_service_error, message_response, success_response};
use crate::{
    errors::ApiError,
    handlers::AppState,
    services::employees::{EmployeeChanges, NewEmployee},
    services::images::ImageStore,
};
use axum::{
    extract::{Multipart, Path, State},
    response::IntoResponse,
};
use tracing::info;
use uuid::Uuid;

/// Fields collected from a multipart employee request. A `picture` file
/// part takes precedence over a caller-supplied `pictureUrl`.
#[derive(Debug, Default)]
struct EmployeeForm {
    name: Option<String>,
    phone: Option<String>,
    email: Option<String>,
    picture_url: Option<String>,
    uploaded_picture: Option<String>,
}

impl EmployeeForm {
    fn resolved_picture(self) -> (Option<String>, Option<String>, Option<String>, Option<String>) {
        let picture = self.uploaded_picture.or(self.picture_url);
        (self.name, self.phone, self.email, picture)
    }
}

async fn collect_employee_form(
    multipart: &mut Multipart,
    images: &ImageStore,
) -> Result<EmployeeForm, ApiError> {
    let mut form = EmployeeForm::default();

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
            "phone" => form.phone = Some(read_text(field).await?),
            "email" => form.email = Some(read_text(field).await?),
            "pictureUrl" => form.picture_url = Some(read_text(field).await?),
            "picture" => {
                let original_name = field.file_name().unwrap_or_default().to_string();
                let data = field.bytes().await.map_err(|e| {
                    ApiError::BadRequest(format!("failed to read picture upload: {}", e))
                })?;
                let url = images
                    .store(&original_name, data)
                    .await
                    .map_err(map_service_error)?;
                form.uploaded_picture = Some(url);
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

/// List all employees sorted by name, with nested locations and maps
pub async fn list_employees(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let employees = state
        .services
        .employees
        .list_employees()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(employees))
}

/// Get an employee by ID with nested locations and maps
pub async fn get_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let found = state
        .services
        .employees
        .get_employee(employee_id)
        .await
        .map_err(map_service_error)?
        .ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))?;

    Ok(success_response(found))
}

/// Create a new employee from a multipart form
pub async fn create_employee(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = collect_employee_form(&mut multipart, &state.services.images).await?;
    let (name, phone, email, picture_url) = form.resolved_picture();

    let created = state
        .services
        .employees
        .create_employee(NewEmployee {
            name: name.unwrap_or_default(),
            phone: phone.unwrap_or_default(),
            email: email.unwrap_or_default(),
            picture_url,
        })
        .await
        .map_err(map_service_error)?;

    info!("Employee created: {}", created.id);

    Ok(created_response(created))
}

/// Update an employee; any subset of fields, optionally with a new picture
pub async fn update_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let form = collect_employee_form(&mut multipart, &state.services.images).await?;
    let (name, phone, email, picture_url) = form.resolved_picture();

    let updated = state
        .services
        .employees
        .update_employee(
            employee_id,
            EmployeeChanges {
                name,
                phone,
                email,
                picture_url,
            },
        )
        .await
        .map_err(map_service_error)?;

    info!("Employee updated: {}", updated.id);

    Ok(success_response(updated))
}

/// Delete an employee
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(employee_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .services
        .employees
        .delete_employee(employee_id)
        .await
        .map_err(map_service_error)?;

    info!("Employee deleted: {}", employee_id);

    Ok(message_response("Employee deleted successfully"))
}
