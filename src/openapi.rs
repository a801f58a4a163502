use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wayfinder API",
        version = "0.1.0",
        description = r#"
# Wayfinder Office Directory API

Backend for an office floor-plan directory. Administrators upload building
floor-plan images and pin employee seats onto them using normalized
coordinates; end users browse maps and search the directory to see where a
colleague sits.

## Authentication

All API endpoints except `/health`, `/api/v1/status`, and
`/api/v1/auth/status` require a bearer JWT:

```
Authorization: Bearer <your-jwt-token>
```

Read endpoints accept any verified identity; create/update/delete
endpoints require the admin role.

## Coordinates

Location pins use fractional coordinates: `x` and `y` are floating-point
numbers in `[0, 1]`, positioned relative to the map image's bounding box
independent of its pixel resolution.
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Maps", description = "Floor-plan map management"),
        (name = "Employees", description = "Directory entry management"),
        (name = "Locations", description = "Coordinate pin management"),
        (name = "Search", description = "Directory search"),
        (name = "Health", description = "Health check endpoints")
    ),
    paths(
        // Locations
        crate::handlers::locations::list_locations,
        crate::handlers::locations::get_location,
        crate::handlers::locations::create_location,
        crate::handlers::locations::update_location,
        crate::handlers::locations::delete_location,

        // Search
        crate::handlers::search::search,

        // Maps, employees, and health intentionally omitted from OpenAPI paths for now
    ),
    components(
        schemas(
            crate::handlers::locations::CreateLocationRequest,
            crate::handlers::locations::UpdateLocationRequest,
            crate::auth::AuthStatusResponse,
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}
