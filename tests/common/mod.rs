// Not every test binary exercises every helper.
#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use wayfinder_api::{
    auth::{AuthConfig, AuthService, Role},
    config::AppConfig,
    db,
    handlers::AppServices,
    services::images::ImageStore,
    AppState,
};

const TEST_JWT_SECRET: &str =
    "integration_test_jwt_secret_value_with_enough_length_and_entropy_0123456789";

const MULTIPART_BOUNDARY: &str = "wayfinder-test-boundary";

/// A one-pixel-ish stand-in for a floor-plan image; images are stored
/// as-is, so any bytes work.
pub const FAKE_PNG: &[u8] = b"\x89PNG\r\n\x1a\nfake-floor-plan-bytes";

/// Helper harness for spinning up an application backed by an in-memory
/// SQLite database.
pub struct TestApp {
    router: Router,
    pub admin_token: String,
    pub user_token: String,
    _upload_dir: tempfile::TempDir,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        Self::with_auth_disabled(false).await
    }

    /// Construct a test application with the credential check disabled.
    pub async fn with_auth_disabled(disabled: bool) -> Self {
        let upload_dir = tempfile::tempdir().expect("failed to create upload dir");

        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            TEST_JWT_SECRET.to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.auth_disabled = disabled;
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.upload_dir = upload_dir.path().to_string_lossy().into_owned();

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool).await.expect("migrations failed");

        let db_arc = Arc::new(pool);
        let images = Arc::new(ImageStore::new(upload_dir.path(), cfg.upload_max_bytes));
        images
            .ensure_root()
            .await
            .expect("failed to prepare upload dir");

        let services = AppServices::new(db_arc.clone(), images);
        let state = AppState {
            db: db_arc,
            config: cfg.clone(),
            services,
        };

        let auth_service = Arc::new(AuthService::new(AuthConfig::from(&cfg)));
        let admin_token = auth_service
            .generate_token("test-admin", Some("admin@example.com"), Role::Admin)
            .expect("failed to issue admin token");
        let user_token = auth_service
            .generate_token("test-user", Some("user@example.com"), Role::User)
            .expect("failed to issue user token");

        let router = wayfinder_api::build_router(state, auth_service);

        Self {
            router,
            admin_token,
            user_token,
            _upload_dir: upload_dir,
        }
    }

    /// Issues a request against the in-process router and parses the JSON body.
    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Body,
        content_type: Option<&str>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        if let Some(content_type) = content_type {
            builder = builder.header("content-type", content_type);
        }
        let request = builder.body(body).expect("failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("request failed");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("failed to read response body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, value)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("GET", uri, token, Body::empty(), None).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        token: Option<&str>,
        payload: &Value,
    ) -> (StatusCode, Value) {
        self.request(
            "POST",
            uri,
            token,
            Body::from(payload.to_string()),
            Some("application/json"),
        )
        .await
    }

    pub async fn put_json(
        &self,
        uri: &str,
        token: Option<&str>,
        payload: &Value,
    ) -> (StatusCode, Value) {
        self.request(
            "PUT",
            uri,
            token,
            Body::from(payload.to_string()),
            Some("application/json"),
        )
        .await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        self.request("DELETE", uri, token, Body::empty(), None).await
    }

    pub async fn post_multipart(
        &self,
        uri: &str,
        token: Option<&str>,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
    ) -> (StatusCode, Value) {
        let body = multipart_body(fields, file);
        self.request(
            "POST",
            uri,
            token,
            Body::from(body),
            Some(&format!(
                "multipart/form-data; boundary={MULTIPART_BOUNDARY}"
            )),
        )
        .await
    }

    pub async fn put_multipart(
        &self,
        uri: &str,
        token: Option<&str>,
        fields: &[(&str, &str)],
        file: Option<(&str, &str, &[u8])>,
    ) -> (StatusCode, Value) {
        let body = multipart_body(fields, file);
        self.request(
            "PUT",
            uri,
            token,
            Body::from(body),
            Some(&format!(
                "multipart/form-data; boundary={MULTIPART_BOUNDARY}"
            )),
        )
        .await
    }

    /// Creates a map through the API and returns its id.
    pub async fn create_map(
        &self,
        name: &str,
        state: &str,
        city: &str,
        building: &str,
        floor: &str,
    ) -> String {
        let (status, body) = self
            .post_multipart(
                "/api/v1/maps",
                Some(&self.admin_token),
                &[
                    ("name", name),
                    ("state", state),
                    ("city", city),
                    ("building", building),
                    ("floor", floor),
                ],
                Some(("image", "plan.png", FAKE_PNG)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "map create failed: {body}");
        body["id"].as_str().expect("map id missing").to_string()
    }

    /// Creates an employee through the API and returns its id.
    pub async fn create_employee(&self, name: &str, phone: &str, email: &str) -> String {
        let (status, body) = self
            .post_multipart(
                "/api/v1/employees",
                Some(&self.admin_token),
                &[("name", name), ("phone", phone), ("email", email)],
                None,
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "employee create failed: {body}");
        body["id"].as_str().expect("employee id missing").to_string()
    }

    /// Creates a location pin through the API and returns its id.
    pub async fn create_location(&self, map_id: &str, employee_id: &str, x: f64, y: f64) -> String {
        let (status, body) = self
            .post_json(
                "/api/v1/locations",
                Some(&self.admin_token),
                &serde_json::json!({
                    "mapId": map_id,
                    "employeeId": employee_id,
                    "x": x,
                    "y": y,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "location create failed: {body}");
        body["id"].as_str().expect("location id missing").to_string()
    }
}

/// Builds a `multipart/form-data` body with the given text fields and an
/// optional file part.
pub fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    if let Some((name, filename, bytes)) = file {
        body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{name}\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}
