mod common;

use axum::http::StatusCode;
use common::{TestApp, FAKE_PNG};

#[tokio::test]
async fn create_map_returns_created_row_with_stored_image() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_multipart(
            "/api/v1/maps",
            Some(&app.admin_token),
            &[
                ("name", "HQ"),
                ("state", "CA"),
                ("city", "SF"),
                ("building", "A"),
                ("floor", "1"),
            ],
            Some(("image", "plan.png", FAKE_PNG)),
        )
        .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["id"].is_string());
    assert_eq!(body["name"], "HQ");
    assert_eq!(body["state"], "CA");
    assert_eq!(body["floor"], "1");
    let image_url = body["imageUrl"].as_str().unwrap();
    assert!(image_url.starts_with("/uploads/"));
    assert!(image_url.ends_with(".png"));
    assert!(body["createdAt"].is_string());
}

#[tokio::test]
async fn create_map_without_image_is_rejected() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_multipart(
            "/api/v1/maps",
            Some(&app.admin_token),
            &[
                ("name", "HQ"),
                ("state", "CA"),
                ("city", "SF"),
                ("building", "A"),
                ("floor", "1"),
            ],
            None,
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Image file is required");

    let (_, maps) = app.get("/api/v1/maps", Some(&app.user_token)).await;
    assert_eq!(maps.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn create_map_with_missing_field_is_rejected() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_multipart(
            "/api/v1/maps",
            Some(&app.admin_token),
            &[("name", "HQ"), ("state", "CA"), ("city", "SF")],
            Some(("image", "plan.png", FAKE_PNG)),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Missing required field: building");
}

#[tokio::test]
async fn create_map_rejects_unsupported_image_extension() {
    let app = TestApp::new().await;

    let (status, body) = app
        .post_multipart(
            "/api/v1/maps",
            Some(&app.admin_token),
            &[
                ("name", "HQ"),
                ("state", "CA"),
                ("city", "SF"),
                ("building", "A"),
                ("floor", "1"),
            ],
            Some(("image", "plan.gif", FAKE_PNG)),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains(".jpg, .jpeg, and .png"));
}

#[tokio::test]
async fn list_maps_is_sorted_by_state_city_building() {
    let app = TestApp::new().await;

    app.create_map("Second", "NY", "NYC", "B", "2").await;
    app.create_map("Third", "NY", "NYC", "C", "1").await;
    app.create_map("First", "CA", "SF", "A", "1").await;

    let (status, body) = app.get("/api/v1/maps", Some(&app.user_token)).await;
    assert_eq!(status, StatusCode::OK);

    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["First", "Second", "Third"]);
}

#[tokio::test]
async fn get_map_includes_locations_with_employees() {
    let app = TestApp::new().await;

    let map_id = app.create_map("HQ", "CA", "SF", "A", "1").await;
    let employee_id = app.create_employee("Jo", "555", "jo@x.com").await;
    app.create_location(&map_id, &employee_id, 0.5, 0.5).await;

    let (status, body) = app
        .get(&format!("/api/v1/maps/{map_id}"), Some(&app.user_token))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], map_id.as_str());
    let locations = body["locations"].as_array().unwrap();
    assert_eq!(locations.len(), 1);
    assert_eq!(locations[0]["employee"]["name"], "Jo");
    assert_eq!(locations[0]["x"], 0.5);
}

#[tokio::test]
async fn get_unknown_map_returns_404() {
    let app = TestApp::new().await;

    let (status, body) = app
        .get(
            "/api/v1/maps/00000000-0000-0000-0000-000000000000",
            Some(&app.user_token),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Map not found");
}

#[tokio::test]
async fn update_map_patches_only_supplied_fields() {
    let app = TestApp::new().await;
    let map_id = app.create_map("HQ", "CA", "SF", "A", "1").await;

    let (status, body) = app
        .put_multipart(
            &format!("/api/v1/maps/{map_id}"),
            Some(&app.admin_token),
            &[("name", "HQ West"), ("floor", "2")],
            None,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "HQ West");
    assert_eq!(body["floor"], "2");
    // Untouched fields survive the patch
    assert_eq!(body["state"], "CA");
    assert_eq!(body["city"], "SF");
}

#[tokio::test]
async fn update_map_can_replace_image() {
    let app = TestApp::new().await;
    let map_id = app.create_map("HQ", "CA", "SF", "A", "1").await;

    let (_, before) = app
        .get(&format!("/api/v1/maps/{map_id}"), Some(&app.user_token))
        .await;
    let old_url = before["imageUrl"].as_str().unwrap().to_string();

    let (status, body) = app
        .put_multipart(
            &format!("/api/v1/maps/{map_id}"),
            Some(&app.admin_token),
            &[],
            Some(("image", "replacement.jpg", b"new-bytes")),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    let new_url = body["imageUrl"].as_str().unwrap();
    assert_ne!(new_url, old_url);
    assert!(new_url.ends_with(".jpg"));
}

#[tokio::test]
async fn delete_map_returns_confirmation_and_removes_row() {
    let app = TestApp::new().await;
    let map_id = app.create_map("HQ", "CA", "SF", "A", "1").await;

    let (status, body) = app
        .delete(&format!("/api/v1/maps/{map_id}"), Some(&app.admin_token))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Map deleted successfully");

    let (status, _) = app
        .get(&format!("/api/v1/maps/{map_id}"), Some(&app.user_token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .delete(&format!("/api/v1/maps/{map_id}"), Some(&app.admin_token))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn duplicate_locale_tuples_are_allowed() {
    let app = TestApp::new().await;

    app.create_map("HQ", "CA", "SF", "A", "1").await;
    app.create_map("HQ", "CA", "SF", "A", "1").await;

    let (_, maps) = app.get("/api/v1/maps", Some(&app.user_token)).await;
    assert_eq!(maps.as_array().unwrap().len(), 2);
}
