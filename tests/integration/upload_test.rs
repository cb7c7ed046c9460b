//! Integration tests for training-data uploads.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::{PNG, TestApp, encode};
use trainhub_core::traits::StorageProvider;

#[tokio::test]
async fn test_unknown_project_returns_404() {
    let app = TestApp::new().await;

    let response = app
        .upload(json!({
            "project_name": "ghost",
            "data_files": [{ "content": encode(PNG), "category": "ok" }]
        }))
        .await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body["success"], false);
    assert_eq!(
        response.body["message"],
        "Failed to upload training data: Project 'ghost' does not exist."
    );
    assert!(app.store.folders().await.is_empty());
}

#[tokio::test]
async fn test_files_are_placed_by_category() {
    let app = TestApp::new().await;
    let data_url = format!("data:image/png;base64,{}", encode(PNG));

    let response = app
        .upload(json!({
            "project_name": "alpha",
            "data_files": [
                { "content": encode(PNG), "category": "ok" },
                { "content": data_url, "category": "Defective" },
                { "content": encode(b"col1,col2"), "category": "ok", "name": "table.csv" }
            ]
        }))
        .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    let data = &response.body["data"];
    assert_eq!(data["project"], "alpha");
    assert_eq!(data["count"], 3);
    assert_eq!(data["folder_path"], "/app/file/Home/training_data/alpha");
    assert_eq!(data["message"], "Training data uploaded successfully.");

    let files = data["files"].as_array().unwrap();
    assert_eq!(files[0]["label"], "ok");
    assert_eq!(files[1]["label"], "defective");
    assert!(files[1]["name"].as_str().unwrap().starts_with("alphadefective2_"));
    assert!(files[2]["name"].as_str().unwrap().ends_with(".csv"));

    let folders = app.store.folders().await;
    for record in app.store.files().await {
        let folder = folders.iter().find(|f| f.id == record.folder_id).unwrap();
        assert_eq!(folder.name, record.category);
        assert_eq!(folder.attached_to_name.as_deref(), Some("alpha"));
        assert_eq!(record.attached_to_type.as_deref(), Some("Project"));
        assert!(record.is_private);
        assert!(app.storage.exists(&record.storage_path).await.unwrap());
        assert_eq!(record.file_url, format!("/private/files/{}", record.storage_path));
    }

    for dir in ["ok", "defective", "model"] {
        let path = format!("Home/training_data/alpha/{dir}");
        assert!(app.storage.exists(&path).await.unwrap(), "{path}");
    }
}

#[tokio::test]
async fn test_repeat_upload_reuses_folders() {
    let app = TestApp::new().await;
    let body = json!({
        "project_name": "alpha",
        "data_files": [{ "content": encode(PNG), "category": "ok" }]
    });

    assert_eq!(app.upload(body.clone()).await.status, StatusCode::OK);
    assert_eq!(app.upload(body).await.status, StatusCode::OK);

    let folders = app.store.folders().await;
    let paths: Vec<&str> = folders.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "Home/training_data",
            "Home/training_data/alpha",
            "Home/training_data/alpha/defective",
            "Home/training_data/alpha/model",
            "Home/training_data/alpha/ok",
        ]
    );
    assert_eq!(app.store.files().await.len(), 2);
}

#[tokio::test]
async fn test_projects_share_the_root_folder() {
    let app = TestApp::new().await;
    for project in ["alpha", "beta"] {
        let response = app
            .upload(json!({
                "project_name": project,
                "data_files": [{ "content": encode(PNG), "category": "ok" }]
            }))
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    let folders = app.store.folders().await;
    assert_eq!(folders.iter().filter(|f| f.name == "training_data").count(), 1);
    assert_eq!(folders.iter().filter(|f| f.name == "ok").count(), 2);
}

#[tokio::test]
async fn test_failed_write_leaves_no_partial_state() {
    let app = TestApp::new().await;
    // A plain file where the defective folder's directory should go makes
    // the second blob write fail after the first one succeeded.
    app.storage
        .write("Home/training_data/alpha/defective", bytes_of(b"in the way"))
        .await
        .unwrap();

    let response = app
        .upload(json!({
            "project_name": "alpha",
            "data_files": [
                { "content": encode(PNG), "category": "ok" },
                { "content": encode(PNG), "category": "defective" }
            ]
        }))
        .await;

    assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(
        response.body["message"]
            .as_str()
            .unwrap()
            .starts_with("Failed to upload training data: ")
    );
    assert!(app.store.folders().await.is_empty());
    assert!(app.store.files().await.is_empty());
    assert!(!app.storage.exists("Home/training_data/alpha/ok").await.unwrap());
    assert!(!app.storage.exists("Home/training_data/alpha/model").await.unwrap());
}

#[tokio::test]
async fn test_legacy_payload_shape() {
    let app = TestApp::new().await;
    let training_data = json!([
        { "image": encode(PNG), "label": "OK" },
        { "image": encode(PNG), "label": "scratch" }
    ])
    .to_string();
    let model_file =
        json!({ "file_data": encode(b"weights"), "file_name": "net.keras" }).to_string();

    let response = app
        .upload(json!({
            "project_name": "alpha",
            "training_data": training_data,
            "model_file": model_file
        }))
        .await;

    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    let data = &response.body["data"];
    assert_eq!(data["count"], 2);
    assert_eq!(
        data["message"],
        "Training data and model file (.h5) uploaded successfully."
    );
    assert_eq!(data["skipped"][0]["category"], "scratch");
    assert_eq!(data["model_file"]["original_name"], "net.keras");
    let model_name = data["model_file"]["name"].as_str().unwrap();
    assert!(model_name.starts_with("alphamodel") && model_name.ends_with(".h5"));
    assert!(
        data["model_file"]["url"]
            .as_str()
            .unwrap()
            .starts_with("/private/files/Home/training_data/alpha/model/")
    );
}

#[tokio::test]
async fn test_empty_model_string_means_no_model() {
    let app = TestApp::new().await;

    let response = app
        .upload(json!({
            "project_name": "alpha",
            "data_files": [{ "content": encode(PNG), "category": "ok" }],
            "model_file": ""
        }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["data"].get("model_file").is_none());
}

#[tokio::test]
async fn test_missing_content_returns_400() {
    let app = TestApp::new().await;

    let response = app
        .upload(json!({
            "project_name": "alpha",
            "data_files": [{ "category": "ok" }]
        }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["error"], "VALIDATION_ERROR");
    assert!(app.store.folders().await.is_empty());
}

#[tokio::test]
async fn test_invalid_base64_returns_400() {
    let app = TestApp::new().await;

    let response = app
        .upload(json!({
            "project_name": "alpha",
            "data_files": [{ "content": "%%%", "category": "ok" }]
        }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_malformed_body_returns_400() {
    let app = TestApp::new().await;

    let response = app
        .request("POST", "/api/uploads", Some("{not json".to_string()))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_missing_project_name_returns_400() {
    let app = TestApp::new().await;

    let response = app.upload(json!({ "data_files": [] })).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_reject_policy_for_unknown_categories() {
    let app = TestApp::with_config(|config| {
        config.upload.unknown_category = trainhub_core::config::UnknownCategoryPolicy::Reject;
    })
    .await;

    let response = app
        .upload(json!({
            "project_name": "alpha",
            "data_files": [{ "content": encode(PNG), "category": "scratch" }]
        }))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(app.store.folders().await.is_empty());
}

fn bytes_of(data: &'static [u8]) -> bytes::Bytes {
    bytes::Bytes::from_static(data)
}
