use super::{Error, ErrorData};
use reqwest::StatusCode;
use serde_json::json;

#[actix_web::test]
async fn test_unknown_object() {
    let (upstream, _) = super::start_upstream();
    let server = super::Server::setup_and_wait(upstream).await;

    let res = server.get("/test:404/").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let error: Error = res.json().await.unwrap();
    assert_eq!(
        error,
        Error {
            error: ErrorData {
                code: "not-found".to_string(),
                reason: "object/not-found".to_string(),
                message: "object/not-found".to_string(),
                fields: None,
            }
        }
    );
}

#[actix_web::test]
async fn test_invalid_form() {
    let (upstream, state) = super::start_upstream();
    let server = super::Server::setup_and_wait(upstream).await;

    let res = server
        .post_form("/test:1/edit/rights/", &[("discover_and_read", "EVERYONE")])
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let error: Error = res.json().await.unwrap();
    assert_eq!(error.error.reason, "form/invalid");
    assert_eq!(
        error.error.fields,
        Some(json!({
            "discover_and_read": [
                "Select a valid choice. EVERYONE is not one of the available choices."
            ],
            "owners": ["This field is required."],
        }))
    );
    assert!(state.updates.lock().unwrap().is_empty());
}

#[actix_web::test]
async fn test_unreachable_upstream() {
    let (upstream, _) = super::start_upstream();

    // Health does not touch the storage API, so the server still starts
    let server = super::Server::setup_with_urls(
        format!("http://127.0.0.1:{}/items/", super::free_port()),
        format!("http://{upstream}/folders/"),
    );
    server.wait().await.unwrap();

    let res = server.get("/test:1/").send().await.unwrap();
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let error: Error = res.json().await.unwrap();
    assert_eq!(error.error.reason, "upstream/unavailable");
}
