use std::time::Duration;

#[actix_web::test]
async fn test_start_stop() {
    let (upstream, _) = super::start_upstream();

    let api_port;
    {
        let server = super::Server::setup_and_wait(upstream).await;
        api_port = server.api_port;

        let res = server.get("/").send().await.unwrap();
        let body: serde_json::Value = res.json().await.unwrap();
        assert_eq!(body["server"], "repo_direct");
    }

    tokio::time::sleep(Duration::from_millis(500)).await;

    reqwest::get(format!("http://127.0.0.1:{api_port}/v0/health"))
        .await
        .expect_err("Server should be stopped");
}

#[test]
fn test_missing_setting_fails_startup() {
    let root_dir = tempfile::tempdir().unwrap();

    let status = super::Server::command(&root_dir, super::free_port())
        .env("BDR_API_URL", "http://127.0.0.1:1/items/")
        .env("LIBRARY_PARENT_FOLDER_ID", "1")
        .status()
        .unwrap();

    assert!(!status.success());
}
