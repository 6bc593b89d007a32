use reqwest::StatusCode;

#[actix_web::test]
async fn test_landing_redirects() {
    let (upstream, _) = super::start_upstream();
    let server = super::Server::setup_and_wait(upstream).await;

    let res = server
        .post_form("/", &[("pid", "test:1")])
        .send()
        .await
        .unwrap();

    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()["location"], "/test%3A1/");
}

#[actix_web::test]
async fn test_edit_rights() {
    let (upstream, state) = super::start_upstream();
    let server = super::Server::setup_and_wait(upstream).await;

    let res = server
        .post_form(
            "/test:1/edit/rights/",
            &[
                ("discover_and_read", "BDR_PUBLIC"),
                ("owners", "BROWN:DEPARTMENT:LIBRARY:REPOSITORY"),
            ],
        )
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let updates = state.updates.lock().unwrap();
    assert_eq!(updates.len(), 1);
    assert_eq!(updates[0][0], ("pid".to_string(), "test:1".to_string()));
    assert_eq!(updates[0][1].0, "rights");
    assert!(updates[0][1].1.contains("<group>BDR_PUBLIC</group>"));
}

#[actix_web::test]
async fn test_edit_collections() {
    let (upstream, state) = super::start_upstream();
    let server = super::Server::setup_and_wait(upstream).await;

    let res = server.get("/test:1/edit/collection/").send().await.unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["current"], "30");
    assert_eq!(body["choices"][1], serde_json::json!(["31", "Maps"]));

    let res = server
        .post_form(
            "/test:1/edit/collection/",
            &[("collections", "30"), ("collections", "31")],
        )
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let updates = state.updates.lock().unwrap();
    assert_eq!(
        updates[0][1],
        (
            "ir".to_string(),
            r#"{"parameters":{"folders":"30#30+31#31"}}"#.to_string()
        )
    );
}

#[actix_web::test]
async fn test_edit_mods() {
    let (upstream, state) = super::start_upstream();
    let server = super::Server::setup_and_wait(upstream).await;

    let res = server.get("/test:1/MODS/edit/").send().await.unwrap();
    let body: serde_json::Value = res.json().await.unwrap();
    assert_eq!(body["xml_content"], "<mods/>");

    let res = server
        .post_form(
            "/test:1/MODS/edit/",
            &[("xml_content", "<mods><titleInfo/></mods>")],
        )
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let uploads = state.uploads.lock().unwrap();
    assert_eq!(uploads[0].1, "MODS");
    assert_eq!(uploads[0].2, "text/xml");
    assert_eq!(uploads[0].3, b"<mods><titleInfo/></mods>");
}

#[actix_web::test]
async fn test_upload_file() {
    let (upstream, state) = super::start_upstream();
    let server = super::Server::setup_and_wait(upstream).await;

    let res = server
        .client
        .post(format!("{}/test:1/PDF/edit/?label=v2.pdf", server.base_url))
        .header("content-type", "application/pdf")
        .body("%PDF-1.7")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::SEE_OTHER);

    let uploads = state.uploads.lock().unwrap();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0].0, "test:1");
    assert_eq!(uploads[0].2, "application/pdf");
}
