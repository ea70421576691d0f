
use reqwest::StatusCode;
use serde_json::Value;
use test_utils::*;

#[actix_rt::test]
async fn serves_stored_upload_with_sniffed_type() {
    let app = TestApp::spawn(RunwayScript::Statuses(vec!["SUCCEEDED"])).await;
    let png = png_bytes(16, 9);
    std::fs::write(app.upload_dir.path().join("abc_cat.png"), &png).unwrap();

    let response = app
        .client
        .get(format!("{}/uploads/abc_cat.png", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()["content-type"], "image/png");
    assert_eq!(response.bytes().await.unwrap().to_vec(), png);
}

#[actix_rt::test]
async fn missing_upload_is_not_found() {
    let app = TestApp::spawn(RunwayScript::Statuses(vec!["SUCCEEDED"])).await;

    let response = app
        .client
        .get(format!("{}/uploads/nothing_here.png", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "error");
}

#[actix_rt::test]
async fn unsanitized_names_are_not_served() {
    let app = TestApp::spawn(RunwayScript::Statuses(vec!["SUCCEEDED"])).await;
    std::fs::write(app.upload_dir.path().join("a b.png"), png_bytes(4, 4)).unwrap();

    for name in ["a%20b.png", "..%2F..%2Fetc%2Fpasswd"] {
        let response = app
            .client
            .get(format!("{}/uploads/{}", app.address, name))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{name}");
    }
}

#[actix_rt::test]
async fn health_reports_upload_dir() {
    let app = TestApp::spawn(RunwayScript::Statuses(vec!["SUCCEEDED"])).await;

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["upload_dir"], "OK");
}
