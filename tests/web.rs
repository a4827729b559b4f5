use axum::{body::Body, http::Request, http::StatusCode};
use http_body_util::BodyExt;
use revotcx::build_app;
use tower::ServiceExt;

const BOUNDARY: &str = "revotcx-test-boundary";

fn multipart_upload(csv: &str) -> Request<Body> {
    let body = format!(
        "--{BOUNDARY}\r\n\
         Content-Disposition: form-data; name=\"file\"; filename=\"workout.csv\"\r\n\
         Content-Type: text/csv\r\n\r\n\
         {csv}\r\n\
         --{BOUNDARY}--\r\n"
    );
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn landing_page_responds() {
    let app = build_app();
    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn upload_without_file_is_rejected() {
    let app = build_app();
    let req = Request::builder()
        .method("POST")
        .uri("/upload")
        .header("content-type", "multipart/form-data; boundary=--boundary")
        .body(Body::from("----boundary--"))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn valid_upload_renders_the_ride_overview() {
    let csv = std::fs::read_to_string("tests/fixtures/workout.csv")
        .expect("fixture should be present");

    let app = build_app();
    let response = app.oneshot(multipart_upload(&csv)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let page = String::from_utf8(body.to_vec()).unwrap();

    assert!(page.contains("Ride Overview"));
    assert!(page.contains("Download TCX"));
    assert!(page.contains("/download/"));
}

#[tokio::test]
async fn invalid_upload_surfaces_the_error_text() {
    let csv = "LeMond,Revolution,FW 70,HW 104,09/26,13:00:00,Alt 6,Temp 23,Hum 51,Tire 2096,CF 83\n\
               TIME,SPEED,DIST,POWER,HEART RATE,CADENCE,CALORIES,TORQUE,TARGET\n\
               00:00:01,10.8,0.0,95,98,78,1,14,0\n";

    let app = build_app();
    let response = app.oneshot(multipart_upload(csv)).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let message = String::from_utf8(body.to_vec()).unwrap();
    assert!(message.contains("not supported"));
}

#[tokio::test]
async fn unknown_download_token_is_not_found() {
    let app = build_app();
    let response = app
        .oneshot(
            Request::builder()
                .uri("/download/00000000-0000-0000-0000-000000000000")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn download_token_from_upload_serves_the_tcx() {
    let csv = std::fs::read_to_string("tests/fixtures/workout.csv")
        .expect("fixture should be present");

    let app = build_app();
    let response = app
        .clone()
        .oneshot(multipart_upload(&csv))
        .await
        .unwrap();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let page = String::from_utf8(body.to_vec()).unwrap();

    let start = page.find("/download/").expect("page should embed a download link");
    let link: String = page[start..]
        .chars()
        .take_while(|c| *c != '"')
        .collect();

    let response = app
        .oneshot(Request::builder().uri(&link).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let tcx = response.into_body().collect().await.unwrap().to_bytes();
    let doc = String::from_utf8(tcx.to_vec()).unwrap();
    assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>"));
    assert!(doc.contains("<TrainingCenterDatabase"));
    assert!(doc.contains("<Activity Sport=\"Biking\">"));
}
