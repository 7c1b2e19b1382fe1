use axum::http::{self, header, Request, StatusCode};
use http_body_util::BodyExt;
use mock_canvas::{app, EXPIRED_TOKEN, SEEDED_ASSIGNMENTS, UNAUTHORIZED_TOKEN};
use serde_json::Value;
use tower::ServiceExt;

const TOKEN: &str = "Bearer instructor-token";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn get(uri: &str) -> Request<String> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, TOKEN)
        .header(header::HOST, "canvas.test")
        .body(String::new())
        .unwrap()
}

fn json_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, TOKEN)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn form_request(method: &str, uri: &str, body: &str) -> Request<String> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, TOKEN)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(body.to_string())
        .unwrap()
}

fn link(resp: &axum::response::Response) -> String {
    resp.headers()
        .get(header::LINK)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string()
}

// --- authentication ---

#[tokio::test]
async fn missing_token_gets_challenge() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/api/v1/courses/1/assignments")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn expired_token_gets_challenge() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/api/v1/courses/1/assignments")
                .header(header::AUTHORIZATION, format!("Bearer {EXPIRED_TOKEN}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
}

#[tokio::test]
async fn unauthorized_token_gets_bare_401() {
    let resp = app()
        .oneshot(
            Request::builder()
                .uri("/api/v1/courses/1/assignments")
                .header(header::AUTHORIZATION, format!("Bearer {UNAUTHORIZED_TOKEN}"))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(!resp.headers().contains_key(header::WWW_AUTHENTICATE));
}

// --- list ---

#[tokio::test]
async fn list_first_page_links_to_second() {
    let resp = app()
        .oneshot(get("/api/v1/courses/1/assignments?per_page=10"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let link = link(&resp);
    assert!(link.contains(
        r#"<http://canvas.test/api/v1/courses/1/assignments?page=2&per_page=10>; rel="next""#
    ));
    let items: Vec<Value> = body_json(resp).await;
    assert_eq!(items.len(), 10);
    assert_eq!(items[0]["name"], "Assignment 1");
}

#[tokio::test]
async fn list_last_page_has_no_next() {
    let resp = app()
        .oneshot(get("/api/v1/courses/1/assignments?page=3&per_page=10"))
        .await
        .unwrap();

    assert!(!link(&resp).contains(r#"rel="next""#));
    let items: Vec<Value> = body_json(resp).await;
    assert_eq!(items.len() as u64, SEEDED_ASSIGNMENTS - 20);
}

#[tokio::test]
async fn list_of_empty_course_is_single_page() {
    let resp = app()
        .oneshot(get("/api/v1/courses/2/assignments"))
        .await
        .unwrap();

    assert!(!link(&resp).contains(r#"rel="next""#));
    let items: Vec<Value> = body_json(resp).await;
    assert!(items.is_empty());
}

// --- create / get / update ---

#[tokio::test]
async fn create_assignment_returns_201() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/v1/courses/2/assignments",
            r#"{"assignment":{"name":"Essay"}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::CREATED);
    let assignment: Value = body_json(resp).await;
    assert_eq!(assignment["name"], "Essay");
    assert_eq!(assignment["course_id"], 2);
    assert_eq!(assignment["id"], SEEDED_ASSIGNMENTS + 1);
}

#[tokio::test]
async fn create_assignment_requires_wrapper() {
    let resp = app()
        .oneshot(json_request(
            "POST",
            "/api/v1/courses/2/assignments",
            r#"{"name":"Essay"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_assignment_not_found() {
    let resp = app()
        .oneshot(get("/api/v1/courses/1/assignments/999"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn get_assignment_in_wrong_course_not_found() {
    let resp = app()
        .oneshot(get("/api/v1/courses/2/assignments/1"))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_assignment_merges_fields() {
    let resp = app()
        .oneshot(json_request(
            "PUT",
            "/api/v1/courses/1/assignments/3",
            r#"{"assignment":{"name":"Renamed","id":77}}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let assignment: Value = body_json(resp).await;
    assert_eq!(assignment["name"], "Renamed");
    assert_eq!(assignment["id"], 3);
    assert_eq!(assignment["published"], true);
}

// --- form endpoints ---

#[tokio::test]
async fn conversation_reads_repeated_recipients() {
    let resp = app()
        .oneshot(form_request(
            "POST",
            "/api/v1/conversations",
            "recipients%5B%5D=4&recipients%5B%5D=5&subject=Hi+there&body=text",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let conversations: Vec<Value> = body_json(resp).await;
    assert_eq!(conversations[0]["recipients"], serde_json::json!(["4", "5"]));
    assert_eq!(conversations[0]["subject"], "Hi there");
}

#[tokio::test]
async fn delete_enrollment_reads_task_from_body() {
    let resp = app()
        .oneshot(form_request(
            "DELETE",
            "/api/v1/courses/1/enrollments/8",
            "task=delete",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let enrollment: Value = body_json(resp).await;
    assert_eq!(enrollment["enrollment_state"], "deleted");
}

#[tokio::test]
async fn delete_enrollment_rejects_unknown_task() {
    let resp = app()
        .oneshot(form_request(
            "DELETE",
            "/api/v1/courses/1/enrollments/8",
            "task=explode",
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

// --- failures ---

#[tokio::test]
async fn broken_route_returns_500_with_body() {
    let resp = app().oneshot(get("/api/v1/broken")).await.unwrap();

    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(&body_bytes(resp).await[..], b"internal error");
}

// --- full lifecycle ---

#[tokio::test]
async fn create_then_fetch() {
    use tower::Service;

    let mut app = app().into_service();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            "/api/v1/courses/5/assignments",
            r#"{"assignment":{"name":"Lab"}}"#,
        ))
        .await
        .unwrap();
    let created: Value = body_json(resp).await;
    let id = created["id"].as_u64().unwrap();

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(get(&format!("/api/v1/courses/5/assignments/{id}")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = body_json(resp).await;
    assert_eq!(fetched, created);
}
