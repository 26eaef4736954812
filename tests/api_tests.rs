use axum::http::{
    header::{COOKIE, SET_COOKIE},
    HeaderValue, StatusCode,
};
use axum_test::TestServer;
use serde_json::{json, Value};

use movie_finder::{
    api::{create_router, AppState, SessionStore},
    error::AppError,
    models::Movie,
    services::{vectorizer::VectorizerConfig, Recommender},
};

fn movies() -> Vec<Movie> {
    vec![
        Movie::new("Wiz", "a young wizard begins his journey at a magical school"),
        Movie::new("Dragon Keep", "a knight defends a castle from an ancient dragon"),
        Movie::new(
            "Orbit",
            "astronauts stranded on a space station fight to return home",
        ),
    ]
}

fn create_test_server() -> TestServer {
    let recommender = Recommender::from_movies(movies(), VectorizerConfig::default()).unwrap();
    let app = create_router(AppState::new(recommender).unwrap());
    TestServer::new(app).unwrap()
}

fn create_unavailable_server() -> TestServer {
    let state = AppState::from_result(Err(AppError::NotFound(
        "Movie database not found. Please ensure 'imdb_2024_full.csv' exists.".to_string(),
    )))
    .unwrap();
    TestServer::new(create_router(state)).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let server = create_test_server();
    let response = server.get("/health").await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["movies"], 3);
}

#[tokio::test]
async fn test_health_check_without_corpus() {
    let server = create_unavailable_server();
    let response = server.get("/health").await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_api_recommendations_found() {
    let server = create_test_server();

    let response = server
        .post("/api/recommendations")
        .json(&json!({
            "query": "a boy starts school for wizards",
            "count": 5,
            "min_score": 0.1
        }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "found");
    assert_eq!(body["matches"][0]["title"], "Wiz");
    let score = body["matches"][0]["score"].as_f64().unwrap();
    assert!(score > 0.1 && score <= 1.0);
}

#[tokio::test]
async fn test_api_recommendations_no_matches() {
    let server = create_test_server();

    let response = server
        .post("/api/recommendations")
        .json(&json!({ "query": "the a of" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body, json!({ "status": "no_matches" }));
}

#[tokio::test]
async fn test_api_recommendations_rejects_bad_input() {
    let server = create_test_server();

    let response = server
        .post("/api/recommendations")
        .json(&json!({ "query": "   " }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/recommendations")
        .json(&json!({ "query": "dragons", "count": 11 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let response = server
        .post("/api/recommendations")
        .json(&json!({ "query": "dragons", "min_score": 0.0 }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().unwrap().contains("min_score"));
}

#[tokio::test]
async fn test_api_unavailable_without_corpus() {
    let server = create_unavailable_server();

    let response = server
        .post("/api/recommendations")
        .json(&json!({ "query": "dragons" }))
        .await;
    response.assert_status(StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_api_samples() {
    let server = create_test_server();

    let response = server.get("/api/samples").add_query_param("n", 2).await;
    response.assert_status_ok();

    let samples: Vec<Value> = response.json();
    assert_eq!(samples.len(), 2);
    assert_ne!(samples[0]["index"], samples[1]["index"]);
}

#[tokio::test]
async fn test_index_page_sets_session_cookie() {
    let server = create_test_server();

    let response = server.get("/").await;
    response.assert_status_ok();

    let cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(cookie.starts_with("movie_finder_session="));

    let page = response.text();
    assert!(page.contains("Magic Movie Finder"));
    assert!(page.contains("Recent Scrolls"));
    assert!(!page.contains(r#"class="recommendation-card""#));
}

#[tokio::test]
async fn test_form_submission_renders_results() {
    let server = create_test_server();

    let response = server
        .post("/")
        .form(&[
            ("query", "a boy starts school for wizards"),
            ("count", "3"),
            ("min_score", "0.1"),
        ])
        .await;

    response.assert_status_ok();
    let page = response.text();
    assert!(page.contains(r#"<h3 class="title-text">Wiz</h3>"#));
    assert!(page.contains("magical matches!"));
}

#[tokio::test]
async fn test_form_retained_for_session() {
    let server = create_test_server();

    let response = server
        .post("/")
        .form(&[("query", "a knight and a dragon"), ("count", "42")])
        .await;
    let set_cookie = response.headers().get(SET_COOKIE).unwrap().to_str().unwrap();
    let session = set_cookie.split(';').next().unwrap().to_string();

    let page = server
        .get("/")
        .add_header(COOKIE, HeaderValue::from_str(&session).unwrap())
        .await
        .text();

    assert!(page.contains("a knight and a dragon</textarea>"));
    assert!(page.contains(r#"name="count" min="1" max="10" step="1" value="10""#));
    assert!(page.contains(r#"<h3 class="title-text">Dragon Keep</h3>"#));

    let fresh = server.get("/").await.text();
    assert!(!fresh.contains("a knight and a dragon"));
}

#[tokio::test]
async fn test_empty_form_warns() {
    let server = create_test_server();

    let page = server.post("/").form(&[("query", "  ")]).await.text();
    assert!(page.contains("Please enter a movie description"));
    assert!(!page.contains(r#"class="recommendation-card""#));
}

#[tokio::test]
async fn test_use_example() {
    let server = create_test_server();

    let response = server.post("/example").await;
    response.assert_status_ok();

    let page = response.text();
    assert!(page.contains("facing dark forces along the way.</textarea>"));
    assert!(page.contains(r#"<h3 class="title-text">Wiz</h3>"#));
}

#[tokio::test]
async fn test_use_sample() {
    let server = create_test_server();

    let page = server.post("/sample").form(&[("index", "1")]).await.text();
    assert!(page.contains("a knight defends a castle from an ancient dragon</textarea>"));
    assert!(page.contains(r#"<h3 class="title-text">Dragon Keep</h3>"#));

    let response = server.post("/sample").form(&[("index", "99")]).await;
    response.assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_page_shows_missing_corpus() {
    let server = create_unavailable_server();

    let page = server.get("/").await.text();
    assert!(page.contains("Movie database not found"));
    assert!(!page.contains("Recent Scrolls"));
}

#[tokio::test]
async fn test_cookieless_posts_keep_session_store_bounded() {
    let recommender = Recommender::from_movies(movies(), VectorizerConfig::default()).unwrap();
    let state = AppState::new(recommender)
        .unwrap()
        .with_sessions(SessionStore::with_capacity(20));
    let server = TestServer::new(create_router(state.clone())).unwrap();

    for _ in 0..500 {
        server
            .post("/")
            .form(&[("query", "a knight and a dragon")])
            .await
            .assert_status_ok();
    }

    assert_eq!(state.sessions.len().await, 20);
}

#[tokio::test]
async fn test_submitted_markup_is_escaped() {
    let server = create_test_server();

    let page = server
        .post("/")
        .form(&[("query", "<script>alert(1)</script> a dragon & a knight")])
        .await
        .text();

    assert!(!page.contains("<script>"));
    assert!(page.contains("&lt;script&gt;alert(1)"));
    assert!(page.contains("a dragon &amp; a knight</textarea>"));
}
