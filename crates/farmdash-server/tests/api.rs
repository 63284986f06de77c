//! HTTP-level tests for the `/api` routes using `warp::test`.
//!
//! Upstream services are wiremock servers; `expect(n)` checks how often
//! each one was called.

use farmdash_chat::ChatRelay;
use farmdash_core::{ChatConfig, ServerConfig, WeatherConfig};
use farmdash_server::{routes, AppState};
use farmdash_weather::WeatherProxy;
use serde_json::{json, Value};
use warp::http::StatusCode;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/v1beta/models/gemini-1.5-flash:generateContent";

fn state_for(server: &MockServer, with_keys: bool) -> AppState {
    let key = |k: &str| with_keys.then(|| k.to_string());

    let weather = WeatherProxy::new(&WeatherConfig {
        api_key: key("weather-key"),
        base_url: server.uri(),
        ..WeatherConfig::default()
    })
    .unwrap();
    let chat = ChatRelay::new(&ChatConfig {
        api_key: key("gemini-key"),
        base_url: server.uri(),
        ..ChatConfig::default()
    })
    .unwrap();

    AppState::new(weather, chat)
}

fn json_body(response: &warp::http::Response<warp::hyper::body::Bytes>) -> Value {
    serde_json::from_slice(response.body()).unwrap()
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start().await;
    let api = routes(state_for(&server, true), &ServerConfig::default());

    let res = warp::test::request().path("/api/health").reply(&api).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(&res), json!({ "ok": true }));
}

#[tokio::test]
async fn test_create_crop_returns_201() {
    let server = MockServer::start().await;
    let api = routes(state_for(&server, true), &ServerConfig::default());

    let res = warp::test::request()
        .method("POST")
        .path("/api/crops")
        .json(&json!({ "name": "Wheat" }))
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let crop = json_body(&res);
    assert!(!crop["id"].as_str().unwrap().is_empty());
    assert_eq!(crop["name"], "Wheat");
    assert_eq!(crop["variety"], "");

    let res = warp::test::request().path("/api/crops").reply(&api).await;
    assert_eq!(json_body(&res), json!([crop]));
}

#[tokio::test]
async fn test_empty_body_creates_defaults() {
    let server = MockServer::start().await;
    let api = routes(state_for(&server, true), &ServerConfig::default());

    let res = warp::test::request()
        .method("POST")
        .path("/api/todos")
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::CREATED);
    let todo = json_body(&res);
    assert_eq!(todo["title"], "");
    assert_eq!(todo["cropId"], Value::Null);
    assert_eq!(todo["when"], Value::Null);
    assert_eq!(todo["done"], false);
}

#[tokio::test]
async fn test_malformed_json_is_400() {
    let server = MockServer::start().await;
    let api = routes(state_for(&server, true), &ServerConfig::default());

    let res = warp::test::request()
        .method("POST")
        .path("/api/crops")
        .header("content-type", "application/json")
        .body("{\"name\":")
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(&res)["error"].is_string());

    let res = warp::test::request().path("/api/crops").reply(&api).await;
    assert_eq!(json_body(&res), json!([]));
}

#[tokio::test]
async fn test_update_unknown_crop_is_null() {
    let server = MockServer::start().await;
    let api = routes(state_for(&server, true), &ServerConfig::default());

    let res = warp::test::request()
        .method("PUT")
        .path("/api/crops/nope")
        .json(&json!({ "name": "Barley" }))
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(&res), Value::Null);
}

#[tokio::test]
async fn test_delete_missing_crop_is_204() {
    let server = MockServer::start().await;
    let api = routes(state_for(&server, true), &ServerConfig::default());

    let res = warp::test::request()
        .method("DELETE")
        .path("/api/crops/does-not-exist")
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::NO_CONTENT);
    assert!(res.body().is_empty());
}

#[tokio::test]
async fn test_todo_done_flip() {
    let server = MockServer::start().await;
    let api = routes(state_for(&server, true), &ServerConfig::default());

    let res = warp::test::request()
        .method("POST")
        .path("/api/todos")
        .json(&json!({ "title": "Scout aphids", "cropId": "c1", "when": "2026-06-01T08:00" }))
        .reply(&api)
        .await;
    let todo = json_body(&res);
    let id = todo["id"].as_str().unwrap().to_string();

    let res = warp::test::request()
        .method("PUT")
        .path(&format!("/api/todos/{}", id))
        .json(&json!({ "done": true }))
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    let mut expected = todo.clone();
    expected["done"] = json!(true);
    assert_eq!(json_body(&res), expected);
}

#[tokio::test]
async fn test_weather_missing_lon_is_400_without_upstream_call() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let state = state_for(&server, true);
    let cache = state.weather.cache().clone();
    let api = routes(state, &ServerConfig::default());

    let res = warp::test::request()
        .path("/api/weather?lat=45.1")
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(&res)["error"].is_string());
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_weather_is_cached_with_headers() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .and(query_param("units", "metric"))
        .and(query_param("lang", "en"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "main": { "temp": 17.2 } })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let api = routes(state_for(&server, true), &ServerConfig::default());

    let first = warp::test::request()
        .path("/api/weather?lat=42.0308&lon=-93.6319")
        .reply(&api)
        .await;
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(
        first.headers()["cache-control"],
        "public, max-age=30, stale-while-revalidate=120"
    );
    assert_eq!(first.headers()["x-cache"], "MISS");
    assert_eq!(json_body(&first)["main"]["temp"], 17.2);

    // Rounds to the same fingerprint.
    let second = warp::test::request()
        .path("/api/weather?lat=42.03081&lon=-93.63192")
        .reply(&api)
        .await;
    assert_eq!(second.status(), StatusCode::OK);
    assert_eq!(second.headers()["x-cache"], "HIT");
    assert_eq!(json_body(&second), json_body(&first));
}

#[tokio::test]
async fn test_weather_upstream_error_is_forwarded() {
    let server = MockServer::start().await;
    let upstream = json!({ "cod": 401, "message": "Invalid API key" });
    Mock::given(method("GET"))
        .and(path("/data/2.5/weather"))
        .respond_with(ResponseTemplate::new(401).set_body_json(upstream.clone()))
        .mount(&server)
        .await;

    let api = routes(state_for(&server, true), &ServerConfig::default());

    let res = warp::test::request()
        .path("/api/weather?lat=1&lon=2")
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(&res), upstream);
}

#[tokio::test]
async fn test_weather_without_key_is_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(0)
        .mount(&server)
        .await;

    let api = routes(state_for(&server, false), &ServerConfig::default());

    let res = warp::test::request()
        .path("/api/weather?lat=1&lon=2")
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = json_body(&res)["error"].as_str().unwrap().to_string();
    assert!(error.contains("OPENWEATHER_API_KEY"));
}

#[tokio::test]
async fn test_chat_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{ "content": { "parts": [{ "text": "Irrigate tonight." }] } }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let api = routes(state_for(&server, true), &ServerConfig::default());

    let res = warp::test::request()
        .method("POST")
        .path("/api/gemini-chat")
        .json(&json!({
            "message": "water?",
            "crop": "Corn",
            "coords": { "lat": 10, "lon": 20 },
            "weather": { "temp": 31, "description": "clear sky" }
        }))
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(json_body(&res), json!({ "reply": "Irrigate tonight." }));
}

#[tokio::test]
async fn test_chat_without_key_is_500() {
    let server = MockServer::start().await;
    let api = routes(state_for(&server, false), &ServerConfig::default());

    let res = warp::test::request()
        .method("POST")
        .path("/api/gemini-chat")
        .json(&json!({ "message": "hello" }))
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let error = json_body(&res)["error"].as_str().unwrap().to_string();
    assert!(error.contains("GEMINI_API_KEY"));
}

#[tokio::test]
async fn test_chat_upstream_error_is_500_with_details() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(429).set_body_string("RESOURCE_EXHAUSTED"))
        .mount(&server)
        .await;

    let api = routes(state_for(&server, true), &ServerConfig::default());

    let res = warp::test::request()
        .method("POST")
        .path("/api/gemini-chat")
        .json(&json!({ "message": "hello" }))
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(&res);
    assert!(body["details"].as_str().unwrap().contains("RESOURCE_EXHAUSTED"));
}

#[tokio::test]
async fn test_unknown_route_is_json_404() {
    let server = MockServer::start().await;
    let api = routes(state_for(&server, true), &ServerConfig::default());

    let res = warp::test::request().path("/api/nothing-here").reply(&api).await;

    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_body(&res), json!({ "error": "Not found" }));
}

#[tokio::test]
async fn test_cors_headers_on_error_replies() {
    let server = MockServer::start().await;
    let config = ServerConfig {
        allowed_origins: vec!["http://localhost:5173".to_string()],
        ..ServerConfig::default()
    };
    let api = routes(state_for(&server, true), &config);

    let res = warp::test::request()
        .method("POST")
        .path("/api/crops")
        .header("origin", "http://localhost:5173")
        .body("not json")
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        res.headers()["access-control-allow-origin"],
        "http://localhost:5173"
    );
}

#[tokio::test]
async fn test_cors_preflight() {
    let server = MockServer::start().await;
    let api = routes(state_for(&server, true), &ServerConfig::default());

    let res = warp::test::request()
        .method("OPTIONS")
        .path("/api/todos/abc")
        .header("origin", "http://localhost:3000")
        .header("access-control-request-method", "PUT")
        .header("access-control-request-headers", "content-type")
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::OK);
    assert!(res.headers().contains_key("access-control-allow-origin"));
}

#[tokio::test]
async fn test_cors_rejects_unknown_origin_preflight() {
    let server = MockServer::start().await;
    let config = ServerConfig {
        allowed_origins: vec!["https://farm.example.com".to_string()],
        ..ServerConfig::default()
    };
    let api = routes(state_for(&server, true), &config);

    let res = warp::test::request()
        .method("OPTIONS")
        .path("/api/crops")
        .header("origin", "https://evil.example.com")
        .header("access-control-request-method", "POST")
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_weather_transport_failure_hides_api_key() {
    // Nothing listens on the discard port.
    let weather = WeatherProxy::new(&WeatherConfig {
        api_key: Some("secret-weather-key".to_string()),
        base_url: "http://127.0.0.1:9".to_string(),
        timeout_secs: 5,
        ..WeatherConfig::default()
    })
    .unwrap();
    let chat = ChatRelay::new(&ChatConfig::default()).unwrap();
    let api = routes(AppState::new(weather, chat), &ServerConfig::default());

    let res = warp::test::request()
        .path("/api/weather?lat=1&lon=2")
        .reply(&api)
        .await;

    assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let text = String::from_utf8_lossy(res.body()).to_string();
    assert!(!text.contains("secret-weather-key"), "body was: {}", text);
    assert!(!text.contains("appid"), "body was: {}", text);
    assert_eq!(json_body(&res)["error"], "Upstream request failed");
}
