//! Request handlers. Each one turns its own failures into a reply.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use farmdash_chat::{ChatRelay, ChatRequest};
use farmdash_core::AppError;
use farmdash_services::{Resource, ResourceStore};
use farmdash_weather::{WeatherError, WeatherProxy, WeatherQuery};
use serde::Serialize;
use warp::http::header::{CACHE_CONTROL, CONTENT_TYPE};
use warp::http::StatusCode;
use warp::reply::Response;
use warp::Reply;

use crate::reply::error_reply;

const X_CACHE: &str = "x-cache";

pub async fn health() -> Result<Response, Infallible> {
    Ok(warp::reply::json(&serde_json::json!({ "ok": true })).into_response())
}

/// `GET /api/weather`
pub async fn weather(
    params: HashMap<String, String>,
    proxy: Arc<WeatherProxy>,
) -> Result<Response, Infallible> {
    let query = match WeatherQuery::from_params(&params) {
        Ok(query) => query,
        Err(e) => return Ok(error_reply(&e.into())),
    };

    match proxy.current(&query).await {
        Ok(reply) => {
            let json = warp::reply::json(&reply.payload);
            let json = warp::reply::with_header(json, CACHE_CONTROL, reply.cache_control());
            Ok(warp::reply::with_header(json, X_CACHE, reply.cache_status.as_header()).into_response())
        }
        Err(WeatherError::Upstream { status, body }) => Ok(upstream_passthrough(status, body)),
        Err(e) => Ok(error_reply(&e.into())),
    }
}

/// Forward an upstream failure with its status and body unchanged.
fn upstream_passthrough(status: u16, body: String) -> Response {
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = if serde_json::from_str::<serde_json::Value>(&body).is_ok() {
        "application/json"
    } else {
        "text/plain; charset=utf-8"
    };

    let reply = warp::reply::with_status(body, status);
    warp::reply::with_header(reply, CONTENT_TYPE, content_type).into_response()
}

pub async fn list<T>(store: Arc<dyn ResourceStore<T>>) -> Result<Response, Infallible>
where
    T: Resource + Serialize,
{
    Ok(match store.list() {
        Ok(items) => warp::reply::json(&items).into_response(),
        Err(e) => error_reply(&AppError::from(e)),
    })
}

pub async fn create<T>(
    draft: T::Draft,
    store: Arc<dyn ResourceStore<T>>,
) -> Result<Response, Infallible>
where
    T: Resource + Serialize,
{
    Ok(match store.create(draft) {
        Ok(item) => {
            tracing::debug!(id = item.id(), "Created item");
            warp::reply::with_status(warp::reply::json(&item), StatusCode::CREATED).into_response()
        }
        Err(e) => error_reply(&AppError::from(e)),
    })
}

/// Replies with the updated item, or `null` when the id is unknown.
pub async fn update<T>(
    id: String,
    patch: T::Patch,
    store: Arc<dyn ResourceStore<T>>,
) -> Result<Response, Infallible>
where
    T: Resource + Serialize,
{
    Ok(match store.update(&id, patch) {
        Ok(item) => warp::reply::json(&item).into_response(),
        Err(e) => error_reply(&AppError::from(e)),
    })
}

/// Always 204, whether or not the id existed.
pub async fn delete<T>(id: String, store: Arc<dyn ResourceStore<T>>) -> Result<Response, Infallible>
where
    T: Resource,
{
    Ok(match store.delete(&id) {
        Ok(()) => warp::reply::with_status(warp::reply(), StatusCode::NO_CONTENT).into_response(),
        Err(e) => error_reply(&AppError::from(e)),
    })
}

/// `POST /api/gemini-chat`
pub async fn chat(request: ChatRequest, relay: Arc<ChatRelay>) -> Result<Response, Infallible> {
    Ok(match relay.reply(&request).await {
        Ok(reply) => warp::reply::json(&reply).into_response(),
        Err(e) => error_reply(&e.into()),
    })
}
