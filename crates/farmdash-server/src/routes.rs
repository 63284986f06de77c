//! Route table for the `/api` surface.

use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;

use farmdash_chat::ChatRequest;
use farmdash_core::ServerConfig;
use farmdash_services::{Resource, ResourceStore};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;
use warp::filters::BoxedFilter;
use warp::reply::Response;
use warp::{Filter, Reply};

use crate::body::json_body;
use crate::handlers;
use crate::reply::handle_rejection;
use crate::state::AppState;

/// All routes with CORS, JSON error recovery and request tracing applied.
pub fn routes(
    state: AppState,
    server: &ServerConfig,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let api = health()
        .or(weather(&state))
        .unify()
        .or(collection("crops", state.crops.clone()))
        .unify()
        .or(collection("todos", state.todos.clone()))
        .unify()
        .or(chat(&state))
        .unify();

    // The inner recover keeps CORS headers on error replies; the outer one
    // answers rejected preflights.
    api.recover(handle_rejection)
        .with(cors(server))
        .recover(handle_rejection)
        .with(warp::trace::request())
}

fn health() -> BoxedFilter<(Response,)> {
    warp::path!("api" / "health")
        .and(warp::get())
        .and_then(handlers::health)
        .boxed()
}

fn weather(state: &AppState) -> BoxedFilter<(Response,)> {
    let proxy = state.weather.clone();

    warp::path!("api" / "weather")
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(warp::any().map(move || proxy.clone()))
        .and_then(handlers::weather)
        .boxed()
}

/// List, create, update and delete routes under `/api/{name}`.
fn collection<T>(name: &'static str, store: Arc<dyn ResourceStore<T>>) -> BoxedFilter<(Response,)>
where
    T: Resource + Serialize,
    T::Draft: DeserializeOwned + Default + 'static,
    T::Patch: DeserializeOwned + Default + 'static,
{
    let base = move || warp::path("api").and(warp::path(name));
    let with_store = warp::any().map(move || store.clone());

    let list = base()
        .and(warp::path::end())
        .and(warp::get())
        .and(with_store.clone())
        .and_then(handlers::list::<T>);

    let create = base()
        .and(warp::path::end())
        .and(warp::post())
        .and(json_body::<T::Draft>())
        .and(with_store.clone())
        .and_then(handlers::create::<T>);

    let update = base()
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::put())
        .and(json_body::<T::Patch>())
        .and(with_store.clone())
        .and_then(handlers::update::<T>);

    let delete = base()
        .and(warp::path::param::<String>())
        .and(warp::path::end())
        .and(warp::delete())
        .and(with_store)
        .and_then(handlers::delete::<T>);

    list.or(create)
        .unify()
        .or(update)
        .unify()
        .or(delete)
        .unify()
        .boxed()
}

fn chat(state: &AppState) -> BoxedFilter<(Response,)> {
    let relay = state.chat.clone();

    warp::path!("api" / "gemini-chat")
        .and(warp::post())
        .and(json_body::<ChatRequest>())
        .and(warp::any().map(move || relay.clone()))
        .and_then(handlers::chat)
        .boxed()
}

fn cors(server: &ServerConfig) -> warp::cors::Builder {
    let builder = warp::cors()
        .allow_methods(vec!["GET", "POST", "PUT", "DELETE", "OPTIONS"])
        .allow_headers(vec!["content-type"]);

    if server.allowed_origins.is_empty() {
        return builder.allow_any_origin();
    }

    let origins = normalize_origins(&server.allowed_origins);
    builder.allow_origins(origins.iter().map(String::as_str))
}

/// `scheme://host[:port]` for each configured origin; unusable entries are dropped.
fn normalize_origins(origins: &[String]) -> Vec<String> {
    origins
        .iter()
        .filter_map(|origin| match Url::parse(origin.trim()) {
            Ok(url) if url.origin().is_tuple() => Some(url.origin().ascii_serialization()),
            _ => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect()
}
