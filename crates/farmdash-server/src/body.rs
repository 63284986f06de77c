//! Lenient JSON request bodies.
//!
//! An empty body deserializes to the target's `Default`. Anything else must
//! be valid JSON for the target type.

use farmdash_core::AppError;
use futures_util::{pin_mut, Stream, StreamExt};
use serde::de::DeserializeOwned;
use warp::hyper::body::Buf;
use warp::{Filter, Rejection};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: u64 = 64 * 1024;

/// An [`AppError`] raised while extracting a request.
#[derive(Debug)]
pub struct ApiRejection(pub AppError);

impl warp::reject::Reject for ApiRejection {}

#[derive(Debug)]
pub struct BodyTooLarge;

impl warp::reject::Reject for BodyTooLarge {}

/// Extract and deserialize a JSON body of at most [`MAX_BODY_BYTES`].
pub fn json_body<T>() -> impl Filter<Extract = (T,), Error = Rejection> + Clone
where
    T: DeserializeOwned + Default + Send + 'static,
{
    warp::header::optional::<u64>("content-length")
        .and_then(|length: Option<u64>| async move {
            match length {
                Some(length) if length > MAX_BODY_BYTES => Err(warp::reject::custom(BodyTooLarge)),
                _ => Ok(()),
            }
        })
        .untuple_one()
        .and(warp::body::stream())
        .and_then(read_json::<T, _, _>)
}

async fn read_json<T, S, B>(body: S) -> Result<T, Rejection>
where
    T: DeserializeOwned + Default,
    S: Stream<Item = Result<B, warp::Error>>,
    B: Buf,
{
    let bytes = read_limited(body, MAX_BODY_BYTES).await?;
    parse_body::<T>(&bytes).map_err(|e| warp::reject::custom(ApiRejection(e)))
}

/// Collect a body stream, rejecting with [`BodyTooLarge`] as soon as it
/// passes `limit` bytes. Covers chunked bodies that declare no length.
pub async fn read_limited<S, B>(body: S, limit: u64) -> Result<Vec<u8>, Rejection>
where
    S: Stream<Item = Result<B, warp::Error>>,
    B: Buf,
{
    pin_mut!(body);
    let mut bytes = Vec::new();

    while let Some(chunk) = body.next().await {
        let mut chunk = chunk.map_err(|e| {
            warp::reject::custom(ApiRejection(AppError::invalid_input(format!(
                "Failed to read request body: {}",
                e
            ))))
        })?;

        if (bytes.len() + chunk.remaining()) as u64 > limit {
            return Err(warp::reject::custom(BodyTooLarge));
        }

        while chunk.has_remaining() {
            let part = chunk.chunk();
            let len = part.len();
            bytes.extend_from_slice(part);
            chunk.advance(len);
        }
    }

    Ok(bytes)
}

/// Parse a raw body; blank input yields `T::default()`.
///
/// # Errors
/// `InvalidInput` when the body is not valid JSON for `T`.
pub fn parse_body<T>(bytes: &[u8]) -> Result<T, AppError>
where
    T: DeserializeOwned + Default,
{
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    serde_json::from_slice(bytes)
        .map_err(|e| AppError::invalid_input(format!("Malformed JSON body: {}", e)))
}
