//! Error replies and rejection recovery.

use std::convert::Infallible;

use farmdash_core::{AppError, ErrorBody};
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Rejection, Reply};

use crate::body::{ApiRejection, BodyTooLarge, MAX_BODY_BYTES};

/// JSON reply for `err` with its mapped status.
pub fn error_reply(err: &AppError) -> Response {
    let status =
        StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    if status.is_server_error() {
        tracing::error!(error = %err, "Request failed");
    } else {
        tracing::debug!(error = %err, "Request rejected");
    }

    json_error(status, err.to_body())
}

fn json_error(status: StatusCode, body: ErrorBody) -> Response {
    warp::reply::with_status(warp::reply::json(&body), status).into_response()
}

/// Turn unmatched or failed extractions into JSON errors.
pub async fn handle_rejection(rejection: Rejection) -> Result<Response, Infallible> {
    if let Some(ApiRejection(err)) = rejection.find::<ApiRejection>() {
        return Ok(error_reply(err));
    }

    if rejection.find::<BodyTooLarge>().is_some() {
        return Ok(json_error(
            StatusCode::PAYLOAD_TOO_LARGE,
            ErrorBody::new(format!("Request body exceeds {} bytes", MAX_BODY_BYTES)),
        ));
    }

    if rejection.is_not_found() {
        return Ok(json_error(StatusCode::NOT_FOUND, ErrorBody::new("Not found")));
    }

    if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        return Ok(json_error(
            StatusCode::METHOD_NOT_ALLOWED,
            ErrorBody::new("Method not allowed"),
        ));
    }

    if let Some(forbidden) = rejection.find::<warp::cors::CorsForbidden>() {
        return Ok(json_error(
            StatusCode::FORBIDDEN,
            ErrorBody::new("Origin not allowed").with_details(forbidden.to_string()),
        ));
    }

    if let Some(invalid) = rejection.find::<warp::reject::InvalidQuery>() {
        return Ok(json_error(
            StatusCode::BAD_REQUEST,
            ErrorBody::new("Invalid query string").with_details(invalid.to_string()),
        ));
    }

    tracing::error!("Unhandled rejection: {:?}", rejection);
    Ok(json_error(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorBody::new("Internal server error"),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_not_found_is_json() {
        let response = handle_rejection(warp::reject::not_found()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_api_rejection_uses_error_status() {
        let rejection = warp::reject::custom(ApiRejection(AppError::invalid_input("bad")));
        let response = handle_rejection(rejection).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_error_reply_status() {
        let response = error_reply(&AppError::missing_setting("GEMINI_API_KEY"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let response = error_reply(&AppError::Upstream {
            service: "weather",
            status: 404,
            body: String::new(),
        });
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
