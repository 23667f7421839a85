use actix_web::HttpResponse;

use crate::dto::students::ErrorResponse;
use crate::services::ServiceError;

pub mod api;

/// Maps a service failure onto the JSON error response returned by the API.
pub fn error_response(err: &ServiceError) -> HttpResponse {
    let body = ErrorResponse {
        error: err.to_string(),
    };
    match err {
        ServiceError::TypeConstraint(_) => HttpResponse::BadRequest().json(body),
        ServiceError::Repository(_) => {
            log::error!("Students backend request failed: {err}");
            HttpResponse::BadGateway().json(body)
        }
    }
}
