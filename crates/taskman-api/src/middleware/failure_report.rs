//! Failure body translation
//!
//! Handlers and inner middleware report failures through a
//! [`FailureReport`] response extension. This layer replaces the body of such
//! responses with `{url, message}`, where `url` is the request path.
//!
//! Author: hephaex@gmail.com

use crate::error::{FailureReport, ResponseMessage};
use axum::{
    extract::Request,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};

pub async fn failure_report_middleware(request: Request, next: Next) -> Response {
    let url = request.uri().path().to_string();
    let mut response = next.run(request).await;

    let Some(report) = response.extensions_mut().remove::<FailureReport>() else {
        return response;
    };

    let status = response.status();
    let mut translated = (
        status,
        Json(ResponseMessage {
            url,
            message: report.message,
        }),
    )
        .into_response();

    for (name, value) in response.headers() {
        if name != axum::http::header::CONTENT_TYPE && name != axum::http::header::CONTENT_LENGTH {
            translated.headers_mut().insert(name.clone(), value.clone());
        }
    }
    translated
}
