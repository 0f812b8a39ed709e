//! JSON envelopes shared by every API handler.
//!
//! Successful calls answer `{ "success": true, "data": ..., "message": ... }`,
//! failures answer `{ "success": false, "error": { "code", "message" } }`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
struct Envelope<T: Serialize> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    message: String,
}

#[derive(Serialize)]
struct Failure<'a> {
    code: &'a str,
    message: String,
}

#[derive(Serialize)]
struct FailureEnvelope<'a> {
    success: bool,
    error: Failure<'a>,
}

fn reply<T>(status: StatusCode, data: Option<T>, message: impl Into<String>) -> Response
where
    T: Serialize,
{
    let envelope = Envelope {
        success: true,
        data,
        message: message.into(),
    };
    (status, Json(envelope)).into_response()
}

pub fn success<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    reply(StatusCode::OK, Some(data), message)
}

/// Same envelope as [`success`], answered with `201 Created`.
pub fn created<T: Serialize>(data: T, message: impl Into<String>) -> Response {
    reply(StatusCode::CREATED, Some(data), message)
}

pub fn empty_success(message: impl Into<String>) -> Response {
    reply::<()>(StatusCode::OK, None, message)
}

pub fn failure(status: StatusCode, code: &str, message: impl Into<String>) -> Response {
    let envelope = FailureEnvelope {
        success: false,
        error: Failure {
            code,
            message: message.into(),
        },
    };
    (status, Json(envelope)).into_response()
}
