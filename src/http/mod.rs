//! The HTTP surface: the landing page and the prediction endpoint.

mod response;

use std::{
    any::Any,
    panic::{self, AssertUnwindSafe},
};

use actix_web::{HttpResponse, http::header::ContentType, web};
use log::error;
use serde_json::Value;

use crate::{
    error::ServiceError,
    service::{Payload, Prediction, PredictionService},
};

pub use response::ErrorBody;

const INDEX_HTML: &str = include_str!("../../static/index.html");
const SCRIPT_JS: &str = include_str!("../../static/script.js");

/// Registers every route. Expects a `web::Data<PredictionService>` in the app data.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/static/script.js", web::get().to(script))
        .route("/predict", web::post().to(predict));
}

async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(INDEX_HTML)
}

async fn script() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/javascript; charset=utf-8")
        .body(SCRIPT_JS)
}

async fn predict(
    service: web::Data<PredictionService>,
    body: web::Bytes,
) -> Result<web::Json<Prediction>, ServiceError> {
    let payload = parse_payload(&body)?;

    let res = panic::catch_unwind(AssertUnwindSafe(|| service.handle(&payload)))
        .unwrap_or_else(|panic| Err(ServiceError::Internal(panic_message(panic))));

    match res {
        Ok(prediction) => Ok(web::Json(prediction)),
        Err(e) => {
            if !e.is_client_error() {
                error!("prediction failed: {e}");
            }
            Err(e)
        }
    }
}

/// Reads the request body as a payload.
///
/// An empty body, `null`, a string or an array carry no named fields and read as an empty
/// payload, so they end up reported as missing every field.
///
/// # Errors
/// `ServiceError::UnreadableBody` with the parser's message if the body isn't JSON, or if it is
/// a number or a boolean.
pub fn parse_payload(body: &[u8]) -> Result<Payload, ServiceError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Payload::new());
    }

    let value: Value = serde_json::from_slice(body)
        .map_err(|e| ServiceError::UnreadableBody(e.to_string()))?;

    match value {
        Value::Object(payload) => Ok(payload),
        Value::Null | Value::String(_) | Value::Array(_) => Ok(Payload::new()),
        Value::Number(n) => Err(ServiceError::UnreadableBody(format!(
            "expected a JSON object, got the number {n}"
        ))),
        Value::Bool(b) => Err(ServiceError::UnreadableBody(format!(
            "expected a JSON object, got the boolean {b}"
        ))),
    }
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    match panic.downcast::<String>() {
        Ok(msg) => *msg,
        Err(panic) => panic
            .downcast_ref::<&str>()
            .map(|msg| msg.to_string())
            .unwrap_or_else(|| "prediction panicked".to_string()),
    }
}
