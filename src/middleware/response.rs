use axum::{
    extract::FromRequest,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::error::ApiError;

/// Success envelope: `{"message": ..., "<key>": data}`, either part optional
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub message: Option<String>,
    pub data: Option<Payload<T>>,
    pub status_code: Option<StatusCode>,
}

#[derive(Debug)]
pub enum Payload<T> {
    /// Serialized under the given key
    Keyed(&'static str, T),
    /// Object fields merged into the envelope itself
    Flat(T),
}

impl<T: Serialize> ApiResponse<T> {
    /// 200 with the resource under `key`
    pub fn success(key: &'static str, data: T) -> Self {
        Self {
            message: None,
            data: Some(Payload::Keyed(key, data)),
            status_code: None, // Default to 200 OK
        }
    }

    /// 200 with the fields of `data` (which must serialize to an object)
    /// alongside the message
    pub fn flat(data: T) -> Self {
        Self {
            message: None,
            data: Some(Payload::Flat(data)),
            status_code: None,
        }
    }

    /// 201 Created with the resource under `key`
    pub fn created(key: &'static str, data: T) -> Self {
        Self {
            status_code: Some(StatusCode::CREATED),
            ..Self::success(key, data)
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<()> {
    /// 200 carrying only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            data: None,
            status_code: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status_code.unwrap_or(StatusCode::OK);
        let mut envelope = Map::new();

        if let Some(message) = self.message {
            envelope.insert("message".to_string(), Value::String(message));
        }

        if let Some(payload) = self.data {
            let serialized = match &payload {
                Payload::Keyed(_, data) | Payload::Flat(data) => serde_json::to_value(data),
            };

            match (payload, serialized) {
                (Payload::Keyed(key, _), Ok(value)) => {
                    envelope.insert(key.to_string(), value);
                }
                (Payload::Flat(_), Ok(Value::Object(fields))) => {
                    envelope.extend(fields);
                }
                (Payload::Flat(_), Ok(other)) => {
                    envelope.insert("data".to_string(), other);
                }
                (_, Err(e)) => {
                    tracing::error!("Failed to serialize response data: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(json!({ "error": "Failed to serialize response data" })),
                    )
                        .into_response();
                }
            }
        }

        (status, Json(Value::Object(envelope))).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

/// `Json` extractor whose rejections use the API error envelope
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);
