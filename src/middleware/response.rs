use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

/// Uniform JSON body returned by every API route.
///
/// Success envelopes carry `data` and `message`; failure envelopes carry
/// `error` and never `data`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Envelope<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Envelope plus the HTTP status it is sent with
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub envelope: Envelope<T>,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// `{success: true, data, message}` with 200 OK
    pub fn success(data: T, message: impl Into<String>) -> Self {
        Self {
            envelope: Envelope {
                success: true,
                data: Some(data),
                message: Some(message.into()),
                error: None,
            },
            status_code: StatusCode::OK,
        }
    }

    /// 201 Created success
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::success(data, message).with_status(StatusCode::CREATED)
    }

    /// Replace the status code. The range is not checked against the
    /// envelope's `success` flag.
    pub fn with_status(mut self, status_code: StatusCode) -> Self {
        self.status_code = status_code;
        self
    }
}

impl ApiResponse<()> {
    /// `{success: false, error: message}` with 500 Internal Server Error
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            envelope: Envelope {
                success: false,
                data: None,
                message: None,
                error: Some(message.into()),
            },
            status_code: StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        // Serialize up front so a failing payload still yields an envelope
        match serde_json::to_value(&self.envelope) {
            Ok(body) => (self.status_code, Json(body)).into_response(),
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                ApiResponse::failure("Failed to serialize response data").into_response()
            }
        }
    }
}

// Convenience type aliases
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
