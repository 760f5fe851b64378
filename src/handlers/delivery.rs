// Delivery actions. Neither route touches the store yet: both echo the
// request body back as if the action had been applied.
// TODO: persist status changes once the delivery workflow is defined.

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, PathRejection},
        Path,
    },
};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::Resource;

/// Actions are mounted under /api/:resource/:id, only deliveries have them
fn delivery_id(resource: &str, id: String, action: &str) -> Result<String, ApiError> {
    match resource.parse::<Resource>()? {
        Resource::Deliveries => Ok(id),
        other => Err(ApiError::not_found(format!("{} has no '{}' action", other.singular(), action))),
    }
}

/// `{id, ...body}`; body keys win. An empty body is treated as `{}`.
fn echo_payload(id: String, body: &Bytes) -> Result<Map<String, Value>, ApiError> {
    let mut data = Map::new();
    data.insert("id".into(), Value::String(id));

    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(data);
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(fields)) => {
            data.extend(fields);
            Ok(data)
        }
        Ok(_) => Err(ApiError::bad_request("Request body must be a JSON object")),
        Err(e) => Err(ApiError::bad_request(format!("Invalid JSON body: {}", e))),
    }
}

/// POST /api/deliveries/:id/cancel
pub async fn cancel(
    path: Result<Path<(String, String)>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Map<String, Value>> {
    let Path((resource, id)) = path?;
    let id = delivery_id(&resource, id, "cancel")?;
    let body = body?;
    tracing::warn!(delivery = %id, "cancel requested; not persisted");
    let message = format!("Delivery {} cancelled successfully", id);
    Ok(ApiResponse::success(echo_payload(id, &body)?, message))
}

/// POST /api/deliveries/:id/complete
pub async fn complete(
    path: Result<Path<(String, String)>, PathRejection>,
    body: Result<Bytes, BytesRejection>,
) -> ApiResult<Map<String, Value>> {
    let Path((resource, id)) = path?;
    let id = delivery_id(&resource, id, "complete")?;
    let body = body?;
    tracing::warn!(delivery = %id, "completion requested; not persisted");
    let message = format!("Delivery {} completed successfully", id);
    Ok(ApiResponse::success(echo_payload(id, &body)?, message))
}
