use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    Json,
};
use serde_json::{json, Map, Value};
use uuid::Uuid;

use crate::database::strip_system_fields;
use crate::error::ApiError;
use crate::filter::{ListQuery, NormalizedQuery};
use crate::middleware::{ApiResponse, ApiResult};
use crate::server::AppState;
use crate::types::Resource;

fn parse_id(resource: Resource, id: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(id).map_err(|_| ApiError::bad_request(format!("Invalid {} id '{}'", resource.singular().to_lowercase(), id)))
}

/// Request body as a JSON object, with store-owned fields removed
fn object_body(payload: Result<Json<Value>, JsonRejection>) -> Result<Map<String, Value>, ApiError> {
    let Json(value) = payload?;
    match value {
        Value::Object(mut map) => {
            strip_system_fields(&mut map);
            Ok(map)
        }
        _ => Err(ApiError::bad_request("Request body must be a JSON object")),
    }
}

fn not_found(resource: Resource, id: Uuid) -> ApiError {
    ApiError::not_found(format!("{} {} not found", resource.singular(), id))
}

/// GET /api/:resource - paginated, filtered list
pub async fn list(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    query: NormalizedQuery,
) -> ApiResult<Vec<Value>> {
    let Path(resource) = path?;
    let resource: Resource = resource.parse()?;
    let list_query = ListQuery::for_resource(resource, &query);
    let page = state.store.list(resource.collection(), &list_query).await?;

    let message = format!(
        "Retrieved {} of {} {}",
        page.items.len(),
        page.total,
        resource.plural()
    );
    let data = page.items.iter().map(|d| d.to_json()).collect();
    Ok(ApiResponse::success(data, message))
}

/// POST /api/:resource - create a document
pub async fn create(
    State(state): State<AppState>,
    path: Result<Path<String>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Path(resource) = path?;
    let resource: Resource = resource.parse()?;
    let body = object_body(payload)?;
    let doc = state.store.insert(resource.collection(), body).await?;

    tracing::info!(resource = %resource, id = %doc.id, "created document");
    Ok(ApiResponse::created(
        doc.to_json(),
        format!("{} created successfully", resource.singular()),
    ))
}

/// GET /api/:resource/:id
pub async fn show(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> ApiResult<Value> {
    let Path((resource, id)) = path?;
    let resource: Resource = resource.parse()?;
    let id = parse_id(resource, &id)?;
    let doc = state
        .store
        .get(resource.collection(), id)
        .await?
        .ok_or_else(|| not_found(resource, id))?;

    Ok(ApiResponse::success(
        doc.to_json(),
        format!("{} retrieved successfully", resource.singular()),
    ))
}

/// PUT /api/:resource/:id - shallow merge into the stored document
pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Value> {
    let Path((resource, id)) = path?;
    let resource: Resource = resource.parse()?;
    let id = parse_id(resource, &id)?;
    let patch = object_body(payload)?;
    let doc = state
        .store
        .update(resource.collection(), id, patch)
        .await?
        .ok_or_else(|| not_found(resource, id))?;

    Ok(ApiResponse::success(
        doc.to_json(),
        format!("{} updated successfully", resource.singular()),
    ))
}

/// DELETE /api/:resource/:id
pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<(String, String)>, PathRejection>,
) -> ApiResult<Value> {
    let Path((resource, id)) = path?;
    let resource: Resource = resource.parse()?;
    let id = parse_id(resource, &id)?;
    if !state.store.delete(resource.collection(), id).await? {
        return Err(not_found(resource, id));
    }

    tracing::info!(resource = %resource, id = %id, "deleted document");
    Ok(ApiResponse::success(
        json!({ "id": id }),
        format!("{} deleted successfully", resource.singular()),
    ))
}
