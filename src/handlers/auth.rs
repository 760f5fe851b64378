use serde::Serialize;

use crate::auth::{gate, Gate, SessionContext};
use crate::middleware::{ApiResponse, ApiResult};
use crate::types::Area;

#[derive(Debug, Serialize)]
pub struct AreaAccess {
    pub area: Area,
    pub gate: Gate,
}

#[derive(Debug, Serialize)]
pub struct WhoAmI {
    pub session: SessionContext,
    pub access: Vec<AreaAccess>,
}

/// GET /api/auth/whoami - resolved session plus per-area gate decisions
pub async fn whoami(session: SessionContext) -> ApiResult<WhoAmI> {
    let access = Area::ALL
        .into_iter()
        .map(|area| AreaAccess { area, gate: gate(&session, area) })
        .collect();

    let message = match session.user.as_ref() {
        Some(user) => format!("Authenticated as {}", user.id),
        None => "Not authenticated".to_string(),
    };
    Ok(ApiResponse::success(WhoAmI { session, access }, message))
}
