use serde::Serialize;

use crate::types::Area;

use super::{Claims, Role};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionUser {
    pub id: String,
    pub role: Role,
}

/// Per-request session state handed explicitly to whatever needs it
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionContext {
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub user: Option<SessionUser>,
}

impl SessionContext {
    pub fn anonymous() -> Self {
        Self {
            is_authenticated: false,
            is_loading: false,
            user: None,
        }
    }

    /// Session whose identity has not been resolved yet
    pub fn loading() -> Self {
        Self {
            is_authenticated: false,
            is_loading: true,
            user: None,
        }
    }

    pub fn authenticated(user: SessionUser) -> Self {
        Self {
            is_authenticated: true,
            is_loading: false,
            user: Some(user),
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }
}

impl From<Claims> for SessionContext {
    fn from(claims: Claims) -> Self {
        Self::authenticated(SessionUser {
            id: claims.sub,
            role: claims.role,
        })
    }
}

/// Outcome of gating a session against a section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Gate {
    /// Identity still loading; render nothing yet
    Pending,
    RedirectLogin,
    Forbidden,
    Allow,
}

/// Roles admitted to each area besides admin
fn area_roles(area: Area) -> &'static [Role] {
    match area {
        Area::Crm => &[Role::Sales],
        Area::Inventory => &[Role::Warehouse, Role::Procurement],
        Area::Procurement => &[Role::Procurement],
        Area::AfterSales => &[Role::Support, Role::Warehouse],
    }
}

pub fn gate(session: &SessionContext, area: Area) -> Gate {
    if session.is_loading {
        return Gate::Pending;
    }
    let role = match (session.is_authenticated, session.role()) {
        (true, Some(role)) => role,
        _ => return Gate::RedirectLogin,
    };
    if role == Role::Admin || area_roles(area).contains(&role) {
        Gate::Allow
    } else {
        Gate::Forbidden
    }
}
