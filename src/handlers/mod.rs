// handlers/mod.rs - route handlers grouped by surface
//
// resource: generic CRUD over the business collections (/api/:resource)
// delivery: delivery actions (/api/deliveries/:id/cancel|complete)
// health:   liveness and database connectivity (/health)
// auth:     session introspection (/api/auth/*)

pub mod auth;
pub mod delivery;
pub mod health;
pub mod resource;
