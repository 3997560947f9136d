//! `/users` resource handlers
//!
//! Each handler validates its input first, then makes one store call.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use presence_core::{NewPresence, PresencePatch, RecordId};
use serde::Deserialize;
use std::sync::Arc;

use crate::gateway::GatewayState;
use crate::{GatewayError, Result};

/// `?id=N` query parameter. Kept as text so a bad value becomes a 400, not a rejection.
#[derive(Debug, Default, Deserialize)]
pub struct IdQuery {
    pub id: Option<String>,
}

/// Request body for create and update
#[derive(Debug, Default, Deserialize)]
pub struct PresenceBody {
    pub name: Option<String>,
    #[serde(rename = "lineStatus")]
    pub line_status: Option<String>,
}

/// Parse the optional id. An empty value counts as absent.
fn parse_id(query: std::result::Result<Query<IdQuery>, QueryRejection>) -> Result<Option<RecordId>> {
    let Query(query) = query?;
    match query.id.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => match raw.parse::<RecordId>() {
            Ok(id) if id > 0 => Ok(Some(id)),
            _ => Err(GatewayError::BadRequest(format!("Invalid id '{}'", raw))),
        },
    }
}

fn require_id(query: std::result::Result<Query<IdQuery>, QueryRejection>) -> Result<RecordId> {
    parse_id(query)?.ok_or_else(|| GatewayError::BadRequest("Missing id".to_string()))
}

fn not_found() -> GatewayError {
    GatewayError::NotFound("User not found".to_string())
}

/// GET /users and GET /users?id=N
pub async fn list_or_get(
    State(state): State<Arc<GatewayState>>,
    query: std::result::Result<Query<IdQuery>, QueryRejection>,
) -> Result<Response> {
    match parse_id(query)? {
        Some(id) => {
            let record = state
                .with_store(move |store| store.get(id))
                .await?
                .ok_or_else(not_found)?;
            Ok(Json(record).into_response())
        }
        None => {
            let records = state.with_store(|store| store.list()).await?;
            Ok(Json(records).into_response())
        }
    }
}

/// POST /users
pub async fn create(
    State(state): State<Arc<GatewayState>>,
    body: std::result::Result<Json<PresenceBody>, JsonRejection>,
) -> Result<Response> {
    let Json(body) = body?;
    let new = NewPresence::from_parts(body.name, body.line_status.as_deref())?;

    let record = state.with_store(move |store| store.create(new)).await?;
    tracing::info!("Created user {} ({})", record.id, record.status);
    Ok((StatusCode::CREATED, Json(record)).into_response())
}

/// PATCH /users?id=N
pub async fn update(
    State(state): State<Arc<GatewayState>>,
    query: std::result::Result<Query<IdQuery>, QueryRejection>,
    body: std::result::Result<Json<PresenceBody>, JsonRejection>,
) -> Result<Response> {
    let id = require_id(query)?;
    let Json(body) = body?;
    let patch = PresencePatch::from_parts(body.name, body.line_status.as_deref())?;

    let record = state
        .with_store(move |store| store.save(id, &patch))
        .await?
        .ok_or_else(not_found)?;
    tracing::info!("Updated user {}", record.id);
    Ok(Json(record).into_response())
}

/// DELETE /users?id=N
pub async fn destroy(
    State(state): State<Arc<GatewayState>>,
    query: std::result::Result<Query<IdQuery>, QueryRejection>,
) -> Result<StatusCode> {
    let id = require_id(query)?;

    if !state.with_store(move |store| store.destroy(id)).await? {
        return Err(not_found());
    }
    tracing::info!("Deleted user {}", id);
    Ok(StatusCode::NO_CONTENT)
}

/// OPTIONS /users. The CORS layer supplies the headers.
pub async fn preflight() -> StatusCode {
    StatusCode::NO_CONTENT
}

/// GET /health
pub async fn health(State(state): State<Arc<GatewayState>>) -> Result<Response> {
    let records = state.with_store(|store| store.count()).await?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "version": crate::VERSION,
        "store": state.store.backend().as_str(),
        "records": records,
    }))
    .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(id: Option<&str>) -> std::result::Result<Query<IdQuery>, QueryRejection> {
        Ok(Query(IdQuery {
            id: id.map(str::to_string),
        }))
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id(query(None)).unwrap(), None);
        assert_eq!(parse_id(query(Some(""))).unwrap(), None);
        assert_eq!(parse_id(query(Some("42"))).unwrap(), Some(42));
        assert!(parse_id(query(Some("abc"))).is_err());
        assert!(parse_id(query(Some("0"))).is_err());
        assert!(parse_id(query(Some("-3"))).is_err());
    }

    #[test]
    fn test_require_id() {
        assert!(matches!(
            require_id(query(None)),
            Err(GatewayError::BadRequest(msg)) if msg == "Missing id"
        ));
        assert_eq!(require_id(query(Some("7"))).unwrap(), 7);
    }
}
