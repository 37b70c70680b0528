use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::admin::AdminState;
use crate::registry::ClientSummary;

#[derive(Debug, Serialize)]
pub struct SystemStatus {
    pub version: &'static str,
    pub status: &'static str,
    pub auth_method: String,
    pub connections: usize,
}

pub async fn get_status(State(state): State<AdminState>) -> Json<SystemStatus> {
    Json(SystemStatus {
        version: env!("CARGO_PKG_VERSION"),
        status: "operational",
        auth_method: state.auth_method.clone(),
        connections: state.registry.len(),
    })
}

pub async fn list_clients(State(state): State<AdminState>) -> Json<Vec<ClientSummary>> {
    Json(state.registry.snapshot())
}

pub async fn disconnect_client(
    State(state): State<AdminState>,
    Path(client_id): Path<String>,
) -> StatusCode {
    if state.registry.disconnect(&client_id, "Disconnected by administrator") {
        StatusCode::NO_CONTENT
    } else {
        StatusCode::NOT_FOUND
    }
}
