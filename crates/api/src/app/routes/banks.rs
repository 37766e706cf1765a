use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/:bank/balances", get(list_balances))
}

pub async fn list_balances(
    Extension(services): Extension<Arc<AppServices>>,
    Path(bank): Path<String>,
) -> axum::response::Response {
    match services.ledger.balances().list_balances_for_organization(&bank) {
        Ok(items) => (StatusCode::OK, Json(dto::Items { items })).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
