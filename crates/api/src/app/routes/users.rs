use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};

use crate::app::errors;
use crate::app::services::AppServices;
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/users/:id", get(read_own_user))
        .route("/collections/:collection/users/:id", get(read_collection_user))
}

/// Private record from the caller's own collection.
pub async fn read_own_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let user_id = match errors::parse_account_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.ledger.read_user_details(&caller, &user_id) {
        Ok(details) => (StatusCode::OK, Json(details)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn read_collection_user(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path((collection, id)): Path<(String, String)>,
) -> axum::response::Response {
    let user_id = match errors::parse_account_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services
        .ledger
        .read_user_from_collection(&caller, &collection, &user_id)
    {
        Ok(details) => (StatusCode::OK, Json(details)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
