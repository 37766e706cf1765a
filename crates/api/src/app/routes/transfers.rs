use std::sync::Arc;

use axum::{
    Json, Router,
    extract::Extension,
    http::StatusCode,
    response::IntoResponse,
    routing::post,
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

pub fn router() -> Router {
    Router::new().route("/", post(transfer))
}

pub async fn transfer(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::TransferRequest>,
) -> axum::response::Response {
    let remitter = match errors::parse_account_id(&body.remitter) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let beneficiary = match errors::parse_account_id(&body.beneficiary) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.ledger.transfer(&remitter, &beneficiary, body.amount) {
        Ok(transaction_id) => (
            StatusCode::CREATED,
            Json(dto::TransferResponse { transaction_id }),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
