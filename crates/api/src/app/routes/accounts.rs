use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CallerContext;

pub fn router() -> Router {
    Router::new()
        .route("/", post(register_account))
        .route("/:id", delete(delete_account))
        .route("/:id/kyc", post(approve_kyc).get(kyc_status))
        .route("/:id/balance", get(balance))
        .route("/:id/statement", get(statement))
}

pub async fn register_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Json(body): Json<dto::RegisterAccountRequest>,
) -> axum::response::Response {
    let (bank, profile) = body.into_parts();
    match services
        .ledger
        .register_account(&caller, bank.as_deref(), profile)
    {
        Ok(account) => (StatusCode::CREATED, Json(account)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn approve_kyc(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let account_id = match errors::parse_account_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.ledger.approve_kyc(&account_id) {
        Ok(account) => (StatusCode::OK, Json(account)).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn kyc_status(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let account_id = match errors::parse_account_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.ledger.kyc_status_of(&account_id) {
        Ok(kyc_status) => (
            StatusCode::OK,
            Json(dto::KycStatusResponse {
                account_id: account_id.into_inner(),
                kyc_status,
            }),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn balance(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let account_id = match errors::parse_account_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.ledger.balance_of(&account_id) {
        Ok(balance) => (
            StatusCode::OK,
            Json(dto::BalanceResponse {
                account_id: account_id.into_inner(),
                balance,
            }),
        )
            .into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn delete_account(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(caller): Extension<CallerContext>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let account_id = match errors::parse_account_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.ledger.delete_account(&caller, &account_id) {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

pub async fn statement(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let account_id = match errors::parse_account_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };

    match services.ledger.auditor().get_account_statement(&account_id) {
        Ok(items) => (StatusCode::OK, Json(dto::Items { items })).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
