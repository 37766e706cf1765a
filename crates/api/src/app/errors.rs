use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use payledger_core::AccountId;
use payledger_infra::LedgerError;

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    let status = match &err {
        LedgerError::NotFound(_) => StatusCode::NOT_FOUND,
        LedgerError::AlreadyExists(_) | LedgerError::Conflict(_) => StatusCode::CONFLICT,
        LedgerError::InsufficientFunds { .. } | LedgerError::InvalidAmount(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        LedgerError::Validation(_) => StatusCode::BAD_REQUEST,
        LedgerError::Forbidden(_) => StatusCode::FORBIDDEN,
        LedgerError::Corrupt { .. } | LedgerError::TransactionAborted(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        LedgerError::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
    };
    json_error(status, err.code(), err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

pub fn parse_account_id(raw: &str) -> Result<AccountId, axum::response::Response> {
    AccountId::new(raw).map_err(|e| json_error(StatusCode::BAD_REQUEST, "validation_error", e.to_string()))
}
