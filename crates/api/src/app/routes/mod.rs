use axum::Router;

pub mod accounts;
pub mod banks;
pub mod system;
pub mod transfers;
pub mod users;

/// Router for all caller-scoped ledger endpoints.
pub fn router() -> Router {
    Router::new()
        .nest("/accounts", accounts::router())
        .nest("/transfers", transfers::router())
        .nest("/banks", banks::router())
        .merge(users::router())
}
