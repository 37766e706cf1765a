use axum::{
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use payledger_auth::Role;

use crate::context::CallerContext;

pub const CALLER_ID_HEADER: &str = "x-caller-id";
pub const CALLER_ORG_HEADER: &str = "x-caller-org";
/// Comma-separated role names; optional.
pub const CALLER_ROLES_HEADER: &str = "x-caller-roles";

/// Resolve the caller from trusted gateway headers.
///
/// Requests without a caller ID or organization are rejected with 401.
pub async fn caller_middleware(
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let caller = extract_caller(req.headers())?;
    req.extensions_mut().insert(caller);
    Ok(next.run(req).await)
}

fn extract_caller(headers: &HeaderMap) -> Result<CallerContext, StatusCode> {
    let caller_id = required_header(headers, CALLER_ID_HEADER)?;
    let organization = required_header(headers, CALLER_ORG_HEADER)?;

    let roles = match headers.get(CALLER_ROLES_HEADER) {
        Some(value) => value
            .to_str()
            .map_err(|_| StatusCode::UNAUTHORIZED)?
            .split(',')
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(|r| Role::new(r.to_string()))
            .collect(),
        None => Vec::new(),
    };

    Ok(CallerContext::new(caller_id, organization, roles))
}

fn required_header<'h>(headers: &'h HeaderMap, name: &str) -> Result<&'h str, StatusCode> {
    let value = headers
        .get(name)
        .ok_or(StatusCode::UNAUTHORIZED)?
        .to_str()
        .map_err(|_| StatusCode::UNAUTHORIZED)?
        .trim();

    if value.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }
    Ok(value)
}
