use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};

use crate::jwt::JwtService;

/// Cookie set by the staff login endpoint.
pub const STAFF_COOKIE: &str = "staff_token";

/// Rejects requests without a valid staff token; on success the decoded
/// [`Claims`](crate::jwt::Claims) are available to handlers as an `Extension<Claims>`.
pub async fn staff_auth_middleware(
    State(jwt_service): State<JwtService>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_token(&headers).ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = jwt_service.validate_token(&token).map_err(|e| {
        tracing::debug!(error = %e, "Rejected staff token");
        StatusCode::from_u16(e.status_code()).unwrap_or(StatusCode::UNAUTHORIZED)
    })?;

    request.extensions_mut().insert(claims);
    Ok(next.run(request).await)
}

/// Bearer header first, then the staff cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    extract_bearer(headers).or_else(|| extract_cookie(headers, STAFF_COOKIE))
}

fn extract_bearer(headers: &HeaderMap) -> Option<String> {
    let auth_str = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

fn extract_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value carrying a freshly issued token.
pub fn staff_cookie(token: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        STAFF_COOKIE, token, max_age_secs
    )
}

/// `Set-Cookie` value that removes the staff token.
pub fn expired_staff_cookie() -> String {
    format!("{}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0", STAFF_COOKIE)
}
