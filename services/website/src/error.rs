use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use suzstar_common::{AppError, FieldErrors};

fn status_of(err: &AppError) -> StatusCode {
    StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn log_failure(err: &AppError) {
    match err {
        AppError::Database(_) | AppError::Internal(_) | AppError::ExternalService(_) => {
            tracing::error!(error = %err, code = err.error_code(), "Request failed");
        }
        _ => tracing::debug!(error = %err, code = err.error_code(), "Request rejected"),
    }
}

/// Error for HTML page handlers: renders a minimal error page.
#[derive(Debug)]
pub struct PageError(pub AppError);

impl From<AppError> for PageError {
    fn from(err: AppError) -> Self {
        PageError(err)
    }
}

impl From<sqlx::Error> for PageError {
    fn from(err: sqlx::Error) -> Self {
        PageError(AppError::Database(err))
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        log_failure(&self.0);
        let status = status_of(&self.0);
        let (title, detail) = match status {
            StatusCode::NOT_FOUND => ("Page not found", "The page you are looking for does not exist or has been moved."),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ("Access denied", "Please sign in with a staff account."),
            StatusCode::BAD_REQUEST | StatusCode::CONFLICT => ("Request not accepted", "Please check the information you submitted and try again."),
            _ => ("Something went wrong", "We could not complete your request. Please try again shortly."),
        };
        let body = format!(
            "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\"><title>{title} | Suzstar Counseling</title></head>\
             <body><main><h1>{title}</h1><p>{detail}</p><p><a href=\"/\">Return home</a></p></main></body></html>"
        );
        (status, Html(body)).into_response()
    }
}

/// Error for the JSON admin API.
#[derive(Debug)]
pub struct JsonError(pub AppError);

impl From<AppError> for JsonError {
    fn from(err: AppError) -> Self {
        JsonError(err)
    }
}

impl From<FieldErrors> for JsonError {
    fn from(errors: FieldErrors) -> Self {
        JsonError(AppError::InvalidForm(errors))
    }
}

impl IntoResponse for JsonError {
    fn into_response(self) -> Response {
        log_failure(&self.0);
        (status_of(&self.0), Json(self.0.to_api_error())).into_response()
    }
}
