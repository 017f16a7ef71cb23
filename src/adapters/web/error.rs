//! HTTP error responses for the web adapter.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
};

use crate::domain::error::QuantdeskError;

#[derive(Debug)]
pub enum WebError {
    Page { status: StatusCode, message: String },
    /// Session is missing or was torn down; send the browser to login.
    LoginRedirect,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        WebError::Page {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl From<QuantdeskError> for WebError {
    fn from(err: QuantdeskError) -> Self {
        let status = match &err {
            QuantdeskError::Unauthorized => return WebError::LoginRedirect,
            QuantdeskError::ConfigParse { .. }
            | QuantdeskError::ConfigMissing { .. }
            | QuantdeskError::ConfigInvalid { .. }
            | QuantdeskError::ExperimentParse { .. } => StatusCode::BAD_REQUEST,
            QuantdeskError::NoData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            QuantdeskError::Api { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            QuantdeskError::Http { .. } => StatusCode::BAD_GATEWAY,
            QuantdeskError::SessionStore { .. }
            | QuantdeskError::Csv(_)
            | QuantdeskError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        match self {
            WebError::LoginRedirect => Redirect::to("/login").into_response(),
            WebError::Page { status, message } => {
                let template = super::templates::ErrorTemplate {
                    message: &message,
                    status: status.as_u16(),
                };
                match template.render() {
                    Ok(html) => (status, Html(html)).into_response(),
                    Err(_) => (status, message).into_response(),
                }
            }
        }
    }
}
