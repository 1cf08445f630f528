use axum::{Json, http::StatusCode, response::IntoResponse};
use oauth2::basic::BasicErrorResponseType;
use oauth2::reqwest::Error as ReqwestClientError;
use oauth2::{HttpClientError, RequestTokenError, StandardErrorResponse};
use serde::Serialize;
use sqlx::Error as SqlxError;
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum VaultError {
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("HTTP request error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("no refresh token stored; complete the /api/s/auth flow first")]
    MissingRefreshToken,

    #[error("OAuth2 token request error: {0}")]
    Oauth2Token(String),

    #[error("OAuth2 server error: {error}")]
    Oauth2Server { error: String },

    #[error("authorization callback rejected: {0}")]
    CallbackDenied(String),

    #[error("database error: {0}")]
    Storage(#[from] SqlxError),

    #[error("record not found")]
    NotFound,

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("upstream error with status: {0}")]
    UpstreamStatus(StatusCode),
}

impl VaultError {
    /// Transport-level failures are worth another attempt; everything else
    /// (provider rejections, decode failures, storage errors) is not.
    pub fn is_retryable(&self) -> bool {
        matches!(self, VaultError::Network(_) | VaultError::Oauth2Token(_))
    }
}

impl
    From<
        RequestTokenError<
            HttpClientError<ReqwestClientError>,
            StandardErrorResponse<BasicErrorResponseType>,
        >,
    > for VaultError
{
    fn from(
        e: RequestTokenError<
            HttpClientError<ReqwestClientError>,
            StandardErrorResponse<BasicErrorResponseType>,
        >,
    ) -> Self {
        match e {
            RequestTokenError::ServerResponse(err) => VaultError::Oauth2Server {
                error: err.error().to_string(),
            },
            RequestTokenError::Request(req_e) => {
                VaultError::Oauth2Token(format!("request failed: {}", req_e))
            }
            RequestTokenError::Parse(parse_err, _body) => VaultError::Parse(parse_err.into_inner()),
            RequestTokenError::Other(s) => VaultError::Oauth2Token(s),
        }
    }
}

impl IntoResponse for VaultError {
    fn into_response(self) -> axum::response::Response {
        let (status, error_body) = match self {
            VaultError::NotFound => {
                let body = ApiErrorBody {
                    code: "NOT_FOUND".to_string(),
                    message: "No such record.".to_string(),
                };
                (StatusCode::NOT_FOUND, body)
            }
            VaultError::InvalidInput(msg) => {
                let body = ApiErrorBody {
                    code: "INVALID_INPUT".to_string(),
                    message: msg,
                };
                (StatusCode::BAD_REQUEST, body)
            }
            VaultError::Storage(_) => {
                let body = ApiErrorBody {
                    code: "INTERNAL_ERROR".to_string(),
                    message: "An internal server error occurred.".to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, body)
            }
            VaultError::Oauth2Token(_)
            | VaultError::Oauth2Server { .. }
            | VaultError::MissingRefreshToken
            | VaultError::CallbackDenied(_) => {
                let body = ApiErrorBody {
                    code: "UNAUTHORIZED".to_string(),
                    message: "Authentication error.".to_string(),
                };
                (StatusCode::UNAUTHORIZED, body)
            }
            VaultError::Network(_) | VaultError::UrlParse(_) | VaultError::Parse(_) => {
                let body = ApiErrorBody {
                    code: "BAD_GATEWAY".to_string(),
                    message: "Upstream service is unavailable.".to_string(),
                };
                (StatusCode::BAD_GATEWAY, body)
            }
            VaultError::UpstreamStatus(code) => {
                let (err_code, msg) = match code {
                    StatusCode::TOO_MANY_REQUESTS => {
                        ("RATE_LIMIT", "Upstream rate limit exceeded.")
                    }
                    StatusCode::UNAUTHORIZED => ("UNAUTHORIZED", "Upstream authentication failed."),
                    StatusCode::FORBIDDEN => ("FORBIDDEN", "Upstream permission denied."),
                    StatusCode::NOT_FOUND => ("NOT_FOUND", "Upstream resource not found."),
                    _ => ("UPSTREAM_ERROR", "An upstream error occurred."),
                };

                (
                    code,
                    ApiErrorBody {
                        code: err_code.to_string(),
                        message: msg.to_string(),
                    },
                )
            }
        };
        (status, Json(ApiErrorResponse { error: error_body })).into_response()
    }
}

/// Standardized API error response body
#[derive(Serialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: ApiErrorBody,
}
