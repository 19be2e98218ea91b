use feed_core::FeedError;
use serde::Deserialize;

/// Тело ошибки: прокси отдаёт `{ "error": ... }`, апстрим `{ "message": ... }`.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponseDto {
    error: Option<String>,
    message: Option<String>,
}

impl ErrorResponseDto {
    pub(crate) fn into_message(self) -> Option<String> {
        self.error
            .or(self.message)
            .map(|message| message.trim().to_string())
            .filter(|message| !message.is_empty())
    }
}

pub(crate) fn from_http_status(status: reqwest::StatusCode, message: Option<String>) -> FeedError {
    let message = message.unwrap_or_else(|| format!("http status {status}"));
    FeedError::Network {
        status: status.as_u16(),
        message,
    }
}

pub(crate) fn from_reqwest(err: reqwest::Error) -> FeedError {
    if let Some(status) = err.status() {
        return from_http_status(status, None);
    }
    if err.is_decode() {
        return FeedError::Decode(err.to_string());
    }
    FeedError::Transport(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_keeps_code_and_message() {
        let err = from_http_status(reqwest::StatusCode::NOT_FOUND, Some("no post".to_string()));
        assert_eq!(
            err,
            FeedError::Network {
                status: 404,
                message: "no post".to_string()
            }
        );
    }

    #[test]
    fn http_status_without_message_uses_status_text() {
        let err = from_http_status(reqwest::StatusCode::BAD_GATEWAY, None);
        match err {
            FeedError::Network { status, message } => {
                assert_eq!(status, 502);
                assert!(message.contains("502"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn error_body_prefers_proxy_field() {
        let body: ErrorResponseDto =
            serde_json::from_str(r#"{"error":"upstream timeout","message":"x"}"#)
                .expect("must decode");
        assert_eq!(body.into_message().as_deref(), Some("upstream timeout"));

        let body: ErrorResponseDto =
            serde_json::from_str(r#"{"message":"Post with id '9999' not found"}"#)
                .expect("must decode");
        assert_eq!(
            body.into_message().as_deref(),
            Some("Post with id '9999' not found")
        );

        let body: ErrorResponseDto = serde_json::from_str(r#"{"error":"  "}"#).expect("must decode");
        assert!(body.into_message().is_none());
    }
}
