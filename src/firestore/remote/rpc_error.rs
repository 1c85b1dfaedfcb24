use reqwest::StatusCode;
use serde::Deserialize;

use crate::firestore::error::{
    deadline_exceeded, internal_error, invalid_argument, not_found, permission_denied,
    resource_exhausted, unauthenticated, unavailable, FirestoreError,
};

#[derive(Debug, Deserialize)]
struct GoogleErrorBody {
    error: Option<GoogleError>,
}

#[derive(Debug, Deserialize)]
struct GoogleError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

/// Translates a failed REST response into a `FirestoreError`.
///
/// The `status` string of the Google error payload wins over the HTTP status
/// when it names a known RPC code.
pub fn map_http_error(status: StatusCode, body: &str) -> FirestoreError {
    let payload = extract_error_payload(body);
    let message = payload
        .as_ref()
        .and_then(|payload| payload.message.clone())
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("HTTP error").to_string());

    if let Some(code) = payload
        .as_ref()
        .and_then(|payload| payload.status.as_deref())
        .and_then(crate::firestore::error::FirestoreErrorCode::from_status_name)
    {
        return FirestoreError::new(code, message);
    }

    match status {
        StatusCode::BAD_REQUEST
        | StatusCode::CONFLICT
        | StatusCode::PRECONDITION_FAILED
        | StatusCode::PAYLOAD_TOO_LARGE
        | StatusCode::UNSUPPORTED_MEDIA_TYPE => invalid_argument(message),
        StatusCode::UNAUTHORIZED => unauthenticated(message),
        StatusCode::FORBIDDEN => permission_denied(message),
        StatusCode::NOT_FOUND => not_found(message),
        StatusCode::TOO_MANY_REQUESTS => resource_exhausted(message),
        StatusCode::SERVICE_UNAVAILABLE | StatusCode::BAD_GATEWAY => unavailable(message),
        StatusCode::GATEWAY_TIMEOUT | StatusCode::REQUEST_TIMEOUT => deadline_exceeded(message),
        status if status.is_client_error() => invalid_argument(message),
        _ => internal_error(message),
    }
}

fn extract_error_payload(body: &str) -> Option<GoogleError> {
    serde_json::from_str::<GoogleErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::firestore::error::FirestoreErrorCode;

    #[test]
    fn payload_status_takes_precedence() {
        let body = r#"{"error":{"code":400,"message":"Missing or insufficient permissions.","status":"PERMISSION_DENIED"}}"#;
        let err = map_http_error(StatusCode::BAD_REQUEST, body);
        assert_eq!(err.code, FirestoreErrorCode::PermissionDenied);
        assert_eq!(err.message(), "Missing or insufficient permissions.");
    }

    #[test]
    fn falls_back_to_http_status() {
        let err = map_http_error(StatusCode::SERVICE_UNAVAILABLE, "upstream down");
        assert_eq!(err.code, FirestoreErrorCode::Unavailable);
        assert_eq!(err.message(), "Service Unavailable");
    }

    #[test]
    fn unknown_server_errors_are_internal() {
        let err = map_http_error(StatusCode::from_u16(599).unwrap(), "");
        assert_eq!(err.code, FirestoreErrorCode::Internal);
    }
}
