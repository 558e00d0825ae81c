pub mod catalog;
pub mod collections;
pub mod health;
pub mod series;
pub mod sync;

use axum::{http::StatusCode, Json};

use crate::services::library::ActionError;
use crate::services::uploader::UploadError;

/// Error half of every handler result
pub type ApiError = (StatusCode, Json<serde_json::Value>);

/// Collapse an action failure into one user-facing message
pub fn action_error(err: ActionError) -> ApiError {
    let status = match &err {
        ActionError::Validation(_) => StatusCode::BAD_REQUEST,
        ActionError::NotFound { .. } => StatusCode::NOT_FOUND,
        ActionError::Upload(
            UploadError::InvalidPayload(_) | UploadError::TooLarge { .. } | UploadError::UnsupportedFormat,
        ) => StatusCode::BAD_REQUEST,
        ActionError::Upload(UploadError::NotConfigured) => StatusCode::SERVICE_UNAVAILABLE,
        ActionError::Upload(_) => StatusCode::BAD_GATEWAY,
        ActionError::Persist(_) => StatusCode::SERVICE_UNAVAILABLE,
        ActionError::Catalog(_) => StatusCode::BAD_GATEWAY,
    };

    if status.is_server_error() {
        tracing::error!("Action failed: {}", err);
    } else {
        tracing::debug!("Action rejected: {}", err);
    }

    // Local state already holds the change; tell the client it is unsynced
    let body = if matches!(err, ActionError::Persist(_)) {
        serde_json::json!({ "error": err.to_string(), "unsynced": true })
    } else {
        serde_json::json!({ "error": err.to_string() })
    };

    (status, Json(body))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CollectionKind;
    use crate::services::store::StoreError;

    #[test]
    fn test_action_error_status_mapping() {
        let (status, _) = action_error(ActionError::Validation("name is required".into()));
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, Json(body)) = action_error(ActionError::NotFound {
            kind: CollectionKind::Custom,
            key: "x".into(),
        });
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "custom 'x' not found");

        let (status, _) = action_error(ActionError::Upload(UploadError::UnsupportedFormat));
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, _) = action_error(ActionError::Upload(UploadError::Http(500)));
        assert_eq!(status, StatusCode::BAD_GATEWAY);

        let (status, Json(body)) =
            action_error(ActionError::Persist(StoreError::Unavailable("down".into())));
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["unsynced"], true);
    }
}
