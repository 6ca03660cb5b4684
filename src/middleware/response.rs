use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::json;

use crate::error::ApiError;
use crate::notice::Notice;

/// Success envelope `{success, data, notice?}`.
///
/// Writes attach the notice the page shows once; reads usually carry none.
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub notice: Option<Notice>,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            data,
            notice: None,
            status_code: StatusCode::OK,
        }
    }

    /// 201 for a newly stored job, application or account
    pub fn created(data: T) -> Self {
        Self {
            status_code: StatusCode::CREATED,
            ..Self::success(data)
        }
    }

    pub fn with_notice(mut self, notice: Notice) -> Self {
        self.notice = Some(notice);
        self
    }

    /// Success toast
    pub fn saying(self, message: impl Into<String>) -> Self {
        self.with_notice(Notice::success(message))
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return ApiError::internal_server_error("Failed to serialize response data").into_response();
            }
        };

        let mut envelope = json!({
            "success": true,
            "data": data,
        });
        if let Some(notice) = self.notice {
            envelope["notice"] = json!(notice);
        }

        (self.status_code, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use serde_json::Value;

    async fn body_of(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn notice_rides_beside_data() {
        let response = ApiResponse::created(json!({ "id": 7 }))
            .saying("Application submitted successfully!")
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
        assert_eq!(
            body_of(response).await,
            json!({
                "success": true,
                "data": { "id": 7 },
                "notice": { "severity": "success", "message": "Application submitted successfully!" }
            })
        );
    }

    #[tokio::test]
    async fn reads_have_no_notice() {
        let body = body_of(ApiResponse::success(json!([])).into_response()).await;
        assert!(body.get("notice").is_none());
    }
}
