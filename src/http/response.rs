//! Response shapes shared by the router and its collaborators.
//!
//! # Responsibilities
//! - Structured 404 for requests no route matched
//! - Generic `{code, message, error}` envelope for failed calls
//! - JSON body extraction that reports decode errors as 400
//!
//! # Design Decisions
//! - The fallback is stateless: it only describes the request
//! - A bad body never touches router or server state

use axum::{
    extract::{FromRequest, Request},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};

/// Body of the 404 returned when no route matches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotFound {
    #[serde(rename = "Method")]
    pub method: String,
    #[serde(rename = "Path")]
    pub path: String,
    pub error: String,
}

/// Fallback handler output for an unmatched request.
pub fn not_found(method: &Method, path: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(NotFound {
            method: method.to_string(),
            path: path.to_string(),
            error: "router not found".to_string(),
        }),
    )
        .into_response()
}

/// Error envelope for failed calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(default, skip_serializing_if = "is_zero")]
    pub code: u16,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,
}

fn is_zero(code: &u16) -> bool {
    *code == 0
}

impl ErrorResponse {
    pub fn new(status: StatusCode, message: impl Into<String>, error: impl ToString) -> Self {
        Self {
            code: status.as_u16(),
            message: message.into(),
            error: error.to_string(),
        }
    }

    pub fn bad_request(message: impl Into<String>, error: impl ToString) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message, error)
    }

    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }
}

impl IntoResponse for ErrorResponse {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}

/// `Json<T>` whose rejection is a 400 [`ErrorResponse`].
#[derive(Debug, Clone)]
pub struct JsonBody<T>(pub T);

impl<T, S> FromRequest<S> for JsonBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ErrorResponse;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(JsonBody(value)),
            Err(rejection) => {
                tracing::warn!(error = %rejection.body_text(), "Unable to read request body");
                Err(ErrorResponse::bad_request(
                    "unable to read request body",
                    rejection.body_text(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http, routing::post, Router};
    use tower::ServiceExt;

    #[derive(Deserialize)]
    struct Args {
        nodes: Vec<String>,
    }

    async fn read_json<T: DeserializeOwned>(res: Response) -> T {
        let bytes = axum::body::to_bytes(res.into_body(), 64 * 1024).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn not_found_shape() {
        let res = not_found(&Method::DELETE, "/nope");
        assert_eq!(res.status(), StatusCode::NOT_FOUND);

        let body: serde_json::Value = read_json(res).await;
        assert_eq!(
            body,
            serde_json::json!({"Method": "DELETE", "Path": "/nope", "error": "router not found"})
        );
    }

    #[test]
    fn empty_fields_are_omitted() {
        let body = serde_json::to_value(ErrorResponse {
            code: 0,
            message: String::new(),
            error: "boom".into(),
        })
        .unwrap();
        assert_eq!(body, serde_json::json!({"error": "boom"}));
    }

    #[tokio::test]
    async fn malformed_body_is_bad_request() {
        let app = Router::new().route(
            "/scheduler/filter",
            post(|JsonBody(args): JsonBody<Args>| async move { args.nodes.len().to_string() }),
        );

        let res = app
            .clone()
            .oneshot(
                http::Request::builder()
                    .method("POST")
                    .uri("/scheduler/filter")
                    .header("content-type", "application/json")
                    .body(Body::from("{\"nodes\": 3}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let err: ErrorResponse = read_json(res).await;
        assert_eq!(err.code, 400);
        assert_eq!(err.message, "unable to read request body");
        assert!(!err.error.is_empty());

        let res = app
            .oneshot(
                http::Request::builder()
                    .method("POST")
                    .uri("/scheduler/filter")
                    .header("content-type", "application/json")
                    .body(Body::from("{\"nodes\": [\"a\", \"b\"]}"))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }
}
