//! Request extractors shared by the pricing handlers.

use axum::{
    async_trait,
    extract::{FromRequest, FromRequestParts, Request},
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use uuid::Uuid;
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::AppError;

/// Header the upstream auth layer sets to the acting provider's id
pub const PROVIDER_HEADER: &str = "x-provider-id";

/// The provider a request acts on behalf of
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for ProviderId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(PROVIDER_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .map(ProviderId)
            .ok_or(AppError::Unauthorized)
    }
}

/// Like `axum::Json<T>`, but also runs `validator::Validate::validate()`.
///
/// Malformed JSON is rejected with 400, failed validation with 422.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| AppError::BadRequest(rejection.body_text()))?;

        value.validate().map_err(|errors| {
            let messages = validation_messages(&errors);
            AppError::Validation {
                message: if messages.is_empty() {
                    "Validation failed".to_string()
                } else {
                    messages.join("; ")
                },
                errors: messages,
            }
        })?;

        Ok(ValidatedJson(value))
    }
}

/// Flatten nested validation errors into `path: message` strings
pub fn validation_messages(errors: &ValidationErrors) -> Vec<String> {
    let mut messages = Vec::new();
    collect_messages(errors, "", &mut messages);
    messages.sort();
    messages
}

fn collect_messages(errors: &ValidationErrors, prefix: &str, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = if field.to_string() == "__all__" {
            prefix.trim_end_matches('.').to_string()
        } else {
            format!("{prefix}{field}")
        };
        match kind {
            ValidationErrorsKind::Field(errs) => {
                for err in errs {
                    let msg = err
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| err.code.to_string());
                    if path.is_empty() {
                        out.push(msg);
                    } else {
                        out.push(format!("{path}: {msg}"));
                    }
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                collect_messages(nested, &format!("{path}."), out);
            }
            ValidationErrorsKind::List(items) => {
                for (index, nested) in items {
                    collect_messages(nested, &format!("{path}[{index}]."), out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use axum::response::IntoResponse;
    use axum::routing::post;
    use axum::Router;
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Debug, Deserialize, Validate)]
    struct TestBody {
        #[validate(length(min = 1, max = 10, message = "name is required"))]
        name: String,
        #[validate(range(min = 1, max = 100))]
        seats: u32,
    }

    async fn handler(
        provider: ProviderId,
        ValidatedJson(body): ValidatedJson<TestBody>,
    ) -> impl IntoResponse {
        format!("{} {}", provider.0, body.name)
    }

    fn app() -> Router {
        Router::new().route("/test", post(handler))
    }

    fn request(provider: Option<&str>, body: &str) -> Request<Body> {
        let mut builder = Request::builder()
            .method("POST")
            .uri("/test")
            .header("content-type", "application/json");
        if let Some(provider) = provider {
            builder = builder.header(PROVIDER_HEADER, provider);
        }
        builder.body(Body::from(body.to_string())).unwrap()
    }

    #[tokio::test]
    async fn test_valid_request() {
        let provider = Uuid::new_v4().to_string();
        let resp = app()
            .oneshot(request(Some(&provider), r#"{"name": "Van", "seats": 8}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_missing_provider_is_unauthorized() {
        let resp = app()
            .oneshot(request(None, r#"{"name": "Van", "seats": 8}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

        let resp = app()
            .oneshot(request(Some("not-a-uuid"), r#"{"name": "Van", "seats": 8}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let provider = Uuid::new_v4().to_string();
        let resp = app()
            .oneshot(request(Some(&provider), "not json"))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_validation_failure_is_unprocessable() {
        let provider = Uuid::new_v4().to_string();
        let resp = app()
            .oneshot(request(Some(&provider), r#"{"name": "", "seats": 0}"#))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_validation_messages_include_field_names() {
        let body = TestBody {
            name: String::new(),
            seats: 5,
        };
        let errors = body.validate().unwrap_err();
        assert_eq!(validation_messages(&errors), vec!["name: name is required".to_string()]);
    }
}
