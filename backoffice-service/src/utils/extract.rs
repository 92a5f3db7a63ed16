//! Extractors that turn axum rejections into the JSON error envelope.
use axum::{
    async_trait,
    extract::{
        rejection::{JsonRejection, PathRejection, QueryRejection},
        FromRequest, FromRequestParts, Path, Query, Request,
    },
    http::request::Parts,
    Json,
};
use serde::de::DeserializeOwned;
use service_core::error::AppError;
use validator::Validate;

/// JSON body that has passed `validator` checks.
pub struct ValidatedJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate + 'static,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| {
                AppError::BadRequest(anyhow::anyhow!("Invalid request body: {}", e.body_text()))
            })?;

        value.validate()?;

        Ok(ValidatedJson(value))
    }
}

pub struct ApiQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| {
                AppError::BadRequest(anyhow::anyhow!("Invalid query string: {}", e.body_text()))
            })?;
        Ok(ApiQuery(value))
    }
}

/// Query string that has passed `validator` checks.
pub struct ValidatedQuery<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let ApiQuery(value) = ApiQuery::<T>::from_request_parts(parts, state).await?;
        value.validate()?;
        Ok(ValidatedQuery(value))
    }
}

pub struct ApiPath<T>(pub T);

#[async_trait]
impl<T, S> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: PathRejection| {
                AppError::BadRequest(anyhow::anyhow!("Invalid path parameter: {}", e.body_text()))
            })?;
        Ok(ApiPath(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::StatusCode, routing::get, routing::post, Router};
    use serde::Deserialize;
    use tower::ServiceExt;

    #[derive(Deserialize, Validate)]
    struct Named {
        #[serde(default)]
        #[validate(length(min = 1, message = "name is required"))]
        name: String,
    }

    fn app() -> Router {
        Router::new()
            .route(
                "/named",
                post(|ValidatedJson(body): ValidatedJson<Named>| async move { body.name }),
            )
            .route(
                "/items/:id",
                get(|ApiPath(id): ApiPath<i32>| async move { id.to_string() }),
            )
    }

    async fn status_of(req: axum::http::Request<Body>) -> StatusCode {
        app().oneshot(req).await.unwrap().status()
    }

    #[tokio::test]
    async fn missing_field_is_a_bad_request() {
        let req = axum::http::Request::post("/named")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        assert_eq!(status_of(req).await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn malformed_json_is_a_bad_request() {
        let req = axum::http::Request::post("/named")
            .header("content-type", "application/json")
            .body(Body::from("{"))
            .unwrap();
        assert_eq!(status_of(req).await, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn non_integer_id_is_a_bad_request() {
        let req = axum::http::Request::get("/items/abc")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(req).await, StatusCode::BAD_REQUEST);

        let ok = axum::http::Request::get("/items/7")
            .body(Body::empty())
            .unwrap();
        assert_eq!(status_of(ok).await, StatusCode::OK);
    }
}
