//! Response envelope, error mapping and request extractors.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::AppState;
use crate::auth;
use crate::error::{Error, ErrorKind};
use crate::model::User;

/// Every response body: `{data?, error?, message?}`.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

pub fn data<T: Serialize>(value: T) -> Json<Envelope<T>> {
    Json(Envelope {
        data: Some(value),
        error: None,
        message: None,
    })
}

pub fn created<T: Serialize>(value: T) -> (StatusCode, Json<Envelope<T>>) {
    (StatusCode::CREATED, data(value))
}

pub fn message(text: impl Into<String>) -> Json<Envelope<()>> {
    Json(Envelope {
        data: None,
        error: None,
        message: Some(text.into()),
    })
}

pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        Self(e)
    }
}

pub fn status_of(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::Validation => StatusCode::BAD_REQUEST,
        ErrorKind::Authentication => StatusCode::UNAUTHORIZED,
        ErrorKind::Conflict => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let kind = self.0.kind();
        let message = match kind {
            ErrorKind::Internal => {
                error!("request failed: {}", self.0);
                "internal error".to_string()
            }
            _ => self.0.to_string(),
        };
        let body = Envelope::<()> {
            data: None,
            error: Some(kind.to_string()),
            message: Some(message),
        };
        (status_of(kind), Json(body)).into_response()
    }
}

/// A JSON body whose rejections use the envelope.
pub struct Body<T>(pub T);

impl<S, T> FromRequest<S> for Body<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|e: JsonRejection| Error::Validation(e.body_text()))?;
        Ok(Body(value))
    }
}

/// A query string whose rejections use the envelope.
pub struct Params<T>(pub T);

impl<S, T> FromRequestParts<S> for Params<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| Error::Validation(e.body_text()))?;
        Ok(Params(value))
    }
}

/// The user named by the request's bearer token.
pub struct AuthUser(pub User);

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(auth::parse_bearer)
            .ok_or_else(|| Error::Authentication("missing bearer token".into()))?
            .to_string();
        let user = state
            .with_store(move |conn| auth::authenticate(conn, &token))
            .await?;
        Ok(AuthUser(user))
    }
}
