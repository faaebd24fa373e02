use api_types::error::ErrorBody;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use engine::{EngineError, ErrorKind};

pub use server::{ServerState, router, run_with_listener};

mod catalog;
mod entitlements;
mod ledger;
mod members;
mod payments;
mod server;

/// `Json` body extractor whose rejection is a [`ServerError`], so malformed
/// bodies get the same `{kind, errors}` shape as engine errors.
pub(crate) struct Payload<T>(pub T);

impl<S, T> FromRequest<S> for Payload<T>
where
    Json<T>: FromRequest<S, Rejection = JsonRejection>,
    S: Send + Sync,
{
    type Rejection = ServerError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await?;
        Ok(Self(value))
    }
}

pub enum ServerError {
    Engine(EngineError),
    Generic(String),
}

fn status_for_engine_error(err: &EngineError) -> StatusCode {
    match err.kind() {
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::DuplicateLink | ErrorKind::DuplicateEntry | ErrorKind::InUse => {
            StatusCode::CONFLICT
        }
        ErrorKind::Database => StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::InvalidRange
        | ErrorKind::InvalidAmount
        | ErrorKind::InvalidField
        | ErrorKind::MissingField
        | ErrorKind::Inactive
        | ErrorKind::AlreadySettled
        | ErrorKind::ExceedsBalance
        | ErrorKind::InsufficientFunds => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

fn body_for_engine_error(err: EngineError) -> ErrorBody {
    let kind = err.kind().as_str().to_string();
    match err {
        EngineError::Database(db_err) => {
            tracing::error!("database error: {db_err}");
            ErrorBody {
                kind,
                errors: vec!["internal server error".to_string()],
            }
        }
        other => ErrorBody {
            kind,
            errors: other.messages(),
        },
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            ServerError::Engine(err) => (status_for_engine_error(&err), body_for_engine_error(err)),
            ServerError::Generic(err) => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    kind: "bad_request".to_string(),
                    errors: vec![err],
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ServerError {
    fn from(value: JsonRejection) -> Self {
        Self::Generic(value.body_text())
    }
}

impl From<EngineError> for ServerError {
    fn from(value: EngineError) -> Self {
        Self::Engine(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use engine::Money;

    #[test]
    fn engine_not_found_maps_to_404() {
        let res = ServerError::from(EngineError::NotFound("member".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn engine_duplicates_map_to_409() {
        let res =
            ServerError::from(EngineError::DuplicateLink("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
        let res = ServerError::from(EngineError::InUse("x".to_string())).into_response();
        assert_eq!(res.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn engine_validation_maps_to_422() {
        let res = ServerError::from(EngineError::InsufficientFunds {
            available: Money::new(1000),
            requested: Money::new(1500),
            shortfall: Money::new(500),
        })
        .into_response();
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn rejected_list_uses_first_violation() {
        let err = EngineError::Rejected(vec![
            EngineError::NotFound("due".to_string()),
            EngineError::InvalidAmount("-1".to_string()),
        ]);
        assert_eq!(status_for_engine_error(&err), StatusCode::NOT_FOUND);
        let body = body_for_engine_error(err);
        assert_eq!(body.kind, "not_found");
        assert_eq!(body.errors.len(), 2);
    }

    #[test]
    fn generic_maps_to_400() {
        let res = ServerError::Generic("bad".to_string()).into_response();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    }
}
