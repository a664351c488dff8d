//! Actor Identity
//!
//! Authentication plumbing is delegated to the fronting gateway; the server
//! only requires that every request carries an explicit actor identity,
//! which is then passed as a capability parameter into the ledger. No
//! ambient "current user" lookups exist anywhere below the API layer.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use shared::models::{Actor, Role};

use crate::utils::AppError;

const ACTOR_ID_HEADER: &str = "x-actor-id";
const ACTOR_ROLE_HEADER: &str = "x-actor-role";

/// Extracts the acting user from `x-actor-id` / `x-actor-role` headers.
#[derive(Debug, Clone, Copy)]
pub struct CurrentActor(pub Actor);

impl<S> FromRequestParts<S> for CurrentActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let id = header_value(parts, ACTOR_ID_HEADER)?
            .parse::<i64>()
            .map_err(|_| AppError::Validation(format!("{ACTOR_ID_HEADER} must be an integer")))?;
        let role = header_value(parts, ACTOR_ROLE_HEADER)?
            .parse::<Role>()
            .map_err(AppError::Validation)?;
        Ok(CurrentActor(Actor { id, role }))
    }
}

fn header_value<'a>(parts: &'a Parts, name: &str) -> Result<&'a str, AppError> {
    parts
        .headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::Forbidden(format!("Missing {name} header")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract(id: Option<&str>, role: Option<&str>) -> Result<CurrentActor, AppError> {
        let mut builder = Request::builder().uri("/");
        if let Some(id) = id {
            builder = builder.header(ACTOR_ID_HEADER, id);
        }
        if let Some(role) = role {
            builder = builder.header(ACTOR_ROLE_HEADER, role);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        CurrentActor::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_valid_headers() {
        let CurrentActor(actor) = extract(Some("7"), Some("COACH")).await.unwrap();
        assert_eq!(actor.id, 7);
        assert_eq!(actor.role, Role::Coach);
        // Case-insensitive role value
        let CurrentActor(actor) = extract(Some("7"), Some("admin")).await.unwrap();
        assert_eq!(actor.role, Role::Admin);
    }

    #[tokio::test]
    async fn test_missing_or_malformed_headers() {
        assert!(matches!(
            extract(None, Some("COACH")).await.unwrap_err(),
            AppError::Forbidden(_)
        ));
        assert!(matches!(
            extract(Some("7"), None).await.unwrap_err(),
            AppError::Forbidden(_)
        ));
        assert!(matches!(
            extract(Some("abc"), Some("COACH")).await.unwrap_err(),
            AppError::Validation(_)
        ));
        assert!(matches!(
            extract(Some("7"), Some("JANITOR")).await.unwrap_err(),
            AppError::Validation(_)
        ));
    }
}
