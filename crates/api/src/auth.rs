//! Customer identity forwarded by the upstream authentication layer.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;
use common::CustomerId;
use serde::Deserialize;

/// Header carrying the authenticated user as JSON.
pub const AUTHENTICATION_INFO_HEADER: &str = "x-authentication-info";

#[derive(Debug, Deserialize)]
struct AuthenticationInfo {
    user_id: String,
}

/// The customer making the request.
///
/// Extraction never fails. A missing or malformed header yields an empty
/// customer ID, which the cart rejects as invalid input.
#[derive(Debug, Clone)]
pub struct Customer(pub CustomerId);

impl Customer {
    fn from_headers(headers: &HeaderMap) -> Self {
        let user_id = headers
            .get(AUTHENTICATION_INFO_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|raw| match serde_json::from_str::<AuthenticationInfo>(raw) {
                Ok(info) => Some(info.user_id),
                Err(e) => {
                    tracing::debug!(error = %e, "malformed authentication header");
                    None
                }
            })
            .unwrap_or_default();

        Customer(CustomerId::new(user_id))
    }
}

impl<S> FromRequestParts<S> for Customer
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    fn customer_for(value: Option<&'static str>) -> CustomerId {
        let mut headers = HeaderMap::new();
        if let Some(value) = value {
            headers.insert(
                AUTHENTICATION_INFO_HEADER,
                HeaderValue::from_static(value),
            );
        }
        Customer::from_headers(&headers).0
    }

    #[test]
    fn reads_user_id() {
        assert_eq!(customer_for(Some(r#"{"user_id":"c1"}"#)).as_str(), "c1");
    }

    #[test]
    fn ignores_extra_fields() {
        let id = customer_for(Some(r#"{"user_id":"c2","email":"a@b.c"}"#));
        assert_eq!(id.as_str(), "c2");
    }

    #[test]
    fn missing_or_malformed_header_is_empty() {
        assert!(customer_for(None).is_empty());
        assert!(customer_for(Some("not json")).is_empty());
        assert!(customer_for(Some(r#"{"id":"c1"}"#)).is_empty());
    }
}
