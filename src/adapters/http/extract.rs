//! Request extractors shared by the booking and payment routes.

use std::convert::Infallible;

use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::domain::booking::BookingError;
use crate::domain::payment::GatewayKind;

use super::error::ApiError;

/// Client address as reported by the fronting proxy.
///
/// Read from `X-Forwarded-For` (first hop) or `X-Real-IP`. Absent when
/// neither header is set.
#[derive(Debug, Clone, Default)]
pub struct ClientIp(pub Option<String>);

#[async_trait]
impl<S> FromRequestParts<S> for ClientIp
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let forwarded = parts
            .headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());
        let real_ip = parts
            .headers
            .get("x-real-ip")
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        Ok(ClientIp(forwarded.or(real_ip).map(str::to_string)))
    }
}

/// Parses the `{gateway}` path segment.
pub fn parse_gateway(raw: &str) -> Result<GatewayKind, ApiError> {
    GatewayKind::parse(raw).ok_or_else(|| {
        ApiError(BookingError::validation(
            "gateway",
            format!("Unsupported payment gateway '{}'", raw),
        ))
    })
}
