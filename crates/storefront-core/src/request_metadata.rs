use std::convert::Infallible;
use std::net::SocketAddr;

use axum::extract::{ConnectInfo, FromRequestParts};
use axum::http::request::Parts;
use axum::http::HeaderMap;

/// Geo hints set by the CDN in front of the storefront
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoHeaders {
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
}

impl GeoHeaders {
    pub fn from_headers(headers: &HeaderMap) -> Self {
        Self {
            country: ["cf-ipcountry", "x-vercel-ip-country"]
                .iter()
                .filter_map(|name| header_value(headers, name))
                .find(|c| c != "XX"),
            region: header_value(headers, "x-vercel-ip-country-region"),
            city: header_value(headers, "x-vercel-ip-city"),
        }
    }
}

/// Caller details needed by the tracking pipeline
#[derive(Debug, Clone)]
pub struct RequestMetadata {
    pub ip_address: String,
    pub user_agent: String,
    pub geo: GeoHeaders,
}

impl RequestMetadata {
    /// Resolve the client address: `x-forwarded-for` (first hop), `x-real-ip`,
    /// then the socket peer.
    pub fn from_parts(headers: &HeaderMap, peer: Option<SocketAddr>) -> Self {
        let ip_address = headers
            .get("x-forwarded-for")
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split(',').next())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .or_else(|| header_value(headers, "x-real-ip"))
            .or_else(|| peer.map(|addr| addr.ip().to_string()))
            .unwrap_or_else(|| "unknown".to_string());

        let user_agent = headers
            .get("user-agent")
            .and_then(|h| h.to_str().ok())
            .unwrap_or("unknown")
            .to_string();

        Self {
            ip_address,
            user_agent,
            geo: GeoHeaders::from_headers(headers),
        }
    }
}

impl<S> FromRequestParts<S> for RequestMetadata
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let peer = parts
            .extensions
            .get::<ConnectInfo<SocketAddr>>()
            .map(|ConnectInfo(addr)| *addr);
        Ok(Self::from_parts(&parts.headers, peer))
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|h| h.to_str().ok())
        .map(|raw| {
            urlencoding::decode(raw)
                .map(|s| s.into_owned())
                .unwrap_or_else(|_| raw.to_string())
        })
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}
