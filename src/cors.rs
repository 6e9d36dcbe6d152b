//! Cross-origin resource sharing policy for browser clients.

use axum::http::{
    HeaderValue, Method,
    header::{ACCEPT, AUTHORIZATION, CONTENT_LENGTH, CONTENT_TYPE, ORIGIN},
};
use tower_http::cors::CorsLayer;

use crate::Error;

/// The origin a browser front end is served from when running locally.
pub const DEFAULT_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// The CORS settings for the API.
#[derive(Debug, Clone, PartialEq)]
pub struct CorsConfig {
    allowed_origin: HeaderValue,
}

impl CorsConfig {
    /// Create a CORS config that allows requests from `allowed_origin`.
    ///
    /// # Errors
    ///
    /// Returns [Error::InvalidOrigin] if `allowed_origin` cannot be used as a header value.
    pub fn new(allowed_origin: &str) -> Result<Self, Error> {
        let allowed_origin = HeaderValue::from_str(allowed_origin)
            .map_err(|_| Error::InvalidOrigin(allowed_origin.to_owned()))?;

        Ok(Self { allowed_origin })
    }

    /// Build the middleware layer that applies this policy.
    ///
    /// Credentials are allowed, so the origin, methods and headers are listed
    /// explicitly rather than using wildcards.
    pub fn into_layer(self) -> CorsLayer {
        CorsLayer::new()
            .allow_origin(self.allowed_origin)
            .allow_methods([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ])
            .allow_headers([ORIGIN, CONTENT_TYPE, ACCEPT, AUTHORIZATION])
            .allow_credentials(true)
            .expose_headers([CONTENT_LENGTH])
    }
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origin: HeaderValue::from_static(DEFAULT_ALLOWED_ORIGIN),
        }
    }
}
