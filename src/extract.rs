//! axum integration: a request-scoped logger extractor.

use std::convert::Infallible;
use std::ops::Deref;
use std::sync::Arc;

use axum::async_trait;
use axum::extract::{FromRef, FromRequestParts};
use axum::http::request::Parts;

use crate::config::LogConfig;
use crate::logger::Logger;

/// A [`Logger`] carrying the trace id of the current request.
///
/// Requires `Arc<LogConfig>` to be reachable from the router state.
#[derive(Debug)]
pub struct RequestLogger(pub Logger);

impl Deref for RequestLogger {
    type Target = Logger;

    fn deref(&self) -> &Logger {
        &self.0
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestLogger
where
    Arc<LogConfig>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let config = Arc::<LogConfig>::from_ref(state);
        Ok(RequestLogger(Logger::for_request(&config, &parts.headers)))
    }
}
