//! HTTP request handler
//!
//! The gate in front of the script engine: authenticate, read and decode
//! the body, run the script on a blocking worker, reply with its result.

use crate::encoding::url_decode;
use dust_auth::{parse_authorization, AuthError, AuthProvider};
use dust_core::response::responses;
use dust_core::{Body, Error, RequestContext, Result};
use dust_scripting::{ScriptError, ScriptExecutor};
use http::header::{AUTHORIZATION, CONTENT_TYPE};
use http::{HeaderMap, Request, Response};
use http_body_util::{BodyExt, LengthLimitError, Limited};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info_span, warn, Instrument, Span};

/// Default `WWW-Authenticate` realm
pub const DEFAULT_REALM: &str = "dustDB";

/// Default request body limit in bytes
pub const DEFAULT_MAX_BODY_SIZE: usize = 1024 * 1024;

const ENCODING_ERROR: &str = "invalid request encoding";
const BODY_TOO_LARGE: &str = "request body too large";

/// HTTP request handler
#[derive(Clone)]
pub struct RequestHandler {
    auth: Arc<dyn AuthProvider>,
    executor: Arc<dyn ScriptExecutor>,
    realm: Arc<str>,
    max_body_size: usize,
    request_count: Arc<AtomicUsize>,
}

impl std::fmt::Debug for RequestHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHandler")
            .field("realm", &self.realm)
            .field("max_body_size", &self.max_body_size)
            .field("request_count", &self.request_count)
            .finish_non_exhaustive()
    }
}

/// Counts a request as in flight until dropped
///
/// Moves into the blocking worker with the script, so a client that goes
/// away does not end the count while the script still writes to the store.
struct InFlight(Arc<AtomicUsize>);

impl InFlight {
    fn enter(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, Ordering::Relaxed);
        Self(Arc::clone(counter))
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::Relaxed);
    }
}

impl RequestHandler {
    /// Create a new request handler
    pub fn new(auth: Arc<dyn AuthProvider>, executor: Arc<dyn ScriptExecutor>) -> Self {
        Self {
            auth,
            executor,
            realm: Arc::from(DEFAULT_REALM),
            max_body_size: DEFAULT_MAX_BODY_SIZE,
            request_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Set the realm announced in authentication challenges
    pub fn with_realm(mut self, realm: &str) -> Self {
        self.realm = Arc::from(realm);
        self
    }

    /// Set the request body limit
    pub fn with_max_body_size(mut self, max_body_size: usize) -> Self {
        self.max_body_size = max_body_size;
        self
    }

    /// Share an in-flight request counter
    pub fn with_request_count(mut self, request_count: Arc<AtomicUsize>) -> Self {
        self.request_count = request_count;
        self
    }

    /// Number of requests currently being handled
    pub fn in_flight(&self) -> usize {
        self.request_count.load(Ordering::Relaxed)
    }

    /// Handle one request
    ///
    /// Any method and path is accepted; the body is the script.
    pub async fn handle<B>(&self, req: Request<B>) -> Result<Response<Body>>
    where
        B: http_body::Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let in_flight = InFlight::enter(&self.request_count);
        let ctx = RequestContext::new();
        let span = info_span!(
            "request",
            request_id = %ctx.request_id,
            method = %req.method(),
        );

        async move {
            match self.process(req, ctx, in_flight).await {
                Ok(response) => Ok(response),
                Err(err) => error_response(&err),
            }
        }
        .instrument(span)
        .await
    }

    async fn process<B>(
        &self,
        req: Request<B>,
        mut ctx: RequestContext,
        in_flight: InFlight,
    ) -> Result<Response<Body>>
    where
        B: http_body::Body,
        B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        let start = Instant::now();

        let credentials = match parse_authorization(req.headers().get(AUTHORIZATION)) {
            Ok(credentials) => credentials,
            Err(err) => return self.reject(err),
        };
        let username = match self.auth.authenticate(&credentials).await {
            Ok(username) => username,
            Err(err) => return self.reject(err),
        };
        ctx.authenticated(username);
        ctx.urlencoded = is_urlencoded(req.headers());

        let body = read_body(req.into_body(), self.max_body_size).await?;
        let script = decode_script(&body, ctx.urlencoded)?;

        debug!(
            user = ctx.username.as_deref().unwrap_or_default(),
            urlencoded = ctx.urlencoded,
            script_len = script.len(),
            "Executing script"
        );

        let result = self.execute(script, in_flight).await;

        debug!(
            result_len = result.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Script finished"
        );

        responses::ok(result)
    }

    /// Run the script off the async workers
    async fn execute(&self, script: String, in_flight: InFlight) -> String {
        let executor = Arc::clone(&self.executor);
        let span = Span::current();

        match tokio::task::spawn_blocking(move || {
            let _in_flight = in_flight;
            span.in_scope(|| executor.apply_script(&script))
        })
        .await
        {
            Ok(result) => result,
            Err(err) => {
                error!(error = %err, "Script worker failed");
                ScriptError::panic(err.to_string()).to_string()
            }
        }
    }

    fn reject(&self, err: AuthError) -> Result<Response<Body>> {
        match err {
            AuthError::MissingCredentials => {
                debug!("Authorization required");
                responses::challenge(&self.realm, err.to_string())
            }
            AuthError::MalformedCredentials => {
                warn!(reason = %err, "Request rejected");
                responses::bad_request(err.to_string())
            }
            AuthError::AccessDenied => {
                warn!(reason = %err, "Request rejected");
                responses::unauthorized(err.to_string())
            }
        }
    }
}

fn is_urlencoded(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .map(|value| {
            value
                .as_bytes()
                .windows(b"urlencoded".len())
                .any(|window| window == b"urlencoded")
        })
        .unwrap_or(false)
}

async fn read_body<B>(body: B, limit: usize) -> Result<Vec<u8>>
where
    B: http_body::Body,
    B::Error: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    match Limited::new(body, limit).collect().await {
        Ok(collected) => Ok(collected.to_bytes().to_vec()),
        Err(err) if err.downcast_ref::<LengthLimitError>().is_some() => {
            Err(Error::PayloadTooLarge { limit })
        }
        Err(err) => Err(Error::InvalidRequest(format!(
            "Failed to read request body: {err}"
        ))),
    }
}

fn decode_script(body: &[u8], urlencoded: bool) -> Result<String> {
    let script = if urlencoded {
        url_decode(body)
    } else {
        std::str::from_utf8(body).ok().map(str::to_string)
    };

    script.ok_or_else(|| Error::InvalidRequest(ENCODING_ERROR.to_string()))
}

/// Plain-text response for a failure that never reached the script engine
fn error_response(err: &Error) -> Result<Response<Body>> {
    match err {
        Error::PayloadTooLarge { limit } => {
            warn!(limit, "Request body too large");
            responses::payload_too_large(BODY_TOO_LARGE)
        }
        Error::InvalidRequest(message) => {
            warn!(error = %message, "Invalid request");
            responses::bad_request(ENCODING_ERROR)
        }
        other => {
            error!(error = %other, "Request handler error");
            responses::internal_error("internal error")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_is_urlencoded() {
        let mut headers = HeaderMap::new();
        assert!(!is_urlencoded(&headers));

        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));
        assert!(!is_urlencoded(&headers));

        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/x-www-form-urlencoded; charset=utf-8"),
        );
        assert!(is_urlencoded(&headers));
    }

    #[test]
    fn test_decode_script() {
        assert_eq!(decode_script(b"a+b", false).unwrap(), "a+b");
        assert_eq!(decode_script(b"a+b", true).unwrap(), "a b");
        assert!(decode_script(b"%G0", true).is_err());
        assert!(decode_script(&[0xff, 0xfe], false).is_err());
    }

    #[test]
    fn test_error_response() {
        let response = error_response(&Error::PayloadTooLarge { limit: 8 }).unwrap();
        assert_eq!(response.status(), http::StatusCode::PAYLOAD_TOO_LARGE);

        let response = error_response(&Error::InvalidRequest("x".to_string())).unwrap();
        assert_eq!(response.status(), http::StatusCode::BAD_REQUEST);

        let response = error_response(&Error::Runtime("x".to_string())).unwrap();
        assert_eq!(response.status(), http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_in_flight_guard() {
        let counter = Arc::new(AtomicUsize::new(0));
        {
            let _a = InFlight::enter(&counter);
            let _b = InFlight::enter(&counter);
            assert_eq!(counter.load(Ordering::Relaxed), 2);
        }
        assert_eq!(counter.load(Ordering::Relaxed), 0);
    }
}
