//! HTTP middleware stack.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layer (capture errors)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (mobile and web clients)
//! 5. Rate limiting on passcode endpoints (governor)

pub mod rate_limit;
pub mod request_id;

pub use rate_limit::{ClientIpKeyExtractor, RateLimiterLayer, passcode_rate_limiter};
pub use request_id::{REQUEST_ID_HEADER, request_id_middleware};
