// ABOUTME: HTTP middleware for request tracing and cross-origin access
// ABOUTME: Provides request span creation, request id propagation and CORS configuration

pub mod cors;
pub mod tracing;

// CORS configuration
pub use cors::setup_cors;

// Request tracing
pub use self::tracing::{make_request_span, propagate_request_id, request_id, REQUEST_ID_HEADER};
