//! Middleware for observability and response post-processing.
//!
//! This module provides:
//! - Request logging with latency tracking
//! - The 204 Content-Length rule

pub mod content_length;
pub mod logging;

pub use content_length::normalize_no_content;
pub use logging::request_logging;
