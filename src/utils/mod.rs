//! Utility functions and helpers.

pub mod clock;
pub mod http;

pub use clock::{Clock, SystemClock};
pub use http::{ApiResponse, RateLimit, ReqwestTransport, Transport};
