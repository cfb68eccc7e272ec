//! Error handling for vizchat.
//!
//! - **Error Categories**: high-level classification for handling decisions
//! - **Stream Errors**: why a chat stream ended in failure
//! - **Unified Error Type**: `VizError` consolidates transport, API and
//!   stream errors
//!
//! | Category | Description | Retryable |
//! |----------|-------------|-----------|
//! | Network | Connection refused, reset, timeout | Yes |
//! | Server | 5xx responses, backend `error` events | Yes |
//! | Client | Malformed data | No |
//! | User | Cancelled, 4xx responses | No |
//! | Configuration | Bad base URL | No |

mod category;
mod stream;
mod viz_error;

pub use category::ErrorCategory;
pub use stream::{StreamError, CANCELLED, ENDED_UNEXPECTEDLY};
pub use viz_error::VizError;
