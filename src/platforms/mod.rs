//! Platform clients
//!
//! One client per supported platform, plus the shared HTTP plumbing. The
//! constructor table fixes the declaration order used for reporting.

pub mod devto;
pub mod hashnode;
pub mod http;
pub mod medium;

pub use devto::DevtoClient;
pub use hashnode::{HashnodeClient, ResolvedTag};
pub use http::ApiClient;
pub use medium::MediumClient;

use crate::core::error::PublishError;
use crate::core::traits::PlatformClient;
use std::sync::Arc;
use std::time::Duration;

/// Build the clients for all supported platforms, in declaration order
pub fn default_clients(
    timeout: Duration,
) -> Result<Vec<Arc<dyn PlatformClient>>, PublishError> {
    Ok(vec![
        Arc::new(MediumClient::new(timeout)?) as Arc<dyn PlatformClient>,
        Arc::new(DevtoClient::new(timeout)?),
        Arc::new(HashnodeClient::new(timeout)?),
    ])
}
