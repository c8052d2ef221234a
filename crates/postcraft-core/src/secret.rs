//! Secret management service trait.

use crate::config::SecretConfig;
use crate::error::Result;

/// Loads API keys from secure storage.
///
/// Implementations must never log secrets or put them in error messages.
#[async_trait::async_trait]
pub trait SecretService: Send + Sync {
    async fn load_secrets(&self) -> Result<SecretConfig>;
}
