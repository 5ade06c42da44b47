use std::env;
use std::time::Duration;

/// Fallback endpoint when neither SNARE_RPC_URL nor INFURA_API_KEY is
/// set.
pub const DEFAULT_RPC_URL: &str = "https://ethereum-rpc.publicnode.com";

/// Where the HTTP provider points and how long it waits per request.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub url: String,
    pub request_timeout: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_RPC_URL.to_string(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl ProviderConfig {
    /// Resolve from the environment. SNARE_RPC_URL wins; otherwise an
    /// INFURA_API_KEY builds the Infura mainnet URL; otherwise the
    /// public default endpoint. SNARE_RPC_TIMEOUT_SECS overrides the
    /// request timeout.
    pub fn from_env() -> Self {
        let url = env::var("SNARE_RPC_URL")
            .ok()
            .filter(|u| !u.is_empty())
            .or_else(|| {
                env::var("INFURA_API_KEY")
                    .ok()
                    .filter(|k| !k.is_empty())
                    .map(|k| format!("https://mainnet.infura.io/v3/{k}"))
            })
            .unwrap_or_else(|| DEFAULT_RPC_URL.to_string());
        let request_timeout = env::var("SNARE_RPC_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(10));
        Self { url, request_timeout }
    }
}
