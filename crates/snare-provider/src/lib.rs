pub mod config;
pub mod fixture;
pub mod http;

pub use config::ProviderConfig;
pub use fixture::StaticProvider;
pub use http::HttpProvider;
