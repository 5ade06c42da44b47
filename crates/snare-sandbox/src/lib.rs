pub mod collector;
pub mod predicate;
pub mod provider;

pub use collector::{CollectionError, Collector};
pub use predicate::{truthy, Predicate, PredicateError};
pub use provider::{ProviderError, StateProvider};
