pub mod collect;
pub mod expr;
pub mod parse;
pub mod types;

pub use parse::{parse_collector, parse_predicate, ParseError};
pub use types::{CollectorDoc, PredicateDoc, TrapDefinition, TrapState};
