pub mod compile;
pub mod limits;
pub mod validate;

pub use compile::{
    compile_collector, compile_predicate, compile_trap, CompileError, CompiledCollector,
    CompiledPredicate, CompiledTrap,
};
pub use limits::CompileLimits;
