use snare_ir::collect::CollectStep;
use snare_ir::expr::Expr;
use snare_ir::parse::{parse_collector, parse_predicate, ParseError};
use snare_ir::types::TrapDefinition;

use crate::limits::CompileLimits;
use crate::validate::{check_source_size, validate_collector, validate_predicate, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum CompileError {
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("Validation errors: {}", .0.iter().map(|e| e.to_string()).collect::<Vec<_>>().join("; "))]
    Validation(Vec<ValidationError>),
}

/// An executable collector plan. Immutable once compiled.
#[derive(Debug, Clone)]
pub struct CompiledCollector {
    pub fields: Vec<(String, CollectStep)>,
}

/// An executable predicate plan. Immutable once compiled.
#[derive(Debug, Clone)]
pub struct CompiledPredicate {
    pub expr: Expr,
}

/// Both halves of a trap definition, compiled together.
#[derive(Debug, Clone)]
pub struct CompiledTrap {
    pub collector: CompiledCollector,
    pub predicate: CompiledPredicate,
}

pub fn compile_collector(source: &str) -> Result<CompiledCollector, CompileError> {
    compile_collector_with(source, &CompileLimits::default())
}

pub fn compile_collector_with(
    source: &str,
    limits: &CompileLimits,
) -> Result<CompiledCollector, CompileError> {
    // 1. Size gate
    check_source_size(source, limits).map_err(|e| CompileError::Validation(vec![e]))?;

    // 2. Parse
    let doc = parse_collector(source)?;

    // 3. Validate
    validate_collector(&doc, limits).map_err(CompileError::Validation)?;

    Ok(CompiledCollector { fields: doc.fields })
}

pub fn compile_predicate(source: &str) -> Result<CompiledPredicate, CompileError> {
    compile_predicate_with(source, &CompileLimits::default())
}

pub fn compile_predicate_with(
    source: &str,
    limits: &CompileLimits,
) -> Result<CompiledPredicate, CompileError> {
    // 1. Size gate
    check_source_size(source, limits).map_err(|e| CompileError::Validation(vec![e]))?;

    // 2. Parse
    let doc = parse_predicate(source)?;

    // 3. Validate
    validate_predicate(&doc, limits).map_err(CompileError::Validation)?;

    Ok(CompiledPredicate { expr: doc.should_respond })
}

/// Compile both sources of a definition. Fails on the first bad half;
/// the collector is compiled first, matching execution order.
pub fn compile_trap(definition: &TrapDefinition) -> Result<CompiledTrap, CompileError> {
    let collector = compile_collector(&definition.collector_source)?;
    let predicate = compile_predicate(&definition.predicate_source)?;
    Ok(CompiledTrap { collector, predicate })
}
