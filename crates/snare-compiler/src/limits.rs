//! Compile-time resource limits.
//!
//! Caps what a single trap definition may ask of the compiler: raw
//! source length, collector step count, nesting depth, scale
//! magnitude. Oversized or over-nested sources are rejected before
//! anything executes.

use serde::{Deserialize, Serialize};

/// Limits applied when compiling one source document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompileLimits {
    /// Maximum source length in bytes.
    pub max_source_bytes: usize,
    /// Maximum total collector steps, nested steps included.
    pub max_collector_steps: usize,
    /// Maximum nesting depth of expressions and steps.
    pub max_depth: usize,
    /// Maximum decimals accepted by a scale step.
    pub max_scale_decimals: u32,
}

impl Default for CompileLimits {
    fn default() -> Self {
        Self {
            max_source_bytes: 64 * 1024, // 64 KB
            max_collector_steps: 64,
            max_depth: 16,
            max_scale_decimals: 36,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits_are_permissive_for_preset_sized_sources() {
        let limits = CompileLimits::default();
        assert!(limits.max_source_bytes >= 4 * 1024);
        assert!(limits.max_depth >= 8);
        assert!(limits.max_scale_decimals >= 18);
    }
}
