pub mod config;
pub mod cycle;
pub mod log;
pub mod mcp;
pub mod outcome;
pub mod presets;
pub mod session;

pub use config::SessionConfig;
pub use cycle::{evaluate_snapshot, run_cycle};
pub use log::ObservationLog;
pub use outcome::{ExecutionOutcome, OutcomeStatus};
pub use presets::{presets, snapshot_presets, SnapshotPreset, TrapPreset};
pub use session::TrapSession;
