//! Simulated multi-agent analysis progress
//!
//! The simulator is stateless: callers hold the [`ProgressSnapshot`] and pass
//! it back on every [`ProgressSimulator::advance`] call. A polling client and a
//! server-push loop ([`ProgressSimulator::drive`]) use the same code path.

pub mod catalog;
pub mod simulator;

pub use catalog::{AnalysisKind, FLOW_STEP_COUNT};
pub use simulator::{
    Agent, FlowStep, ProgressSimulator, ProgressSnapshot, StepData, StepStatus,
};
