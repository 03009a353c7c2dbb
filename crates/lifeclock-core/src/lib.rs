//! lifeclock-core: report engine for the Life Clock quiz.
//!
//! Turns ten scored phase results into one immutable report: the life index and
//! its stage, the four-energy profile, the three hidden forces, and the 47
//! revelations. The whole pipeline is pure, synchronous, and clock-free; it can
//! be invoked concurrently with no coordination because each call only reads its
//! input and allocates its output. Persistence, rendering, and PDF export live
//! with the callers.

mod config;
mod energy;
mod error;
mod forces;
mod insights;
mod life_index;
mod phase;
mod report;

pub use config::ReportConfig;
pub use energy::{analyze_energy, EnergyAverages, EnergyProfile};
pub use error::ReportError;
pub use forces::{analyze_forces, ForceKind, HiddenForce, HiddenForces};
pub use insights::{
    generate_insights, Revelation, RevelationCategory, REVELATION_COUNT,
};
pub use life_index::{compute_life_index, LifeIndexResult, LifeStage};
pub use phase::{validate_phases, EnergyType, PhaseResult, PHASE_COUNT};
pub use report::{assemble_report, CurveMode, CurvePoint, FinalReport, ReportBundle};
