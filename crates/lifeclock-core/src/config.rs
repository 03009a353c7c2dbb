//! Report configuration loaded from the environment.
//!
//! The binary loads `.env` via dotenvy before reading these; the library itself
//! only touches `std::env`.

use crate::report::CurveMode;

/// Pipeline configuration.
///
/// | Env | Default | Description |
/// |-----|---------|-------------|
/// | LIFECLOCK_CURVE_MODE | raw | "raw" \| "smoothed" life-curve values. |
#[derive(Debug, Clone, Copy, Default)]
pub struct ReportConfig {
    pub curve_mode: CurveMode,
}

impl ReportConfig {
    /// Load from environment. Unset or unrecognized values fall back to defaults.
    pub fn from_env() -> Self {
        let curve_mode = std::env::var("LIFECLOCK_CURVE_MODE")
            .map(|s| CurveMode::from_str(&s))
            .unwrap_or_default();
        Self { curve_mode }
    }
}
