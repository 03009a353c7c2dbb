//! Phase results: the scored input the quiz flow hands to the report engine.
//!
//! A complete run is exactly ten `PhaseResult` records, ids 1..=10 in order, each
//! already scored 0–100 by the quiz flow. The engine treats the sequence as
//! immutable input; the life index, energy profile, hidden forces, and revelations
//! are all derived from it and nothing else.

use crate::error::ReportError;
use serde::{Deserialize, Serialize};

/// Number of quiz phases in a complete run.
pub const PHASE_COUNT: usize = 10;

/// The four energy buckets a phase can attribute its score to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EnergyType {
    Mind,
    Heart,
    Drive,
    Spirit,
}

impl EnergyType {
    /// All four energies in fixed priority order (Mind > Heart > Drive > Spirit).
    /// This order breaks exact ties wherever one energy must win over another.
    pub const ALL: [EnergyType; 4] = [
        EnergyType::Mind,
        EnergyType::Heart,
        EnergyType::Drive,
        EnergyType::Spirit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EnergyType::Mind => "Mind",
            EnergyType::Heart => "Heart",
            EnergyType::Drive => "Drive",
            EnergyType::Spirit => "Spirit",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim() {
            s if s.eq_ignore_ascii_case("mind") => Some(EnergyType::Mind),
            s if s.eq_ignore_ascii_case("heart") => Some(EnergyType::Heart),
            s if s.eq_ignore_ascii_case("drive") => Some(EnergyType::Drive),
            s if s.eq_ignore_ascii_case("spirit") => Some(EnergyType::Spirit),
            _ => None,
        }
    }
}

/// One completed quiz phase, already scored by the quiz flow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhaseResult {
    /// Phase order, 1..=10. Must be unique and contiguous across the sequence.
    pub id: u8,
    /// Display name of the phase. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Score in [0, 100].
    pub total: f64,
    /// Short label summarizing the phase outcome (e.g. "The Builder").
    pub archetype: String,
    /// When present, attributes this phase's score to one energy bucket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub energy_type: Option<EnergyType>,
}

impl PhaseResult {
    /// Display label: the phase title when present, "Phase N" otherwise.
    pub fn label(&self) -> String {
        match &self.title {
            Some(t) if !t.trim().is_empty() => t.trim().to_string(),
            _ => format!("Phase {}", self.id),
        }
    }
}

/// Checks the input contract every pipeline entry point relies on: exactly ten
/// phases, ids contiguous 1..=10 in sequence order, every total in [0, 100].
pub fn validate_phases(phases: &[PhaseResult]) -> Result<(), ReportError> {
    if phases.len() != PHASE_COUNT {
        return Err(ReportError::invalid(format!(
            "expected {} phases, got {}",
            PHASE_COUNT,
            phases.len()
        )));
    }
    for (i, phase) in phases.iter().enumerate() {
        let expected_id = (i + 1) as u8;
        if phase.id != expected_id {
            return Err(ReportError::invalid(format!(
                "phase ids must be contiguous 1..={}; position {} has id {}",
                PHASE_COUNT,
                i + 1,
                phase.id
            )));
        }
        if !phase.total.is_finite() || phase.total < 0.0 || phase.total > 100.0 {
            return Err(ReportError::invalid(format!(
                "phase {} total {} is outside 0..=100",
                phase.id, phase.total
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_phase(id: u8, total: f64, energy: Option<EnergyType>) -> PhaseResult {
        PhaseResult {
            id,
            title: None,
            total,
            archetype: "The Builder".to_string(),
            energy_type: energy,
        }
    }

    fn ten_phases() -> Vec<PhaseResult> {
        (1..=10)
            .map(|id| sample_phase(id, 50.0, Some(EnergyType::Mind)))
            .collect()
    }

    #[test]
    fn ten_valid_phases_pass() {
        assert!(validate_phases(&ten_phases()).is_ok());
    }

    #[test]
    fn nine_or_eleven_phases_rejected() {
        let mut nine = ten_phases();
        nine.pop();
        assert!(matches!(
            validate_phases(&nine),
            Err(ReportError::InvalidInput(_))
        ));

        let mut eleven = ten_phases();
        eleven.push(sample_phase(11, 50.0, None));
        assert!(matches!(
            validate_phases(&eleven),
            Err(ReportError::InvalidInput(_))
        ));
    }

    #[test]
    fn id_gap_rejected() {
        let mut phases = ten_phases();
        phases[4].id = 9;
        assert!(validate_phases(&phases).is_err());
    }

    #[test]
    fn out_of_range_total_rejected() {
        let mut phases = ten_phases();
        phases[0].total = -1.0;
        assert!(validate_phases(&phases).is_err());

        let mut phases = ten_phases();
        phases[9].total = 101.0;
        assert!(validate_phases(&phases).is_err());

        let mut phases = ten_phases();
        phases[3].total = f64::NAN;
        assert!(validate_phases(&phases).is_err());
    }

    #[test]
    fn label_prefers_title() {
        let mut p = sample_phase(3, 50.0, None);
        assert_eq!(p.label(), "Phase 3");
        p.title = Some("Childhood".to_string());
        assert_eq!(p.label(), "Childhood");
        p.title = Some("   ".to_string());
        assert_eq!(p.label(), "Phase 3");
    }

    #[test]
    fn energy_type_round_trips_through_str() {
        for e in EnergyType::ALL {
            assert_eq!(EnergyType::from_str(e.as_str()), Some(e));
        }
        assert_eq!(EnergyType::from_str("  heart "), Some(EnergyType::Heart));
        assert_eq!(EnergyType::from_str("soul"), None);
    }
}
