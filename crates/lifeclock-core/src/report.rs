//! Final report assembly: one immutable bundle per computation.
//!
//! The assembler runs the sub-analyzers in dependency order and either returns a
//! complete bundle or propagates the first error. There is no partial report and
//! no I/O; callers own persistence and rendering. The pipeline reads no clock, so
//! recomputing from the same stored phases yields a byte-identical bundle.

use crate::config::ReportConfig;
use crate::energy::{analyze_energy, EnergyProfile};
use crate::error::ReportError;
use crate::forces::{analyze_forces, HiddenForces};
use crate::insights::{generate_insights, Revelation};
use crate::life_index::{compute_life_index, LifeIndexResult};
use crate::phase::{validate_phases, PhaseResult};
use serde::{Deserialize, Serialize};

/// How the life curve derives its values from phase totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CurveMode {
    /// Curve values are the raw phase totals.
    #[default]
    Raw,
    /// Three-point centered moving average; endpoints average their two
    /// available neighbours.
    Smoothed,
}

impl CurveMode {
    pub fn from_str(s: &str) -> Self {
        match s.trim() {
            s if s.eq_ignore_ascii_case("smoothed") => CurveMode::Smoothed,
            _ => CurveMode::Raw,
        }
    }
}

/// One charted point of the life curve, in phase order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurvePoint {
    pub label: String,
    pub value: f64,
}

/// The assembled report consumed by rendering, persistence, and PDF export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinalReport {
    pub life_index: LifeIndexResult,
    pub profile: EnergyProfile,
    pub life_curve: Vec<CurvePoint>,
}

/// The report plus its always-paired companions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportBundle {
    pub report: FinalReport,
    pub forces: HiddenForces,
    pub revelations: Vec<Revelation>,
}

fn build_curve(phases: &[PhaseResult], mode: CurveMode) -> Vec<CurvePoint> {
    phases
        .iter()
        .enumerate()
        .map(|(i, phase)| {
            let value = match mode {
                CurveMode::Raw => phase.total,
                CurveMode::Smoothed => {
                    let lo = i.saturating_sub(1);
                    let hi = (i + 1).min(phases.len() - 1);
                    let window = &phases[lo..=hi];
                    let mean = window.iter().map(|p| p.total).sum::<f64>() / window.len() as f64;
                    (mean * 10.0).round() / 10.0
                }
            };
            CurvePoint {
                label: phase.label(),
                value,
            }
        })
        .collect()
}

/// Runs the full pipeline: life index, energy profile, hidden forces, and the 47
/// revelations, composed into one bundle. The first sub-component error aborts
/// the whole computation.
pub fn assemble_report(
    phases: &[PhaseResult],
    config: &ReportConfig,
) -> Result<ReportBundle, ReportError> {
    validate_phases(phases)?;
    let life_index = compute_life_index(phases)?;
    let profile = analyze_energy(phases)?;
    let forces = analyze_forces(phases, &profile)?;
    let revelations = generate_insights(phases, &life_index, &profile, &forces)?;
    let life_curve = build_curve(phases, config.curve_mode);

    Ok(ReportBundle {
        report: FinalReport {
            life_index,
            profile,
            life_curve,
        },
        forces,
        revelations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::phase::EnergyType;

    fn phases_with_totals(totals: [f64; 10]) -> Vec<PhaseResult> {
        totals
            .iter()
            .enumerate()
            .map(|(i, &total)| PhaseResult {
                id: (i + 1) as u8,
                title: None,
                total,
                archetype: "The Builder".to_string(),
                energy_type: Some(EnergyType::Drive),
            })
            .collect()
    }

    #[test]
    fn raw_curve_mirrors_phase_totals() {
        let totals = [10.0, 20.0, 30.0, 40.0, 50.0, 60.0, 70.0, 80.0, 90.0, 100.0];
        let bundle = assemble_report(&phases_with_totals(totals), &ReportConfig::default()).unwrap();
        let values: Vec<f64> = bundle.report.life_curve.iter().map(|p| p.value).collect();
        assert_eq!(values, totals.to_vec());
        assert_eq!(bundle.report.life_curve[0].label, "Phase 1");
    }

    #[test]
    fn smoothed_curve_averages_neighbours() {
        let totals = [0.0, 30.0, 60.0, 30.0, 0.0, 30.0, 60.0, 30.0, 0.0, 30.0];
        let config = ReportConfig {
            curve_mode: CurveMode::Smoothed,
        };
        let bundle = assemble_report(&phases_with_totals(totals), &config).unwrap();
        let values: Vec<f64> = bundle.report.life_curve.iter().map(|p| p.value).collect();
        // Endpoint: (0 + 30) / 2; interior: centered 3-point mean.
        assert_eq!(values[0], 15.0);
        assert_eq!(values[1], 30.0);
        assert_eq!(values[2], 40.0);
        assert_eq!(values[9], 15.0);
    }

    #[test]
    fn bundle_carries_forty_seven_revelations() {
        let bundle =
            assemble_report(&phases_with_totals([50.0; 10]), &ReportConfig::default()).unwrap();
        assert_eq!(bundle.revelations.len(), crate::insights::REVELATION_COUNT);
    }

    #[test]
    fn malformed_input_produces_no_partial_bundle() {
        let phases = phases_with_totals([50.0; 10]);
        let result = assemble_report(&phases[..9], &ReportConfig::default());
        assert!(matches!(result, Err(ReportError::InvalidInput(_))));
    }

    #[test]
    fn recomputation_is_idempotent() {
        let phases = phases_with_totals([34.0, 81.0, 12.0, 55.0, 67.0, 42.0, 90.0, 23.0, 61.0, 48.0]);
        let a = assemble_report(&phases, &ReportConfig::default()).unwrap();
        let b = assemble_report(&phases, &ReportConfig::default()).unwrap();
        assert_eq!(a, b);
    }
}
