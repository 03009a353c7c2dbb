//! Life index: one 0–100 number for the whole run, plus its stage band.

use crate::error::ReportError;
use crate::phase::{validate_phases, PhaseResult};
use serde::{Deserialize, Serialize};

/// Stage bands over the life index.
///
/// Bands are contiguous and cover 0..=100 with no gaps or overlap:
/// 0–19 Foundation, 20–39 Awakening, 40–59 Crossroads, 60–79 Momentum,
/// 80–100 Mastery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LifeStage {
    Foundation,
    Awakening,
    Crossroads,
    Momentum,
    Mastery,
}

impl LifeStage {
    pub fn from_index(index: u8) -> Self {
        match index {
            0..=19 => LifeStage::Foundation,
            20..=39 => LifeStage::Awakening,
            40..=59 => LifeStage::Crossroads,
            60..=79 => LifeStage::Momentum,
            _ => LifeStage::Mastery,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LifeStage::Foundation => "Foundation",
            LifeStage::Awakening => "Awakening",
            LifeStage::Crossroads => "Crossroads",
            LifeStage::Momentum => "Momentum",
            LifeStage::Mastery => "Mastery",
        }
    }
}

/// The life index and its stage band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LifeIndexResult {
    /// Integer in [0, 100].
    pub life_index: u8,
    pub stage: LifeStage,
}

/// Reduces the ten phase totals into the life index: unweighted mean, rounded to
/// the nearest integer, clamped to [0, 100], then banded into a stage.
pub fn compute_life_index(phases: &[PhaseResult]) -> Result<LifeIndexResult, ReportError> {
    validate_phases(phases)?;
    let sum: f64 = phases.iter().map(|p| p.total).sum();
    let mean = sum / phases.len() as f64;
    let life_index = mean.round().clamp(0.0, 100.0) as u8;
    Ok(LifeIndexResult {
        life_index,
        stage: LifeStage::from_index(life_index),
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
                archetype: "X".to_string(),
                energy_type: Some(EnergyType::Mind),
            })
            .collect()
    }

    #[test]
    fn uniform_fifty_lands_on_crossroads() {
        let result = compute_life_index(&phases_with_totals([50.0; 10])).unwrap();
        assert_eq!(result.life_index, 50);
        assert_eq!(result.stage, LifeStage::Crossroads);
    }

    #[test]
    fn mean_is_rounded_to_nearest() {
        // mean 49.5 rounds up to 50
        let mut totals = [49.0; 10];
        totals[0] = 54.0;
        let result = compute_life_index(&phases_with_totals(totals)).unwrap();
        assert_eq!(result.life_index, 50);
    }

    #[test]
    fn every_index_maps_to_exactly_one_stage() {
        for index in 0u8..=100 {
            let stage = LifeStage::from_index(index);
            let expected = match index {
                0..=19 => LifeStage::Foundation,
                20..=39 => LifeStage::Awakening,
                40..=59 => LifeStage::Crossroads,
                60..=79 => LifeStage::Momentum,
                _ => LifeStage::Mastery,
            };
            assert_eq!(stage, expected, "index {}", index);
        }
    }

    #[test]
    fn band_edges() {
        assert_eq!(LifeStage::from_index(19), LifeStage::Foundation);
        assert_eq!(LifeStage::from_index(20), LifeStage::Awakening);
        assert_eq!(LifeStage::from_index(79), LifeStage::Momentum);
        assert_eq!(LifeStage::from_index(80), LifeStage::Mastery);
        assert_eq!(LifeStage::from_index(100), LifeStage::Mastery);
    }

    #[test]
    fn extremes_stay_in_range() {
        let low = compute_life_index(&phases_with_totals([0.0; 10])).unwrap();
        assert_eq!(low.life_index, 0);
        assert_eq!(low.stage, LifeStage::Foundation);

        let high = compute_life_index(&phases_with_totals([100.0; 10])).unwrap();
        assert_eq!(high.life_index, 100);
        assert_eq!(high.stage, LifeStage::Mastery);
    }

    #[test]
    fn short_sequence_rejected() {
        let phases = phases_with_totals([50.0; 10]);
        assert!(compute_life_index(&phases[..9]).is_err());
    }
}
