//! Energy profile: Mind/Heart/Drive/Spirit running averages and the dominant energy.

use crate::error::ReportError;
use crate::phase::{validate_phases, EnergyType, PhaseResult};
use serde::{Deserialize, Serialize};

/// Per-energy averages in [0, 100]. All four keys are always present; a bucket no
/// phase contributed to stays at 0.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct EnergyAverages {
    pub mind: f64,
    pub heart: f64,
    pub drive: f64,
    pub spirit: f64,
}

impl EnergyAverages {
    pub fn get(&self, energy: EnergyType) -> f64 {
        match energy {
            EnergyType::Mind => self.mind,
            EnergyType::Heart => self.heart,
            EnergyType::Drive => self.drive,
            EnergyType::Spirit => self.spirit,
        }
    }

    fn set(&mut self, energy: EnergyType, value: f64) {
        match energy {
            EnergyType::Mind => self.mind = value,
            EnergyType::Heart => self.heart = value,
            EnergyType::Drive => self.drive = value,
            EnergyType::Spirit => self.spirit = value,
        }
    }
}

/// The four energy averages plus the dominant energy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnergyProfile {
    pub averages: EnergyAverages,
    /// Energy with the highest average. Exact ties resolve to the earlier entry of
    /// the fixed `Mind > Heart > Drive > Spirit` priority order.
    pub dominant_energy: EnergyType,
}

impl EnergyProfile {
    /// Energy with the lowest average; ties resolve by the same priority order.
    pub fn weakest_energy(&self) -> EnergyType {
        let mut weakest = EnergyType::ALL[0];
        let mut lowest = self.averages.get(weakest);
        for energy in EnergyType::ALL.into_iter().skip(1) {
            let avg = self.averages.get(energy);
            if avg < lowest {
                weakest = energy;
                lowest = avg;
            }
        }
        weakest
    }
}

/// Groups phases by energy tag and averages each bucket. Untagged phases are
/// excluded from every bucket and do not error.
pub fn analyze_energy(phases: &[PhaseResult]) -> Result<EnergyProfile, ReportError> {
    validate_phases(phases)?;

    let mut averages = EnergyAverages::default();
    for energy in EnergyType::ALL {
        let totals: Vec<f64> = phases
            .iter()
            .filter(|p| p.energy_type == Some(energy))
            .map(|p| p.total)
            .collect();
        if !totals.is_empty() {
            averages.set(energy, totals.iter().sum::<f64>() / totals.len() as f64);
        }
    }

    // Strict > keeps the first entry of the priority order on exact ties.
    let mut dominant = EnergyType::ALL[0];
    let mut best = averages.get(dominant);
    for energy in EnergyType::ALL.into_iter().skip(1) {
        let avg = averages.get(energy);
        if avg > best {
            dominant = energy;
            best = avg;
        }
    }

    Ok(EnergyProfile {
        averages,
        dominant_energy: dominant,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn phase(id: u8, total: f64, energy: Option<EnergyType>) -> PhaseResult {
        PhaseResult {
            id,
            title: None,
            total,
            archetype: "X".to_string(),
            energy_type: energy,
        }
    }

    #[test]
    fn all_mind_leaves_other_buckets_at_zero() {
        let phases: Vec<_> = (1..=10)
            .map(|id| phase(id, 50.0, Some(EnergyType::Mind)))
            .collect();
        let profile = analyze_energy(&phases).unwrap();
        assert_eq!(profile.averages.mind, 50.0);
        assert_eq!(profile.averages.heart, 0.0);
        assert_eq!(profile.averages.drive, 0.0);
        assert_eq!(profile.averages.spirit, 0.0);
        assert_eq!(profile.dominant_energy, EnergyType::Mind);
    }

    #[test]
    fn untagged_phases_are_excluded_not_errors() {
        let mut phases: Vec<_> = (1..=10)
            .map(|id| phase(id, 40.0, Some(EnergyType::Heart)))
            .collect();
        phases[0].energy_type = None;
        phases[1].energy_type = None;
        let profile = analyze_energy(&phases).unwrap();
        assert_eq!(profile.averages.heart, 40.0);
        assert_eq!(profile.dominant_energy, EnergyType::Heart);
    }

    #[test]
    fn exact_tie_resolves_by_priority_order() {
        // Heart and Drive both average 60; Heart wins (earlier in priority order).
        let mut phases: Vec<_> = (1..=10).map(|id| phase(id, 0.0, None)).collect();
        phases[0] = phase(1, 60.0, Some(EnergyType::Heart));
        phases[1] = phase(2, 60.0, Some(EnergyType::Drive));
        let profile = analyze_energy(&phases).unwrap();
        assert_eq!(profile.averages.heart, 60.0);
        assert_eq!(profile.averages.drive, 60.0);
        assert_eq!(profile.dominant_energy, EnergyType::Heart);
    }

    #[test]
    fn mind_wins_four_way_zero_tie() {
        let phases: Vec<_> = (1..=10).map(|id| phase(id, 20.0, None)).collect();
        let profile = analyze_energy(&phases).unwrap();
        assert_eq!(profile.dominant_energy, EnergyType::Mind);
    }

    #[test]
    fn averages_stay_in_bounds() {
        let phases: Vec<_> = (1..=10)
            .map(|id| {
                let energy = EnergyType::ALL[(id as usize - 1) % 4];
                phase(id, (id as f64) * 10.0, Some(energy))
            })
            .collect();
        let profile = analyze_energy(&phases).unwrap();
        for energy in EnergyType::ALL {
            let avg = profile.averages.get(energy);
            assert!((0.0..=100.0).contains(&avg), "{:?} = {}", energy, avg);
        }
    }

    #[test]
    fn weakest_energy_ties_resolve_by_priority() {
        let phases: Vec<_> = (1..=10)
            .map(|id| phase(id, 80.0, Some(EnergyType::Spirit)))
            .collect();
        let profile = analyze_energy(&phases).unwrap();
        // Mind, Heart, Drive all sit at 0; Mind is earliest in the priority order.
        assert_eq!(profile.weakest_energy(), EnergyType::Mind);
    }
}
