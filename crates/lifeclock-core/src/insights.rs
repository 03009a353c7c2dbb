//! Revelation generator: exactly 47 readings per report, in a fixed order.
//!
//! Composition rule (3 x 10) + 4 + 10 + 3 = 47:
//! 1. Three readings per phase, phases 1 to 10 (category `phase`): score band,
//!    archetype reflection, energy attribution.
//! 2. One reading per energy in fixed order Mind, Heart, Drive, Spirit
//!    (category `energy`).
//! 3. Ten cross-phase readings in fixed rule order (categories `pattern`,
//!    `extreme`, `contradiction`). Every rule is total: a fallback phrasing
//!    covers the vacuous case, so the count never varies.
//! 4. One reading per force in order Shadow, Fear, Power (category `force`).
//!
//! All selection is by score band, archetype label, or fixed rule. Identical
//! input yields the identical 47 records in the identical order, which is what
//! the index-based "next revelation" UI and the PDF exporter rely on.

use crate::energy::EnergyProfile;
use crate::error::ReportError;
use crate::forces::{
    highest_phase, lowest_phase, steepest_climb, steepest_decline, ForceKind, HiddenForce,
    HiddenForces, ScoreBand,
};
use crate::life_index::LifeIndexResult;
use crate::phase::{validate_phases, EnergyType, PhaseResult};
use serde::{Deserialize, Serialize};

/// Hard contract: every valid report carries exactly this many revelations.
pub const REVELATION_COUNT: usize = 47;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevelationCategory {
    Phase,
    Energy,
    Pattern,
    Extreme,
    Contradiction,
    Force,
}

/// One discrete reading shown to the user (and rendered into the PDF).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Revelation {
    pub category: RevelationCategory,
    pub icon: String,
    pub title: String,
    pub insight: String,
}

fn revelation(
    category: RevelationCategory,
    icon: &str,
    title: String,
    insight: String,
) -> Revelation {
    Revelation {
        category,
        icon: icon.to_string(),
        title,
        insight,
    }
}

// ---------------------------------------------------------------------------
// Per-phase readings (30)
// ---------------------------------------------------------------------------

fn score_reading(phase: &PhaseResult) -> Revelation {
    let score = phase.total.round() as i64;
    let insight = match score {
        0..=19 => format!(
            "You scored {} here. This chapter asked more than it gave, and you carried it anyway.",
            score
        ),
        20..=39 => format!(
            "A score of {}. This chapter strained you, and traces of that strain still show.",
            score
        ),
        40..=59 => format!(
            "At {}, this chapter sits at the midpoint. Neither wound nor trophy, it is simply load-bearing.",
            score
        ),
        60..=79 => format!(
            "You scored {}. This chapter worked, and most of what it built still stands.",
            score
        ),
        _ => format!(
            "A score of {}. This chapter is one of the pillars your whole curve rests on.",
            score
        ),
    };
    revelation(RevelationCategory::Phase, "🧭", phase.label(), insight)
}

fn archetype_reading(phase: &PhaseResult) -> Revelation {
    let insight = match ScoreBand::from_score(phase.total.round() as u8) {
        ScoreBand::Low => format!(
            "The {} emerged here under pressure. Identities forged in low seasons tend to outlast the season.",
            phase.archetype
        ),
        ScoreBand::Mid => format!(
            "This chapter cast you as {}. The role fit well enough that you kept pieces of the costume.",
            phase.archetype
        ),
        ScoreBand::High => format!(
            "Here the {} was at home. When a role and a season agree, the score shows it.",
            phase.archetype
        ),
    };
    revelation(
        RevelationCategory::Phase,
        "🎭",
        format!("{} · {}", phase.label(), phase.archetype),
        insight,
    )
}

fn energy_reading(phase: &PhaseResult) -> Revelation {
    let score = phase.total.round() as i64;
    let (title, insight) = match phase.energy_type {
        Some(energy) if phase.total >= 50.0 => (
            format!("{} runs on {}", phase.label(), energy.as_str()),
            format!(
                "This chapter fed your {} reserves. A score of {} flowed into that channel.",
                energy.as_str(),
                score
            ),
        ),
        Some(energy) => (
            format!("{} runs on {}", phase.label(), energy.as_str()),
            format!(
                "This chapter drew on {} and gave little back. The {} it scored was expensive.",
                energy.as_str(),
                score
            ),
        ),
        None => (
            format!("{} runs free", phase.label()),
            "No single energy claims this chapter. It spread its weight across all four channels."
                .to_string(),
        ),
    };
    revelation(RevelationCategory::Phase, "⚡", title, insight)
}

// ---------------------------------------------------------------------------
// Energy profile readings (4)
// ---------------------------------------------------------------------------

fn energy_icon(energy: EnergyType) -> &'static str {
    match energy {
        EnergyType::Mind => "🧠",
        EnergyType::Heart => "💙",
        EnergyType::Drive => "🔥",
        EnergyType::Spirit => "✨",
    }
}

fn energy_profile_reading(energy: EnergyType, profile: &EnergyProfile) -> Revelation {
    let avg = profile.averages.get(energy).round() as i64;
    let name = energy.as_str();
    let insight = if energy == profile.dominant_energy {
        format!(
            "{} leads your profile at an average of {}. When you are unsure which voice is yours, it is this one.",
            name, avg
        )
    } else {
        match ScoreBand::from_score(avg.clamp(0, 100) as u8) {
            ScoreBand::Low => format!(
                "{} averages {} across your curve. This channel is quiet, either by nature or by neglect.",
                name, avg
            ),
            ScoreBand::Mid => format!(
                "{} holds a steady {}. It does its work without asking for the spotlight.",
                name, avg
            ),
            ScoreBand::High => format!(
                "{} averages {} and is nearly in charge. A strong second voice keeps the leading one honest.",
                name, avg
            ),
        }
    };
    revelation(
        RevelationCategory::Energy,
        energy_icon(energy),
        format!("{} energy", name),
        insight,
    )
}

// ---------------------------------------------------------------------------
// Cross-phase readings (10), fixed rule order
// ---------------------------------------------------------------------------

fn cross_phase_readings(
    out: &mut Vec<Revelation>,
    phases: &[PhaseResult],
    life_index: &LifeIndexResult,
    profile: &EnergyProfile,
) {
    let peak = highest_phase(phases);
    let valley = lowest_phase(phases);

    // 1. The peak
    out.push(revelation(
        RevelationCategory::Extreme,
        "🏔",
        "The Peak".to_string(),
        format!(
            "{} is the summit of your curve at {}. Whatever you were doing then deserves repeating.",
            peak.label(),
            peak.total.round() as i64
        ),
    ));

    // 2. The valley
    out.push(revelation(
        RevelationCategory::Extreme,
        "🕳",
        "The Valley".to_string(),
        format!(
            "{} marks your lowest ground at {}. Valleys are where curves turn, and yours turned here.",
            valley.label(),
            valley.total.round() as i64
        ),
    ));

    // 3. Steepest climb
    let (climb_driver, rise) = steepest_climb(phases);
    let climb_insight = if rise > 0.0 {
        format!(
            "Your sharpest rise lands at {}, a jump of {} points. You already know how to reboot a life.",
            climb_driver.label(),
            rise.round() as i64
        )
    } else {
        "Your curve never spikes upward. You build by increments, not by leaps.".to_string()
    };
    out.push(revelation(
        RevelationCategory::Pattern,
        "📈",
        "The Climb".to_string(),
        climb_insight,
    ));

    // 4. Steepest drop
    let (drop_driver, drop) = steepest_decline(phases);
    let drop_insight = if drop > 0.0 {
        format!(
            "Your hardest fall lands at {}, down {} points from the chapter before.",
            drop_driver.label(),
            drop.round() as i64
        )
    } else {
        "Your curve never falls. Whatever you have been protecting, it is working.".to_string()
    };
    out.push(revelation(
        RevelationCategory::Pattern,
        "📉",
        "The Drop".to_string(),
        drop_insight,
    ));

    // 5. Two halves
    let first_avg = phases[..5].iter().map(|p| p.total).sum::<f64>() / 5.0;
    let second_avg = phases[5..].iter().map(|p| p.total).sum::<f64>() / 5.0;
    let (a, b) = (first_avg.round() as i64, second_avg.round() as i64);
    let halves_insight = if second_avg - first_avg >= 5.0 {
        format!(
            "Your second act averages {} against the first act's {}. The story is improving as it goes.",
            b, a
        )
    } else if first_avg - second_avg >= 5.0 {
        format!(
            "Your first act averages {} against the second act's {}. The early chapters still carry the weight.",
            a, b
        )
    } else {
        format!(
            "Both halves of your story hold near {}. Consistency like that is rarer than drama.",
            a
        )
    };
    out.push(revelation(
        RevelationCategory::Pattern,
        "⚖️",
        "Two Halves".to_string(),
        halves_insight,
    ));

    // 6. Opening vs closing
    let first = phases[0].total;
    let last = phases[phases.len() - 1].total;
    let delta = (last - first).round() as i64;
    let bookends_insight = if delta > 2 {
        format!(
            "You closed {} points above where you opened. The curve bends upward where it matters most.",
            delta
        )
    } else if delta < -2 {
        format!(
            "You opened {} points above where you closed. Endings are just chapters; the next one is unwritten.",
            -delta
        )
    } else {
        format!(
            "You closed almost exactly where you opened, holding your life index of {} steady the whole way.",
            life_index.life_index
        )
    };
    out.push(revelation(
        RevelationCategory::Pattern,
        "🔁",
        "First Page, Last Page".to_string(),
        bookends_insight,
    ));

    // 7. Peak vs dominant energy
    let dominant = profile.dominant_energy;
    let crosscurrent_insight = match peak.energy_type {
        Some(energy) if energy != dominant => format!(
            "Your best chapter, {}, ran on {} energy while your profile leans {}. Your peaks disagree with your habits.",
            peak.label(),
            energy.as_str(),
            dominant.as_str()
        ),
        Some(_) => format!(
            "Your best chapter runs on the same {} energy your profile leans on. No friction between peak and habit.",
            dominant.as_str()
        ),
        None => "Your best chapter carries no energy tag. Your peaks refuse to be categorized."
            .to_string(),
    };
    out.push(revelation(
        RevelationCategory::Contradiction,
        "🌗",
        "The Crosscurrent".to_string(),
        crosscurrent_insight,
    ));

    // 8. Widest adjacent swing
    let mut swing = 0.0f64;
    let mut swing_phase = &phases[0];
    for i in 1..phases.len() {
        let diff = (phases[i].total - phases[i - 1].total).abs();
        if diff > swing {
            swing = diff;
            swing_phase = &phases[i];
        }
    }
    let swing_insight = if swing > 0.0 {
        format!(
            "The widest swing in your story is {} points, landing at {}. You contain more than one life.",
            swing.round() as i64,
            swing_phase.label()
        )
    } else {
        "No chapter swings far from its neighbour. Your story moves like a tide, not a storm."
            .to_string()
    };
    out.push(revelation(
        RevelationCategory::Contradiction,
        "🎢",
        "The Swing".to_string(),
        swing_insight,
    ));

    // 9. Spread
    let spread = (peak.total - valley.total).round() as i64;
    let spread_insight = if spread < 15 {
        format!(
            "Your chapters stay within {} points of each other. You are the same person in every room.",
            spread
        )
    } else if spread < 40 {
        format!(
            "Your scores span {} points. Enough range to prove flexibility without losing the thread.",
            spread
        )
    } else {
        format!(
            "Your scores span {} points. You have lived several distinct lives under one name.",
            spread
        )
    };
    out.push(revelation(
        RevelationCategory::Pattern,
        "📏",
        "Your Range".to_string(),
        spread_insight,
    ));

    // 10. Closing momentum (last three phases)
    let (t8, t9, t10) = (
        phases[7].total,
        phases[8].total,
        phases[9].total,
    );
    let momentum_insight = if t10 > t9 && t9 > t8 {
        "Your final three chapters climb step by step. You are ending on an ascent.".to_string()
    } else if t10 < t9 && t9 < t8 {
        "Your final three chapters slope downward. Curves that fall late are asking for a new chapter, not a verdict."
            .to_string()
    } else {
        "Your final three chapters trade ground back and forth. The ending is still being negotiated."
            .to_string()
    };
    out.push(revelation(
        RevelationCategory::Pattern,
        "🧲",
        "How It Ends".to_string(),
        momentum_insight,
    ));
}

// ---------------------------------------------------------------------------
// Force readings (3)
// ---------------------------------------------------------------------------

fn force_reading(kind: ForceKind, force: &HiddenForce) -> Revelation {
    let (icon, title, insight) = match kind {
        ForceKind::Shadow => (
            "🌑",
            "The Shadow",
            format!(
                "Your shadow scores {} and lives in {}. What you avoid there is still steering from the back seat.",
                force.score, force.phase_label
            ),
        ),
        ForceKind::Fear => (
            "🌊",
            "The Fear",
            format!(
                "Your fear scores {}, born where the curve fell into {}. Named fears are half-tamed.",
                force.score, force.phase_label
            ),
        ),
        ForceKind::Power => (
            "👑",
            "The Power",
            format!(
                "Your power scores {}, proven at {}. This is the engine the other forty-six readings orbit.",
                force.score, force.phase_label
            ),
        ),
    };
    revelation(RevelationCategory::Force, icon, title.to_string(), insight)
}

/// Emits the 47 revelations for a validated run. The count check at the end is
/// defensive: the composition makes 47 structural, and anything else is a bug
/// surfaced as `Integrity` rather than silently shipped downstream.
pub fn generate_insights(
    phases: &[PhaseResult],
    life_index: &LifeIndexResult,
    profile: &EnergyProfile,
    forces: &HiddenForces,
) -> Result<Vec<Revelation>, ReportError> {
    validate_phases(phases)?;

    let mut out = Vec::with_capacity(REVELATION_COUNT);
    for phase in phases {
        out.push(score_reading(phase));
        out.push(archetype_reading(phase));
        out.push(energy_reading(phase));
    }
    for energy in EnergyType::ALL {
        out.push(energy_profile_reading(energy, profile));
    }
    cross_phase_readings(&mut out, phases, life_index, profile);
    out.push(force_reading(ForceKind::Shadow, &forces.shadow));
    out.push(force_reading(ForceKind::Fear, &forces.fear));
    out.push(force_reading(ForceKind::Power, &forces.power));

    if out.len() != REVELATION_COUNT {
        return Err(ReportError::Integrity(format!(
            "expected {} revelations, produced {}",
            REVELATION_COUNT,
            out.len()
        )));
    }
    Ok(out)
}
