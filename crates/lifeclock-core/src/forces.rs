//! Hidden forces: Shadow, Fear, and Power readings derived from phase extremes.
//!
//! Each force resolves to exactly one driver phase and one score band, and every
//! (force, band) cell of the template table maps to exactly one phrasing. There is
//! no randomness anywhere in the selection: identical input fills identical text.
//!
//! Drivers:
//! - **Shadow**: the lowest-scoring phase (ties resolve to the earliest id).
//! - **Fear**: the phase ending the steepest adjacent decline; phase 1 with a
//!   drop of 0 when the curve never declines.
//! - **Power**: the highest-scoring phase, blended with the dominant energy average.

use crate::energy::EnergyProfile;
use crate::error::ReportError;
use crate::phase::{validate_phases, PhaseResult};
use serde::{Deserialize, Serialize};

/// The three named polarities of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ForceKind {
    Shadow,
    Fear,
    Power,
}

impl ForceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ForceKind::Shadow => "shadow",
            ForceKind::Fear => "fear",
            ForceKind::Power => "power",
        }
    }
}

/// One computed force: a score, the phase that drove it, and template-filled text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HiddenForce {
    /// Numeric strength in [0, 100].
    pub score: u8,
    /// Id of the phase that most strongly drove this force (back-reference).
    pub phase_id: u8,
    /// Display label of the driver phase.
    pub phase_label: String,
    pub description: String,
    pub insight: String,
    pub action: String,
}

/// The three forces, always computed together and paired with the final report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HiddenForces {
    pub shadow: HiddenForce,
    pub fear: HiddenForce,
    pub power: HiddenForce,
}

/// Score bands used to key the template table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ScoreBand {
    Low,
    Mid,
    High,
}

impl ScoreBand {
    pub(crate) fn from_score(score: u8) -> Self {
        match score {
            0..=33 => ScoreBand::Low,
            34..=66 => ScoreBand::Mid,
            _ => ScoreBand::High,
        }
    }

    fn index(self) -> usize {
        match self {
            ScoreBand::Low => 0,
            ScoreBand::Mid => 1,
            ScoreBand::High => 2,
        }
    }
}

struct ForceTemplate {
    description: &'static str,
    insight: &'static str,
    action: &'static str,
}

// Template tables, indexed [low, mid, high]. Placeholders: {phase}, {archetype},
// {score}, {energy}.

const SHADOW_TEMPLATES: [ForceTemplate; 3] = [
    ForceTemplate {
        description: "Your shadow keeps a low profile. {phase} is the softest chapter of your story, yet it never truly collapsed.",
        insight: "What you avoid looking at costs you little right now. That is earned, not luck.",
        action: "Revisit {phase} once a month and name one thing you left unfinished there.",
    },
    ForceTemplate {
        description: "There is a room in your story you keep closed. {phase} scored lowest, and the {archetype} in you learned to walk past that door.",
        insight: "A shadow at {score} means avoidance is quietly steering some of your choices.",
        action: "Write down what {phase} still asks of you, then pick the smallest piece and face it this week.",
    },
    ForceTemplate {
        description: "{phase} is where your shadow lives, and it casts a long one. A shadow score of {score} says this chapter shaped you more than you admit.",
        insight: "The energy you spend not looking at {phase} is energy the rest of your life never receives.",
        action: "Talk to someone you trust about {phase}. Saying it out loud shrinks it.",
    },
];

const FEAR_TEMPLATES: [ForceTemplate; 3] = [
    ForceTemplate {
        description: "Your fear runs shallow. The steepest dip in your curve lands at {phase}, and it is barely a dip at all.",
        insight: "You move between chapters without bracing for the fall. Keep that looseness.",
        action: "When the next drop comes, remember how lightly you carried this one.",
    },
    ForceTemplate {
        description: "Your fear took shape at {phase}, where your curve fell hardest. The {archetype} in you still flinches at that kind of slide.",
        insight: "A fear score of {score} means the memory of falling guides you more than the fall itself did.",
        action: "Name the exact moment {phase} turned downward. Fears lose their grip when you give them dates.",
    },
    ForceTemplate {
        description: "The drop into {phase} left a mark. Your fear scores {score}, which means part of you is still standing at the edge of that decline.",
        insight: "You are not afraid of what happened at {phase}. You are afraid it could happen again.",
        action: "Plan for the repeat you dread. A written plan turns a fear into a procedure.",
    },
];

const POWER_TEMPLATES: [ForceTemplate; 3] = [
    ForceTemplate {
        description: "Your power is still gathering. {phase} is your strongest chapter so far, and it points at where the engine sits.",
        insight: "A power score of {score} is not a verdict. It is a floor.",
        action: "Spend one deliberate hour this week doing the thing that made {phase} your peak.",
    },
    ForceTemplate {
        description: "{phase} shows what you look like at full strength, and your {energy} energy is the fuel behind it.",
        insight: "Your power scores {score}. You already know the conditions that produce your best chapters; you just ration them.",
        action: "Copy one condition from {phase} into your current season, starting this week.",
    },
    ForceTemplate {
        description: "{phase} is your proof. With a power score of {score} backed by your {energy} energy, you have a repeatable peak rather than a lucky one.",
        insight: "The pattern behind {phase} is an instruction manual written by you, for you.",
        action: "Teach someone what worked in {phase}. Power compounds when it is articulated.",
    },
];

struct TemplateCtx<'a> {
    phase: String,
    archetype: &'a str,
    score: u8,
    energy: &'a str,
}

fn fill(template: &str, ctx: &TemplateCtx<'_>) -> String {
    template
        .replace("{phase}", &ctx.phase)
        .replace("{archetype}", ctx.archetype)
        .replace("{score}", &ctx.score.to_string())
        .replace("{energy}", ctx.energy)
}

/// Lowest-total phase; strict `<` keeps the earliest id on exact ties.
pub(crate) fn lowest_phase(phases: &[PhaseResult]) -> &PhaseResult {
    phases
        .iter()
        .skip(1)
        .fold(&phases[0], |best, p| if p.total < best.total { p } else { best })
}

/// Highest-total phase; strict `>` keeps the earliest id on exact ties.
pub(crate) fn highest_phase(phases: &[PhaseResult]) -> &PhaseResult {
    phases
        .iter()
        .skip(1)
        .fold(&phases[0], |best, p| if p.total > best.total { p } else { best })
}

/// Phase ending the steepest adjacent decline, with the size of the drop.
/// When the curve never declines, returns phase 1 with a drop of 0.
pub(crate) fn steepest_decline(phases: &[PhaseResult]) -> (&PhaseResult, f64) {
    let mut driver = &phases[0];
    let mut best_drop = 0.0;
    for i in 1..phases.len() {
        let drop = phases[i - 1].total - phases[i].total;
        if drop > best_drop {
            driver = &phases[i];
            best_drop = drop;
        }
    }
    (driver, best_drop)
}

/// Phase ending the steepest adjacent climb, with the size of the rise.
/// When the curve never rises, returns phase 1 with a rise of 0.
pub(crate) fn steepest_climb(phases: &[PhaseResult]) -> (&PhaseResult, f64) {
    let mut driver = &phases[0];
    let mut best_rise = 0.0;
    for i in 1..phases.len() {
        let rise = phases[i].total - phases[i - 1].total;
        if rise > best_rise {
            driver = &phases[i];
            best_rise = rise;
        }
    }
    (driver, best_rise)
}

fn build_force(
    kind: ForceKind,
    driver: &PhaseResult,
    score: u8,
    profile: &EnergyProfile,
) -> HiddenForce {
    let templates = match kind {
        ForceKind::Shadow => &SHADOW_TEMPLATES,
        ForceKind::Fear => &FEAR_TEMPLATES,
        ForceKind::Power => &POWER_TEMPLATES,
    };
    let template = &templates[ScoreBand::from_score(score).index()];
    let energy = driver
        .energy_type
        .unwrap_or(profile.dominant_energy)
        .as_str();
    let ctx = TemplateCtx {
        phase: driver.label(),
        archetype: &driver.archetype,
        score,
        energy,
    };
    HiddenForce {
        score,
        phase_id: driver.id,
        phase_label: driver.label(),
        description: fill(template.description, &ctx),
        insight: fill(template.insight, &ctx),
        action: fill(template.action, &ctx),
    }
}

/// Computes the three hidden forces from the phase sequence and the already
/// computed energy profile.
pub fn analyze_forces(
    phases: &[PhaseResult],
    profile: &EnergyProfile,
) -> Result<HiddenForces, ReportError> {
    validate_phases(phases)?;

    let low = lowest_phase(phases);
    let shadow_score = (100.0 - low.total).round() as u8;

    let (fear_driver, drop) = steepest_decline(phases);
    let fear_score = (((100.0 - fear_driver.total) + drop) / 2.0)
        .round()
        .clamp(0.0, 100.0) as u8;

    let high = highest_phase(phases);
    let dominant_avg = profile.averages.get(profile.dominant_energy);
    let power_score = ((high.total + dominant_avg) / 2.0).round().clamp(0.0, 100.0) as u8;

    Ok(HiddenForces {
        shadow: build_force(ForceKind::Shadow, low, shadow_score, profile),
        fear: build_force(ForceKind::Fear, fear_driver, fear_score, profile),
        power: build_force(ForceKind::Power, high, power_score, profile),
    })
}
