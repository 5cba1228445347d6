//! Triage engine.
//!
//! Combines the health context, member profile and red-flag result into an
//! urgency classification. The engine is a pure function of its input: no
//! clock reads, no randomness, no errors.

use serde::{Deserialize, Serialize};

use super::context::{Frequency, HealthContext, Severity};
use super::profile::MemberProfile;
use super::red_flags::{detect_urgent_indicators, EmergencyState};
use super::urgency::{TriageLevel, UrgencyDisplay, UrgencyLevel};
use crate::domain::foundation::Percentage;

/// Conditions that make any new symptom more concerning.
pub const HIGH_RISK_CONDITIONS: &[&str] = &[
    "diabetes",
    "heart",
    "hypertension",
    "high blood pressure",
    "copd",
    "asthma",
    "kidney",
    "cancer",
    "stroke",
    "dementia",
    "parkinson",
];

/// Points awarded per populated field. Re-tunable, but every entry must stay
/// non-negative so confidence never drops as context grows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConfidenceWeights {
    pub primary_symptom: u32,
    pub duration: u32,
    pub severity: u32,
    pub associated_symptoms: u32,
    pub frequency: u32,
    pub medications: u32,
    pub chronic_conditions: u32,
    pub follow_up_progress: u32,
}

impl Default for ConfidenceWeights {
    fn default() -> Self {
        Self {
            primary_symptom: 20,
            duration: 15,
            severity: 15,
            associated_symptoms: 10,
            frequency: 10,
            medications: 10,
            chronic_conditions: 10,
            follow_up_progress: 10,
        }
    }
}

/// Everything the engine looks at for one assessment.
#[derive(Debug, Clone, Copy)]
pub struct TriageInput<'a> {
    pub context: &'a HealthContext,
    pub profile: Option<&'a MemberProfile>,
    pub emergency: &'a EmergencyState,
    pub questions_answered: usize,
    pub questions_planned: usize,
}

/// A single consideration that contributed to the result, in evaluation order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TriageFactor {
    RedFlag { phrase: String },
    Severity { severity: Severity },
    AcuteOnset,
    PersistingDuration,
    RecurringSymptom,
    MultipleSymptoms { count: usize },
    UrgentIndicator { indicator: String },
    HighRiskCondition { condition: String },
    Age { age: u32, modifier: i8 },
}

impl TriageFactor {
    /// Human-readable reasoning line for this factor.
    pub fn describe(&self) -> String {
        match self {
            Self::RedFlag { phrase } => format!("Emergency warning sign reported: \"{}\"", phrase),
            Self::Severity { severity } => {
                format!("Severity reported as {}", severity.short_label().to_lowercase())
            }
            Self::AcuteOnset => "Severe symptom with sudden onset".to_string(),
            Self::PersistingDuration => "Symptom has persisted for a week or longer".to_string(),
            Self::RecurringSymptom => "Symptom recurs frequently or is constant".to_string(),
            Self::MultipleSymptoms { count } => {
                format!("{} associated symptoms reported", count)
            }
            Self::UrgentIndicator { indicator } => {
                format!("Urgency indicator mentioned: \"{}\"", indicator)
            }
            Self::HighRiskCondition { condition } => {
                format!("Existing condition increases risk: {}", condition)
            }
            Self::Age { age, modifier } => {
                format!("Age {} raises urgency (+{})", age, modifier)
            }
        }
    }
}

/// Output of one triage assessment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TriageResult {
    pub level: TriageLevel,
    pub urgency_level: UrgencyLevel,
    pub confidence: Percentage,
    pub risk_score: u32,
    pub reasoning: Vec<String>,
    pub factors: Vec<TriageFactor>,
    pub red_flags_detected: Vec<String>,
    pub risk_factors: Vec<String>,
    pub age_modifier_applied: i8,
    pub recommended_timeframe: String,
    pub title: String,
    pub description: String,
    pub color: String,
}

impl TriageResult {
    pub fn display(&self) -> &'static UrgencyDisplay {
        self.urgency_level.display()
    }

    pub fn is_emergency(&self) -> bool {
        self.urgency_level == UrgencyLevel::Emergency
    }
}

/// Rule-based triage classifier.
#[derive(Debug, Clone, Default)]
pub struct TriageEngine {
    weights: ConfidenceWeights,
}

impl TriageEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Classifies the input. Always returns a best-effort result.
    pub fn assess(&self, input: TriageInput<'_>) -> TriageResult {
        let ctx = input.context;
        let mut factors = Vec::new();
        let mut reasoning = Vec::new();

        if ctx.has_primary_symptom() {
            reasoning.push(format!("Primary concern: {}", ctx.primary_symptom));
        } else {
            reasoning.push("Primary concern not yet described".to_string());
        }

        let age_modifier = input.profile.map(MemberProfile::age_modifier).unwrap_or(0);
        let risk_factors = collect_risk_factors(ctx, input.profile);

        let (urgency_level, risk_score) = if input.emergency.is_emergency {
            for phrase in &input.emergency.matched_phrases {
                factors.push(TriageFactor::RedFlag {
                    phrase: phrase.clone(),
                });
            }
            if let Some(age) = input.profile.and_then(|p| p.age) {
                if age_modifier > 0 {
                    factors.push(TriageFactor::Age {
                        age,
                        modifier: age_modifier,
                    });
                }
            }
            (UrgencyLevel::Emergency, 0)
        } else {
            let score = score_risk(ctx, input.profile, &mut factors);
            (UrgencyLevel::from_risk_score(score), score)
        };

        reasoning.extend(factors.iter().map(TriageFactor::describe));
        if factors.is_empty() {
            reasoning.push("No warning signs or risk-raising factors identified".to_string());
        }

        let display = urgency_level.display();
        TriageResult {
            level: urgency_level.triage_level(),
            urgency_level,
            confidence: self.confidence(&input),
            risk_score,
            reasoning,
            factors,
            red_flags_detected: input.emergency.matched_phrases.clone(),
            risk_factors,
            age_modifier_applied: age_modifier,
            recommended_timeframe: urgency_level.recommended_timeframe().to_string(),
            title: display.label.to_string(),
            description: display.description.to_string(),
            color: display.color.to_string(),
        }
    }

    /// Additive confidence score, capped at 100.
    pub fn confidence(&self, input: &TriageInput<'_>) -> Percentage {
        let ctx = input.context;
        let w = &self.weights;
        let profile_meds = input.profile.map_or(false, |p| !p.medications.is_empty());
        let profile_conditions = input.profile.map_or(false, |p| !p.known_conditions.is_empty());

        let mut score = 0;
        if ctx.has_primary_symptom() {
            score += w.primary_symptom;
        }
        if ctx.duration.is_some() {
            score += w.duration;
        }
        if ctx.severity.is_some() {
            score += w.severity;
        }
        if !ctx.associated_symptoms.is_empty() {
            score += w.associated_symptoms;
        }
        if ctx.frequency.is_some() {
            score += w.frequency;
        }
        if !ctx.medications.is_empty() || profile_meds {
            score += w.medications;
        }
        if !ctx.chronic_conditions.is_empty() || profile_conditions {
            score += w.chronic_conditions;
        }
        if input.questions_planned > 0 {
            let answered = input.questions_answered.min(input.questions_planned) as u32;
            score += w.follow_up_progress * answered / input.questions_planned as u32;
        }
        Percentage::new(score)
    }
}

fn score_risk(
    ctx: &HealthContext,
    profile: Option<&MemberProfile>,
    factors: &mut Vec<TriageFactor>,
) -> u32 {
    let mut score = 0u32;

    if let Some(severity) = ctx.severity {
        let points = match severity {
            Severity::Mild => 0,
            Severity::Moderate => 1,
            Severity::Severe => 3,
        };
        if points > 0 {
            factors.push(TriageFactor::Severity { severity });
            score += points;
        }
    }

    if let Some(duration) = ctx.duration {
        if duration.is_acute() && ctx.severity == Some(Severity::Severe) {
            factors.push(TriageFactor::AcuteOnset);
            score += 1;
        }
        if duration.is_persisting() {
            factors.push(TriageFactor::PersistingDuration);
            score += 1;
        }
    }

    if matches!(ctx.frequency, Some(Frequency::Frequent | Frequency::Constant)) {
        factors.push(TriageFactor::RecurringSymptom);
        score += 1;
    }

    if ctx.associated_symptoms.len() >= 3 {
        factors.push(TriageFactor::MultipleSymptoms {
            count: ctx.associated_symptoms.len(),
        });
        score += 1;
    }

    let mut indicator_points = 0;
    for indicator in detect_urgent_indicators(&indicator_text(ctx)) {
        factors.push(TriageFactor::UrgentIndicator { indicator });
        indicator_points += 2;
    }
    score += indicator_points.min(4);

    let conditions = ctx
        .chronic_conditions
        .iter()
        .chain(profile.map(|p| p.known_conditions.iter()).into_iter().flatten());
    if let Some(condition) = conditions.into_iter().find(|c| is_high_risk_condition(c)) {
        factors.push(TriageFactor::HighRiskCondition {
            condition: condition.clone(),
        });
        score += 1;
    }

    if let Some(profile) = profile {
        let modifier = profile.age_modifier();
        if let (Some(age), true) = (profile.age, modifier > 0) {
            factors.push(TriageFactor::Age { age, modifier });
            score += modifier as u32;
        }
    }

    score
}

/// Text scanned for urgency indicators.
fn indicator_text(ctx: &HealthContext) -> String {
    let mut parts = vec![ctx.primary_symptom.as_str(), ctx.additional_notes.as_str()];
    parts.extend(ctx.associated_symptoms.iter().map(String::as_str));
    parts.extend(ctx.recent_events.iter().map(String::as_str));
    parts.join(" ")
}

pub fn is_high_risk_condition(condition: &str) -> bool {
    let lower = condition.to_lowercase();
    HIGH_RISK_CONDITIONS.iter().any(|c| lower.contains(c))
}

fn collect_risk_factors(ctx: &HealthContext, profile: Option<&MemberProfile>) -> Vec<String> {
    let mut out = Vec::new();
    for factor in &ctx.risk_factors {
        super::context::push_unique(&mut out, factor);
    }
    let conditions = ctx
        .chronic_conditions
        .iter()
        .chain(profile.map(|p| p.known_conditions.iter()).into_iter().flatten());
    for condition in conditions {
        super::context::push_unique(&mut out, condition);
    }
    if let Some(age) = profile.and_then(|p| p.age) {
        if profile.map_or(0, MemberProfile::age_modifier) > 0 {
            super::context::push_unique(&mut out, &format!("Age {}", age));
        }
    }
    out
}
