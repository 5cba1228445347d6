//! Urgency classification and the display lookup table.

use serde::{Deserialize, Serialize};

/// Version of the display table below. Bump when any row changes.
pub const URGENCY_TABLE_VERSION: &str = "1.0";

/// Coarse triage level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriageLevel {
    SelfCare,
    Monitor,
    Consult,
    Urgent,
    Emergency,
}

impl TriageLevel {
    pub fn label(&self) -> &'static str {
        match self {
            Self::SelfCare => "Self-care",
            Self::Monitor => "Monitor",
            Self::Consult => "Consult a doctor",
            Self::Urgent => "Urgent",
            Self::Emergency => "Emergency",
        }
    }
}

/// Finer urgency used for display. Ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
    SelfCare,
    Monitor,
    ScheduleVisit,
    SeeDoctorSoon,
    Urgent,
    Emergency,
}

impl UrgencyLevel {
    pub const ALL: [UrgencyLevel; 6] = [
        Self::SelfCare,
        Self::Monitor,
        Self::ScheduleVisit,
        Self::SeeDoctorSoon,
        Self::Urgent,
        Self::Emergency,
    ];

    /// The coarse level this urgency belongs to.
    pub fn triage_level(&self) -> TriageLevel {
        match self {
            Self::SelfCare => TriageLevel::SelfCare,
            Self::Monitor => TriageLevel::Monitor,
            Self::ScheduleVisit | Self::SeeDoctorSoon => TriageLevel::Consult,
            Self::Urgent => TriageLevel::Urgent,
            Self::Emergency => TriageLevel::Emergency,
        }
    }

    /// Default care window for this urgency.
    pub fn recommended_timeframe(&self) -> &'static str {
        match self {
            Self::Emergency => "Immediately - call emergency services now",
            Self::Urgent => "Within the next few hours",
            Self::SeeDoctorSoon => "Within 24-48 hours",
            Self::ScheduleVisit => "Within the next week",
            Self::Monitor => "Monitor for 2-3 days; book a visit if not improving",
            Self::SelfCare => "No visit needed unless symptoms change",
        }
    }

    /// Display metadata for this urgency.
    pub fn display(&self) -> &'static UrgencyDisplay {
        let index = Self::ALL
            .iter()
            .position(|level| level == self)
            .unwrap_or(0);
        &URGENCY_DISPLAY[index]
    }

    /// Maps a risk score to an urgency. Emergencies never come from scoring.
    pub fn from_risk_score(score: u32) -> Self {
        match score {
            0 => Self::SelfCare,
            1..=2 => Self::Monitor,
            3..=4 => Self::ScheduleVisit,
            5..=6 => Self::SeeDoctorSoon,
            _ => Self::Urgent,
        }
    }
}

/// One row of the urgency display table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UrgencyDisplay {
    pub level: UrgencyLevel,
    pub label: &'static str,
    pub description: &'static str,
    pub color: &'static str,
    pub background_color: &'static str,
    pub action: &'static str,
}

/// Fixed display table, indexed in [`UrgencyLevel::ALL`] order.
pub const URGENCY_DISPLAY: [UrgencyDisplay; 6] = [
    UrgencyDisplay {
        level: UrgencyLevel::SelfCare,
        label: "Self-care",
        description: "This can usually be managed at home.",
        color: "#15803D",
        background_color: "#DCFCE7",
        action: "Follow the home-care tips below",
    },
    UrgencyDisplay {
        level: UrgencyLevel::Monitor,
        label: "Monitor",
        description: "Keep an eye on how things develop over the next few days.",
        color: "#0E7490",
        background_color: "#CFFAFE",
        action: "Track symptoms and check back",
    },
    UrgencyDisplay {
        level: UrgencyLevel::ScheduleVisit,
        label: "Schedule a visit",
        description: "A routine check-up with a doctor is a good idea.",
        color: "#1D4ED8",
        background_color: "#DBEAFE",
        action: "Book a doctor visit this week",
    },
    UrgencyDisplay {
        level: UrgencyLevel::SeeDoctorSoon,
        label: "See a doctor soon",
        description: "A doctor should look at this within a day or two.",
        color: "#B45309",
        background_color: "#FEF3C7",
        action: "Book a doctor within 48 hours",
    },
    UrgencyDisplay {
        level: UrgencyLevel::Urgent,
        label: "Urgent",
        description: "This needs medical attention today.",
        color: "#C2410C",
        background_color: "#FFEDD5",
        action: "Start a video consult or see a doctor today",
    },
    UrgencyDisplay {
        level: UrgencyLevel::Emergency,
        label: "Emergency",
        description: "These symptoms may need emergency care right away.",
        color: "#B91C1C",
        background_color: "#FEE2E2",
        action: "Call emergency services now",
    },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_table_rows_match_their_level() {
        for level in UrgencyLevel::ALL {
            assert_eq!(level.display().level, level);
        }
    }

    #[test]
    fn display_table_has_distinct_labels() {
        let mut labels: Vec<_> = URGENCY_DISPLAY.iter().map(|row| row.label).collect();
        labels.sort();
        labels.dedup();
        assert_eq!(labels.len(), 6);
    }

    #[test]
    fn urgency_orders_from_least_to_most_urgent() {
        assert!(UrgencyLevel::Emergency > UrgencyLevel::Urgent);
        assert!(UrgencyLevel::Monitor > UrgencyLevel::SelfCare);
    }

    #[test]
    fn both_consult_urgencies_map_to_consult() {
        assert_eq!(UrgencyLevel::ScheduleVisit.triage_level(), TriageLevel::Consult);
        assert_eq!(UrgencyLevel::SeeDoctorSoon.triage_level(), TriageLevel::Consult);
    }

    #[test]
    fn risk_score_never_yields_emergency() {
        for score in 0..50 {
            assert_ne!(UrgencyLevel::from_risk_score(score), UrgencyLevel::Emergency);
        }
        assert_eq!(UrgencyLevel::from_risk_score(0), UrgencyLevel::SelfCare);
        assert_eq!(UrgencyLevel::from_risk_score(7), UrgencyLevel::Urgent);
    }

    #[test]
    fn urgency_serializes_to_snake_case() {
        let json = serde_json::to_string(&UrgencyLevel::SeeDoctorSoon).unwrap();
        assert_eq!(json, "\"see_doctor_soon\"");
    }
}
