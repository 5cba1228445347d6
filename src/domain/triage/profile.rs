//! Member profile snapshot supplied by the profile collaborator.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{MemberId, Percentage};

/// How the member relates to the account holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    #[default]
    Myself,
    Parent,
    Spouse,
    Child,
    Other,
}

impl Relationship {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Myself => "Self",
            Self::Parent => "Parent",
            Self::Spouse => "Spouse",
            Self::Child => "Child",
            Self::Other => "Other",
        }
    }
}

/// Read-only view of a member's profile at session start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberProfile {
    pub member_id: MemberId,
    pub display_name: Option<String>,
    pub age: Option<u32>,
    #[serde(default)]
    pub relationship: Relationship,
    #[serde(default)]
    pub known_conditions: Vec<String>,
    #[serde(default)]
    pub medications: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    #[serde(default)]
    pub profile_completeness: Percentage,
}

impl MemberProfile {
    /// Minimal profile with only the member id.
    pub fn new(member_id: MemberId) -> Self {
        Self {
            member_id,
            display_name: None,
            age: None,
            relationship: Relationship::default(),
            known_conditions: Vec::new(),
            medications: Vec::new(),
            allergies: Vec::new(),
            profile_completeness: Percentage::ZERO,
        }
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.age = Some(age);
        self
    }

    pub fn with_conditions(mut self, conditions: &[&str]) -> Self {
        self.known_conditions = conditions.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_medications(mut self, medications: &[&str]) -> Self {
        self.medications = medications.iter().map(|m| m.to_string()).collect();
        self
    }

    /// Urgency adjustment for very young or older members.
    pub fn age_modifier(&self) -> i8 {
        match self.age {
            Some(age) if age >= 80 => 2,
            Some(age) if age >= 65 => 1,
            Some(age) if age < 2 => 2,
            Some(age) if age < 12 => 1,
            _ => 0,
        }
    }
}
