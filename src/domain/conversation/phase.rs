//! Conversation phases.
//!
//! The phase decides what the assistant does with the next user turn.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::StateMachine;

/// Where a session stands in the triage conversation.
///
/// Normal flow: `Initial` → `Gathering` → `Assessing` → `Guidance` →
/// `ServiceRouting` → `Completed`. Any phase except `Completed` can jump to
/// `Emergency`, which only leads to `Completed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ConversationPhase {
    /// Session opened, no user message yet.
    #[default]
    Initial,

    /// Asking follow-up questions.
    Gathering,

    /// Enough context collected; triage is running.
    Assessing,

    /// Guidance and suggested actions have been shown.
    Guidance,

    /// The user acted on a suggested action.
    ServiceRouting,

    /// Session ended.
    Completed,

    /// A red flag fired; routine questions are suppressed.
    Emergency,
}

impl ConversationPhase {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Initial => "Starting",
            Self::Gathering => "Gathering details",
            Self::Assessing => "Assessing",
            Self::Guidance => "Guidance",
            Self::ServiceRouting => "Booking a service",
            Self::Completed => "Completed",
            Self::Emergency => "Emergency",
        }
    }

    /// True while follow-up questions may still be asked.
    pub fn asks_questions(&self) -> bool {
        matches!(self, Self::Initial | Self::Gathering)
    }

    /// True once guidance exists for the session.
    pub fn has_guidance(&self) -> bool {
        matches!(self, Self::Guidance | Self::ServiceRouting)
    }
}

impl StateMachine for ConversationPhase {
    fn valid_transitions(&self) -> Vec<Self> {
        use ConversationPhase::*;
        match self {
            Initial => vec![Gathering, Assessing, Emergency, Completed],
            Gathering => vec![Gathering, Assessing, Emergency, Completed],
            Assessing => vec![Guidance, Emergency, Completed],
            Guidance => vec![Assessing, ServiceRouting, Emergency, Completed],
            ServiceRouting => vec![ServiceRouting, Assessing, Emergency, Completed],
            Emergency => vec![Completed],
            Completed => vec![],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [ConversationPhase; 7] = [
        ConversationPhase::Initial,
        ConversationPhase::Gathering,
        ConversationPhase::Assessing,
        ConversationPhase::Guidance,
        ConversationPhase::ServiceRouting,
        ConversationPhase::Completed,
        ConversationPhase::Emergency,
    ];

    mod phase_definition {
        use super::*;

        #[test]
        fn default_phase_is_initial() {
            assert_eq!(ConversationPhase::default(), ConversationPhase::Initial);
        }

        #[test]
        fn serializes_to_snake_case() {
            let json = serde_json::to_string(&ConversationPhase::ServiceRouting).unwrap();
            assert_eq!(json, "\"service_routing\"");
        }
    }

    mod transitions {
        use super::*;

        #[test]
        fn happy_path_is_valid() {
            let path = [
                ConversationPhase::Initial,
                ConversationPhase::Gathering,
                ConversationPhase::Assessing,
                ConversationPhase::Guidance,
                ConversationPhase::ServiceRouting,
                ConversationPhase::Completed,
            ];
            for pair in path.windows(2) {
                assert!(pair[0].transition_to(pair[1]).is_ok(), "{:?}", pair);
            }
        }

        #[test]
        fn every_open_phase_can_jump_to_emergency() {
            for phase in ALL {
                let expected = !matches!(
                    phase,
                    ConversationPhase::Completed | ConversationPhase::Emergency
                );
                assert_eq!(
                    phase.can_transition_to(&ConversationPhase::Emergency),
                    expected,
                    "{:?}",
                    phase
                );
            }
        }

        #[test]
        fn emergency_only_leads_to_completed() {
            assert_eq!(
                ConversationPhase::Emergency.valid_transitions(),
                vec![ConversationPhase::Completed]
            );
            assert!(ConversationPhase::Emergency
                .transition_to(ConversationPhase::Gathering)
                .is_err());
        }

        #[test]
        fn completed_is_terminal() {
            assert!(ConversationPhase::Completed.is_terminal());
            for phase in ALL {
                assert!(!ConversationPhase::Completed.can_transition_to(&phase));
            }
        }

        #[test]
        fn valid_transitions_agree_with_can_transition_to() {
            for from in ALL {
                for to in ALL {
                    assert_eq!(
                        from.can_transition_to(&to),
                        from.valid_transitions().contains(&to),
                        "{:?} -> {:?}",
                        from,
                        to
                    );
                }
            }
        }
    }
}
