//! Lifecycle enums with a fixed transition table.

use super::ValidationError;

/// An enum whose values move along a table of allowed transitions.
///
/// Implementors only list the exits of each value; checking and performing
/// a move come from the default methods.
pub trait StateMachine: Sized + Copy + PartialEq + std::fmt::Debug {
    /// Values reachable in one step from `self`.
    fn valid_transitions(&self) -> Vec<Self>;

    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    /// Returns `target` if the move is allowed.
    ///
    /// # Errors
    ///
    /// - `InvalidFormat` on the `phase` field when the move is not in the table
    fn transition_to(&self, target: Self) -> Result<Self, ValidationError> {
        if self.can_transition_to(&target) {
            return Ok(target);
        }
        Err(ValidationError::invalid_format(
            "phase",
            format!("{:?} cannot move to {:?}", self, target),
        ))
    }

    /// No exits left.
    fn is_terminal(&self) -> bool {
        self.valid_transitions().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Booking {
        Requested,
        Confirmed,
        Visited,
    }

    impl StateMachine for Booking {
        fn valid_transitions(&self) -> Vec<Self> {
            match self {
                Booking::Requested => vec![Booking::Confirmed],
                Booking::Confirmed => vec![Booking::Visited],
                Booking::Visited => vec![],
            }
        }
    }

    #[test]
    fn listed_exit_is_allowed() {
        assert_eq!(
            Booking::Requested.transition_to(Booking::Confirmed),
            Ok(Booking::Confirmed)
        );
    }

    #[test]
    fn skipping_a_step_names_both_ends() {
        let err = Booking::Requested.transition_to(Booking::Visited).unwrap_err();
        assert!(err.to_string().contains("Requested cannot move to Visited"));
    }

    #[test]
    fn value_without_exits_is_terminal() {
        assert!(Booking::Visited.is_terminal());
        assert!(!Booking::Confirmed.is_terminal());
    }
}
