use serde::{Deserialize, Serialize};

use crate::combination::Combination;

/// Which panel the presentation is showing
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Generate,
    Saved,
    AddContent,
}

/// State of the "current" combination.
///
/// `Empty -> Generating -> Displayed -> (CardView | Displayed)`; regenerate
/// goes back to `Generating`. A late description updates `Displayed` or
/// `CardView` in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ViewState {
    #[default]
    Empty,
    Generating { generation: u64 },
    Displayed { combination: Combination },
    CardView { combination: Combination },
}

impl ViewState {
    pub fn current(&self) -> Option<&Combination> {
        match self {
            ViewState::Displayed { combination } | ViewState::CardView { combination } => {
                Some(combination)
            }
            _ => None,
        }
    }

    pub(crate) fn current_mut(&mut self) -> Option<&mut Combination> {
        match self {
            ViewState::Displayed { combination } | ViewState::CardView { combination } => {
                Some(combination)
            }
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ViewState::Empty => "empty",
            ViewState::Generating { .. } => "generating",
            ViewState::Displayed { .. } => "displayed",
            ViewState::CardView { .. } => "card_view",
        }
    }

    pub fn is_generating(&self) -> bool {
        matches!(self, ViewState::Generating { .. })
    }

    /// Displayed -> CardView
    pub(crate) fn enter_card_view(&mut self) -> Result<(), String> {
        match std::mem::take(self) {
            ViewState::Displayed { combination } => {
                *self = ViewState::CardView { combination };
                Ok(())
            }
            other => {
                let name = other.name();
                *self = other;
                Err(format!("Cannot show card while {}", name))
            }
        }
    }

    /// CardView -> Displayed
    pub(crate) fn leave_card_view(&mut self) -> Result<(), String> {
        match std::mem::take(self) {
            ViewState::CardView { combination } => {
                *self = ViewState::Displayed { combination };
                Ok(())
            }
            other => {
                let name = other.name();
                *self = other;
                Err(format!("Cannot go back to list while {}", name))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_card_round_trip() {
        let combination = Combination::new("A", "B", "C");
        let mut view = ViewState::Displayed { combination: combination.clone() };

        view.enter_card_view().unwrap();
        assert_eq!(view, ViewState::CardView { combination: combination.clone() });
        assert_eq!(view.current(), Some(&combination));

        view.leave_card_view().unwrap();
        assert_eq!(view, ViewState::Displayed { combination });
    }

    #[test]
    fn test_invalid_transitions_leave_state_unchanged() {
        let mut view = ViewState::Empty;
        assert!(view.enter_card_view().is_err());
        assert_eq!(view, ViewState::Empty);

        let mut view = ViewState::Generating { generation: 3 };
        assert!(view.leave_card_view().is_err());
        assert_eq!(view, ViewState::Generating { generation: 3 });

        let mut view = ViewState::Displayed { combination: Combination::new("A", "B", "C") };
        assert!(view.leave_card_view().is_err());
        assert_eq!(view.name(), "displayed");
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(ViewState::Generating { generation: 7 }).unwrap();
        assert_eq!(json, serde_json::json!({ "state": "generating", "generation": 7 }));
    }
}
