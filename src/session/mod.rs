// Session state - per-presentation-root container for the current
// combination, saved list, and UI mode flags.

pub mod saved;
pub mod view;

pub use saved::SavedCombinations;
pub use view::{Mode, ViewState};

use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::combination::Combination;

/// Identifies the combination a description request was started for.
///
/// A completion is applied only if the session still shows that exact
/// combination in the same generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionTicket {
    pub key: i64,
    pub generation: u64,
}

/// Serializable view of the whole session for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub view: ViewState,
    pub mode: Mode,
    pub daily: Option<Combination>,
    pub saved: Vec<Combination>,
    pub saved_count: usize,
    pub describing: bool,
}

/// Session state owned by the presentation root.
///
/// Lost when the session ends. Not shared between sessions.
#[derive(Debug, Default)]
pub struct Session {
    view: ViewState,
    mode: Mode,
    daily: Option<Combination>,
    saved: SavedCombinations,
    generation: u64,
    describing: bool,
    in_flight: Option<CancellationToken>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn current(&self) -> Option<&Combination> {
        self.view.current()
    }

    pub fn daily(&self) -> Option<&Combination> {
        self.daily.as_ref()
    }

    pub fn set_daily(&mut self, combination: Combination) {
        self.daily = Some(combination);
    }

    pub fn saved(&self) -> &SavedCombinations {
        &self.saved
    }

    pub fn is_describing(&self) -> bool {
        self.describing
    }

    /// Enter `Generating` from any state.
    ///
    /// Bumps the generation and cancels any in-flight description request,
    /// so completions for older combinations are dropped. Returns the new
    /// generation and the token for the next description request.
    pub fn begin_generating(&mut self) -> (u64, CancellationToken) {
        if let Some(token) = self.in_flight.take() {
            token.cancel();
        }

        self.generation += 1;
        self.view = ViewState::Generating { generation: self.generation };
        self.mode = Mode::Generate;
        self.describing = false;

        let token = CancellationToken::new();
        self.in_flight = Some(token.clone());
        (self.generation, token)
    }

    /// Like `begin_generating`, but only from `Displayed` or `CardView`.
    pub fn begin_regenerating(&mut self) -> Result<(u64, CancellationToken), String> {
        if self.view.current().is_none() {
            return Err(format!("Cannot regenerate while {}", self.view.name()));
        }
        Ok(self.begin_generating())
    }

    /// `Generating -> Displayed`, only if `generation` is still the latest.
    ///
    /// Returns a ticket for the description request, or `None` if a newer
    /// generation has started in the meantime.
    pub fn finish_generating(
        &mut self,
        generation: u64,
        combination: Combination,
    ) -> Option<DescriptionTicket> {
        match self.view {
            ViewState::Generating { generation: current } if current == generation => {
                let ticket = DescriptionTicket {
                    key: combination.created_at,
                    generation,
                };
                self.view = ViewState::Displayed { combination };
                Some(ticket)
            }
            _ => None,
        }
    }

    pub fn view_as_card(&mut self) -> Result<(), String> {
        self.view.enter_card_view()
    }

    pub fn back_to_list(&mut self) -> Result<(), String> {
        self.view.leave_card_view()
    }

    /// Switch panels. Leaving the card view always happens on a switch.
    pub fn set_mode(&mut self, mode: Mode) {
        if matches!(self.view, ViewState::CardView { .. }) {
            let _ = self.view.leave_card_view();
        }
        self.mode = mode;
    }

    pub fn mark_describing(&mut self, ticket: DescriptionTicket) {
        if self.is_current(ticket) {
            self.describing = true;
        }
    }

    fn is_current(&self, ticket: DescriptionTicket) -> bool {
        self.generation == ticket.generation
            && self.view.current().map(|c| c.created_at) == Some(ticket.key)
    }

    /// Apply a late description. Returns false (and changes nothing) for a
    /// stale ticket.
    pub fn apply_description(&mut self, ticket: DescriptionTicket, description: &str) -> bool {
        if !self.is_current(ticket) {
            return false;
        }

        if let Some(current) = self.view.current_mut() {
            current.description = Some(description.to_string());
            self.saved.fill_description(current, description);
        }
        self.describing = false;
        self.in_flight = None;
        true
    }

    /// Mark a description request as finished without a result.
    pub fn abandon_description(&mut self, ticket: DescriptionTicket) -> bool {
        if !self.is_current(ticket) {
            return false;
        }
        self.describing = false;
        self.in_flight = None;
        true
    }

    /// Save the current combination. Returns whether it was added.
    pub fn save_current(&mut self) -> bool {
        match self.view.current() {
            Some(current) => self.saved.save(current),
            None => false,
        }
    }

    pub fn save(&mut self, combination: &Combination) -> bool {
        self.saved.save(combination)
    }

    pub fn remove(&mut self, key: i64) -> bool {
        self.saved.remove(key)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            view: self.view.clone(),
            mode: self.mode,
            daily: self.daily.clone(),
            saved: self.saved.list().to_vec(),
            saved_count: self.saved.len(),
            describing: self.describing,
        }
    }
}
