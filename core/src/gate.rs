use bitflags::bitflags;
use chrono::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{BoardCache, Coord2, GameOutcome};

bitflags! {
    #[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
    pub struct MouseButtons: u16 {
        const LEFT    = 1;
        const RIGHT   = 1 << 1;
        const MIDDLE  = 1 << 2;
    }
}

/// Raw input attached to a board click
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ClickInput {
    pub buttons: MouseButtons,
    pub ctrl: bool,
}

impl ClickInput {
    pub const fn reveal() -> Self {
        Self {
            buttons: MouseButtons::LEFT,
            ctrl: false,
        }
    }

    pub const fn flag() -> Self {
        Self {
            buttons: MouseButtons::RIGHT,
            ctrl: false,
        }
    }

    /// A secondary button or a held modifier turns the click into a flag
    /// toggle
    pub fn is_secondary(self) -> bool {
        self.ctrl || self.buttons.contains(MouseButtons::RIGHT)
    }
}

/// What the gate decided to do with a click
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ClickAction {
    /// Input is not accepted right now, nothing happens
    Rejected,
    /// Issue a reveal call for the cell
    Reveal,
    /// The cell is flagged; the click counted but no call is issued until
    /// the flag is removed
    RevealSuppressed,
    /// Issue a flag-toggle call for the cell
    ToggleFlag,
}

impl ClickAction {
    pub const fn is_accepted(self) -> bool {
        !matches!(self, Self::Rejected)
    }
}

/// Valid transitions:
/// - NotStarted -> InProgress
/// - InProgress -> Won
/// - InProgress -> Lost
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum GateState {
    /// No accepted click yet
    NotStarted,
    /// Game started, clicks are accepted
    InProgress,
    /// Game ended and the player won
    Won,
    /// Game ended and the player lost
    Lost,
}

impl GateState {
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::NotStarted)
    }

    /// Indicates the game has ended and no moves are accepted anymore
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GateState {
    fn default() -> Self {
        Self::NotStarted
    }
}

/// Per-click admission control for one game session.
///
/// Owns the opaque session identity handed out by the server at creation;
/// a new game replaces the gate wholesale, so the id, click counter and
/// clock never leak across sessions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InteractionGate {
    game_id: String,
    state: GateState,
    clicks: u32,
    started_at: Option<DateTime<Utc>>,
    ended_at: Option<DateTime<Utc>>,
}

impl InteractionGate {
    pub fn new(game_id: impl Into<String>) -> Self {
        Self {
            game_id: game_id.into(),
            state: Default::default(),
            clicks: 0,
            started_at: None,
            ended_at: None,
        }
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn clicks(&self) -> u32 {
        self.clicks
    }

    /// Whether a response tagged with `game_id` may still touch the cache.
    /// Late responses from a previous session's auto-reveal wave carry a
    /// stale tag and must be dropped.
    pub fn accepts(&self, game_id: &str) -> bool {
        !self.game_id.is_empty() && self.game_id == game_id
    }

    /// Decide what a click on `coords` does right now.
    ///
    /// Rejected outright when there is no session id, no cached snapshot,
    /// the game is over, or the target cell is already revealed; none of
    /// those touch the click counter. An accepted reveal click always
    /// counts, even when a flag then suppresses the transport call.
    pub fn classify(&mut self, coords: Coord2, input: ClickInput, cache: &BoardCache) -> ClickAction {
        if self.game_id.is_empty() || self.state.is_terminal() {
            return ClickAction::Rejected;
        }
        // covers both "no board yet" and out-of-bounds coordinates
        let Some(cell) = cache.cell_at(coords) else {
            return ClickAction::Rejected;
        };
        if cell.revealed {
            return ClickAction::Rejected;
        }

        self.mark_started();

        if input.is_secondary() {
            ClickAction::ToggleFlag
        } else {
            self.clicks += 1;
            if cell.flagged {
                ClickAction::RevealSuppressed
            } else {
                ClickAction::Reveal
            }
        }
    }

    /// First accepted click starts the clock
    fn mark_started(&mut self) {
        if self.state.is_initial() {
            let now = Utc::now();
            log::debug!("game {} started at {}", self.game_id, now);
            self.started_at.replace(now);
            self.state = GateState::InProgress;
        }
    }

    /// Game-status check against the cached snapshot, run after a reveal
    /// response has been applied and the auto-reveal expansion settled.
    /// Game-over takes precedence over the win condition.
    pub fn settle(&mut self, cache: &BoardCache) -> Option<GameOutcome> {
        if self.state.is_terminal() {
            return None;
        }
        let snapshot = cache.get()?;
        let outcome = if snapshot.game_over {
            GameOutcome::Lost
        } else if snapshot.is_cleared() {
            GameOutcome::Won
        } else {
            return None;
        };
        self.state = match outcome {
            GameOutcome::Won => GateState::Won,
            GameOutcome::Lost => GateState::Lost,
        };
        let now = Utc::now();
        self.ended_at.replace(now);
        log::debug!("game {} ended at {} ({:?})", self.game_id, now, outcome);
        Some(outcome)
    }

    /// How many seconds have passed since the game started, 0 if it hasn't
    pub fn elapsed_secs(&self) -> u32 {
        if let Some(started_at) = self.started_at {
            (self.ended_at.unwrap_or_else(Utc::now) - started_at)
                .num_seconds()
                .max(0) as u32
        } else {
            0
        }
    }
}
