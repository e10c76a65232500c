use std::sync::Arc;

use chrono::Utc;
use varredor_core::{
    BoardCache, BoardSnapshot, ClickAction, ClickInput, Coord2, GameLevel, GameOutcome, GateState,
    History, InteractionGate, SessionRecord,
};

use crate::sequencer::AutoRevealSequencer;
use crate::store::HistoryStore;
use crate::ticker::Ticker;
use crate::transport::BoardTransport;
use crate::{Result, TickCallback};

/// One game session against the remote server.
///
/// Wires the interaction gate, the snapshot cache, the auto-reveal
/// sequencer, the session ticker and the finished-game history over a
/// shared transport. All game rules live on the server; this type only
/// reconciles the local view after each action.
pub struct GameSession {
    transport: Arc<dyn BoardTransport>,
    sequencer: AutoRevealSequencer,
    gate: InteractionGate,
    cache: BoardCache,
    level: GameLevel,
    history: History,
    store: Option<HistoryStore>,
    ticker: Ticker,
    on_tick: Option<TickCallback>,
}

impl GameSession {
    pub fn new(transport: Arc<dyn BoardTransport>) -> Self {
        let sequencer = AutoRevealSequencer::new(Arc::clone(&transport));
        Self {
            transport,
            sequencer,
            gate: InteractionGate::new(String::new()),
            cache: BoardCache::new(),
            level: GameLevel::easy(),
            history: History::new(),
            store: None,
            ticker: Ticker::new(),
            on_tick: None,
        }
    }

    /// Attach durable history storage; the persisted log becomes the
    /// in-memory one
    pub fn with_history_store(mut self, store: HistoryStore) -> Self {
        self.history = store.load();
        self.store = Some(store);
        self
    }

    /// Callback fired once per second while a game is in progress
    pub fn with_tick_callback(mut self, on_tick: TickCallback) -> Self {
        self.on_tick = Some(on_tick);
        self
    }

    pub fn with_wave_delay(mut self, wave_delay: std::time::Duration) -> Self {
        self.sequencer = self.sequencer.with_wave_delay(wave_delay);
        self
    }

    pub fn board(&self) -> Option<&BoardSnapshot> {
        self.cache.get()
    }

    pub fn state(&self) -> GateState {
        self.gate.state()
    }

    pub fn level(&self) -> &GameLevel {
        &self.level
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn clicks(&self) -> u32 {
        self.gate.clicks()
    }

    pub fn elapsed_secs(&self) -> u32 {
        self.gate.elapsed_secs()
    }

    pub fn mines_left(&self) -> i64 {
        self.cache.mines_left()
    }

    pub fn ticker_running(&self) -> bool {
        self.ticker.is_running()
    }

    /// Start a fresh game, replacing the session identity wholesale.
    ///
    /// The level is validated before any transport call, and the previous
    /// ticker is always stopped first. On transport failure everything is
    /// left as it was.
    pub async fn new_game(&mut self, level: GameLevel) -> Result<()> {
        level.validate()?;
        self.ticker.stop();
        let id = self
            .transport
            .create_game(level.rows, level.cols, level.mines)
            .await?;
        let snapshot = self.transport.fetch_board(&id).await?;
        log::info!("new game {id} ({}, {} mines)", level.size_label(), level.mines);
        self.gate = InteractionGate::new(id);
        self.cache.replace(snapshot);
        self.level = level;
        Ok(())
    }

    /// Forward one user click through the gate.
    ///
    /// Returns the outcome when this click finished the game. Transport
    /// failures are logged and leave the session in its pre-call state; the
    /// user retries by clicking again.
    pub async fn click(&mut self, coords: Coord2, input: ClickInput) -> Option<GameOutcome> {
        let was_initial = self.gate.state().is_initial();
        let action = self.gate.classify(coords, input, &self.cache);
        log::debug!("click at {coords:?} -> {action:?}");
        if was_initial && action.is_accepted() {
            self.start_ticker();
        }

        match action {
            ClickAction::Rejected | ClickAction::RevealSuppressed => None,
            ClickAction::ToggleFlag => {
                let tag = self.gate.game_id().to_owned();
                match self.transport.flag(&tag, coords.0, coords.1).await {
                    Ok(snapshot) => {
                        self.apply(&tag, snapshot);
                    }
                    Err(err) => log::error!("flag toggle at {coords:?} failed: {err}"),
                }
                None
            }
            ClickAction::Reveal => {
                let tag = self.gate.game_id().to_owned();
                match self.transport.reveal(&tag, coords.0, coords.1).await {
                    Ok(snapshot) => {
                        self.apply(&tag, snapshot);
                        if let Some(outcome) = self.settle() {
                            return Some(outcome);
                        }
                        let is_zero = self.cache.cell_at(coords).is_some_and(|cell| {
                            cell.revealed && !cell.mine && cell.adjacent_mines == 0
                        });
                        if is_zero {
                            self.sequencer.expand(&tag, coords, &mut self.cache).await;
                            return self.settle();
                        }
                        None
                    }
                    Err(err) => {
                        log::error!("reveal at {coords:?} failed: {err}");
                        None
                    }
                }
            }
        }
    }

    pub fn clear_history(&mut self) {
        self.history.clear();
        if let Some(store) = &self.store {
            if let Err(err) = store.clear() {
                log::error!("could not clear history: {err}");
            }
        }
    }

    /// Guarded cache replacement: a response tagged with a game id that no
    /// longer matches the active session is dropped instead of overwriting
    /// the fresh session's cache.
    fn apply(&mut self, tag: &str, snapshot: BoardSnapshot) -> bool {
        if !self.gate.accepts(tag) {
            log::debug!("dropping stale snapshot for game {tag:?}");
            return false;
        }
        self.cache.replace(snapshot);
        true
    }

    fn settle(&mut self) -> Option<GameOutcome> {
        let outcome = self.gate.settle(&self.cache)?;
        self.ticker.stop();
        if outcome.is_won() {
            self.cache.mark_won();
        }
        self.record(outcome);
        Some(outcome)
    }

    /// Append exactly one record for the finished game and rewrite the
    /// persisted log
    fn record(&mut self, outcome: GameOutcome) {
        let Some(snapshot) = self.cache.get() else {
            return;
        };
        let now = Utc::now();
        let record = SessionRecord {
            id: format!("game_{:x}", now.timestamp_millis()),
            level: self.level.name.clone(),
            result: outcome,
            duration: self.gate.elapsed_secs(),
            clicks: self.gate.clicks(),
            date: now,
            size: format!("{}x{}", snapshot.rows, snapshot.cols),
            mines: snapshot.total_mines,
        };
        self.history.push(record);
        if let Some(store) = &self.store {
            if let Err(err) = store.save(&self.history) {
                log::error!("could not save history: {err}");
            }
        }
    }

    fn start_ticker(&mut self) {
        if let Some(on_tick) = &self.on_tick {
            let on_tick = Arc::clone(on_tick);
            self.ticker.start(move || on_tick());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::MemoryTransport;

    fn snapshot_1x2() -> BoardSnapshot {
        BoardSnapshot {
            rows: 1,
            cols: 2,
            total_mines: 0,
            game_over: false,
            won: false,
            cells: vec![
                varredor_core::Cell {
                    row: 0,
                    column: 0,
                    mine: false,
                    flagged: false,
                    adjacent_mines: 0,
                    revealed: true,
                },
                varredor_core::Cell {
                    row: 0,
                    column: 1,
                    mine: false,
                    flagged: false,
                    adjacent_mines: 0,
                    revealed: false,
                },
            ],
        }
    }

    #[tokio::test]
    async fn stale_snapshots_never_replace_the_cache() {
        let transport = Arc::new(MemoryTransport::new());
        transport.stage_mines(&[(1, 1)]).await;
        let mut session = GameSession::new(transport);
        session.new_game(GameLevel::custom(2, 2, 1)).await.unwrap();
        let fresh = session.board().unwrap().clone();

        // a late response from a previous game carries a stale tag
        assert!(!session.apply("stale-id", snapshot_1x2()));
        assert_eq!(session.board(), Some(&fresh));

        let tag = session.gate.game_id().to_owned();
        assert!(session.apply(&tag, snapshot_1x2()));
        assert_eq!(session.board().map(|board| board.size()), Some((1, 2)));
    }

    #[tokio::test]
    async fn new_game_replaces_the_session_identity() {
        let transport = Arc::new(MemoryTransport::new());
        transport.stage_mines(&[(0, 0)]).await;
        let mut session = GameSession::new(transport);

        session.new_game(GameLevel::custom(2, 2, 1)).await.unwrap();
        let first_id = session.gate.game_id().to_owned();
        let outcome = session.click((1, 1), ClickInput::reveal()).await;
        assert_eq!(outcome, None);
        assert_eq!(session.clicks(), 1);

        session.new_game(GameLevel::custom(2, 2, 1)).await.unwrap();
        assert_ne!(session.gate.game_id(), first_id);
        assert_eq!(session.clicks(), 0);
        assert!(session.state().is_initial());
        assert!(!session.gate.accepts(&first_id));
    }

    #[tokio::test]
    async fn invalid_levels_never_reach_the_transport() {
        let transport = Arc::new(MemoryTransport::new());
        let mut session = GameSession::new(Arc::clone(&transport) as Arc<dyn BoardTransport>);
        assert!(session.new_game(GameLevel::custom(3, 3, 9)).await.is_err());
        assert!(session.board().is_none());
    }
}
