use std::collections::{HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use futures_util::stream::{FuturesUnordered, StreamExt};
use varredor_core::{BoardCache, BoardSnapshot, Coord2};

use crate::transport::BoardTransport;

/// Client-driven flood fill for zero-adjacency reveals.
///
/// The server reveals one cell per call, so when a revealed cell comes back
/// with zero adjacent mines the client itself requests each hidden safe
/// neighbor, and keeps expanding through any neighbor that also turns out
/// to be zero. Waves are processed from an explicit worklist; recursion
/// never crosses an await point, so a full-board flood fill is bounded by
/// the visited set rather than call depth.
pub struct AutoRevealSequencer {
    transport: Arc<dyn BoardTransport>,
    wave_delay: Duration,
}

impl AutoRevealSequencer {
    /// Pause between waves, letting the cache settle between bursts of
    /// neighbor reveals
    pub const DEFAULT_WAVE_DELAY: Duration = Duration::from_millis(10);

    pub fn new(transport: Arc<dyn BoardTransport>) -> Self {
        Self {
            transport,
            wave_delay: Self::DEFAULT_WAVE_DELAY,
        }
    }

    pub fn with_wave_delay(mut self, wave_delay: Duration) -> Self {
        self.wave_delay = wave_delay;
        self
    }

    /// Expand from `origin` (a revealed zero-adjacency cell) until no
    /// zero-adjacency frontier remains.
    ///
    /// Neighbor eligibility is decided against the cached snapshot at
    /// inspection time: already revealed, flagged, and mine cells are never
    /// requested. All reveals of one wave run as independent concurrent
    /// calls and each response replaces the cache as it arrives, in
    /// completion order; no ordering across a wave is reconstructed. A
    /// failed neighbor reveal is logged and skipped, the rest of the wave
    /// proceeds.
    pub(crate) async fn expand(&self, game_id: &str, origin: Coord2, cache: &mut BoardCache) {
        let Some(size) = cache.get().map(BoardSnapshot::size) else {
            return;
        };

        // cells whose neighbors were already requested; each cell triggers
        // expansion at most once
        let mut expanded: HashSet<Coord2> = HashSet::new();
        let mut frontier: VecDeque<Coord2> = VecDeque::from([origin]);
        log::trace!("starting auto-reveal expansion from {origin:?}");

        while !frontier.is_empty() {
            let mut targets: Vec<Coord2> = Vec::new();
            let mut requested: HashSet<Coord2> = HashSet::new();
            while let Some(source) = frontier.pop_front() {
                if !expanded.insert(source) {
                    continue;
                }
                for pos in varredor_core::neighbors(source, size) {
                    if !requested.insert(pos) {
                        continue;
                    }
                    let Some(cell) = cache.cell_at(pos) else {
                        continue;
                    };
                    if cell.revealed || cell.flagged || cell.mine {
                        continue;
                    }
                    targets.push(pos);
                }
            }
            if targets.is_empty() {
                break;
            }
            log::trace!("auto-reveal wave of {} cells", targets.len());

            let mut inflight: FuturesUnordered<_> = targets
                .into_iter()
                .map(|(row, col)| {
                    let transport = Arc::clone(&self.transport);
                    let game_id = game_id.to_owned();
                    async move {
                        let result = transport.reveal(&game_id, row, col).await;
                        ((row, col), result)
                    }
                })
                .collect();

            while let Some((pos, result)) = inflight.next().await {
                match result {
                    Ok(snapshot) => {
                        cache.replace(snapshot);
                        let is_zero = cache
                            .cell_at(pos)
                            .is_some_and(|cell| cell.revealed && cell.adjacent_mines == 0);
                        if is_zero {
                            frontier.push_back(pos);
                        }
                    }
                    Err(err) => log::error!("auto-reveal of {pos:?} failed: {err}"),
                }
            }

            if !frontier.is_empty() {
                tokio::time::sleep(self.wave_delay).await;
            }
        }
        log::trace!("auto-reveal expansion settled, {} cells expanded", expanded.len());
    }
}
