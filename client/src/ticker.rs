use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Owned handle for the once-per-second session ticker.
///
/// At most one tick task is live at a time: `start` cancels the previous
/// task before spawning the next, and `stop` or dropping the handle aborts
/// it deterministically.
#[derive(Debug, Default)]
pub struct Ticker {
    handle: Option<JoinHandle<()>>,
}

impl Ticker {
    pub const PERIOD: Duration = Duration::from_secs(1);

    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|handle| !handle.is_finished())
    }

    pub fn start<F>(&mut self, mut on_tick: F)
    where
        F: FnMut() + Send + 'static,
    {
        self.stop();
        log::trace!("ticker started");
        self.handle = Some(tokio::spawn(async move {
            let mut interval = time::interval(Self::PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // the first tick of a tokio interval resolves immediately
            interval.tick().await;
            loop {
                interval.tick().await;
                on_tick();
            }
        }));
    }

    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
            log::trace!("ticker stopped");
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[tokio::test(start_paused = true)]
    async fn ticks_once_per_second_until_stopped() {
        let count = Arc::new(AtomicU32::new(0));
        let mut ticker = Ticker::new();
        {
            let count = Arc::clone(&count);
            ticker.start(move || {
                count.fetch_add(1, Ordering::Relaxed);
            });
        }
        assert!(ticker.is_running());

        time::sleep(Duration::from_millis(3500)).await;
        let ticked = count.load(Ordering::Relaxed);
        assert!((3..=4).contains(&ticked), "got {ticked} ticks");

        ticker.stop();
        assert!(!ticker.is_running());
        time::sleep(Duration::from_secs(2)).await;
        assert_eq!(count.load(Ordering::Relaxed), ticked);
    }

    #[tokio::test(start_paused = true)]
    async fn start_cancels_the_previous_task() {
        let first = Arc::new(AtomicU32::new(0));
        let second = Arc::new(AtomicU32::new(0));
        let mut ticker = Ticker::new();
        {
            let first = Arc::clone(&first);
            ticker.start(move || {
                first.fetch_add(1, Ordering::Relaxed);
            });
        }
        {
            let second = Arc::clone(&second);
            ticker.start(move || {
                second.fetch_add(1, Ordering::Relaxed);
            });
        }

        time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(first.load(Ordering::Relaxed), 0);
        assert!(second.load(Ordering::Relaxed) >= 2);
    }
}
