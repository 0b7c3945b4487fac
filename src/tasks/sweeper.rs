//! Expiration Sweeper Task
//!
//! Background task that periodically reclaims expired cache entries in heap order.

use std::hash::Hash;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info};

use crate::cache::CacheStore;

/// Shortest interval the sweeper accepts.
pub const MIN_SWEEP_INTERVAL: Duration = Duration::from_millis(1);

/// Store shared between the cache handle and its sweeper.
pub type SharedStore<K, V> = Arc<RwLock<CacheStore<K, V>>>;

// == Sweeper State ==
/// Lifecycle of the sweeper task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweeperState {
    /// Timer active, waiting for the next tick or a stop request
    Running,
    /// Stop requested, leaving the loop
    Draining,
    /// Loop exited and timer released
    Stopped,
}

impl SweeperState {
    fn from_u8(raw: u8) -> Self {
        match raw {
            0 => SweeperState::Running,
            1 => SweeperState::Draining,
            _ => SweeperState::Stopped,
        }
    }
}

// == Sweeper Handle ==
/// Owner side of a running sweeper.
///
/// Dropping the handle closes the stop channel, which also ends the task.
#[derive(Debug)]
pub struct SweeperHandle {
    stop_tx: watch::Sender<bool>,
    state: Arc<AtomicU8>,
    task: JoinHandle<()>,
}

impl SweeperHandle {
    /// Current lifecycle state.
    pub fn state(&self) -> SweeperState {
        SweeperState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Requests a stop and waits until the task has exited.
    ///
    /// A tick already in progress completes first.
    pub async fn shutdown(self) {
        // Fails only if the task is already gone; the join below still reports it.
        let _ = self.stop_tx.send(true);

        if let Err(e) = self.task.await {
            error!("Sweeper task ended abnormally: {}", e);
            self.state
                .store(SweeperState::Stopped as u8, Ordering::Release);
        }
    }
}

/// Spawns a background task that sweeps expired entries every `interval`.
///
/// Each tick takes the store's write lock once and pops expired entries off
/// the heap root until it reaches one that is still live.
///
/// # Panics
/// Panics if called outside of a Tokio runtime.
pub fn spawn_sweeper<K, V>(store: SharedStore<K, V>, interval: Duration) -> SweeperHandle
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let interval = interval.max(MIN_SWEEP_INTERVAL);
    let (stop_tx, mut stop_rx) = watch::channel(false);
    let state = Arc::new(AtomicU8::new(SweeperState::Running as u8));
    let task_state = Arc::clone(&state);

    let task = tokio::spawn(async move {
        info!("Starting expiration sweeper with interval of {:?}", interval);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                biased;
                // A stop request or a dropped handle both end the loop
                _ = stop_rx.changed() => break,
                _ = ticker.tick() => {
                    let removed = sweep(&store);
                    if removed > 0 {
                        info!("Expiration sweep: removed {} expired entries", removed);
                    } else {
                        debug!("Expiration sweep: no expired entries found");
                    }
                }
            }
        }

        task_state.store(SweeperState::Draining as u8, Ordering::Release);
        drop(ticker);
        task_state.store(SweeperState::Stopped as u8, Ordering::Release);
        info!("Expiration sweeper stopped");
    });

    SweeperHandle {
        stop_tx,
        state,
        task,
    }
}

fn sweep<K, V>(store: &RwLock<CacheStore<K, V>>) -> usize
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    store
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .remove_expired()
}
