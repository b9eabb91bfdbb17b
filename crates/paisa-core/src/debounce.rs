//! Trailing-edge debounce for coalescing bursts of updates
//!
//! The live store subscription can deliver several snapshots in quick
//! succession (batch inserts, budget edits while typing). Re-aggregating on
//! each one is wasted work, so recomputes are funneled through a
//! [`Debouncer`]: pokes within the quiet window collapse into a single fire
//! after the burst, and the final poke of a burst always produces a fire.
//!
//! Dropping the debouncer aborts its task, so no timer survives session
//! teardown.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Coalescing trailing-edge scheduler
pub struct Debouncer {
    poke_tx: mpsc::UnboundedSender<()>,
    task: JoinHandle<()>,
}

impl Debouncer {
    /// Create a debouncer with the given quiet window
    ///
    /// Returns the handle and the fire channel: one `()` arrives per burst,
    /// after `window` of quiet.
    pub fn new(window: Duration) -> (Self, mpsc::UnboundedReceiver<()>) {
        let (poke_tx, mut poke_rx) = mpsc::unbounded_channel::<()>();
        let (fire_tx, fire_rx) = mpsc::unbounded_channel::<()>();

        let task = tokio::spawn(async move {
            // Outer loop: wait for the first poke of a burst
            while poke_rx.recv().await.is_some() {
                // Inner loop: restart the window on every further poke
                loop {
                    let timer = tokio::time::sleep(window);
                    tokio::pin!(timer);
                    tokio::select! {
                        _ = &mut timer => break,
                        more = poke_rx.recv() => {
                            if more.is_none() {
                                // Sender gone mid-burst: still deliver the
                                // trailing fire before exiting
                                let _ = fire_tx.send(());
                                return;
                            }
                        }
                    }
                }
                if fire_tx.send(()).is_err() {
                    return;
                }
            }
        });

        (Self { poke_tx, task }, fire_rx)
    }

    /// Signal that something changed
    pub fn poke(&self) {
        let _ = self.poke_tx.send(());
    }
}

impl Drop for Debouncer {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn burst_collapses_to_one_fire() {
        let (debouncer, mut fired) = Debouncer::new(Duration::from_millis(250));
        for _ in 0..5 {
            debouncer.poke();
        }

        assert!(fired.recv().await.is_some());

        // No second fire without another poke
        let extra = tokio::time::timeout(Duration::from_secs(1), fired.recv()).await;
        assert!(extra.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn trailing_fire_always_runs() {
        let (debouncer, mut fired) = Debouncer::new(Duration::from_millis(250));
        debouncer.poke();
        assert!(fired.recv().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn separate_bursts_fire_separately() {
        let (debouncer, mut fired) = Debouncer::new(Duration::from_millis(250));

        debouncer.poke();
        assert!(fired.recv().await.is_some());

        debouncer.poke();
        debouncer.poke();
        assert!(fired.recv().await.is_some());
    }

    #[tokio::test(start_paused = true)]
    async fn drop_stops_the_task() {
        let (debouncer, mut fired) = Debouncer::new(Duration::from_millis(250));
        debouncer.poke();
        drop(debouncer);

        // Channel closes without an un-asked-for fire arriving later
        let outcome = tokio::time::timeout(Duration::from_secs(1), fired.recv()).await;
        match outcome {
            Ok(None) => {}      // task aborted, sender dropped
            Ok(Some(())) => {}  // fire already in flight when dropped; fine
            Err(_) => panic!("fire channel neither closed nor delivered"),
        }
    }
}
