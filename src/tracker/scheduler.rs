use std::future::Future;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollState {
    /// No timer running
    Idle,
    /// Timer running at the configured period
    Polling,
}

struct Ticker {
    handle: JoinHandle<()>,
    stop_tx: oneshot::Sender<()>,
}

/// Owns the single repeating poll timer.
///
/// At most one ticker exists at a time. Stopping lets a tick that is already
/// running finish; only the wait for the next tick is interrupted.
pub struct PollScheduler {
    period: Duration,
    ticker: Option<Ticker>,
}

impl PollScheduler {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            ticker: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn state(&self) -> PollState {
        if self.ticker.is_some() {
            PollState::Polling
        } else {
            PollState::Idle
        }
    }

    /// Starts calling `tick` every period. Returns false if already polling.
    pub fn start<F, Fut>(&mut self, mut tick: F) -> bool
    where
        F: FnMut() -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        if self.ticker.is_some() {
            return false;
        }

        let period = self.period;
        let (stop_tx, mut stop_rx) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + period, period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                // a stop that arrived during a slow tick wins over a due tick
                tokio::select! {
                    biased;
                    _ = &mut stop_rx => break,
                    _ = interval.tick() => tick().await,
                }
            }
            tracing::debug!("Poll ticker stopped");
        });

        tracing::debug!("Poll ticker started ({:?})", period);
        self.ticker = Some(Ticker { handle, stop_tx });
        true
    }

    /// Stops the timer. Returns false if it was not running.
    pub fn stop(&mut self) -> bool {
        match self.ticker.take() {
            Some(ticker) => {
                let _ = ticker.stop_tx.send(());
                drop(ticker.handle);
                true
            }
            None => false,
        }
    }
}

impl Drop for PollScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn counting_tick(count: &Arc<AtomicUsize>) -> impl FnMut() -> std::future::Ready<()> + Send + 'static {
        let count = count.clone();
        move || {
            count.fetch_add(1, Ordering::SeqCst);
            std::future::ready(())
        }
    }

    #[test]
    fn test_new_scheduler_is_idle() {
        let scheduler = PollScheduler::new(Duration::from_secs(1));
        assert_eq!(scheduler.state(), PollState::Idle);
        assert_eq!(scheduler.period(), Duration::from_secs(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_once_per_period() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut scheduler = PollScheduler::new(Duration::from_secs(1));
        assert!(scheduler.start(counting_tick(&count)));
        assert_eq!(scheduler.state(), PollState::Polling);

        time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_start_does_not_add_timer() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut scheduler = PollScheduler::new(Duration::from_secs(1));
        assert!(scheduler.start(counting_tick(&count)));
        assert!(!scheduler.start(counting_tick(&count)));

        time::sleep(Duration::from_millis(2500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_halts_ticks() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut scheduler = PollScheduler::new(Duration::from_secs(1));
        scheduler.start(counting_tick(&count));

        time::sleep(Duration::from_millis(1500)).await;
        assert!(scheduler.stop());
        assert_eq!(scheduler.state(), PollState::Idle);
        assert!(!scheduler.stop());

        time::sleep(Duration::from_secs(5)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_lets_running_tick_finish() {
        let finished = Arc::new(AtomicUsize::new(0));
        let mut scheduler = PollScheduler::new(Duration::from_secs(1));
        let done = finished.clone();
        scheduler.start(move || {
            let done = done.clone();
            async move {
                time::sleep(Duration::from_millis(500)).await;
                done.fetch_add(1, Ordering::SeqCst);
            }
        });

        // first tick fires at 1s and is mid-flight at 1.2s
        time::sleep(Duration::from_millis(1200)).await;
        scheduler.stop();
        time::sleep(Duration::from_secs(3)).await;
        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_tick_after_stop_during_overrunning_tick() {
        // ticks outlast the period, so the next tick is already due when
        // the running one returns
        for _ in 0..20 {
            let started = Arc::new(AtomicUsize::new(0));
            let mut scheduler = PollScheduler::new(Duration::from_secs(1));
            let counter = started.clone();
            scheduler.start(move || {
                let counter = counter.clone();
                async move {
                    counter.fetch_add(1, Ordering::SeqCst);
                    time::sleep(Duration::from_millis(1500)).await;
                }
            });

            time::sleep(Duration::from_millis(1200)).await;
            assert!(scheduler.stop());
            time::sleep(Duration::from_secs(5)).await;
            assert_eq!(started.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_stop() {
        let count = Arc::new(AtomicUsize::new(0));
        let mut scheduler = PollScheduler::new(Duration::from_secs(1));
        scheduler.start(counting_tick(&count));
        scheduler.stop();
        assert!(scheduler.start(counting_tick(&count)));

        time::sleep(Duration::from_millis(1500)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }
}
