use crate::Result;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::time::Duration;
use tokio::task::JoinHandle;

/// One complete retraining run. Called from a blocking thread.
pub trait Retrain: Send + Sync + 'static {
    fn retrain(&self) -> Result<()>;
}

/// Outcome of asking the scheduler to run.
#[derive(Debug)]
pub enum Tick {
    /// A run began on a blocking thread.
    Started(JoinHandle<()>),
    /// A run was already in flight; nothing was queued.
    Skipped,
}

/// Runs a [`Retrain`] job on a fixed interval, never two at once.
///
/// The idle/running state is a single `AtomicBool`. A tick that finds a run
/// in flight is dropped rather than queued. Started runs are never
/// cancelled: shutdown stops the timer and then waits for the current run.
pub struct Scheduler<R: Retrain> {
    job: Arc<R>,
    running: Arc<AtomicBool>,
    every: Duration,
    immediate: bool,
}

/// Returns the scheduler to idle however the run ends, panics included.
struct Running(Arc<AtomicBool>);

impl Drop for Running {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<R: Retrain> Scheduler<R> {
    pub fn new(job: R, every: Duration) -> Self {
        Self {
            job: Arc::new(job),
            running: Arc::new(AtomicBool::new(false)),
            every,
            immediate: false,
        }
    }
    /// Also run once right away instead of waiting a full interval.
    pub fn immediate(mut self, immediate: bool) -> Self {
        self.immediate = immediate;
        self
    }
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    pub fn tick(&self) -> Tick {
        if self
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            log::warn!("retrain still running, skipping tick");
            return Tick::Skipped;
        }
        let guard = Running(self.running.clone());
        let job = self.job.clone();
        Tick::Started(tokio::task::spawn_blocking(move || {
            let _guard = guard;
            let start = std::time::Instant::now();
            log::info!("{:<32}{:<32}", "retrain started", chrono::Utc::now());
            match job.retrain() {
                Ok(()) => log::info!("{:<32}{:<32?}", "retrain finished", start.elapsed()),
                Err(e) => log::error!("retrain failed, previous model kept: {}", e),
            }
        }))
    }

    /// Ticks every interval until `shutdown` resolves. The first scheduled
    /// tick fires one interval after start; ticks missed while the process
    /// was suspended are skipped rather than replayed.
    pub async fn run(&self, shutdown: impl Future<Output = ()>) {
        use tokio::time::Instant;
        use tokio::time::MissedTickBehavior;
        let mut interval = tokio::time::interval_at(Instant::now() + self.every, self.every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        log::info!("{:<32}{:<32?}", "retrain scheduled every", self.every);
        let mut last = None;
        if self.immediate {
            last = Self::started(self.tick()).or(last);
        }
        tokio::pin!(shutdown);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = interval.tick() => last = Self::started(self.tick()).or(last),
            }
        }
        if let Some(handle) = last.filter(|h: &JoinHandle<()>| !h.is_finished()) {
            log::info!("waiting for in-flight retrain before exit");
            if let Err(e) = handle.await {
                log::error!("retrain task aborted: {}", e);
            }
        }
    }

    fn started(tick: Tick) -> Option<JoinHandle<()>> {
        match tick {
            Tick::Started(handle) => Some(handle),
            Tick::Skipped => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::atomic::AtomicUsize;

    /// Counts runs, each taking `pause`.
    struct Counter {
        runs: Arc<AtomicUsize>,
        pause: Duration,
    }

    impl Retrain for Counter {
        fn retrain(&self) -> Result<()> {
            std::thread::sleep(self.pause);
            self.runs.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn counter(pause: Duration) -> (Counter, Arc<AtomicUsize>) {
        let runs = Arc::new(AtomicUsize::new(0));
        (
            Counter {
                runs: runs.clone(),
                pause,
            },
            runs,
        )
    }

    #[tokio::test]
    async fn overlapping_tick_is_skipped() {
        let (job, runs) = counter(Duration::from_millis(200));
        let scheduler = Scheduler::new(job, Duration::from_secs(3600));
        let Tick::Started(handle) = scheduler.tick() else {
            panic!("idle scheduler must start");
        };
        assert!(scheduler.is_running());
        assert!(matches!(scheduler.tick(), Tick::Skipped));
        handle.await.unwrap();
        assert!(!scheduler.is_running());
        let Tick::Started(handle) = scheduler.tick() else {
            panic!("finished run must release the scheduler");
        };
        handle.await.unwrap();
        assert_eq!(runs.load(Ordering::SeqCst), 2);
    }

    struct Exploding;

    impl Retrain for Exploding {
        fn retrain(&self) -> Result<()> {
            panic!("training blew up")
        }
    }

    struct Failing;

    impl Retrain for Failing {
        fn retrain(&self) -> Result<()> {
            Err(Error::Training("no rows".to_string()))
        }
    }

    #[tokio::test]
    async fn failures_return_to_idle() {
        let scheduler = Scheduler::new(Exploding, Duration::from_secs(3600));
        let Tick::Started(handle) = scheduler.tick() else {
            panic!("idle scheduler must start");
        };
        assert!(handle.await.is_err());
        assert!(!scheduler.is_running());
        let scheduler = Scheduler::new(Failing, Duration::from_secs(3600));
        let Tick::Started(handle) = scheduler.tick() else {
            panic!("idle scheduler must start");
        };
        handle.await.unwrap();
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn immediate_run_completes_before_shutdown_returns() {
        let (job, runs) = counter(Duration::from_millis(100));
        let scheduler = Scheduler::new(job, Duration::from_secs(3600)).immediate(true);
        scheduler.run(tokio::time::sleep(Duration::from_millis(10))).await;
        assert_eq!(runs.load(Ordering::SeqCst), 1);
        assert!(!scheduler.is_running());
    }

    #[tokio::test]
    async fn interval_fires_until_shutdown() {
        let (job, runs) = counter(Duration::ZERO);
        let scheduler = Scheduler::new(job, Duration::from_millis(20));
        scheduler.run(tokio::time::sleep(Duration::from_millis(150))).await;
        assert!(runs.load(Ordering::SeqCst) >= 2);
    }
}
