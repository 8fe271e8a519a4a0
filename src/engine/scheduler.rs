//! Repeating-task abstraction behind the sampling loop.
//!
//! `start` on a running scheduler replaces the old task, so there is never
//! more than one loop. Ticks are delivered as [`Event::Tick`] messages and
//! handled by the controller's owner, never on the ticker thread itself.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use super::Event;

pub trait Scheduler {
    /// Begin firing every `period`, replacing any running task.
    fn start(&mut self, period: Duration);
    /// Cancel the running task. No-op when idle.
    fn stop(&mut self);
    fn is_running(&self) -> bool;
}

/// Called after each tick is posted (e.g. to wake an idle UI).
pub type Waker = Arc<dyn Fn() + Send + Sync>;

struct Ticker {
    cancelled: Arc<AtomicBool>,
    thread: JoinHandle<()>,
}

/// Background ticker thread posting into the controller's event channel.
pub struct ThreadScheduler {
    tx: mpsc::Sender<Event>,
    waker: Option<Waker>,
    ticker: Option<Ticker>,
}

impl ThreadScheduler {
    pub fn new(tx: mpsc::Sender<Event>) -> Self {
        Self {
            tx,
            waker: None,
            ticker: None,
        }
    }

    pub fn with_waker(mut self, waker: Waker) -> Self {
        self.waker = Some(waker);
        self
    }
}

impl Scheduler for ThreadScheduler {
    fn start(&mut self, period: Duration) {
        self.stop();

        let cancelled = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&cancelled);
        let tx = self.tx.clone();
        let waker = self.waker.clone();

        let thread = thread::spawn(move || loop {
            let deadline = Instant::now() + period;
            loop {
                if flag.load(Ordering::Acquire) {
                    return;
                }
                let now = Instant::now();
                if now >= deadline {
                    break;
                }
                thread::park_timeout(deadline - now);
            }
            if flag.load(Ordering::Acquire) || tx.send(Event::Tick).is_err() {
                return;
            }
            if let Some(ref wake) = waker {
                wake();
            }
        });

        self.ticker = Some(Ticker { cancelled, thread });
        log::info!(
            "Token Gauge: Token counting started with {}-second intervals",
            period.as_secs()
        );
    }

    fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.cancelled.store(true, Ordering::Release);
            ticker.thread.thread().unpark();
            log::info!("Token Gauge: Token counting stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.ticker.is_some()
    }
}

impl Drop for ThreadScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Scheduler with no clock: records calls, the test fires ticks by hand.
#[derive(Debug, Default)]
pub struct ManualScheduler {
    running: bool,
    pub starts: Vec<Duration>,
    pub stops: usize,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }
}

impl Scheduler for ManualScheduler {
    fn start(&mut self, period: Duration) {
        self.stop();
        self.running = true;
        self.starts.push(period);
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.stops += 1;
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn manual_restart_stops_previous_task() {
        let mut s = ManualScheduler::new();
        s.stop();
        assert_eq!(s.stops, 0);
        s.start(Duration::from_secs(3));
        s.start(Duration::from_secs(3));
        assert_eq!(s.stops, 1);
        assert_eq!(s.starts.len(), 2);
        assert!(s.is_running());
    }

    #[test]
    fn thread_scheduler_ticks_and_wakes() {
        let (tx, rx) = mpsc::channel();
        let woken = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&woken);
        let mut s = ThreadScheduler::new(tx).with_waker(Arc::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        s.start(Duration::from_millis(5));
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(Event::Tick));
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)), Ok(Event::Tick));
        s.stop();
        assert!(!s.is_running());
        assert!(woken.load(Ordering::SeqCst) >= 2);
    }

    #[test]
    fn stopped_scheduler_goes_quiet() {
        let (tx, rx) = mpsc::channel();
        let mut s = ThreadScheduler::new(tx);
        s.start(Duration::from_millis(200));
        s.stop();
        assert!(rx.recv_timeout(Duration::from_millis(600)).is_err());
    }

    #[test]
    fn thread_restart_leaves_a_single_ticker() {
        let (tx, rx) = mpsc::channel();
        let mut s = ThreadScheduler::new(tx);
        let period = Duration::from_millis(50);
        s.start(period);
        s.start(period);
        assert!(s.is_running());

        let window = Duration::from_millis(525);
        thread::sleep(window);
        s.stop();

        // One ticker fits at most ten periods in the window; two would
        // post about twice that.
        let ticks = rx.try_iter().filter(|e| *e == Event::Tick).count();
        let single = (window.as_millis() / period.as_millis()) as usize;
        assert!(ticks >= 1, "no ticks at all");
        assert!(ticks <= single + 1, "{ticks} ticks, expected at most {}", single + 1);
    }
}
