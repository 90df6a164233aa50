//! Request coalescing with a debounce window.
//!
//! Concurrent requests for the same entity share one waiter queue, and
//! distinct entities requested within one quiescence window are sent to the
//! remote source as a single batch. Every newly queued entity restarts the
//! window, so a burst is dispatched once it goes quiet.
//!
//! The pending map and the timer deadline share one lock: disarming the
//! timer and taking the batch happen in the same critical section, so a
//! request can never be both inside an in-flight batch and still pending.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, trace};

use crate::domain::models::{EntityId, PronounCode};
use crate::domain::ports::PronounSource;

use super::batch_dispatcher::{Batch, BatchDispatcher};

/// What the debounce timer wants its driver to do next.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    Idle,
    /// Armed; sleep until the deadline and poll again.
    Waiting(Instant),
    Due,
}

/// Debounce deadline owned by the coalescer.
#[derive(Debug)]
pub struct DebounceTimer {
    interval: Duration,
    deadline: Option<Instant>,
}

impl DebounceTimer {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            deadline: None,
        }
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Arm an idle timer. Returns `false` if it was already armed, in which
    /// case the deadline is left alone.
    pub fn schedule(&mut self, now: Instant) -> bool {
        if self.is_armed() {
            return false;
        }
        self.deadline = Some(now + self.interval);
        true
    }

    /// Push an armed timer's deadline out to a full interval from `now`.
    pub fn reset(&mut self, now: Instant) {
        if self.is_armed() {
            self.deadline = Some(now + self.interval);
        }
    }

    pub fn poll(&self, now: Instant) -> TimerState {
        match self.deadline {
            None => TimerState::Idle,
            Some(deadline) if deadline <= now => TimerState::Due,
            Some(deadline) => TimerState::Waiting(deadline),
        }
    }

    /// Disarm the timer; the caller dispatches.
    pub fn fire(&mut self) {
        self.deadline = None;
    }
}

struct CoalescerState {
    pending: Batch,
    timer: DebounceTimer,
}

enum TimerStep {
    Sleep(Instant),
    Dispatch(Batch),
    Stop,
}

pub struct RequestCoalescer<S: PronounSource> {
    state: Mutex<CoalescerState>,
    dispatcher: BatchDispatcher<S>,
}

impl<S: PronounSource + 'static> RequestCoalescer<S> {
    pub fn new(dispatcher: BatchDispatcher<S>, quiescence: Duration) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(CoalescerState {
                pending: Batch::new(),
                timer: DebounceTimer::new(quiescence),
            }),
            dispatcher,
        })
    }

    /// Queue a request for `id` and return the receiver its value arrives on.
    ///
    /// Must be called from within a tokio runtime: the first request of a
    /// window spawns the task that drives the timer.
    pub fn enqueue(self: &Arc<Self>, id: EntityId) -> oneshot::Receiver<Option<PronounCode>> {
        let (tx, rx) = oneshot::channel();

        let start_timer = {
            let mut state = self.lock_state();
            if let Some(waiters) = state.pending.get_mut(&id) {
                waiters.push(tx);
                trace!(entity_id = %id, waiters = waiters.len(), "joined pending request");
                return rx;
            }

            state.pending.insert(id, vec![tx]);
            let now = Instant::now();
            if state.timer.is_armed() {
                state.timer.reset(now);
                false
            } else {
                state.timer.schedule(now)
            }
        };

        if start_timer {
            let this = Arc::clone(self);
            tokio::spawn(async move { this.drive_timer().await });
        }
        rx
    }

    /// Number of distinct entities waiting for the next dispatch.
    pub fn pending_len(&self) -> usize {
        self.lock_state().pending.len()
    }

    async fn drive_timer(&self) {
        loop {
            let step = {
                let mut state = self.lock_state();
                match state.timer.poll(Instant::now()) {
                    TimerState::Idle => TimerStep::Stop,
                    TimerState::Waiting(deadline) => TimerStep::Sleep(deadline),
                    TimerState::Due => {
                        state.timer.fire();
                        TimerStep::Dispatch(std::mem::take(&mut state.pending))
                    }
                }
            };

            match step {
                TimerStep::Sleep(deadline) => tokio::time::sleep_until(deadline).await,
                TimerStep::Dispatch(batch) => {
                    debug!(batch_size = batch.len(), "quiescence window elapsed");
                    self.dispatcher.dispatch(batch).await;
                    return;
                }
                TimerStep::Stop => return,
            }
        }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, CoalescerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::mock::MockPronounSource;
    use crate::services::result_cache::ResultCache;

    const WINDOW: Duration = Duration::from_millis(50);

    fn coalescer(source: &Arc<MockPronounSource>) -> Arc<RequestCoalescer<MockPronounSource>> {
        let dispatcher = BatchDispatcher::new(source.clone(), Arc::new(ResultCache::new()));
        RequestCoalescer::new(dispatcher, WINDOW)
    }

    #[test]
    fn test_timer_lifecycle() {
        let start = Instant::now();
        let mut timer = DebounceTimer::new(WINDOW);
        assert_eq!(timer.poll(start), TimerState::Idle);

        assert!(timer.schedule(start));
        assert!(!timer.schedule(start + WINDOW));
        assert_eq!(timer.poll(start), TimerState::Waiting(start + WINDOW));
        assert_eq!(timer.poll(start + WINDOW), TimerState::Due);

        timer.reset(start + Duration::from_millis(30));
        assert_eq!(
            timer.poll(start + WINDOW),
            TimerState::Waiting(start + Duration::from_millis(80))
        );

        timer.fire();
        assert!(!timer.is_armed());
        timer.reset(start);
        assert_eq!(timer.poll(start), TimerState::Idle);
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_is_dispatched_once() {
        let source = Arc::new(MockPronounSource::new());
        source.respond("a", PronounCode::SheHer).await;
        let coalescer = coalescer(&source);

        let a1 = coalescer.enqueue(EntityId::from("a"));
        let b = coalescer.enqueue(EntityId::from("b"));
        let a2 = coalescer.enqueue(EntityId::from("a"));
        assert_eq!(coalescer.pending_len(), 2);

        assert_eq!(a1.await.unwrap(), Some(PronounCode::SheHer));
        assert_eq!(a2.await.unwrap(), Some(PronounCode::SheHer));
        assert_eq!(b.await.unwrap(), None);
        assert_eq!(
            source.calls().await,
            vec![vec![EntityId::from("a"), EntityId::from("b")]]
        );
        assert_eq!(coalescer.pending_len(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_new_key_extends_window() {
        let source = Arc::new(MockPronounSource::new());
        let coalescer = coalescer(&source);

        let first = coalescer.enqueue(EntityId::from("a"));
        tokio::time::sleep(Duration::from_millis(40)).await;
        let second = coalescer.enqueue(EntityId::from("b"));
        tokio::time::sleep(Duration::from_millis(40)).await;

        // 80ms after the first request, but only 40ms after the last one.
        assert_eq!(source.call_count().await, 0);

        first.await.unwrap();
        second.await.unwrap();
        assert_eq!(source.call_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_request_during_flight_starts_new_batch() {
        let source = Arc::new(MockPronounSource::with_latency(Duration::from_millis(200)));
        let coalescer = coalescer(&source);

        let first = coalescer.enqueue(EntityId::from("a"));
        tokio::time::sleep(WINDOW + Duration::from_millis(10)).await;
        assert_eq!(source.call_count().await, 1);
        assert_eq!(coalescer.pending_len(), 0);

        let second = coalescer.enqueue(EntityId::from("a"));
        first.await.unwrap();
        second.await.unwrap();
        assert_eq!(source.call_count().await, 2);
    }
}
