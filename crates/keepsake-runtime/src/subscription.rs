#![forbid(unsafe_code)]

//! Subscription system for timers.
//!
//! Subscriptions are declared by the model, not started by it. After every
//! update the runtime asks `Model::subscriptions()` for the current set and
//! reconciles:
//!
//! 1. Declared ids that are not running are started.
//! 2. Running ids that are no longer declared are stopped.
//! 3. Unchanged ids keep running (the new instance is discarded).
//!
//! Stopping a subscription is the only teardown a screen needs: when a screen
//! is replaced its timers stop being declared and the next reconcile stops
//! them. Timers can additionally be bound to a [`CancelToken`]; a cancelled
//! timer never emits again, even if it is still declared or already waiting.
//!
//! Every subscription also reports a [`Cadence`] so the simulator can run it
//! in virtual time without threads.

use std::collections::HashSet;
use std::sync::{Arc, Condvar, Mutex, PoisonError, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use keepsake_core::CancelToken;

/// A unique identifier for a subscription.
pub type SubId = u64;

/// Timing of a subscription, as seen by the simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cadence {
    /// Fires every interval until stopped or cancelled.
    Every(Duration),
    /// Fires once after the delay.
    After(Duration),
}

/// A subscription produces messages from an external event source.
pub trait Subscription<M: Send + 'static>: Send {
    /// Identity used for deduplication across reconciles.
    fn id(&self) -> SubId;

    /// Emit messages until `stop` is triggered or the receiver hangs up.
    ///
    /// Called on a background thread.
    fn run(&self, sender: mpsc::Sender<M>, stop: StopSignal);

    /// Timing for virtual-time execution. `None` means the simulator never
    /// fires this subscription.
    fn cadence(&self) -> Option<Cadence> {
        None
    }

    /// Produce the message for one firing, or `None` if the subscription
    /// has been cancelled.
    fn fire(&self) -> Option<M> {
        None
    }
}

/// Signal for stopping a subscription.
#[derive(Clone)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    /// Create a signal/trigger pair.
    pub(crate) fn new() -> (Self, StopTrigger) {
        let inner = Arc::new((Mutex::new(false), Condvar::new()));
        let signal = Self {
            inner: inner.clone(),
        };
        (signal, StopTrigger { inner })
    }

    pub fn is_stopped(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait for either the stop signal or a timeout.
    ///
    /// Returns `true` if stopped, `false` if the full duration elapsed.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let mut stopped = lock.lock().unwrap_or_else(PoisonError::into_inner);
        if *stopped {
            return true;
        }

        let start = Instant::now();
        let mut remaining = duration;
        loop {
            let (guard, result) = cvar
                .wait_timeout(stopped, remaining)
                .unwrap_or_else(PoisonError::into_inner);
            stopped = guard;
            if *stopped {
                return true;
            }
            if result.timed_out() {
                return false;
            }
            // Spurious wakeup.
            let elapsed = start.elapsed();
            if elapsed >= duration {
                return false;
            }
            remaining = duration - elapsed;
        }
    }
}

/// Runtime side of a [`StopSignal`].
pub(crate) struct StopTrigger {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopTrigger {
    pub(crate) fn stop(&self) {
        let (lock, cvar) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner) = true;
        cvar.notify_all();
    }
}

struct RunningSubscription {
    id: SubId,
    trigger: StopTrigger,
    thread: Option<thread::JoinHandle<()>>,
}

impl RunningSubscription {
    fn stop(mut self) {
        self.trigger.stop();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for RunningSubscription {
    fn drop(&mut self) {
        self.trigger.stop();
    }
}

/// Runs declared subscriptions on background threads.
pub(crate) struct SubscriptionManager<M: Send + 'static> {
    active: Vec<RunningSubscription>,
    sender: mpsc::Sender<M>,
    receiver: mpsc::Receiver<M>,
}

impl<M: Send + 'static> SubscriptionManager<M> {
    pub(crate) fn new() -> Self {
        let (sender, receiver) = mpsc::channel();
        Self {
            active: Vec::new(),
            sender,
            receiver,
        }
    }

    /// Start new ids, stop undeclared ones, keep the rest.
    pub(crate) fn reconcile(&mut self, subscriptions: Vec<Box<dyn Subscription<M>>>) {
        let new_ids: HashSet<SubId> = subscriptions.iter().map(|s| s.id()).collect();
        let before = self.active.len();

        let mut remaining = Vec::new();
        for running in self.active.drain(..) {
            if new_ids.contains(&running.id) {
                remaining.push(running);
            } else {
                crate::debug_trace!("stopping subscription: id={}", running.id);
                tracing::debug!(sub_id = running.id, "stopping subscription");
                running.stop();
            }
        }
        self.active = remaining;

        let mut active_ids: HashSet<SubId> = self.active.iter().map(|r| r.id).collect();
        for sub in subscriptions {
            let id = sub.id();
            if !active_ids.insert(id) {
                continue;
            }
            crate::debug_trace!("starting subscription: id={}", id);
            tracing::debug!(sub_id = id, "starting subscription");
            let (signal, trigger) = StopSignal::new();
            let sender = self.sender.clone();
            let thread = thread::spawn(move || sub.run(sender, signal));
            self.active.push(RunningSubscription {
                id,
                trigger,
                thread: Some(thread),
            });
        }

        tracing::trace!(
            active_before = before,
            active_after = self.active.len(),
            "subscription reconcile complete"
        );
    }

    pub(crate) fn drain_messages(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }

    #[inline]
    pub(crate) fn active_count(&self) -> usize {
        self.active.len()
    }

    pub(crate) fn stop_all(&mut self) {
        for running in self.active.drain(..) {
            running.stop();
        }
    }
}

impl<M: Send + 'static> Drop for SubscriptionManager<M> {
    fn drop(&mut self) {
        self.stop_all();
    }
}

type MakeMsg<M> = Box<dyn Fn() -> M + Send + Sync>;

// --- Built-in subscriptions ---

/// A repeating timer.
///
/// ```ignore
/// fn subscriptions(&self) -> Vec<Box<dyn Subscription<Msg>>> {
///     vec![Box::new(Every::with_id(TICK_ID, Duration::from_secs(1), || Msg::Tick))]
/// }
/// ```
pub struct Every<M: Send + 'static> {
    id: SubId,
    interval: Duration,
    make_msg: MakeMsg<M>,
    token: Option<CancelToken>,
}

impl<M: Send + 'static> Every<M> {
    pub fn with_id(
        id: SubId,
        interval: Duration,
        make_msg: impl Fn() -> M + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            interval,
            make_msg: Box::new(make_msg),
            token: None,
        }
    }

    /// Stop emitting once `token` is cancelled.
    #[must_use]
    pub fn cancel_on(mut self, token: CancelToken) -> Self {
        self.token = Some(token);
        self
    }

    fn cancelled(&self) -> bool {
        self.token.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

impl<M: Send + 'static> Subscription<M> for Every<M> {
    fn id(&self) -> SubId {
        self.id
    }

    fn run(&self, sender: mpsc::Sender<M>, stop: StopSignal) {
        let mut ticks: u64 = 0;
        loop {
            if stop.wait_timeout(self.interval) || self.cancelled() {
                crate::debug_trace!("every stopped: id={}, sent {} ticks", self.id, ticks);
                break;
            }
            ticks += 1;
            if sender.send((self.make_msg)()).is_err() {
                break;
            }
        }
    }

    fn cadence(&self) -> Option<Cadence> {
        Some(Cadence::Every(self.interval))
    }

    fn fire(&self) -> Option<M> {
        (!self.cancelled()).then(|| (self.make_msg)())
    }
}

/// A one-shot timer: waits `delay`, emits once, then finishes.
pub struct After<M: Send + 'static> {
    id: SubId,
    delay: Duration,
    make_msg: MakeMsg<M>,
    token: Option<CancelToken>,
}

impl<M: Send + 'static> After<M> {
    pub fn with_id(
        id: SubId,
        delay: Duration,
        make_msg: impl Fn() -> M + Send + Sync + 'static,
    ) -> Self {
        Self {
            id,
            delay,
            make_msg: Box::new(make_msg),
            token: None,
        }
    }

    /// Never emit if `token` is cancelled before the delay elapses.
    #[must_use]
    pub fn cancel_on(mut self, token: CancelToken) -> Self {
        self.token = Some(token);
        self
    }

    fn cancelled(&self) -> bool {
        self.token.as_ref().is_some_and(CancelToken::is_cancelled)
    }
}

impl<M: Send + 'static> Subscription<M> for After<M> {
    fn id(&self) -> SubId {
        self.id
    }

    fn run(&self, sender: mpsc::Sender<M>, stop: StopSignal) {
        if stop.wait_timeout(self.delay) || self.cancelled() {
            crate::debug_trace!("after cancelled: id={}", self.id);
            return;
        }
        let _ = sender.send((self.make_msg)());
    }

    fn cadence(&self) -> Option<Cadence> {
        Some(Cadence::After(self.delay))
    }

    fn fire(&self) -> Option<M> {
        (!self.cancelled()).then(|| (self.make_msg)())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum TestMsg {
        Tick,
        Fired,
    }

    #[test]
    fn stop_signal_wait_returns_true_when_stopped() {
        let (signal, trigger) = StopSignal::new();
        assert!(!signal.is_stopped());
        trigger.stop();
        assert!(signal.is_stopped());
        assert!(signal.wait_timeout(Duration::from_millis(100)));
    }

    #[test]
    fn stop_signal_wait_returns_false_on_timeout() {
        let (signal, _trigger) = StopSignal::new();
        assert!(!signal.wait_timeout(Duration::from_millis(10)));
    }

    #[test]
    fn every_emits_until_stopped() {
        let sub = Every::with_id(1, Duration::from_millis(5), || TestMsg::Tick);
        let (tx, rx) = mpsc::channel();
        let (signal, trigger) = StopSignal::new();
        let handle = thread::spawn(move || sub.run(tx, signal));
        thread::sleep(Duration::from_millis(40));
        trigger.stop();
        handle.join().unwrap();
        let ticks: Vec<_> = rx.try_iter().collect();
        assert!(!ticks.is_empty());
        assert!(ticks.iter().all(|m| *m == TestMsg::Tick));
    }

    #[test]
    fn every_stops_when_token_cancelled() {
        let token = CancelToken::new();
        let sub = Every::with_id(1, Duration::from_millis(1), || TestMsg::Tick)
            .cancel_on(token.clone());
        token.cancel();
        let (tx, rx) = mpsc::channel();
        let (signal, _trigger) = StopSignal::new();
        sub.run(tx, signal);
        assert_eq!(rx.try_iter().count(), 0);
        assert_eq!(sub.fire(), None);
    }

    #[test]
    fn after_emits_once() {
        let sub = After::with_id(7, Duration::from_millis(1), || TestMsg::Fired);
        let (tx, rx) = mpsc::channel();
        let (signal, _trigger) = StopSignal::new();
        sub.run(tx, signal);
        assert_eq!(rx.try_iter().collect::<Vec<_>>(), vec![TestMsg::Fired]);
        assert_eq!(sub.cadence(), Some(Cadence::After(Duration::from_millis(1))));
    }

    #[test]
    fn after_stopped_early_never_emits() {
        let sub = After::with_id(7, Duration::from_secs(30), || TestMsg::Fired);
        let (tx, rx) = mpsc::channel();
        let (signal, trigger) = StopSignal::new();
        let handle = thread::spawn(move || sub.run(tx, signal));
        trigger.stop();
        handle.join().unwrap();
        assert_eq!(rx.try_iter().count(), 0);
    }

    #[test]
    fn manager_reconcile_starts_and_stops() {
        let mut mgr: SubscriptionManager<TestMsg> = SubscriptionManager::new();
        mgr.reconcile(vec![
            Box::new(Every::with_id(1, Duration::from_secs(60), || TestMsg::Tick)),
            Box::new(After::with_id(2, Duration::from_secs(60), || TestMsg::Fired)),
        ]);
        assert_eq!(mgr.active_count(), 2);

        mgr.reconcile(vec![Box::new(Every::with_id(
            1,
            Duration::from_secs(60),
            || TestMsg::Tick,
        ))]);
        assert_eq!(mgr.active_count(), 1);

        mgr.reconcile(vec![]);
        assert_eq!(mgr.active_count(), 0);
        assert!(mgr.drain_messages().is_empty());
    }
}
