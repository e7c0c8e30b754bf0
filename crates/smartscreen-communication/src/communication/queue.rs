//! Bounded command queue and the display worker
//!
//! Producers on any thread push [`Command`]s; a single named worker thread
//! pops them in FIFO order and hands each one to the [`DisplayBackend`]. A
//! failing command is logged and dropped and the worker moves on.
//!
//! # Features
//! - Bounded capacity with a timed producer wait
//! - Stop sentinel: everything queued before it is still executed
//! - Idle wait, for callers that need the panel to catch up
//! - Executed / failed counters

use crate::backend::DisplayBackend;
use crate::protocol::{Command, DeviceState};
use parking_lot::{Condvar, Mutex, RwLock};
use smartscreen_core::{QueueError, Result};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Entry of the queue
#[derive(Debug, Clone, PartialEq)]
pub enum QueueItem {
    Command(Command),
    /// Stop the worker once everything before it is done
    Stop,
}

#[derive(Debug, Default)]
struct Pending {
    items: VecDeque<QueueItem>,
    /// Stop sentinel queued; nothing is accepted anymore
    closed: bool,
    /// The worker is executing an item it already popped
    busy: bool,
    /// Tickets handed out by `enqueue`, in queue order
    accepted: u64,
    /// Items the worker finished, whatever their outcome
    done: u64,
}

/// Multi-producer, single-consumer FIFO with backpressure
#[derive(Debug)]
pub struct CommandQueue {
    pending: Mutex<Pending>,
    not_empty: Condvar,
    not_full: Condvar,
    idle: Condvar,
    capacity: usize,
    enqueue_timeout: Duration,
}

impl CommandQueue {
    pub fn new(capacity: usize, enqueue_timeout: Duration) -> Self {
        Self {
            pending: Mutex::new(Pending::default()),
            not_empty: Condvar::new(),
            not_full: Condvar::new(),
            idle: Condvar::new(),
            capacity: capacity.max(1),
            enqueue_timeout,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of commands waiting (the one being executed excluded)
    pub fn len(&self) -> usize {
        self.pending.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_closed(&self) -> bool {
        self.pending.lock().closed
    }

    /// Append `command` at the tail and return its ticket
    ///
    /// Waits up to the enqueue timeout while the queue is full. Commands
    /// reach the backend in the order this call returned `Ok`, which is
    /// also ticket order. See [`is_done`](Self::is_done).
    pub fn enqueue(&self, command: Command) -> std::result::Result<u64, QueueError> {
        let deadline = Instant::now() + self.enqueue_timeout;
        let mut pending = self.pending.lock();

        loop {
            if pending.closed {
                return Err(QueueError::Closed);
            }
            if pending.items.len() < self.capacity {
                break;
            }
            if self.not_full.wait_until(&mut pending, deadline).timed_out()
                && pending.items.len() >= self.capacity
            {
                tracing::warn!(
                    "Command queue full ({} pending), dropping {}",
                    pending.items.len(),
                    command
                );
                return Err(QueueError::Full {
                    capacity: self.capacity,
                    timeout_ms: self.enqueue_timeout.as_millis() as u64,
                });
            }
        }

        tracing::trace!("Queued {}", command);
        pending.accepted += 1;
        pending.items.push_back(QueueItem::Command(command));
        self.not_empty.notify_one();
        Ok(pending.accepted)
    }

    /// Whether the worker is through with the command holding `ticket`
    ///
    /// Ticket 0 is never handed out and always counts as done.
    pub fn is_done(&self, ticket: u64) -> bool {
        self.pending.lock().done >= ticket
    }

    /// Queue the stop sentinel; later enqueues fail with `Closed`
    ///
    /// The sentinel ignores the capacity limit.
    pub fn close(&self) {
        let mut pending = self.pending.lock();
        if pending.closed {
            return;
        }
        pending.closed = true;
        pending.items.push_back(QueueItem::Stop);
        self.not_empty.notify_one();
        // wake producers blocked on a full queue so they see `Closed`
        self.not_full.notify_all();
    }

    /// Block until an item is available and take it
    pub fn pop(&self) -> QueueItem {
        let mut pending = self.pending.lock();
        loop {
            if let Some(item) = pending.items.pop_front() {
                pending.busy = true;
                self.not_full.notify_one();
                return item;
            }
            self.not_empty.wait(&mut pending);
        }
    }

    /// Mark the last popped item as done
    pub fn finish(&self) {
        let mut pending = self.pending.lock();
        pending.busy = false;
        pending.done += 1;
        if pending.items.is_empty() {
            self.idle.notify_all();
        }
    }

    /// Wait until nothing is queued or executing; `false` on timeout
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut pending = self.pending.lock();
        while pending.busy || !pending.items.is_empty() {
            if self.idle.wait_until(&mut pending, deadline).timed_out() {
                return !pending.busy && pending.items.is_empty();
            }
        }
        true
    }
}

/// Counters kept by the worker
#[derive(Debug, Default)]
pub struct WorkerStats {
    executed: AtomicU64,
    failed: AtomicU64,
}

impl WorkerStats {
    /// Commands that went through
    pub fn executed(&self) -> u64 {
        self.executed.load(Ordering::Relaxed)
    }

    /// Commands dropped after an error
    pub fn failed(&self) -> u64 {
        self.failed.load(Ordering::Relaxed)
    }
}

/// Running display worker
pub struct WorkerHandle {
    queue: Arc<CommandQueue>,
    thread: Option<JoinHandle<()>>,
    stats: Arc<WorkerStats>,
    state: Arc<RwLock<DeviceState>>,
}

impl WorkerHandle {
    /// Start the worker thread draining `queue` into `backend`
    pub fn spawn(
        queue: Arc<CommandQueue>,
        mut backend: Box<dyn DisplayBackend>,
        initial: DeviceState,
    ) -> Result<Self> {
        let stats = Arc::new(WorkerStats::default());
        let state = Arc::new(RwLock::new(initial.clone()));

        let thread = {
            let queue = Arc::clone(&queue);
            let stats = Arc::clone(&stats);
            let shared = Arc::clone(&state);
            std::thread::Builder::new()
                .name("lcd-worker".to_string())
                .spawn(move || {
                    tracing::info!("Display worker started ({})", backend.name());
                    let mut mirror = initial;
                    loop {
                        let command = match queue.pop() {
                            QueueItem::Command(command) => command,
                            QueueItem::Stop => {
                                queue.finish();
                                break;
                            }
                        };

                        match backend.execute(&command, &mut mirror) {
                            Ok(()) => {
                                mirror.apply(&command);
                                stats.executed.fetch_add(1, Ordering::Relaxed);
                            }
                            Err(e) => {
                                tracing::error!("Dropping command {}: {}", command, e);
                                stats.failed.fetch_add(1, Ordering::Relaxed);
                            }
                        }
                        *shared.write() = mirror.clone();
                        queue.finish();
                    }
                    backend.shutdown();
                    tracing::info!(
                        "Display worker stopped ({} executed, {} failed)",
                        stats.executed(),
                        stats.failed()
                    );
                })?
        };

        Ok(Self {
            queue,
            thread: Some(thread),
            stats,
            state,
        })
    }

    pub fn queue(&self) -> &Arc<CommandQueue> {
        &self.queue
    }

    pub fn stats(&self) -> &Arc<WorkerStats> {
        &self.stats
    }

    /// Snapshot of the device mirror
    pub fn state(&self) -> DeviceState {
        self.state.read().clone()
    }

    /// Shared mirror, still readable once the worker is gone
    pub fn state_handle(&self) -> Arc<RwLock<DeviceState>> {
        Arc::clone(&self.state)
    }

    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Let the worker drain the queue, then join it
    pub fn stop(&mut self) {
        self.queue.close();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                tracing::error!("Display worker panicked");
            }
        }
    }
}

impl Drop for WorkerHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::CommandKind;

    struct Recorder {
        seen: Arc<Mutex<Vec<u64>>>,
        fail: Option<u64>,
        delay: Duration,
    }

    impl DisplayBackend for Recorder {
        fn name(&self) -> &str {
            "recorder"
        }

        fn execute(&mut self, command: &Command, _state: &mut DeviceState) -> Result<()> {
            std::thread::sleep(self.delay);
            self.seen.lock().push(command.id);
            if self.fail == Some(command.id) {
                return Err(smartscreen_core::Error::other("boom"));
            }
            Ok(())
        }
    }

    fn recorder(fail: Option<u64>, delay: Duration) -> (Box<Recorder>, Arc<Mutex<Vec<u64>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let backend = Box::new(Recorder {
            seen: Arc::clone(&seen),
            fail,
            delay,
        });
        (backend, seen)
    }

    fn command(id: u64) -> Command {
        Command::new(id, CommandKind::ScreenOn)
    }

    #[test]
    fn test_full_queue_times_out() {
        let queue = CommandQueue::new(2, Duration::from_millis(20));
        queue.enqueue(command(1)).unwrap();
        queue.enqueue(command(2)).unwrap();
        assert_eq!(
            queue.enqueue(command(3)),
            Err(QueueError::Full {
                capacity: 2,
                timeout_ms: 20
            })
        );
    }

    #[test]
    fn test_closed_queue_rejects() {
        let queue = CommandQueue::new(1, Duration::from_millis(20));
        queue.enqueue(command(1)).unwrap();
        // sentinel fits even when full
        queue.close();
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.enqueue(command(2)), Err(QueueError::Closed));
    }

    #[test]
    fn test_worker_drains_before_stopping() {
        let queue = Arc::new(CommandQueue::new(16, Duration::from_secs(1)));
        let (backend, seen) = recorder(None, Duration::from_millis(1));
        let mut worker = WorkerHandle::spawn(Arc::clone(&queue), backend, DeviceState::new(20))
            .unwrap();
        for id in 1..=5 {
            queue.enqueue(command(id)).unwrap();
        }
        worker.stop();
        assert_eq!(*seen.lock(), vec![1, 2, 3, 4, 5]);
        assert_eq!(worker.stats().executed(), 5);
        assert!(!worker.is_running());
    }

    #[test]
    fn test_failure_does_not_stall_worker() {
        let queue = Arc::new(CommandQueue::new(16, Duration::from_secs(1)));
        let (backend, seen) = recorder(Some(2), Duration::ZERO);
        let worker =
            WorkerHandle::spawn(Arc::clone(&queue), backend, DeviceState::new(20)).unwrap();
        queue.enqueue(command(1)).unwrap();
        queue.enqueue(command(2)).unwrap();
        queue
            .enqueue(Command::new(3, CommandKind::SetBrightness(70)))
            .unwrap();

        assert!(queue.wait_idle(Duration::from_secs(5)));
        assert_eq!(*seen.lock(), vec![1, 2, 3]);
        assert_eq!(worker.stats().failed(), 1);
        assert_eq!(worker.state().brightness, 70);
    }

    #[test]
    fn test_tickets_follow_queue_order() {
        let queue = Arc::new(CommandQueue::new(16, Duration::from_secs(1)));
        assert!(queue.is_done(0));
        let first = queue.enqueue(command(7)).unwrap();
        let second = queue.enqueue(command(3)).unwrap();
        assert_eq!((first, second), (1, 2));
        assert!(!queue.is_done(first));

        let (backend, _seen) = recorder(Some(7), Duration::ZERO);
        let _worker =
            WorkerHandle::spawn(Arc::clone(&queue), backend, DeviceState::default()).unwrap();
        assert!(queue.wait_idle(Duration::from_secs(5)));
        // a dropped command is done too
        assert!(queue.is_done(first));
        assert!(queue.is_done(second));
    }

    #[test]
    fn test_wait_idle_times_out_while_busy() {
        let queue = Arc::new(CommandQueue::new(16, Duration::from_secs(1)));
        let (backend, _seen) = recorder(None, Duration::from_millis(200));
        let _worker =
            WorkerHandle::spawn(Arc::clone(&queue), backend, DeviceState::default()).unwrap();
        queue.enqueue(command(1)).unwrap();
        assert!(!queue.wait_idle(Duration::from_millis(10)));
        assert!(queue.wait_idle(Duration::from_secs(5)));
    }
}
