//! The animation queue resource.
//!
//! [`AnimationQueue`] is the single FIFO every transition goes through,
//! blocking or fire-and-forget alike. Callers append batches with
//! [`AnimationQueue::enqueue`]; the
//! [`animation_queue_system`](crate::systems::sequencer::animation_queue_system)
//! drains it one descriptor at a time.
//!
//! # States
//!
//! - `Idle` – nothing queued, nothing running
//! - `Draining` – the drain loop is active
//!
//! `enqueue` on an idle queue starts draining; `enqueue` while draining only
//! appends. The loop returns to idle when it finishes a descriptor and finds
//! the backlog empty. [`AnimationQueue::clear`] drops the backlog but never
//! interrupts the running descriptor.
//!
//! # Completion
//!
//! Each batch yields a [`Completion`] that flips once the batch's last
//! descriptor has finished; an optional [`OnComplete`] continuation runs at
//! the same moment. Empty batches complete before `enqueue` returns. Batches
//! dropped by `clear` never complete.
//!
//! Other threads submit batches through a [`SequencerHandle`]; the
//! [`poll_sequencer_inbox`](crate::systems::sequencer::poll_sequencer_inbox)
//! system moves them into the queue in arrival order.

use bevy_ecs::prelude::*;
use crossbeam_channel::{Receiver, Sender, unbounded};
use log::{debug, info, warn};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crate::systems::sequencer::ActiveTransition;
use crate::transition::TransitionDescriptor;

/// Continuation run when a batch completes.
pub type OnComplete = Box<dyn FnOnce() + Send + Sync>;

/// Completion signal of one batch. Cheap to clone and share.
#[derive(Clone, Debug, Default)]
pub struct Completion {
    done: Arc<AtomicBool>,
}

impl Completion {
    pub fn is_complete(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }
}

/// Producer side of a [`Completion`]; fires at most once.
pub(crate) struct CompletionSink {
    done: Arc<AtomicBool>,
    callback: Option<OnComplete>,
}

impl CompletionSink {
    fn new(callback: Option<OnComplete>) -> (Self, Completion) {
        let completion = Completion::default();
        (
            CompletionSink {
                done: completion.done.clone(),
                callback,
            },
            completion,
        )
    }

    pub(crate) fn fire(mut self) {
        self.done.store(true, Ordering::Release);
        if let Some(callback) = self.callback.take() {
            callback();
        }
    }
}

impl fmt::Debug for CompletionSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionSink")
            .field("done", &self.done.load(Ordering::Relaxed))
            .field("callback", &self.callback.is_some())
            .finish()
    }
}

/// A descriptor waiting in the backlog.
#[derive(Debug)]
pub(crate) struct QueuedTransition {
    pub id: u64,
    pub descriptor: TransitionDescriptor,
    /// Only the last descriptor of a batch carries its completion.
    pub completion: Option<CompletionSink>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum QueueState {
    Idle,
    Draining,
}

/// Running totals, for diagnostics.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub enqueued: u64,
    pub started: u64,
    pub completed: u64,
    pub abandoned: u64,
    pub failed: u64,
    /// Descriptors discarded by [`AnimationQueue::clear`] before they started.
    pub dropped: u64,
}

struct InboxBatch {
    transitions: Vec<TransitionDescriptor>,
    sink: CompletionSink,
}

/// Cloneable, thread-safe way to submit batches to an [`AnimationQueue`].
#[derive(Clone)]
pub struct SequencerHandle {
    tx: Sender<InboxBatch>,
}

impl SequencerHandle {
    /// Submit a batch. It joins the queue on the next tick.
    ///
    /// Empty batches complete immediately on the calling thread. If the queue
    /// is gone the batch is dropped and never completes.
    pub fn enqueue(
        &self,
        transitions: Vec<TransitionDescriptor>,
        on_complete: Option<OnComplete>,
    ) -> Completion {
        let (sink, completion) = CompletionSink::new(on_complete);
        if transitions.is_empty() {
            sink.fire();
            return completion;
        }
        if self.tx.send(InboxBatch { transitions, sink }).is_err() {
            warn!("Animation queue is gone; dropping submitted batch");
        }
        completion
    }
}

#[derive(Resource)]
pub struct AnimationQueue {
    pending: VecDeque<QueuedTransition>,
    /// The descriptor whose steps are running, if any.
    pub(crate) active: Option<ActiveTransition>,
    /// Seconds left of the gap before the next descriptor starts.
    pub(crate) pause_remaining: f32,
    state: QueueState,
    next_id: u64,
    pub(crate) stats: QueueStats,
    inbox_tx: Sender<InboxBatch>,
    inbox_rx: Receiver<InboxBatch>,
}

impl Default for AnimationQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationQueue {
    pub fn new() -> Self {
        let (inbox_tx, inbox_rx) = unbounded();
        Self {
            pending: VecDeque::new(),
            active: None,
            pause_remaining: 0.0,
            state: QueueState::Idle,
            next_id: 0,
            stats: QueueStats::default(),
            inbox_tx,
            inbox_rx,
        }
    }

    /// Append a batch to the tail of the queue.
    ///
    /// The returned [`Completion`] (and `on_complete`, if given) fires after
    /// the batch's last descriptor finishes, regardless of what else is
    /// queued. An empty batch completes before this returns.
    pub fn enqueue(
        &mut self,
        transitions: Vec<TransitionDescriptor>,
        on_complete: Option<OnComplete>,
    ) -> Completion {
        let (sink, completion) = CompletionSink::new(on_complete);
        if transitions.is_empty() {
            sink.fire();
            return completion;
        }
        self.push_batch(transitions, sink);
        completion
    }

    fn push_batch(&mut self, transitions: Vec<TransitionDescriptor>, sink: CompletionSink) {
        let count = transitions.len();
        let mut sink = Some(sink);
        for (i, descriptor) in transitions.into_iter().enumerate() {
            let id = self.next_id;
            self.next_id += 1;
            self.pending.push_back(QueuedTransition {
                id,
                descriptor,
                completion: if i + 1 == count { sink.take() } else { None },
            });
        }
        self.stats.enqueued += count as u64;
        if self.state == QueueState::Idle {
            debug!("Animation queue draining ({} queued)", self.pending.len());
            self.state = QueueState::Draining;
        }
    }

    /// A handle other threads can submit batches through.
    pub fn handle(&self) -> SequencerHandle {
        SequencerHandle {
            tx: self.inbox_tx.clone(),
        }
    }

    /// Move batches submitted through handles into the queue.
    pub fn poll_inbox(&mut self) -> usize {
        let batches: Vec<InboxBatch> = self.inbox_rx.try_iter().collect();
        let count = batches.len();
        for batch in batches {
            self.push_batch(batch.transitions, batch.sink);
        }
        count
    }

    /// True while the drain loop is active.
    pub fn is_animating(&self) -> bool {
        self.state == QueueState::Draining
    }

    pub fn state(&self) -> QueueState {
        self.state
    }

    /// Drop every descriptor that has not started yet.
    ///
    /// Their completions never fire. The running descriptor, if any, is left
    /// to finish normally.
    pub fn clear(&mut self) {
        let dropped = self.pending.len();
        self.pending.clear();
        self.stats.dropped += dropped as u64;
        if dropped > 0 {
            info!("Cleared {} queued transitions", dropped);
        }
    }

    /// Descriptors waiting behind the running one.
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// 1 while a descriptor's steps are running, 0 otherwise.
    pub fn in_flight(&self) -> usize {
        usize::from(self.active.is_some())
    }

    pub fn stats(&self) -> QueueStats {
        self.stats
    }

    pub(crate) fn pop_next(&mut self) -> Option<QueuedTransition> {
        self.pending.pop_front()
    }

    pub(crate) fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    pub(crate) fn set_idle(&mut self) {
        if self.state == QueueState::Draining {
            debug!("Animation queue idle");
        }
        self.state = QueueState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::card::OwnerId;
    use std::sync::Mutex;

    fn draw() -> TransitionDescriptor {
        TransitionDescriptor::DrawFromDiscard { owner: OwnerId(1) }
    }

    #[test]
    fn test_empty_batch_completes_synchronously() {
        let mut queue = AnimationQueue::new();
        let calls = Arc::new(Mutex::new(0));
        let c = calls.clone();
        let done = queue.enqueue(vec![], Some(Box::new(move || *c.lock().unwrap() += 1)));

        assert!(done.is_complete());
        assert_eq!(*calls.lock().unwrap(), 1);
        assert!(!queue.is_animating());
    }

    #[test]
    fn test_enqueue_starts_draining() {
        let mut queue = AnimationQueue::new();
        assert_eq!(queue.state(), QueueState::Idle);
        let done = queue.enqueue(vec![draw(), draw()], None);
        assert!(!done.is_complete());
        assert!(queue.is_animating());
        assert_eq!(queue.pending_len(), 2);
    }

    #[test]
    fn test_completion_sits_on_last_descriptor() {
        let mut queue = AnimationQueue::new();
        queue.enqueue(vec![draw(), draw(), draw()], None);
        let a = queue.pop_next().unwrap();
        let b = queue.pop_next().unwrap();
        let c = queue.pop_next().unwrap();
        assert!(a.completion.is_none());
        assert!(b.completion.is_none());
        assert!(c.completion.is_some());
        assert_eq!((a.id, b.id, c.id), (0, 1, 2));
    }

    #[test]
    fn test_clear_drops_backlog_without_completing() {
        let mut queue = AnimationQueue::new();
        let calls = Arc::new(Mutex::new(0));
        let c = calls.clone();
        let done = queue.enqueue(vec![draw()], Some(Box::new(move || *c.lock().unwrap() += 1)));
        queue.clear();

        assert_eq!(queue.pending_len(), 0);
        assert_eq!(queue.stats().dropped, 1);
        assert!(!done.is_complete());
        assert_eq!(*calls.lock().unwrap(), 0);
        // the drain loop, not clear, decides when to go idle
        assert!(queue.is_animating());
    }

    #[test]
    fn test_handle_batches_arrive_in_order() {
        let mut queue = AnimationQueue::new();
        let handle = queue.handle();
        let worker = std::thread::spawn(move || {
            handle.enqueue(vec![draw()], None);
            handle.enqueue(
                vec![TransitionDescriptor::DrawFromDeck { owner: OwnerId(2) }],
                None,
            );
        });
        worker.join().unwrap();

        assert_eq!(queue.poll_inbox(), 2);
        assert_eq!(queue.pending_len(), 2);
        assert_eq!(queue.pop_next().unwrap().descriptor, draw());
        assert!(matches!(
            queue.pop_next().unwrap().descriptor,
            TransitionDescriptor::DrawFromDeck { .. }
        ));
    }

    #[test]
    fn test_handle_empty_batch_completes_immediately() {
        let queue = AnimationQueue::new();
        let done = queue.handle().enqueue(vec![], None);
        assert!(done.is_complete());
    }
}
