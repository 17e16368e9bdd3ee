//! Position-indexed event scheduling over a streamer.
//!
//! A [`Watcher`] counts the frames passing through it and runs callbacks when
//! the count reaches given positions. Synchronous callbacks run inside the
//! `stream` call, with the source consumed exactly up to the trigger position.
//! Asynchronous callbacks are collected during the call and dispatched on a
//! detached thread once the call is done.
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use audio_compose::{SILENCE, Silence, Streamer, Watcher};
//!
//! let fired = Arc::new(AtomicBool::new(false));
//! let flag = Arc::clone(&fired);
//!
//! let mut watcher = Watcher::new(Silence::new(100));
//! watcher.at_sync(40, move |_| flag.store(true, Ordering::SeqCst));
//!
//! let mut buf = [SILENCE; 64];
//! let (n, _) = watcher.stream(&mut buf);
//! assert_eq!(n, 64);
//! assert!(fired.load(Ordering::SeqCst));
//! ```

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::fmt;
use std::thread;

use tracing::{debug, warn};

use super::error::StreamError;
use super::traits::{BoxedStreamer, Streamer};
use crate::Frame;

type Trigger = Box<dyn FnOnce(usize) + Send + 'static>;

struct Event {
    at: usize,
    seq: u64,
    trigger: Trigger,
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.at == other.at && self.seq == other.seq
    }
}

impl Eq for Event {}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.at, self.seq).cmp(&(other.at, other.seq))
    }
}

type EventQueue = BinaryHeap<Reverse<Event>>;

/// Pops every event due at or before `position`, in ascending order.
fn pop_due(queue: &mut EventQueue, position: usize) -> Vec<(usize, Trigger)> {
    let mut due = Vec::new();
    while queue.peek().is_some_and(|Reverse(e)| e.at <= position) {
        if let Some(Reverse(event)) = queue.pop() {
            due.push((event.at, event.trigger));
        }
    }
    due
}

/// Transparent wrapper that fires callbacks at absolute frame positions.
///
/// Positional triggers receive the position they were registered for; drain
/// triggers receive the position at which the source drained.
///
/// Triggers at the same position fire in registration order. A trigger
/// registered for a position that has already been passed fires on the next
/// call to [`Streamer::stream`]. Every trigger fires at most once, including
/// the drain triggers registered with [`Watcher::ended_sync`] and
/// [`Watcher::ended_async`].
pub struct Watcher<S = BoxedStreamer> {
    source: S,
    position: usize,
    next_seq: u64,
    sync_events: EventQueue,
    async_events: EventQueue,
    ended_sync: Vec<Trigger>,
    ended_async: Vec<Trigger>,
}

impl<S: fmt::Debug> fmt::Debug for Watcher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Watcher")
            .field("source", &self.source)
            .field("position", &self.position)
            .field("sync_events", &self.sync_events.len())
            .field("async_events", &self.async_events.len())
            .field("ended_sync", &self.ended_sync.len())
            .field("ended_async", &self.ended_async.len())
            .finish()
    }
}

impl<S: Streamer> Watcher<S> {
    /// Wraps `source` with an empty schedule at position 0.
    pub fn new(source: S) -> Self {
        Self {
            source,
            position: 0,
            next_seq: 0,
            sync_events: BinaryHeap::new(),
            async_events: BinaryHeap::new(),
            ended_sync: Vec::new(),
            ended_async: Vec::new(),
        }
    }

    /// Number of frames streamed through the watcher so far.
    pub const fn position(&self) -> usize {
        self.position
    }

    /// Runs `trigger` inside the pull that reaches `position`.
    pub fn at_sync<F>(&mut self, position: usize, trigger: F)
    where
        F: FnOnce(usize) + Send + 'static,
    {
        let event = self.event(position, Box::new(trigger));
        self.sync_events.push(Reverse(event));
    }

    /// Runs `trigger` on a detached thread after the pull that reaches
    /// `position` has returned.
    pub fn at_async<F>(&mut self, position: usize, trigger: F)
    where
        F: FnOnce(usize) + Send + 'static,
    {
        let event = self.event(position, Box::new(trigger));
        self.async_events.push(Reverse(event));
    }

    /// Shorthand for [`Watcher::at_sync`] at position 0.
    pub fn started_sync<F>(&mut self, trigger: F)
    where
        F: FnOnce(usize) + Send + 'static,
    {
        self.at_sync(0, trigger);
    }

    /// Shorthand for [`Watcher::at_async`] at position 0.
    pub fn started_async<F>(&mut self, trigger: F)
    where
        F: FnOnce(usize) + Send + 'static,
    {
        self.at_async(0, trigger);
    }

    /// Runs `trigger` inside the pull in which the source reports exhaustion.
    pub fn ended_sync<F>(&mut self, trigger: F)
    where
        F: FnOnce(usize) + Send + 'static,
    {
        self.ended_sync.push(Box::new(trigger));
    }

    /// Runs `trigger` on a detached thread after the pull in which the source
    /// reports exhaustion.
    pub fn ended_async<F>(&mut self, trigger: F)
    where
        F: FnOnce(usize) + Send + 'static,
    {
        self.ended_async.push(Box::new(trigger));
    }

    /// Unwraps the source, discarding pending triggers.
    pub fn into_inner(self) -> S {
        self.source
    }

    fn event(&mut self, at: usize, trigger: Trigger) -> Event {
        let seq = self.next_seq;
        self.next_seq += 1;
        Event { at, seq, trigger }
    }

    fn fire_due_sync(&mut self) {
        for (at, trigger) in pop_due(&mut self.sync_events, self.position) {
            trigger(at);
        }
    }

    fn dispatch_async(&mut self, drained: bool) {
        let mut batch = pop_due(&mut self.async_events, self.position);
        if drained {
            let position = self.position;
            batch.extend(self.ended_async.drain(..).map(|trigger| (position, trigger)));
        }
        if batch.is_empty() {
            return;
        }

        debug!(
            position = self.position,
            count = batch.len(),
            "dispatching async triggers"
        );
        let spawned = thread::Builder::new()
            .name("watcher-async".into())
            .spawn(move || {
                for (at, trigger) in batch {
                    trigger(at);
                }
            });
        if let Err(err) = spawned {
            warn!(%err, "failed to spawn thread for async triggers");
        }
    }
}

impl<S: Streamer> Streamer for Watcher<S> {
    fn stream(&mut self, frames: &mut [Frame]) -> (usize, bool) {
        if frames.is_empty() {
            return self.source.stream(frames);
        }

        let mut n = 0;
        let mut more = true;
        while n < frames.len() {
            self.fire_due_sync();

            let remaining = frames.len() - n;
            let want = self
                .sync_events
                .peek()
                .map_or(remaining, |Reverse(e)| remaining.min(e.at - self.position));

            let (sn, m) = self.source.stream(&mut frames[n..n + want]);
            n += sn;
            self.position += sn;
            more = m;

            self.fire_due_sync();

            if !more {
                for trigger in self.ended_sync.drain(..) {
                    trigger(self.position);
                }
                break;
            }
            if sn < want {
                break;
            }
        }

        self.dispatch_async(!more);
        (n, more)
    }

    fn err(&self) -> Option<StreamError> {
        self.source.err()
    }
}
