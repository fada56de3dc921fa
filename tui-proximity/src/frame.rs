use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};
use std::time::{Duration, Instant};

/// Receives the instant the frame was dispatched at.
pub type FrameCallback = Box<dyn FnMut(Instant)>;

/// Display refresh cadence.
pub trait FrameScheduler {
    /// How long from `now` until the next frame is due. `Duration::ZERO` when due.
    fn time_until_frame(&self, now: Instant) -> Duration;

    fn frame_dispatched(&mut self, now: Instant);
}

/// Fixed-interval timer for headless and terminal targets.
#[derive(Debug, Clone, Copy)]
pub struct FixedInterval {
    interval: Duration,
    last: Option<Instant>,
}

impl FixedInterval {
    /// `fps` of zero is treated as one.
    pub fn from_fps(fps: u32) -> Self {
        Self {
            interval: Duration::from_secs(1) / fps.max(1),
            last: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Default for FixedInterval {
    fn default() -> Self {
        Self::from_fps(60)
    }
}

impl FrameScheduler for FixedInterval {
    fn time_until_frame(&self, now: Instant) -> Duration {
        match self.last {
            Some(last) => (last + self.interval).saturating_duration_since(now),
            None => Duration::ZERO,
        }
    }

    fn frame_dispatched(&mut self, now: Instant) {
        // Stay on the interval grid unless the host fell more than a frame behind.
        self.last = Some(match self.last {
            Some(last) if now.saturating_duration_since(last) < self.interval * 2 => {
                last + self.interval
            }
            _ => now,
        });
    }
}

/// Every pump is a frame.
#[derive(Debug, Clone, Copy, Default)]
pub struct EveryPump;

impl FrameScheduler for EveryPump {
    fn time_until_frame(&self, _now: Instant) -> Duration {
        Duration::ZERO
    }

    fn frame_dispatched(&mut self, _now: Instant) {}
}

#[derive(Default)]
struct Slot {
    /// `None` while the callback is running.
    callback: Option<FrameCallback>,
    /// Replacement requested while the callback was running.
    pending: Option<FrameCallback>,
}

#[derive(Default)]
struct Registry {
    next_id: u64,
    slots: BTreeMap<u64, Slot>,
}

/// Registry of frame callbacks plus the scheduler that paces them.
///
/// The host calls [`FrameLoop::pump`] whenever it gets a chance and the scheduler decides whether a
/// frame is due. Callbacks run one after another to completion, so frames never overlap.
pub struct FrameLoop<S: FrameScheduler> {
    scheduler: S,
    registry: Rc<RefCell<Registry>>,
}

impl<S: FrameScheduler> FrameLoop<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            scheduler,
            registry: Rc::default(),
        }
    }

    /// Run `callback` on every frame until the returned handle is cancelled or dropped.
    #[must_use = "dropping a FrameHandle cancels the callback"]
    pub fn subscribe(&self, callback: impl FnMut(Instant) + 'static) -> FrameHandle {
        let mut registry = self.registry.borrow_mut();
        let id = registry.next_id;
        registry.next_id += 1;
        registry.slots.insert(
            id,
            Slot {
                callback: Some(Box::new(callback)),
                pending: None,
            },
        );

        FrameHandle {
            id,
            registry: Rc::downgrade(&self.registry),
        }
    }

    pub fn time_until_frame(&self, now: Instant) -> Duration {
        self.scheduler.time_until_frame(now)
    }

    /// Dispatch a frame if one is due. Returns the number of callbacks run.
    pub fn pump(&mut self, now: Instant) -> usize {
        if !self.scheduler.time_until_frame(now).is_zero() {
            return 0;
        }

        self.scheduler.frame_dispatched(now);

        let ids: Vec<u64> = self.registry.borrow().slots.keys().copied().collect();
        let mut ran = 0;

        for id in ids {
            let taken = match self.registry.borrow_mut().slots.get_mut(&id) {
                Some(slot) => slot.callback.take(),
                None => continue,
            };

            let Some(mut callback) = taken else {
                continue;
            };

            callback(now);
            ran += 1;

            // A slot removed during the call was cancelled.
            let retired = match self.registry.borrow_mut().slots.get_mut(&id) {
                Some(slot) => match slot.pending.take() {
                    Some(next) => {
                        slot.callback = Some(next);
                        Some(callback)
                    }
                    None => slot.callback.replace(callback),
                },
                None => Some(callback),
            };

            // Dropped outside the borrow: the callback may own other handles.
            drop(retired);
        }

        ran
    }

    pub fn active(&self) -> usize {
        self.registry.borrow().slots.len()
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }
}

/// Handle to a subscribed frame callback.
#[derive(Debug)]
pub struct FrameHandle {
    id: u64,
    registry: Weak<RefCell<Registry>>,
}

impl FrameHandle {
    /// Stop further invocations. Idempotent, and safe from inside the callback.
    pub fn cancel(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            let removed = registry.borrow_mut().slots.remove(&self.id);
            // Dropped outside the borrow: the callback may own other handles.
            drop(removed);
        }

        self.registry = Weak::new();
    }

    /// Swap the callback without skipping or repeating a frame.
    ///
    /// Returns `false` if the handle was already cancelled.
    pub fn replace(&self, callback: impl FnMut(Instant) + 'static) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };

        let callback: FrameCallback = Box::new(callback);

        let previous = match registry.borrow_mut().slots.get_mut(&self.id) {
            Some(slot) if slot.callback.is_some() => slot.callback.replace(callback),
            Some(slot) => slot.pending.replace(callback),
            None => return false,
        };

        drop(previous);

        true
    }

    pub fn is_active(&self) -> bool {
        self.registry
            .upgrade()
            .is_some_and(|registry| registry.borrow().slots.contains_key(&self.id))
    }
}

impl Drop for FrameHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}
