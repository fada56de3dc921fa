use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::geometry::Point;
use crate::target::Boundable;

/// Receives raw viewport coordinates on every pointer move.
pub type PointerListener = Box<dyn FnMut(f64, f64)>;

/// A process-wide stream of pointer moves, such as a window's mouse events.
pub trait PointerEventSource {
    fn subscribe(&self, listener: PointerListener) -> Subscription;
}

/// Keeps a listener registered until released or dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    release: Option<Box<dyn FnOnce()>>,
}

impl Subscription {
    pub fn new(release: impl FnOnce() + 'static) -> Self {
        Self {
            release: Some(Box::new(release)),
        }
    }

    /// Safe to call more than once.
    pub fn release(&mut self) {
        if let Some(release) = self.release.take() {
            release();
        }
    }

    pub fn is_active(&self) -> bool {
        self.release.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.release();
    }
}

impl fmt::Debug for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Subscription")
            .field("active", &self.is_active())
            .finish()
    }
}

#[derive(Default)]
struct Listeners {
    next_id: u64,
    active: BTreeMap<u64, Option<PointerListener>>,
}

/// Single-threaded pointer event source that the host pushes events into.
#[derive(Clone, Default)]
pub struct PointerChannel {
    listeners: Rc<RefCell<Listeners>>,
}

impl PointerChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one pointer move to every current listener, in subscription order.
    pub fn emit(&self, x: f64, y: f64) {
        let ids: Vec<u64> = self.listeners.borrow().active.keys().copied().collect();

        for id in ids {
            let taken = match self.listeners.borrow_mut().active.get_mut(&id) {
                Some(slot) => slot.take(),
                None => continue,
            };

            let Some(mut listener) = taken else {
                continue;
            };

            listener(x, y);

            // Unsubscribed during dispatch: the entry is gone and the listener drops here.
            if let Some(slot) = self.listeners.borrow_mut().active.get_mut(&id) {
                *slot = Some(listener);
            }
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().active.len()
    }
}

impl PointerEventSource for PointerChannel {
    fn subscribe(&self, listener: PointerListener) -> Subscription {
        let id = {
            let mut listeners = self.listeners.borrow_mut();
            let id = listeners.next_id;
            listeners.next_id += 1;
            listeners.active.insert(id, Some(listener));
            id
        };

        let weak = Rc::downgrade(&self.listeners);

        Subscription::new(move || {
            if let Some(listeners) = weak.upgrade() {
                listeners.borrow_mut().active.remove(&id);
            }
        })
    }
}

/// Shared cell holding the latest pointer position. Overwritten, never queued.
pub type PointerCell = Rc<Cell<Point>>;

/// Keeps `position` in sync with the pointer, in the container's coordinate space.
pub struct PointerTracker {
    position: PointerCell,
    subscription: Subscription,
}

impl PointerTracker {
    pub fn attach(
        source: &impl PointerEventSource,
        container: Option<Rc<dyn Boundable>>,
    ) -> Self {
        let position = PointerCell::default();
        let subscription = subscribe(source, &position, container);

        Self {
            position,
            subscription,
        }
    }

    pub fn position(&self) -> Point {
        self.position.get()
    }

    /// The shared cell, for readers that outlive a borrow of the tracker.
    pub fn cell(&self) -> PointerCell {
        Rc::clone(&self.position)
    }

    /// Re-subscribe with a different container. The previous listener is released first.
    pub fn set_container(
        &mut self,
        source: &impl PointerEventSource,
        container: Option<Rc<dyn Boundable>>,
    ) {
        self.subscription.release();
        self.subscription = subscribe(source, &self.position, container);
        debug!("pointer tracker re-subscribed");
    }

    pub fn detach(&mut self) {
        self.subscription.release();
    }

    pub fn is_attached(&self) -> bool {
        self.subscription.is_active()
    }
}

fn subscribe(
    source: &impl PointerEventSource,
    position: &PointerCell,
    container: Option<Rc<dyn Boundable>>,
) -> Subscription {
    let position = Rc::clone(position);

    source.subscribe(Box::new(move |x, y| {
        let pointer = Point::new(x, y);

        // The container may have moved since the last event.
        let local = match container.as_ref().and_then(|c| c.bounds()) {
            Some(bounds) => pointer.relative_to(bounds.origin()),
            None => pointer,
        };

        position.set(local);
    }))
}
