use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use log::{debug, trace, warn};

use crate::engine::{ProximityConfig, ProximityEngine};
use crate::error::{Error, Result};
use crate::frame::{FrameHandle, FrameLoop, FrameScheduler};
use crate::geometry::Point;
use crate::layout::{split_label, Glyph};
use crate::pointer::{PointerCell, PointerEventSource, PointerTracker};
use crate::settings::SettingsCache;
use crate::target::{Boundable, RenderTarget};

/// Construction-time configuration for [`VariableProximity`].
///
/// `label`, `from_settings`, `to_settings` and `radius` are required.
#[derive(Default)]
pub struct ProximityBuilder {
    label: Option<String>,
    class_name: String,
    container: Option<Rc<dyn Boundable>>,
    from_settings: Option<String>,
    to_settings: Option<String>,
    radius: Option<f64>,
}

impl ProximityBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn class_name(mut self, class_name: impl Into<String>) -> Self {
        self.class_name = class_name.into();
        self
    }

    /// Region the pointer and glyph positions are measured against.
    /// Without one the effect stays idle.
    pub fn container(mut self, container: Rc<dyn Boundable>) -> Self {
        self.container = Some(container);
        self
    }

    /// Axis values at rest, e.g. `"'wght' 400, 'wdth' 100"`.
    pub fn from_settings(mut self, settings: impl Into<String>) -> Self {
        self.from_settings = Some(settings.into());
        self
    }

    /// Axis values directly under the pointer.
    pub fn to_settings(mut self, settings: impl Into<String>) -> Self {
        self.to_settings = Some(settings.into());
        self
    }

    pub fn radius(mut self, radius: f64) -> Self {
        self.radius = Some(radius);
        self
    }

    /// Build one render target per glyph, subscribe to pointer moves and start the frame callback.
    ///
    /// `make_target` may return `None` for a glyph that failed to mount; that slot is skipped.
    pub fn mount<T, S, P, F>(
        self,
        source: &P,
        frames: &FrameLoop<S>,
        make_target: F,
    ) -> Result<VariableProximity<T>>
    where
        T: RenderTarget + 'static,
        S: FrameScheduler,
        P: PointerEventSource,
        F: FnMut(&Glyph) -> Option<T>,
    {
        let label = self.label.ok_or(Error::MissingField("label"))?;
        let from = self.from_settings.ok_or(Error::MissingField("from_settings"))?;
        let to = self.to_settings.ok_or(Error::MissingField("to_settings"))?;
        let radius = self.radius.ok_or(Error::MissingField("radius"))?;

        if !(radius > 0.0) {
            warn!("radius {radius} is not positive, glyphs will stay at rest");
        }

        let targets: Vec<Option<T>> = split_label(&label).iter().map(make_target).collect();

        debug!(
            "mounting {} glyph targets ({} missing) for {label:?}",
            targets.len(),
            targets.iter().filter(|t| t.is_none()).count()
        );

        let shared = Rc::new(RefCell::new(Shared {
            engine: ProximityEngine::new(ProximityConfig { radius }),
            settings: SettingsCache::new(&from, &to),
            targets,
        }));

        let tracker = PointerTracker::attach(source, self.container.clone());
        let frame = frames.subscribe(frame_callback(
            Rc::clone(&shared),
            tracker.cell(),
            self.container.clone(),
        ));

        Ok(VariableProximity {
            label,
            class_name: self.class_name,
            container: self.container,
            shared,
            tracker,
            frame,
        })
    }
}

struct Shared<T> {
    engine: ProximityEngine,
    settings: SettingsCache,
    targets: Vec<Option<T>>,
}

fn frame_callback<T: RenderTarget + 'static>(
    shared: Rc<RefCell<Shared<T>>>,
    pointer: PointerCell,
    container: Option<Rc<dyn Boundable>>,
) -> impl FnMut(Instant) + 'static {
    move |_| {
        // The host is holding the targets; try again next frame.
        let Ok(mut shared) = shared.try_borrow_mut() else {
            return;
        };

        let Shared {
            engine,
            settings,
            targets,
        } = &mut *shared;

        let styled = engine.tick(container.as_deref(), pointer.get(), settings.settings(), targets);
        trace!("styled {styled} glyphs");
    }
}

/// A label whose glyphs take on font-variation axis values by pointer proximity.
///
/// Tears down on [`stop`](Self::stop) or when dropped.
pub struct VariableProximity<T: RenderTarget> {
    label: String,
    class_name: String,
    container: Option<Rc<dyn Boundable>>,
    shared: Rc<RefCell<Shared<T>>>,
    tracker: PointerTracker,
    frame: FrameHandle,
}

impl<T: RenderTarget + 'static> VariableProximity<T> {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn radius(&self) -> f64 {
        self.shared.borrow().engine.config().radius
    }

    /// Change the settings strings. Re-parses only if either one differs.
    pub fn set_settings(&mut self, from: &str, to: &str) {
        self.shared.borrow_mut().settings.update(from, to);
    }

    /// Swap the reference container. Pointer tracking re-subscribes and the frame callback is
    /// replaced in place. Once stopped, the container is only recorded.
    pub fn set_container(
        &mut self,
        source: &impl PointerEventSource,
        container: Option<Rc<dyn Boundable>>,
    ) {
        if !self.is_running() {
            self.container = container;
            return;
        }

        self.tracker.set_container(source, container.clone());
        self.frame.replace(frame_callback(
            Rc::clone(&self.shared),
            self.tracker.cell(),
            container.clone(),
        ));
        self.container = container;
    }

    pub fn container(&self) -> Option<&Rc<dyn Boundable>> {
        self.container.as_ref()
    }

    /// Latest pointer position in container space.
    pub fn pointer(&self) -> Point {
        self.tracker.position()
    }

    pub fn with_targets<R>(&self, f: impl FnOnce(&[Option<T>]) -> R) -> R {
        f(&self.shared.borrow().targets)
    }

    /// For layout passes that move the glyphs.
    pub fn with_targets_mut<R>(&self, f: impl FnOnce(&mut [Option<T>]) -> R) -> R {
        f(&mut self.shared.borrow_mut().targets)
    }

    pub fn is_running(&self) -> bool {
        self.tracker.is_attached() && self.frame.is_active()
    }

    /// Unsubscribe from pointer moves and cancel the frame callback. Safe to call more than once.
    pub fn stop(&mut self) {
        if self.is_running() {
            debug!("stopping proximity effect for {:?}", self.label);
        }

        self.tracker.detach();
        self.frame.cancel();
    }
}
