//! Host-element contract.
//!
//! The compositing environment owns the element; the engine only reads its
//! current placement and writes new position/scale values back.

use std::sync::{
    Arc,
    atomic::{AtomicUsize, Ordering},
};

use parking_lot::Mutex;

use crate::geom::Vector2;

/// Snapshot of the element as seen by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ElementState {
    /// Top-left corner in scene coordinates.
    pub position: Vector2,
    /// Per-axis scale factor.
    pub scale: Vector2,
    /// Unscaled native width/height.
    pub base: Vector2,
}

impl ElementState {
    /// Rendered size in whole pixels.
    pub fn size(&self) -> Vector2 {
        size_for_scale(self.base, self.scale)
    }
}

/// Rendered size for `scale`, truncated to whole pixels.
pub fn size_for_scale(base: Vector2, scale: Vector2) -> Vector2 {
    Vector2::new(base.x * scale.x, base.y * scale.y).trunc()
}

/// Scale that renders `size`. An axis with a zero base keeps `fallback`.
pub fn scale_for_size(base: Vector2, size: Vector2, fallback: Vector2) -> Vector2 {
    let x = if base.x == 0.0 {
        fallback.x
    } else {
        size.x / base.x
    };
    let y = if base.y == 0.0 {
        fallback.y
    } else {
        size.y / base.y
    };
    Vector2::new(x, y)
}

/// Minimal host API used by the engine.
pub trait HostElement: Send + Sync {
    /// Current element state, or `None` when the element cannot be found in
    /// the active scene.
    fn element(&self) -> Option<ElementState>;

    /// Move the element.
    fn set_position(&self, position: Vector2);
    /// Rescale the element.
    fn set_scale(&self, scale: Vector2);
}

/// Number of writes of each kind seen by a [`MemoryElement`].
#[derive(Default)]
struct WriteCounts {
    /// `set_position` calls.
    position: AtomicUsize,
    /// `set_scale` calls.
    scale: AtomicUsize,
}

/// In-memory host element. Used by the daemon as a simulated scene and by
/// tests to observe writes.
#[derive(Clone)]
pub struct MemoryElement {
    /// Current element, `None` while absent from the scene.
    state: Arc<Mutex<Option<ElementState>>>,
    /// Write counters shared between clones.
    writes: Arc<WriteCounts>,
}

impl MemoryElement {
    /// An element present in the scene with the given placement and native
    /// size.
    pub fn new(position: Vector2, scale: Vector2, base: Vector2) -> Self {
        Self::with_state(Some(ElementState {
            position,
            scale,
            base,
        }))
    }

    /// An element that is not present in the scene.
    pub fn missing() -> Self {
        Self::with_state(None)
    }

    /// Wrap `state` with fresh write counters.
    fn with_state(state: Option<ElementState>) -> Self {
        Self {
            state: Arc::new(Mutex::new(state)),
            writes: Arc::new(WriteCounts::default()),
        }
    }

    /// Current state, if present.
    pub fn get(&self) -> Option<ElementState> {
        *self.state.lock()
    }

    /// Replace the element (simulates an external edit or scene change).
    pub fn set(&self, state: Option<ElementState>) {
        *self.state.lock() = state;
    }

    /// Number of writes whose name equals `what` (`"position"` or `"scale"`).
    /// Other names count zero.
    pub fn write_count(&self, what: &str) -> usize {
        match what {
            "position" => self.writes.position.load(Ordering::Relaxed),
            "scale" => self.writes.scale.load(Ordering::Relaxed),
            _ => 0,
        }
    }
}

impl HostElement for MemoryElement {
    fn element(&self) -> Option<ElementState> {
        self.get()
    }

    fn set_position(&self, position: Vector2) {
        self.writes.position.fetch_add(1, Ordering::Relaxed);
        if let Some(st) = self.state.lock().as_mut() {
            st.position = position;
        }
    }

    fn set_scale(&self, scale: Vector2) {
        self.writes.scale.fetch_add(1, Ordering::Relaxed);
        if let Some(st) = self.state.lock().as_mut() {
            st.scale = scale;
        }
    }
}
