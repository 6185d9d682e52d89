//! Monitor Geometry
//!
//! Ordered set of monitor rectangles with point-containment lookup.
//! The set is replaced wholesale when the display configuration changes;
//! handles issued before a replacement are invalidated by a generation
//! counter and can never resolve against the new set.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// A single monitor rectangle in device pixel coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorRect {
    /// Position of the left edge in the virtual desktop (pixels)
    pub x: i32,

    /// Position of the top edge in the virtual desktop (pixels)
    pub y: i32,

    /// Monitor width in pixels (always > 0)
    pub width: i32,

    /// Monitor height in pixels (always > 0)
    pub height: i32,
}

impl MonitorRect {
    /// Create a new monitor rectangle
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Check if a point is within this monitor, shrunk inward by `margin`
    /// pixels on every side.
    ///
    /// The interval is half-open: the left/top bounds are inclusive, the
    /// right/bottom bounds exclusive. A margin of 0 tests the full rectangle.
    #[inline]
    pub fn contains(&self, x: i32, y: i32, margin: i32) -> bool {
        x >= self.x + margin
            && x < self.x + self.width - margin
            && y >= self.y + margin
            && y < self.y + self.height - margin
    }

    /// X coordinate one past the right edge
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// Y coordinate one past the bottom edge
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }
}

/// Handle to a monitor in a [`MonitorSet`]
///
/// Carries the generation of the set it was issued from; a handle from a
/// previous generation never resolves after the set has been replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorId {
    index: usize,
    generation: u64,
}

/// Ordered collection of monitor rectangles
///
/// Enumeration order is the order the geometry source reported; lookups
/// preserve it because overlap resolution depends on it.
#[derive(Debug, Default)]
pub struct MonitorSet {
    rects: Vec<MonitorRect>,
    generation: u64,
}

impl MonitorSet {
    /// Create an empty monitor set
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace all rectangles atomically and invalidate outstanding handles.
    ///
    /// Rectangles with a non-positive width or height are discarded with a
    /// warning rather than propagated.
    pub fn replace(&mut self, rects: Vec<MonitorRect>) {
        let valid: Vec<MonitorRect> = rects
            .into_iter()
            .filter(|r| {
                if r.width <= 0 || r.height <= 0 {
                    warn!(?r, "discarding degenerate monitor rectangle");
                    false
                } else {
                    true
                }
            })
            .collect();

        self.generation += 1;
        debug!(
            monitors = valid.len(),
            generation = self.generation,
            "monitor set replaced"
        );
        self.rects = valid;
    }

    /// Number of monitors in the set
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    /// Whether the set contains no monitors
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Current generation counter
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Resolve a handle to its rectangle.
    ///
    /// Returns `None` if the handle was issued before the most recent
    /// [`replace`](Self::replace).
    pub fn get(&self, id: MonitorId) -> Option<&MonitorRect> {
        if id.generation != self.generation {
            return None;
        }
        self.rects.get(id.index)
    }

    /// Find the monitor containing a point, with an inward containment margin.
    ///
    /// Scans every monitor in enumeration order and returns the **last** one
    /// containing the point. Overlapping monitors therefore resolve to the
    /// later entry, which keeps lookup results stable for a given
    /// enumeration order.
    pub fn monitor_at(&self, x: i32, y: i32, margin: i32) -> Option<MonitorId> {
        let mut found = None;
        for (index, rect) in self.rects.iter().enumerate() {
            if rect.contains(x, y, margin) {
                found = Some(MonitorId {
                    index,
                    generation: self.generation,
                });
            }
        }
        found
    }
}
