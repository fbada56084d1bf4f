use std::cell::Cell;
use std::time::{Duration, Instant};

/// One animation step: the local tile id to show and for how long.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    /// Local tile id to draw
    pub tile_id: u32,
    /// How long the frame shows, in milliseconds
    pub duration_ms: u32,
}

/// A cyclic tile animation driven by the wall clock.
///
/// The frame index advances as a side effect of [`Animation::current_frame`],
/// by at most one step per call. Time that passes while nobody asks is not
/// caught up on. Instances are shared through `Rc`, so every cell showing the
/// same animated tile advances in lock-step.
#[derive(Debug)]
pub struct Animation {
    frames: Vec<Frame>,
    current: Cell<usize>,
    last_advance: Cell<Instant>,
}

impl Animation {
    /// Returns `None` when `frames` is empty.
    pub fn new(frames: Vec<Frame>, start: Instant) -> Option<Self> {
        if frames.is_empty() {
            return None;
        }
        Some(Animation {
            frames,
            current: Cell::new(0),
            last_advance: Cell::new(start),
        })
    }

    /// All frames in play order.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Index of the frame last returned.
    pub fn current_index(&self) -> usize {
        self.current.get()
    }

    /// The frame to show at `now`, stepping once if the current one has expired.
    pub fn current_frame(&self, now: Instant) -> Frame {
        let current = self.current.get();
        let elapsed = now.saturating_duration_since(self.last_advance.get());
        let duration = Duration::from_millis(u64::from(self.frames[current].duration_ms));

        if elapsed >= duration {
            let next = (current + 1) % self.frames.len();
            self.current.set(next);
            self.last_advance.set(now);
            self.frames[next]
        } else {
            self.frames[current]
        }
    }
}
