//! Which sensors the graph shows, and how button presses reach the main loop

use core::cell::Cell;

use critical_section::Mutex;

use crate::traits::ActivationSink;

/// Sensors plotted in the graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    ShowAll,
    /// Index into the configured sensor list
    ShowOnly(usize),
}

impl RenderMode {
    /// Successor in the cycle All -> 0 -> 1 -> ... -> n-1 -> All
    pub fn next(self, sensor_count: usize) -> Self {
        match self {
            RenderMode::ShowAll if sensor_count > 0 => RenderMode::ShowOnly(0),
            RenderMode::ShowAll => RenderMode::ShowAll,
            RenderMode::ShowOnly(i) if i + 1 < sensor_count => RenderMode::ShowOnly(i + 1),
            RenderMode::ShowOnly(_) => RenderMode::ShowAll,
        }
    }

    /// Whether the sensor at `index` is plotted in this mode
    pub fn includes(self, index: usize) -> bool {
        match self {
            RenderMode::ShowAll => true,
            RenderMode::ShowOnly(i) => i == index,
        }
    }
}

/// Render mode state machine. Starts at `ShowAll`.
#[derive(Debug, Clone)]
pub struct ModeSelector {
    mode: RenderMode,
    sensor_count: usize,
}

impl ModeSelector {
    pub fn new(sensor_count: usize) -> Self {
        Self {
            mode: RenderMode::ShowAll,
            sensor_count,
        }
    }

    pub fn current(&self) -> RenderMode {
        self.mode
    }

    pub fn advance(&mut self) -> RenderMode {
        self.mode = self.mode.next(self.sensor_count);
        self.mode
    }

    /// Apply `presses` advances. The cycle has `sensor_count + 1` states so
    /// only the remainder matters.
    pub fn advance_by(&mut self, presses: u32) -> RenderMode {
        let steps = presses as usize % (self.sensor_count + 1);
        for _ in 0..steps {
            self.advance();
        }
        self.mode
    }
}

/// Button activations waiting for the main loop.
///
/// Written from the button task/interrupt, drained by the main loop at the
/// top of each render cycle.
pub struct PressCounter {
    pending: Mutex<Cell<u32>>,
}

impl PressCounter {
    pub const fn new() -> Self {
        Self {
            pending: Mutex::new(Cell::new(0)),
        }
    }

    /// Take all pending activations, leaving zero behind
    pub fn take(&self) -> u32 {
        critical_section::with(|cs| self.pending.borrow(cs).replace(0))
    }

    pub fn pending(&self) -> u32 {
        critical_section::with(|cs| self.pending.borrow(cs).get())
    }
}

impl Default for PressCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivationSink for PressCounter {
    fn activate(&self) {
        critical_section::with(|cs| {
            let pending = self.pending.borrow(cs);
            pending.set(pending.get().saturating_add(1));
        });
    }
}
