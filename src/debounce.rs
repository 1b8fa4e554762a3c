//! Button debounce for edge interrupts.
//!
//! Each raw edge carries a millisecond timestamp. An edge closer than the
//! debounce window to the last accepted one is treated as contact bounce.

use crate::traits::ActivationSink;

pub struct Debouncer<S> {
    window_ms: u64,
    last_accepted: Option<u64>,
    sink: S,
}

impl<S: ActivationSink> Debouncer<S> {
    pub fn new(window_ms: u64, sink: S) -> Self {
        Self {
            window_ms,
            last_accepted: None,
            sink,
        }
    }

    /// Feed a raw edge seen at `now_ms`. Returns true if it was accepted and
    /// forwarded to the sink.
    pub fn on_edge(&mut self, now_ms: u64) -> bool {
        if let Some(last) = self.last_accepted
            && now_ms.abs_diff(last) < self.window_ms
        {
            return false;
        }

        self.last_accepted = Some(now_ms);
        self.sink.activate();
        true
    }

    pub fn window_ms(&self) -> u64 {
        self.window_ms
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
