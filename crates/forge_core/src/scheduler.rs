use std::fmt;

use forge_logging::{forge_info, forge_warn};

/// Playback offset at which slot `index` is revealed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingEntry {
    pub index: usize,
    pub threshold_seconds: f64,
}

impl TimingEntry {
    pub fn new(index: usize, threshold_seconds: f64) -> Self {
        Self {
            index,
            threshold_seconds,
        }
    }

    /// One entry per offset, indexed by position.
    pub fn from_offsets(offsets: &[f64]) -> Vec<TimingEntry> {
        offsets
            .iter()
            .enumerate()
            .map(|(index, &threshold_seconds)| TimingEntry::new(index, threshold_seconds))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ActivationStatus {
    pub active: bool,
    pub activated: usize,
    pub total: usize,
    pub elapsed_seconds: f64,
}

impl fmt::Display for ActivationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.active {
            return write!(f, "Timing system is inactive");
        }
        write!(
            f,
            "Timing active - {}/{} children activated, timer: {:.1}s",
            self.activated, self.total, self.elapsed_seconds
        )
    }
}

/// Reveals one slot each time elapsed playback time crosses the next
/// threshold.
///
/// At most one slot is activated per `tick`, even when a long frame spans
/// several thresholds; the remaining ones fire on the following ticks.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActivationScheduler {
    entries: Vec<TimingEntry>,
    elapsed_seconds: f64,
    next_index: usize,
    active: bool,
}

impl ActivationScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[TimingEntry] {
        &self.entries
    }

    pub fn next_index(&self) -> usize {
        self.next_index
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// True once every entry has been activated.
    pub fn is_exhausted(&self) -> bool {
        self.next_index >= self.entries.len()
    }

    /// Replaces the timing list and resets to an inactive, rewound state.
    pub fn configure(&mut self, entries: Vec<TimingEntry>) {
        self.entries = entries;
        self.reset();
        self.active = false;
        forge_info!(
            "Timing data set: {} entries at {:?} seconds",
            self.entries.len(),
            self.entries
                .iter()
                .map(|entry| entry.threshold_seconds)
                .collect::<Vec<_>>()
        );
    }

    /// Starts from the first threshold. Returns false (and stays inactive)
    /// when no timing data is configured; the caller hides all slots on
    /// success.
    pub fn start(&mut self) -> bool {
        if self.entries.is_empty() {
            forge_warn!("No timing data set - cannot start timing system");
            return false;
        }
        self.reset();
        self.active = true;
        forge_info!("Timing system started with {} entries", self.entries.len());
        true
    }

    /// Deactivates and rewinds. Slot visibility is left as is.
    pub fn stop(&mut self) {
        self.active = false;
        self.reset();
        forge_info!("Timing system stopped");
    }

    /// Advances playback time. Returns the slot to activate, if a threshold
    /// was crossed.
    pub fn tick(&mut self, delta_seconds: f64) -> Option<usize> {
        if !self.active || self.is_exhausted() {
            return None;
        }

        self.elapsed_seconds += delta_seconds;
        let entry = self.entries[self.next_index];
        if self.elapsed_seconds < entry.threshold_seconds {
            return None;
        }

        let slot = self.next_index;
        self.next_index += 1;
        forge_info!(
            "Activated slot {} at {:.1}s (threshold {:.1}s)",
            slot,
            self.elapsed_seconds,
            entry.threshold_seconds
        );
        Some(slot)
    }

    pub fn status(&self) -> ActivationStatus {
        ActivationStatus {
            active: self.active,
            activated: self.next_index,
            total: self.entries.len(),
            elapsed_seconds: self.elapsed_seconds,
        }
    }

    fn reset(&mut self) {
        self.elapsed_seconds = 0.0;
        self.next_index = 0;
    }
}
