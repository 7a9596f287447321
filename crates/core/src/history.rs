/// Number of samples kept per plotted series (one minute at the default tick).
pub const HISTORY_LEN: usize = 60;

/// Fixed-capacity rolling history of samples, used for sparkline rendering.
///
/// All slots exist from construction (zero-filled); `push` overwrites the
/// oldest one in place.
#[derive(Debug, Clone)]
pub struct History {
    slots: Vec<f32>,
    /// Index of the oldest slot, i.e. the next one to be overwritten.
    head:  usize,
}

impl History {
    /// A zero `capacity` is raised to one.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![0.0; capacity.max(1)],
            head:  0,
        }
    }

    /// Push a new sample, evicting the oldest.
    pub fn push(&mut self, value: f32) {
        self.slots[self.head] = value;
        self.head = (self.head + 1) % self.slots.len();
    }

    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Most recently pushed sample.
    pub fn latest(&self) -> f32 {
        let len = self.slots.len();
        self.slots[(self.head + len - 1) % len]
    }

    /// Samples from oldest to newest without copying.
    pub fn iter(&self) -> impl Iterator<Item = f32> + '_ {
        let (newer, older) = self.slots.split_at(self.head);
        older.iter().chain(newer.iter()).copied()
    }

    /// Snapshot copy of all slots, oldest first.
    pub fn read_ordered(&self) -> Vec<f32> {
        self.iter().collect()
    }
}

impl Default for History {
    fn default() -> Self {
        Self::new(HISTORY_LEN)
    }
}
