use color_eyre::Result;
use color_eyre::eyre::eyre;

/// One process's accounting data at a point in time.
#[derive(Clone, Debug, PartialEq)]
pub struct ProcessSample {
    pub pid: u32,
    pub user_ticks: u64,
    pub kernel_ticks: u64,
    pub child_user_ticks: u64,
    pub child_kernel_ticks: u64,
    pub virtual_memory_fraction: f32,
    pub resident_memory_fraction: f32,
    /// Absent until the snapshot has been reconciled against a baseline.
    pub cpu_utilization: Option<f32>,
}

impl ProcessSample {
    /// Total CPU ticks accumulated by this process, derived from the four
    /// counters rather than stored.
    pub fn total_ticks(&self) -> u64 {
        self.user_ticks + self.kernel_ticks + self.child_user_ticks + self.child_kernel_ticks
    }
}

/// A point-in-time capture of the system-wide CPU counter plus one entry
/// per process, ordered by ascending pid and bounded in size.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub cpu_total_ticks: u64,
    entries: Vec<ProcessSample>,
    capacity: usize,
}

impl Snapshot {
    pub fn with_capacity(capacity: usize) -> Self {
        Snapshot {
            cpu_total_ticks: 0,
            entries: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Appends a sample. Entries must arrive in ascending pid order; the
    /// collector guarantees this by sorting the enumerated pid list.
    pub fn push(&mut self, sample: ProcessSample) -> Result<()> {
        if self.entries.len() >= self.capacity {
            return Err(eyre!(
                "too many processes (max: {}); raise max_processes",
                self.capacity
            ));
        }
        debug_assert!(
            self.entries.last().is_none_or(|last| last.pid < sample.pid),
            "snapshot entries must be pushed in ascending pid order"
        );
        self.entries.push(sample);
        Ok(())
    }

    pub fn entries(&self) -> &[ProcessSample] {
        &self.entries
    }

    pub(crate) fn entries_mut(&mut self) -> &mut [ProcessSample] {
        &mut self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Empties the snapshot so its buffer can be refilled by the next cycle.
    pub fn clear(&mut self) {
        self.cpu_total_ticks = 0;
        self.entries.clear();
    }

    /// Returns a new snapshot retaining only entries whose reconciled CPU
    /// utilization is at least `threshold`, preserving relative order and
    /// the system-wide counter. Entries that have not been reconciled never
    /// pass. The input is untouched.
    pub fn filter_by_cpu(&self, threshold: f32) -> Snapshot {
        let entries = self
            .entries
            .iter()
            .filter(|e| e.cpu_utilization.is_some_and(|u| u >= threshold))
            .cloned()
            .collect();
        Snapshot {
            cpu_total_ticks: self.cpu_total_ticks,
            entries,
            capacity: self.capacity,
        }
    }
}

/// The two rotating snapshot slots owned by the polling loop. Exactly two
/// snapshots are ever live: the one being built and the previous cycle's
/// baseline.
#[derive(Debug)]
pub struct SnapshotPair {
    current: Snapshot,
    previous: Snapshot,
    primed: bool,
}

impl SnapshotPair {
    pub fn with_capacity(capacity: usize) -> Self {
        SnapshotPair {
            current: Snapshot::with_capacity(capacity),
            previous: Snapshot::with_capacity(capacity),
            primed: false,
        }
    }

    pub fn current(&self) -> &Snapshot {
        &self.current
    }

    pub fn current_mut(&mut self) -> &mut Snapshot {
        &mut self.current
    }

    pub fn previous(&self) -> &Snapshot {
        &self.previous
    }

    /// Both slots at once, for reconciling the freshly built snapshot
    /// against the read-only baseline.
    pub fn slots_mut(&mut self) -> (&mut Snapshot, &Snapshot) {
        (&mut self.current, &self.previous)
    }

    /// Whether `previous` holds a real sample. False on the very first
    /// cycle and again after `reset`, when no report can be derived.
    pub fn is_primed(&self) -> bool {
        self.primed
    }

    /// Swaps the roles of the two slots after a cycle: the snapshot just
    /// built becomes the baseline and the old baseline's buffer will be
    /// overwritten by the next build. Pure ownership exchange, no copy.
    pub fn rotate(&mut self) {
        std::mem::swap(&mut self.current, &mut self.previous);
        self.primed = true;
    }

    /// Drops accumulated history: the next cycle starts from scratch, as
    /// on the very first cycle.
    pub fn reset(&mut self) {
        self.previous.clear();
        self.primed = false;
    }
}
