use std::path::PathBuf;

use color_eyre::Result;
use color_eyre::eyre::eyre;
use tracing::debug;

use super::clock;
use super::memory::MemoryInfo;
use super::snapshot::{ProcessSample, Snapshot};
use super::stat::StatRecord;

/// Enumerates the process table and assembles snapshots. The proc root is
/// a parameter so tests can point it at a fixture tree.
pub struct Collector {
    proc_root: PathBuf,
    memory: MemoryInfo,
}

impl Default for Collector {
    fn default() -> Self {
        Self::new()
    }
}

impl Collector {
    pub fn new() -> Self {
        Self::with_root("/proc", MemoryInfo::from_system())
    }

    pub fn with_root(proc_root: impl Into<PathBuf>, memory: MemoryInfo) -> Self {
        Collector {
            proc_root: proc_root.into(),
            memory,
        }
    }

    /// Builds one snapshot into `snapshot`, reusing its buffer. Entries end
    /// up in ascending pid order because the enumerated pid list is sorted
    /// before reading; directory order is not trusted.
    ///
    /// A per-process record that vanishes between listing and reading, a
    /// malformed record, or a zombie process is skipped. An unreadable
    /// aggregate counter, an unopenable proc root, or an overflowing entry
    /// list is an error the caller treats as fatal.
    pub fn sample_into(&self, snapshot: &mut Snapshot) -> Result<()> {
        snapshot.clear();
        snapshot.cpu_total_ticks = clock::read_cpu_total_ticks(&self.proc_root)?;

        let mut pids = self.list_pids()?;
        pids.sort_unstable();

        for pid in pids {
            let path = self.proc_root.join(pid.to_string()).join("stat");
            // Each stat handle is scoped to this one read and closed on
            // every path out of it.
            let contents = match std::fs::read_to_string(&path) {
                Ok(contents) => contents,
                Err(err) => {
                    debug!(pid, %err, "process vanished between listing and read");
                    continue;
                }
            };
            let Some(record) = StatRecord::parse(pid, &contents) else {
                debug!(pid, "skipping malformed stat record");
                continue;
            };
            if record.is_zombie() {
                continue;
            }

            snapshot.push(ProcessSample {
                pid: record.pid,
                user_ticks: record.user_ticks,
                kernel_ticks: record.kernel_ticks,
                child_user_ticks: record.child_user_ticks,
                child_kernel_ticks: record.child_kernel_ticks,
                virtual_memory_fraction: self.memory.virtual_fraction(record.vsize_bytes),
                resident_memory_fraction: self.memory.resident_fraction(record.rss_pages),
                cpu_utilization: None,
            })?;
        }

        Ok(())
    }

    fn list_pids(&self) -> Result<Vec<u32>> {
        let dir = std::fs::read_dir(&self.proc_root)
            .map_err(|err| eyre!("cannot open {}: {err}", self.proc_root.display()))?;

        let mut pids = Vec::new();
        for entry in dir.flatten() {
            if let Some(pid) = entry.file_name().to_str().and_then(|s| s.parse().ok()) {
                pids.push(pid);
            }
        }
        Ok(pids)
    }
}
