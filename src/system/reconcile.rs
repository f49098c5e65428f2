use super::snapshot::Snapshot;

/// Computes per-process CPU utilization on `current` by merging it against
/// `previous`.
///
/// Both snapshots are sorted by ascending pid, so a single forward cursor
/// into `previous` suffices: each sequence is scanned once, O(n+m). A pid
/// missing from `previous` is a new process and its full accumulated ticks
/// count against the elapsed window; a pid present only in `previous` has
/// exited and needs no action. Equal system-wide counters (two samples in
/// the same tick) yield zero utilization for every entry rather than a
/// division fault.
pub fn reconcile(current: &mut Snapshot, previous: &Snapshot) {
    let elapsed = current
        .cpu_total_ticks
        .saturating_sub(previous.cpu_total_ticks);
    let prev = previous.entries();
    let mut cursor = 0;

    for entry in current.entries_mut() {
        while cursor < prev.len() && prev[cursor].pid < entry.pid {
            cursor += 1;
        }
        let baseline = if cursor < prev.len() && prev[cursor].pid == entry.pid {
            prev[cursor].total_ticks()
        } else {
            0
        };
        let used = entry.total_ticks().saturating_sub(baseline);
        entry.cpu_utilization = Some(if elapsed == 0 {
            0.0
        } else {
            used as f32 / elapsed as f32
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::snapshot::ProcessSample;

    fn sample(pid: u32, ticks: u64) -> ProcessSample {
        ProcessSample {
            pid,
            user_ticks: ticks,
            kernel_ticks: 0,
            child_user_ticks: 0,
            child_kernel_ticks: 0,
            virtual_memory_fraction: 0.0,
            resident_memory_fraction: 0.0,
            cpu_utilization: None,
        }
    }

    fn snapshot(cpu_total_ticks: u64, samples: &[(u32, u64)]) -> Snapshot {
        let mut snap = Snapshot::with_capacity(64);
        snap.cpu_total_ticks = cpu_total_ticks;
        for &(pid, ticks) in samples {
            snap.push(sample(pid, ticks)).unwrap();
        }
        snap
    }

    fn utilization(snap: &Snapshot, pid: u32) -> f32 {
        snap.entries()
            .iter()
            .find(|e| e.pid == pid)
            .and_then(|e| e.cpu_utilization)
            .unwrap()
    }

    #[test]
    fn known_and_new_processes() {
        let previous = snapshot(1000, &[(1, 100)]);
        let mut current = snapshot(1200, &[(1, 150), (2, 40)]);

        reconcile(&mut current, &previous);

        assert!((utilization(&current, 1) - 0.25).abs() < 1e-6);
        assert!((utilization(&current, 2) - 0.20).abs() < 1e-6);

        let filtered = current.filter_by_cpu(0.21);
        let pids: Vec<u32> = filtered.entries().iter().map(|e| e.pid).collect();
        assert_eq!(pids, vec![1]);
    }

    #[test]
    fn exited_process_leaves_no_entry() {
        let previous = snapshot(1000, &[(1, 100), (2, 50)]);
        let mut current = snapshot(1100, &[(1, 120)]);

        reconcile(&mut current, &previous);

        assert_eq!(current.len(), 1);
        assert_eq!(current.entries()[0].pid, 1);
    }

    #[test]
    fn zero_elapsed_window_yields_zero_utilization() {
        let previous = snapshot(1000, &[(1, 100)]);
        let mut current = snapshot(1000, &[(1, 150), (9, 40)]);

        reconcile(&mut current, &previous);

        for entry in current.entries() {
            assert_eq!(entry.cpu_utilization, Some(0.0));
        }
    }

    #[test]
    fn empty_previous_treats_everything_as_new() {
        let previous = Snapshot::with_capacity(64);
        let mut current = snapshot(500, &[(3, 50), (8, 250)]);

        reconcile(&mut current, &previous);

        assert!((utilization(&current, 3) - 0.1).abs() < 1e-6);
        assert!((utilization(&current, 8) - 0.5).abs() < 1e-6);
    }

    #[test]
    fn interleaved_pids_match_correctly() {
        // previous has pids the cursor must skip over without rewinding
        let previous = snapshot(1000, &[(2, 10), (4, 20), (6, 30), (8, 40)]);
        let mut current = snapshot(1100, &[(1, 5), (4, 25), (7, 7), (8, 41)]);

        reconcile(&mut current, &previous);

        assert!((utilization(&current, 1) - 0.05).abs() < 1e-6); // new
        assert!((utilization(&current, 4) - 0.05).abs() < 1e-6); // 25-20
        assert!((utilization(&current, 7) - 0.07).abs() < 1e-6); // new
        assert!((utilization(&current, 8) - 0.01).abs() < 1e-6); // 41-40
    }
}
