use crate::system::snapshot::Snapshot;

/// Formats a [0,1] fraction as a fixed-width percentage column.
pub fn format_fraction(value: f32) -> String {
    format!("{:6.2}%", value * 100.0)
}

/// Renders one cycle's filtered snapshot as a plain-text table. `max_rows`
/// of 0 means unlimited.
pub fn render_report(snapshot: &Snapshot, max_rows: usize) -> String {
    let shown = if max_rows == 0 {
        snapshot.len()
    } else {
        snapshot.len().min(max_rows)
    };

    let mut out = String::new();
    out.push_str(&format!(
        "{} processes (cpu total ticks {})\n",
        snapshot.len(),
        snapshot.cpu_total_ticks
    ));
    out.push_str(&format!(
        "{:>8} {:>12} {:>8} {:>8} {:>8}\n",
        "PID", "TICKS", "CPU", "VIRT", "RES"
    ));
    for entry in &snapshot.entries()[..shown] {
        out.push_str(&format!(
            "{:>8} {:>12} {:>8} {:>8} {:>8}\n",
            entry.pid,
            entry.total_ticks(),
            format_fraction(entry.cpu_utilization.unwrap_or(0.0)),
            format_fraction(entry.virtual_memory_fraction),
            format_fraction(entry.resident_memory_fraction),
        ));
    }
    if shown < snapshot.len() {
        out.push_str(&format!("... {} more\n", snapshot.len() - shown));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::system::snapshot::ProcessSample;

    fn snapshot_with(pids: &[u32]) -> Snapshot {
        let mut snap = Snapshot::with_capacity(16);
        snap.cpu_total_ticks = 1200;
        for &pid in pids {
            snap.push(ProcessSample {
                pid,
                user_ticks: 100,
                kernel_ticks: 50,
                child_user_ticks: 0,
                child_kernel_ticks: 0,
                virtual_memory_fraction: 0.125,
                resident_memory_fraction: 0.0625,
                cpu_utilization: Some(0.25),
            })
            .unwrap();
        }
        snap
    }

    #[test]
    fn fraction_formatting() {
        assert_eq!(format_fraction(0.25), " 25.00%");
        assert_eq!(format_fraction(0.0), "  0.00%");
        assert_eq!(format_fraction(1.0), "100.00%");
    }

    #[test]
    fn report_contains_every_row() {
        let report = render_report(&snapshot_with(&[1, 42, 999]), 0);
        assert!(report.starts_with("3 processes (cpu total ticks 1200)"));
        for pid in ["1", "42", "999"] {
            assert!(report.lines().any(|l| l.trim_start().starts_with(pid)));
        }
        assert!(!report.contains("more"));
    }

    #[test]
    fn report_row_cap_annotates_remainder() {
        let report = render_report(&snapshot_with(&[1, 2, 3, 4]), 2);
        // header + column line + 2 rows + remainder line
        assert_eq!(report.lines().count(), 5);
        assert!(report.contains("... 2 more"));
    }
}
