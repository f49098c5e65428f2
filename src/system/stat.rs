/// Decoder for the fixed positional fields of `/proc/<pid>/stat`.
///
/// Field positions per proc(5): state (3), utime (14), stime (15),
/// cutime (16), cstime (17), vsize (23), rss (24). The comm field may
/// contain spaces and parentheses, so parsing resumes after the last `)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StatRecord {
    pub pid: u32,
    pub state: char,
    pub user_ticks: u64,
    pub kernel_ticks: u64,
    pub child_user_ticks: u64,
    pub child_kernel_ticks: u64,
    pub vsize_bytes: u64,
    pub rss_pages: u64,
}

impl StatRecord {
    /// Parses one stat line. Returns `None` for a malformed record; the
    /// caller skips such processes rather than failing the cycle.
    pub fn parse(pid: u32, contents: &str) -> Option<StatRecord> {
        let after_comm = contents.rfind(')')? + 1;
        let fields: Vec<&str> = contents[after_comm..].split_whitespace().collect();
        // Fields after comm, zero-indexed: state(0) ... utime(11) stime(12)
        // cutime(13) cstime(14) ... vsize(20) rss(21)
        let state = fields.first()?.chars().next()?;
        let user_ticks = fields.get(11)?.parse().ok()?;
        let kernel_ticks = fields.get(12)?.parse().ok()?;
        // The child counters are signed in the kernel's format; clamp so
        // the sample only carries non-decreasing unsigned counters.
        let child_user_ticks = fields.get(13)?.parse::<i64>().ok()?.max(0) as u64;
        let child_kernel_ticks = fields.get(14)?.parse::<i64>().ok()?.max(0) as u64;
        let vsize_bytes = fields.get(20)?.parse().ok()?;
        let rss_pages = fields.get(21)?.parse::<i64>().ok()?.max(0) as u64;

        Some(StatRecord {
            pid,
            state,
            user_ticks,
            kernel_ticks,
            child_user_ticks,
            child_kernel_ticks,
            vsize_bytes,
            rss_pages,
        })
    }

    /// Exited-but-unreaped processes contribute no meaningful figures and
    /// are excluded from snapshots.
    pub fn is_zombie(&self) -> bool {
        self.state == 'Z'
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A stat line in the kernel's layout: pid (comm) state then 49 more
    /// fields. Only the positions the decoder reads carry real values.
    fn stat_line(comm: &str, state: char) -> String {
        format!(
            "42 ({comm}) {state} 1 42 42 0 -1 4194304 500 0 0 0 \
             150 60 9 4 20 0 1 0 100 104857600 256 \
             18446744073709551615 1 1 0 0 0 0 0 0 0 0 0 0 17 3 0 0 0 0 0"
        )
    }

    #[test]
    fn parses_named_fields() {
        let rec = StatRecord::parse(42, &stat_line("monitord", 'S')).unwrap();
        assert_eq!(rec.pid, 42);
        assert_eq!(rec.state, 'S');
        assert_eq!(rec.user_ticks, 150);
        assert_eq!(rec.kernel_ticks, 60);
        assert_eq!(rec.child_user_ticks, 9);
        assert_eq!(rec.child_kernel_ticks, 4);
        assert_eq!(rec.vsize_bytes, 104_857_600);
        assert_eq!(rec.rss_pages, 256);
        assert!(!rec.is_zombie());
    }

    #[test]
    fn comm_with_spaces_and_parens() {
        let rec = StatRecord::parse(42, &stat_line("Web Content) (x", 'R')).unwrap();
        assert_eq!(rec.state, 'R');
        assert_eq!(rec.user_ticks, 150);
    }

    #[test]
    fn zombie_state_detected() {
        let rec = StatRecord::parse(42, &stat_line("defunct", 'Z')).unwrap();
        assert!(rec.is_zombie());
    }

    #[test]
    fn negative_child_counters_clamp_to_zero() {
        let line = "7 (x) S 1 7 7 0 -1 0 0 0 0 0 10 20 -3 -4 20 0 1 0 5 4096 8 0";
        let rec = StatRecord::parse(7, line).unwrap();
        assert_eq!(rec.child_user_ticks, 0);
        assert_eq!(rec.child_kernel_ticks, 0);
        assert_eq!(rec.user_ticks + rec.kernel_ticks, 30);
    }

    #[test]
    fn truncated_record_is_rejected() {
        assert_eq!(StatRecord::parse(1, "1 (init) S 0 1 1"), None);
    }

    #[test]
    fn missing_comm_close_is_rejected() {
        assert_eq!(StatRecord::parse(1, "1 (init S 0 1 1 0 -1"), None);
    }

    #[test]
    fn empty_record_is_rejected() {
        assert_eq!(StatRecord::parse(1, ""), None);
    }
}
