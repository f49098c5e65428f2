use std::path::Path;

use color_eyre::Result;
use color_eyre::eyre::eyre;

/// Reads the aggregate CPU line of `<proc_root>/stat` and returns the sum
/// of its seven tick counters (user, nice, system, idle, iowait, irq,
/// softirq). An unreadable or malformed source is unrecoverable: no
/// utilization figure can be computed without it.
pub fn read_cpu_total_ticks(proc_root: &Path) -> Result<u64> {
    let path = proc_root.join("stat");
    let contents = std::fs::read_to_string(&path)
        .map_err(|err| eyre!("cannot read {}: {err}", path.display()))?;
    parse_cpu_total(&contents)
        .ok_or_else(|| eyre!("malformed aggregate cpu line in {}", path.display()))
}

fn parse_cpu_total(contents: &str) -> Option<u64> {
    let line = contents.lines().next()?;
    let mut fields = line.split_whitespace();
    if fields.next()? != "cpu" {
        return None;
    }
    let mut total: u64 = 0;
    for _ in 0..7 {
        total = total.checked_add(fields.next()?.parse().ok()?)?;
    }
    Some(total)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sums_seven_counters() {
        let line = "cpu  100 20 30 400 5 6 7 99 99\ncpu0 1 2 3 4 5 6 7\n";
        assert_eq!(parse_cpu_total(line), Some(568));
    }

    #[test]
    fn rejects_short_line() {
        assert_eq!(parse_cpu_total("cpu 1 2 3\n"), None);
    }

    #[test]
    fn rejects_wrong_label() {
        assert_eq!(parse_cpu_total("cpu0 1 2 3 4 5 6 7\n"), None);
    }

    #[test]
    fn rejects_non_numeric_field() {
        assert_eq!(parse_cpu_total("cpu 1 2 x 4 5 6 7\n"), None);
    }

    #[test]
    fn rejects_empty_input() {
        assert_eq!(parse_cpu_total(""), None);
    }
}
