//! System memory probes.

use frakt_core::budget::MemoryProbe;

/// Fallback figures when `/proc/meminfo` is unreadable (non-Linux hosts,
/// sandboxes). Deliberately conservative rather than unlimited.
const FALLBACK_TOTAL_BYTES: u64 = 8 * 1024 * 1024 * 1024;
const FALLBACK_AVAILABLE_BYTES: u64 = 4 * 1024 * 1024 * 1024;

/// Probe that reads live figures from the operating system.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemProbe;

impl SystemProbe {
    pub fn new() -> Self {
        Self
    }

    fn read_meminfo() -> Option<(u64, u64)> {
        let text = std::fs::read_to_string("/proc/meminfo").ok()?;
        let mut total = None;
        let mut available = None;
        for line in text.lines() {
            if let Some(rest) = line.strip_prefix("MemTotal:") {
                total = parse_kib(rest);
            } else if let Some(rest) = line.strip_prefix("MemAvailable:") {
                available = parse_kib(rest);
            }
            if total.is_some() && available.is_some() {
                break;
            }
        }
        Some((total?, available?))
    }
}

fn parse_kib(rest: &str) -> Option<u64> {
    let kib: u64 = rest.trim().trim_end_matches("kB").trim().parse().ok()?;
    Some(kib * 1024)
}

impl MemoryProbe for SystemProbe {
    fn total_bytes(&self) -> u64 {
        Self::read_meminfo()
            .map(|(total, _)| total)
            .unwrap_or(FALLBACK_TOTAL_BYTES)
    }

    fn available_bytes(&self) -> u64 {
        Self::read_meminfo()
            .map(|(_, available)| available)
            .unwrap_or(FALLBACK_AVAILABLE_BYTES)
    }
}

/// Probe reporting fixed figures. Tests use this to simulate arbitrarily
/// small machines.
#[derive(Debug, Clone, Copy)]
pub struct FixedProbe {
    total: u64,
    available: u64,
}

impl FixedProbe {
    pub fn new(total: u64, available: u64) -> Self {
        Self { total, available }
    }
}

impl MemoryProbe for FixedProbe {
    fn total_bytes(&self) -> u64 {
        self.total
    }

    fn available_bytes(&self) -> u64 {
        self.available
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_meminfo_line() {
        assert_eq!(parse_kib(" 16299664 kB"), Some(16299664 * 1024));
        assert_eq!(parse_kib("garbage"), None);
    }

    #[test]
    fn system_probe_reports_something_positive() {
        let probe = SystemProbe::new();
        assert!(probe.total_bytes() > 0);
        assert!(probe.available_bytes() > 0);
        assert!(probe.available_bytes() <= probe.total_bytes() || cfg!(not(target_os = "linux")));
    }
}
