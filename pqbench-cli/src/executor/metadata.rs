//! System Metadata Collection
//!
//! Describes the host a run was measured on. Cycle counts are only
//! comparable between rows taken on the same CPU, so the model is recorded
//! with every summary.
//!
//! Linux-specific data (CPU model) degrades to "Unknown" on other platforms.

use chrono::Utc;
use pqbench_report::{RunMeta, SystemInfo};
use std::time::Duration;

/// Build run metadata for a run using `timeout` per invocation
pub fn build_run_meta(timeout: Duration) -> RunMeta {
    let system = SystemInfo {
        os: std::env::consts::OS.to_string(),
        arch: std::env::consts::ARCH.to_string(),
        cpu: get_cpu_model().unwrap_or_else(|| "Unknown".to_string()),
        cpu_cores: num_cpus(),
    };

    RunMeta {
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
        system,
        timeout_secs: timeout.as_secs_f64(),
    }
}

/// Get CPU model name from /proc/cpuinfo (Linux only)
fn get_cpu_model() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        std::fs::read_to_string("/proc/cpuinfo")
            .ok()
            .and_then(|content| {
                content
                    .lines()
                    .find(|l| l.starts_with("model name"))
                    .and_then(|l| l.split(':').nth(1))
                    .map(|s| s.trim().to_string())
            })
    }
    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// Get number of available CPU cores
fn num_cpus() -> u32 {
    std::thread::available_parallelism()
        .map(|n| n.get() as u32)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meta_records_timeout_and_host() {
        let meta = build_run_meta(Duration::from_millis(1500));
        assert_eq!(meta.timeout_secs, 1.5);
        assert_eq!(meta.system.os, std::env::consts::OS);
        assert!(meta.system.cpu_cores >= 1);
        assert!(!meta.system.cpu.is_empty());
    }
}
