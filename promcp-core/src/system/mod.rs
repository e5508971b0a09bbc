//! Host metrics
//!
//! Reads OS-level counters through `sysinfo` and returns serializable
//! snapshots. Every call takes a fresh reading; nothing is cached.

use crate::error::{PromcpError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System, UpdateKind, Users};

/// Load averages over 1, 5 and 15 minutes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoadAverage {
    pub one: f64,
    pub five: f64,
    pub fifteen: f64,
}

impl LoadAverage {
    fn read() -> Self {
        let load = System::load_average();
        Self {
            one: load.one,
            five: load.five,
            fifteen: load.fifteen,
        }
    }
}

/// One logical CPU
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuDetails {
    pub name: String,
    pub model: String,
    /// Frequency in MHz
    pub speed: u64,
    /// Usage percentage since the previous refresh
    pub usage: f32,
}

/// Overview of the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSnapshot {
    pub platform: String,
    pub release: Option<String>,
    #[serde(rename = "type")]
    pub os_type: Option<String>,
    pub os_version: Option<String>,
    pub arch: String,
    pub hostname: Option<String>,
    pub cpus: Vec<CpuDetails>,
    pub total_memory: u64,
    pub free_memory: u64,
    /// Seconds since boot
    pub uptime: u64,
    pub boot_time: Option<DateTime<Utc>>,
    pub loadavg: LoadAverage,
    pub user: Option<String>,
}

/// CPU summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CpuSnapshot {
    pub count: usize,
    pub model: String,
    pub speed: u64,
    pub usage: Vec<f32>,
    pub loadavg: LoadAverage,
}

/// Memory summary in bytes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySnapshot {
    pub total: u64,
    pub free: u64,
    pub used: u64,
    /// Percentage with two decimals, e.g. `"42.17"`
    pub used_percentage: String,
}

/// Reads host metrics on demand
#[derive(Debug, Clone, Default)]
pub struct SystemInfoProvider;

impl SystemInfoProvider {
    pub fn new() -> Self {
        Self
    }

    /// Platform, kernel, hostname, CPUs, memory, uptime and load
    pub async fn system_info(&self) -> Result<SystemSnapshot> {
        let mut system = System::new();
        system.refresh_memory();
        let cpus = sample_cpus(&mut system).await;

        let boot_time = i64::try_from(System::boot_time())
            .ok()
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));

        Ok(SystemSnapshot {
            platform: std::env::consts::OS.to_string(),
            release: System::kernel_version(),
            os_type: System::name(),
            os_version: System::long_os_version(),
            arch: std::env::consts::ARCH.to_string(),
            hostname: System::host_name(),
            cpus,
            total_memory: system.total_memory(),
            free_memory: system.free_memory(),
            uptime: System::uptime(),
            boot_time,
            loadavg: LoadAverage::read(),
            user: current_user(),
        })
    }

    /// CPU count, model, speed and per-core usage
    ///
    /// # Errors
    ///
    /// Returns an error if no CPU could be read.
    pub async fn cpu_info(&self) -> Result<CpuSnapshot> {
        let mut system = System::new();
        let cpus = sample_cpus(&mut system).await;

        let first = cpus
            .first()
            .ok_or_else(|| PromcpError::SystemInfo("No CPU information available".to_string()))?;

        Ok(CpuSnapshot {
            count: cpus.len(),
            model: first.model.clone(),
            speed: first.speed,
            usage: cpus.iter().map(|cpu| cpu.usage).collect(),
            loadavg: LoadAverage::read(),
        })
    }

    /// Total, free and used memory
    pub fn memory_info(&self) -> Result<MemorySnapshot> {
        let mut system = System::new();
        system.refresh_memory();

        let total = system.total_memory();
        let free = system.free_memory();
        Ok(memory_snapshot(total, free))
    }
}

// CPU usage is a delta, so it needs two refreshes spaced by the minimum interval
async fn sample_cpus(system: &mut System) -> Vec<CpuDetails> {
    system.refresh_cpu_all();
    tokio::time::sleep(sysinfo::MINIMUM_CPU_UPDATE_INTERVAL).await;
    system.refresh_cpu_all();

    system
        .cpus()
        .iter()
        .map(|cpu| CpuDetails {
            name: cpu.name().to_string(),
            model: cpu.brand().trim().to_string(),
            speed: cpu.frequency(),
            usage: cpu.cpu_usage(),
        })
        .collect()
}

fn memory_snapshot(total: u64, free: u64) -> MemorySnapshot {
    let used = total.saturating_sub(free);
    MemorySnapshot {
        total,
        free,
        used,
        used_percentage: format_percentage(used, total),
    }
}

fn format_percentage(part: u64, whole: u64) -> String {
    if whole == 0 {
        return "0.00".to_string();
    }
    format!("{:.2}", part as f64 / whole as f64 * 100.0)
}

// Owner of this process, resolved through the OS user database
fn current_user() -> Option<String> {
    let pid = Pid::from_u32(std::process::id());

    let mut system = System::new();
    system.refresh_processes_specifics(
        ProcessesToUpdate::Some(&[pid]),
        true,
        ProcessRefreshKind::nothing().with_user(UpdateKind::Always),
    );

    let Some(uid) = system.process(pid).and_then(|process| process.user_id()) else {
        tracing::debug!(pid = %pid, "Could not read the process owner");
        return None;
    };

    let users = Users::new_with_refreshed_list();
    users.get_user_by_id(uid).map(|user| user.name().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_percentage() {
        assert_eq!(format_percentage(1, 3), "33.33");
        assert_eq!(format_percentage(0, 0), "0.00");
        assert_eq!(format_percentage(8, 8), "100.00");
    }

    #[test]
    fn test_memory_snapshot_math() {
        let snapshot = memory_snapshot(1000, 250);
        assert_eq!(snapshot.used, 750);
        assert_eq!(snapshot.used_percentage, "75.00");

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["usedPercentage"], "75.00");
    }

    #[test]
    fn test_memory_info_reads_host() {
        let snapshot = SystemInfoProvider::new().memory_info().unwrap();
        assert!(snapshot.total > 0);
        assert!(snapshot.used <= snapshot.total);
    }

    #[tokio::test]
    async fn test_cpu_info_reads_host() {
        let snapshot = SystemInfoProvider::new().cpu_info().await.unwrap();
        assert!(snapshot.count > 0);
        assert_eq!(snapshot.usage.len(), snapshot.count);
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_current_user_is_process_owner() {
        let name = current_user().expect("process owner should resolve");
        assert!(!name.is_empty());

        // Same account the kernel reports for this process
        let status = std::fs::read_to_string("/proc/self/status").unwrap();
        let uid: u32 = status
            .lines()
            .find_map(|line| line.strip_prefix("Uid:"))
            .and_then(|rest| rest.split_whitespace().next())
            .and_then(|uid| uid.parse().ok())
            .unwrap();
        let users = Users::new_with_refreshed_list();
        let owner = users
            .iter()
            .find(|user| **user.id() == uid)
            .map(|user| user.name().to_string());
        assert_eq!(Some(name), owner);
    }

    #[tokio::test]
    async fn test_system_info_shape() {
        let snapshot = SystemInfoProvider::new().system_info().await.unwrap();
        assert_eq!(snapshot.platform, std::env::consts::OS);
        assert!(snapshot.total_memory > 0);

        let json = serde_json::to_value(&snapshot).unwrap();
        assert!(json.get("totalMemory").is_some());
        assert!(json.get("loadavg").is_some());
        assert!(json.get("type").is_some());
    }
}
