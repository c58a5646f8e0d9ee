//! Host information recorded alongside reports.

use serde::{Deserialize, Serialize};

/// Machine facts that make a timing report reproducible.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_model: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_cores_logical: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpu_cores_physical: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_ram_bytes: Option<u64>,

    pub os: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

impl Default for SystemInfo {
    fn default() -> Self {
        SystemInfo {
            cpu_model: None,
            cpu_cores_logical: None,
            cpu_cores_physical: None,
            total_ram_bytes: None,
            os: std::env::consts::OS.to_string(),
            hostname: None,
        }
    }
}

impl SystemInfo {
    /// Detect information from the current system
    pub fn detect() -> Self {
        use sysinfo::System;

        let mut sys = System::new_all();
        sys.refresh_all();

        SystemInfo {
            cpu_model: sys.cpus().first().map(|c| c.brand().to_string()),
            cpu_cores_logical: Some(sys.cpus().len()),
            cpu_cores_physical: sys.physical_core_count(),
            total_ram_bytes: Some(sys.total_memory()),
            os: System::name().unwrap_or_else(|| std::env::consts::OS.to_string()),
            hostname: System::host_name(),
        }
    }
}
