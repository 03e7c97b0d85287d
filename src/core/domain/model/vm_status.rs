//! Domain models for VM status records from `/deployments/{name}/vms?format=full`.
//!
//! The director answers that endpoint with a task whose result output holds one
//! [`VmStatusResponse`] per line. [`VmStatus`] is the flattened, numeric view
//! handed to callers.

use super::ToModel;
use crate::core::domain::value_object::serde_helpers::{self, string_f64, string_u64};
use serde::{Deserialize, Serialize};

/// One VM record exactly as the director encodes it.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct VmStatusResponse {
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub job_name: String,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub index: u32,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub job_state: String,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub vm_cid: String,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub agent_id: String,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub resource_pool: String,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub ips: Vec<String>,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub dns: Vec<String>,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub vitals: VitalsResponse,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub resurrection_paused: bool,
}

/// Resource utilization snapshot of a VM. Numbers arrive as strings.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct VitalsResponse {
    /// Load averages over 1, 5 and 15 minutes.
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub load: Vec<LoadAverage>,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub cpu: CpuVitals,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub mem: MemoryVitals,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub swap: MemoryVitals,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub disk: DiskVitals,
}

/// A single load average entry.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize)]
#[serde(transparent)]
pub struct LoadAverage(#[serde(with = "string_f64")] pub Option<f64>);

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct CpuVitals {
    #[serde(default, with = "string_f64")]
    pub user: Option<f64>,
    #[serde(default, with = "string_f64")]
    pub sys: Option<f64>,
    #[serde(default, with = "string_f64")]
    pub wait: Option<f64>,
}

/// Memory or swap usage.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct MemoryVitals {
    #[serde(default, with = "string_f64")]
    pub percent: Option<f64>,
    #[serde(default, with = "string_u64")]
    pub kb: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct DiskVitals {
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub system: DiskUsage,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub ephemeral: DiskUsage,
    #[serde(default, deserialize_with = "serde_helpers::null_as_default")]
    pub persistent: DiskUsage,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
pub struct DiskUsage {
    #[serde(default, with = "string_f64")]
    pub percent: Option<f64>,
}

/// Status and vitals of one VM in a deployment.
///
/// Numeric vitals the director reported as `null` or left out are `0`.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct VmStatus {
    pub job_name: String,
    pub index: u32,
    pub job_state: String,
    pub vm_cid: String,
    pub agent_id: String,
    pub resource_pool: String,
    pub ips: Vec<String>,
    pub dns: Vec<String>,
    pub resurrection_paused: bool,
    /// 1 minute load average.
    pub load_1m: f64,
    /// 5 minute load average.
    pub load_5m: f64,
    /// 15 minute load average.
    pub load_15m: f64,
    pub cpu_user: f64,
    pub cpu_sys: f64,
    pub cpu_wait: f64,
    pub memory_percent: f64,
    pub memory_kb: u64,
    pub swap_percent: f64,
    pub swap_kb: u64,
    pub disk_system_percent: f64,
    pub disk_ephemeral_percent: f64,
    pub disk_persistent_percent: f64,
}

impl ToModel for VmStatusResponse {
    type Model = VmStatus;

    fn to_model(self) -> VmStatus {
        let vitals = self.vitals;
        let load = |slot: usize| {
            vitals
                .load
                .get(slot)
                .and_then(|average| average.0)
                .unwrap_or_default()
        };

        VmStatus {
            load_1m: load(0),
            load_5m: load(1),
            load_15m: load(2),
            cpu_user: vitals.cpu.user.unwrap_or_default(),
            cpu_sys: vitals.cpu.sys.unwrap_or_default(),
            cpu_wait: vitals.cpu.wait.unwrap_or_default(),
            memory_percent: vitals.mem.percent.unwrap_or_default(),
            memory_kb: vitals.mem.kb.unwrap_or_default(),
            swap_percent: vitals.swap.percent.unwrap_or_default(),
            swap_kb: vitals.swap.kb.unwrap_or_default(),
            disk_system_percent: vitals.disk.system.percent.unwrap_or_default(),
            disk_ephemeral_percent: vitals.disk.ephemeral.percent.unwrap_or_default(),
            disk_persistent_percent: vitals.disk.persistent.percent.unwrap_or_default(),
            job_name: self.job_name,
            index: self.index,
            job_state: self.job_state,
            vm_cid: self.vm_cid,
            agent_id: self.agent_id,
            resource_pool: self.resource_pool,
            ips: self.ips,
            dns: self.dns,
            resurrection_paused: self.resurrection_paused,
        }
    }
}
