// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Entity
//!
//! A [`Resource`] is one physical compute unit donated by a member. The
//! common descriptive and scheduling fields live on the entity; the
//! hardware-specific payload is a [`HardwareSpec`] variant (CPU, GPU or
//! SoC), so every piece of variant logic is an exhaustive `match`.
//!
//! The stored document shape carries the variant tag in a `type` field next
//! to the common fields:
//!
//! ```json
//! { "id": "...", "name": "rig-1", "type": "cpu", "cores": 8, "status": "AVAILABLE", ... }
//! ```
//!
//! # Invariants
//!
//! - benchmark scores are written only by [`Resource::apply_scores`]
//! - `status` and `current_task_id` change only through
//!   [`Resource::apply_status`]; the repository writes them separately from
//!   every other field

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::availability::Availability;
use super::patch::{CommonPatch, CpuPatch, GpuPatch, HardwarePatch, ResourcePatch, SocPatch};

/// Scheduling state of a resource
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceStatus {
    /// Free to take work
    #[default]
    Available,
    /// Running a task
    Busy,
    /// Withdrawn by its owner
    Unavailable,
}

impl ResourceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Busy => "BUSY",
            Self::Unavailable => "UNAVAILABLE",
        }
    }
}

impl fmt::Display for ResourceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "AVAILABLE" => Ok(Self::Available),
            "BUSY" => Ok(Self::Busy),
            "UNAVAILABLE" => Ok(Self::Unavailable),
            other => Err(format!("unknown resource status: {}", other)),
        }
    }
}

/// Variant discriminator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    Cpu,
    Gpu,
    Soc,
}

impl ResourceType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cpu => "cpu",
            Self::Gpu => "gpu",
            Self::Soc => "soc",
        }
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cpu" => Ok(Self::Cpu),
            "gpu" => Ok(Self::Gpu),
            "soc" => Ok(Self::Soc),
            other => Err(format!("unknown resource type: {}", other)),
        }
    }
}

/// A patch aimed at a different variant than the stored one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VariantMismatch {
    pub stored: ResourceType,
    pub requested: ResourceType,
}

/// Benchmark results returned by the scoring service
///
/// Each variant takes the fields that apply to it and ignores the rest.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreBundle {
    pub single_core: f64,
    pub multicore: f64,
    pub opencl: f64,
    pub vulkan: f64,
    pub cuda: f64,
}

/// CPU payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CpuSpec {
    pub architecture: Option<String>,
    pub cores: u32,
    pub threads: u32,
    pub base_frequency: f64,
    pub max_frequency: f64,
    pub cache_size: u32,
    pub tdp: f64,
    pub hyper_threading: bool,
    pub overclocking_support: bool,
    pub single_core_score: Option<f64>,
    pub multicore_score: Option<f64>,
}

/// GPU payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GpuSpec {
    pub architecture: Option<String>,
    pub vram_type: Option<String>,
    pub vram_size: u32,
    pub core_clock: f64,
    pub boost_clock: f64,
    pub memory_clock: Option<String>,
    pub tdp: f64,
    pub ray_tracing_support: bool,
    pub dlss_support: bool,
    pub opencl_score: Option<f64>,
    pub vulkan_score: Option<f64>,
    pub cuda_score: Option<f64>,
}

/// System-on-chip payload
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocSpec {
    pub architecture: Option<String>,
    pub cpu_cores: u32,
    pub gpu_cores: u32,
    pub cpu_base_frequency: f64,
    pub cpu_max_frequency: f64,
    pub gpu_base_frequency: f64,
    pub gpu_max_frequency: f64,
    pub tdp: f64,
    pub single_core_score: Option<f64>,
    pub multicore_score: Option<f64>,
    pub opencl_score: Option<f64>,
    pub vulkan_score: Option<f64>,
    pub cuda_score: Option<f64>,
}

/// Hardware payload, one variant per resource type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HardwareSpec {
    Cpu(CpuSpec),
    Gpu(GpuSpec),
    Soc(SocSpec),
}

/// Score fields of a resource, `None` where the variant has no such score
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScoreView {
    pub single_core: Option<f64>,
    pub multicore: Option<f64>,
    pub opencl: Option<f64>,
    pub vulkan: Option<f64>,
    pub cuda: Option<f64>,
}

impl HardwareSpec {
    /// Build a fresh, unscored payload from a client patch
    pub fn from_patch(patch: HardwarePatch) -> Self {
        match patch {
            HardwarePatch::Cpu(p) => {
                let mut spec = CpuSpec::default();
                spec.apply(p);
                Self::Cpu(spec)
            }
            HardwarePatch::Gpu(p) => {
                let mut spec = GpuSpec::default();
                spec.apply(p);
                Self::Gpu(spec)
            }
            HardwarePatch::Soc(p) => {
                let mut spec = SocSpec::default();
                spec.apply(p);
                Self::Soc(spec)
            }
        }
    }

    pub fn resource_type(&self) -> ResourceType {
        match self {
            Self::Cpu(_) => ResourceType::Cpu,
            Self::Gpu(_) => ResourceType::Gpu,
            Self::Soc(_) => ResourceType::Soc,
        }
    }

    /// Merge the scores that apply to this variant
    pub fn apply_scores(&mut self, scores: &ScoreBundle) {
        match self {
            Self::Cpu(spec) => {
                spec.single_core_score = Some(scores.single_core);
                spec.multicore_score = Some(scores.multicore);
            }
            Self::Gpu(spec) => {
                spec.opencl_score = Some(scores.opencl);
                spec.vulkan_score = Some(scores.vulkan);
                spec.cuda_score = Some(scores.cuda);
            }
            Self::Soc(spec) => {
                spec.single_core_score = Some(scores.single_core);
                spec.multicore_score = Some(scores.multicore);
                spec.opencl_score = Some(scores.opencl);
                spec.vulkan_score = Some(scores.vulkan);
                spec.cuda_score = Some(scores.cuda);
            }
        }
    }

    pub fn scores(&self) -> ScoreView {
        match self {
            Self::Cpu(spec) => ScoreView {
                single_core: spec.single_core_score,
                multicore: spec.multicore_score,
                ..ScoreView::default()
            },
            Self::Gpu(spec) => ScoreView {
                opencl: spec.opencl_score,
                vulkan: spec.vulkan_score,
                cuda: spec.cuda_score,
                ..ScoreView::default()
            },
            Self::Soc(spec) => ScoreView {
                single_core: spec.single_core_score,
                multicore: spec.multicore_score,
                opencl: spec.opencl_score,
                vulkan: spec.vulkan_score,
                cuda: spec.cuda_score,
            },
        }
    }
}

impl CpuSpec {
    pub fn apply(&mut self, patch: CpuPatch) {
        if let Some(v) = patch.architecture {
            self.architecture = Some(v);
        }
        if let Some(v) = patch.cores {
            self.cores = v;
        }
        if let Some(v) = patch.threads {
            self.threads = v;
        }
        if let Some(v) = patch.base_frequency {
            self.base_frequency = v;
        }
        if let Some(v) = patch.max_frequency {
            self.max_frequency = v;
        }
        if let Some(v) = patch.cache_size {
            self.cache_size = v;
        }
        if let Some(v) = patch.tdp {
            self.tdp = v;
        }
        if let Some(v) = patch.hyper_threading {
            self.hyper_threading = v;
        }
        if let Some(v) = patch.overclocking_support {
            self.overclocking_support = v;
        }
    }
}

impl GpuSpec {
    pub fn apply(&mut self, patch: GpuPatch) {
        if let Some(v) = patch.architecture {
            self.architecture = Some(v);
        }
        if let Some(v) = patch.vram_type {
            self.vram_type = Some(v);
        }
        if let Some(v) = patch.vram_size {
            self.vram_size = v;
        }
        if let Some(v) = patch.core_clock {
            self.core_clock = v;
        }
        if let Some(v) = patch.boost_clock {
            self.boost_clock = v;
        }
        if let Some(v) = patch.memory_clock {
            self.memory_clock = Some(v);
        }
        if let Some(v) = patch.tdp {
            self.tdp = v;
        }
        if let Some(v) = patch.ray_tracing_support {
            self.ray_tracing_support = v;
        }
        if let Some(v) = patch.dlss_support {
            self.dlss_support = v;
        }
    }
}

impl SocSpec {
    pub fn apply(&mut self, patch: SocPatch) {
        if let Some(v) = patch.architecture {
            self.architecture = Some(v);
        }
        if let Some(v) = patch.cpu_cores {
            self.cpu_cores = v;
        }
        if let Some(v) = patch.gpu_cores {
            self.gpu_cores = v;
        }
        if let Some(v) = patch.cpu_base_frequency {
            self.cpu_base_frequency = v;
        }
        if let Some(v) = patch.cpu_max_frequency {
            self.cpu_max_frequency = v;
        }
        if let Some(v) = patch.gpu_base_frequency {
            self.gpu_base_frequency = v;
        }
        if let Some(v) = patch.gpu_max_frequency {
            self.gpu_max_frequency = v;
        }
        if let Some(v) = patch.tdp {
            self.tdp = v;
        }
    }
}

/// A donated compute resource
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Opaque identifier, assigned once at creation
    pub id: String,
    pub name: String,
    pub member_email: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub green_energy_type: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub region: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub availability: Vec<Availability>,
    /// Energy draw in kWh
    #[serde(rename = "kWh", default)]
    pub kwh: f64,
    #[serde(default)]
    pub status: ResourceStatus,
    #[serde(default)]
    pub current_task_id: Option<String>,
    #[serde(flatten)]
    pub hardware: HardwareSpec,
}

impl Resource {
    /// Create a new, unscored resource from a client patch
    ///
    /// The resource starts AVAILABLE with no task and a fresh id.
    pub fn from_patch(patch: ResourcePatch) -> Self {
        let ResourcePatch {
            name,
            member_email,
            common,
            hardware,
        } = patch;

        let mut resource = Self {
            id: Uuid::now_v7().to_string(),
            name,
            member_email,
            brand: None,
            model: None,
            green_energy_type: None,
            country: None,
            region: None,
            city: None,
            availability: Vec::new(),
            kwh: 0.0,
            status: ResourceStatus::Available,
            current_task_id: None,
            hardware: HardwareSpec::from_patch(hardware),
        };
        resource.apply_common(common);
        resource
    }

    pub fn resource_type(&self) -> ResourceType {
        self.hardware.resource_type()
    }

    /// Apply a client patch in place
    ///
    /// Nothing is touched when the patch targets another variant.
    pub fn apply_patch(&mut self, patch: ResourcePatch) -> Result<(), VariantMismatch> {
        let ResourcePatch {
            name,
            member_email,
            common,
            hardware,
        } = patch;

        match (&mut self.hardware, hardware) {
            (HardwareSpec::Cpu(spec), HardwarePatch::Cpu(p)) => spec.apply(p),
            (HardwareSpec::Gpu(spec), HardwarePatch::Gpu(p)) => spec.apply(p),
            (HardwareSpec::Soc(spec), HardwarePatch::Soc(p)) => spec.apply(p),
            (stored, requested) => {
                return Err(VariantMismatch {
                    stored: stored.resource_type(),
                    requested: requested.resource_type(),
                })
            }
        }

        self.name = name;
        self.member_email = member_email;
        self.apply_common(common);
        Ok(())
    }

    fn apply_common(&mut self, common: CommonPatch) {
        if let Some(v) = common.brand {
            self.brand = Some(v);
        }
        if let Some(v) = common.model {
            self.model = Some(v);
        }
        if let Some(v) = common.green_energy_type {
            self.green_energy_type = Some(v);
        }
        if let Some(v) = common.country {
            self.country = Some(v);
        }
        if let Some(v) = common.region {
            self.region = Some(v);
        }
        if let Some(v) = common.city {
            self.city = Some(v);
        }
        if let Some(v) = common.availability {
            self.availability = v;
        }
        if let Some(v) = common.kwh {
            self.kwh = v;
        }
    }

    /// Merge scores from a successful enrichment
    pub fn apply_scores(&mut self, scores: &ScoreBundle) {
        self.hardware.apply_scores(scores);
    }

    /// Apply a scheduler status message
    ///
    /// See [`TaskChange::for_message`] for the task id rule. Returns whether
    /// anything changed.
    pub fn apply_status_change(
        &mut self,
        status: ResourceStatus,
        current_task_id: Option<String>,
    ) -> bool {
        let task = TaskChange::for_message(status, current_task_id);
        self.apply_status(status, &task)
    }

    /// Set the status and adjust the task id; returns whether anything changed
    pub fn apply_status(&mut self, status: ResourceStatus, task: &TaskChange) -> bool {
        let task_id = match task {
            TaskChange::Keep => self.current_task_id.clone(),
            TaskChange::Assign(task_id) => Some(task_id.clone()),
            TaskChange::Clear => None,
        };

        let changed = self.status != status || self.current_task_id != task_id;
        self.status = status;
        self.current_task_id = task_id;
        changed
    }
}

/// What a status write does to the current task id
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskChange {
    Keep,
    Assign(String),
    Clear,
}

impl TaskChange {
    /// Task id rule for scheduler messages
    ///
    /// A present task id is always taken. An absent one clears the stored id
    /// unless the resource is going BUSY.
    pub fn for_message(status: ResourceStatus, current_task_id: Option<String>) -> Self {
        match current_task_id {
            Some(task_id) => Self::Assign(task_id),
            None if status == ResourceStatus::Busy => Self::Keep,
            None => Self::Clear,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cpu_patch(name: &str) -> ResourcePatch {
        ResourcePatch {
            name: name.to_string(),
            member_email: "ada@example.org".to_string(),
            common: CommonPatch {
                brand: Some("AMD".to_string()),
                kwh: Some(0.2),
                ..CommonPatch::default()
            },
            hardware: HardwarePatch::Cpu(CpuPatch {
                cores: Some(8),
                ..CpuPatch::default()
            }),
        }
    }

    #[test]
    fn test_new_resource_is_available_and_unscored() {
        let resource = Resource::from_patch(cpu_patch("rig"));

        assert_eq!(resource.status, ResourceStatus::Available);
        assert_eq!(resource.current_task_id, None);
        assert_eq!(resource.hardware.scores(), ScoreView::default());
        assert_eq!(resource.brand.as_deref(), Some("AMD"));
        assert!(Uuid::parse_str(&resource.id).is_ok());
    }

    #[test]
    fn test_scores_follow_variant() {
        let bundle = ScoreBundle {
            single_core: 1.0,
            multicore: 2.0,
            opencl: 3.0,
            vulkan: 4.0,
            cuda: 5.0,
        };

        let mut cpu = HardwareSpec::Cpu(CpuSpec::default());
        cpu.apply_scores(&bundle);
        assert_eq!(cpu.scores().multicore, Some(2.0));
        assert_eq!(cpu.scores().cuda, None);

        let mut gpu = HardwareSpec::Gpu(GpuSpec::default());
        gpu.apply_scores(&bundle);
        assert_eq!(gpu.scores().single_core, None);
        assert_eq!(gpu.scores().vulkan, Some(4.0));

        let mut soc = HardwareSpec::Soc(SocSpec::default());
        soc.apply_scores(&bundle);
        assert_eq!(soc.scores().single_core, Some(1.0));
        assert_eq!(soc.scores().cuda, Some(5.0));
    }

    #[test]
    fn test_patch_keeps_absent_fields() {
        let mut resource = Resource::from_patch(cpu_patch("rig"));
        let mut patch = cpu_patch("rig");
        patch.common.brand = None;
        patch.hardware = HardwarePatch::Cpu(CpuPatch {
            threads: Some(16),
            ..CpuPatch::default()
        });

        resource.apply_patch(patch).unwrap();

        assert_eq!(resource.brand.as_deref(), Some("AMD"));
        match &resource.hardware {
            HardwareSpec::Cpu(spec) => {
                assert_eq!(spec.cores, 8);
                assert_eq!(spec.threads, 16);
            }
            other => panic!("unexpected variant {:?}", other),
        }
    }

    #[test]
    fn test_patch_rejects_other_variant() {
        let mut resource = Resource::from_patch(cpu_patch("rig"));
        let before = resource.clone();
        let mut patch = cpu_patch("renamed");
        patch.hardware = HardwarePatch::Gpu(GpuPatch::default());

        assert_eq!(
            resource.apply_patch(patch),
            Err(VariantMismatch {
                stored: ResourceType::Cpu,
                requested: ResourceType::Gpu,
            })
        );
        assert_eq!(resource, before);
    }

    #[test]
    fn test_status_change_task_rule() {
        let mut resource = Resource::from_patch(cpu_patch("rig"));

        assert!(resource.apply_status_change(ResourceStatus::Busy, Some("t-1".to_string())));
        assert!(!resource.apply_status_change(ResourceStatus::Busy, None));
        assert_eq!(resource.current_task_id.as_deref(), Some("t-1"));

        assert!(resource.apply_status_change(ResourceStatus::Available, None));
        assert_eq!(resource.current_task_id, None);
        assert!(!resource.apply_status_change(ResourceStatus::Available, None));
    }

    #[test]
    fn test_document_shape() {
        let resource = Resource::from_patch(cpu_patch("rig"));
        let json = serde_json::to_value(&resource).unwrap();

        assert_eq!(json["type"], "cpu");
        assert_eq!(json["kWh"], 0.2);
        assert_eq!(json["memberEmail"], "ada@example.org");
        assert_eq!(json["status"], "AVAILABLE");

        let back: Resource = serde_json::from_value(json).unwrap();
        assert_eq!(back, resource);
    }
}
