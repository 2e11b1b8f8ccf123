// Copyright (c) 2025 - Cowboy AI, Inc.
//! Client-facing resource representation
//!
//! [`ResourceDto`] is what the HTTP collaborator sends and receives. The
//! `type` field selects the [`HardwareDto`] variant, and the domain enum is
//! mapped from the same tag, so there is one source of truth for the
//! variant.
//!
//! Outbound DTOs carry scores, status and task id. Inbound ones may carry
//! them too, but the conversion into [`ResourcePatch`] drops them.

use serde::{Deserialize, Serialize};

use crate::domain::{
    Availability, CommonPatch, CpuPatch, CpuSpec, GpuPatch, GpuSpec, HardwarePatch, HardwareSpec,
    Resource, ResourcePatch, ResourceStatus, ResourceType, SocPatch, SocSpec,
};

/// Resource as exchanged with clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
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
    pub availability: Option<Vec<Availability>>,
    #[serde(rename = "kWh", default)]
    pub kwh: Option<f64>,
    #[serde(default)]
    pub status: Option<ResourceStatus>,
    #[serde(default)]
    pub current_task_id: Option<String>,
    #[serde(flatten)]
    pub hardware: HardwareDto,
}

/// Variant payload of a [`ResourceDto`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HardwareDto {
    Cpu(CpuDto),
    Gpu(GpuDto),
    Soc(SocDto),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CpuDto {
    pub architecture: Option<String>,
    pub cores: Option<u32>,
    pub threads: Option<u32>,
    pub base_frequency: Option<f64>,
    pub max_frequency: Option<f64>,
    pub cache_size: Option<u32>,
    pub tdp: Option<f64>,
    pub hyper_threading: Option<bool>,
    pub overclocking_support: Option<bool>,
    pub single_core_score: Option<f64>,
    pub multicore_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GpuDto {
    pub architecture: Option<String>,
    pub vram_type: Option<String>,
    pub vram_size: Option<u32>,
    pub core_clock: Option<f64>,
    pub boost_clock: Option<f64>,
    pub memory_clock: Option<String>,
    pub tdp: Option<f64>,
    pub ray_tracing_support: Option<bool>,
    pub dlss_support: Option<bool>,
    pub opencl_score: Option<f64>,
    pub vulkan_score: Option<f64>,
    pub cuda_score: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SocDto {
    pub architecture: Option<String>,
    pub cpu_cores: Option<u32>,
    pub gpu_cores: Option<u32>,
    pub cpu_base_frequency: Option<f64>,
    pub cpu_max_frequency: Option<f64>,
    pub gpu_base_frequency: Option<f64>,
    pub gpu_max_frequency: Option<f64>,
    pub tdp: Option<f64>,
    pub single_core_score: Option<f64>,
    pub multicore_score: Option<f64>,
    pub opencl_score: Option<f64>,
    pub vulkan_score: Option<f64>,
    pub cuda_score: Option<f64>,
}

impl ResourceDto {
    pub fn resource_type(&self) -> ResourceType {
        match self.hardware {
            HardwareDto::Cpu(_) => ResourceType::Cpu,
            HardwareDto::Gpu(_) => ResourceType::Gpu,
            HardwareDto::Soc(_) => ResourceType::Soc,
        }
    }
}

impl From<ResourceDto> for ResourcePatch {
    fn from(dto: ResourceDto) -> Self {
        ResourcePatch {
            name: dto.name,
            member_email: dto.member_email,
            common: CommonPatch {
                brand: dto.brand,
                model: dto.model,
                green_energy_type: dto.green_energy_type,
                country: dto.country,
                region: dto.region,
                city: dto.city,
                availability: dto.availability,
                kwh: dto.kwh,
            },
            hardware: dto.hardware.into(),
        }
    }
}

impl From<HardwareDto> for HardwarePatch {
    fn from(dto: HardwareDto) -> Self {
        match dto {
            HardwareDto::Cpu(cpu) => HardwarePatch::Cpu(CpuPatch {
                architecture: cpu.architecture,
                cores: cpu.cores,
                threads: cpu.threads,
                base_frequency: cpu.base_frequency,
                max_frequency: cpu.max_frequency,
                cache_size: cpu.cache_size,
                tdp: cpu.tdp,
                hyper_threading: cpu.hyper_threading,
                overclocking_support: cpu.overclocking_support,
            }),
            HardwareDto::Gpu(gpu) => HardwarePatch::Gpu(GpuPatch {
                architecture: gpu.architecture,
                vram_type: gpu.vram_type,
                vram_size: gpu.vram_size,
                core_clock: gpu.core_clock,
                boost_clock: gpu.boost_clock,
                memory_clock: gpu.memory_clock,
                tdp: gpu.tdp,
                ray_tracing_support: gpu.ray_tracing_support,
                dlss_support: gpu.dlss_support,
            }),
            HardwareDto::Soc(soc) => HardwarePatch::Soc(SocPatch {
                architecture: soc.architecture,
                cpu_cores: soc.cpu_cores,
                gpu_cores: soc.gpu_cores,
                cpu_base_frequency: soc.cpu_base_frequency,
                cpu_max_frequency: soc.cpu_max_frequency,
                gpu_base_frequency: soc.gpu_base_frequency,
                gpu_max_frequency: soc.gpu_max_frequency,
                tdp: soc.tdp,
            }),
        }
    }
}

impl From<&CpuSpec> for CpuDto {
    fn from(spec: &CpuSpec) -> Self {
        CpuDto {
            architecture: spec.architecture.clone(),
            cores: Some(spec.cores),
            threads: Some(spec.threads),
            base_frequency: Some(spec.base_frequency),
            max_frequency: Some(spec.max_frequency),
            cache_size: Some(spec.cache_size),
            tdp: Some(spec.tdp),
            hyper_threading: Some(spec.hyper_threading),
            overclocking_support: Some(spec.overclocking_support),
            single_core_score: spec.single_core_score,
            multicore_score: spec.multicore_score,
        }
    }
}

impl From<&GpuSpec> for GpuDto {
    fn from(spec: &GpuSpec) -> Self {
        GpuDto {
            architecture: spec.architecture.clone(),
            vram_type: spec.vram_type.clone(),
            vram_size: Some(spec.vram_size),
            core_clock: Some(spec.core_clock),
            boost_clock: Some(spec.boost_clock),
            memory_clock: spec.memory_clock.clone(),
            tdp: Some(spec.tdp),
            ray_tracing_support: Some(spec.ray_tracing_support),
            dlss_support: Some(spec.dlss_support),
            opencl_score: spec.opencl_score,
            vulkan_score: spec.vulkan_score,
            cuda_score: spec.cuda_score,
        }
    }
}

impl From<&SocSpec> for SocDto {
    fn from(spec: &SocSpec) -> Self {
        SocDto {
            architecture: spec.architecture.clone(),
            cpu_cores: Some(spec.cpu_cores),
            gpu_cores: Some(spec.gpu_cores),
            cpu_base_frequency: Some(spec.cpu_base_frequency),
            cpu_max_frequency: Some(spec.cpu_max_frequency),
            gpu_base_frequency: Some(spec.gpu_base_frequency),
            gpu_max_frequency: Some(spec.gpu_max_frequency),
            tdp: Some(spec.tdp),
            single_core_score: spec.single_core_score,
            multicore_score: spec.multicore_score,
            opencl_score: spec.opencl_score,
            vulkan_score: spec.vulkan_score,
            cuda_score: spec.cuda_score,
        }
    }
}

impl From<&HardwareSpec> for HardwareDto {
    fn from(spec: &HardwareSpec) -> Self {
        match spec {
            HardwareSpec::Cpu(cpu) => HardwareDto::Cpu(cpu.into()),
            HardwareSpec::Gpu(gpu) => HardwareDto::Gpu(gpu.into()),
            HardwareSpec::Soc(soc) => HardwareDto::Soc(soc.into()),
        }
    }
}

impl From<&Resource> for ResourceDto {
    fn from(resource: &Resource) -> Self {
        ResourceDto {
            id: Some(resource.id.clone()),
            name: resource.name.clone(),
            member_email: resource.member_email.clone(),
            brand: resource.brand.clone(),
            model: resource.model.clone(),
            green_energy_type: resource.green_energy_type.clone(),
            country: resource.country.clone(),
            region: resource.region.clone(),
            city: resource.city.clone(),
            availability: Some(resource.availability.clone()),
            kwh: Some(resource.kwh),
            status: Some(resource.status),
            current_task_id: resource.current_task_id.clone(),
            hardware: (&resource.hardware).into(),
        }
    }
}
