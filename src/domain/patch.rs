// Copyright (c) 2025 - Cowboy AI, Inc.
//! Client-mutable resource fields
//!
//! A [`ResourcePatch`] is everything a member may set on a resource. Every
//! attribute is "set if present". There are no score, status or task fields
//! here, so a client payload cannot reach them.

use super::availability::Availability;
use super::resource::ResourceType;

/// Attributes shared by every variant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommonPatch {
    pub brand: Option<String>,
    pub model: Option<String>,
    pub green_energy_type: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub availability: Option<Vec<Availability>>,
    pub kwh: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuPatch {
    pub architecture: Option<String>,
    pub cores: Option<u32>,
    pub threads: Option<u32>,
    pub base_frequency: Option<f64>,
    pub max_frequency: Option<f64>,
    pub cache_size: Option<u32>,
    pub tdp: Option<f64>,
    pub hyper_threading: Option<bool>,
    pub overclocking_support: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpuPatch {
    pub architecture: Option<String>,
    pub vram_type: Option<String>,
    pub vram_size: Option<u32>,
    pub core_clock: Option<f64>,
    pub boost_clock: Option<f64>,
    pub memory_clock: Option<String>,
    pub tdp: Option<f64>,
    pub ray_tracing_support: Option<bool>,
    pub dlss_support: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SocPatch {
    pub architecture: Option<String>,
    pub cpu_cores: Option<u32>,
    pub gpu_cores: Option<u32>,
    pub cpu_base_frequency: Option<f64>,
    pub cpu_max_frequency: Option<f64>,
    pub gpu_base_frequency: Option<f64>,
    pub gpu_max_frequency: Option<f64>,
    pub tdp: Option<f64>,
}

/// Variant-specific attributes
#[derive(Debug, Clone, PartialEq)]
pub enum HardwarePatch {
    Cpu(CpuPatch),
    Gpu(GpuPatch),
    Soc(SocPatch),
}

impl HardwarePatch {
    pub fn resource_type(&self) -> ResourceType {
        match self {
            Self::Cpu(_) => ResourceType::Cpu,
            Self::Gpu(_) => ResourceType::Gpu,
            Self::Soc(_) => ResourceType::Soc,
        }
    }
}

/// A client's create or update request
///
/// `name` and `member_email` identify the resource to its owner and are
/// always carried.
#[derive(Debug, Clone, PartialEq)]
pub struct ResourcePatch {
    pub name: String,
    pub member_email: String,
    pub common: CommonPatch,
    pub hardware: HardwarePatch,
}

impl ResourcePatch {
    pub fn resource_type(&self) -> ResourceType {
        self.hardware.resource_type()
    }

    /// Windows this patch would write, if any
    pub fn availability(&self) -> Option<&[Availability]> {
        self.common.availability.as_deref()
    }
}
