// Copyright (c) 2025 - Cowboy AI, Inc.
//! Broker message shapes
//!
//! - [`ResourceMessageDto`] - outbound new/updated-resource event
//! - [`ResourceStatusMessage`] - inbound assignment and deallocation
//! - [`ScoreRequest`] / [`ScoreReply`] - scoring service request/reply

use serde::{Deserialize, Serialize};

use crate::domain::{Availability, Resource, ResourceStatus, ResourceType, ScoreBundle};

/// Flattened resource projection published for the scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceMessageDto {
    pub id: String,
    pub name: String,
    pub availability: Vec<Availability>,
    #[serde(rename = "kWh")]
    pub kwh: f64,
    pub member_email: String,
    pub status: ResourceStatus,
    pub current_task_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub single_core_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multicore_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opencl_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vulkan_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cuda_score: Option<f64>,
}

impl From<&Resource> for ResourceMessageDto {
    fn from(resource: &Resource) -> Self {
        let scores = resource.hardware.scores();
        ResourceMessageDto {
            id: resource.id.clone(),
            name: resource.name.clone(),
            availability: resource.availability.clone(),
            kwh: resource.kwh,
            member_email: resource.member_email.clone(),
            status: resource.status,
            current_task_id: resource.current_task_id.clone(),
            single_core_score: scores.single_core,
            multicore_score: scores.multicore,
            opencl_score: scores.opencl,
            vulkan_score: scores.vulkan,
            cuda_score: scores.cuda,
        }
    }
}

/// Scheduler status update for one resource
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceStatusMessage {
    pub id: String,
    pub status: ResourceStatus,
    #[serde(default)]
    pub current_task_id: Option<String>,
}

/// Request sent to the scoring service
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreRequest {
    pub resource_name: String,
    pub resource_type: ResourceType,
}

impl ScoreRequest {
    pub fn new(resource_name: impl Into<String>, resource_type: ResourceType) -> Self {
        Self {
            resource_name: resource_name.into(),
            resource_type,
        }
    }
}

/// Scoring service reply
///
/// Field names are the scoring service's own; missing fields read as zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreReply {
    pub score: f64,
    pub multicore_score: f64,
    pub opencl: f64,
    pub vulkan: f64,
    pub cuda: f64,
}

impl From<ScoreReply> for ScoreBundle {
    fn from(reply: ScoreReply) -> Self {
        ScoreBundle {
            single_core: reply.score,
            multicore: reply.multicore_score,
            opencl: reply.opencl,
            vulkan: reply.vulkan,
            cuda: reply.cuda,
        }
    }
}
