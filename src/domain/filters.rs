// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource lookup filters

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::resource::{Resource, ResourceStatus, ResourceType};

/// All-optional filter set for directory lookups
///
/// Every present field narrows the result (logical AND). String fields
/// match exactly and `kwh` is a ceiling. When `status` is absent only
/// AVAILABLE resources match.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ResourceQueryFilters {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: Option<ResourceType>,
    pub green_energy_type: Option<String>,
    pub country: Option<String>,
    pub region: Option<String>,
    pub city: Option<String>,
    pub from: Option<NaiveDateTime>,
    pub to: Option<NaiveDateTime>,
    #[serde(rename = "kWh")]
    pub kwh: Option<f64>,
    pub member_email: Option<String>,
    pub status: Option<ResourceStatus>,
}

fn matches_text(wanted: &Option<String>, actual: &Option<String>) -> bool {
    match wanted {
        Some(wanted) => actual.as_deref() == Some(wanted.as_str()),
        None => true,
    }
}

impl ResourceQueryFilters {
    /// Status the lookup will actually filter on
    pub fn effective_status(&self) -> ResourceStatus {
        self.status.unwrap_or(ResourceStatus::Available)
    }

    pub fn with_status(mut self, status: ResourceStatus) -> Self {
        self.status = Some(status);
        self
    }

    /// Evaluate the conjunctive predicate against one resource
    pub fn matches(&self, resource: &Resource) -> bool {
        if resource.status != self.effective_status() {
            return false;
        }
        if let Some(name) = &self.name {
            if &resource.name != name {
                return false;
            }
        }
        if let Some(resource_type) = self.resource_type {
            if resource.resource_type() != resource_type {
                return false;
            }
        }
        if let Some(member_email) = &self.member_email {
            if &resource.member_email != member_email {
                return false;
            }
        }
        if let Some(ceiling) = self.kwh {
            if resource.kwh > ceiling {
                return false;
            }
        }

        matches_text(&self.green_energy_type, &resource.green_energy_type)
            && matches_text(&self.country, &resource.country)
            && matches_text(&self.region, &resource.region)
            && matches_text(&self.city, &resource.city)
            && self.matches_window(resource)
    }

    fn matches_window(&self, resource: &Resource) -> bool {
        let windows = &resource.availability;
        match (&self.from, &self.to) {
            (None, None) => true,
            (Some(from), None) => windows.iter().any(|w| w.covers_start(from)),
            (None, Some(to)) => windows.iter().any(|w| w.covers_end(to)),
            (Some(from), Some(to)) => windows.iter().any(|w| w.covers_range(from, to)),
        }
    }
}
