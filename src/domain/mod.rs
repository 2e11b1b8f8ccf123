// Copyright (c) 2025 - Cowboy AI, Inc.
//! Resource Domain Models
//!
//! Core concepts of the directory: the [`Resource`] entity with its
//! hardware variants, the weekly [`Availability`] schedule, the
//! client-writable [`ResourcePatch`] and the [`ResourceQueryFilters`]
//! predicate.
//!
//! # Value Objects with Invariants
//!
//! - [`Availability`] - weekly window spanning a positive multiple of 30 minutes
//! - [`ResourceStatus`] - AVAILABLE, BUSY or UNAVAILABLE
//! - [`ScoreBundle`] - benchmark results from the scoring service
//!
//! # Entities
//!
//! - [`Resource`] - one donated compute unit, keyed by an immutable id and
//!   unique per `(name, member_email)`

pub mod availability;
pub mod filters;
pub mod patch;
pub mod resource;

pub use availability::{validate_all, Availability, AvailabilityError, DayOfWeek, SLOT_MINUTES};
pub use filters::ResourceQueryFilters;
pub use patch::{CommonPatch, CpuPatch, GpuPatch, HardwarePatch, ResourcePatch, SocPatch};
pub use resource::{
    CpuSpec, GpuSpec, HardwareSpec, Resource, ResourceStatus, ResourceType, ScoreBundle,
    ScoreView, SocSpec, TaskChange, VariantMismatch,
};
