// Copyright (c) 2025 - Cowboy AI, Inc.
//! Wire-level shapes and their mapping to the domain
//!
//! ```text
//! ResourceDto ──into──► ResourcePatch ──► Resource ──from──► ResourceDto
//!                                            └────from──► ResourceMessageDto
//! ```

pub mod messages;
pub mod resource;

pub use messages::{ResourceMessageDto, ResourceStatusMessage, ScoreReply, ScoreRequest};
pub use resource::{CpuDto, GpuDto, HardwareDto, ResourceDto, SocDto};
