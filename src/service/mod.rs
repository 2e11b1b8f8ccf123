// Copyright (c) 2025 - Cowboy AI, Inc.
//! Service Layer for the Resource Directory
//!
//! # Architecture
//!
//! ```text
//! HTTP collaborator                    Scheduler
//!     ↓                                    ↓ assignment / deallocation
//! ResourceDirectory ──► ScoringClient   StatusHandler
//!     ↓            (blocking exchange)     ↓
//! ResourceRepository ◄──────────── StatusSynchronizer
//!     ↓
//! new/updated-resource event ──► Scheduler
//! ```
//!
//! - [`ResourceDirectory`] owns writes from clients and is the only place
//!   that runs score enrichment
//! - [`StatusSynchronizer`] owns status and task id changes from the
//!   scheduler and never publishes

pub mod directory;
pub mod scoring;
pub mod status_sync;

pub use directory::{DirectoryError, DirectoryResult, ResourceDirectory, ResourceDirectoryService};
pub use scoring::{ScoringClient, ScoringError, ScoringResult};
pub use status_sync::{
    spawn_status_listeners, StatusChannel, StatusHandler, StatusOutcome, StatusSyncError,
    StatusSyncResult, StatusSynchronizer,
};
