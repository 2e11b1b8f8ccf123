// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Entry Point
//!
//! proptest checks of the scheduling rules that must hold for every input:
//! the half-hour availability rule, status-change idempotence and the
//! client-immutable fields of inbound payloads.

mod property;
