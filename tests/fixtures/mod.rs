// Copyright (c) 2025 - Cowboy AI, Inc.
//! Test Fixtures for resource-directory
//!
//! Deterministic resource payloads and a fully wired directory running on
//! the in-memory broker and store.
//!
//! # Design Principles
//! - Fixed names, owners and schedules; only resource ids are generated
//! - The fake scoring service derives its scores from the requested name,
//!   so a test can tell which name was scored
//! - No NATS server or database is needed

#![allow(dead_code)]

use bytes::Bytes;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use futures::future::BoxFuture;
use futures::StreamExt;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use resource_directory::domain::{Availability, DayOfWeek};
use resource_directory::dto::{CpuDto, GpuDto, HardwareDto, ResourceDto, ScoreReply, ScoreRequest, SocDto};
use resource_directory::messaging::{InMemoryTransport, MessageProcessor, MessageTransport, Messenger};
use resource_directory::repository::InMemoryResourceRepository;
use resource_directory::service::{ResourceDirectory, ScoringClient, StatusSynchronizer};
use resource_directory::subjects::BrokerTopology;

pub const MEMBER_EMAIL: &str = "ada@example.org";
pub const OTHER_MEMBER_EMAIL: &str = "grace@example.org";

/// Exchange timeout used by every harness
pub const TEST_TIMEOUT: Duration = Duration::from_millis(50);

/// Score the fake scoring service assigns to a name
pub fn expected_single_core(name: &str) -> f64 {
    name.len() as f64 * 100.0
}

/// The fake scoring service's answer for a name
pub fn score_reply_for(name: &str) -> ScoreReply {
    let single = expected_single_core(name);
    ScoreReply {
        score: single,
        multicore_score: single * 8.0,
        opencl: single + 1.0,
        vulkan: single + 2.0,
        cuda: single + 3.0,
    }
}

/// Fixed Monday for time-window queries (2024-01-01)
pub fn monday_at(hour: u32, minute: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(hour, minute, 0))
        .expect("Invalid fixture time")
}

pub fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).expect("Invalid fixture time")
}

pub fn slot(day: DayOfWeek, start: (u32, u32), end: (u32, u32)) -> Availability {
    Availability::new(day, time(start.0, start.1), time(end.0, end.1))
}

/// Monday 09:00-12:00
pub fn monday_morning() -> Vec<Availability> {
    vec![slot(DayOfWeek::Monday, (9, 0), (12, 0))]
}

fn base(name: &str, hardware: HardwareDto) -> ResourceDto {
    ResourceDto {
        id: None,
        name: name.to_string(),
        member_email: MEMBER_EMAIL.to_string(),
        brand: Some("Acme".to_string()),
        model: Some("A1".to_string()),
        green_energy_type: Some("solar".to_string()),
        country: Some("IT".to_string()),
        region: Some("Puglia".to_string()),
        city: Some("Lecce".to_string()),
        availability: Some(monday_morning()),
        kwh: Some(0.25),
        status: None,
        current_task_id: None,
        hardware,
    }
}

pub fn cpu_dto(name: &str) -> ResourceDto {
    base(
        name,
        HardwareDto::Cpu(CpuDto {
            architecture: Some("x86_64".to_string()),
            cores: Some(8),
            threads: Some(16),
            base_frequency: Some(3.4),
            max_frequency: Some(4.9),
            cache_size: Some(32),
            tdp: Some(105.0),
            hyper_threading: Some(true),
            overclocking_support: Some(false),
            ..CpuDto::default()
        }),
    )
}

pub fn gpu_dto(name: &str) -> ResourceDto {
    base(
        name,
        HardwareDto::Gpu(GpuDto {
            architecture: Some("Ada".to_string()),
            vram_type: Some("GDDR6X".to_string()),
            vram_size: Some(24),
            tdp: Some(450.0),
            ray_tracing_support: Some(true),
            ..GpuDto::default()
        }),
    )
}

pub fn soc_dto(name: &str) -> ResourceDto {
    base(
        name,
        HardwareDto::Soc(SocDto {
            architecture: Some("arm64".to_string()),
            cpu_cores: Some(4),
            gpu_cores: Some(10),
            tdp: Some(15.0),
            ..SocDto::default()
        }),
    )
}

/// Directory, store, broker and listeners wired together in memory
pub struct Harness {
    pub transport: InMemoryTransport,
    pub repository: InMemoryResourceRepository,
    pub topology: BrokerTopology,
    pub directory: ResourceDirectory,
    pub synchronizer: StatusSynchronizer,
}

impl Harness {
    /// Harness whose scoring service answers every request
    pub fn new() -> Self {
        let harness = Self::without_scorer();
        harness.install_scorer();
        harness
    }

    /// Harness with nobody answering on the score route
    pub fn without_scorer() -> Self {
        let transport = InMemoryTransport::new();
        let repository = InMemoryResourceRepository::new();
        let topology = BrokerTopology::default();
        let messenger = Messenger::with_timeout(Arc::new(transport.clone()), TEST_TIMEOUT);

        let directory = ResourceDirectory::new(
            Arc::new(repository.clone()),
            ScoringClient::new(messenger.clone(), topology.score.clone()),
            messenger,
            topology.new_resource.clone(),
        );
        let synchronizer = StatusSynchronizer::new(Arc::new(repository.clone()));

        Self {
            transport,
            repository,
            topology,
            directory,
            synchronizer,
        }
    }

    /// Answer score requests with name-derived scores
    pub fn install_scorer(&self) {
        self.transport.respond_with(self.topology.score.subject(), |payload| {
            let request: ScoreRequest = serde_json::from_slice(&payload).ok()?;
            let reply = score_reply_for(&request.resource_name);
            serde_json::to_vec(&reply).ok().map(Bytes::from)
        });
    }

    /// Scoring service subscribed on the broker
    ///
    /// Each request is handled in its own task: `before_reply` runs first,
    /// then the name-derived reply is sent. Use on a harness built with
    /// [`Harness::without_scorer`] so requests reach the subscription.
    pub async fn spawn_scorer<F>(&self, before_reply: F) -> JoinHandle<()>
    where
        F: Fn(ScoreRequest) -> BoxFuture<'static, ()> + Send + Sync + 'static,
    {
        let route = &self.topology.score;
        let mut requests = self
            .transport
            .subscribe(&route.routing_key, &route.exchange, None)
            .await
            .expect("subscribe scorer");
        let transport = self.transport.clone();
        let before_reply = Arc::new(before_reply);

        tokio::spawn(async move {
            while let Some(delivery) = requests.next().await {
                let transport = transport.clone();
                let before_reply = before_reply.clone();
                tokio::spawn(async move {
                    let request: ScoreRequest =
                        serde_json::from_slice(&delivery.payload).expect("score request is JSON");
                    let reply = score_reply_for(&request.resource_name);
                    before_reply(request).await;
                    let payload = serde_json::to_vec(&reply).expect("score reply encodes");
                    transport
                        .reply(&delivery, Bytes::from(payload))
                        .await
                        .expect("score reply sent");
                });
            }
        })
    }

    /// Make the scoring service stay silent
    pub fn silence_scorer(&self) {
        self.transport
            .respond_with(self.topology.score.subject(), |_| None);
    }

    /// Score requests seen so far
    pub fn score_requests(&self) -> Vec<ScoreRequest> {
        self.transport
            .requests_on(&self.topology.score.subject())
            .iter()
            .map(|m| m.json().expect("score request is JSON"))
            .collect()
    }

    pub fn processor(&self) -> MessageProcessor {
        MessageProcessor::new(Arc::new(self.transport.clone()))
    }
}
