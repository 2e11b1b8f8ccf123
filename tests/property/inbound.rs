// Copyright (c) 2025 - Cowboy AI, Inc.
//! Properties of inbound resource payloads

use proptest::prelude::*;
use resource_directory::domain::{Resource, ResourcePatch, ResourceStatus, ScoreView};
use resource_directory::dto::{CpuDto, GpuDto, HardwareDto, ResourceDto, SocDto};

fn score() -> impl Strategy<Value = Option<f64>> {
    prop::option::of(0.0f64..100_000.0)
}

fn status() -> impl Strategy<Value = Option<ResourceStatus>> {
    prop::option::of(prop_oneof![
        Just(ResourceStatus::Available),
        Just(ResourceStatus::Busy),
        Just(ResourceStatus::Unavailable),
    ])
}

fn hardware() -> impl Strategy<Value = HardwareDto> {
    prop_oneof![
        (score(), score()).prop_map(|(single, multi)| HardwareDto::Cpu(CpuDto {
            single_core_score: single,
            multicore_score: multi,
            ..CpuDto::default()
        })),
        (score(), score(), score()).prop_map(|(opencl, vulkan, cuda)| HardwareDto::Gpu(GpuDto {
            opencl_score: opencl,
            vulkan_score: vulkan,
            cuda_score: cuda,
            ..GpuDto::default()
        })),
        (score(), score(), score()).prop_map(|(single, opencl, cuda)| HardwareDto::Soc(SocDto {
            single_core_score: single,
            opencl_score: opencl,
            cuda_score: cuda,
            ..SocDto::default()
        })),
    ]
}

fn payload() -> impl Strategy<Value = ResourceDto> {
    (
        "[a-z]{1,12}",
        hardware(),
        status(),
        prop::option::of("task-[0-9]{1,3}"),
    )
        .prop_map(|(name, hardware, status, current_task_id)| ResourceDto {
            id: None,
            name,
            member_email: "ada@example.org".to_string(),
            brand: None,
            model: None,
            green_energy_type: None,
            country: None,
            region: None,
            city: None,
            availability: None,
            kwh: Some(0.3),
            status,
            current_task_id,
            hardware,
        })
}

proptest! {
    /// Client-sent scores, status and task id never reach a new resource
    #[test]
    fn prop_new_resource_ignores_server_fields(dto in payload()) {
        let expected_type = dto.resource_type();
        let resource = Resource::from_patch(ResourcePatch::from(dto));

        prop_assert_eq!(resource.resource_type(), expected_type);
        prop_assert_eq!(resource.status, ResourceStatus::Available);
        prop_assert_eq!(resource.current_task_id, None);
        prop_assert_eq!(resource.hardware.scores(), ScoreView::default());
    }

    /// Patching with any payload of the same variant keeps server fields
    #[test]
    fn prop_patch_keeps_server_fields(original in payload(), update in payload()) {
        prop_assume!(original.resource_type() == update.resource_type());

        let mut resource = Resource::from_patch(ResourcePatch::from(original));
        resource.apply_status_change(ResourceStatus::Busy, Some("task-0".to_string()));
        let before = resource.clone();

        resource.apply_patch(ResourcePatch::from(update)).unwrap();

        prop_assert_eq!(resource.id, before.id);
        prop_assert_eq!(resource.status, before.status);
        prop_assert_eq!(resource.current_task_id, before.current_task_id);
        prop_assert_eq!(resource.hardware.scores(), before.hardware.scores());
    }
}
