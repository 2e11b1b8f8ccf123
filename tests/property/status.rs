// Copyright (c) 2025 - Cowboy AI, Inc.
//! Properties of scheduler status changes

use proptest::prelude::*;
use resource_directory::domain::{
    CommonPatch, HardwarePatch, Resource, ResourcePatch, ResourceStatus, SocPatch,
};

fn resource() -> Resource {
    Resource::from_patch(ResourcePatch {
        name: "pi".to_string(),
        member_email: "ada@example.org".to_string(),
        common: CommonPatch::default(),
        hardware: HardwarePatch::Soc(SocPatch::default()),
    })
}

fn status() -> impl Strategy<Value = ResourceStatus> {
    prop_oneof![
        Just(ResourceStatus::Available),
        Just(ResourceStatus::Busy),
        Just(ResourceStatus::Unavailable),
    ]
}

fn change() -> impl Strategy<Value = (ResourceStatus, Option<String>)> {
    (status(), prop::option::of("task-[0-9]{1,3}"))
}

proptest! {
    /// Re-applying the last change never reports a modification
    #[test]
    fn prop_redelivery_is_idempotent(history in prop::collection::vec(change(), 1..12)) {
        let mut resource = resource();
        for (status, task) in &history {
            resource.apply_status_change(*status, task.clone());
        }
        let before = resource.clone();

        let (status, task) = history.last().cloned().unwrap();
        prop_assert!(!resource.apply_status_change(status, task));
        prop_assert_eq!(resource, before);
    }

    /// Only a BUSY resource can hold on to a task it was not handed again
    #[test]
    fn prop_absent_task_clears_unless_busy(
        history in prop::collection::vec(change(), 0..8),
        status in status(),
    ) {
        let mut resource = resource();
        for (s, task) in history {
            resource.apply_status_change(s, task);
        }
        let held = resource.current_task_id.clone();

        resource.apply_status_change(status, None);

        prop_assert_eq!(resource.status, status);
        if status == ResourceStatus::Busy {
            prop_assert_eq!(resource.current_task_id, held);
        } else {
            prop_assert_eq!(resource.current_task_id, None);
        }
    }

    /// A task id carried by the message always wins
    #[test]
    fn prop_present_task_is_taken(status in status(), task in "task-[0-9]{1,3}") {
        let mut resource = resource();
        resource.apply_status_change(ResourceStatus::Busy, Some("earlier".to_string()));

        resource.apply_status_change(status, Some(task.clone()));

        prop_assert_eq!(resource.current_task_id, Some(task));
    }
}
