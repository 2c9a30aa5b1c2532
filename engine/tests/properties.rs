//! Property-based tests for the task list and cache codec.

use justdo_engine::{cache, Task, TaskList, LOCAL_OWNER};
use proptest::prelude::*;

fn arb_task(index: usize) -> impl Strategy<Value = Task> {
    (
        "[a-zA-Z0-9 ]{1,24}",
        any::<bool>(),
        proptest::option::of(any::<i64>()),
        proptest::option::of("[a-z ]{0,16}"),
        any::<i64>(),
    )
        .prop_map(move |(title, completed, due_date, notes, created_at)| Task {
            id: format!("{created_at}-{index}"),
            title,
            completed,
            due_date,
            notes,
            created_at,
            uid: LOCAL_OWNER.to_string(),
        })
}

fn arb_tasks() -> impl Strategy<Value = Vec<Task>> {
    (0usize..12).prop_flat_map(|len| {
        (0..len).map(arb_task).collect::<Vec<_>>()
    })
}

proptest! {
    #[test]
    fn prop_cache_roundtrip(tasks in arb_tasks()) {
        let blob = cache::encode(&tasks).unwrap();
        let restored = cache::decode(&blob).unwrap();
        prop_assert_eq!(&restored, &tasks);

        // Saving what was loaded writes the same blob again
        prop_assert_eq!(cache::encode(&restored).unwrap(), blob);
    }

    #[test]
    fn prop_double_toggle_restores(tasks in arb_tasks(), pick in any::<prop::sample::Index>()) {
        prop_assume!(!tasks.is_empty());
        let mut list = TaskList::from(tasks);
        let id = list.as_slice()[pick.index(list.len())].id.clone();
        let before = list.clone();

        list.toggle(&id);
        list.toggle(&id);

        prop_assert_eq!(list, before);
    }

    #[test]
    fn prop_delete_unknown_is_noop(tasks in arb_tasks(), id in "[x-z]{3,8}") {
        let mut list = TaskList::from(tasks);
        let before = list.clone();

        prop_assert!(list.remove(&id).is_none());
        prop_assert_eq!(list, before);
    }

    #[test]
    fn prop_counts_partition_list(tasks in arb_tasks()) {
        let list = TaskList::from(tasks);
        let counts = list.counts();
        prop_assert_eq!(counts.active + counts.completed, counts.total);
        prop_assert_eq!(counts.total, list.len());
    }
}
