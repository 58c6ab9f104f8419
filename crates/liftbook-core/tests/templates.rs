use liftbook_core::{
    ErrorKind, ExerciseEntry, PageRequest, SqliteStore, WorkoutRequest, WorkoutStore,
};
use uuid::Uuid;

struct Catalog {
    squat: Uuid,
    bench: Uuid,
    row: Uuid,
}

fn setup() -> (SqliteStore, Uuid, Catalog) {
    let store = SqliteStore::open_in_memory().expect("open_in_memory should succeed");
    let catalog = Catalog {
        squat: store.create_exercise("Squat").expect("create squat").id,
        bench: store.create_exercise("Bench Press").expect("create bench").id,
        row: store.create_exercise("Barbell Row").expect("create row").id,
    };
    (store, Uuid::new_v4(), catalog)
}

#[test]
fn test_create_and_get_workout() {
    let (store, user, c) = setup();
    let request = WorkoutRequest::new("  Push day  ")
        .with_exercise(
            ExerciseEntry::new(c.bench)
                .with_sets(3)
                .with_reps(8)
                .with_weight(80.0),
        )
        .with_exercise(ExerciseEntry::new(c.squat));

    let created = store
        .create_workout(&user, &request)
        .expect("create_workout should succeed");
    assert_eq!(created.workout.name, "Push day");
    assert_eq!(created.workout.user_id, user);
    assert_eq!(created.exercises.len(), 2);
    assert_eq!(created.exercises[0].exercise_id, c.bench);
    assert_eq!(created.exercises[0].sets, Some(3));
    assert_eq!(created.exercises[0].weight, Some(80.0));
    assert_eq!(created.exercises[1].sets, None);

    let instances: Vec<_> = created
        .exercises
        .iter()
        .map(|e| e.exercise_instance_id.expect("every entry has an instance"))
        .collect();
    assert_ne!(instances[0], instances[1]);

    let fetched = store
        .get_workout(&user, &created.workout.id)
        .expect("get_workout should succeed");
    assert_eq!(fetched, created);
}

#[test]
fn test_entries_follow_sort_order_then_creation() {
    let (store, user, c) = setup();
    let request = WorkoutRequest::new("Ordered")
        .with_exercise(ExerciseEntry::new(c.squat))
        .with_exercise(ExerciseEntry::new(c.bench).with_order(2))
        .with_exercise(ExerciseEntry::new(c.row).with_order(1));

    let created = store.create_workout(&user, &request).expect("create");
    let order: Vec<Uuid> = created.exercises.iter().map(|e| e.exercise_id).collect();
    assert_eq!(order, vec![c.row, c.bench, c.squat]);
}

#[test]
fn test_list_workouts_newest_first_with_paging() {
    let (store, user, _) = setup();
    for name in ["A", "B", "C"] {
        store
            .create_workout(&user, &WorkoutRequest::new(name))
            .expect("create");
    }
    store
        .create_workout(&Uuid::new_v4(), &WorkoutRequest::new("Other user"))
        .expect("create");

    let first = store
        .list_workouts(&user, PageRequest::new(1, 2))
        .expect("list should succeed");
    assert_eq!(first.total, 3);
    assert_eq!(first.page, 1);
    assert_eq!(first.limit, 2);
    let names: Vec<_> = first.items.iter().map(|w| w.name.as_str()).collect();
    assert_eq!(names, vec!["C", "B"]);

    let second = store
        .list_workouts(&user, PageRequest::new(2, 2))
        .expect("list should succeed");
    assert_eq!(second.items.len(), 1);
    assert_eq!(second.items[0].name, "A");

    let err = store
        .list_workouts(&user, PageRequest::new(1, 101))
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_unknown_and_retired_exercises_are_all_reported() {
    let (store, user, c) = setup();
    store.retire_exercise(&c.row).expect("retire");

    let request = WorkoutRequest::new("Broken")
        .with_exercise(ExerciseEntry::new(Uuid::new_v4()))
        .with_exercise(ExerciseEntry::new(c.squat))
        .with_exercise(ExerciseEntry::new(c.row));
    let err = store.create_workout(&user, &request).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Validation);
    let message = err.to_string();
    assert!(message.contains("exercises[0]"), "{}", message);
    assert!(!message.contains("exercises[1]"), "{}", message);
    assert!(message.contains("exercises[2]"), "{}", message);

    let page = store
        .list_workouts(&user, PageRequest::default())
        .expect("list");
    assert_eq!(page.total, 0);
}

#[test]
fn test_field_validation() {
    let (store, user, c) = setup();
    let cases = [
        WorkoutRequest::new(""),
        WorkoutRequest::new("x".repeat(201)),
        WorkoutRequest::new("Bad sets").with_exercise(ExerciseEntry::new(c.squat).with_sets(0)),
        WorkoutRequest::new("Bad reps").with_exercise(ExerciseEntry::new(c.squat).with_reps(-1)),
        WorkoutRequest::new("Bad weight")
            .with_exercise(ExerciseEntry::new(c.squat).with_weight(-5.0)),
        WorkoutRequest::new("Empty token")
            .with_exercise(ExerciseEntry::new(c.squat).with_correlation("")),
    ];
    for request in &cases {
        let err = store.create_workout(&user, request).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation, "{:?}", request.name);
    }
}

#[test]
fn test_shared_correlation_token_creates_one_instance() {
    let (store, user, c) = setup();
    let request = WorkoutRequest::new("Supersets")
        .with_exercise(ExerciseEntry::new(c.squat).with_correlation("superset-1"))
        .with_exercise(ExerciseEntry::new(c.bench).with_correlation("superset-1"))
        .with_exercise(ExerciseEntry::new(c.row));

    let created = store.create_workout(&user, &request).expect("create");
    let ids: Vec<_> = created
        .exercises
        .iter()
        .map(|e| e.exercise_instance_id)
        .collect();
    assert!(ids[0].is_some());
    assert_eq!(ids[0], ids[1]);
    assert_ne!(ids[0], ids[2]);
}

#[test]
fn test_same_exercise_twice_in_one_token_group_is_rejected() {
    let (store, user, c) = setup();
    let request = WorkoutRequest::new("Doubled")
        .with_exercise(ExerciseEntry::new(c.squat).with_correlation("ss"))
        .with_exercise(ExerciseEntry::new(c.squat).with_correlation("ss"));
    let err = store.create_workout(&user, &request).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[test]
fn test_repeated_exercise_gets_distinct_instances() {
    let (store, user, c) = setup();
    let request = WorkoutRequest::new("Squat twice")
        .with_exercise(ExerciseEntry::new(c.squat).with_sets(3))
        .with_exercise(ExerciseEntry::new(c.bench))
        .with_exercise(ExerciseEntry::new(c.squat).with_sets(2));

    let created = store.create_workout(&user, &request).expect("create");
    assert_ne!(
        created.exercises[0].exercise_instance_id,
        created.exercises[2].exercise_instance_id
    );
}

#[test]
fn test_remove_squat_and_add_bench() {
    let (store, user, c) = setup();
    let created = store
        .create_workout(
            &user,
            &WorkoutRequest::new("Legs").with_exercise(ExerciseEntry::new(c.squat).with_sets(3)),
        )
        .expect("create");
    let squat_instance = created.exercises[0].exercise_instance_id;

    let updated = store
        .update_workout(
            &user,
            &created.workout.id,
            &WorkoutRequest::new("Legs").with_exercise(ExerciseEntry::new(c.bench).with_sets(3)),
        )
        .expect("update_workout should succeed");

    assert_eq!(updated.workout.id, created.workout.id);
    assert_eq!(updated.exercises.len(), 1);
    let bench = &updated.exercises[0];
    assert_eq!(bench.exercise_id, c.bench);
    assert_ne!(bench.id, created.exercises[0].id);
    assert!(bench.exercise_instance_id.is_some());
    assert_ne!(bench.exercise_instance_id, squat_instance);
    assert!(updated.exercises.iter().all(|e| e.exercise_id != c.squat));

    let fetched = store.get_workout(&user, &created.workout.id).expect("get");
    assert_eq!(fetched, updated);
    store.check_integrity().expect("integrity");
}

#[test]
fn test_resubmitting_current_state_changes_nothing() {
    let (store, user, c) = setup();
    let created = store
        .create_workout(
            &user,
            &WorkoutRequest::new("Stable")
                .with_exercise(ExerciseEntry::new(c.squat).with_sets(3).with_reps(5))
                .with_exercise(ExerciseEntry::new(c.bench).with_correlation("ss"))
                .with_exercise(ExerciseEntry::new(c.row).with_correlation("ss")),
        )
        .expect("create");

    let resubmitted = store
        .update_workout(
            &user,
            &created.workout.id,
            &WorkoutRequest::from_detail(&created),
        )
        .expect("update_workout should succeed");
    assert_eq!(resubmitted, created);

    let fetched = store.get_workout(&user, &created.workout.id).expect("get");
    assert_eq!(fetched, created);
}

#[test]
fn test_update_changes_only_edited_rows() {
    let (store, user, c) = setup();
    let created = store
        .create_workout(
            &user,
            &WorkoutRequest::new("Edit me")
                .with_exercise(ExerciseEntry::new(c.squat).with_sets(3))
                .with_exercise(ExerciseEntry::new(c.bench).with_sets(3)),
        )
        .expect("create");

    let mut request = WorkoutRequest::from_detail(&created);
    request.exercises[1].sets = Some(5);
    request.exercises[1].weight = Some(60.0);
    let updated = store
        .update_workout(&user, &created.workout.id, &request)
        .expect("update");

    assert_eq!(updated.exercises[0], created.exercises[0]);
    assert_eq!(updated.exercises[1].id, created.exercises[1].id);
    assert_eq!(
        updated.exercises[1].exercise_instance_id,
        created.exercises[1].exercise_instance_id
    );
    assert_eq!(updated.exercises[1].sets, Some(5));
    assert_eq!(updated.exercises[1].weight, Some(60.0));
}

#[test]
fn test_new_entry_may_join_an_instance_of_the_same_workout() {
    let (store, user, c) = setup();
    let created = store
        .create_workout(
            &user,
            &WorkoutRequest::new("Join").with_exercise(ExerciseEntry::new(c.squat)),
        )
        .expect("create");
    let instance = created.exercises[0]
        .exercise_instance_id
        .expect("instance");

    let request = WorkoutRequest::from_detail(&created)
        .with_exercise(ExerciseEntry::new(c.bench).with_instance(instance));
    let updated = store
        .update_workout(&user, &created.workout.id, &request)
        .expect("update");
    assert_eq!(updated.exercises.len(), 2);
    assert_eq!(updated.exercises[1].exercise_instance_id, Some(instance));
}

#[test]
fn test_joining_an_instance_with_its_own_exercise_is_rejected() {
    let (store, user, c) = setup();
    let created = store
        .create_workout(
            &user,
            &WorkoutRequest::new("Join").with_exercise(ExerciseEntry::new(c.squat)),
        )
        .expect("create");
    let instance = created.exercises[0]
        .exercise_instance_id
        .expect("instance");

    let request = WorkoutRequest::from_detail(&created)
        .with_exercise(ExerciseEntry::new(c.squat).with_instance(instance));
    let err = store
        .update_workout(&user, &created.workout.id, &request)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
    assert!(err.to_string().contains("exercises[1]"));

    let unchanged = store
        .get_workout(&user, &created.workout.id)
        .expect("get_workout");
    assert_eq!(unchanged.exercises.len(), 1);

    // Once the original entry is dropped the instance is free for a new one.
    let replaced = WorkoutRequest::new("Join")
        .with_exercise(ExerciseEntry::new(c.squat).with_instance(instance));
    let updated = store
        .update_workout(&user, &created.workout.id, &replaced)
        .expect("update");
    assert_eq!(updated.exercises.len(), 1);
    assert_eq!(updated.exercises[0].exercise_instance_id, Some(instance));
}

#[test]
fn test_foreign_ids_are_conflicts() {
    let (store, user, c) = setup();
    let first = store
        .create_workout(
            &user,
            &WorkoutRequest::new("First").with_exercise(ExerciseEntry::new(c.squat)),
        )
        .expect("create");
    let second = store
        .create_workout(
            &user,
            &WorkoutRequest::new("Second").with_exercise(ExerciseEntry::new(c.bench)),
        )
        .expect("create");

    // An entry id from another template.
    let request = WorkoutRequest::from_detail(&first)
        .with_exercise(ExerciseEntry::existing(&second.exercises[0]));
    let err = store
        .update_workout(&user, &first.workout.id, &request)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // An instance used only by another template.
    let foreign_instance = second.exercises[0].exercise_instance_id.expect("instance");
    let request = WorkoutRequest::from_detail(&first)
        .with_exercise(ExerciseEntry::new(c.bench).with_instance(foreign_instance));
    let err = store
        .update_workout(&user, &first.workout.id, &request)
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // Ids on create can never match.
    let err = store
        .create_workout(
            &user,
            &WorkoutRequest::new("Copy").with_exercise(ExerciseEntry::existing(&first.exercises[0])),
        )
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    assert_eq!(
        store.get_workout(&user, &first.workout.id).expect("get"),
        first
    );
}

#[test]
fn test_contradictory_identified_entries_are_rejected() {
    let (store, user, c) = setup();
    let created = store
        .create_workout(
            &user,
            &WorkoutRequest::new("Strict").with_exercise(ExerciseEntry::new(c.squat)),
        )
        .expect("create");
    let existing = ExerciseEntry::existing(&created.exercises[0]);

    let duplicated = WorkoutRequest::new("Strict")
        .with_exercise(existing.clone())
        .with_exercise(existing.clone());
    let with_token = WorkoutRequest::new("Strict").with_exercise(existing.clone().with_correlation("t"));
    let mut swapped = existing;
    swapped.exercise_id = c.bench;
    let swapped = WorkoutRequest::new("Strict").with_exercise(swapped);

    for request in [duplicated, with_token, swapped] {
        let err = store
            .update_workout(&user, &created.workout.id, &request)
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Validation);
    }
}

#[test]
fn test_exercise_catalog() {
    let (store, _, c) = setup();
    let names: Vec<_> = store
        .list_exercises()
        .expect("list")
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(names, vec!["Barbell Row", "Bench Press", "Squat"]);

    let err = store.create_exercise("  squat ").unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    store.retire_exercise(&c.squat).expect("retire");
    assert_eq!(
        store.get_exercise(&c.squat).unwrap_err().kind(),
        ErrorKind::NotFound
    );
    // The name is free again once retired.
    store.create_exercise("Squat").expect("recreate");
}
