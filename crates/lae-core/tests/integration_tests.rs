use chrono::{NaiveDate, NaiveTime};
use lae_core::db::establish_connection;
use lae_core::error::{CoreError, ErrorKind};
use lae_core::models::*;
use lae_core::repository::{
    CalendarRepository, EventRepository, ScheduleRepository, SqliteRepository,
    StatisticsRepository, TaxonomyRepository,
};
use rstest::rstest;
use tempfile::TempDir;
use uuid::Uuid;

/// Helper function to create a test database
async fn setup_test_db() -> (SqliteRepository, TempDir) {
    setup_test_db_with(DeletePolicies::default()).await
}

async fn setup_test_db_with(policies: DeletePolicies) -> (SqliteRepository, TempDir) {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let db_path = temp_dir.path().join("test.db");

    let pool = establish_connection(&db_path.to_string_lossy())
        .await
        .expect("Failed to establish test database connection");

    (SqliteRepository::with_delete_policies(pool, policies), temp_dir)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

async fn add_node(repo: &SqliteRepository, kind: TaxonomyKind, name: &str, parent_id: Option<Uuid>) -> TaxonomyNode {
    repo.add_node(
        kind,
        NewNodeData {
            name: name.to_string(),
            description: None,
            parent_id,
        },
    )
    .await
    .expect("Failed to create test node")
}

async fn add_schedule(repo: &SqliteRepository, domain_id: Uuid, name: &str) -> Schedule {
    repo.add_schedule(NewScheduleData {
        domain_id,
        name: name.to_string(),
        description: None,
        start_date: None,
        deadline: None,
        status: None,
    })
    .await
    .expect("Failed to create test schedule")
}

async fn add_event(repo: &SqliteRepository, name: &str, day: NaiveDate, slot: i64) -> ScheduledEvent {
    repo.add_event(NewEventData::new(name, day, slot))
        .await
        .expect("Failed to create test event")
}

// ============================================================================
// Taxonomy
// ============================================================================

#[rstest]
#[case(TaxonomyKind::Domain)]
#[case(TaxonomyKind::ActivityType)]
#[case(TaxonomyKind::Activity)]
#[tokio::test]
async fn test_taxonomy_crud_workflow(#[case] kind: TaxonomyKind) {
    let (repo, _temp_dir) = setup_test_db().await;

    let root = add_node(&repo, kind, "Root", None).await;
    let child = add_node(&repo, kind, "Child", Some(root.id)).await;
    assert_eq!(child.parent_id, Some(root.id));

    let found = repo.find_node_by_id(kind, child.id).await.unwrap().unwrap();
    assert_eq!(found, child);

    let updated = repo
        .update_node(
            kind,
            child.id,
            UpdateNodeData {
                name: Some("Renamed".to_string()),
                description: Some(Some("Now with text".to_string())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name, "Renamed");
    assert_eq!(updated.description.as_deref(), Some("Now with text"));
    assert_eq!(updated.parent_id, Some(root.id));

    let tree = repo.find_tree(kind).await.unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].children[0].name, "Renamed");

    // Kinds live in separate tables.
    for other in TaxonomyKind::ALL.into_iter().filter(|k| *k != kind) {
        assert!(repo.find_nodes(other).await.unwrap().is_empty());
    }
}

#[tokio::test]
async fn test_sibling_order_is_insertion_order() {
    let (repo, _temp_dir) = setup_test_db().await;
    let root = add_node(&repo, TaxonomyKind::ActivityType, "Root", None).await;
    for name in ["Zeta", "Alpha", "Mid"] {
        add_node(&repo, TaxonomyKind::ActivityType, name, Some(root.id)).await;
    }

    let tree = repo.find_tree(TaxonomyKind::ActivityType).await.unwrap();
    let names: Vec<&str> = tree[0].children.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["Zeta", "Alpha", "Mid"]);
}

#[tokio::test]
async fn test_parent_must_exist_in_same_kind() {
    let (repo, _temp_dir) = setup_test_db().await;
    let domain = add_node(&repo, TaxonomyKind::Domain, "Work", None).await;

    let result = repo
        .add_node(
            TaxonomyKind::ActivityType,
            NewNodeData {
                name: "Coding".to_string(),
                description: None,
                parent_id: Some(domain.id),
            },
        )
        .await;
    assert!(matches!(result, Err(CoreError::Validation(_))));
}

#[tokio::test]
async fn test_blank_name_is_rejected() {
    let (repo, _temp_dir) = setup_test_db().await;
    let result = repo
        .add_node(
            TaxonomyKind::Domain,
            NewNodeData {
                name: "   ".to_string(),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(result, Err(CoreError::Validation(_))));
}

#[tokio::test]
async fn test_self_and_circular_parent_are_rejected() {
    let (repo, _temp_dir) = setup_test_db().await;
    let kind = TaxonomyKind::Domain;
    let a = add_node(&repo, kind, "A", None).await;
    let b = add_node(&repo, kind, "B", Some(a.id)).await;
    let c = add_node(&repo, kind, "C", Some(b.id)).await;

    let self_parent = repo
        .update_node(
            kind,
            a.id,
            UpdateNodeData {
                parent_id: Some(Some(a.id)),
                ..Default::default()
            },
        )
        .await;
    assert!(matches!(self_parent, Err(CoreError::Validation(_))));

    let cycle = repo
        .update_node(
            kind,
            a.id,
            UpdateNodeData {
                parent_id: Some(Some(c.id)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(&cycle, CoreError::CircularParent(node, parent) if node == "A" && parent == "C"));
    assert_eq!(cycle.kind(), ErrorKind::BadRequest);

    // Moving to the top level is fine.
    let moved = repo
        .update_node(
            kind,
            c.id,
            UpdateNodeData {
                parent_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.parent_id, None);
    assert_eq!(repo.find_tree(kind).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_missing_node_is_not_found() {
    let (repo, _temp_dir) = setup_test_db().await;
    let missing = Uuid::now_v7();

    assert!(repo.find_node_by_id(TaxonomyKind::Domain, missing).await.unwrap().is_none());
    let update = repo
        .update_node(TaxonomyKind::Domain, missing, UpdateNodeData::default())
        .await;
    assert!(matches!(update, Err(CoreError::NotFound(_))));
    let delete = repo.delete_node(TaxonomyKind::Activity, missing).await;
    assert!(matches!(delete, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn test_short_id_prefix_lookup() {
    let (repo, _temp_dir) = setup_test_db().await;
    let node = add_node(&repo, TaxonomyKind::Domain, "Work", None).await;
    let full = node.id.to_string();

    let by_prefix = repo
        .find_nodes_by_short_id_prefix(TaxonomyKind::Domain, &full[..13])
        .await
        .unwrap();
    assert_eq!(by_prefix.len(), 1);
    assert_eq!(by_prefix[0].id, node.id);

    let upper = repo
        .find_nodes_by_short_id_prefix(TaxonomyKind::Domain, &full[..8].to_uppercase())
        .await
        .unwrap();
    assert_eq!(upper.len(), 1);

    let none = repo
        .find_nodes_by_short_id_prefix(TaxonomyKind::ActivityType, &full[..8])
        .await
        .unwrap();
    assert!(none.is_empty());

    // Ids minted together share their timestamp head, so the random tail is what tells them apart.
    let sibling = add_node(&repo, TaxonomyKind::Domain, "Home", None).await;
    let shared_head = repo
        .find_nodes_by_short_id_prefix(TaxonomyKind::Domain, &full[..4])
        .await
        .unwrap();
    assert_eq!(shared_head.len(), 2);

    let tail = sibling.id.simple().to_string()[24..].to_string();
    let by_tail = repo
        .find_nodes_by_short_id_prefix(TaxonomyKind::Domain, &tail)
        .await
        .unwrap();
    assert_eq!(by_tail.len(), 1);
    assert_eq!(by_tail[0].id, sibling.id);
}

// ============================================================================
// Delete policies
// ============================================================================

#[tokio::test]
async fn test_domain_cascade_removes_subtree_and_schedules() {
    let (repo, _temp_dir) = setup_test_db().await;
    let work = add_node(&repo, TaxonomyKind::Domain, "Work", None).await;
    let subteam = add_node(&repo, TaxonomyKind::Domain, "Subteam", Some(work.id)).await;
    let health = add_node(&repo, TaxonomyKind::Domain, "Health", None).await;
    let q3 = add_schedule(&repo, subteam.id, "Q3 launch").await;
    let gym = add_schedule(&repo, health.id, "Gym").await;

    let mut event = NewEventData::new("Standup", date(2025, 6, 2), 21);
    event.domain_id = Some(subteam.id);
    event.schedule_id = Some(q3.id);
    let event = repo.add_event(event).await.unwrap();

    let summary = repo.delete_node(TaxonomyKind::Domain, work.id).await.unwrap();
    assert_eq!(summary.nodes_deleted, 2);
    assert_eq!(summary.schedules_deleted, 1);

    assert!(repo.find_node_by_id(TaxonomyKind::Domain, subteam.id).await.unwrap().is_none());
    assert!(repo.find_schedule_by_id(q3.id).await.unwrap().is_none());
    assert!(repo.find_schedule_by_id(gym.id).await.unwrap().is_some());

    // The event survives with its links cleared.
    let event = repo.find_event_by_id(event.id).await.unwrap().unwrap();
    assert_eq!(event.domain_id, None);
    assert_eq!(event.schedule_id, None);
}

#[tokio::test]
async fn test_activity_type_restrict_refuses_with_children() {
    let (repo, _temp_dir) = setup_test_db().await;
    let coding = add_node(&repo, TaxonomyKind::ActivityType, "Coding", None).await;
    let rust = add_node(&repo, TaxonomyKind::ActivityType, "Rust", Some(coding.id)).await;

    let result = repo.delete_node(TaxonomyKind::ActivityType, coding.id).await;
    assert!(matches!(result, Err(CoreError::Validation(msg)) if msg.contains("1 child")));

    let summary = repo.delete_node(TaxonomyKind::ActivityType, rust.id).await.unwrap();
    assert_eq!(summary.nodes_deleted, 1);
    let summary = repo.delete_node(TaxonomyKind::ActivityType, coding.id).await.unwrap();
    assert_eq!(summary, DeleteSummary { nodes_deleted: 1, schedules_deleted: 0 });
}

#[tokio::test]
async fn test_activity_orphan_policy_leaves_children_dangling() {
    let (repo, _temp_dir) = setup_test_db().await;
    let study = add_node(&repo, TaxonomyKind::Activity, "Study", None).await;
    let math = add_node(&repo, TaxonomyKind::Activity, "Math", Some(study.id)).await;

    let summary = repo.delete_node(TaxonomyKind::Activity, study.id).await.unwrap();
    assert_eq!(summary.nodes_deleted, 1);

    let orphan = repo.find_node_by_id(TaxonomyKind::Activity, math.id).await.unwrap().unwrap();
    assert_eq!(orphan.parent_id, Some(study.id));
    assert!(repo.find_tree(TaxonomyKind::Activity).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_configured_policy_overrides_default() {
    let policies = DeletePolicies {
        domain: DeletePolicy::Restrict,
        ..Default::default()
    };
    let (repo, _temp_dir) = setup_test_db_with(policies).await;
    let work = add_node(&repo, TaxonomyKind::Domain, "Work", None).await;
    add_node(&repo, TaxonomyKind::Domain, "Subteam", Some(work.id)).await;

    let result = repo.delete_node(TaxonomyKind::Domain, work.id).await;
    assert!(matches!(result, Err(CoreError::Validation(_))));
}

// ============================================================================
// Schedules
// ============================================================================

#[tokio::test]
async fn test_schedule_crud_workflow() {
    let (repo, _temp_dir) = setup_test_db().await;
    let work = add_node(&repo, TaxonomyKind::Domain, "Work", None).await;
    let health = add_node(&repo, TaxonomyKind::Domain, "Health", None).await;

    let schedule = repo
        .add_schedule(NewScheduleData {
            domain_id: work.id,
            name: "Thesis".to_string(),
            description: Some("Write it".to_string()),
            start_date: Some(date(2025, 6, 1)),
            deadline: Some(date(2025, 9, 30)),
            status: None,
        })
        .await
        .unwrap();
    assert_eq!(schedule.status, ScheduleStatus::Ongoing);

    let updated = repo
        .update_schedule(
            schedule.id,
            UpdateScheduleData {
                domain_id: Some(health.id),
                status: Some(ScheduleStatus::Paused),
                deadline: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.domain_id, health.id);
    assert_eq!(updated.status, ScheduleStatus::Paused);
    assert_eq!(updated.deadline, None);
    assert_eq!(updated.start_date, Some(date(2025, 6, 1)));

    let with_domain = repo
        .find_schedules_with_domain(&ScheduleFilter::default())
        .await
        .unwrap();
    assert_eq!(with_domain[0].domain_name.as_deref(), Some("Health"));

    repo.delete_schedule(schedule.id).await.unwrap();
    let again = repo.delete_schedule(schedule.id).await;
    assert!(matches!(again, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn test_schedule_requires_existing_domain() {
    let (repo, _temp_dir) = setup_test_db().await;
    let result = repo
        .add_schedule(NewScheduleData {
            domain_id: Uuid::now_v7(),
            name: "Ghost".to_string(),
            description: None,
            start_date: None,
            deadline: None,
            status: None,
        })
        .await;
    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::BadRequest);
}

#[tokio::test]
async fn test_schedule_filters() {
    let (repo, _temp_dir) = setup_test_db().await;
    let work = add_node(&repo, TaxonomyKind::Domain, "Work", None).await;
    let health = add_node(&repo, TaxonomyKind::Domain, "Health", None).await;
    let open = add_schedule(&repo, work.id, "Open ended").await;
    let may = repo
        .add_schedule(NewScheduleData {
            domain_id: health.id,
            name: "May only".to_string(),
            description: None,
            start_date: Some(date(2025, 5, 1)),
            deadline: Some(date(2025, 5, 31)),
            status: Some(ScheduleStatus::Completed),
        })
        .await
        .unwrap();

    let by_domain = repo
        .find_schedules(&ScheduleFilter {
            domain_id: Some(health.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(by_domain.len(), 1);
    assert_eq!(by_domain[0].id, may.id);

    let june = repo
        .find_schedules(&ScheduleFilter {
            overlapping: Some((date(2025, 6, 1), date(2025, 6, 30))),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(june.len(), 1);
    assert_eq!(june[0].id, open.id);

    let completed = repo
        .find_schedules(&ScheduleFilter {
            status: Some(ScheduleStatus::Completed),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(completed.len(), 1);
}

// ============================================================================
// Events and placement
// ============================================================================

#[tokio::test]
async fn test_event_crud_workflow() {
    let (repo, _temp_dir) = setup_test_db().await;
    let work = add_node(&repo, TaxonomyKind::Domain, "Work", None).await;
    let coding = add_node(&repo, TaxonomyKind::ActivityType, "Coding", None).await;

    let mut data = NewEventData::new("Refactor", date(2025, 6, 3), 51);
    data.domain_id = Some(work.id);
    data.activity_type_id = Some(coding.id);
    data.duration_minutes = Some(90);
    data.start_time = NaiveTime::from_hms_opt(13, 30, 0);
    data.is_precise = true;
    let event = repo.add_event(data).await.unwrap();

    assert_eq!(event.time_slot, TimeSlot::Afternoon1);
    assert_eq!(event.status, EventStatus::Planned);
    assert_eq!(event.canvas_position_y, 0);
    assert_eq!(event.duration_minutes, Some(90));
    assert!(event.is_precise);

    let updated = repo
        .update_event(
            event.id,
            UpdateEventData {
                status: Some(EventStatus::Completed),
                notes: Some(Some("Went well".to_string())),
                activity_type_id: Some(None),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, EventStatus::Completed);
    assert_eq!(updated.notes.as_deref(), Some("Went well"));
    assert_eq!(updated.activity_type_id, None);
    assert_eq!(updated.domain_id, Some(work.id));
    assert!(updated.updated_at >= event.updated_at);

    let details = repo
        .find_events_with_details(&EventFilter::default())
        .await
        .unwrap();
    assert_eq!(details.len(), 1);
    assert_eq!(details[0].domain_name.as_deref(), Some("Work"));
    assert_eq!(details[0].activity_type_name, None);

    repo.delete_event(event.id).await.unwrap();
    assert!(matches!(repo.delete_event(event.id).await, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn test_auto_stack_on_occupied_slot() {
    let (repo, _temp_dir) = setup_test_db().await;
    let day = date(2025, 6, 2);

    let first = add_event(&repo, "Deep work", day, 21).await;
    let second = add_event(&repo, "Email", day, 21).await;
    let third = add_event(&repo, "Calls", day, 21).await;

    assert_eq!(first.canvas_position_y, 0);
    assert_eq!(second.canvas_position_y, 1);
    assert_eq!(third.canvas_position_y, 2);

    // Other slots on the same day are independent.
    let other = add_event(&repo, "Lunch walk", day, 51).await;
    assert_eq!(other.canvas_position_y, 0);
}

#[tokio::test]
async fn test_explicit_primary_lane_collision() {
    let (repo, _temp_dir) = setup_test_db().await;
    let day = date(2025, 6, 2);
    add_event(&repo, "Deep work", day, 21).await;

    let mut data = NewEventData::new("Intruder", day, 21);
    data.canvas_position_y = Some(0);
    let err = repo.add_event(data).await.unwrap_err();
    assert!(matches!(&err, CoreError::Validation(msg) if msg == "Time slot already occupied"));

    let mut data = NewEventData::new("Stacked", day, 21);
    data.canvas_position_y = Some(4);
    let stacked = repo.add_event(data).await.unwrap();
    assert_eq!(stacked.canvas_position_y, 4);
}

#[rstest]
#[case(0)]
#[case(20)]
#[case(23)]
#[case(70)]
#[tokio::test]
async fn test_invalid_time_slot(#[case] slot: i64) {
    let (repo, _temp_dir) = setup_test_db().await;
    let result = repo.add_event(NewEventData::new("Bad slot", date(2025, 6, 2), slot)).await;
    assert!(matches!(result, Err(CoreError::Validation(_))));
}

#[tokio::test]
async fn test_missing_link_is_not_found() {
    let (repo, _temp_dir) = setup_test_db().await;
    let ghost = Uuid::now_v7();

    let mut data = NewEventData::new("Linked", date(2025, 6, 2), 22);
    data.schedule_id = Some(ghost);
    let err = repo.add_event(data).await.unwrap_err();
    assert!(matches!(&err, CoreError::NotFound(msg) if msg.contains(&ghost.to_string())));
    assert_eq!(err.kind().status_code(), 404);

    let mut data = NewEventData::new("Linked", date(2025, 6, 2), 22);
    data.activity_id = Some(ghost);
    assert!(matches!(repo.add_event(data).await, Err(CoreError::NotFound(_))));
}

#[tokio::test]
async fn test_links_are_checked_domain_first() {
    let (repo, _temp_dir) = setup_test_db().await;
    let ghost_domain = Uuid::now_v7();
    let ghost_schedule = Uuid::now_v7();

    let mut data = NewEventData::new("Linked", date(2025, 6, 2), 22);
    data.domain_id = Some(ghost_domain);
    data.schedule_id = Some(ghost_schedule);
    let err = repo.add_event(data).await.unwrap_err();
    assert!(
        matches!(&err, CoreError::NotFound(msg) if msg.starts_with("Domain") && msg.contains(&ghost_domain.to_string()))
    );

    let ghost_type = Uuid::now_v7();
    let mut data = NewEventData::new("Linked", date(2025, 6, 2), 22);
    data.activity_type_id = Some(ghost_type);
    data.activity_id = Some(Uuid::now_v7());
    let err = repo.add_event(data).await.unwrap_err();
    assert!(matches!(&err, CoreError::NotFound(msg) if msg.contains(&ghost_type.to_string())));
}

#[tokio::test]
async fn test_update_moves_into_occupied_cell() {
    let (repo, _temp_dir) = setup_test_db().await;
    let monday = date(2025, 6, 2);
    let tuesday = date(2025, 6, 3);
    add_event(&repo, "Anchor", monday, 71).await;
    let mover = add_event(&repo, "Mover", tuesday, 71).await;

    // Moving without a lane stacks on top.
    let moved = repo
        .update_event(
            mover.id,
            UpdateEventData {
                event_date: Some(monday),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.event_date, monday);
    assert_eq!(moved.canvas_position_y, 1);

    // Asking for the primary lane explicitly collides.
    let err = repo
        .update_event(
            mover.id,
            UpdateEventData {
                canvas_position_y: Some(0),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[tokio::test]
async fn test_moved_stacked_event_is_placed_afresh() {
    let (repo, _temp_dir) = setup_test_db().await;
    let monday = date(2025, 6, 2);
    add_event(&repo, "A", monday, 21).await;
    add_event(&repo, "B", monday, 21).await;
    let c = add_event(&repo, "C", monday, 21).await;
    assert_eq!(c.canvas_position_y, 2);

    // Into an empty cell: takes the primary lane.
    let wednesday = date(2025, 6, 4);
    let moved = repo
        .update_event(
            c.id,
            UpdateEventData {
                event_date: Some(wednesday),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.canvas_position_y, 0);

    // Into a cell holding one event: stacks on the count.
    let thursday = date(2025, 6, 5);
    add_event(&repo, "Resident", thursday, 21).await;
    let d = add_event(&repo, "D", monday, 21).await;
    assert_eq!(d.canvas_position_y, 2);
    let moved = repo
        .update_event(
            d.id,
            UpdateEventData {
                event_date: Some(thursday),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.canvas_position_y, 1);
}

#[tokio::test]
async fn test_update_in_place_does_not_collide_with_itself() {
    let (repo, _temp_dir) = setup_test_db().await;
    let day = date(2025, 6, 2);
    let event = add_event(&repo, "Solo", day, 22).await;

    let updated = repo
        .update_event(
            event.id,
            UpdateEventData {
                event_date: Some(day),
                time_slot: Some(22),
                canvas_position_y: Some(0),
                name: Some("Still solo".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.canvas_position_y, 0);
    assert_eq!(updated.name, "Still solo");
}

#[tokio::test]
async fn test_event_filters_and_paging() {
    let (repo, _temp_dir) = setup_test_db().await;
    let work = add_node(&repo, TaxonomyKind::Domain, "Work", None).await;
    for day in 1..=5 {
        let mut data = NewEventData::new(format!("Day {day}"), date(2025, 6, day), 21);
        if day % 2 == 0 {
            data.domain_id = Some(work.id);
        }
        repo.add_event(data).await.unwrap();
    }

    let window = repo
        .find_events(&EventFilter {
            start_date: Some(date(2025, 6, 2)),
            end_date: Some(date(2025, 6, 4)),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(window.len(), 3);
    assert_eq!(window[0].name, "Day 2");

    let work_only = repo
        .find_events(&EventFilter {
            domain_id: Some(work.id),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(work_only.len(), 2);

    let page = repo
        .find_events(&EventFilter {
            offset: Some(3),
            limit: Some(10),
            ..Default::default()
        })
        .await
        .unwrap();
    let names: Vec<&str> = page.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["Day 4", "Day 5"]);
}

// ============================================================================
// Calendar
// ============================================================================

#[tokio::test]
async fn test_week_view_is_monday_aligned_and_dense() {
    let (repo, _temp_dir) = setup_test_db().await;
    let schedule_domain = add_node(&repo, TaxonomyKind::Domain, "Work", None).await;
    let schedule = add_schedule(&repo, schedule_domain.id, "Launch").await;

    let mut data = NewEventData::new("Plan", date(2025, 6, 4), 52);
    data.schedule_id = Some(schedule.id);
    repo.add_event(data).await.unwrap();
    add_event(&repo, "Plan again", date(2025, 6, 4), 52).await;
    add_event(&repo, "Next week", date(2025, 6, 9), 21).await;

    let week = repo.week_view(date(2025, 6, 5)).await.unwrap();
    assert_eq!(week.week_start, date(2025, 6, 2));
    assert_eq!(week.week_end, date(2025, 6, 8));
    assert_eq!(week.days.len(), 7);
    assert!(week.days.iter().all(|d| d.slots.len() == 5));

    let wednesday = &week.days[2];
    assert_eq!(wednesday.weekday, "Wednesday");
    let cell = &wednesday.slots[3];
    assert_eq!(cell.time_slot, TimeSlot::Afternoon2);
    let primary = cell.event.as_ref().unwrap();
    assert_eq!(primary.name, "Plan");
    assert_eq!(primary.schedule_name.as_deref(), Some("Launch"));
    assert_eq!(cell.stacked.len(), 1);

    let total: usize = week
        .days
        .iter()
        .flat_map(|d| d.slots.iter())
        .map(|c| c.event_count())
        .sum();
    assert_eq!(total, 2);
}

#[tokio::test]
async fn test_month_view_days_and_schedules() {
    let (repo, _temp_dir) = setup_test_db().await;
    let work = add_node(&repo, TaxonomyKind::Domain, "Work", None).await;
    add_schedule(&repo, work.id, "Unbounded").await;
    repo.add_schedule(NewScheduleData {
        domain_id: work.id,
        name: "Last year".to_string(),
        description: None,
        start_date: Some(date(2023, 1, 1)),
        deadline: Some(date(2023, 12, 31)),
        status: None,
    })
    .await
    .unwrap();
    add_event(&repo, "Leap day", date(2024, 2, 29), 71).await;

    let month = repo.month_view(2024, 2).await.unwrap();
    assert_eq!(month.month_name, "February");
    assert_eq!(month.days.len(), 29);
    assert_eq!(month.days[28].event_count, 1);
    assert_eq!(month.schedules.len(), 1);
    assert_eq!(month.schedules[0].name, "Unbounded");

    let err = repo.month_view(2024, 13).await.unwrap_err();
    assert!(matches!(err, CoreError::Validation(_)));
}

#[tokio::test]
async fn test_day_view_labels_slots() {
    let (repo, _temp_dir) = setup_test_db().await;
    add_event(&repo, "Run", date(2025, 6, 2), 21).await;

    let day = repo.day_view(date(2025, 6, 2)).await.unwrap();
    let labels: Vec<&str> = day.slots.iter().map(|s| s.slot_name).collect();
    assert_eq!(labels, vec!["Morning 1", "Morning 2", "Afternoon 1", "Afternoon 2", "Evening"]);
    assert_eq!(day.slots[0].event.as_ref().unwrap().name, "Run");
    assert!(day.slots[1..].iter().all(|s| s.is_empty()));
}

// ============================================================================
// Statistics
// ============================================================================

#[tokio::test]
async fn test_summary_with_no_events() {
    let (repo, _temp_dir) = setup_test_db().await;
    let summary = repo.summary().await.unwrap();
    assert_eq!(summary.total_events, 0);
    assert_eq!(summary.completion_rate, 0.0);
    assert!(summary.status_distribution.is_empty());
    assert_eq!(summary.timeslot_distribution.len(), 5);
    assert!(summary.timeslot_distribution.iter().all(|s| s.count == 0));
}

#[tokio::test]
async fn test_summary_counts() {
    let (repo, _temp_dir) = setup_test_db().await;
    let work = add_node(&repo, TaxonomyKind::Domain, "Work", None).await;
    add_node(&repo, TaxonomyKind::ActivityType, "Coding", None).await;
    add_schedule(&repo, work.id, "Launch").await;

    let done = add_event(&repo, "Done", date(2025, 6, 2), 21).await;
    add_event(&repo, "Open", date(2025, 6, 2), 71).await;
    add_event(&repo, "Open too", date(2025, 6, 3), 71).await;
    repo.update_event(
        done.id,
        UpdateEventData {
            status: Some(EventStatus::Completed),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    let summary = repo.summary().await.unwrap();
    assert_eq!(summary.total_domains, 1);
    assert_eq!(summary.total_activity_types, 1);
    assert_eq!(summary.total_activities, 0);
    assert_eq!(summary.total_schedules, 1);
    assert_eq!(summary.total_events, 3);
    assert_eq!(summary.completed_events, 1);
    assert_eq!(summary.completion_rate, 33.33);
    let evening = summary
        .timeslot_distribution
        .iter()
        .find(|s| s.time_slot == TimeSlot::Evening)
        .unwrap();
    assert_eq!(evening.count, 2);
}

#[tokio::test]
async fn test_node_and_tree_statistics() {
    let (repo, _temp_dir) = setup_test_db().await;
    let study = add_node(&repo, TaxonomyKind::Activity, "Study", None).await;
    let math = add_node(&repo, TaxonomyKind::Activity, "Math", Some(study.id)).await;

    let mut data = NewEventData::new("Algebra", date(2025, 6, 2), 21);
    data.activity_id = Some(math.id);
    data.goal = Some("Chapter 1".to_string());
    data.status = Some(EventStatus::Completed);
    repo.add_event(data).await.unwrap();

    let mut data = NewEventData::new("Geometry", date(2025, 6, 3), 21);
    data.activity_id = Some(math.id);
    repo.add_event(data).await.unwrap();

    let stats = repo.node_statistics(TaxonomyKind::Activity, study.id).await.unwrap();
    assert_eq!(stats.total_events, 2);
    assert_eq!(stats.completion_rate, 50.0);
    assert_eq!(stats.breakdown.len(), 1);
    assert_eq!(stats.breakdown[0].name, "Math");
    assert_eq!(stats.breakdown[0].goals[0].goal, "Chapter 1");

    let tree = repo.tree_statistics(TaxonomyKind::Activity).await.unwrap();
    assert_eq!(tree[0].total_events, 2);
    assert_eq!(tree[0].children[0].completed_events, 1);

    let missing = repo.node_statistics(TaxonomyKind::Domain, study.id).await;
    assert!(matches!(missing, Err(CoreError::NotFound(_))));
}
