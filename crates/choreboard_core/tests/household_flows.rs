use choreboard_core::service::household_service::USER_COLORS;
use choreboard_core::{
    CompletionStats, FixedClock, HouseholdError, HouseholdService, Session, TaskCategory,
    TaskForm, TaskStore, User, ValidationError,
};
use uuid::Uuid;

const NOW: i64 = 1_760_000_000_000;
const HOUR: i64 = 60 * 60 * 1000;

fn service() -> (HouseholdService<FixedClock>, FixedClock) {
    let clock = FixedClock::new(NOW);
    let store = TaskStore::new(clock.clone());
    (HouseholdService::with_first_parent(store), clock)
}

fn household() -> (HouseholdService<FixedClock>, FixedClock, User, User, User) {
    let (mut service, clock) = service();
    let mom = service.add_member("Mom", true).unwrap();
    let emma = service.add_member("Emma", false).unwrap();
    let jake = service.add_member("Jake", false).unwrap();
    service.set_session(Session::first_parent(service.store()));
    (service, clock, mom, emma, jake)
}

#[test]
fn add_member_rejects_duplicates_ignoring_case() {
    let (mut service, _) = service();
    service.add_member("Mom", true).unwrap();

    let err = service.add_member("  mOM ", false).unwrap_err();
    assert_eq!(err, HouseholdError::DuplicateName("mOM".to_string()));

    let err = service.add_member("   ", false).unwrap_err();
    assert_eq!(err, HouseholdError::Validation(ValidationError::EmptyUserName));
    assert_eq!(service.store().list_users().len(), 1);
}

#[test]
fn add_member_hands_out_unused_palette_colors() {
    let (mut service, _) = service();
    let colors = (0..USER_COLORS.len())
        .map(|index| {
            service
                .add_member(&format!("Member {index}"), index == 0)
                .unwrap()
                .color
        })
        .collect::<Vec<_>>();
    assert_eq!(colors, USER_COLORS.map(str::to_string).to_vec());

    let overflow = service.add_member("One more", false).unwrap();
    assert_eq!(overflow.color, USER_COLORS[0]);
}

#[test]
fn create_task_requires_an_actor() {
    let (mut service, _) = service();
    let kid = service.add_member("Kid", false).unwrap();
    assert_eq!(service.session().actor(), None);

    let err = service
        .create_task(TaskForm::new("Dishes", kid.id, NOW + HOUR))
        .unwrap_err();
    assert_eq!(err, HouseholdError::NoActor);
    assert!(service.store().list_tasks().is_empty());
}

#[test]
fn create_task_checks_title_before_actor() {
    let (mut service, _) = service();
    let err = service
        .create_task(TaskForm::new("  ", Uuid::new_v4(), NOW))
        .unwrap_err();
    assert_eq!(err, HouseholdError::Validation(ValidationError::EmptyTitle));
}

#[test]
fn create_task_parses_points_and_attributes_creator() {
    let (mut service, _, mom, emma, _) = household();
    assert_eq!(service.session().actor(), Some(mom.id));

    let mut form = TaskForm::new(" Feed the cat ", emma.id, NOW + HOUR);
    form.points = "abc".to_string();
    assert_eq!(
        service.create_task(form.clone()).unwrap_err(),
        HouseholdError::InvalidPoints("abc".to_string())
    );

    form.points = "-4".to_string();
    assert!(matches!(
        service.create_task(form.clone()),
        Err(HouseholdError::InvalidPoints(_))
    ));

    form.points = " 15 pts".to_string();
    form.description = "   ".to_string();
    form.category = TaskCategory::Personal;
    let task = service.create_task(form).unwrap();
    assert_eq!(task.title, "Feed the cat");
    assert_eq!(task.points, Some(15));
    assert_eq!(task.description, None);
    assert_eq!(task.created_by, mom.id);
    assert_eq!(task.assigned_to, emma.id);
    assert_eq!(task.category, TaskCategory::Personal);

    let default_points = service
        .create_task(TaskForm::new("Homework", emma.id, NOW))
        .unwrap();
    assert_eq!(default_points.points, Some(10));
}

#[test]
fn create_task_without_due_date_is_rejected() {
    let (mut service, _, _, emma, _) = household();
    let mut form = TaskForm::new("Walk dog", emma.id, NOW);
    form.due_date = None;
    assert_eq!(
        service.create_task(form).unwrap_err(),
        HouseholdError::Validation(ValidationError::MissingDueDate)
    );
}

#[test]
fn complete_for_actor_records_session_member() {
    let (mut service, _, mom, emma, _) = household();
    let task = service
        .create_task(TaskForm::new("Read", emma.id, NOW + HOUR))
        .unwrap();

    assert_eq!(service.complete_for_actor(task.id, Some("done")), Ok(true));
    assert_eq!(service.complete_for_actor(Uuid::new_v4(), None), Ok(false));

    let log = service.store().completions_for_task(task.id);
    assert_eq!(log.len(), 1);
    assert_eq!(log[0].user_id, mom.id);

    service.set_session(Session::anonymous());
    assert_eq!(
        service.complete_for_actor(task.id, None),
        Err(HouseholdError::NoActor)
    );
}

#[test]
fn dashboard_aggregates_categories_children_and_top_performer() {
    let (mut service, _, _, emma, jake) = household();
    let mut chores = TaskForm::new("Dishes", emma.id, NOW - HOUR);
    chores.category = TaskCategory::Chores;
    let dishes = service.create_task(chores).unwrap();

    let mut homework = TaskForm::new("Math", jake.id, NOW + HOUR);
    homework.category = TaskCategory::Homework;
    homework.points = "20".to_string();
    let math = service.create_task(homework).unwrap();

    let mut reading = TaskForm::new("Reading", jake.id, NOW - 2 * HOUR);
    reading.category = TaskCategory::Homework;
    service.create_task(reading).unwrap();

    service.complete_for_actor(math.id, None).unwrap();

    let stats = service.dashboard();
    assert_eq!(stats.total, 3);
    assert_eq!(stats.completed, 1);
    assert_eq!(stats.pending, 2);
    assert_eq!(stats.overdue, 2);
    assert_eq!(stats.completion_rate, 33);

    let categories = stats
        .categories
        .iter()
        .map(|entry| (entry.category, entry.stats))
        .collect::<Vec<_>>();
    assert_eq!(
        categories,
        vec![
            (TaskCategory::Chores, CompletionStats::from_counts(0, 1)),
            (TaskCategory::Homework, CompletionStats::from_counts(1, 2)),
            (TaskCategory::Personal, CompletionStats::default()),
            (TaskCategory::Other, CompletionStats::default()),
        ]
    );

    assert_eq!(stats.children.len(), 2);
    assert_eq!(stats.children[0].user.id, emma.id);
    assert_eq!(stats.children[1].points, 20);
    assert_eq!(stats.children[1].stats.percentage, 50);
    assert_eq!(stats.top_performer.map(|user| user.id), Some(jake.id));

    service.complete_for_actor(dishes.id, None).unwrap();
    let stats = service.dashboard();
    assert_eq!(stats.top_performer.map(|user| user.id), Some(emma.id));
}

#[test]
fn top_performer_ties_prefer_more_completed_then_earlier_child() {
    let (mut service, _, _, emma, jake) = household();
    let a = service
        .create_task(TaskForm::new("a", emma.id, NOW))
        .unwrap();
    let b = service
        .create_task(TaskForm::new("b", jake.id, NOW))
        .unwrap();
    let c = service
        .create_task(TaskForm::new("c", jake.id, NOW))
        .unwrap();
    service.complete_for_actor(a.id, None).unwrap();
    service.complete_for_actor(b.id, None).unwrap();

    // 100% vs 50%
    assert_eq!(
        service.dashboard().top_performer.map(|user| user.id),
        Some(emma.id)
    );

    // both 100%; jake has more completed
    service.complete_for_actor(c.id, None).unwrap();
    assert_eq!(
        service.dashboard().top_performer.map(|user| user.id),
        Some(jake.id)
    );
}

#[test]
fn dashboard_on_empty_household_has_no_top_performer() {
    let (service, _) = service();
    let stats = service.dashboard();
    assert_eq!(stats.total, 0);
    assert_eq!(stats.completion_rate, 0);
    assert!(stats.children.is_empty());
    assert_eq!(stats.top_performer, None);
}

#[test]
fn member_overview_orders_pending_and_completed_lists() {
    let (mut service, clock, _, emma, _) = household();
    let later = service
        .create_task(TaskForm::new("later", emma.id, NOW + 5 * HOUR))
        .unwrap();
    let sooner = service
        .create_task(TaskForm::new("sooner", emma.id, NOW - HOUR))
        .unwrap();
    let first_done = service
        .create_task(TaskForm::new("first done", emma.id, NOW))
        .unwrap();
    let second_done = service
        .create_task(TaskForm::new("second done", emma.id, NOW))
        .unwrap();

    service.complete_for_actor(first_done.id, None).unwrap();
    clock.advance_ms(1_000);
    service.complete_for_actor(second_done.id, None).unwrap();

    let overview = service.member_overview(emma.id).expect("known member");
    assert_eq!(overview.user.id, emma.id);
    assert_eq!(
        overview.pending.iter().map(|task| task.id).collect::<Vec<_>>(),
        vec![sooner.id, later.id]
    );
    assert_eq!(
        overview.completed.iter().map(|task| task.id).collect::<Vec<_>>(),
        vec![second_done.id, first_done.id]
    );
    assert_eq!(overview.overdue_count, 1);
    assert_eq!(overview.stats, CompletionStats::from_counts(2, 4));
    assert_eq!(overview.points, 20);

    assert!(service.member_overview(Uuid::new_v4()).is_none());
}

#[test]
fn sample_household_starts_with_a_parent_session() {
    let store = TaskStore::with_sample_data(FixedClock::new(NOW));
    let service = HouseholdService::with_first_parent(store);
    let actor = service.session().actor().expect("sample data has parents");
    assert_eq!(
        service.store().get_user(actor).map(|user| user.name),
        Some("Mom".to_string())
    );
}

#[test]
fn explicit_session_attributes_completions_to_that_member() {
    let (mut service, _, _, emma, _) = household();
    let task = service
        .create_task(TaskForm::new("Set table", emma.id, NOW + HOUR))
        .unwrap();

    service.set_session(Session::new(emma.id));
    assert_eq!(service.session().actor(), Some(emma.id));
    assert_eq!(service.complete_for_actor(task.id, None), Ok(true));

    let log = service.store().completions_for_task(task.id);
    assert_eq!(log[0].user_id, emma.id);
}
