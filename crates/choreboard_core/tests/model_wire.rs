use choreboard_core::{
    RepeatType, Task, TaskCategory, TaskCompletion, TaskPriority, User,
};
use uuid::Uuid;

fn fixed_id(tail: &str) -> Uuid {
    Uuid::parse_str(&format!("11111111-2222-4333-8444-{tail}")).unwrap()
}

#[test]
fn user_serialization_uses_expected_wire_fields() {
    let user = User::with_id(fixed_id("000000000001"), "Emma", false, "#9B59B6");

    let json = serde_json::to_value(&user).unwrap();
    assert_eq!(json["id"], user.id.to_string());
    assert_eq!(json["name"], "Emma");
    assert_eq!(json["is_parent"], false);
    assert_eq!(json["avatar"], serde_json::Value::Null);
    assert_eq!(json["color"], "#9B59B6");

    let decoded: User = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, user);
}

#[test]
fn task_serialization_uses_snake_case_enums() {
    let task = Task {
        id: fixed_id("000000000010"),
        title: "Math homework".to_string(),
        description: None,
        assigned_to: fixed_id("000000000002"),
        created_by: fixed_id("000000000003"),
        due_date: 1_700_000_000_000,
        completed_at: Some(1_700_000_360_000),
        is_completed: true,
        repeat_type: RepeatType::Weekly,
        category: TaskCategory::Homework,
        priority: TaskPriority::High,
        points: Some(15),
    };

    let json = serde_json::to_value(&task).unwrap();
    assert_eq!(json["repeat_type"], "weekly");
    assert_eq!(json["category"], "homework");
    assert_eq!(json["priority"], "high");
    assert_eq!(json["due_date"], 1_700_000_000_000_i64);
    assert_eq!(json["completed_at"], 1_700_000_360_000_i64);
    assert_eq!(json["points"], 15);

    let decoded: Task = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, task);
}

#[test]
fn task_defaults_match_form_defaults() {
    assert_eq!(RepeatType::default(), RepeatType::None);
    assert_eq!(TaskCategory::default(), TaskCategory::Chores);
    assert_eq!(TaskPriority::default(), TaskPriority::Medium);
    assert_eq!(
        serde_json::to_value(RepeatType::None).unwrap(),
        serde_json::json!("none")
    );
}

#[test]
fn completion_record_round_trips() {
    let record = TaskCompletion {
        id: fixed_id("000000000020"),
        task_id: fixed_id("000000000010"),
        user_id: fixed_id("000000000003"),
        completed_at: 1_700_000_400_000,
        notes: Some("well done".to_string()),
    };

    let json = serde_json::to_value(&record).unwrap();
    assert_eq!(json["task_id"], record.task_id.to_string());
    assert_eq!(json["notes"], "well done");

    let decoded: TaskCompletion = serde_json::from_value(json).unwrap();
    assert_eq!(decoded, record);
}

#[test]
fn point_value_treats_missing_points_as_zero() {
    let mut task: Task = serde_json::from_value(serde_json::json!({
        "id": fixed_id("000000000030"),
        "title": "Tidy",
        "description": null,
        "assigned_to": fixed_id("000000000002"),
        "created_by": fixed_id("000000000003"),
        "due_date": 1_700_000_000_000_i64,
        "completed_at": null,
        "is_completed": false,
        "repeat_type": "none",
        "category": "chores",
        "priority": "low",
        "points": null
    }))
    .unwrap();
    assert_eq!(task.point_value(), 0);
    assert!(task.is_overdue(1_700_000_000_001));
    assert!(!task.is_overdue(1_700_000_000_000));

    task.is_completed = true;
    assert!(!task.is_overdue(1_800_000_000_000));
}
