use rusqlite::{Connection, TransactionBehavior};
use tracing::info;

use super::data::*;
use super::helpers::*;
use crate::data::UserId;
use crate::error::{ApiError, ApiResult};

pub fn parse_template_id(raw: &str) -> ApiResult<TemplateID> {
    match raw.parse::<TemplateID>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(ApiError::validation("Invalid template ID")),
    }
}

pub fn validate_tasks(tasks: Option<Vec<Task>>) -> ApiResult<Vec<Task>> {
    let tasks = match tasks {
        Some(tasks) if !tasks.is_empty() => tasks,
        _ => return Err(ApiError::validation("Tasks are required")),
    };

    if tasks.len() > MAX_TASKS_PER_TEMPLATE {
        return Err(ApiError::validation(format!(
            "Maximum {} tasks allowed",
            MAX_TASKS_PER_TEMPLATE
        )));
    }

    tasks
        .into_iter()
        .map(|task| {
            let title = task.title.trim();

            if title.is_empty() {
                Err(ApiError::validation("Task title is required"))
            } else {
                Ok(Task {
                    title: title.to_string(),
                    description: task.description,
                })
            }
        })
        .collect()
}

fn template_not_found() -> ApiError {
    ApiError::not_found("Template not found")
}

pub fn list_templates(db_connection: &Connection, user: &UserId) -> ApiResult<Vec<RoutineTemplate>> {
    get_templates_for_owner_from_db(user, db_connection)
}

pub fn get_active(db_connection: &Connection, user: &UserId) -> ApiResult<RoutineTemplate> {
    if let Some(template) = get_active_template_from_db(Some(user), db_connection)? {
        return Ok(template);
    }

    get_active_template_from_db(None, db_connection)?
        .ok_or_else(|| ApiError::not_found("No routine found"))
}

pub fn get_public_default(db_connection: &Connection) -> ApiResult<RoutineTemplate> {
    get_active_template_from_db(None, db_connection)?
        .ok_or_else(|| ApiError::not_found("Default routine not found"))
}

pub fn seed_default(db_connection: &Connection) -> ApiResult<SeedOutcome> {
    if let Some(existing) = get_active_template_from_db(None, db_connection)? {
        return Ok(SeedOutcome::AlreadyExists(existing));
    }

    let inserted = add_system_default_to_db_if_absent(
        &NewRoutineTemplate {
            owner: None,
            title: String::from(SYSTEM_DEFAULT_TITLE),
            tasks: system_default_tasks(),
            is_active: true,
        },
        db_connection,
    )?;

    let template = get_active_template_from_db(None, db_connection)?
        .ok_or_else(|| ApiError::Internal(String::from("System default missing after seeding")))?;

    if inserted {
        info!(template_id = template.id, "seeded system default routine");
        Ok(SeedOutcome::Created(template))
    } else {
        Ok(SeedOutcome::AlreadyExists(template))
    }
}

pub fn create_custom(
    db_connection: &mut Connection,
    user: &UserId,
    tasks: Option<Vec<Task>>,
    set_as_default: bool,
) -> ApiResult<RoutineTemplate> {
    let tasks = validate_tasks(tasks)?;

    let transaction = db_connection.transaction_with_behavior(TransactionBehavior::Immediate)?;

    if count_templates_for_owner_from_db(user, &transaction)? >= MAX_TEMPLATES_PER_USER {
        return Err(ApiError::QuotaExceeded(format!(
            "Template limit reached (max {})",
            MAX_TEMPLATES_PER_USER
        )));
    }

    if set_as_default {
        deactivate_templates_for_owner_in_db(user, &transaction)?;
    }

    let template = add_template_to_db(
        &NewRoutineTemplate {
            owner: Some(user.clone()),
            title: String::from(CUSTOM_TITLE),
            tasks,
            is_active: set_as_default,
        },
        &transaction,
    )?;

    transaction.commit()?;
    info!(user = %user, template_id = template.id, active = template.is_active, "created routine template");

    Ok(template)
}

pub fn update_template(
    db_connection: &mut Connection,
    user: &UserId,
    template_id: TemplateID,
    tasks: Option<Vec<Task>>,
    set_as_default: bool,
) -> ApiResult<RoutineTemplate> {
    let tasks = validate_tasks(tasks)?;

    let transaction = db_connection.transaction_with_behavior(TransactionBehavior::Immediate)?;

    get_owned_template_from_db(template_id, user, &transaction)?.ok_or_else(template_not_found)?;

    if set_as_default {
        deactivate_templates_for_owner_in_db(user, &transaction)?;
        set_template_active_in_db(template_id, true, &transaction)?;
    }
    update_template_tasks_in_db(template_id, &tasks, &transaction)?;

    let template = get_template_from_db(template_id, &transaction)?.ok_or_else(template_not_found)?;

    transaction.commit()?;
    info!(user = %user, template_id, active = template.is_active, "updated routine template");

    Ok(template)
}

pub fn activate_template(
    db_connection: &mut Connection,
    user: &UserId,
    template_id: TemplateID,
) -> ApiResult<()> {
    let transaction = db_connection.transaction_with_behavior(TransactionBehavior::Immediate)?;

    get_owned_template_from_db(template_id, user, &transaction)?.ok_or_else(template_not_found)?;

    deactivate_templates_for_owner_in_db(user, &transaction)?;
    set_template_active_in_db(template_id, true, &transaction)?;

    transaction.commit()?;
    info!(user = %user, template_id, "activated routine template");

    Ok(())
}

/// Deletes a template. When it was the active one, the most recently created
/// remaining template takes its place and is returned.
pub fn delete_template(
    db_connection: &mut Connection,
    user: &UserId,
    template_id: TemplateID,
) -> ApiResult<Option<RoutineTemplate>> {
    let transaction = db_connection.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let template =
        get_owned_template_from_db(template_id, user, &transaction)?.ok_or_else(template_not_found)?;

    delete_template_from_db(template_id, &transaction)?;

    let mut promoted = None;
    if template.is_active {
        if let Some(mut latest) = get_latest_template_for_owner_from_db(user, &transaction)? {
            set_template_active_in_db(latest.id, true, &transaction)?;
            latest.is_active = true;
            promoted = Some(latest);
        }
    }

    transaction.commit()?;
    info!(
        user = %user,
        template_id,
        promoted = ?promoted.as_ref().map(|t| t.id),
        "deleted routine template"
    );

    Ok(promoted)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::open_in_memory_database;
    use chrono::{TimeZone, Utc};

    fn alice() -> UserId {
        UserId::new("alice")
    }

    fn tasks(n: usize) -> Option<Vec<Task>> {
        Some(
            (0..n)
                .map(|i| Task::new(&format!("Task {}", i), ""))
                .collect(),
        )
    }

    fn active_ids(db_connection: &Connection, user: &UserId) -> Vec<TemplateID> {
        list_templates(db_connection, user)
            .unwrap()
            .into_iter()
            .filter(|t| t.is_active)
            .map(|t| t.id)
            .collect()
    }

    #[test]
    fn template_ids_must_be_positive_integers() {
        assert_eq!(parse_template_id("12"), Ok(12));
        assert!(parse_template_id("abc").is_err());
        assert!(parse_template_id("0").is_err());
        assert!(parse_template_id("-3").is_err());
    }

    #[test]
    fn task_counts_are_bounded() {
        assert!(validate_tasks(None).is_err());
        assert!(validate_tasks(tasks(0)).is_err());
        assert!(validate_tasks(tasks(16)).is_err());
        assert_eq!(validate_tasks(tasks(15)).unwrap().len(), 15);
    }

    #[test]
    fn task_titles_are_trimmed_and_required() {
        let trimmed = validate_tasks(Some(vec![Task::new("  Read  ", "20 pages")])).unwrap();
        let blank = validate_tasks(Some(vec![Task::new("   ", "")]));

        assert_eq!(trimmed, vec![Task::new("Read", "20 pages")]);
        assert_eq!(blank, Err(ApiError::validation("Task title is required")));
    }

    #[test]
    fn seeding_is_idempotent() {
        let db_connection = open_in_memory_database().unwrap();

        let first = seed_default(&db_connection).unwrap();
        let second = seed_default(&db_connection).unwrap();

        let created = match first {
            SeedOutcome::Created(template) => template,
            other => panic!("expected a new default, got {:?}", other),
        };
        assert_eq!(created.user_id, None);
        assert_eq!(created.tasks.len(), 7);
        assert_eq!(second, SeedOutcome::AlreadyExists(created));
    }

    #[test]
    fn active_falls_back_to_system_default() {
        let db_connection = open_in_memory_database().unwrap();

        assert_eq!(
            get_active(&db_connection, &alice()),
            Err(ApiError::not_found("No routine found"))
        );

        seed_default(&db_connection).unwrap();

        assert_eq!(get_active(&db_connection, &alice()).unwrap().user_id, None);
    }

    #[test]
    fn own_active_template_wins_over_default() {
        let mut db_connection = open_in_memory_database().unwrap();
        seed_default(&db_connection).unwrap();

        let own = create_custom(&mut db_connection, &alice(), tasks(2), true).unwrap();

        assert_eq!(get_active(&db_connection, &alice()).unwrap().id, own.id);
    }

    #[test]
    fn inactive_templates_do_not_replace_the_active_one() {
        let mut db_connection = open_in_memory_database().unwrap();

        let first = create_custom(&mut db_connection, &alice(), tasks(1), true).unwrap();
        let second = create_custom(&mut db_connection, &alice(), tasks(1), false).unwrap();

        assert!(!second.is_active);
        assert_eq!(active_ids(&db_connection, &alice()), vec![first.id]);
    }

    #[test]
    fn fourth_template_exceeds_quota() {
        for set_as_default in [true, false] {
            let mut db_connection = open_in_memory_database().unwrap();
            for _ in 0..3 {
                create_custom(&mut db_connection, &alice(), tasks(1), false).unwrap();
            }

            let fourth = create_custom(&mut db_connection, &alice(), tasks(1), set_as_default);

            assert!(matches!(fourth, Err(ApiError::QuotaExceeded(_))));
        }
    }

    #[test]
    fn quota_is_per_user_and_ignores_system_default() {
        let mut db_connection = open_in_memory_database().unwrap();
        seed_default(&db_connection).unwrap();

        for _ in 0..3 {
            create_custom(&mut db_connection, &alice(), tasks(1), false).unwrap();
        }

        assert!(create_custom(&mut db_connection, &UserId::new("bob"), tasks(1), false).is_ok());
    }

    #[test]
    fn templates_are_listed_newest_first() {
        let mut db_connection = open_in_memory_database().unwrap();

        let ids: Vec<TemplateID> = (0..3)
            .map(|_| create_custom(&mut db_connection, &alice(), tasks(1), false).unwrap().id)
            .collect();

        let listed: Vec<TemplateID> = list_templates(&db_connection, &alice())
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();

        assert_eq!(listed, ids.into_iter().rev().collect::<Vec<_>>());
    }

    #[test]
    fn activation_leaves_exactly_one_active() {
        let mut db_connection = open_in_memory_database().unwrap();

        let a = create_custom(&mut db_connection, &alice(), tasks(1), true).unwrap();
        let b = create_custom(&mut db_connection, &alice(), tasks(1), false).unwrap();
        let c = create_custom(&mut db_connection, &alice(), tasks(1), true).unwrap();

        activate_template(&mut db_connection, &alice(), b.id).unwrap();
        assert_eq!(active_ids(&db_connection, &alice()), vec![b.id]);

        update_template(&mut db_connection, &alice(), a.id, tasks(2), true).unwrap();
        assert_eq!(active_ids(&db_connection, &alice()), vec![a.id]);

        activate_template(&mut db_connection, &alice(), c.id).unwrap();
        activate_template(&mut db_connection, &alice(), c.id).unwrap();
        assert_eq!(active_ids(&db_connection, &alice()), vec![c.id]);
    }

    #[test]
    fn other_users_templates_are_not_found() {
        let mut db_connection = open_in_memory_database().unwrap();
        let bob = UserId::new("bob");
        let template = create_custom(&mut db_connection, &alice(), tasks(1), true).unwrap();

        assert!(matches!(
            activate_template(&mut db_connection, &bob, template.id),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            update_template(&mut db_connection, &bob, template.id, tasks(1), false),
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            delete_template(&mut db_connection, &bob, template.id),
            Err(ApiError::NotFound(_))
        ));
        assert_eq!(active_ids(&db_connection, &alice()), vec![template.id]);
    }

    #[test]
    fn update_replaces_tasks_without_changing_activation() {
        let mut db_connection = open_in_memory_database().unwrap();
        let template = create_custom(&mut db_connection, &alice(), tasks(3), false).unwrap();

        let updated = update_template(
            &mut db_connection,
            &alice(),
            template.id,
            Some(vec![Task::new("Journal", "One page")]),
            false,
        )
        .unwrap();

        assert_eq!(updated.tasks, vec![Task::new("Journal", "One page")]);
        assert!(!updated.is_active);
    }

    #[test]
    fn update_validates_before_lookup() {
        let mut db_connection = open_in_memory_database().unwrap();

        let result = update_template(&mut db_connection, &alice(), 42, tasks(0), false);

        assert_eq!(result, Err(ApiError::validation("Tasks are required")));
    }

    #[test]
    fn deleting_active_template_promotes_newest_sibling() {
        let mut db_connection = open_in_memory_database().unwrap();

        let oldest = create_custom(&mut db_connection, &alice(), tasks(1), false).unwrap();
        let newest = create_custom(&mut db_connection, &alice(), tasks(1), false).unwrap();
        activate_template(&mut db_connection, &alice(), oldest.id).unwrap();

        let promoted = delete_template(&mut db_connection, &alice(), oldest.id).unwrap();

        assert_eq!(promoted.map(|t| t.id), Some(newest.id));
        assert_eq!(active_ids(&db_connection, &alice()), vec![newest.id]);
    }

    #[test]
    fn deleting_inactive_template_keeps_current_active() {
        let mut db_connection = open_in_memory_database().unwrap();

        let active = create_custom(&mut db_connection, &alice(), tasks(1), true).unwrap();
        let inactive = create_custom(&mut db_connection, &alice(), tasks(1), false).unwrap();

        let promoted = delete_template(&mut db_connection, &alice(), inactive.id).unwrap();

        assert_eq!(promoted, None);
        assert_eq!(active_ids(&db_connection, &alice()), vec![active.id]);
    }

    #[test]
    fn deleting_only_template_leaves_none_active() {
        let mut db_connection = open_in_memory_database().unwrap();
        let only = create_custom(&mut db_connection, &alice(), tasks(1), true).unwrap();

        assert_eq!(delete_template(&mut db_connection, &alice(), only.id).unwrap(), None);
        assert!(list_templates(&db_connection, &alice()).unwrap().is_empty());
    }

    #[test]
    fn promotion_breaks_creation_time_ties_by_highest_id() {
        let mut db_connection = open_in_memory_database().unwrap();
        let created_at = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();

        let active = add_template_created_at_to_db(&alice(), true, created_at, &db_connection).unwrap();
        let lower = add_template_created_at_to_db(&alice(), false, created_at, &db_connection).unwrap();
        let higher = add_template_created_at_to_db(&alice(), false, created_at, &db_connection).unwrap();

        let promoted = delete_template(&mut db_connection, &alice(), active).unwrap();

        assert_eq!(promoted.map(|t| t.id), Some(higher));
        assert_eq!(active_ids(&db_connection, &alice()), vec![higher]);
        assert!(list_templates(&db_connection, &alice())
            .unwrap()
            .iter()
            .any(|t| t.id == lower && !t.is_active));
    }
}
