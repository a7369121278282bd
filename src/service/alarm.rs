use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ConnectionTrait, DatabaseConnection, EntityTrait, Set, TransactionTrait,
};

use crate::entity::alarm::{self, AlarmStatus, Entity as AlarmEntity};
use crate::entity::alarm_history;
use crate::model::auth::CurrentUser;
use crate::model::global_error::{AppError, ErrorCode};

pub const ACTION_ACKNOWLEDGED: &str = "acknowledged";
pub const ACTION_RESOLVED: &str = "resolved";

/// Acknowledgement is legal only from `active`. Re-acknowledging is an error,
/// not a silent no-op.
pub fn ensure_can_acknowledge(status: AlarmStatus) -> Result<(), AppError> {
    match status {
        AlarmStatus::Active => Ok(()),
        _ => Err(AppError::bad_request(ErrorCode::InvalidTransition)),
    }
}

/// Resolution is legal from `active` or `acknowledged`.
pub fn ensure_can_resolve(status: AlarmStatus) -> Result<(), AppError> {
    match status {
        AlarmStatus::Active | AlarmStatus::Acknowledged => Ok(()),
        AlarmStatus::Resolved => Err(AppError::bad_request(ErrorCode::InvalidTransition)),
    }
}

/// Moves an alarm from `active` to `acknowledged` and records who did it.
/// Mutation and history append commit together or not at all.
pub async fn acknowledge(
    db: &DatabaseConnection,
    alarm_id: i32,
    actor: &CurrentUser,
    comment: Option<String>,
) -> Result<alarm::Model, AppError> {
    let txn = db.begin().await?;

    let alarm = AlarmEntity::find_by_id(alarm_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::AlarmNotFound))?;

    ensure_can_acknowledge(alarm.status)?;

    let now = Utc::now();
    let mut alarm_model: alarm::ActiveModel = alarm.into();
    alarm_model.status = Set(AlarmStatus::Acknowledged);
    alarm_model.acknowledged_by = Set(Some(actor.id));
    alarm_model.acknowledged_at = Set(Some(now.into()));
    alarm_model.updated_at = Set(now.into());

    let updated = alarm_model.update(&txn).await?;

    append_history(
        &txn,
        updated.id,
        actor.id,
        ACTION_ACKNOWLEDGED,
        comment.unwrap_or_default(),
    )
    .await?;

    txn.commit().await?;

    tracing::info!(alarm_id = updated.id, user_id = actor.id, "alarm acknowledged");

    Ok(updated)
}

/// Moves an alarm to `resolved` from either `active` or `acknowledged`.
pub async fn resolve(
    db: &DatabaseConnection,
    alarm_id: i32,
    actor: &CurrentUser,
    comment: Option<String>,
) -> Result<alarm::Model, AppError> {
    let txn = db.begin().await?;

    let alarm = AlarmEntity::find_by_id(alarm_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::AlarmNotFound))?;

    ensure_can_resolve(alarm.status)?;

    let now = Utc::now();
    let mut alarm_model: alarm::ActiveModel = alarm.into();
    alarm_model.status = Set(AlarmStatus::Resolved);
    alarm_model.resolved_by = Set(Some(actor.id));
    alarm_model.resolved_at = Set(Some(now.into()));
    alarm_model.updated_at = Set(now.into());

    let updated = alarm_model.update(&txn).await?;

    append_history(
        &txn,
        updated.id,
        actor.id,
        ACTION_RESOLVED,
        comment.unwrap_or_default(),
    )
    .await?;

    txn.commit().await?;

    tracing::info!(alarm_id = updated.id, user_id = actor.id, "alarm resolved");

    Ok(updated)
}

async fn append_history<C: ConnectionTrait>(
    conn: &C,
    alarm_id: i32,
    user_id: i32,
    action: &str,
    comment: String,
) -> Result<alarm_history::Model, AppError> {
    let entry = alarm_history::ActiveModel {
        alarm_id: Set(alarm_id),
        user_id: Set(user_id),
        action: Set(action.to_string()),
        comment: Set(comment),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(entry.insert(conn).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::alarm::{AlarmType, Severity};
    use crate::entity::user::Role;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn operator() -> CurrentUser {
        CurrentUser {
            id: 1,
            role: Role::Operator,
            team_id: None,
        }
    }

    fn make_alarm(status: AlarmStatus) -> alarm::Model {
        let now = Utc::now();
        alarm::Model {
            id: 5,
            site_id: 2,
            alarm_type: AlarmType::Power,
            severity: Severity::Critical,
            status,
            title: "Rectifier failure".into(),
            description: String::new(),
            acknowledged_by: if status == AlarmStatus::Active { None } else { Some(1) },
            acknowledged_at: if status == AlarmStatus::Active { None } else { Some(now.into()) },
            resolved_by: None,
            resolved_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    fn make_history(id: i32, action: &str) -> alarm_history::Model {
        alarm_history::Model {
            id,
            alarm_id: 5,
            user_id: 1,
            action: action.into(),
            comment: String::new(),
            created_at: Utc::now().into(),
        }
    }

    fn exec_ok(last_insert_id: u64) -> MockExecResult {
        MockExecResult {
            last_insert_id,
            rows_affected: 1,
        }
    }

    #[tokio::test]
    async fn acknowledge_appends_exactly_one_history_row() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([
                vec![make_alarm(AlarmStatus::Active)],
                vec![make_alarm(AlarmStatus::Acknowledged)],
            ])
            .append_query_results([vec![make_history(1, ACTION_ACKNOWLEDGED)]])
            .append_exec_results([exec_ok(0), exec_ok(1)])
            .into_connection();

        let updated = acknowledge(&db, 5, &operator(), None).await.unwrap();
        assert_eq!(updated.status, AlarmStatus::Acknowledged);
        assert_eq!(updated.acknowledged_by, Some(1));

        let log = format!("{:?}", db.into_transaction_log());
        assert_eq!(log.matches("INSERT INTO `alarm_history`").count(), 1);
    }

    #[tokio::test]
    async fn rejected_acknowledge_appends_nothing() {
        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([vec![make_alarm(AlarmStatus::Acknowledged)]])
            .into_connection();

        let err = acknowledge(&db, 5, &operator(), None).await.unwrap_err();
        match err {
            AppError::ApiError(code, _) => assert_eq!(code, ErrorCode::InvalidTransition),
            _ => panic!("expected ApiError"),
        }

        let log = format!("{:?}", db.into_transaction_log());
        assert_eq!(log.matches("INSERT INTO `alarm_history`").count(), 0);
    }

    #[tokio::test]
    async fn acknowledge_then_resolve_logs_actions_in_order() {
        let mut resolved = make_alarm(AlarmStatus::Resolved);
        resolved.resolved_by = Some(1);

        let db = MockDatabase::new(DatabaseBackend::MySql)
            .append_query_results([
                vec![make_alarm(AlarmStatus::Active)],
                vec![make_alarm(AlarmStatus::Acknowledged)],
            ])
            .append_query_results([vec![make_history(1, ACTION_ACKNOWLEDGED)]])
            .append_query_results([
                vec![make_alarm(AlarmStatus::Acknowledged)],
                vec![resolved],
            ])
            .append_query_results([vec![make_history(2, ACTION_RESOLVED)]])
            .append_exec_results([exec_ok(0), exec_ok(1), exec_ok(0), exec_ok(2)])
            .into_connection();

        let actor = operator();
        acknowledge(&db, 5, &actor, None).await.unwrap();
        let updated = resolve(&db, 5, &actor, None).await.unwrap();
        assert_eq!(updated.status, AlarmStatus::Resolved);
        assert_eq!(updated.resolved_by, Some(1));

        let log = format!("{:?}", db.into_transaction_log());
        assert_eq!(log.matches("INSERT INTO `alarm_history`").count(), 2);
        // Bound values, not column names, locate the two transitions.
        let first_ack = log
            .find("Some(\"acknowledged\")")
            .expect("acknowledged action logged");
        let first_resolve = log
            .find("Some(\"resolved\")")
            .expect("resolved action logged");
        assert!(first_ack < first_resolve);
    }

    #[test]
    fn acknowledge_only_legal_from_active() {
        assert!(ensure_can_acknowledge(AlarmStatus::Active).is_ok());
        assert!(ensure_can_acknowledge(AlarmStatus::Acknowledged).is_err());
        assert!(ensure_can_acknowledge(AlarmStatus::Resolved).is_err());
    }

    #[test]
    fn resolve_legal_from_active_and_acknowledged() {
        assert!(ensure_can_resolve(AlarmStatus::Active).is_ok());
        assert!(ensure_can_resolve(AlarmStatus::Acknowledged).is_ok());
        assert!(ensure_can_resolve(AlarmStatus::Resolved).is_err());
    }

    #[test]
    fn rejected_transition_reports_invalid_transition() {
        let err = ensure_can_resolve(AlarmStatus::Resolved).unwrap_err();
        match err {
            AppError::ApiError(code, _) => assert_eq!(code, ErrorCode::InvalidTransition),
            _ => panic!("expected ApiError"),
        }
    }
}
