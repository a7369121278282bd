use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, EntityTrait, QueryFilter,
    Set, TransactionTrait,
};
use sea_query::Condition;

use crate::entity::alarm::Entity as AlarmEntity;
use crate::entity::team::Entity as TeamEntity;
use crate::entity::ticket::{self, Entity as TicketEntity, TicketStatus};
use crate::entity::ticket_update;
use crate::entity::user::Entity as UserEntity;
use crate::model::auth::CurrentUser;
use crate::model::global_error::{AppError, ErrorCode};
use crate::model::ticket::TicketCreateRequest;

/// The single visibility predicate consumed by both the listing and the
/// by-id lookup. `None` means unrestricted; technicians are scoped to
/// tickets assigned to them or owned by their team.
pub fn visibility_scope(user: &CurrentUser) -> Option<Condition> {
    if user.role.sees_all_tickets() {
        return None;
    }

    let mut cond = Condition::any().add(ticket::Column::AssignedTo.eq(user.id));
    if let Some(team_id) = user.team_id {
        cond = cond.add(ticket::Column::TeamId.eq(team_id));
    }

    Some(cond)
}

/// Looks a ticket up within the caller's visibility set. A ticket outside
/// the set is reported as absent, never as forbidden.
pub async fn find_visible<C: ConnectionTrait>(
    conn: &C,
    ticket_id: i32,
    user: &CurrentUser,
) -> Result<ticket::Model, AppError> {
    let mut query = TicketEntity::find().filter(ticket::Column::Id.eq(ticket_id));
    if let Some(scope) = visibility_scope(user) {
        query = query.filter(scope);
    }

    query
        .one(conn)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::TicketNotFound))
}

/// Escalates an alarm into a ticket. Exactly one ticket per alarm.
pub async fn create(
    db: &DatabaseConnection,
    req: &TicketCreateRequest,
    actor: &CurrentUser,
) -> Result<ticket::Model, AppError> {
    let txn = db.begin().await?;

    AlarmEntity::find_by_id(req.alarm_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::AlarmNotFound))?;

    let existing = TicketEntity::find()
        .filter(ticket::Column::AlarmId.eq(req.alarm_id))
        .one(&txn)
        .await?;
    if existing.is_some() {
        return Err(AppError::conflict(ErrorCode::DuplicateTicket));
    }

    TeamEntity::find_by_id(req.team_id)
        .one(&txn)
        .await?
        .ok_or_else(|| AppError::not_found(ErrorCode::TeamNotFound))?;

    if let Some(user_id) = req.assigned_to {
        UserEntity::find_by_id(user_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::field("assignedTo", "No such user"))?;
    }

    let now = Utc::now();
    let new_ticket = ticket::ActiveModel {
        alarm_id: Set(req.alarm_id),
        team_id: Set(req.team_id),
        assigned_to: Set(req.assigned_to),
        status: Set(TicketStatus::Open),
        priority: Set(req.priority),
        title: Set(req.title.clone()),
        description: Set(req.description.clone()),
        resolution: Set(String::new()),
        resolved_at: Set(None),
        closed_at: Set(None),
        created_at: Set(now.into()),
        updated_at: Set(now.into()),
        ..Default::default()
    };

    let inserted = new_ticket.insert(&txn).await?;
    txn.commit().await?;

    tracing::info!(
        ticket_id = inserted.id,
        alarm_id = inserted.alarm_id,
        user_id = actor.id,
        "ticket created"
    );

    Ok(inserted)
}

/// The work-log row a status update will append.
#[derive(Debug, PartialEq)]
pub struct UpdateLogEntry {
    pub comment: String,
    pub status_changed_from: String,
    pub status_changed_to: String,
}

/// What an `update_status` call will do, decided before touching the store.
#[derive(Debug, PartialEq)]
pub struct StatusUpdatePlan {
    pub new_status: Option<TicketStatus>,
    pub set_resolved_at: bool,
    pub set_closed_at: bool,
    pub log: UpdateLogEntry,
}

/// Decides the effect of a status update. Returns `None` when the call is a
/// no-op: no status change and no comment means no mutation and no log row.
/// `resolved_at`/`closed_at` are set only on the first transition into their
/// status and never overwritten afterwards.
pub fn plan_status_update(
    current: &ticket::Model,
    new_status: Option<TicketStatus>,
    comment: Option<&str>,
) -> Option<StatusUpdatePlan> {
    let comment = comment.map(str::trim).filter(|c| !c.is_empty());
    let changed = new_status.filter(|s| *s != current.status);

    match (changed, comment) {
        (Some(status), comment) => Some(StatusUpdatePlan {
            new_status: Some(status),
            set_resolved_at: status == TicketStatus::Resolved && current.resolved_at.is_none(),
            set_closed_at: status == TicketStatus::Closed && current.closed_at.is_none(),
            log: UpdateLogEntry {
                comment: comment.map(str::to_string).unwrap_or_else(|| {
                    format!(
                        "Status changed from {} to {}",
                        current.status.as_str(),
                        status.as_str()
                    )
                }),
                status_changed_from: current.status.as_str().to_string(),
                status_changed_to: status.as_str().to_string(),
            },
        }),
        (None, Some(comment)) => Some(StatusUpdatePlan {
            new_status: None,
            set_resolved_at: false,
            set_closed_at: false,
            log: UpdateLogEntry {
                comment: comment.to_string(),
                status_changed_from: String::new(),
                status_changed_to: String::new(),
            },
        }),
        (None, None) => None,
    }
}

/// Applies a status change and/or comment, appending exactly one work-log row
/// per effective call, atomically with the ticket mutation.
pub async fn update_status(
    db: &DatabaseConnection,
    ticket_id: i32,
    actor: &CurrentUser,
    new_status: Option<TicketStatus>,
    resolution: Option<String>,
    comment: Option<String>,
) -> Result<ticket::Model, AppError> {
    let txn = db.begin().await?;

    let current = find_visible(&txn, ticket_id, actor).await?;

    let Some(plan) = plan_status_update(&current, new_status, comment.as_deref()) else {
        txn.commit().await?;
        return Ok(current);
    };

    let now = Utc::now();
    let mut ticket_model: ticket::ActiveModel = current.into();
    if let Some(status) = plan.new_status {
        ticket_model.status = Set(status);
    }
    if plan.set_resolved_at {
        ticket_model.resolved_at = Set(Some(now.into()));
    }
    if plan.set_closed_at {
        ticket_model.closed_at = Set(Some(now.into()));
    }
    if let Some(resolution) = resolution {
        ticket_model.resolution = Set(resolution);
    }
    ticket_model.updated_at = Set(now.into());

    let updated = ticket_model.update(&txn).await?;

    append_update(
        &txn,
        updated.id,
        actor.id,
        plan.log.comment,
        plan.log.status_changed_from,
        plan.log.status_changed_to,
    )
    .await?;

    txn.commit().await?;

    Ok(updated)
}

/// Assigns or unassigns a ticket; `user_id = None` unassigns. One work-log
/// row either way.
pub async fn assign(
    db: &DatabaseConnection,
    ticket_id: i32,
    actor: &CurrentUser,
    user_id: Option<i32>,
) -> Result<ticket::Model, AppError> {
    let txn = db.begin().await?;

    let current = find_visible(&txn, ticket_id, actor).await?;

    let comment = match user_id {
        Some(user_id) => {
            let assignee = UserEntity::find_by_id(user_id)
                .one(&txn)
                .await?
                .ok_or_else(|| AppError::not_found(ErrorCode::UserNotFound))?;
            format!("Ticket assigned to {}", assignee.username)
        }
        None => "Ticket unassigned".to_string(),
    };

    let now = Utc::now();
    let mut ticket_model: ticket::ActiveModel = current.into();
    ticket_model.assigned_to = Set(user_id);
    ticket_model.updated_at = Set(now.into());

    let updated = ticket_model.update(&txn).await?;

    append_update(&txn, updated.id, actor.id, comment, String::new(), String::new()).await?;

    txn.commit().await?;

    Ok(updated)
}

/// Appends a comment-only work-log row. Identical comments are deliberately
/// not deduplicated.
pub async fn add_comment(
    db: &DatabaseConnection,
    ticket_id: i32,
    actor: &CurrentUser,
    comment: &str,
) -> Result<ticket_update::Model, AppError> {
    if comment.trim().is_empty() {
        return Err(AppError::field("comment", "Comment is required"));
    }

    let txn = db.begin().await?;

    let ticket = find_visible(&txn, ticket_id, actor).await?;

    let update = append_update(
        &txn,
        ticket.id,
        actor.id,
        comment.trim().to_string(),
        String::new(),
        String::new(),
    )
    .await?;

    txn.commit().await?;

    Ok(update)
}

async fn append_update<C: ConnectionTrait>(
    conn: &C,
    ticket_id: i32,
    user_id: i32,
    comment: String,
    status_changed_from: String,
    status_changed_to: String,
) -> Result<ticket_update::Model, AppError> {
    let entry = ticket_update::ActiveModel {
        ticket_id: Set(ticket_id),
        user_id: Set(user_id),
        comment: Set(comment),
        status_changed_from: Set(status_changed_from),
        status_changed_to: Set(status_changed_to),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    };

    Ok(entry.insert(conn).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::ticket::Priority;
    use crate::entity::user::Role;

    fn technician(team_id: Option<i32>) -> CurrentUser {
        CurrentUser {
            id: 42,
            role: Role::Technician,
            team_id,
        }
    }

    fn open_ticket() -> ticket::Model {
        let now = Utc::now();
        ticket::Model {
            id: 1,
            alarm_id: 10,
            team_id: 3,
            assigned_to: None,
            status: TicketStatus::Open,
            priority: Priority::Medium,
            title: "Rectifier failure".into(),
            description: "Power alarm on site A".into(),
            resolution: String::new(),
            resolved_at: None,
            closed_at: None,
            created_at: now.into(),
            updated_at: now.into(),
        }
    }

    #[test]
    fn operators_and_admins_are_unscoped() {
        for role in [Role::Admin, Role::Operator] {
            let user = CurrentUser { id: 1, role, team_id: None };
            assert!(visibility_scope(&user).is_none());
        }
    }

    #[test]
    fn technicians_are_scoped() {
        assert!(visibility_scope(&technician(Some(3))).is_some());
        // Even without a team, a technician is still limited to assignments.
        assert!(visibility_scope(&technician(None)).is_some());
    }

    #[test]
    fn status_change_logs_from_and_to() {
        let ticket = open_ticket();
        let plan =
            plan_status_update(&ticket, Some(TicketStatus::InProgress), Some("taking it")).unwrap();

        assert_eq!(plan.new_status, Some(TicketStatus::InProgress));
        assert_eq!(plan.log.status_changed_from, "open");
        assert_eq!(plan.log.status_changed_to, "in_progress");
        assert_eq!(plan.log.comment, "taking it");
        assert!(!plan.set_resolved_at);
        assert!(!plan.set_closed_at);
    }

    #[test]
    fn status_change_without_comment_gets_default_text() {
        let ticket = open_ticket();
        let plan = plan_status_update(&ticket, Some(TicketStatus::Resolved), None).unwrap();

        assert_eq!(plan.log.comment, "Status changed from open to resolved");
        assert!(plan.set_resolved_at);
    }

    #[test]
    fn first_transition_into_resolved_sets_timestamp_once() {
        let mut ticket = open_ticket();
        ticket.status = TicketStatus::InProgress;
        ticket.resolved_at = Some(Utc::now().into());

        // Already resolved once before; the timestamp must not be touched again.
        let plan = plan_status_update(&ticket, Some(TicketStatus::Resolved), None).unwrap();
        assert!(!plan.set_resolved_at);
    }

    #[test]
    fn first_transition_into_closed_sets_timestamp() {
        let mut ticket = open_ticket();
        ticket.status = TicketStatus::Resolved;

        let plan = plan_status_update(&ticket, Some(TicketStatus::Closed), None).unwrap();
        assert!(plan.set_closed_at);
        assert!(!plan.set_resolved_at);
    }

    #[test]
    fn same_status_with_comment_is_comment_only() {
        let ticket = open_ticket();
        let plan = plan_status_update(&ticket, Some(TicketStatus::Open), Some("still looking"))
            .unwrap();

        assert_eq!(plan.new_status, None);
        assert_eq!(plan.log.status_changed_from, "");
        assert_eq!(plan.log.status_changed_to, "");
        assert_eq!(plan.log.comment, "still looking");
    }

    #[test]
    fn nothing_supplied_is_a_noop() {
        let ticket = open_ticket();
        assert!(plan_status_update(&ticket, None, None).is_none());
        assert!(plan_status_update(&ticket, Some(TicketStatus::Open), None).is_none());
        assert!(plan_status_update(&ticket, None, Some("   ")).is_none());
    }
}
