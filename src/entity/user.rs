use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    #[sea_orm(unique)]
    pub username: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password: String,
    pub role: Role,
    pub phone: Option<String>,
    pub team_id: Option<i32>,
    pub is_active: bool,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, Copy, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "role")]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[sea_orm(string_value = "admin")]
    Admin,

    #[sea_orm(string_value = "operator")]
    Operator,

    #[sea_orm(string_value = "technician")]
    Technician,
}

impl Role {
    /// Site/region/user management. Deletes are further restricted to admins
    /// in the handlers.
    pub fn can_manage_inventory(self) -> bool {
        matches!(self, Role::Admin | Role::Operator)
    }

    /// Raising alarms and escalating them into tickets.
    pub fn can_raise_work(self) -> bool {
        matches!(self, Role::Admin | Role::Operator)
    }

    /// Technicians are scoped to their own team's tickets; everyone else
    /// sees the full queue.
    pub fn sees_all_tickets(self) -> bool {
        matches!(self, Role::Admin | Role::Operator)
    }

    pub fn is_admin(self) -> bool {
        matches!(self, Role::Admin)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::team::Entity",
        from = "Column::TeamId",
        to = "super::team::Column::Id"
    )]
    Team,

    #[sea_orm(has_many = "super::ticket::Entity")]
    AssignedTickets,
}

impl Related<super::team::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Team.def()
    }
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::AssignedTickets.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
