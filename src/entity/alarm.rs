use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "alarms")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub site_id: i32,
    pub alarm_type: AlarmType,
    pub severity: Severity,
    pub status: AlarmStatus,
    pub title: String,
    #[sea_orm(column_type = "Text")]
    pub description: String,
    pub acknowledged_by: Option<i32>,
    pub acknowledged_at: Option<DateTimeWithTimeZone>,
    pub resolved_by: Option<i32>,
    pub resolved_at: Option<DateTimeWithTimeZone>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, Copy, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "alarm_type")]
#[serde(rename_all = "lowercase")]
pub enum AlarmType {
    #[sea_orm(string_value = "power")]
    Power,

    #[sea_orm(string_value = "ip")]
    Ip,

    #[sea_orm(string_value = "transmission")]
    Transmission,

    #[sea_orm(string_value = "bss")]
    Bss,

    #[sea_orm(string_value = "hardware")]
    Hardware,

    #[sea_orm(string_value = "security")]
    Security,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, Copy, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "severity")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[sea_orm(string_value = "critical")]
    Critical,

    #[sea_orm(string_value = "major")]
    Major,

    #[sea_orm(string_value = "minor")]
    Minor,

    #[sea_orm(string_value = "warning")]
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, EnumIter, DeriveActiveEnum, Copy, ToSchema)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "alarm_status")]
#[serde(rename_all = "lowercase")]
pub enum AlarmStatus {
    #[sea_orm(string_value = "active")]
    Active,

    #[sea_orm(string_value = "acknowledged")]
    Acknowledged,

    #[sea_orm(string_value = "resolved")]
    Resolved,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::site::Entity",
        from = "Column::SiteId",
        to = "super::site::Column::Id"
    )]
    Site,

    #[sea_orm(has_many = "super::alarm_history::Entity")]
    History,

    #[sea_orm(has_one = "super::ticket::Entity")]
    Ticket,
}

impl Related<super::site::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Site.def()
    }
}

impl Related<super::alarm_history::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::History.def()
    }
}

impl Related<super::ticket::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Ticket.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
