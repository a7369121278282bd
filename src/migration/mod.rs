pub use sea_orm_migration::prelude::*;

mod m20250601_000001_create_team_table;
mod m20250601_000002_create_user_table;
mod m20250601_000003_create_region_table;
mod m20250601_000004_create_site_table;
mod m20250601_000005_create_alarm_table;
mod m20250601_000006_create_alarm_history_table;
mod m20250601_000007_create_ticket_table;
mod m20250601_000008_create_ticket_update_table;
mod m20250601_000009_create_ticket_attachment_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250601_000001_create_team_table::Migration),
            Box::new(m20250601_000002_create_user_table::Migration),
            Box::new(m20250601_000003_create_region_table::Migration),
            Box::new(m20250601_000004_create_site_table::Migration),
            Box::new(m20250601_000005_create_alarm_table::Migration),
            Box::new(m20250601_000006_create_alarm_history_table::Migration),
            Box::new(m20250601_000007_create_ticket_table::Migration),
            Box::new(m20250601_000008_create_ticket_update_table::Migration),
            Box::new(m20250601_000009_create_ticket_attachment_table::Migration),
        ]
    }
}
