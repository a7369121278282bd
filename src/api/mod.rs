mod alarm;
mod auth;
mod health_check;
mod site;
mod ticket;

pub use alarm::{
    acknowledge_alarm, create_alarm, dashboard_stats, delete_alarm, get_alarm, list_alarms,
    resolve_alarm, update_alarm,
};
pub use auth::{create_user, get_profile, list_teams, list_users, login, logout};
pub use health_check::*;
pub use site::{create_site, delete_site, get_site, list_regions, list_sites, update_site};
pub use ticket::{
    add_ticket_attachment, add_ticket_comment, assign_ticket, create_ticket, delete_ticket,
    get_ticket, list_tickets, ticket_stats, update_ticket,
};
