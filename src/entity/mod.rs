pub mod alarm;
pub mod alarm_history;
pub mod region;
pub mod site;
pub mod team;
pub mod ticket;
pub mod ticket_attachment;
pub mod ticket_update;
pub mod user;
