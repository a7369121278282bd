pub mod alarm;
pub mod auth;
pub mod global_error;
pub mod site;
pub mod stats;
pub mod ticket;
