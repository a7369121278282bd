pub mod alarm;
pub mod stats;
pub mod ticket;
