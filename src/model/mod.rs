pub mod attendance;
pub mod employee;
pub mod holiday;
pub mod role;
pub mod schedule;
pub mod user;
