pub mod accomplishment;
pub mod application;
pub mod role;
pub mod student;
pub mod supervisor;
pub mod time_log;
