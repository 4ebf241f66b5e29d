pub mod aggregate;
pub mod hours;
pub mod schedule;
pub mod validator;
