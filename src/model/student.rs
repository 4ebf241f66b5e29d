use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, sqlx::FromRow)]
pub struct Student {
    pub student_id: u64,
    pub user_id: u64,
    pub sr_code: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    /// Target total of valid OJT hours; completion is reached at this mark.
    pub required_hours: Decimal,
    pub status: Option<String>,
}
