//! Request and response payloads

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Put or call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OptionType {
    #[serde(rename = "P")]
    Put,
    #[serde(rename = "C")]
    Call,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Assigned {
    Yes,
    #[default]
    No,
}

/// Writable fields of a wheel position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PositionInput {
    pub open_date: NaiveDate,
    pub stock: String,
    #[serde(rename = "type")]
    pub option_type: OptionType,
    pub expiration: NaiveDate,
    pub num_contracts: u32,
    pub strike: f64,
    pub premium: f64,
    #[serde(default)]
    pub open_fees: f64,
    #[serde(default)]
    pub close_date: Option<NaiveDate>,
    #[serde(default)]
    pub assigned: Assigned,
    #[serde(default)]
    pub premium_paid_to_close: Option<f64>,
    #[serde(default)]
    pub close_fees: Option<f64>,
    #[serde(default)]
    pub entry_price: Option<f64>,
    /// Previous position in the same wheel cycle
    #[serde(default)]
    pub related_to: Option<i64>,
    #[serde(default)]
    pub wheel_cycle_name: String,
    #[serde(default)]
    pub notes: String,
}

/// Bull put or bear call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpreadType {
    #[serde(rename = "BPS")]
    BullPut,
    #[serde(rename = "BCS")]
    BearCall,
}

/// Writable fields of a credit spread
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditSpreadInput {
    pub open_date: NaiveDate,
    pub stock: String,
    pub expiration: NaiveDate,
    #[serde(rename = "type")]
    pub spread_type: SpreadType,
    pub long_strike: f64,
    pub long_premium: f64,
    pub short_strike: f64,
    pub short_premium: f64,
    pub num_contracts: u32,
    #[serde(default)]
    pub open_fees: f64,
    #[serde(default)]
    pub close_date: Option<NaiveDate>,
    #[serde(default)]
    pub long_close_premium: Option<f64>,
    #[serde(default)]
    pub short_close_premium: Option<f64>,
    #[serde(default)]
    pub close_fees: Option<f64>,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackType {
    Bug,
    Feature,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    New,
    InProgress,
    Completed,
    Closed,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedbackInput {
    #[serde(rename = "type")]
    pub feedback_type: FeedbackType,
    pub subject: String,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct FeedbackStatusUpdate {
    pub status: FeedbackStatus,
}

/// The signed-in user as reported by `/auth/user/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub is_staff: bool,
    #[serde(default)]
    pub is_superuser: bool,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password_confirm: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisteredUser {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterResponse {
    #[serde(default)]
    pub message: String,
    pub user: RegisteredUser,
    pub access: String,
    pub refresh: String,
}
