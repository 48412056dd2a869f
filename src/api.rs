//! API Module
//!
//! Typed access to the WheelTracker endpoints. Every call goes through the
//! [`Gateway`], so it carries the session token and the shared error contract.

use std::sync::Arc;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::info;

use crate::auth::AuthStore;
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::gateway::{build_http_client, Gateway, Request};
use crate::models::{
    CreditSpreadInput, CurrentUser, FeedbackInput, FeedbackStatus, FeedbackStatusUpdate, PositionInput,
    RegisterRequest, RegisterResponse,
};
use crate::navigation::Navigator;
use crate::storage::TokenStorage;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// API client for the WheelTracker backend
pub struct ApiClient {
    gateway: Gateway,
}

impl ApiClient {
    /// Create a client with an unauthenticated session.
    ///
    /// Call `auth().init()` to restore tokens kept in `storage`.
    pub fn new(
        config: ClientConfig,
        storage: Arc<dyn TokenStorage>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let client = build_http_client()?;
        let auth = Arc::new(AuthStore::new(config.clone(), client.clone(), storage, navigator));
        Ok(Self::with_gateway(Gateway::new(config, client, auth)))
    }

    pub fn with_gateway(gateway: Gateway) -> Self {
        Self { gateway }
    }

    pub fn auth(&self) -> &Arc<AuthStore> {
        self.gateway.auth()
    }

    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    // Positions

    pub async fn get_positions(&self) -> Result<Value, ApiError> {
        self.gateway.send(Request::get("/positions/")).await
    }

    pub async fn get_position(&self, id: i64) -> Result<Value, ApiError> {
        self.gateway.send(Request::get(format!("/positions/{}/", id))).await
    }

    pub async fn create_position(&self, position: &PositionInput) -> Result<Value, ApiError> {
        info!("Creating position: {} {:?}", position.stock, position.option_type);
        self.gateway
            .send(Request::post("/positions/").json(position)?)
            .await
    }

    pub async fn update_position(&self, id: i64, position: &PositionInput) -> Result<Value, ApiError> {
        self.gateway
            .send(Request::put(format!("/positions/{}/", id)).json(position)?)
            .await
    }

    /// Resolves to `{"success": true}` on 204
    pub async fn delete_position(&self, id: i64) -> Result<Value, ApiError> {
        info!("Deleting position {}", id);
        self.gateway.send(Request::delete(format!("/positions/{}/", id))).await
    }

    pub async fn get_summary(&self) -> Result<Value, ApiError> {
        self.gateway.send(Request::get("/positions/summary/")).await
    }

    /// Positions for one ticker, or per-ticker counts when `stock` is `None`
    pub async fn get_by_stock(&self, stock: Option<&str>) -> Result<Value, ApiError> {
        self.gateway.send(by_stock("/positions/by_stock/", stock)).await
    }

    pub async fn fetch_current_price(&self, id: i64) -> Result<Value, ApiError> {
        self.gateway
            .send(Request::post(format!("/positions/{}/fetch_current_price/", id)))
            .await
    }

    pub async fn fetch_all_current_prices(&self) -> Result<Value, ApiError> {
        self.gateway
            .send(Request::post("/positions/fetch_all_current_prices/"))
            .await
    }

    /// Realized ROI over closed positions opened within the optional range
    pub async fn get_roi_summary(
        &self,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Value, ApiError> {
        let mut request = Request::get("/positions/roi_summary/");
        if let Some(start) = start_date {
            request = request.query("start_date", start.format(DATE_FORMAT).to_string());
        }
        if let Some(end) = end_date {
            request = request.query("end_date", end.format(DATE_FORMAT).to_string());
        }
        self.gateway.send(request).await
    }

    // Credit spreads

    pub async fn get_credit_spreads(&self) -> Result<Value, ApiError> {
        self.gateway.send(Request::get("/credit-spreads/")).await
    }

    pub async fn get_credit_spread(&self, id: i64) -> Result<Value, ApiError> {
        self.gateway
            .send(Request::get(format!("/credit-spreads/{}/", id)))
            .await
    }

    pub async fn create_credit_spread(&self, spread: &CreditSpreadInput) -> Result<Value, ApiError> {
        info!("Creating credit spread: {} {:?}", spread.stock, spread.spread_type);
        self.gateway
            .send(Request::post("/credit-spreads/").json(spread)?)
            .await
    }

    pub async fn update_credit_spread(&self, id: i64, spread: &CreditSpreadInput) -> Result<Value, ApiError> {
        self.gateway
            .send(Request::put(format!("/credit-spreads/{}/", id)).json(spread)?)
            .await
    }

    pub async fn delete_credit_spread(&self, id: i64) -> Result<Value, ApiError> {
        info!("Deleting credit spread {}", id);
        self.gateway
            .send(Request::delete(format!("/credit-spreads/{}/", id)))
            .await
    }

    pub async fn get_credit_spread_summary(&self) -> Result<Value, ApiError> {
        self.gateway.send(Request::get("/credit-spreads/summary/")).await
    }

    pub async fn get_credit_spreads_by_stock(&self, stock: Option<&str>) -> Result<Value, ApiError> {
        self.gateway.send(by_stock("/credit-spreads/by_stock/", stock)).await
    }

    // Feedback

    pub async fn get_feedback(&self) -> Result<Value, ApiError> {
        self.gateway.send(Request::get("/feedback/")).await
    }

    pub async fn get_feedback_item(&self, id: i64) -> Result<Value, ApiError> {
        self.gateway.send(Request::get(format!("/feedback/{}/", id))).await
    }

    pub async fn submit_feedback(&self, feedback: &FeedbackInput) -> Result<Value, ApiError> {
        info!("Submitting {:?} feedback", feedback.feedback_type);
        self.gateway
            .send(Request::post("/feedback/").json(feedback)?)
            .await
    }

    /// Admin only
    pub async fn update_feedback_status(&self, id: i64, status: FeedbackStatus) -> Result<Value, ApiError> {
        self.gateway
            .send(Request::patch(format!("/feedback/{}/", id)).json(&FeedbackStatusUpdate { status })?)
            .await
    }

    // Accounts

    pub async fn current_user(&self) -> Result<CurrentUser, ApiError> {
        self.gateway.send_json(Request::get("/auth/user/")).await
    }

    /// Create an account and start a session with the issued tokens
    pub async fn register(&self, request: &RegisterRequest) -> Result<RegisterResponse, ApiError> {
        let response: RegisterResponse = self
            .gateway
            .send_json(Request::post("/auth/register/").json(request)?)
            .await?;

        self.auth().login(&response.access, &response.refresh);
        info!("Registered user: {}", response.user.username);
        Ok(response)
    }
}

fn by_stock(path: &str, stock: Option<&str>) -> Request {
    let request = Request::get(path);
    match stock.map(str::trim).filter(|s| !s.is_empty()) {
        Some(stock) => request.query("stock", stock),
        None => request,
    }
}
