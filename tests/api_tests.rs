//! Endpoint surface tests against a mock backend

mod common;

use chrono::NaiveDate;
use common::{harness, signed_in};
use serde_json::json;
use wheeltracker_client::models::{
    Assigned, FeedbackInput, FeedbackStatus, FeedbackType, OptionType, PositionInput, RegisterRequest,
};
use wheeltracker_client::storage::{ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

fn sample_position() -> PositionInput {
    PositionInput {
        open_date: NaiveDate::from_ymd_opt(2025, 3, 3).unwrap(),
        stock: "TSLA".into(),
        option_type: OptionType::Put,
        expiration: NaiveDate::from_ymd_opt(2025, 3, 21).unwrap(),
        num_contracts: 1,
        strike: 250.0,
        premium: 4.2,
        open_fees: 0.65,
        close_date: None,
        assigned: Assigned::No,
        premium_paid_to_close: None,
        close_fees: None,
        entry_price: None,
        related_to: None,
        wheel_cycle_name: "TSLA Wheel #1".into(),
        notes: String::new(),
    }
}

#[tokio::test]
async fn test_get_positions_is_repeatable() {
    let h = signed_in("a", "r").await;
    let body = json!([{"id": 1, "stock": "TSLA", "strike": "250.000"}]);

    Mock::given(method("GET"))
        .and(path("/api/positions/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .expect(2)
        .mount(&h.server)
        .await;

    let first = h.api.get_positions().await.unwrap();
    let second = h.api.get_positions().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first, body);
}

#[tokio::test]
async fn test_position_crud_paths() {
    let h = signed_in("a", "r").await;
    let input = sample_position();

    Mock::given(method("POST"))
        .and(path("/api/positions/"))
        .and(body_partial_json(json!({"stock": "TSLA", "type": "P", "open_date": "2025-03-03"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 42, "stock": "TSLA"})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/positions/42/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/positions/42/"))
        .and(body_partial_json(json!({"wheel_cycle_name": "TSLA Wheel #1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 42, "notes": ""})))
        .expect(1)
        .mount(&h.server)
        .await;

    assert_eq!(h.api.create_position(&input).await.unwrap()["id"], 42);
    assert_eq!(h.api.get_position(42).await.unwrap()["id"], 42);
    assert_eq!(h.api.update_position(42, &input).await.unwrap()["id"], 42);
}

#[tokio::test]
async fn test_by_stock_with_and_without_filter() {
    let h = signed_in("a", "r").await;

    Mock::given(method("GET"))
        .and(path("/api/positions/by_stock/"))
        .and(query_param("stock", "AAPL"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 5, "stock": "AAPL"}])))
        .expect(1)
        .mount(&h.server)
        .await;

    let filtered = h.api.get_by_stock(Some("AAPL")).await.unwrap();
    assert_eq!(filtered[0]["stock"], "AAPL");

    h.server.reset().await;
    Mock::given(method("GET"))
        .and(path("/api/positions/by_stock/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"stock": "AAPL", "count": 3}])))
        .mount(&h.server)
        .await;

    let grouped = h.api.get_by_stock(None).await.unwrap();
    assert_eq!(grouped[0]["count"], 3);
    let requests = h.server.received_requests().await.unwrap();
    assert_eq!(requests.last().unwrap().url.query(), None);
}

#[tokio::test]
async fn test_roi_summary_sends_date_range() {
    let h = signed_in("a", "r").await;

    Mock::given(method("GET"))
        .and(path("/api/positions/roi_summary/"))
        .and(query_param("start_date", "2025-01-01"))
        .and(query_param("end_date", "2025-06-30"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "premium": "812.50", "collateral": "25000.00", "roi_percentage": "3.25", "position_count": 4,
            "start_date": "2025-01-01", "end_date": "2025-06-30"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let summary = h
        .api
        .get_roi_summary(NaiveDate::from_ymd_opt(2025, 1, 1), NaiveDate::from_ymd_opt(2025, 6, 30))
        .await
        .unwrap();
    assert_eq!(summary["position_count"], 4);
}

#[tokio::test]
async fn test_price_refresh_actions_use_post() {
    let h = signed_in("a", "r").await;

    Mock::given(method("POST"))
        .and(path("/api/positions/7/fetch_current_price/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"current_option_price": "1.15"})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/positions/fetch_all_current_prices/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"updated": 3, "failed": 0, "errors": []})))
        .expect(1)
        .mount(&h.server)
        .await;

    assert_eq!(h.api.fetch_current_price(7).await.unwrap()["current_option_price"], "1.15");
    assert_eq!(h.api.fetch_all_current_prices().await.unwrap()["updated"], 3);
}

#[tokio::test]
async fn test_credit_spread_family() {
    let h = signed_in("a", "r").await;

    Mock::given(method("GET"))
        .and(path("/api/credit-spreads/summary/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"total_spreads": 2})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/credit-spreads/by_stock/"))
        .and(query_param("stock", "SPY"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/credit-spreads/3/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&h.server)
        .await;

    assert_eq!(h.api.get_credit_spread_summary().await.unwrap()["total_spreads"], 2);
    assert_eq!(h.api.get_credit_spreads_by_stock(Some(" SPY ")).await.unwrap(), json!([]));
    assert_eq!(h.api.delete_credit_spread(3).await.unwrap(), json!({"success": true}));
}

#[tokio::test]
async fn test_feedback_submit_and_status() {
    let h = signed_in("a", "r").await;

    Mock::given(method("POST"))
        .and(path("/api/feedback/"))
        .and(body_json(json!({"type": "bug", "subject": "Summary blank", "description": "Totals show 0"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 11, "status": "new"})))
        .expect(1)
        .mount(&h.server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/api/feedback/11/"))
        .and(body_json(json!({"status": "completed"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 11, "status": "completed"})))
        .expect(1)
        .mount(&h.server)
        .await;

    let created = h
        .api
        .submit_feedback(&FeedbackInput {
            feedback_type: FeedbackType::Bug,
            subject: "Summary blank".into(),
            description: "Totals show 0".into(),
        })
        .await
        .unwrap();
    assert_eq!(created["status"], "new");

    let updated = h.api.update_feedback_status(11, FeedbackStatus::Completed).await.unwrap();
    assert_eq!(updated["status"], "completed");

    Mock::given(method("GET"))
        .and(path("/api/feedback/11/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": 11, "status": "completed"})))
        .expect(1)
        .mount(&h.server)
        .await;
    assert_eq!(h.api.get_feedback_item(11).await.unwrap()["id"], 11);
}

#[tokio::test]
async fn test_current_user_is_typed() {
    let h = signed_in("a", "r").await;

    Mock::given(method("GET"))
        .and(path("/api/auth/user/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": 1, "username": "admin", "email": "admin@example.com", "is_staff": true, "is_superuser": false
        })))
        .mount(&h.server)
        .await;

    let user = h.api.current_user().await.unwrap();
    assert_eq!(user.username, "admin");
    assert!(user.is_admin());
}

#[tokio::test]
async fn test_register_starts_session() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register/"))
        .and(body_partial_json(json!({"username": "dana", "password_confirm": "hunter22"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "User created successfully",
            "user": {"id": 8, "username": "dana", "email": ""},
            "access": "acc-8",
            "refresh": "ref-8"
        })))
        .expect(1)
        .mount(&h.server)
        .await;

    let response = h
        .api
        .register(&RegisterRequest {
            username: "dana".into(),
            email: String::new(),
            password: "hunter22".into(),
            password_confirm: "hunter22".into(),
        })
        .await
        .unwrap();

    assert_eq!(response.user.id, 8);
    assert!(h.api.auth().is_authenticated());
    assert_eq!(h.stored(ACCESS_TOKEN_KEY).as_deref(), Some("acc-8"));
    assert_eq!(h.stored(REFRESH_TOKEN_KEY).as_deref(), Some("ref-8"));
}

#[tokio::test]
async fn test_register_validation_error_keeps_session_empty() {
    let h = harness().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/register/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"error": "Passwords do not match"})))
        .mount(&h.server)
        .await;

    let err = h
        .api
        .register(&RegisterRequest {
            username: "dana".into(),
            email: String::new(),
            password: "hunter22".into(),
            password_confirm: "hunter23".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Passwords do not match");
    assert!(!h.api.auth().is_authenticated());
}
