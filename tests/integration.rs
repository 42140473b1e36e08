//! Integration tests for the withholding engine.
//!
//! This test suite covers:
//! - Weekly and biweekly pay in the second provincial and federal brackets
//! - Low income where both income taxes fall to zero
//! - Authorized deductions granted mid-year and in the final period
//! - Contribution ceilings reached over a full year of pay periods
//! - HTTP envelope and error cases

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use tower::ServiceExt;

use withholding_engine::api::{create_router, AppState};
use withholding_engine::calculation::calculate_withholding;
use withholding_engine::config::{ConfigLoader, TaxYearConfig};
use withholding_engine::models::{PayPeriodContext, WithholdingRequest, YearToDate};

// =============================================================================
// Test Helpers
// =============================================================================

fn load_config() -> TaxYearConfig {
    ConfigLoader::load("./config/qc-2020")
        .expect("Failed to load config")
        .config()
        .clone()
}

fn create_router_for_test() -> Router {
    let config = ConfigLoader::load("./config/qc-2020").expect("Failed to load config");
    create_router(AppState::new(config))
}

fn decimal(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

fn create_request(pay_periods: u32, gross: &str, remaining: u32) -> WithholdingRequest {
    WithholdingRequest::new(PayPeriodContext {
        pay_periods_per_year: pay_periods,
        gross_remuneration: decimal(gross),
        remaining_periods: remaining,
        carry_forward_authorized_annual_deduction: Decimal::ZERO,
        authorized_reduction_after_first_period: Decimal::ZERO,
        retirement_plan_contributions: Decimal::ZERO,
    })
}

async fn post_calculate(router: Router, body: Value) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/calculate")
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();

    (status, json)
}

fn assert_amount(result: &Value, field: &str, expected: &str) {
    let actual = result[field]
        .as_str()
        .unwrap_or_else(|| panic!("{} missing from {}", field, result));
    assert_eq!(
        decimal(actual),
        decimal(expected),
        "Expected {} {}, got {}",
        field,
        expected,
        actual
    );
}

// =============================================================================
// Pipeline Scenarios
// =============================================================================

#[test]
fn test_weekly_second_bracket() {
    let result = calculate_withholding(&create_request(52, "1174.65", 52), &load_config()).unwrap();

    assert_eq!(result.provincial_income_tax, decimal("142.72"));
    assert_eq!(result.federal_income_tax, decimal("113.48"));
    assert_eq!(result.pension_contribution, decimal("63.12"));
    assert_eq!(result.parental_insurance_contribution, decimal("5.80"));
    assert_eq!(result.employment_insurance_contribution, decimal("14.10"));
    assert_eq!(result.net_pay, decimal("835.43"));
}

#[test]
fn test_biweekly_second_bracket() {
    let result = calculate_withholding(&create_request(26, "2000", 26), &load_config()).unwrap();

    // I = 26 x 2000 - 1190 = 50810
    assert_eq!(result.annual_taxable_income.round_dp(2), decimal("50810"));
    assert_eq!(result.provincial_income_tax, decimal("215.58"));
    assert_eq!(result.pension_contribution, decimal("106.33"));
    assert_eq!(result.parental_insurance_contribution, decimal("9.88"));
    assert_eq!(result.employment_insurance_contribution, decimal("24.00"));
    assert_eq!(result.federal_taxable_income, decimal("52000"));
    assert_eq!(result.federal_income_tax, decimal("169.35"));
    assert_eq!(result.net_pay, decimal("1474.86"));
}

#[test]
fn test_low_income_pays_contributions_only() {
    let result = calculate_withholding(&create_request(52, "200", 52), &load_config()).unwrap();

    assert!(result.provincial_income_tax.is_zero());
    assert!(result.federal_income_tax.is_zero());
    assert_eq!(result.pension_contribution, decimal("7.56"));
    assert_eq!(result.parental_insurance_contribution, decimal("0.99"));
    assert_eq!(result.employment_insurance_contribution, decimal("2.40"));
    assert_eq!(result.net_pay, decimal("189.05"));
}

#[test]
fn test_carry_forward_deduction_spread_over_remaining_periods() {
    let mut request = create_request(52, "1174.65", 4);
    request.period.carry_forward_authorized_annual_deduction = decimal("100");

    let result = calculate_withholding(&request, &load_config()).unwrap();

    // I = 59891.80 - 52 x 100 / 4
    assert_eq!(result.annual_taxable_income.round_dp(2), decimal("58591.80"));
    assert_eq!(result.provincial_income_tax, decimal("137.72"));
}

#[test]
fn test_final_period_ignores_carry_forward() {
    let mut request = create_request(52, "1174.65", 0);
    request.period.carry_forward_authorized_annual_deduction = decimal("100");

    let result = calculate_withholding(&request, &load_config()).unwrap();

    assert_eq!(result.provincial_income_tax, decimal("142.72"));
}

#[test]
fn test_full_year_contributions_stop_at_ceilings() {
    let config = load_config();
    let mut year_to_date = YearToDate::default();
    let mut totals = YearToDate::default();

    for _ in 0..52 {
        let mut request = create_request(52, "5000", 52);
        request.year_to_date = year_to_date.clone();

        let result = calculate_withholding(&request, &config).unwrap();
        totals.pension += result.pension_contribution;
        totals.parental_insurance += result.parental_insurance_contribution;
        totals.employment_insurance += result.employment_insurance_contribution;
        year_to_date = result.remitted_to_date;
    }

    assert_eq!(totals.pension, decimal("3146.40"));
    assert_eq!(totals.parental_insurance, decimal("387.79"));
    assert_eq!(totals.employment_insurance, decimal("650.40"));
    assert_eq!(year_to_date, totals);
}

#[test]
fn test_identical_inputs_give_identical_results() {
    let config = load_config();
    let mut request = create_request(26, "2000", 13);
    request.year_to_date.pension = decimal("1200");

    let first = calculate_withholding(&request, &config).unwrap();
    let second = calculate_withholding(&request, &config).unwrap();

    assert_eq!(first, second);
}

// =============================================================================
// HTTP API
// =============================================================================

#[tokio::test]
async fn test_http_weekly_calculation_envelope() {
    let body = json!({
        "employee_id": "emp_001",
        "tax_year": 2020,
        "period": {
            "pay_periods_per_year": 52,
            "gross_remuneration": "1174.65",
            "remaining_periods": 52
        }
    });

    let (status, response) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(response["tax_year"], 2020);
    assert_eq!(response["employee_id"], "emp_001");
    assert!(response["calculation_id"].is_string());
    assert!(response["calculated_at"].is_string());

    let result = &response["result"];
    assert_amount(result, "provincial_income_tax", "142.72");
    assert_amount(result, "federal_income_tax", "113.48");
    assert_amount(result, "pension_contribution", "63.12");
    assert_amount(result, "parental_insurance_contribution", "5.80");
    assert_amount(result, "employment_insurance_contribution", "14.10");
    assert_amount(result, "net_pay", "835.43");
    assert_eq!(result["audit_trace"]["steps"].as_array().unwrap().len(), 15);
}

#[tokio::test]
async fn test_http_year_to_date_and_credits() {
    let body = json!({
        "period": {
            "pay_periods_per_year": 52,
            "gross_remuneration": "1174.65",
            "remaining_periods": 30
        },
        "year_to_date": {
            "pension": "3146.40"
        },
        "provincial": {
            "personal_credit_amount": "15532"
        },
        "federal_credits": {
            "total_claim_amount": "13229"
        }
    });

    let (status, response) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::OK);
    let result = &response["result"];
    assert_amount(result, "pension_contribution", "0");
    assert_amount(&result["remitted_to_date"], "pension", "3146.40");
    assert_amount(result, "provincial_income_tax", "142.72");
}

#[tokio::test]
async fn test_error_malformed_json() {
    let response = create_router_for_test()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/calculate")
                .header("Content-Type", "application/json")
                .body(Body::from("{\"period\": "))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json: Value = serde_json::from_slice(&body_bytes).unwrap();
    assert_eq!(json["code"], "MALFORMED_JSON");
}

#[tokio::test]
async fn test_error_missing_period() {
    let (status, response) =
        post_calculate(create_router_for_test(), json!({"tax_year": 2020})).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_error_negative_remuneration() {
    let body = json!({
        "period": {
            "pay_periods_per_year": 52,
            "gross_remuneration": "-1",
            "remaining_periods": 52
        }
    });

    let (status, response) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_error_zero_pay_periods() {
    let body = json!({
        "period": {
            "pay_periods_per_year": 0,
            "gross_remuneration": "1000",
            "remaining_periods": 0
        }
    });

    let (status, response) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "INVALID_INPUT");
}

#[tokio::test]
async fn test_error_tax_year_mismatch() {
    let body = json!({
        "tax_year": 2019,
        "period": {
            "pay_periods_per_year": 52,
            "gross_remuneration": "1174.65",
            "remaining_periods": 52
        }
    });

    let (status, response) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "TAX_YEAR_MISMATCH");
}

#[tokio::test]
async fn test_error_negative_annual_income() {
    let body = json!({
        "period": {
            "pay_periods_per_year": 52,
            "gross_remuneration": "100",
            "remaining_periods": 52,
            "carry_forward_authorized_annual_deduction": "10000"
        }
    });

    let (status, response) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(response["code"], "BRACKET_OUT_OF_RANGE");
}

#[tokio::test]
async fn test_error_remuneration_above_maximum() {
    let body = json!({
        "period": {
            "pay_periods_per_year": 52,
            "gross_remuneration": "10000000000000000000000000000",
            "remaining_periods": 52
        }
    });

    let (status, response) = post_calculate(create_router_for_test(), body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(response["code"], "INVALID_INPUT");
}
