//! Request DTOs for pricing API endpoints.

use std::borrow::Cow;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use validator::{Validate, ValidationError};

use super::calculators::PreviewScenario;
use super::rules::{
    AdjustmentType, Bounds, DayOfWeek, PricingContext, PricingRule, RouteScope, RuleType,
};

fn default_priority() -> i32 {
    50
}

/// Decimal places stored for `adjustment_value`
const ADJUSTMENT_SCALE: u32 = 4;
/// Decimal places stored for distances and accepted for base rates
const AMOUNT_SCALE: u32 = 2;

/// True when `value` fits a `NUMERIC(12, scale)` column without rounding
fn fits_numeric(value: Decimal, scale: u32) -> bool {
    let limit = Decimal::from(10_i64.pow(12 - scale));
    value.abs() < limit && value.normalize().scale() <= scale
}

fn valid_base_rate(rate: Decimal) -> bool {
    !rate.is_sign_negative() && fits_numeric(rate, AMOUNT_SCALE)
}

/// Rule payload for create, update and preview. Update replaces every field.
#[derive(Debug, Clone, Deserialize, Validate)]
#[validate(schema(function = "validate_rule_fields"))]
pub struct RuleFields {
    #[validate(length(min = 1, max = 255, message = "name must be 1-255 characters"))]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub rule_type: RuleType,
    pub adjustment_type: AdjustmentType,
    pub adjustment_value: Decimal,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub end_date: Option<NaiveDate>,
    #[serde(default)]
    #[validate(range(min = 1, message = "min_passengers must be at least 1"))]
    pub min_passengers: Option<i32>,
    #[serde(default)]
    #[validate(range(min = 1, message = "max_passengers must be at least 1"))]
    pub max_passengers: Option<i32>,
    #[serde(default)]
    pub min_distance: Option<Decimal>,
    #[serde(default)]
    pub max_distance: Option<Decimal>,
    #[serde(default)]
    pub days_of_week: Vec<DayOfWeek>,
    #[serde(default)]
    pub min_advance_hours: Option<i32>,
    #[serde(default)]
    pub max_advance_hours: Option<i32>,
    #[serde(default)]
    pub applicable_routes: Vec<RouteScope>,
    #[serde(default = "default_priority")]
    #[validate(range(min = 1, max = 100, message = "priority must be between 1 and 100"))]
    pub priority: i32,
    /// Left unchanged on update when absent; new rules default to active
    #[serde(default)]
    pub is_active: Option<bool>,
}

impl RuleFields {
    /// Unsaved rule carrying these fields
    pub fn to_rule(&self) -> PricingRule {
        PricingRule {
            description: self.description.clone(),
            travel_dates: Bounds::new(self.start_date, self.end_date),
            passengers: Bounds::new(self.min_passengers, self.max_passengers),
            distance: Bounds::new(self.min_distance, self.max_distance),
            days_of_week: self.days_of_week.clone(),
            advance_hours: Bounds::new(
                self.min_advance_hours.map(i64::from),
                self.max_advance_hours.map(i64::from),
            ),
            applicable_routes: self.applicable_routes.clone(),
            priority: self.priority,
            is_active: self.is_active.unwrap_or(true),
            ..PricingRule::new(
                self.name.clone(),
                self.rule_type,
                self.adjustment_type,
                self.adjustment_value,
            )
        }
    }
}

fn invalid(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn validate_rule_fields(fields: &RuleFields) -> Result<(), ValidationError> {
    if !fits_numeric(fields.adjustment_value, ADJUSTMENT_SCALE) {
        return Err(invalid(
            "adjustment_value",
            "adjustment_value must be below 100000000 in magnitude with at most 4 decimal places",
        ));
    }
    if !Bounds::new(fields.start_date, fields.end_date).is_ordered() {
        return Err(invalid("date_range", "end_date must not be before start_date"));
    }
    if !Bounds::new(fields.min_passengers, fields.max_passengers).is_ordered() {
        return Err(invalid(
            "passenger_range",
            "max_passengers must be greater than or equal to min_passengers",
        ));
    }
    let distance = Bounds::new(fields.min_distance, fields.max_distance);
    if [distance.min, distance.max]
        .into_iter()
        .flatten()
        .any(|d| d.is_sign_negative())
    {
        return Err(invalid("distance_range", "distances must not be negative"));
    }
    if [distance.min, distance.max]
        .into_iter()
        .flatten()
        .any(|d| !fits_numeric(d, AMOUNT_SCALE))
    {
        return Err(invalid(
            "distance_range",
            "distances must be below 10000000000 with at most 2 decimal places",
        ));
    }
    if !distance.is_ordered() {
        return Err(invalid(
            "distance_range",
            "max_distance must be greater than or equal to min_distance",
        ));
    }
    if !Bounds::new(fields.min_advance_hours, fields.max_advance_hours).is_ordered() {
        return Err(invalid(
            "advance_range",
            "max_advance_hours must be greater than or equal to min_advance_hours",
        ));
    }
    if fields
        .applicable_routes
        .iter()
        .any(|route| route.from.trim().is_empty() || route.to.trim().is_empty())
    {
        return Err(invalid("routes", "every route needs both from and to"));
    }
    if fields.adjustment_type == AdjustmentType::Multiplier && fields.adjustment_value <= Decimal::ZERO {
        return Err(invalid("adjustment_value", "multiplier must be greater than zero"));
    }
    Ok(())
}

/// Request to preview an unsaved rule
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_preview"))]
pub struct PreviewRuleRequest {
    #[validate(nested)]
    pub rule: RuleFields,
    #[validate(length(min = 1, max = 50, message = "between 1 and 50 scenarios are required"))]
    pub scenarios: Vec<PreviewScenario>,
    /// Falls back to the configured preview base rate
    #[serde(default)]
    pub base_rate: Option<Decimal>,
}

fn validate_preview(request: &PreviewRuleRequest) -> Result<(), ValidationError> {
    if request.base_rate.is_some_and(|rate| !valid_base_rate(rate)) {
        return Err(invalid("base_rate", BASE_RATE_MESSAGE));
    }
    for scenario in &request.scenarios {
        if scenario.base_rate.is_some_and(|rate| !valid_base_rate(rate)) {
            return Err(invalid("scenarios", BASE_RATE_MESSAGE));
        }
        if scenario.passenger_count < 1 {
            return Err(invalid("scenarios", "passenger_count must be at least 1"));
        }
        if scenario.route_from.is_empty() || scenario.route_to.is_empty() {
            return Err(invalid("scenarios", "route_from and route_to are required"));
        }
    }
    Ok(())
}

const BASE_RATE_MESSAGE: &str =
    "base_rate must be non-negative, below 10000000000, with at most 2 decimal places";

/// Request to price a booking against a service's active rules
#[derive(Debug, Deserialize, Validate)]
#[validate(schema(function = "validate_quote"))]
pub struct QuoteRequest {
    pub date: NaiveDate,
    #[validate(range(min = 1, message = "passenger_count must be at least 1"))]
    pub passenger_count: i32,
    #[validate(length(min = 1, message = "route_from is required"))]
    pub route_from: String,
    #[validate(length(min = 1, message = "route_to is required"))]
    pub route_to: String,
    #[serde(default)]
    pub distance: Option<Decimal>,
    pub base_rate: Decimal,
    /// Defaults to the time the request is handled
    #[serde(default)]
    pub booking_time: Option<DateTime<Utc>>,
}

fn validate_quote(request: &QuoteRequest) -> Result<(), ValidationError> {
    if !valid_base_rate(request.base_rate) {
        return Err(invalid("base_rate", BASE_RATE_MESSAGE));
    }
    Ok(())
}

impl QuoteRequest {
    pub fn into_context(self, now: DateTime<Utc>) -> (PricingContext, Decimal) {
        let context = PricingContext {
            date: self.date,
            passenger_count: self.passenger_count,
            route_from: self.route_from,
            route_to: self.route_to,
            booking_time: self.booking_time.unwrap_or(now),
            distance: self.distance,
        };
        (context, self.base_rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn fields(body: serde_json::Value) -> RuleFields {
        serde_json::from_value(body).unwrap()
    }

    fn minimal() -> serde_json::Value {
        json!({
            "name": "Weekend",
            "rule_type": "day_of_week",
            "adjustment_type": "percentage",
            "adjustment_value": "15",
            "days_of_week": ["saturday", "sunday"]
        })
    }

    #[test]
    fn test_minimal_rule_is_valid_with_defaults() {
        let fields = fields(minimal());
        assert!(fields.validate().is_ok());
        assert_eq!(fields.priority, 50);
        assert_eq!(fields.is_active, None);

        let rule = fields.to_rule();
        assert!(rule.is_active);
        assert_eq!(rule.adjustment_value, dec!(15));
        assert_eq!(rule.days_of_week, vec![DayOfWeek::Saturday, DayOfWeek::Sunday]);
        assert!(rule.id.is_none());
    }

    #[test]
    fn test_numeric_adjustment_value_is_accepted() {
        let mut body = minimal();
        body["adjustment_value"] = json!(-12.5);
        assert_eq!(fields(body).adjustment_value, dec!(-12.5));
    }

    #[test]
    fn test_unknown_enum_values_fail_to_deserialize() {
        let mut body = minimal();
        body["adjustment_type"] = json!("compound");
        assert!(serde_json::from_value::<RuleFields>(body).is_err());

        let mut body = minimal();
        body["days_of_week"] = json!(["funday"]);
        assert!(serde_json::from_value::<RuleFields>(body).is_err());
    }

    #[test]
    fn test_priority_out_of_range() {
        let mut body = minimal();
        body["priority"] = json!(101);
        assert!(fields(body).validate().is_err());

        let mut body = minimal();
        body["priority"] = json!(0);
        assert!(fields(body).validate().is_err());
    }

    #[test]
    fn test_empty_name_rejected() {
        let mut body = minimal();
        body["name"] = json!("");
        assert!(fields(body).validate().is_err());
    }

    #[test]
    fn test_inverted_bounds_rejected() {
        let cases = [
            json!({"min_passengers": 10, "max_passengers": 2}),
            json!({"min_distance": "500", "max_distance": "100"}),
            json!({"min_advance_hours": 48, "max_advance_hours": 24}),
            json!({"start_date": "2025-06-30", "end_date": "2025-06-01"}),
        ];
        for case in cases {
            let mut body = minimal();
            for (key, value) in case.as_object().unwrap() {
                body[key] = value.clone();
            }
            assert!(fields(body).validate().is_err(), "{case}");
        }
    }

    #[test]
    fn test_equal_bounds_accepted() {
        let mut body = minimal();
        body["min_passengers"] = json!(4);
        body["max_passengers"] = json!(4);
        body["start_date"] = json!("2025-06-01");
        body["end_date"] = json!("2025-06-01");
        assert!(fields(body).validate().is_ok());
    }

    #[test]
    fn test_negative_distance_rejected() {
        let mut body = minimal();
        body["min_distance"] = json!("-1");
        assert!(fields(body).validate().is_err());
    }

    #[test]
    fn test_blank_route_rejected() {
        let mut body = minimal();
        body["applicable_routes"] = json!([{"from": "RUH", "to": " "}]);
        assert!(fields(body).validate().is_err());
    }

    #[test]
    fn test_non_positive_multiplier_rejected() {
        let mut body = minimal();
        body["adjustment_type"] = json!("multiplier");
        body["adjustment_value"] = json!("0");
        assert!(fields(body.clone()).validate().is_err());

        body["adjustment_value"] = json!("0.8");
        assert!(fields(body).validate().is_ok());
    }

    #[test]
    fn test_adjustment_value_must_fit_storage() {
        let mut body = minimal();
        body["adjustment_value"] = json!("99999999.9999");
        assert!(fields(body.clone()).validate().is_ok());

        body["adjustment_value"] = json!("100000000");
        assert!(fields(body.clone()).validate().is_err());

        body["adjustment_value"] = json!("1.23456");
        assert!(fields(body.clone()).validate().is_err());

        // trailing zeros do not count as precision
        body["adjustment_value"] = json!("1.2300000");
        assert!(fields(body.clone()).validate().is_ok());

        body["adjustment_type"] = json!("multiplier");
        body["adjustment_value"] = json!("79228162514264337593543950335");
        assert!(fields(body).validate().is_err());
    }

    #[test]
    fn test_distances_must_fit_storage() {
        let mut body = minimal();
        body["min_distance"] = json!("12.345");
        assert!(fields(body.clone()).validate().is_err());

        body["min_distance"] = json!("12.34");
        body["max_distance"] = json!("10000000000");
        assert!(fields(body).validate().is_err());
    }

    #[test]
    fn test_preview_rejects_unusable_base_rates() {
        let scenario = json!({"route_from": "RUH", "route_to": "JED", "date": "2025-03-15", "passenger_count": 2});
        let cases = [
            json!({"base_rate": "-1"}),
            json!({"base_rate": "0.001"}),
            json!({"base_rate": "10000000000"}),
        ];
        for case in cases {
            let request: PreviewRuleRequest = serde_json::from_value(json!({
                "rule": minimal(),
                "scenarios": [scenario.clone()],
                "base_rate": case["base_rate"].clone()
            }))
            .unwrap();
            assert!(request.validate().is_err(), "{case}");
        }

        let mut sliver = scenario.clone();
        sliver["base_rate"] = json!("0.0000000000000000000000000001");
        let request: PreviewRuleRequest = serde_json::from_value(json!({
            "rule": minimal(),
            "scenarios": [sliver]
        }))
        .unwrap();
        assert!(request.validate().is_err());

        let mut free = scenario;
        free["base_rate"] = json!("0");
        let request: PreviewRuleRequest = serde_json::from_value(json!({
            "rule": minimal(),
            "scenarios": [free]
        }))
        .unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_preview_request_scenario_limit() {
        let scenario = json!({"route_from": "RUH", "route_to": "JED", "date": "2025-03-15", "passenger_count": 2});
        let request: PreviewRuleRequest = serde_json::from_value(json!({
            "rule": minimal(),
            "scenarios": vec![scenario; 51]
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_quote_request_base_rate_bounds() {
        let quote = |rate: &str| -> QuoteRequest {
            serde_json::from_value(json!({
                "date": "2025-03-15",
                "passenger_count": 2,
                "route_from": "RUH",
                "route_to": "JED",
                "base_rate": rate
            }))
            .unwrap()
        };
        assert!(quote("0").validate().is_ok());
        assert!(quote("9999999999.99").validate().is_ok());
        assert!(quote("-5").validate().is_err());
        assert!(quote("10.005").validate().is_err());
        assert!(quote("10000000000").validate().is_err());
    }

    #[test]
    fn test_preview_request_validation() {
        let request: PreviewRuleRequest = serde_json::from_value(json!({
            "rule": minimal(),
            "scenarios": [
                {"route_from": "RUH", "route_to": "JED", "date": "2025-03-15", "passenger_count": 2}
            ]
        }))
        .unwrap();
        assert!(request.validate().is_ok());
        assert!(request.base_rate.is_none());

        let request: PreviewRuleRequest = serde_json::from_value(json!({
            "rule": minimal(),
            "scenarios": [
                {"route_from": "RUH", "route_to": "JED", "date": "2025-03-15", "passenger_count": 0}
            ]
        }))
        .unwrap();
        assert!(request.validate().is_err());

        let request: PreviewRuleRequest = serde_json::from_value(json!({
            "rule": minimal(),
            "scenarios": []
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_quote_request_into_context() {
        let request: QuoteRequest = serde_json::from_value(json!({
            "date": "2025-03-15",
            "passenger_count": 3,
            "route_from": "RUH",
            "route_to": "JED",
            "base_rate": "250.00"
        }))
        .unwrap();
        assert!(request.validate().is_ok());

        let now = Utc::now();
        let (context, base_rate) = request.into_context(now);
        assert_eq!(context.booking_time, now);
        assert_eq!(context.distance, None);
        assert_eq!(base_rate, dec!(250));
    }

    #[test]
    fn test_quote_request_needs_passengers() {
        let request: QuoteRequest = serde_json::from_value(json!({
            "date": "2025-03-15",
            "passenger_count": 0,
            "route_from": "RUH",
            "route_to": "JED",
            "base_rate": 100
        }))
        .unwrap();
        assert!(request.validate().is_err());
    }
}
