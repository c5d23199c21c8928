//! Response DTOs for pricing API endpoints.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::calculators::{PreviewResult, RuleApplication};
use super::rules::{AdjustmentType, DayOfWeek, PricingRule, RouteScope, RuleType};
use super::templates::RuleTemplate;

/// A stored rule as returned to providers
#[derive(Debug, Clone, Serialize)]
pub struct RuleResponse {
    pub id: Option<Uuid>,
    pub transport_service_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub rule_type: RuleType,
    pub adjustment_type: AdjustmentType,
    #[serde(with = "rust_decimal::serde::str")]
    pub adjustment_value: Decimal,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub min_passengers: Option<i32>,
    pub max_passengers: Option<i32>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub min_distance: Option<Decimal>,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub max_distance: Option<Decimal>,
    pub days_of_week: Vec<DayOfWeek>,
    pub min_advance_hours: Option<i64>,
    pub max_advance_hours: Option<i64>,
    pub applicable_routes: Vec<RouteScope>,
    pub priority: i32,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl From<&PricingRule> for RuleResponse {
    fn from(rule: &PricingRule) -> Self {
        Self {
            id: rule.id,
            transport_service_id: rule.transport_service_id,
            name: rule.name.clone(),
            description: rule.description.clone(),
            rule_type: rule.rule_type,
            adjustment_type: rule.adjustment_type,
            adjustment_value: rule.adjustment_value,
            start_date: rule.travel_dates.min,
            end_date: rule.travel_dates.max,
            min_passengers: rule.passengers.min,
            max_passengers: rule.passengers.max,
            min_distance: rule.distance.min,
            max_distance: rule.distance.max,
            days_of_week: rule.days_of_week.clone(),
            min_advance_hours: rule.advance_hours.min,
            max_advance_hours: rule.advance_hours.max,
            applicable_routes: rule.applicable_routes.clone(),
            priority: rule.priority,
            is_active: rule.is_active,
            created_at: rule.created_at,
        }
    }
}

/// `{success, rule}`
#[derive(Debug, Serialize)]
pub struct RuleEnvelope {
    pub success: bool,
    pub rule: RuleResponse,
}

impl RuleEnvelope {
    pub fn new(rule: &PricingRule) -> Self {
        Self {
            success: true,
            rule: rule.into(),
        }
    }
}

/// `{success, rules}`
#[derive(Debug, Serialize)]
pub struct RulesEnvelope {
    pub success: bool,
    pub rules: Vec<RuleResponse>,
}

impl RulesEnvelope {
    pub fn new(rules: &[PricingRule]) -> Self {
        Self {
            success: true,
            rules: rules.iter().map(RuleResponse::from).collect(),
        }
    }
}

/// `{success, message}` for mutations with nothing to return
#[derive(Debug, Serialize)]
pub struct MessageEnvelope {
    pub success: bool,
    pub message: String,
}

/// `{success, templates}`
#[derive(Debug, Serialize)]
pub struct TemplatesEnvelope {
    pub success: bool,
    pub templates: Vec<RuleTemplate>,
}

/// One rule's contribution in a quote
#[derive(Debug, Clone, Serialize)]
pub struct AppliedRuleResponse {
    pub rule_id: Option<Uuid>,
    pub name: String,
    pub rule_type: RuleType,
    pub adjustment_type: AdjustmentType,
    pub priority: i32,
    #[serde(with = "rust_decimal::serde::str")]
    pub adjustment: Decimal,
}

/// Priced booking
#[derive(Debug, Clone, Serialize)]
pub struct QuoteResponse {
    #[serde(with = "rust_decimal::serde::str")]
    pub base_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub final_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub total_adjustment: Decimal,
    pub applied_rules: Vec<AppliedRuleResponse>,
}

impl From<&RuleApplication<'_>> for QuoteResponse {
    fn from(application: &RuleApplication<'_>) -> Self {
        Self {
            base_rate: application.base_rate,
            final_rate: application.final_rate,
            total_adjustment: application.total_adjustment(),
            applied_rules: application
                .applied
                .iter()
                .map(|applied| AppliedRuleResponse {
                    rule_id: applied.rule.id,
                    name: applied.rule.name.clone(),
                    rule_type: applied.rule.rule_type,
                    adjustment_type: applied.rule.adjustment_type,
                    priority: applied.rule.priority,
                    adjustment: applied.adjustment,
                })
                .collect(),
        }
    }
}

/// `{success, quote}`
#[derive(Debug, Serialize)]
pub struct QuoteEnvelope {
    pub success: bool,
    pub quote: QuoteResponse,
}

/// Scenario as echoed back in a preview
#[derive(Debug, Clone, Serialize)]
pub struct ScenarioResponse {
    pub route_from: String,
    pub route_to: String,
    pub date: NaiveDate,
    pub passenger_count: i32,
    #[serde(with = "rust_decimal::serde::str_option")]
    pub distance: Option<Decimal>,
    pub booking_time: DateTime<Utc>,
}

/// One row of a rule preview
#[derive(Debug, Clone, Serialize)]
pub struct PreviewResultResponse {
    pub scenario: ScenarioResponse,
    pub applicable: bool,
    #[serde(with = "rust_decimal::serde::str")]
    pub base_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub adjustment: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub final_rate: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub percentage_change: Decimal,
}

impl From<PreviewResult> for PreviewResultResponse {
    fn from(result: PreviewResult) -> Self {
        Self {
            scenario: ScenarioResponse {
                route_from: result.scenario.route_from,
                route_to: result.scenario.route_to,
                date: result.scenario.date,
                passenger_count: result.scenario.passenger_count,
                distance: result.scenario.distance,
                booking_time: result.scenario.booking_time,
            },
            applicable: result.applicable,
            base_rate: result.base_rate,
            adjustment: result.adjustment,
            final_rate: result.final_rate,
            percentage_change: result.percentage_change,
        }
    }
}

/// `{success, preview_results}`
#[derive(Debug, Serialize)]
pub struct PreviewEnvelope {
    pub success: bool,
    pub preview_results: Vec<PreviewResultResponse>,
}

/// Generic error body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}
