//! Database models for pricing-rule queries.
//!
//! These models use sqlx's FromRow derive for direct database deserialization.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use super::rules::{Bounds, DayOfWeek, PricingRule, RouteScope, UnknownVariant};

/// Rule from transport_pricing_rules
#[derive(Debug, Clone, FromRow)]
pub struct PricingRuleRow {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub transport_service_id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub rule_type: String,
    pub adjustment_type: String,
    pub adjustment_value: Decimal,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub min_passengers: Option<i32>,
    pub max_passengers: Option<i32>,
    pub min_distance: Option<Decimal>,
    pub max_distance: Option<Decimal>,
    pub days_of_week: Json<Vec<DayOfWeek>>,
    pub min_advance_hours: Option<i32>,
    pub max_advance_hours: Option<i32>,
    pub applicable_routes: Json<Vec<RouteScope>>,
    pub priority: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<PricingRuleRow> for PricingRule {
    type Error = UnknownVariant;

    fn try_from(row: PricingRuleRow) -> Result<Self, Self::Error> {
        Ok(PricingRule {
            id: Some(row.id),
            provider_id: Some(row.provider_id),
            transport_service_id: Some(row.transport_service_id),
            name: row.name,
            description: row.description,
            rule_type: row.rule_type.parse()?,
            adjustment_type: row.adjustment_type.parse()?,
            adjustment_value: row.adjustment_value,
            travel_dates: Bounds::new(row.start_date, row.end_date),
            passengers: Bounds::new(row.min_passengers, row.max_passengers),
            distance: Bounds::new(row.min_distance, row.max_distance),
            days_of_week: row.days_of_week.0,
            advance_hours: Bounds::new(
                row.min_advance_hours.map(i64::from),
                row.max_advance_hours.map(i64::from),
            ),
            applicable_routes: row.applicable_routes.0,
            priority: row.priority,
            is_active: row.is_active,
            created_at: Some(row.created_at),
        })
    }
}

/// Service from transport_services
#[derive(Debug, Clone, FromRow)]
pub struct TransportService {
    pub id: Uuid,
    pub provider_id: Uuid,
    pub is_active: bool,
}
