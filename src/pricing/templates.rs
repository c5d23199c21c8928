//! Quick-start rule presets offered to providers.
//!
//! Static data: a template fills in the rule form, it is never evaluated on
//! its own.

use rust_decimal::Decimal;
use serde::Serialize;

use super::rules::{AdjustmentType, DayOfWeek, RouteScope, RuleType};

/// A named preset with default rule fields
#[derive(Debug, Clone, Serialize)]
pub struct RuleTemplate {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub rule_type: RuleType,
    pub adjustment_type: AdjustmentType,
    #[serde(with = "rust_decimal::serde::str")]
    pub adjustment_value: Decimal,
    pub priority: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_passengers: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", with = "rust_decimal::serde::str_option")]
    pub min_distance: Option<Decimal>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub days_of_week: Vec<DayOfWeek>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_advance_hours: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_advance_hours: Option<i64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub applicable_routes: Vec<RouteScope>,
}

impl RuleTemplate {
    fn new(
        key: &'static str,
        name: &'static str,
        description: &'static str,
        rule_type: RuleType,
        adjustment_type: AdjustmentType,
        adjustment_value: Decimal,
    ) -> Self {
        Self {
            key,
            name,
            description,
            rule_type,
            adjustment_type,
            adjustment_value,
            priority: 50,
            min_passengers: None,
            min_distance: None,
            days_of_week: Vec::new(),
            min_advance_hours: None,
            max_advance_hours: None,
            applicable_routes: Vec::new(),
        }
    }
}

/// All presets, in display order
pub fn rule_templates() -> Vec<RuleTemplate> {
    vec![
        RuleTemplate {
            days_of_week: vec![DayOfWeek::Saturday, DayOfWeek::Sunday],
            ..RuleTemplate::new(
                "weekend_surcharge",
                "Weekend Surcharge",
                "Add 15% to trips on Saturdays and Sundays",
                RuleType::DayOfWeek,
                AdjustmentType::Percentage,
                Decimal::new(15, 0),
            )
        },
        RuleTemplate {
            priority: 40,
            ..RuleTemplate::new(
                "peak_season",
                "Peak Season",
                "Multiply the rate by 1.25 during a peak travel window",
                RuleType::Seasonal,
                AdjustmentType::Multiplier,
                Decimal::new(125, 2),
            )
        },
        RuleTemplate {
            min_passengers: Some(10),
            ..RuleTemplate::new(
                "group_discount",
                "Group Discount",
                "Take 10% off for groups of 10 or more passengers",
                RuleType::PassengerCount,
                AdjustmentType::Percentage,
                Decimal::new(-10, 0),
            )
        },
        RuleTemplate {
            min_advance_hours: Some(720),
            ..RuleTemplate::new(
                "early_bird",
                "Early Bird",
                "Take 15% off bookings made 30 days or more ahead",
                RuleType::AdvanceBooking,
                AdjustmentType::Percentage,
                Decimal::new(-15, 0),
            )
        },
        RuleTemplate {
            min_advance_hours: Some(0),
            max_advance_hours: Some(48),
            ..RuleTemplate::new(
                "last_minute",
                "Last Minute",
                "Add 20% to bookings made within 48 hours of travel",
                RuleType::AdvanceBooking,
                AdjustmentType::Percentage,
                Decimal::new(20, 0),
            )
        },
        RuleTemplate {
            min_distance: Some(Decimal::new(300, 0)),
            ..RuleTemplate::new(
                "long_distance",
                "Long Distance",
                "Take a fixed 25 off trips of 300 or more",
                RuleType::Distance,
                AdjustmentType::Fixed,
                Decimal::new(-25, 0),
            )
        },
        RuleTemplate {
            applicable_routes: vec![RouteScope {
                from: "City Center".to_string(),
                to: "Airport".to_string(),
            }],
            ..RuleTemplate::new(
                "airport_transfer",
                "Airport Transfer",
                "Add a fixed 30 to transfers on a specific route",
                RuleType::RouteSpecific,
                AdjustmentType::Fixed,
                Decimal::new(30, 0),
            )
        },
    ]
}
