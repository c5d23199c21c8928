//! Domain types for transport pricing rules.
//!
//! A rule carries one optional constraint per category. Unset constraints do
//! not restrict applicability, so a rule with nothing set applies everywhere.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category of constraint a rule encodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleType {
    Seasonal,
    Distance,
    PassengerCount,
    RouteSpecific,
    DayOfWeek,
    AdvanceBooking,
}

impl RuleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleType::Seasonal => "seasonal",
            RuleType::Distance => "distance",
            RuleType::PassengerCount => "passenger_count",
            RuleType::RouteSpecific => "route_specific",
            RuleType::DayOfWeek => "day_of_week",
            RuleType::AdvanceBooking => "advance_booking",
        }
    }
}

impl fmt::Display for RuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuleType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "seasonal" => Ok(RuleType::Seasonal),
            "distance" => Ok(RuleType::Distance),
            "passenger_count" => Ok(RuleType::PassengerCount),
            "route_specific" => Ok(RuleType::RouteSpecific),
            "day_of_week" => Ok(RuleType::DayOfWeek),
            "advance_booking" => Ok(RuleType::AdvanceBooking),
            other => Err(UnknownVariant::new("rule_type", other)),
        }
    }
}

/// How `adjustment_value` turns into a delta on the base rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentType {
    /// `adjustment_value` percent of the base rate
    Percentage,
    /// `adjustment_value` as an absolute amount
    Fixed,
    /// `adjustment_value` is the factor, e.g. 1.2 for +20%
    Multiplier,
}

impl AdjustmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdjustmentType::Percentage => "percentage",
            AdjustmentType::Fixed => "fixed",
            AdjustmentType::Multiplier => "multiplier",
        }
    }
}

impl fmt::Display for AdjustmentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AdjustmentType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "percentage" => Ok(AdjustmentType::Percentage),
            "fixed" => Ok(AdjustmentType::Fixed),
            "multiplier" => Ok(AdjustmentType::Multiplier),
            other => Err(UnknownVariant::new("adjustment_type", other)),
        }
    }
}

/// A stored enum column held a value no variant matches
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {field} '{value}'")]
pub struct UnknownVariant {
    pub field: &'static str,
    pub value: String,
}

impl UnknownVariant {
    fn new(field: &'static str, value: &str) -> Self {
        Self {
            field,
            value: value.to_string(),
        }
    }
}

/// Weekday names as providers enter them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

/// One origin/destination pair a rule is scoped to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteScope {
    pub from: String,
    pub to: String,
}

impl RouteScope {
    /// Exact, case-sensitive comparison
    pub fn matches(&self, from: &str, to: &str) -> bool {
        self.from == from && self.to == to
    }
}

/// Inclusive numeric bounds where either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounds<T> {
    pub min: Option<T>,
    pub max: Option<T>,
}

impl<T> Default for Bounds<T> {
    fn default() -> Self {
        Self {
            min: None,
            max: None,
        }
    }
}

impl<T: PartialOrd + Copy> Bounds<T> {
    pub fn new(min: Option<T>, max: Option<T>) -> Self {
        Self { min, max }
    }

    pub fn is_set(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    pub fn contains(&self, value: T) -> bool {
        if let Some(min) = self.min {
            if value < min {
                return false;
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return false;
            }
        }
        true
    }

    /// `max >= min` whenever both sides are present
    pub fn is_ordered(&self) -> bool {
        match (self.min, self.max) {
            (Some(min), Some(max)) => max >= min,
            _ => true,
        }
    }
}

/// Travel-date window, inclusive on both ends
pub type DateWindow = Bounds<NaiveDate>;

/// A pricing rule as the engine sees it.
///
/// Persisted rules carry `id`, `provider_id` and `transport_service_id`; a
/// candidate built for preview leaves them unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingRule {
    pub id: Option<Uuid>,
    pub provider_id: Option<Uuid>,
    pub transport_service_id: Option<Uuid>,
    pub name: String,
    pub description: Option<String>,
    pub rule_type: RuleType,
    pub adjustment_type: AdjustmentType,
    pub adjustment_value: Decimal,
    pub travel_dates: DateWindow,
    pub passengers: Bounds<i32>,
    pub distance: Bounds<Decimal>,
    /// Empty means every day
    pub days_of_week: Vec<DayOfWeek>,
    pub advance_hours: Bounds<i64>,
    /// Empty means any route
    pub applicable_routes: Vec<RouteScope>,
    pub priority: i32,
    pub is_active: bool,
    pub created_at: Option<DateTime<Utc>>,
}

impl PricingRule {
    /// An active, unconstrained rule. Constraint fields are filled in by the
    /// caller.
    pub fn new(
        name: impl Into<String>,
        rule_type: RuleType,
        adjustment_type: AdjustmentType,
        adjustment_value: Decimal,
    ) -> Self {
        Self {
            id: None,
            provider_id: None,
            transport_service_id: None,
            name: name.into(),
            description: None,
            rule_type,
            adjustment_type,
            adjustment_value,
            travel_dates: DateWindow::default(),
            passengers: Bounds::default(),
            distance: Bounds::default(),
            days_of_week: Vec::new(),
            advance_hours: Bounds::default(),
            applicable_routes: Vec::new(),
            priority: 50,
            is_active: true,
            created_at: None,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Snapshot of a booking scenario being priced. Not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricingContext {
    pub date: NaiveDate,
    pub passenger_count: i32,
    pub route_from: String,
    pub route_to: String,
    /// When the price is requested
    pub booking_time: DateTime<Utc>,
    pub distance: Option<Decimal>,
}

impl PricingContext {
    pub fn weekday(&self) -> DayOfWeek {
        self.date.weekday().into()
    }

    /// Whole hours from `booking_time` until the travel date starts (00:00 UTC).
    /// Negative once the travel date has begun.
    pub fn advance_hours(&self) -> i64 {
        let departure = self.date.and_time(chrono::NaiveTime::MIN).and_utc();
        (departure - self.booking_time).num_hours()
    }
}
