//! Pricing-rule evaluation.
//!
//! Pure functions for rule matching and rate adjustment - no database access
//! and no clock reads. Anything time-dependent arrives through
//! [`PricingContext`].

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};

use super::rules::{AdjustmentType, PricingContext, PricingRule};

/// Base rate used by previews when the caller does not supply one
pub const DEFAULT_PREVIEW_BASE_RATE: Decimal = Decimal::ONE_HUNDRED;

/// Round to specified decimal places using banker's rounding (ROUND_HALF_EVEN).
///
/// # Examples
/// ```
/// use rust_decimal_macros::dec;
/// use transport_pricing::pricing::round_money;
///
/// assert_eq!(round_money(dec!(2.5), 0), dec!(2));
/// assert_eq!(round_money(dec!(1.234), 2), dec!(1.23));
/// ```
pub fn round_money(amount: Decimal, places: u32) -> Decimal {
    amount.round_dp_with_strategy(places, RoundingStrategy::MidpointNearestEven)
}

/// Check whether every constraint set on `rule` holds for `context`.
///
/// Inactive rules never apply. A rule with no constraints applies to every
/// context.
pub fn is_applicable(rule: &PricingRule, context: &PricingContext) -> bool {
    rule.is_active
        && matches_travel_dates(rule, context)
        && matches_passengers(rule, context)
        && matches_distance(rule, context)
        && matches_day_of_week(rule, context)
        && matches_route(rule, context)
        && matches_advance_booking(rule, context)
}

pub fn matches_travel_dates(rule: &PricingRule, context: &PricingContext) -> bool {
    rule.travel_dates.contains(context.date)
}

pub fn matches_passengers(rule: &PricingRule, context: &PricingContext) -> bool {
    rule.passengers.contains(context.passenger_count)
}

/// Distance bounds fail closed when the context carries no distance.
pub fn matches_distance(rule: &PricingRule, context: &PricingContext) -> bool {
    if !rule.distance.is_set() {
        return true;
    }
    match context.distance {
        Some(distance) => rule.distance.contains(distance),
        None => false,
    }
}

pub fn matches_day_of_week(rule: &PricingRule, context: &PricingContext) -> bool {
    rule.days_of_week.is_empty() || rule.days_of_week.contains(&context.weekday())
}

pub fn matches_route(rule: &PricingRule, context: &PricingContext) -> bool {
    rule.applicable_routes.is_empty()
        || rule
            .applicable_routes
            .iter()
            .any(|route| route.matches(&context.route_from, &context.route_to))
}

pub fn matches_advance_booking(rule: &PricingRule, context: &PricingContext) -> bool {
    !rule.advance_hours.is_set() || rule.advance_hours.contains(context.advance_hours())
}

/// Signed delta `rule` contributes on top of `base_rate`.
///
/// Every adjustment type yields a delta rather than a new total, so callers
/// always add the result to the base rate. Results past the `Decimal` range
/// saturate at `Decimal::MAX` / `Decimal::MIN`.
pub fn calculate_adjustment(rule: &PricingRule, base_rate: Decimal) -> Decimal {
    let value = rule.adjustment_value;
    match rule.adjustment_type {
        AdjustmentType::Percentage => base_rate
            .checked_mul(value)
            .map(|scaled| scaled / Decimal::ONE_HUNDRED)
            .unwrap_or_else(|| base_rate.saturating_mul(value / Decimal::ONE_HUNDRED)),
        AdjustmentType::Fixed => value,
        AdjustmentType::Multiplier => base_rate.saturating_mul(value.saturating_sub(Decimal::ONE)),
    }
}

/// One rule's contribution to a priced rate
#[derive(Debug, Clone, PartialEq)]
pub struct AppliedAdjustment<'a> {
    pub rule: &'a PricingRule,
    pub adjustment: Decimal,
}

/// Outcome of running a rule set against a context
#[derive(Debug, Clone, PartialEq)]
pub struct RuleApplication<'a> {
    pub base_rate: Decimal,
    pub final_rate: Decimal,
    /// Contributing rules in the order they were applied
    pub applied: Vec<AppliedAdjustment<'a>>,
}

impl RuleApplication<'_> {
    pub fn total_adjustment(&self) -> Decimal {
        self.final_rate.saturating_sub(self.base_rate)
    }
}

/// Apply every applicable rule to `base_rate`.
///
/// Applicable rules run in ascending `priority`; equal priorities keep the
/// order of `rules`, which callers supply in creation order. Each delta is
/// computed against the original `base_rate`, never the running total. The
/// final rate is not clamped.
pub fn apply_rules<'a>(
    rules: &'a [PricingRule],
    context: &PricingContext,
    base_rate: Decimal,
) -> RuleApplication<'a> {
    let mut applicable: Vec<&PricingRule> = rules
        .iter()
        .filter(|rule| is_applicable(rule, context))
        .collect();
    applicable.sort_by_key(|rule| rule.priority);

    let applied: Vec<AppliedAdjustment<'a>> = applicable
        .into_iter()
        .map(|rule| AppliedAdjustment {
            rule,
            adjustment: calculate_adjustment(rule, base_rate),
        })
        .collect();

    let final_rate = applied
        .iter()
        .fold(base_rate, |rate, entry| rate.saturating_add(entry.adjustment));

    tracing::debug!(
        rules = rules.len(),
        applied = applied.len(),
        %base_rate,
        %final_rate,
        "Evaluated pricing rules"
    );

    RuleApplication {
        base_rate,
        final_rate,
        applied,
    }
}

/// `(final_rate - base_rate) / base_rate * 100`, or zero for a zero base rate.
///
/// A change too large for `Decimal` saturates in the direction of the change.
pub fn percentage_change(base_rate: Decimal, final_rate: Decimal) -> Decimal {
    if base_rate.is_zero() {
        return Decimal::ZERO;
    }
    let delta = final_rate.saturating_sub(base_rate);
    delta
        .checked_div(base_rate)
        .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
        .unwrap_or(if delta.is_sign_negative() == base_rate.is_sign_negative() {
            Decimal::MAX
        } else {
            Decimal::MIN
        })
}

/// A booking scenario to try a candidate rule against
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewScenario {
    pub route_from: String,
    pub route_to: String,
    pub date: NaiveDate,
    pub passenger_count: i32,
    #[serde(default)]
    pub distance: Option<Decimal>,
    #[serde(default)]
    pub base_rate: Option<Decimal>,
    #[serde(default)]
    pub booking_time: Option<DateTime<Utc>>,
}

/// Outcome of one preview scenario
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewResult {
    pub scenario: PreviewScenarioSummary,
    pub applicable: bool,
    pub base_rate: Decimal,
    pub adjustment: Decimal,
    pub final_rate: Decimal,
    /// Rounded to two places, trailing zeros dropped
    pub percentage_change: Decimal,
}

/// The resolved inputs a preview result was computed from
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewScenarioSummary {
    pub route_from: String,
    pub route_to: String,
    pub date: NaiveDate,
    pub passenger_count: i32,
    pub distance: Option<Decimal>,
    pub booking_time: DateTime<Utc>,
}

/// Evaluate an unsaved rule against each scenario.
///
/// Scenarios without their own base rate use `default_base_rate`; those
/// without a booking time are treated as booked at `now`. An inapplicable
/// scenario reports a zero adjustment and an unchanged rate.
pub fn preview_rule(
    candidate: &PricingRule,
    scenarios: &[PreviewScenario],
    default_base_rate: Decimal,
    now: DateTime<Utc>,
) -> Vec<PreviewResult> {
    scenarios
        .iter()
        .map(|scenario| {
            let base_rate = scenario.base_rate.unwrap_or(default_base_rate);
            let context = PricingContext {
                date: scenario.date,
                passenger_count: scenario.passenger_count,
                route_from: scenario.route_from.clone(),
                route_to: scenario.route_to.clone(),
                booking_time: scenario.booking_time.unwrap_or(now),
                distance: scenario.distance,
            };

            let applicable = is_applicable(candidate, &context);
            let adjustment = if applicable {
                calculate_adjustment(candidate, base_rate)
            } else {
                Decimal::ZERO
            };
            let final_rate = base_rate.saturating_add(adjustment);

            PreviewResult {
                scenario: PreviewScenarioSummary {
                    route_from: context.route_from,
                    route_to: context.route_to,
                    date: context.date,
                    passenger_count: context.passenger_count,
                    distance: context.distance,
                    booking_time: context.booking_time,
                },
                applicable,
                base_rate,
                adjustment,
                final_rate,
                percentage_change: round_money(percentage_change(base_rate, final_rate), 2)
                    .normalize(),
            }
        })
        .collect()
}
