//! Transport pricing-rule module.
//!
//! Providers attach pricing rules to their transport services; the engine in
//! [`calculators`] decides which rules apply to a booking scenario and what
//! they do to the base rate.

pub mod calculators;
pub mod models;
pub mod queries;
pub mod requests;
pub mod responses;
pub mod routes;
pub mod rules;
pub mod services;
pub mod templates;

// Re-export commonly used items
pub use calculators::{
    apply_rules, calculate_adjustment, is_applicable, preview_rule, round_money, RuleApplication,
};
pub use routes::router;
pub use rules::{AdjustmentType, PricingContext, PricingRule, RuleType};
