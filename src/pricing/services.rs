//! Pricing-rule service functions with database access.
//!
//! Each function acts for one provider: services and rules owned by another
//! provider are reported as `AppError::Forbidden`. Rule evaluation itself is
//! delegated to the pure functions in `calculators`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::cache::AppCache;
use crate::error::{AppError, Result};

use super::calculators::{apply_rules, preview_rule, PreviewResult};
use super::models::{PricingRuleRow, TransportService};
use super::queries;
use super::requests::{PreviewRuleRequest, RuleFields};
use super::responses::QuoteResponse;
use super::rules::{PricingContext, PricingRule};

fn into_rule(row: PricingRuleRow) -> Result<PricingRule> {
    let rule_id = row.id;
    PricingRule::try_from(row)
        .map_err(|e| AppError::Internal(format!("pricing rule {} is corrupt: {}", rule_id, e)))
}

/// Records that belong to exactly one provider
trait ProviderOwned {
    const KIND: &'static str;

    fn id(&self) -> Uuid;
    fn owner(&self) -> Uuid;
}

impl ProviderOwned for TransportService {
    const KIND: &'static str = "service";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner(&self) -> Uuid {
        self.provider_id
    }
}

impl ProviderOwned for PricingRuleRow {
    const KIND: &'static str = "pricing rule";

    fn id(&self) -> Uuid {
        self.id
    }

    fn owner(&self) -> Uuid {
        self.provider_id
    }
}

/// Missing records are `NotFound`; records of another provider are `Forbidden`
fn authorize<T: ProviderOwned>(found: Option<T>, provider_id: Uuid) -> Result<T> {
    let record = found.ok_or(AppError::NotFound)?;

    if record.owner() != provider_id {
        warn!(
            %provider_id,
            owner = %record.owner(),
            id = %record.id(),
            "Provider attempted to access another provider's {}",
            T::KIND
        );
        return Err(AppError::Forbidden);
    }
    Ok(record)
}

/// Load a service and check it belongs to `provider_id`
async fn owned_service(pool: &PgPool, provider_id: Uuid, service_id: Uuid) -> Result<TransportService> {
    authorize(queries::find_service(pool, service_id).await?, provider_id)
}

/// Load a rule and check it belongs to `provider_id`
async fn owned_rule(pool: &PgPool, provider_id: Uuid, rule_id: Uuid) -> Result<PricingRule> {
    into_rule(authorize(queries::find_rule(pool, rule_id).await?, provider_id)?)
}

/// Inactive services are not bookable, so they cannot be quoted
fn ensure_quotable(service: &TransportService) -> Result<()> {
    if !service.is_active {
        return Err(AppError::BadRequest(format!(
            "transport service {} is not active",
            service.id
        )));
    }
    Ok(())
}

async fn invalidate_rule_service(cache: &AppCache, rule: &PricingRule) {
    if let Some(service_id) = rule.transport_service_id {
        cache.invalidate_service(service_id).await;
    }
}

/// All rules of an owned service, by priority then creation order
pub async fn list_rules(pool: &PgPool, provider_id: Uuid, service_id: Uuid) -> Result<Vec<PricingRule>> {
    owned_service(pool, provider_id, service_id).await?;

    queries::list_rules_for_service(pool, service_id)
        .await?
        .into_iter()
        .map(into_rule)
        .collect()
}

pub async fn get_rule(pool: &PgPool, provider_id: Uuid, rule_id: Uuid) -> Result<PricingRule> {
    owned_rule(pool, provider_id, rule_id).await
}

/// Create a rule on one of the provider's services
pub async fn create_rule(
    pool: &PgPool,
    cache: &AppCache,
    provider_id: Uuid,
    service_id: Uuid,
    fields: &RuleFields,
) -> Result<PricingRule> {
    owned_service(pool, provider_id, service_id).await?;

    let rule = into_rule(queries::insert_rule(pool, provider_id, service_id, fields).await?)?;
    cache.invalidate_service(service_id).await;

    info!(
        rule_id = ?rule.id,
        %service_id,
        rule_type = %rule.rule_type,
        "Pricing rule created"
    );
    Ok(rule)
}

/// Replace every field of an existing rule
pub async fn update_rule(
    pool: &PgPool,
    cache: &AppCache,
    provider_id: Uuid,
    rule_id: Uuid,
    fields: &RuleFields,
) -> Result<PricingRule> {
    owned_rule(pool, provider_id, rule_id).await?;

    let rule = into_rule(queries::update_rule(pool, rule_id, fields).await?)?;
    invalidate_rule_service(cache, &rule).await;

    info!(%rule_id, "Pricing rule updated");
    Ok(rule)
}

/// Flip a rule between active and inactive
pub async fn toggle_rule(
    pool: &PgPool,
    cache: &AppCache,
    provider_id: Uuid,
    rule_id: Uuid,
) -> Result<PricingRule> {
    owned_rule(pool, provider_id, rule_id).await?;

    let rule = into_rule(queries::toggle_rule(pool, rule_id).await?)?;
    invalidate_rule_service(cache, &rule).await;

    info!(%rule_id, is_active = rule.is_active, "Pricing rule status toggled");
    Ok(rule)
}

pub async fn delete_rule(
    pool: &PgPool,
    cache: &AppCache,
    provider_id: Uuid,
    rule_id: Uuid,
) -> Result<()> {
    let rule = owned_rule(pool, provider_id, rule_id).await?;

    if !queries::delete_rule(pool, rule_id).await? {
        return Err(AppError::NotFound);
    }
    invalidate_rule_service(cache, &rule).await;

    info!(%rule_id, "Pricing rule deleted");
    Ok(())
}

/// Active rules of a service, served from the cache when possible
pub async fn active_rules(
    pool: &PgPool,
    cache: &AppCache,
    service_id: Uuid,
) -> Result<Arc<Vec<PricingRule>>> {
    if let Some(rules) = cache.rules_for(service_id).await {
        return Ok(rules);
    }

    let rules = queries::list_active_rules_for_service(pool, service_id)
        .await?
        .into_iter()
        .map(into_rule)
        .collect::<Result<Vec<_>>>()?;

    Ok(cache.store_rules(service_id, rules).await)
}

/// Price a booking scenario against a service's active rules
pub async fn quote(
    pool: &PgPool,
    cache: &AppCache,
    provider_id: Uuid,
    service_id: Uuid,
    context: &PricingContext,
    base_rate: Decimal,
) -> Result<QuoteResponse> {
    let service = owned_service(pool, provider_id, service_id).await?;
    ensure_quotable(&service)?;

    let rules = active_rules(pool, cache, service_id).await?;
    let application = apply_rules(&rules, context, base_rate);

    Ok(QuoteResponse::from(&application))
}

/// Evaluate a candidate rule without saving it
pub fn preview(
    request: &PreviewRuleRequest,
    default_base_rate: Decimal,
    now: DateTime<Utc>,
) -> Vec<PreviewResult> {
    let candidate = request.rule.to_rule();
    let base_rate = request.base_rate.unwrap_or(default_base_rate);
    preview_rule(&candidate, &request.scenarios, base_rate, now)
}
