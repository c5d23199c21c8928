//! Database queries for transport pricing rules.

use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::AppError;

use super::models::{PricingRuleRow, TransportService};
use super::requests::RuleFields;

const RULE_COLUMNS: &str = r#"
    id, provider_id, transport_service_id, name, description,
    rule_type, adjustment_type, adjustment_value,
    start_date, end_date, min_passengers, max_passengers,
    min_distance, max_distance, days_of_week,
    min_advance_hours, max_advance_hours, applicable_routes,
    priority, is_active, created_at, updated_at
"#;

/// Find a transport service by id
pub async fn find_service(
    pool: &PgPool,
    service_id: Uuid,
) -> Result<Option<TransportService>, AppError> {
    let service = sqlx::query_as::<_, TransportService>(
        r#"
        SELECT id, provider_id, is_active
        FROM transport_services
        WHERE id = $1
        "#,
    )
    .bind(service_id)
    .fetch_optional(pool)
    .await?;

    Ok(service)
}

/// Find a pricing rule by id
pub async fn find_rule(pool: &PgPool, rule_id: Uuid) -> Result<Option<PricingRuleRow>, AppError> {
    let sql = format!("SELECT {RULE_COLUMNS} FROM transport_pricing_rules WHERE id = $1");
    let rule = sqlx::query_as::<_, PricingRuleRow>(&sql)
        .bind(rule_id)
        .fetch_optional(pool)
        .await?;

    Ok(rule)
}

/// All rules of a service, by priority then creation order
pub async fn list_rules_for_service(
    pool: &PgPool,
    service_id: Uuid,
) -> Result<Vec<PricingRuleRow>, AppError> {
    let sql = format!(
        "SELECT {RULE_COLUMNS} FROM transport_pricing_rules \
         WHERE transport_service_id = $1 \
         ORDER BY priority ASC, created_at ASC, id ASC"
    );
    let rules = sqlx::query_as::<_, PricingRuleRow>(&sql)
        .bind(service_id)
        .fetch_all(pool)
        .await?;

    Ok(rules)
}

/// Active rules of a service in creation order.
///
/// The engine sorts by priority itself; creation order is what breaks ties.
pub async fn list_active_rules_for_service(
    pool: &PgPool,
    service_id: Uuid,
) -> Result<Vec<PricingRuleRow>, AppError> {
    let sql = format!(
        "SELECT {RULE_COLUMNS} FROM transport_pricing_rules \
         WHERE transport_service_id = $1 AND is_active = TRUE \
         ORDER BY created_at ASC, id ASC"
    );
    let rules = sqlx::query_as::<_, PricingRuleRow>(&sql)
        .bind(service_id)
        .fetch_all(pool)
        .await?;

    Ok(rules)
}

/// Insert a rule and return the stored row
pub async fn insert_rule(
    pool: &PgPool,
    provider_id: Uuid,
    service_id: Uuid,
    fields: &RuleFields,
) -> Result<PricingRuleRow, AppError> {
    let sql = format!(
        "INSERT INTO transport_pricing_rules (\
            id, provider_id, transport_service_id, name, description, \
            rule_type, adjustment_type, adjustment_value, \
            start_date, end_date, min_passengers, max_passengers, \
            min_distance, max_distance, days_of_week, \
            min_advance_hours, max_advance_hours, applicable_routes, \
            priority, is_active, created_at, updated_at\
         ) VALUES (\
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, \
            $13, $14, $15, $16, $17, $18, $19, $20, NOW(), NOW()\
         ) RETURNING {RULE_COLUMNS}"
    );
    let row = sqlx::query_as::<_, PricingRuleRow>(&sql)
        .bind(Uuid::new_v4())
        .bind(provider_id)
        .bind(service_id)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.rule_type.as_str())
        .bind(fields.adjustment_type.as_str())
        .bind(fields.adjustment_value)
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(fields.min_passengers)
        .bind(fields.max_passengers)
        .bind(fields.min_distance)
        .bind(fields.max_distance)
        .bind(Json(&fields.days_of_week))
        .bind(fields.min_advance_hours)
        .bind(fields.max_advance_hours)
        .bind(Json(&fields.applicable_routes))
        .bind(fields.priority)
        .bind(fields.is_active.unwrap_or(true))
        .fetch_one(pool)
        .await?;

    Ok(row)
}

/// Replace every editable field of a rule
pub async fn update_rule(
    pool: &PgPool,
    rule_id: Uuid,
    fields: &RuleFields,
) -> Result<PricingRuleRow, AppError> {
    let sql = format!(
        "UPDATE transport_pricing_rules SET \
            name = $2, description = $3, rule_type = $4, adjustment_type = $5, \
            adjustment_value = $6, start_date = $7, end_date = $8, \
            min_passengers = $9, max_passengers = $10, \
            min_distance = $11, max_distance = $12, days_of_week = $13, \
            min_advance_hours = $14, max_advance_hours = $15, \
            applicable_routes = $16, priority = $17, \
            is_active = COALESCE($18, is_active), updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {RULE_COLUMNS}"
    );
    let row = sqlx::query_as::<_, PricingRuleRow>(&sql)
        .bind(rule_id)
        .bind(&fields.name)
        .bind(&fields.description)
        .bind(fields.rule_type.as_str())
        .bind(fields.adjustment_type.as_str())
        .bind(fields.adjustment_value)
        .bind(fields.start_date)
        .bind(fields.end_date)
        .bind(fields.min_passengers)
        .bind(fields.max_passengers)
        .bind(fields.min_distance)
        .bind(fields.max_distance)
        .bind(Json(&fields.days_of_week))
        .bind(fields.min_advance_hours)
        .bind(fields.max_advance_hours)
        .bind(Json(&fields.applicable_routes))
        .bind(fields.priority)
        .bind(fields.is_active)
        .fetch_optional(pool)
        .await?;

    row.ok_or(AppError::NotFound)
}

/// Flip a rule's active flag
pub async fn toggle_rule(pool: &PgPool, rule_id: Uuid) -> Result<PricingRuleRow, AppError> {
    let sql = format!(
        "UPDATE transport_pricing_rules \
         SET is_active = NOT is_active, updated_at = NOW() \
         WHERE id = $1 \
         RETURNING {RULE_COLUMNS}"
    );
    let row = sqlx::query_as::<_, PricingRuleRow>(&sql)
        .bind(rule_id)
        .fetch_optional(pool)
        .await?;

    row.ok_or(AppError::NotFound)
}

/// Delete a rule. Returns false when nothing was deleted.
pub async fn delete_rule(pool: &PgPool, rule_id: Uuid) -> Result<bool, AppError> {
    let result = sqlx::query("DELETE FROM transport_pricing_rules WHERE id = $1")
        .bind(rule_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}
