// Threshold rule service

use chrono::Utc;
use millwatch_core::{
    id::{or_generate, RULE_PREFIX},
    Priority, Rule, RuleOperator, RuleStore,
};
use std::sync::Arc;

use crate::common::{non_blank, required};
use crate::error::ApiError;
use crate::rules::CreateRuleRequest;

pub struct RuleService {
    rules: Arc<dyn RuleStore>,
}

impl RuleService {
    pub fn new(rules: Arc<dyn RuleStore>) -> Self {
        Self { rules }
    }

    pub async fn list_enabled(&self) -> Result<Vec<Rule>, ApiError> {
        Ok(self.rules.list_enabled_rules().await?)
    }

    pub async fn create(&self, req: CreateRuleRequest) -> Result<Rule, ApiError> {
        let machine_id = required(req.machine_id, "machineId")?;
        let metric = required(req.metric, "metric")?;
        let operator: RuleOperator = required(req.operator, "operator")?
            .trim()
            .parse()
            .map_err(ApiError::BadRequest)?;

        if operator != RuleOperator::Range && req.threshold_value.is_none() {
            return Err(ApiError::bad_request(format!(
                "thresholdValue is required for operator {operator}"
            )));
        }

        let priority = match non_blank(req.priority) {
            Some(p) => p.trim().parse().map_err(ApiError::BadRequest)?,
            None => Priority::default(),
        };

        let rule = Rule {
            id: or_generate(req.id, RULE_PREFIX),
            machine_id,
            sensor_id: non_blank(req.sensor_id),
            metric,
            operator,
            min_value: req.min_value,
            max_value: req.max_value,
            threshold_value: req.threshold_value,
            priority,
            message: req.message,
            enabled: req.enabled.unwrap_or(true),
            created_at: Utc::now(),
        };
        let rule = self.rules.upsert_rule(rule).await?;
        tracing::debug!(
            rule_id = %rule.id,
            machine_id = %rule.machine_id,
            operator = %rule.operator,
            "Rule stored"
        );
        Ok(rule)
    }
}
