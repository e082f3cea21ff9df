//! Approval workflow definitions.
//!
//! A workflow is an ordered list of steps, each naming the role that must
//! approve and the conditions under which the step applies to a record
//! (for example "finance approves purchase requests over 5000").

use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use super::Role;

/// Typed right-hand side of a workflow condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    Boolean(bool),
    Number(f64),
    Text(String),
    TextList(Vec<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    GreaterThan,
    LessThan,
    In,
    Contains,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowCondition {
    /// Top-level field of the record under approval
    pub field: String,
    pub operator: ConditionOperator,
    pub value: ConditionValue,
}

impl WorkflowCondition {
    /// Evaluate against a JSON record. Missing fields and type mismatches are `false`.
    pub fn matches(&self, record: &Value) -> bool {
        let Some(actual) = record.get(&self.field) else {
            return false;
        };

        match (self.operator, &self.value) {
            (ConditionOperator::Equals, expected) => scalar_eq(actual, expected),
            (ConditionOperator::NotEquals, expected) => {
                !actual.is_null() && !scalar_eq(actual, expected)
            }
            (ConditionOperator::GreaterThan, ConditionValue::Number(n)) => {
                actual.as_f64().is_some_and(|a| a > *n)
            }
            (ConditionOperator::LessThan, ConditionValue::Number(n)) => {
                actual.as_f64().is_some_and(|a| a < *n)
            }
            (ConditionOperator::In, ConditionValue::TextList(options)) => actual
                .as_str()
                .is_some_and(|a| options.iter().any(|o| o == a)),
            (ConditionOperator::Contains, ConditionValue::Text(needle)) => match actual {
                Value::String(s) => s.contains(needle.as_str()),
                Value::Array(items) => items.iter().any(|i| i.as_str() == Some(needle.as_str())),
                _ => false,
            },
            _ => false,
        }
    }
}

fn scalar_eq(actual: &Value, expected: &ConditionValue) -> bool {
    match expected {
        ConditionValue::Boolean(b) => actual.as_bool() == Some(*b),
        ConditionValue::Number(n) => actual.as_f64() == Some(*n),
        ConditionValue::Text(t) => actual.as_str() == Some(t.as_str()),
        ConditionValue::TextList(list) => actual.as_array().is_some_and(|items| {
            items.len() == list.len()
                && items
                    .iter()
                    .zip(list)
                    .all(|(i, expected)| i.as_str() == Some(expected.as_str()))
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStep {
    pub order: u32,
    pub approver_role: Role,
    #[serde(default)]
    pub conditions: Vec<WorkflowCondition>,
}

impl WorkflowStep {
    pub fn applies_to(&self, record: &Value) -> bool {
        self.conditions.iter().all(|c| c.matches(record))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalWorkflow {
    pub id: Uuid,
    pub org_id: Uuid,
    pub name: String,
    /// Kind of record this workflow gates, e.g. "purchase_request"
    pub entity_type: String,
    pub steps: Vec<WorkflowStep>,
}

impl ApprovalWorkflow {
    /// Approver roles for the steps that apply to `record`, in step order.
    pub fn required_approvers(&self, record: &Value) -> Vec<Role> {
        let mut steps: Vec<&WorkflowStep> =
            self.steps.iter().filter(|s| s.applies_to(record)).collect();
        steps.sort_by_key(|s| s.order);
        steps.into_iter().map(|s| s.approver_role).collect()
    }
}
