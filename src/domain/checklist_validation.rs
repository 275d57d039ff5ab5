//! Authoring-time validation of checklist definitions.
//!
//! Evaluation tolerates bad items (they simply fail); this catches them
//! before a definition is stored or run.

use crate::domain::checklist::{ChecklistDefinition, ConditionItem};
use crate::domain::error::{EvalError, ScreenerError};
use crate::domain::field::{Field, FieldType};
use crate::domain::metrics::MetricValue;
use crate::domain::operand::parse_expected;
use crate::domain::operator::Operator;

pub fn validate_definition(definition: &ChecklistDefinition) -> Result<(), ScreenerError> {
    if definition.checklist.name.trim().is_empty() {
        return Err(ScreenerError::DefinitionInvalid {
            item_id: 0,
            reason: "checklist name must not be empty".to_string(),
        });
    }
    for item in &definition.items {
        if item.checklist_id != definition.checklist.id {
            return Err(invalid(
                item,
                format!(
                    "belongs to checklist {}, not {}",
                    item.checklist_id, definition.checklist.id
                ),
            ));
        }
        validate_item(item)?;
    }
    Ok(())
}

pub fn validate_item(item: &ConditionItem) -> Result<(), ScreenerError> {
    let field = Field::from_key(&item.left_operand)
        .ok_or_else(|| invalid(item, format!("unknown field: {}", item.left_operand)))?;

    let operator: Operator = item
        .operator
        .parse()
        .map_err(|e: EvalError| invalid(item, e.to_string()))?;

    let field_type = field.field_type();
    let offered = field_type.operators().contains(&operator)
        || (field_type == FieldType::Text && operator.is_string_only());
    if !offered {
        return Err(invalid(
            item,
            format!("operator {operator} is not available for {field_type} field {field}"),
        ));
    }

    if item.right_operand.trim().is_empty() {
        return Err(invalid(item, "right operand must not be empty".to_string()));
    }

    if field_type == FieldType::Number
        && let MetricValue::Text(text) = parse_expected(&item.right_operand)
    {
        return Err(invalid(
            item,
            format!("threshold '{text}' for {field} is not numeric"),
        ));
    }

    Ok(())
}

fn invalid(item: &ConditionItem, reason: String) -> ScreenerError {
    ScreenerError::DefinitionInvalid {
        item_id: item.id,
        reason,
    }
}
