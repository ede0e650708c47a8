//! Workflow instance model.

use encore_core::error::CoreError;
use encore_core::negotiation::{NodeKey, WorkflowInstance};
use encore_core::types::{DbId, Timestamp};
use serde::Serialize;
use serde_json::Value;
use sqlx::FromRow;

/// A row from the `workflow_instances` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WorkflowInstanceRow {
    pub id: DbId,
    pub conversation_id: DbId,
    pub workflow_key: String,
    pub current_node_key: String,
    pub awaiting_user_id: Option<DbId>,
    pub round: i32,
    pub max_rounds: i32,
    pub locked: bool,
    pub context: Value,
    /// Incremented on every committed transition.
    pub version: i64,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl WorkflowInstanceRow {
    /// Convert the stored row into the engine's instance type.
    pub fn to_instance(&self) -> Result<WorkflowInstance, CoreError> {
        Ok(WorkflowInstance {
            current_node_key: NodeKey::from_str_db(&self.current_node_key)?,
            awaiting_user_id: self.awaiting_user_id,
            round: self.round,
            max_rounds: self.max_rounds,
            locked: self.locked,
            context: self.context.as_object().cloned().unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn row(node: &str) -> WorkflowInstanceRow {
        WorkflowInstanceRow {
            id: 1,
            conversation_id: 2,
            workflow_key: "booking_negotiation_v1".to_string(),
            current_node_key: node.to_string(),
            awaiting_user_id: Some(7),
            round: 1,
            max_rounds: 3,
            locked: false,
            context: json!({ "source": "web" }),
            version: 4,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_to_instance() {
        let instance = row("AWAITING_ARTIST").to_instance().unwrap();
        assert_eq!(instance.current_node_key, NodeKey::AwaitingArtist);
        assert_eq!(instance.awaiting_user_id, Some(7));
        assert_eq!(instance.round, 1);
        assert_eq!(instance.context.get("source"), Some(&json!("web")));
    }

    #[test]
    fn test_unknown_node_is_an_error() {
        assert!(row("NEGOTIATING").to_instance().is_err());
    }
}
