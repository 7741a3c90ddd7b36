//! Mutation parameters
//!
//! Request shapes for the mutation pipeline's node operations, shared by the
//! HTTP layer and the store mirror. Config payloads stay untyped JSON here and
//! are validated against the node kind inside the pipeline.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::models::{NodeConfig, NodeId, NodeKind, ValidationError};

/// Create a node under an existing parent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateNodeParams {
    pub parent_id: NodeId,
    #[serde(rename = "type")]
    pub node_type: NodeKind,
    #[serde(default)]
    pub config: Value,
    /// Position among the new siblings; appends when absent or past the end
    #[serde(default)]
    pub index: Option<usize>,
}

impl CreateNodeParams {
    pub fn new(parent_id: NodeId, node_type: NodeKind, config: Value) -> Self {
        Self {
            parent_id,
            node_type,
            config,
            index: None,
        }
    }

    pub fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Parse and validate the config payload for `node_type`
    pub fn parse_config(&self) -> Result<NodeConfig, ValidationError> {
        NodeConfig::from_value(self.node_type, self.config.clone())
    }
}

/// Move a node under a new parent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveNodeParams {
    pub new_parent_id: NodeId,
    #[serde(default)]
    pub index: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_params_wire_format() {
        let params: CreateNodeParams = serde_json::from_value(json!({
            "parentId": "root",
            "type": "PDFViewer",
            "config": { "src": "/cv.pdf" },
            "index": 0
        }))
        .unwrap();
        assert_eq!(params.node_type, NodeKind::PdfViewer);
        assert_eq!(params.index, Some(0));
        assert_eq!(params.parse_config().unwrap().kind(), NodeKind::PdfViewer);
    }

    #[test]
    fn test_create_params_config_mismatch() {
        let params = CreateNodeParams::new(
            NodeId::from("root"),
            NodeKind::Title,
            json!({ "content": "wrong field" }),
        );
        assert!(params.parse_config().is_err());
    }
}
