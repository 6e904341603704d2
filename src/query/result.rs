//! Result of query execution

use serde_json::Value;

use crate::tree::{render_tree, ResultTree};

/// Paging metadata reported by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageInfo {
    /// Offset of the first returned row
    pub offset: usize,
    /// Rows across all pages
    pub total_count: usize,
}

/// Result of executing a query
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionResult {
    /// Resources in result order with their nested sub-resources
    pub tree: ResultTree,
    /// Present when a page was requested
    pub page: Option<PageInfo>,
}

impl ExecutionResult {
    pub fn new(tree: ResultTree, page: Option<PageInfo>) -> Self {
        Self { tree, page }
    }

    /// Total matching rows, when a page was requested
    pub fn total_count(&self) -> Option<usize> {
        self.page.map(|p| p.total_count)
    }

    /// Returns true if no top-level resource matched
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Returns the number of top-level results
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Renders the result as JSON; paged results carry `itemTotal`
    pub fn to_json(&self) -> Value {
        let mut rendered = render_tree(&self.tree);
        if let (Some(page), Value::Object(map)) = (self.page, &mut rendered) {
            map.insert("itemTotal".into(), Value::from(page.total_count));
        }
        rendered
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::Resource;
    use serde_json::json;

    #[test]
    fn test_execution_result_empty() {
        let result = ExecutionResult::new(ResultTree::new(true), None);
        assert!(result.is_empty());
        assert_eq!(result.len(), 0);
        assert_eq!(result.total_count(), None);
        assert_eq!(result.to_json(), json!({"items": []}));
    }

    #[test]
    fn test_paged_json_carries_total() {
        let mut tree = ResultTree::new(true);
        tree.add_row(Resource::new("Host").with_property("Hosts/host_name", "h1"));
        let result = ExecutionResult::new(
            tree,
            Some(PageInfo {
                offset: 0,
                total_count: 7,
            }),
        );

        let json = result.to_json();
        assert_eq!(json["itemTotal"], json!(7));
        assert_eq!(json["items"][0]["Hosts"]["host_name"], json!("h1"));
        assert_eq!(result.total_count(), Some(7));
    }
}
