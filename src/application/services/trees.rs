//! Tree session service: CRUD, selection and manual tree commands
//!
//! All tree algorithms run server-side; this service only forwards commands
//! and lays out the returned snapshots.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, info, instrument};

use crate::application::api::{ApiClient, MessageResponse};
use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::validation::validate_tree_name;
use crate::domain::{
    layout_tree, Direction, LayoutSpacing, SearchOutcome, Traversal, TraversalKind, TreeLayout,
    TreeRef, TreeSession,
};

pub struct TreeService {
    api: Arc<ApiClient>,
}

impl TreeService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    pub fn list(&self) -> ApplicationResult<Vec<TreeSession>> {
        self.api.get("/trees")
    }

    #[instrument(skip(self))]
    pub fn create(&self, name: &str) -> ApplicationResult<TreeSession> {
        let name = validate_tree_name(name)?;
        let tree: TreeSession = self.api.post("/trees", &json!({ "name": name }))?;
        info!("created tree {} ({})", tree.name, tree.id);
        Ok(tree)
    }

    pub fn get(&self, tree_id: i64) -> ApplicationResult<TreeSession> {
        self.api.get(&format!("/trees/{}", tree_id))
    }

    #[instrument(skip(self))]
    pub fn rename(&self, tree_id: i64, name: &str) -> ApplicationResult<TreeSession> {
        let name = validate_tree_name(name)?;
        let tree: TreeSession = self
            .api
            .put(&format!("/trees/{}", tree_id), &json!({ "name": name }))?;
        self.api.update_session(|s| {
            if let Some(current) = s.current_tree.as_mut().filter(|c| c.id == tree_id) {
                current.name = tree.name.clone();
            }
        })?;
        Ok(tree)
    }

    /// Delete a tree; deleting the selected tree clears the selection.
    #[instrument(skip(self))]
    pub fn delete(&self, tree_id: i64) -> ApplicationResult<()> {
        let _: MessageResponse = self.api.delete(&format!("/trees/{}", tree_id))?;
        self.api.update_session(|s| {
            if s.current_tree.as_ref().is_some_and(|c| c.id == tree_id) {
                s.current_tree = None;
            }
        })?;
        info!("deleted tree {}", tree_id);
        Ok(())
    }

    /// Fetch a tree and make it the default target of node and chat commands.
    pub fn select(&self, tree_id: i64) -> ApplicationResult<TreeSession> {
        let tree = self.get(tree_id)?;
        let selected = TreeRef {
            id: tree.id,
            name: tree.name.clone(),
        };
        self.api.update_session(|s| s.current_tree = Some(selected))?;
        debug!("selected tree {}", tree.id);
        Ok(tree)
    }

    pub fn current(&self) -> ApplicationResult<TreeRef> {
        self.api
            .session()?
            .current_tree
            .ok_or(ApplicationError::NoTreeSelected)
    }

    /// Explicit id wins; otherwise fall back to the selected tree.
    pub fn resolve(&self, tree_id: Option<i64>) -> ApplicationResult<i64> {
        match tree_id {
            Some(id) => Ok(id),
            None => self.current().map(|t| t.id),
        }
    }

    /// Insert `new_value` under `parent_value`; the parent may be omitted for an empty tree.
    #[instrument(skip(self))]
    pub fn insert(
        &self,
        tree_id: i64,
        parent_value: Option<i64>,
        new_value: i64,
        direction: Direction,
    ) -> ApplicationResult<TreeSession> {
        self.api.post(
            &format!("/trees/{}/insert", tree_id),
            &json!({
                "parent_value": parent_value,
                "new_value": new_value,
                "direction": direction,
            }),
        )
    }

    #[instrument(skip(self))]
    pub fn delete_node(&self, tree_id: i64, value: i64) -> ApplicationResult<TreeSession> {
        self.api
            .post(&format!("/trees/{}/delete", tree_id), &json!({ "value": value }))
    }

    #[instrument(skip(self))]
    pub fn update_node(&self, tree_id: i64, node_id: i64, new_value: i64) -> ApplicationResult<TreeSession> {
        self.api.post(
            &format!("/trees/{}/update", tree_id),
            &json!({ "node_id": node_id, "new_value": new_value }),
        )
    }

    pub fn search(&self, tree_id: i64, value: i64) -> ApplicationResult<SearchOutcome> {
        self.api
            .post(&format!("/trees/{}/search", tree_id), &json!({ "value": value }))
    }

    pub fn traversal(&self, tree_id: i64, kind: TraversalKind) -> ApplicationResult<Vec<i64>> {
        let traversal: Traversal = self
            .api
            .get(&format!("/trees/{}/traversal?type={}", tree_id, kind))?;
        Ok(traversal.order)
    }

    #[instrument(skip(self))]
    pub fn reset(&self, tree_id: i64) -> ApplicationResult<()> {
        let _: MessageResponse = self.api.post_empty(&format!("/trees/{}/reset", tree_id))?;
        Ok(())
    }

    /// Fetch a tree and compute its diagram layout.
    pub fn layout(&self, tree_id: i64, spacing: LayoutSpacing) -> ApplicationResult<(TreeSession, TreeLayout)> {
        let tree = self.get(tree_id)?;
        let layout = layout_tree(tree.tree_data.as_ref(), spacing);
        Ok((tree, layout))
    }
}
