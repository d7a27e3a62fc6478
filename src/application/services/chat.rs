//! Chat assistant service: send, history, clear and transcript export

use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use tracing::{debug, instrument};

use crate::application::api::{ApiClient, MessageResponse};
use crate::application::error_ext::IoResultExt;
use crate::application::ApplicationResult;
use crate::domain::chat::prepare_message;
use crate::domain::{ChatExport, ChatMessage, ChatReply, HistoryEntry, Sender};
use crate::infrastructure::traits::FileSystem;

/// One round trip: what the user sent and what the assistant answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exchange {
    pub user: ChatMessage,
    pub bot: ChatMessage,
}

pub struct ChatService {
    api: Arc<ApiClient>,
    fs: Arc<dyn FileSystem>,
}

impl ChatService {
    pub fn new(api: Arc<ApiClient>, fs: Arc<dyn FileSystem>) -> Self {
        Self { api, fs }
    }

    #[instrument(skip(self, message))]
    pub fn send(&self, tree_id: i64, message: &str) -> ApplicationResult<Exchange> {
        let message = prepare_message(message)?;
        let user = ChatMessage::new(Sender::User, message.clone());
        let reply: ChatReply = self
            .api
            .post("/chat", &json!({ "tree_id": tree_id, "message": message }))?;
        let bot = ChatMessage::new(Sender::Bot, reply.text());
        Ok(Exchange { user, bot })
    }

    /// Stored history, expanded to alternating user/bot messages.
    pub fn history(&self, tree_id: i64) -> ApplicationResult<Vec<ChatMessage>> {
        let entries: Vec<HistoryEntry> = self.api.get(&format!("/chat/history/{}", tree_id))?;
        debug!("history: {} entries for tree {}", entries.len(), tree_id);
        let now = Utc::now();
        Ok(entries
            .into_iter()
            .flat_map(|e| e.into_messages(now))
            .collect())
    }

    pub fn clear(&self, tree_id: i64) -> ApplicationResult<()> {
        let _: MessageResponse = self.api.delete(&format!("/chat/history/{}", tree_id))?;
        Ok(())
    }

    /// Write a JSON transcript; fails when there is nothing to export.
    ///
    /// Without a path the file is named `chat-export-<millis>.json` in the working directory.
    #[instrument(skip(self, messages))]
    pub fn export(
        &self,
        tree_name: &str,
        messages: &[ChatMessage],
        path: Option<&Path>,
    ) -> ApplicationResult<(PathBuf, ChatExport)> {
        let export = ChatExport::new(tree_name, messages)?;
        let content = export.to_json()?;
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(export.file_name()));
        self.fs
            .ensure_parent(&path)
            .with_path_context("create export directory", &path)?;
        self.fs
            .write(&path, &content)
            .with_path_context("write chat export", &path)?;
        Ok((path, export))
    }

    pub fn import(&self, path: &Path) -> ApplicationResult<ChatExport> {
        let content = self
            .fs
            .read_to_string(path)
            .with_path_context("read chat export", path)?;
        Ok(ChatExport::from_json(&content)?)
    }
}
