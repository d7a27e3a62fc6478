//! Domain layer: wire types, layout and validation
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod chat;
pub mod error;
pub mod layout;
pub mod session;
pub mod tree;
pub mod validation;

pub use chat::{ChatExport, ChatMessage, ChatReply, HistoryEntry, Sender};
pub use error::DomainError;
pub use layout::{layout_tree, DisplayEdge, DisplayNode, LayoutSpacing, Position, TreeLayout};
pub use session::{Session, TreeRef, UserInfo};
pub use tree::{Direction, SearchOutcome, Traversal, TraversalKind, TreeNode, TreeSession};
