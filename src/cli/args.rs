//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::domain::{Direction, TraversalKind};

/// Terminal client for binary-tree sessions: auth, manual tree edits, diagram layout, and chat
#[derive(Parser, Debug)]
#[command(name = "treectl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Explicit config file (layered over the global config)
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Override the service base URL
    #[arg(long, global = true, env = "TREECTL_API_URL")]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register, log in and manage the session
    Auth {
        #[command(subcommand)]
        command: AuthCommands,
    },

    /// Manage tree sessions
    Tree {
        #[command(subcommand)]
        command: TreeCommands,
    },

    /// Edit and query nodes of a tree
    Node {
        /// Tree id (default: selected tree)
        #[arg(short, long, global = true)]
        tree: Option<i64>,

        #[command(subcommand)]
        command: NodeCommands,
    },

    /// Talk to the tree assistant
    Chat {
        /// Tree id (default: selected tree)
        #[arg(short, long, global = true)]
        tree: Option<i64>,

        #[command(subcommand)]
        command: ChatCommands,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum AuthCommands {
    /// Create an account and log in
    Register {
        /// Account email
        email: String,
        /// Password (prompted if omitted)
        #[arg(short, long, env = "TREECTL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Log in with email and password
    Login {
        /// Account email
        email: String,
        /// Password (prompted if omitted)
        #[arg(short, long, env = "TREECTL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// Forget tokens and tree selection
    Logout,

    /// Show the current user (verifies the session, logs out if it was rejected)
    Whoami,

    /// Exchange the refresh token for a new token pair
    Refresh,

    /// Show local session state without contacting the service
    Status,
}

#[derive(Subcommand, Debug)]
pub enum TreeCommands {
    /// List tree sessions
    List,

    /// Create a tree session
    Create {
        /// Session name
        name: String,
        /// Select the new tree
        #[arg(short, long)]
        select: bool,
    },

    /// Print a tree
    Show {
        /// Tree id (default: selected tree)
        id: Option<i64>,
    },

    /// Select the default tree (interactive if no id)
    Select {
        /// Tree id
        id: Option<i64>,
    },

    /// Rename a tree session
    Rename {
        /// Tree id
        id: i64,
        /// New name
        name: String,
    },

    /// Delete a tree session
    Delete {
        /// Tree id
        id: i64,
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Print the diagram layout (positions and edges)
    Layout {
        /// Tree id (default: selected tree)
        id: Option<i64>,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum NodeCommands {
    /// Insert a node under a parent
    Insert {
        /// New node value
        value: String,
        /// Parent node value (omit for an empty tree)
        #[arg(short, long)]
        parent: Option<String>,
        /// Attach as left or right child
        #[arg(short, long, default_value_t = Direction::Left)]
        direction: Direction,
    },

    /// Delete a node by value
    Delete {
        /// Node value
        value: String,
    },

    /// Change a node's value
    Update {
        /// Node id (its current value)
        node_id: String,
        /// New value
        new_value: String,
    },

    /// Search for a value
    Search {
        /// Value to find
        value: String,
    },

    /// Print a traversal order
    Traverse {
        /// preorder, inorder or postorder
        #[arg(default_value_t = TraversalKind::Inorder)]
        kind: TraversalKind,
    },

    /// Delete all nodes
    Reset {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ChatCommands {
    /// Send a message to the assistant
    Send {
        /// Message text
        #[arg(num_args = 1.., required = true)]
        message: Vec<String>,
    },

    /// Show the stored conversation
    History,

    /// Delete the stored conversation
    Clear {
        /// Skip confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Export the conversation as JSON
    Export {
        /// Output file (default: chat-export-<millis>.json)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Print a previously exported conversation
    Import {
        /// Export file
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show merged config
    Show,

    /// Create global config template
    Init {
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config and session paths
    Path,
}
