//! Command dispatch: maps parsed arguments onto services

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::ApplicationError;
use crate::cli::args::{
    AuthCommands, ChatCommands, Cli, Commands, ConfigCommands, NodeCommands, TreeCommands,
};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::validation::parse_node_value;
use crate::domain::{ChatMessage, Direction, TraversalKind, TreeSession};
use crate::infrastructure::traits::SelectionItem;
use crate::infrastructure::{InfraError, ServiceContainer};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        let mut cmd = Cli::command();
        cmd.print_help().map_err(|e| InfraError::io("print help", e))?;
        return Ok(());
    };

    if let Commands::Completion { shell } = command {
        completion(*shell);
        return Ok(());
    }

    let settings = load_settings(cli)?;
    if let Commands::Config { command } = command {
        return execute_config(&settings, command);
    }

    let container = ServiceContainer::new(settings);
    dispatch(&container, command)
}

/// Run a service-backed command against an explicitly constructed context.
pub fn dispatch(container: &ServiceContainer, command: &Commands) -> CliResult<()> {
    match command {
        Commands::Auth { command } => execute_auth(container, command),
        Commands::Tree { command } => execute_tree(container, command),
        Commands::Node { tree, command } => execute_node(container, *tree, command),
        Commands::Chat { tree, command } => execute_chat(container, *tree, command),
        Commands::Config { command } => execute_config(&container.settings, command),
        Commands::Completion { shell } => {
            completion(*shell);
            Ok(())
        }
    }
}

fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(url) = &cli.api_url {
        settings.api_url = crate::application::api::normalize_base_url(url);
    }
    debug!("settings: {:?}", settings);
    Ok(settings)
}

fn completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}

fn stdin_err(e: io::Error) -> CliError {
    InfraError::io("read stdin", e).into()
}

/// Ask unless `--yes` was given; prints a notice when declined.
fn confirmed(yes: bool, question: &str) -> CliResult<bool> {
    if yes {
        return Ok(true);
    }
    let ok = output::confirm(question).map_err(stdin_err)?;
    if !ok {
        output::notice("Aborted");
    }
    Ok(ok)
}

fn print_tree(tree: &TreeSession) {
    match &tree.tree_data {
        Some(root) => {
            output::header(&format!(
                "{} (#{}, {} nodes, depth {})",
                tree.name,
                tree.id,
                root.len(),
                root.depth()
            ));
            output::info(&root.to_display_tree());
        }
        None => {
            output::header(&format!("{} (#{})", tree.name, tree.id));
            output::detail(&"(empty tree)");
        }
    }
}

// ============================================================
// AUTH
// ============================================================

// credentials stay out of the span
#[instrument(skip_all)]
fn execute_auth(c: &ServiceContainer, command: &AuthCommands) -> CliResult<()> {
    match command {
        AuthCommands::Register { email, password } => {
            let (password, confirm) = match password {
                Some(p) => (p.clone(), p.clone()),
                None => (
                    output::read_line("Password:").map_err(stdin_err)?,
                    output::read_line("Confirm password:").map_err(stdin_err)?,
                ),
            };
            let user = c.auth.register(email, &password, &confirm)?;
            output::success(&format!("Registered and logged in as {}", user.email));
        }
        AuthCommands::Login { email, password } => {
            let password = match password {
                Some(p) => p.clone(),
                None => output::read_line("Password:").map_err(stdin_err)?,
            };
            let user = c.auth.login(email, &password)?;
            output::success(&format!("Logged in as {}", user.email));
        }
        AuthCommands::Logout => {
            c.auth.logout()?;
            output::success("Logged out");
        }
        AuthCommands::Whoami => {
            let user = c.auth.restore()?.ok_or(ApplicationError::NotLoggedIn)?;
            output::action("user", &format!("{} (id {})", user.email, user.id));
        }
        AuthCommands::Refresh => {
            c.auth.refresh()?;
            output::success("Token refreshed");
        }
        AuthCommands::Status => {
            let session = c.auth.session()?;
            output::header("Session");
            output::detail(&format!("service:  {}", c.api.base_url()));
            output::detail(&format!("session:  {}", c.settings.session_file.display()));
            match &session.user {
                Some(user) => output::detail(&format!("user:     {} (id {})", user.email, user.id)),
                None => output::detail(&"user:     -"),
            }
            output::detail(&format!(
                "tokens:   {}",
                match (session.is_authenticated(), session.refresh_token.is_some()) {
                    (true, true) => "access + refresh",
                    (true, false) => "access",
                    (false, true) => "refresh only",
                    (false, false) => "none",
                }
            ));
            match &session.current_tree {
                Some(tree) => output::detail(&format!("tree:     {} (#{})", tree.name, tree.id)),
                None => output::detail(&"tree:     -"),
            }
        }
    }
    Ok(())
}

// ============================================================
// TREES
// ============================================================

#[instrument(skip(c))]
fn execute_tree(c: &ServiceContainer, command: &TreeCommands) -> CliResult<()> {
    match command {
        TreeCommands::List => {
            let trees = c.trees.list()?;
            if trees.is_empty() {
                output::notice("No trees yet: create one with `treectl tree create <name>`");
                return Ok(());
            }
            let current = c.api.session()?.current_tree.map(|t| t.id);
            for tree in trees {
                let marker = if Some(tree.id) == current { "*" } else { " " };
                output::info(&format!(
                    "{} {:>4}  {}  ({} nodes)",
                    marker,
                    tree.id,
                    tree.name,
                    tree.node_count()
                ));
            }
        }
        TreeCommands::Create { name, select } => {
            let tree = c.trees.create(name)?;
            output::success(&format!("Created tree {} (#{})", tree.name, tree.id));
            if *select {
                c.trees.select(tree.id)?;
                output::action("selected", &tree.name);
            }
        }
        TreeCommands::Show { id } => {
            let tree = c.trees.get(c.trees.resolve(*id)?)?;
            print_tree(&tree);
        }
        TreeCommands::Select { id } => {
            let id = match id {
                Some(id) => *id,
                None => match pick_tree(c)? {
                    Some(id) => id,
                    None => {
                        output::notice("No tree selected");
                        return Ok(());
                    }
                },
            };
            let tree = c.trees.select(id)?;
            output::action("selected", &format!("{} (#{})", tree.name, tree.id));
        }
        TreeCommands::Rename { id, name } => {
            let tree = c.trees.rename(*id, name)?;
            output::success(&format!("Renamed tree #{} to {}", tree.id, tree.name));
        }
        TreeCommands::Delete { id, yes } => {
            if !confirmed(*yes, &format!("Delete tree #{}?", id))? {
                return Ok(());
            }
            c.trees.delete(*id)?;
            output::success(&format!("Deleted tree #{}", id));
        }
        TreeCommands::Layout { id, json } => {
            let (tree, layout) = c.trees.layout(c.trees.resolve(*id)?, c.settings.spacing())?;
            if *json {
                let text = serde_json::to_string_pretty(&layout).map_err(|source| {
                    ApplicationError::Decode {
                        context: "encode layout".into(),
                        source,
                    }
                })?;
                output::info(&text);
            } else {
                output::header(&format!("{} (#{})", tree.name, tree.id));
                if let Some(b) = layout.bounds() {
                    output::detail(&format!(
                        "extent: x {:.1}..{:.1}, y {:.1}..{:.1}",
                        b.min_x, b.max_x, b.min_y, b.max_y
                    ));
                }
                output::info(&output::format_layout(&layout, None));
            }
        }
    }
    Ok(())
}

/// Interactive tree picker; `None` when cancelled or nothing to pick.
fn pick_tree(c: &ServiceContainer) -> CliResult<Option<i64>> {
    let items: Vec<SelectionItem> = c
        .trees
        .list()?
        .into_iter()
        .map(|t| SelectionItem {
            display: format!("{:>4}  {}", t.id, t.name),
            value: t.id.to_string(),
        })
        .collect();

    let selected = c
        .selector
        .select_one(&items, "tree> ")
        .map_err(|message| InfraError::Selector { message })?;

    selected
        .map(|item| {
            item.value.parse::<i64>().map_err(|e| {
                CliError::from(InfraError::Selector {
                    message: format!("invalid tree id {}: {}", item.value, e),
                })
            })
        })
        .transpose()
}

// ============================================================
// NODES
// ============================================================

#[instrument(skip(c))]
fn execute_node(c: &ServiceContainer, tree: Option<i64>, command: &NodeCommands) -> CliResult<()> {
    let tree_id = c.trees.resolve(tree)?;
    match command {
        NodeCommands::Insert {
            value,
            parent,
            direction,
        } => node_insert(c, tree_id, value, parent.as_deref(), *direction)?,
        NodeCommands::Delete { value } => {
            let value = parse_node_value("node value", value)?;
            let tree = c.trees.delete_node(tree_id, value)?;
            output::success(&format!("Node {} deleted successfully!", value));
            print_tree(&tree);
        }
        NodeCommands::Update { node_id, new_value } => {
            let node_id = parse_node_value("node id", node_id)?;
            let new_value = parse_node_value("new value", new_value)?;
            let tree = c.trees.update_node(tree_id, node_id, new_value)?;
            output::success(&format!("Node {} updated to {}", node_id, new_value));
            print_tree(&tree);
        }
        NodeCommands::Search { value } => node_search(c, tree_id, value)?,
        NodeCommands::Traverse { kind } => node_traverse(c, tree_id, *kind)?,
        NodeCommands::Reset { yes } => {
            if !confirmed(*yes, "Delete all nodes? This cannot be undone.")? {
                return Ok(());
            }
            c.trees.reset(tree_id)?;
            output::success("Tree reset successfully!");
        }
    }
    Ok(())
}

fn node_insert(
    c: &ServiceContainer,
    tree_id: i64,
    value: &str,
    parent: Option<&str>,
    direction: Direction,
) -> CliResult<()> {
    let new_value = parse_node_value("new node value", value)?;
    let parent = parent
        .map(|p| parse_node_value("parent node value", p))
        .transpose()?;
    let tree = c.trees.insert(tree_id, parent, new_value, direction)?;
    output::success(&format!("Node {} inserted successfully!", new_value));
    print_tree(&tree);
    Ok(())
}

fn node_search(c: &ServiceContainer, tree_id: i64, value: &str) -> CliResult<()> {
    let value = parse_node_value("search value", value)?;
    let outcome = c.trees.search(tree_id, value)?;
    if !outcome.found {
        output::notice(&format!("Node {} not found in tree", value));
        return Ok(());
    }
    output::success(&format!("Node {} found!", value));
    let highlight = outcome.node_id.unwrap_or(value).to_string();
    let (_, layout) = c.trees.layout(tree_id, c.settings.spacing())?;
    output::info(&output::format_layout(&layout, Some(&highlight)));
    Ok(())
}

fn node_traverse(c: &ServiceContainer, tree_id: i64, kind: TraversalKind) -> CliResult<()> {
    let order = c.trees.traversal(tree_id, kind)?;
    if order.is_empty() {
        output::notice(&format!("No nodes for {} traversal", kind));
        return Ok(());
    }
    output::success(&format!("{} traversal completed!", kind.title()));
    output::info(&order.iter().join(" → "));
    Ok(())
}

// ============================================================
// CHAT
// ============================================================

#[instrument(skip(c))]
fn execute_chat(c: &ServiceContainer, tree: Option<i64>, command: &ChatCommands) -> CliResult<()> {
    // import reads a local file and needs no tree
    let tree_id = || c.trees.resolve(tree);
    match command {
        ChatCommands::Send { message } => {
            let exchange = c.chat.send(tree_id()?, &message.join(" "))?;
            output::chat_message(&exchange.user);
            output::chat_message(&exchange.bot);
        }
        ChatCommands::History => {
            let messages = c.chat.history(tree_id()?)?;
            if messages.is_empty() {
                output::notice("No messages yet");
            }
            messages.iter().for_each(output::chat_message);
        }
        ChatCommands::Clear { yes } => {
            let tree_id = tree_id()?;
            if !confirmed(*yes, "Clear chat history?")? {
                return Ok(());
            }
            c.chat.clear(tree_id)?;
            output::success("Chat history cleared");
        }
        ChatCommands::Export { output: path } => {
            let tree_id = tree_id()?;
            let messages = c.chat.history(tree_id)?;
            // a vanished tree still exports, as "Unknown Tree"
            let name = match c.trees.get(tree_id) {
                Ok(tree) => tree.name,
                Err(ApplicationError::Api { status: 404, .. }) => String::new(),
                Err(e) => return Err(e.into()),
            };
            let (path, export) = c.chat.export(&name, &messages, path.as_deref())?;
            output::success(&format!(
                "Exported {} messages to {}",
                export.messages.len(),
                path.display()
            ));
        }
        ChatCommands::Import { file } => {
            let export = c.chat.import(file)?;
            output::header(&format!(
                "{} (exported {})",
                export.tree,
                export.exported_at.to_rfc3339()
            ));
            export
                .messages
                .into_iter()
                .map(|m| ChatMessage::at(m.sender, m.text, m.timestamp))
                .for_each(|m| output::chat_message(&m));
        }
    }
    Ok(())
}

// ============================================================
// CONFIG
// ============================================================

fn execute_config(settings: &Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => output::info(&settings.to_toml()?),
        ConfigCommands::Init { force } => {
            let path = global_config_path().ok_or_else(|| {
                CliError::Usage("cannot determine config directory".into())
            })?;
            write_template(&path, *force)?;
            output::success(&format!("Created {}", path.display()));
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(p) => output::action("global", &p.display()),
                None => output::action("global", &"-"),
            }
            output::action("session", &settings.session_file.display());
        }
    }
    Ok(())
}

fn write_template(path: &Path, force: bool) -> CliResult<()> {
    if path.exists() && !force {
        return Err(CliError::Usage(format!(
            "{} exists (use --force to overwrite)",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| InfraError::io(format!("create {}", parent.display()), e))?;
    }
    std::fs::write(path, Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    Ok(())
}
