//! Command dispatch: one function per subcommand

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::CommandFactory;
use clap_complete::generate;
use colored::Colorize;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::{RunningAppsWatcher, RunningState};
use crate::cli::args::{Cli, Commands, ConfigCommands, IntentArg};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::domain::tree::{iter, path_to};
use crate::domain::{CommandId, CommandNode, DropIntent, ReorderOutcome, ICON_SIZES};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{
    Editor, EnvironmentEditor, SelectionItem, Selector, SkimSelector,
};
use crate::infrastructure::InfraError;
use crate::tree_traits::{node_label, TreeNodeConvert};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Ok(());
    };

    // Needs neither settings nor a document
    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let config_path = config_path(cli);
    let settings = Settings::load_from(config_path.as_deref())?;
    debug!("settings: {:?}", settings);
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Tree => cmd_tree(&container),
        Commands::Find { id } => cmd_find(&container, id),
        Commands::Level { id } => cmd_level(&container, id.as_deref()),
        Commands::Add { target, label, into } => {
            cmd_add(&container, target, label.as_deref(), into.as_deref())
        }
        Commands::AddGroup { label, into } => cmd_add_group(&container, label, into.as_deref()),
        Commands::Rename { id, label } => cmd_rename(&container, id, label),
        Commands::Move {
            drag,
            target,
            intent,
        } => cmd_move(&container, drag, target, *intent),
        Commands::Delete { id } => cmd_delete(&container, id),
        Commands::Open { id } => cmd_open(&container, id),
        Commands::Select => cmd_select(&container),
        Commands::Backfill => cmd_backfill(&container),
        Commands::Running { watch } => cmd_running(&container, *watch),
        Commands::Shortcut { accelerator } => cmd_shortcut(&container, accelerator.as_deref()),
        Commands::IconSize { index } => cmd_icon_size(&container, *index),
        Commands::Config { command } => cmd_config(&container, config_path, command),
        Commands::Completion { .. } => Ok(()),
    }
}

fn config_path(cli: &Cli) -> Option<PathBuf> {
    cli.config.clone().or_else(global_config_path)
}

// ============================================================
// Tree commands
// ============================================================

#[instrument(skip(container))]
fn cmd_tree(container: &ServiceContainer) -> CliResult<()> {
    let forest = container.commands.forest()?;
    output::info(&forest.to_tree_string());
    Ok(())
}

#[instrument(skip(container))]
fn cmd_find(container: &ServiceContainer, id: &str) -> CliResult<()> {
    let id = CommandId::from(id);
    let forest = container.commands.forest()?;
    let node = container.commands.find(&id)?;

    let path = path_to(&forest, &id).unwrap_or_default();
    output::header(&path.iter().join(" / "));
    output::detail(&format!("id:       {}", node.id));
    output::detail(&format!("kind:     {}", node.kind));
    if let Some(target) = &node.target {
        output::detail(&format!("target:   {}", target));
    }
    if let Some(identity) = &node.identity {
        output::detail(&format!("identity: {}", identity));
    }
    if let Some(icon) = node.icon.as_deref().and_then(|r| container.icons.resolve(r)) {
        output::detail(&format!("icon:     {}", icon.display()));
    }
    if node.is_group() {
        output::detail(&format!("children: {}", node.children().len()));
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_level(container: &ServiceContainer, id: Option<&str>) -> CliResult<()> {
    let id = id.map(CommandId::from);
    let level = container.commands.level(id.as_ref())?;
    for node in &level {
        output::info(&node_label(node));
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_add(
    container: &ServiceContainer,
    target: &str,
    label: Option<&str>,
    into: Option<&str>,
) -> CliResult<()> {
    let into = into.map(CommandId::from);
    let node = container
        .commands
        .add_command(target, label, into.as_ref())?;
    output::action("Added", &node_label(&node));
    if node.icon.is_none() {
        output::warning(&format!("no icon for {}", target));
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_add_group(container: &ServiceContainer, label: &str, into: Option<&str>) -> CliResult<()> {
    let into = into.map(CommandId::from);
    let node = container.commands.add_group(label, into.as_ref())?;
    output::action("Added", &node_label(&node));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_rename(container: &ServiceContainer, id: &str, label: &str) -> CliResult<()> {
    container.commands.rename(&CommandId::from(id), label)?;
    output::action("Renamed", &format!("{} -> {}", id, label));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_move(
    container: &ServiceContainer,
    drag: &str,
    target: &str,
    intent: IntentArg,
) -> CliResult<()> {
    let intent: DropIntent = intent.into();
    let outcome = container.commands.move_node(
        &CommandId::from(drag),
        &CommandId::from(target),
        intent,
    )?;

    match outcome {
        ReorderOutcome::Moved => output::success(&format!("moved {} {} {}", drag, intent, target)),
        ReorderOutcome::DragNotFound(id) => {
            output::warning(&format!("nothing moved: {} not found", id))
        }
        ReorderOutcome::TargetNotFound { node, restored, .. } => {
            let what = if restored { "kept in place" } else { "removed" };
            output::warning(&format!(
                "drop target {} not found: {} {}",
                target,
                node_label(&node),
                what
            ));
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_delete(container: &ServiceContainer, id: &str) -> CliResult<()> {
    let removed = container.commands.delete(&CommandId::from(id))?;
    output::action("Deleted", &node_label(&removed));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_open(container: &ServiceContainer, id: &str) -> CliResult<()> {
    let node = container.commands.launch(&CommandId::from(id))?;
    output::success(&format!("opened {}", node.label));
    Ok(())
}

#[instrument(skip(container))]
fn cmd_select(container: &ServiceContainer) -> CliResult<()> {
    let forest = container.commands.forest()?;
    let items: Vec<SelectionItem> = iter(&forest)
        .filter(|node| !node.is_group())
        .map(|node| SelectionItem {
            display: path_to(&forest, &node.id)
                .unwrap_or_default()
                .join(" / "),
            value: node.id.to_string(),
        })
        .collect();

    if items.is_empty() {
        output::warning("no commands to select");
        return Ok(());
    }

    let selected = SkimSelector
        .select_one(&items, "command> ")
        .map_err(|message| InfraError::Selector { message })?;
    match selected {
        Some(item) => cmd_open(container, &item.value),
        None => {
            debug!("selection cancelled");
            Ok(())
        }
    }
}

#[instrument(skip(container))]
fn cmd_backfill(container: &ServiceContainer) -> CliResult<()> {
    if container.commands.backfill_identities()? {
        output::success("identities updated");
    } else {
        output::info("nothing to update");
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_running(container: &ServiceContainer, watch: bool) -> CliResult<()> {
    if !watch {
        let forest = container.commands.forest()?;
        let state = container.running.snapshot(&forest)?;
        print_running(&forest, &state);
        return Ok(());
    }

    let interval = Duration::from_millis(container.running.config().poll_interval_ms);
    let mut watcher = RunningAppsWatcher::new();
    loop {
        // Reload so edits from other invocations show up
        let forest = container.commands.forest()?;
        if let Some(state) = watcher.poll(&container.running, &forest) {
            output::header(&format!("running ({} commands)", state.len()));
            print_running(&forest, &state);
        }
        std::thread::sleep(interval);
    }
}

fn print_running(forest: &[CommandNode], state: &RunningState) {
    for node in iter(forest).filter(|n| !n.is_group()) {
        let line = node_label(node);
        match state.get(&node.id) {
            Some(true) => output::success_detail(&line),
            _ => output::detail(&format!("  {}", line.dimmed())),
        }
    }
}

#[instrument(skip(container))]
fn cmd_shortcut(container: &ServiceContainer, accelerator: Option<&str>) -> CliResult<()> {
    match accelerator {
        Some(accelerator) => {
            container.commands.set_shortcut(accelerator)?;
            output::action("Shortcut", &accelerator);
        }
        None => {
            let document = container.commands.load()?;
            output::info(&document.shortcuts.toggle_command);
        }
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_icon_size(container: &ServiceContainer, index: Option<u8>) -> CliResult<()> {
    match index {
        Some(index) => {
            container.commands.set_icon_size(index)?;
            output::action(
                "Icon size",
                &format!("{} ({}px)", index, ICON_SIZES[usize::from(index)]),
            );
        }
        None => {
            let document = container.commands.load()?;
            let pixels = document
                .icon_pixels()
                .map(|px| format!("{}px", px))
                .unwrap_or_else(|| "out of range".into());
            output::info(&format!("{} ({})", document.icon_size, pixels));
        }
    }
    Ok(())
}

// ============================================================
// Config commands
// ============================================================

fn cmd_config(
    container: &ServiceContainer,
    config_path: Option<PathBuf>,
    command: &ConfigCommands,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { force } => {
            let path = require_config_path(config_path)?;
            config_init(container, &path, *force)
        }
        ConfigCommands::Path => {
            let config = config_path
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "(none)".into());
            output::detail(&format!("config:   {}", config));
            output::detail(&format!(
                "document: {}",
                container.store.location().display()
            ));
            output::detail(&format!("images:   {}", container.icons.images_dir().display()));
            Ok(())
        }
        ConfigCommands::Edit => {
            let path = require_config_path(config_path)?;
            if !container.fs.exists(&path) {
                config_init(container, &path, false)?;
            }
            EnvironmentEditor::new(container.settings.editor.as_str())
                .open(&path)
                .map_err(|e| InfraError::Editor {
                    message: e.to_string(),
                })?;
            Ok(())
        }
    }
}

fn require_config_path(config_path: Option<PathBuf>) -> CliResult<PathBuf> {
    config_path.ok_or_else(|| CliError::Usage("no config location; pass --config".into()))
}

#[instrument(skip(container))]
fn config_init(container: &ServiceContainer, path: &std::path::Path, force: bool) -> CliResult<()> {
    if container.fs.exists(path) && !force {
        return Err(CliError::Usage(format!(
            "{} exists (use --force to overwrite)",
            path.display()
        )));
    }
    container
        .fs
        .ensure_parent(path)
        .map_err(|e| InfraError::io(format!("create {}", path.display()), e))?;
    container
        .fs
        .write(path, &Settings::template())
        .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
    output::action("Created", &path.display());
    Ok(())
}
