//! Command dispatch: one intent per invocation against the hierarchy service.

use std::io;
use std::path::PathBuf;

use clap::CommandFactory;
use clap_complete::{generate, Shell};
use tracing::{debug, instrument};

use crate::application::services::HierarchyService;
use crate::cli::args::{Cli, Commands, CompanyCommands, ConfigCommands};
use crate::cli::output;
use crate::cli::render::{lock_lines, TreeNodeConvert};
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{EntityNode, Level};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};
use crate::infrastructure::InfraError;
use crate::util::path::expand_path;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Config { command }) => cmd_config(command),
        Some(Commands::Completion { shell }) => {
            cmd_completion(*shell);
            Ok(())
        }
        Some(command) => {
            let container = ServiceContainer::new(load_settings(cli)?);
            let mut svc = container.hierarchy()?;
            run(command, &mut svc)
        }
        None => Cli::command()
            .print_help()
            .map_err(|e| InfraError::io("print help", e).into()),
    }
}

fn current_dir() -> CliResult<PathBuf> {
    std::env::current_dir().map_err(|e| InfraError::io("resolve working directory", e).into())
}

/// Layered settings with the global CLI flags applied on top.
fn load_settings(cli: &Cli) -> CliResult<Settings> {
    let cwd = current_dir()?;
    let mut settings = Settings::load(Some(&cwd))?;
    if let Some(data) = &cli.data {
        settings.data_file = expand_path(data);
    }
    if cli.no_samples {
        settings.include_samples = false;
    }
    debug!("settings: {:?}", settings);
    Ok(settings)
}

fn run(command: &Commands, svc: &mut HierarchyService) -> CliResult<()> {
    match command {
        Commands::Tree { forest, json } => cmd_tree(svc, *forest, *json),
        Commands::List => {
            cmd_list(svc);
            Ok(())
        }
        Commands::Validate { strict } => cmd_validate(svc, *strict),
        Commands::Company { command } => match command {
            CompanyCommands::Create { details } => {
                let index = svc.create_forest(details.clone().into())?;
                output::action("Created", &format!("{} (forest {})", details.name.trim(), index));
                Ok(())
            }
            CompanyCommands::Edit { forest, details } => {
                let name = svc.forest(*forest)?.company_name().to_string();
                svc.begin_edit(*forest, Level::Company, &name)?;
                svc.update_company(*forest, details.clone().into())?;
                output::action("Updated", &name);
                Ok(())
            }
        },
        Commands::Add { forest, level } => {
            let row = svc.add(*forest, *level)?;
            output::action("Added", &format!("pending {} row {}", level, row));
            Ok(())
        }
        Commands::Submit {
            forest,
            level,
            index,
            details,
        } => {
            svc.submit(*forest, *level, *index, details.clone().into())?;
            output::action("Submitted", &format!("{} '{}'", level, details.name.trim()));
            Ok(())
        }
        Commands::Edit {
            forest,
            level,
            record,
            details,
        } => {
            svc.begin_edit(*forest, *level, record)?;
            svc.update_details(*forest, *level, record, details.clone().into())?;
            output::action("Updated", &format!("{} '{}'", level, record));
            Ok(())
        }
        Commands::Rename {
            forest,
            level,
            old,
            new,
        } => {
            svc.rename(*forest, *level, old, new)?;
            output::action("Renamed", &format!("{} '{}' -> '{}'", level, old, new.trim()));
            Ok(())
        }
        Commands::Delete {
            forest,
            level,
            name,
        } => {
            svc.delete(*forest, *level, name)?;
            output::action("Deleted", &format!("{} '{}' and its subtree", level, name));
            Ok(())
        }
        Commands::Discard {
            forest,
            level,
            index,
        } => {
            svc.discard(*forest, *level, *index)?;
            output::action("Discarded", &format!("pending {} row {}", level, index));
            Ok(())
        }
        Commands::Status { forest } => cmd_status(svc, *forest),
        Commands::Config { .. } | Commands::Completion { .. } => Err(CliError::Usage(
            "command does not use the forest store".to_string(),
        )),
    }
}

#[instrument(skip(svc))]
fn cmd_tree(svc: &HierarchyService, forest: Option<usize>, json: bool) -> CliResult<()> {
    let trees: Vec<EntityNode> = match forest {
        Some(index) => vec![svc.tree(index)?],
        None => svc.trees(),
    };

    if json {
        let rendered = serde_json::to_string_pretty(&trees)
            .map_err(|e| InfraError::serde("render trees", e))?;
        output::info(&rendered);
        return Ok(());
    }

    if trees.is_empty() {
        output::warning("no forests stored");
    }
    for tree in &trees {
        output::info(&tree.to_tree_string());
        if tree.is_error() {
            output::warning("forest could not be built, see `entitree validate`");
        }
    }
    Ok(())
}

fn cmd_list(svc: &HierarchyService) {
    for (index, forest) in svc.forests().iter().enumerate() {
        output::info(&format!(
            "{:>3}  {}  ({} records below the company)",
            index,
            forest.company_name(),
            forest.unit_count()
        ));
    }
    if !svc.unreadable().is_empty() {
        output::warning(&format!(
            "{} stored entries could not be read; they are kept in the data file",
            svc.unreadable().len()
        ));
    }
}

#[instrument(skip(svc))]
fn cmd_validate(svc: &HierarchyService, strict: bool) -> CliResult<()> {
    let report = svc.validate(strict);
    if report.is_clean() {
        output::success(&format!("{} forests, no issues", report.forests.len()));
        return Ok(());
    }

    for issue in &report.collection {
        output::failure(issue);
    }
    for forest in report.forests.iter().filter(|f| !f.issues.is_empty()) {
        output::header(&forest.company);
        for issue in &forest.issues {
            output::failure(issue);
        }
    }
    Err(CliError::ValidationFailed(report.issue_count()))
}

fn cmd_status(svc: &HierarchyService, forest: Option<usize>) -> CliResult<()> {
    let indices: Vec<usize> = match forest {
        Some(index) => vec![index],
        None => (0..svc.forests().len()).collect(),
    };
    for index in indices {
        let view = svc.lock_view(index)?;
        output::header(&view.company);
        for line in lock_lines(&view) {
            output::detail(&line);
        }
    }
    Ok(())
}

fn cmd_config(command: &ConfigCommands) -> CliResult<()> {
    let cwd = current_dir()?;
    match command {
        ConfigCommands::Show => {
            let settings = Settings::load(Some(&cwd))?;
            output::info(&settings.to_toml()?);
            Ok(())
        }
        ConfigCommands::Init { global } => {
            let path = if *global {
                global_config_path().ok_or_else(|| {
                    CliError::Usage("cannot determine global config directory".to_string())
                })?
            } else {
                local_config_path(&cwd)
            };
            let fs = RealFileSystem;
            if fs.exists(&path) {
                return Err(CliError::Usage(format!(
                    "config already exists: {}",
                    path.display()
                )));
            }
            fs.ensure_parent(&path)
                .and_then(|_| fs.write(&path, &Settings::template()))
                .map_err(|e| InfraError::io(format!("write {}", path.display()), e))?;
            output::action("Created", &path.display());
            Ok(())
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(path) => output::info(&format!("global: {}", path.display())),
                None => output::warning("global config directory unavailable"),
            }
            output::info(&format!("local:  {}", local_config_path(&cwd).display()));
            Ok(())
        }
    }
}

fn cmd_completion(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
