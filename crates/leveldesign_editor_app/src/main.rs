// SPDX-License-Identifier: MIT OR Apache-2.0
//! Level design editor - command line front end.
//!
//! Creates, inspects and edits level design graphs stored under the
//! project's assets root. Every editing command loads the design, applies
//! one edit and saves it back under the same name.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Command};
use commands::{load_settings, room_data, CommandContext, CommandError};
use leveldesign_editor_graph::FileStore;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "leveldesign_editor_graph={level},leveldesign_editor_app={level}"
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<(), CommandError> {
    let settings_path = cli
        .settings
        .clone()
        .unwrap_or_else(|| cli.project.join(leveldesign_editor_graph::settings::SETTINGS_FILE_NAME));
    let settings = load_settings(&settings_path)?;

    let store: FileStore = settings.file_store(&cli.project);
    tracing::debug!("Level designs in {}", store.folder().display());
    let mut ctx = CommandContext::new(settings, store);

    match cli.command {
        Command::New { name, level_name, force } => {
            ctx.new_design(&name, level_name.as_deref(), force)?;
            println!("Created {name}");
        }
        Command::Show { name } => {
            print!("{}", ctx.show(&name)?);
        }
        Command::List => {
            for name in ctx.list() {
                println!("{name}");
            }
        }
        Command::AddRoom { name, from, exit, room_name, prefab, ending } => {
            let room = room_data(&room_name, prefab.as_deref(), ending);
            ctx.add_room(&name, &from, exit.into(), room)?;
            println!("Added room {room_name:?} behind {from:?}");
        }
        Command::AddEnemy { name, room, enemy_type } => {
            ctx.add_enemy(&name, &room, enemy_type.into())?;
            println!("Placed enemy in {room:?}");
        }
        Command::Remove { name, node } => {
            ctx.remove(&name, &node)?;
            println!("Removed {node:?}");
        }
        Command::Duplicate { name, node } => {
            let pasted = ctx.duplicate(&name, &node)?;
            println!("Pasted {} node(s)", pasted.len());
        }
    }
    Ok(())
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    tracing::debug!("Project directory {}", cli.project.display());

    if let Err(e) = run(cli) {
        tracing::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
