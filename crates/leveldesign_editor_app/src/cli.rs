// SPDX-License-Identifier: MIT OR Apache-2.0
//! Command line definitions.

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use leveldesign_editor_graph::{EnemyType, Slot};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "leveldesign_editor",
    version,
    about = "Author level design graphs: rooms, exits and enemy placements"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Project directory holding the settings file and the assets root
    #[arg(long, value_name = "DIR", default_value = ".", global = true)]
    pub project: PathBuf,

    /// Settings file (default: <PROJECT>/leveldesign.ron)
    #[arg(long, value_name = "PATH", global = true)]
    pub settings: Option<PathBuf>,

    /// More log output (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a new level design with a level node and a start room
    New {
        /// Level design name
        name: String,
        /// Name of the level node
        #[arg(long)]
        level_name: Option<String>,
        /// Replace an existing design with the same name
        #[arg(long)]
        force: bool,
    },

    /// Print a level design
    Show {
        /// Level design name
        name: String,
    },

    /// List stored level designs
    List,

    /// Add a room behind an exit of an existing room
    AddRoom {
        /// Level design name
        name: String,
        /// Room the new room is reached from
        #[arg(long)]
        from: String,
        /// Exit of the source room
        #[arg(long, value_enum)]
        exit: ExitArg,
        /// Name of the new room
        #[arg(long)]
        room_name: String,
        /// Prefab asset spawned for the room
        #[arg(long)]
        prefab: Option<String>,
        /// Mark the new room as an ending point
        #[arg(long)]
        ending: bool,
    },

    /// Place an enemy in a room
    AddEnemy {
        /// Level design name
        name: String,
        /// Room the enemy is placed in
        #[arg(long)]
        room: String,
        /// Enemy archetype
        #[arg(long, value_enum, default_value = "test-enemy1")]
        enemy_type: EnemyTypeArg,
    },

    /// Remove a room and its links
    Remove {
        /// Level design name
        name: String,
        /// Room to remove
        #[arg(long)]
        node: String,
    },

    /// Copy a room and paste it next to the original
    Duplicate {
        /// Level design name
        name: String,
        /// Room to duplicate
        #[arg(long)]
        node: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ExitArg {
    Top,
    Right,
    Bottom,
}

impl From<ExitArg> for Slot {
    fn from(exit: ExitArg) -> Self {
        match exit {
            ExitArg::Top => Slot::Top,
            ExitArg::Right => Slot::Right,
            ExitArg::Bottom => Slot::Bottom,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub enum EnemyTypeArg {
    #[value(name = "test-enemy1")]
    TestEnemy1,
    #[value(name = "test-enemy2")]
    TestEnemy2,
    #[value(name = "test-enemy3")]
    TestEnemy3,
    #[value(name = "test-enemy4")]
    TestEnemy4,
    #[value(name = "test-enemy5")]
    TestEnemy5,
}

impl From<EnemyTypeArg> for EnemyType {
    fn from(arg: EnemyTypeArg) -> Self {
        match arg {
            EnemyTypeArg::TestEnemy1 => EnemyType::TestEnemy1,
            EnemyTypeArg::TestEnemy2 => EnemyType::TestEnemy2,
            EnemyTypeArg::TestEnemy3 => EnemyType::TestEnemy3,
            EnemyTypeArg::TestEnemy4 => EnemyType::TestEnemy4,
            EnemyTypeArg::TestEnemy5 => EnemyType::TestEnemy5,
        }
    }
}
