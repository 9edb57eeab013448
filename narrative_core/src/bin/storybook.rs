//! Storybook CLI
//!
//! Validates a storybook set and shows assembled character stories.
//!
//! Usage:
//! - `storybook validate <dir> [--json]`
//! - `storybook show <dir> <code> [--json]`

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;
use tracing::{error, info};

use narrative_core::{DirectoryStore, StoryAssembler, Validator, World};

#[derive(Parser, Debug)]
#[command(name = "storybook")]
#[command(about = "Validate and explore an interlocking storybook set")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check the structural rules of a storybook set
    Validate {
        /// Path to the storybook directory
        dir: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print one character's assembled story with its node analysis
    Show {
        /// Path to the storybook directory
        dir: PathBuf,

        /// Two-letter character code
        code: String,

        /// Print the story as JSON instead of Markdown
        #[arg(long)]
        json: bool,
    },
}

fn load_world(dir: &Path) -> World {
    if !dir.is_dir() {
        error!("'{}' is not a directory", dir.display());
        process::exit(1);
    }

    info!("Loading storybook from: {}", dir.display());

    let store = match DirectoryStore::open(dir) {
        Ok(store) => store,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };

    info!("Building narrative graph for: {}", store.root().display());

    match World::build(&store) {
        Ok(world) => world,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> String {
    match serde_json::to_string_pretty(value) {
        Ok(json) => json,
        Err(e) => {
            error!("Failed to serialize output: {}", e);
            process::exit(1);
        }
    }
}

fn main() {
    narrative_core::init_logging();

    let args = Args::parse();

    match args.command {
        Command::Validate { dir, json } => {
            let world = load_world(&dir);
            let report = Validator::with_defaults(&world).validate();

            if json {
                println!("{}", to_json(&report));
            } else {
                print!("{}", report.to_text());
            }

            if !report.is_success() {
                process::exit(1);
            }
        }
        Command::Show { dir, code, json } => {
            let world = load_world(&dir);
            let assembler = StoryAssembler::new(&world);

            let story = match assembler.assemble(&code.to_lowercase()) {
                Ok(story) => story,
                Err(e) => {
                    error!("{}", e);
                    process::exit(1);
                }
            };

            if json {
                println!("{}", to_json(&story));
            } else {
                print!("{}", assembler.to_markdown(&story));
            }
        }
    }
}
