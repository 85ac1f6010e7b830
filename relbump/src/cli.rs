// relbump/src/cli.rs
//! Defines the command-line argument structure using clap.
use clap::{ArgAction, Parser, Subcommand};
use relbump_common::error::Result;

// Module declarations
pub mod show;
pub mod update;
pub mod verify;

use crate::cli::show::Show;
use crate::cli::update::UpdateArgs;
use crate::cli::verify::Verify;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, name = "relbump", bin_name = "relbump")]
#[command(propagate_version = true)]
pub struct CliArgs {
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    Update(UpdateArgs),
    Verify(Verify),
    Show(Show),
}

impl Command {
    pub async fn run(&self) -> Result<()> {
        match self {
            Self::Update(command) => command.run().await,
            Self::Verify(command) => command.run().await,
            Self::Show(command) => command.run().await,
        }
    }
}
