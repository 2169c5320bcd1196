use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

pub const DOCDIT_HELP_TEMPLATE: &str =
    "{before-help}\nUsage:\n    {usage}\n\nCommands:\n{subcommands}\n\nGlobal options:\n{options}\n";

pub const DOCDIT_BEFORE_HELP: &str = concat!(
    "docdit ",
    env!("CARGO_PKG_VERSION"),
    " – Create Doc DIT workspace installer\n\n",
    "  setup            Create .venv, install packages, scaffold folders, write installation_info.txt.\n",
    "  key              Show or replace the OpenAI API key stored in .env.\n",
);

#[derive(Parser, Debug)]
#[command(
    name = "docdit",
    author,
    version,
    disable_help_subcommand = true,
    before_help = DOCDIT_BEFORE_HELP,
    help_template = DOCDIT_HELP_TEMPLATE
)]
pub struct DocditCli {
    #[arg(
        long,
        value_name = "DIR",
        help = "Workspace folder to provision (defaults to DOCDIT_BASE_DIR or the current folder)",
        global = true
    )]
    pub base_dir: Option<PathBuf>,
    #[arg(
        short,
        long,
        help = "Only print warnings and errors (the log file still gets everything)",
        global = true
    )]
    pub quiet: bool,
    #[arg(short, long, action = ArgAction::Count, help = "Increase console logging (-vv reaches trace)", global = true)]
    pub verbose: u8,
    #[arg(long, help = "Disable colored human output", global = true)]
    pub no_color: bool,
    #[command(subcommand)]
    pub command: Option<CommandCli>,
}

#[derive(Subcommand, Debug)]
pub enum CommandCli {
    #[command(
        about = "Provision the workspace (default when no command is given).",
        override_usage = "docdit setup [--base-dir DIR]"
    )]
    Setup,
    #[command(
        about = "Show the stored OpenAI API key and optionally replace it.",
        override_usage = "docdit key [--replace]"
    )]
    Key(KeyArgs),
}

#[derive(Args, Debug)]
pub struct KeyArgs {
    #[arg(long, help = "Prompt for a new key without asking first")]
    pub replace: bool,
}
