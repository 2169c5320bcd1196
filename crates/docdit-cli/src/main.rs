use std::sync::Arc;

use atty::Stream;
use clap::Parser;
use color_eyre::{eyre::eyre, Result};
use docdit_core::{
    CommandContext, DocditCommand, ExecutionOutcome, GlobalOptions, LogOptions, LogSession,
    SharedEffects, SystemEffects,
};

mod cli;
mod style;

use cli::{CommandCli, DocditCli};
use style::Style;

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = DocditCli::parse();
    let global = GlobalOptions {
        quiet: cli.quiet,
        verbose: cli.verbose,
        no_color: cli.no_color,
        base_dir: cli.base_dir.clone(),
    };

    let effects: SharedEffects = Arc::new(SystemEffects::new());
    let ctx = CommandContext::new(&global, effects).map_err(|err| eyre!("{err:?}"))?;
    let command = build_command(cli.command.as_ref());
    let style = Style::new(cli.no_color, atty::is(Stream::Stdout));

    let outcome = if ctx.base_dir().is_dir() {
        let session = LogSession::start(
            ctx.base_dir(),
            &LogOptions::from_global(&global, atty::is(Stream::Stdout)),
        )
        .map_err(|err| eyre!("{err:?}"))?;
        tracing::debug!(log = %session.path().display(), ?command, "dispatching");
        let outcome = docdit_core::execute(&ctx, &command).map_err(|err| eyre!("{err:?}"))?;
        tracing::info!("[*] finished: {}", outcome.message);
        drop(session);
        outcome
    } else {
        docdit_core::execute(&ctx, &command).map_err(|err| eyre!("{err:?}"))?
    };

    let code = emit_output(&cli, &style, &outcome);
    if code == 0 {
        Ok(())
    } else {
        std::process::exit(code);
    }
}

fn build_command(command: Option<&CommandCli>) -> DocditCommand {
    match command {
        None | Some(CommandCli::Setup) => DocditCommand::Setup,
        Some(CommandCli::Key(args)) => DocditCommand::Key {
            replace: args.replace,
        },
    }
}

fn emit_output(cli: &DocditCli, style: &Style, outcome: &ExecutionOutcome) -> i32 {
    let code = outcome.exit_code();
    if cli.quiet && code == 0 {
        return code;
    }
    let line = style.status(&outcome.status, &outcome.message);
    if code == 0 {
        println!("{line}");
    } else {
        eprintln!("{line}");
    }
    if let Some(hint) = outcome.hint() {
        if code == 0 {
            println!("{}", style.hint(hint));
        } else {
            eprintln!("{}", style.hint(hint));
        }
    }
    code
}
