use clap::Parser;
use dhmm::{
    cli::{init_verbose, Cli, Command, FULL_VERSION},
    commands::{decode, evaluate, init},
    utils::{handle_error_and_exit, Result},
};

fn runner() -> Result<()> {
    let cli = Cli::parse();
    init_verbose(&cli);
    let subcommand_name = match cli.command {
        Command::Evaluate(_) => "evaluate",
        Command::Decode(_) => "decode",
        Command::Init(_) => "init",
    };

    log::info!(
        "Running {}-{} [{}]",
        env!("CARGO_PKG_NAME"),
        *FULL_VERSION,
        subcommand_name
    );
    match cli.command {
        Command::Evaluate(args) => evaluate::evaluate(args)?,
        Command::Decode(args) => decode::decode(args)?,
        Command::Init(args) => init::init(args)?,
    }
    log::info!("{} end", env!("CARGO_PKG_NAME"));
    Ok(())
}

fn main() {
    if let Err(e) = runner() {
        handle_error_and_exit(e);
    }
}
