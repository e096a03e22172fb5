use anyhow::Result;
use clap::Command;

mod cmd;
mod config;

fn cli() -> Command {
    Command::new("layup")
        .about("Render a tree of template pages through one shared layout")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(cmd::build::make_subcommand())
        .subcommand(cmd::serve::make_subcommand())
}

#[tokio::main]
async fn main() -> Result<()> {
    let matches = cli().get_matches();

    match matches.subcommand() {
        Some(("build", args)) => cmd::build::execute(args),
        Some(("serve", args)) => cmd::serve::execute(args).await,
        _ => unreachable!("subcommand is required"),
    }
}
