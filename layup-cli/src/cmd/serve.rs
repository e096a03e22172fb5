use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use layup_server::{PreviewConfig, PreviewServer};

use crate::cmd::build::add_path_args;
use crate::config::load_serve_config;

pub fn make_subcommand() -> Command {
    add_path_args(Command::new("serve"))
        .about("Preview the site, rendering source pages live per request")
        .arg(
            Arg::new("host")
                .long("host")
                .value_name("HOST")
                .help("Host to bind to")
                .default_value("127.0.0.1"),
        )
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .value_name("PORT")
                .help("Port to serve on")
                .default_value("8080"),
        )
        .arg(
            Arg::new("open")
                .long("open")
                .help("Open browser automatically")
                .action(clap::ArgAction::SetTrue),
        )
}

pub async fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let config = load_serve_config(args)?;

    let server = PreviewServer::new(PreviewConfig {
        host: config.serve.host.clone(),
        port: config.serve.port,
        open: config.serve.open,
        paths: config.paths,
    });

    server.run().await
}
