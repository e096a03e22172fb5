use anyhow::Result;
use clap::{Arg, ArgMatches, Command};
use layup_core::build_site;

use crate::config::load_build_config;

pub fn add_path_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("layout")
                .short('l')
                .long("layout")
                .value_name("FILE")
                .help("Root layout file every page is rendered through")
                .default_value("base.html"),
        )
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .value_name("DIR")
                .help("Source directory containing template pages")
                .default_value("source"),
        )
        .arg(
            Arg::new("static")
                .long("static")
                .value_name("DIR")
                .help("Directory of assets copied and served verbatim")
                .default_value("static"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("DIR")
                .help("Output directory for the generated site")
                .default_value("docs"),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file")
                .default_value("./layup.toml"),
        )
}

pub fn make_subcommand() -> Command {
    add_path_args(Command::new("build"))
        .about("Render every source page through the layout into the output directory")
}

pub fn execute(args: &ArgMatches) -> Result<()> {
    // Load cascading configuration
    let config = load_build_config(args)?;

    let report = build_site(&config.paths)?;

    println!(
        "Rendered {} pages and copied {} static files into {}",
        report.rendered.len(),
        report.copied,
        config.paths.output.display()
    );

    if report.has_failures() {
        for (path, err) in &report.failures {
            eprintln!("  {}: {}", path.display(), err);
        }
        anyhow::bail!("{} pages failed to render", report.failures.len());
    }

    Ok(())
}
