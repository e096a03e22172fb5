use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment, File};
use layup_core::SitePaths;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Complete configuration that merges CLI args, env vars, config files, and defaults
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LayupConfig {
    /// Preview server configuration
    #[serde(default)]
    pub serve: ServeConfig,
    /// Site paths (from layup-core)
    #[serde(flatten)]
    pub paths: SitePaths,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServeConfig {
    /// Host for the preview server
    pub host: String,
    /// Port for the preview server
    pub port: u16,
    /// Open browser automatically
    pub open: bool,
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            open: false,
        }
    }
}

impl Default for LayupConfig {
    fn default() -> Self {
        Self {
            serve: ServeConfig::default(),
            paths: SitePaths::default(),
        }
    }
}

impl LayupConfig {
    /// Load configuration with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (LAYUP_*)
    /// 3. Configuration file
    /// 4. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let config_file = args
            .get_one::<String>("config")
            .unwrap_or(&"./layup.toml".to_string())
            .clone();

        let mut builder = ConfigBuilder::builder();

        // 1. Start with defaults
        let defaults = Self::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        // 2. Add configuration file if it exists
        if Path::new(&config_file).exists() {
            builder = builder.add_source(File::with_name(&config_file.replace(".toml", "")));
        }

        // 3. Add environment variables with LAYUP_ prefix
        builder = builder.add_source(
            Environment::with_prefix("LAYUP")
                .prefix_separator("_")
                .separator("__"), // Use double underscore for nested keys
        );

        // 4. Override with CLI arguments (highest priority). Only values
        // the user actually passed count; clap's defaults must not
        // shadow the config file or environment.
        let mut cli_overrides = std::collections::HashMap::new();

        if let Some(layout) = passed_on_cli(args, "layout") {
            cli_overrides.insert("layout".to_string(), layout);
        }
        if let Some(source) = passed_on_cli(args, "source") {
            cli_overrides.insert("source".to_string(), source);
        }
        if let Some(static_dir) = passed_on_cli(args, "static") {
            cli_overrides.insert("static".to_string(), static_dir);
        }
        if let Some(output) = passed_on_cli(args, "output") {
            cli_overrides.insert("output".to_string(), output);
        }
        if let Some(host) = passed_on_cli(args, "host") {
            cli_overrides.insert("serve.host".to_string(), host);
        }
        if let Some(port) = passed_on_cli(args, "port") {
            if port.parse::<u16>().is_ok() {
                cli_overrides.insert("serve.port".to_string(), port);
            }
        }
        if args.try_get_one::<bool>("open").unwrap_or(None) == Some(&true) {
            cli_overrides.insert("serve.open".to_string(), "true".to_string());
        }

        if !cli_overrides.is_empty() {
            builder = builder.add_source(config::Config::try_from(&cli_overrides)?);
        }

        // Build and deserialize
        let config = builder.build()?;
        let layup_config: LayupConfig = config.try_deserialize()?;

        Ok(layup_config)
    }
}

/// A string argument's value, but only when the user typed it. Args
/// not defined for the current subcommand yield `None` rather than an
/// error.
fn passed_on_cli(args: &ArgMatches, id: &str) -> Option<String> {
    match args.try_get_one::<String>(id) {
        Ok(Some(value))
            if args.value_source(id) == Some(clap::parser::ValueSource::CommandLine) =>
        {
            Some(value.clone())
        }
        _ => None,
    }
}

/// Load configuration specifically for build commands
pub fn load_build_config(args: &ArgMatches) -> Result<LayupConfig> {
    LayupConfig::load(args)
}

/// Load configuration specifically for serve commands
pub fn load_serve_config(args: &ArgMatches) -> Result<LayupConfig> {
    LayupConfig::load(args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, Command};
    use std::path::PathBuf;

    #[test]
    fn test_default_config() {
        let config = LayupConfig::default();
        assert_eq!(config.paths.layout, PathBuf::from("base.html"));
        assert_eq!(config.paths.source, PathBuf::from("source"));
        assert_eq!(config.paths.static_dir, PathBuf::from("static"));
        assert_eq!(config.paths.output, PathBuf::from("docs"));
        assert_eq!(config.serve.port, 8080);
    }

    #[test]
    fn test_cli_args_override() {
        let app = Command::new("test")
            .arg(Arg::new("layout").long("layout").value_name("FILE"))
            .arg(Arg::new("source").long("source").value_name("DIR"))
            .arg(Arg::new("output").long("output").value_name("DIR"))
            .arg(Arg::new("config").long("config").value_name("FILE"));

        let matches = app
            .try_get_matches_from(vec![
                "test",
                "--source",
                "/custom/source",
                "--output",
                "/custom/output",
            ])
            .unwrap();

        let config = LayupConfig::load(&matches).unwrap();
        assert_eq!(config.paths.source, PathBuf::from("/custom/source"));
        assert_eq!(config.paths.output, PathBuf::from("/custom/output"));
        // Should still have defaults for non-overridden values
        assert_eq!(config.paths.layout, PathBuf::from("base.html"));
    }
}
