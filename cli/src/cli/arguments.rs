use anyhow::Result;
use clap::{Parser, Subcommand};
use hostpass::hosts::restore_from_backup;
use hostpass::{Config, HostsPaths};
use log::{info, warn};
use std::path::PathBuf;

pub const DEFAULT_CONFIG_PATH: &str = "./hostpass.json";

#[derive(Parser, Debug, Clone)]
#[command(name = "hostpass", about, author, version, long_about = None, propagate_version = true)]
pub struct HostpassArguments {
    #[arg(short = 'c', long = "config", default_value = DEFAULT_CONFIG_PATH, help = "Path to the JSON rule file")]
    pub(crate) config_path: PathBuf,
    #[arg(short = 'v', long = "verbose", help = "Enable verbose logging")]
    pub(crate) verbose: bool,
    #[arg(long = "hosts-file", help = "Hosts file to redirect instead of the system one")]
    pub(crate) hosts_file: Option<PathBuf>,
    #[command(subcommand)]
    pub(crate) command: Option<HostpassCommands>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum HostpassCommands {
    #[clap(name = "check", about = "Validate the configuration and list the rules it produces")]
    Check,
    #[clap(name = "restore", about = "Put a leftover hosts backup back in place and exit")]
    Restore,
}

impl HostpassArguments {
    /// Hosts file in effect: the command line wins over the config file, which wins over the system path.
    pub fn hosts_paths(&self, config: Option<&Config>) -> HostsPaths {
        match self.hosts_file.clone().or_else(|| config.and_then(|c| c.get_hosts_file().cloned())) {
            Some(path) => HostsPaths::new(path),
            None => HostsPaths::system(),
        }
    }

    /// Runs a one-shot subcommand. Returns `true` when one was handled and the process should exit.
    pub async fn handle_arguments(&self) -> Result<bool> {
        let Some(command) = &self.command else {
            return Ok(false);
        };
        match command {
            HostpassCommands::Check => {
                let config = Config::try_load(&self.config_path).await?;
                let rules = config.to_rules()?;
                println!("\x1b[1;36m{}\x1b[0m: {} rule(s)", config.get_path().display(), rules.len());
                for rule in &rules {
                    println!("  {}", rule);
                }
                println!("hosts file: {}", self.hosts_paths(Some(&config)).hosts().display());
            }
            HostpassCommands::Restore => {
                // The config is optional here so a broken config never blocks recovery.
                let config = match Config::try_load(&self.config_path).await {
                    Ok(config) => Some(config),
                    Err(e) => {
                        warn!("{}", e);
                        None
                    }
                };
                let paths = self.hosts_paths(config.as_ref());
                if restore_from_backup(&paths)? {
                    info!("Restored {}", paths.hosts().display());
                }
            }
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = HostpassArguments::try_parse_from(["hostpass"]).unwrap();
        assert_eq!(args.config_path, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert!(!args.verbose);
        assert!(args.hosts_file.is_none());
        assert!(args.command.is_none());
    }

    #[test]
    fn test_subcommands_and_flags() {
        let args = HostpassArguments::try_parse_from(["hostpass", "-v", "-c", "rules.json", "--hosts-file", "/tmp/hosts", "check"]).unwrap();
        assert!(args.verbose);
        assert_eq!(args.config_path, PathBuf::from("rules.json"));
        assert!(matches!(args.command, Some(HostpassCommands::Check)));

        let args = HostpassArguments::try_parse_from(["hostpass", "restore"]).unwrap();
        assert!(matches!(args.command, Some(HostpassCommands::Restore)));
    }

    #[test]
    fn test_hosts_file_precedence() {
        let mut config = Config::new("hostpass.json");
        config.set_hosts_file(PathBuf::from("/from/config"));

        let args = HostpassArguments::try_parse_from(["hostpass"]).unwrap();
        assert_eq!(args.hosts_paths(Some(&config)).hosts(), PathBuf::from("/from/config").as_path());
        assert_eq!(args.hosts_paths(None).hosts(), HostsPaths::system().hosts());

        let args = HostpassArguments::try_parse_from(["hostpass", "--hosts-file", "/from/cli"]).unwrap();
        assert_eq!(args.hosts_paths(Some(&config)).hosts(), PathBuf::from("/from/cli").as_path());
    }

    #[test]
    fn test_unknown_subcommand_is_rejected() {
        assert!(HostpassArguments::try_parse_from(["hostpass", "routes"]).is_err());
    }
}
