mod cli;

use crate::cli::HostpassArguments;
use anyhow::Result;
use clap::Parser;
use hostpass::{Agent, Config};
use log::{LevelFilter, info, trace};

const BANNER: &str = r#"
 _               _
| |__   ___  ___| |_ _ __   __ _ ___ ___
| '_ \ / _ \/ __| __| '_ \ / _` / __/ __|
| | | | (_) \__ \ |_| |_) | (_| \__ \__ \
|_| |_|\___/|___/\__| .__/ \__,_|___/___/
                    |_|"#;

fn banner(started_at: &str) -> String {
    format!("{}\n\nversion: v{}\nauthors: {}\ntime: {}\n", BANNER, env!("CARGO_PKG_VERSION"), env!("CARGO_PKG_AUTHORS"), started_at)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = HostpassArguments::parse();
    pretty_env_logger::env_logger::builder()
        .format_timestamp(None)
        .filter_level(if args.verbose { LevelFilter::Trace } else { LevelFilter::Info })
        .init();

    if args.handle_arguments().await? {
        return Ok(());
    }

    println!("{}", banner(&chrono::Local::now().to_rfc3339()));
    trace!("Arguments: {:#?}", args);

    let config = Config::try_load(&args.config_path).await?;
    trace!("Config: {}", config);
    let rules = config.to_rules()?;
    let hosts = args.hosts_paths(Some(&config));
    info!("Using hosts file {}", hosts.hosts().display());

    Agent::new(rules, hosts).run().await?;
    info!("Bye");
    Ok(())
}
