use std::{env, path::PathBuf};

use anyhow::{bail, Context};
use nhelper_config::ConfigManager;
use notion_helper::{init, server, utils::build_info};

enum Command {
    Serve,
    Version,
    WriteDefaultConfig,
    Help,
}

struct Options {
    command: Command,
    config_path: Option<PathBuf>,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> anyhow::Result<Options> {
    let mut options = Options {
        command: Command::Serve,
        config_path: None,
    };
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--version" | "-V" => options.command = Command::Version,
            "--help" | "-h" => options.command = Command::Help,
            "--write-default-config" => options.command = Command::WriteDefaultConfig,
            "--config" => {
                let path = args.next().context("--config needs a path")?;
                options.config_path = Some(PathBuf::from(path));
            }
            other => bail!("unknown argument `{other}`"),
        }
    }
    Ok(options)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let options = parse_args(env::args().skip(1))?;

    match options.command {
        Command::Version => {
            println!("{}", build_info::current().summary());
            return Ok(());
        }
        Command::Help => {
            print_usage();
            return Ok(());
        }
        Command::Serve | Command::WriteDefaultConfig => {}
    }

    if env::var("ENV").ok().as_deref() != Some("prod") {
        dotenvy::dotenv().ok();
    }
    init();

    let manager = options
        .config_path
        .map(ConfigManager::new)
        .unwrap_or_else(ConfigManager::default_location);

    if let Command::WriteDefaultConfig = options.command {
        let config = manager.load()?;
        manager.save(&config)?;
        println!("Wrote {}", manager.config_path().display());
        return Ok(());
    }

    let config = manager
        .load_with_env()
        .with_context(|| format!("loading {}", manager.config_path().display()))?;
    server::serve(&config).await
}

fn print_usage() {
    eprintln!(
        "Usage: notion_helper_server [options]\n\
         Options:\n  \
         --config <file.json>    configuration file\n  \
         --write-default-config  write the effective file configuration and exit\n  \
         --version               print build information\n  \
         --help                  show this message"
    );
}
