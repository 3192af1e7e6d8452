use anyhow::Context;
use chrono::Datelike;
use clap::Parser;
use expense_tracker::args::{Args, Command};
use expense_tracker::remote::HttpRemote;
use expense_tracker::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().home().path();

    // Route to appropriate command handler
    let _: () = match args.command() {
        Command::Init(init_args) => {
            let year = init_args
                .year()
                .unwrap_or_else(|| chrono::Local::now().year());
            commands::init(
                home,
                year,
                init_args.rows(),
                init_args.remote_url(),
                init_args.sample(),
            )
            .await?
            .print()
        }

        Command::Show(show_args) => commands::show(Config::load(home).await?, show_args.month())
            .await?
            .print(),

        Command::Set(set_args) => commands::set(
            Config::load(home).await?,
            set_args.month(),
            set_args.row(),
            set_args.field(),
            set_args.value(),
        )
        .await?
        .print(),

        Command::Clear(clear_args) => commands::clear(
            Config::load(home).await?,
            clear_args.month(),
            clear_args.row(),
        )
        .await?
        .print(),

        Command::AddRow(add_args) => commands::add_row(Config::load(home).await?, add_args.month())
            .await?
            .print(),

        Command::Export(export_args) => commands::export(
            Config::load(home).await?,
            export_args.month(),
            export_args.format(),
            export_args.out(),
        )
        .await?
        .print(),

        Command::Import(import_args) => {
            commands::import(Config::load(home).await?, import_args.file())
                .await?
                .print()
        }

        Command::Push(push_args) => {
            let config = Config::load(home).await?;
            let mut remote = http_remote(&config)?;
            commands::push(config, &mut remote, push_args.month())
                .await?
                .print()
        }

        Command::Pull(pull_args) => {
            let config = Config::load(home).await?;
            let mut remote = http_remote(&config)?;
            commands::pull(config, &mut remote, pull_args.month())
                .await?
                .print()
        }

        Command::DeleteRemote(delete_args) => {
            let config = Config::load(home).await?;
            let mut remote = http_remote(&config)?;
            commands::delete_remote(config, &mut remote, delete_args.month())
                .await?
                .print()
        }
    };
    Ok(())
}

/// The remote record service named in the config.
fn http_remote(config: &Config) -> Result<HttpRemote> {
    let url = config.remote_url().with_context(|| {
        format!(
            "No remote_url is set in {}, add one to use the remote record service",
            config.config_path().display()
        )
    })?;
    Ok(HttpRemote::new(url))
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for the library and binary only.
            EnvFilter::new(format!(
                "expense_tracker={},{}={}",
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
