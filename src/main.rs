//! `reveal` - staged reveal presentation

use clap::Parser;
use tokio_util::sync::CancellationToken;

use reveal::cli::args::{Cli, Commands, OutputFormat};
use reveal::cli::commands;
use reveal::error::ExitCode;
use reveal::observability::{LogFormat, LogTarget, init_logging};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let target = log_target(&cli);
    let format = match cli.log_format {
        OutputFormat::Human => LogFormat::Human,
        OutputFormat::Json => LogFormat::Json,
    };
    if let Err(e) = init_logging(format, cli.verbose, cli.color, &target) {
        eprintln!("error: failed to open log file: {e}");
        std::process::exit(ExitCode::IO_ERROR);
    }

    let cancel = CancellationToken::new();

    // Spawn signal handler for graceful shutdown
    let token = cancel.clone();
    tokio::spawn(async move {
        let Ok(mut sigterm) =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
        else {
            tracing::warn!("failed to register SIGTERM handler");
            return;
        };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }

        tracing::info!("shutting down (signal again to force)");
        token.cancel();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => std::process::exit(ExitCode::INTERRUPTED),
            _ = sigterm.recv() => std::process::exit(ExitCode::TERMINATED),
        }
    });

    let result = commands::dispatch(cli, cancel).await;

    match result {
        Ok(()) => std::process::exit(ExitCode::SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

/// The terminal UI owns the screen, so its logs go to a file or nowhere.
fn log_target(cli: &Cli) -> LogTarget {
    if cli.quiet {
        return LogTarget::Discard;
    }
    match &cli.command {
        Commands::Run(args) => match (&args.log_file, args.headless) {
            (Some(path), _) => LogTarget::File(path.clone()),
            (None, true) => LogTarget::Stderr,
            (None, false) => LogTarget::Discard,
        },
        _ => LogTarget::Stderr,
    }
}
