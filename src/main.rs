//! ClinicScribe CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use clinic_scribe::cli::{
    app::{run_process, run_record, run_redact, ProcessOptions, RecordOptions, EXIT_ERROR},
    args::{Cli, Commands},
    config_cmd::handle_config_command,
    presenter::Presenter,
};
use clinic_scribe::infrastructure::XdgConfigStore;

#[tokio::main(flavor = "multi_thread", worker_threads = 2)]
async fn main() -> ExitCode {
    // Diagnostics go to stderr and never include transcript content
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Record {
            booking_id,
            max_duration,
            no_upload,
            auto_process,
            output,
        } => {
            run_record(RecordOptions {
                booking_id,
                max_duration,
                no_upload,
                auto_process,
                output,
            })
            .await
        }
        Commands::Process {
            file,
            booking_id,
            language,
            session_type,
            reidentify,
        } => {
            run_process(ProcessOptions {
                file,
                booking_id,
                language,
                session_type,
                reidentify,
            })
            .await
        }
        Commands::Redact { file, show_map } => run_redact(file, show_map).await,
        Commands::Config { action } => {
            let presenter = Presenter::new();
            let store = XdgConfigStore::new();
            if let Err(e) = handle_config_command(action, &store, &presenter).await {
                presenter.error(&e.to_string());
                return ExitCode::from(EXIT_ERROR);
            }
            ExitCode::SUCCESS
        }
    }
}
