use clap::Parser;
use ferrofactor::{RandSource, SeededRandom, ThreadRandom};
use ferrofactor_bench::harness::{
    config::{BenchConfig, CliArgs, Command, GenerateConfig},
    streaming::{
        collector::TextSink,
        coordinator::{generate_prime_file, run_benchmark},
    },
    telemetry::init_telemetry,
};
use std::io;
use tokio::signal;
use tokio_util::sync::CancellationToken;

// Factoring units allocate a small vector per request from many threads at
// once.
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load from .env
    let _ = dotenvy::dotenv();
    let args = CliArgs::parse();

    match args.command {
        Command::Factor(args) => {
            let config = BenchConfig::try_from(args)?;
            init_telemetry()?;
            factor(config).await
        }
        Command::Generate(args) => {
            let config = GenerateConfig::try_from(args)?;
            init_telemetry()?;
            generate_prime_file(config).await?;
            Ok(())
        }
    }
}

async fn factor(config: BenchConfig) -> anyhow::Result<()> {
    if cfg!(debug_assertions) {
        #[cfg(feature = "tracing")]
        tracing::info!("Starting benchmark with full config: {:#?}", config);
    }

    let rand: Box<dyn RandSource + Send> = match config.seed {
        Some(seed) => Box::new(SeededRandom::new(seed)),
        None => Box::new(ThreadRandom),
    };

    let shutdown = CancellationToken::new();
    let signal_task = tokio::spawn(shutdown_signal(shutdown.clone()));

    let outcome = run_benchmark(config, rand, TextSink::new(io::stdout()), shutdown).await;
    signal_task.abort();

    let (_summary, _) = outcome?;
    #[cfg(feature = "tracing")]
    tracing::info!(
        "Issued {} requests, rendered {} results",
        _summary.issued,
        _summary.rendered
    );
    Ok(())
}

/// Cancels `shutdown` on Ctrl+C or SIGTERM so the run winds down as if its
/// deadline had passed.
async fn shutdown_signal(shutdown: CancellationToken) {
    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(_e) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("Failed to install SIGTERM handler: {_e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let ctrl_c = async {
        if let Err(_e) = signal::ctrl_c().await {
            #[cfg(feature = "tracing")]
            tracing::warn!("Failed to install Ctrl+C handler: {_e}");
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        () = ctrl_c => {
            #[cfg(feature = "tracing")]
            tracing::info!("Received Ctrl+C signal");
        },
        () = terminate => {
            #[cfg(feature = "tracing")]
            tracing::info!("Received SIGTERM signal");
        },
    }

    #[cfg(feature = "tracing")]
    tracing::info!("Shutdown signal received, finishing in-flight work...");
    shutdown.cancel();
}
