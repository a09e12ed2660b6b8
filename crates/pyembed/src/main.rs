//! pyembed CLI application
//!
//! Installs the Windows embeddable Python distribution into the runner tool
//! cache, evicts stale cached versions and publishes the install location.

// CLI binary needs to output to stdout/stderr
#![allow(clippy::print_stdout, clippy::print_stderr)]

use pyembed_cli::cli::{self, EXIT_INSTALL, EXIT_SIGINT};
use pyembed_cli::render::Renderer;
use pyembed_cli::tracing::{Level, TracingConfig, TracingFormat, init_tracing_with_events};

fn main() {
    // NOTE: tracing may be unusable during a panic, so the hook prints directly.
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with RUST_LOG=debug for more information.");
    }));

    let cli = cli::parse();

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            eprintln!("Failed to start async runtime: {e}");
            std::process::exit(EXIT_INSTALL);
        }
    };

    let exit_code = runtime.block_on(async {
        tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => EXIT_SIGINT,
            code = real_main(cli) => code,
        }
    });

    std::process::exit(exit_code);
}

async fn real_main(cli: cli::Cli) -> i32 {
    // The HTTP client is built without a default crypto provider.
    let _ = rustls::crypto::ring::default_provider().install_default();

    let level = Level::from(cli.level);
    let config = TracingConfig {
        format: if cli.json {
            TracingFormat::Json
        } else {
            TracingFormat::Compact
        },
        level,
    };

    let receiver = match init_tracing_with_events(&config) {
        Ok(receiver) => receiver,
        Err(e) => {
            eprintln!("{e:?}");
            return EXIT_INSTALL;
        }
    };
    let renderer =
        Renderer::for_mode(cli.json, cli.annotations, config.verbose()).spawn(receiver);

    let completion = pyembed_cli::execute(&cli).await;

    // Events go out first; the result line comes last.
    renderer.finish().await;
    completion.write(cli.json);
    completion.exit_code()
}
