use modal_form::{app::demo::run_demo, config::Config, error::AppError, initialize_logging, App, AppResult};
use std::{env, process, time::{Duration, Instant}};
use tracing::{debug, info, warn};

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command line arguments first (before logging to avoid noise)
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
        process::exit(0);
    }

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        process::exit(0);
    }

    initialize_logging().map_err(|e| AppError::application(e.to_string()))?;
    let start_time = Instant::now();

    let demo_mode = args.iter().any(|a| a == "--demo")
        || env::var("MODAL_FORM_DEMO_MODE").is_ok()
        || env::var("TERM").unwrap_or_default().is_empty();

    if demo_mode {
        info!("Modal Form demo mode starting");
        run_demo_mode(start_time).await
    } else {
        info!("Modal Form starting");
        run_full_tui_mode(start_time).await
    }
}

async fn run_demo_mode(start_time: Instant) -> AppResult<()> {
    let config = match Config::load().await {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to load configuration: {}. Using defaults.", e);
            Config::default()
        }
    };
    info!("Configuration loaded: {}", config.app.name);

    let result = run_demo(config).await?;
    info!(
        "Demo finished in {:?} ({})",
        start_time.elapsed(),
        if result.is_some() { "submitted" } else { "cancelled" }
    );
    Ok(())
}

fn print_help() {
    println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    println!("{}", env!("CARGO_PKG_DESCRIPTION"));
    println!();
    println!("USAGE:");
    println!("    {} [OPTIONS]", env!("CARGO_PKG_NAME"));
    println!();
    println!("OPTIONS:");
    println!("    -h, --help       Print this help message and exit");
    println!("    -V, --version    Print version information and exit");
    println!("        --demo       Run a scripted session without a terminal UI");
    println!();
    println!("ENVIRONMENT:");
    println!("    MODAL_FORM_DEMO_MODE   Set to run in demo mode");
    println!("    MODAL_FORM_<SECTION>__<KEY>");
    println!("                           Override a config value, e.g.");
    println!("                           MODAL_FORM_MODAL__SUBMIT_DELAY_MS=0");
    println!("    RUST_LOG               Set logging level (debug, info, warn, error)");
    println!();
    println!("EXAMPLES:");
    println!("    {}              Start the interactive page", env!("CARGO_PKG_NAME"));
    println!("    {} --demo       Run the scripted demo", env!("CARGO_PKG_NAME"));
}

async fn run_full_tui_mode(start_time: Instant) -> AppResult<()> {
    match App::new().await {
        Ok(app) => {
            let startup_duration = start_time.elapsed();
            debug!("Application startup time: {:?}", startup_duration);

            if startup_duration > Duration::from_secs(1) {
                warn!("Startup time exceeded 1 second: {:?}", startup_duration);
            }

            match app.run().await {
                Ok(_) => {
                    info!("Modal Form terminated gracefully");
                    Ok(())
                }
                Err(e) => {
                    warn!("TUI mode failed: {}. Falling back to demo mode.", e);
                    warn!("Use 'modal-form --demo' to run in demo mode explicitly.");
                    run_demo_mode(start_time).await
                }
            }
        }
        Err(e) => {
            warn!("Failed to initialize TUI: {}. Running in demo mode.", e);
            run_demo_mode(start_time).await
        }
    }
}
