//! wgtun daemon - Manage the OS service hosting a WireGuard tunnel.

use std::env;
use std::process::ExitCode;
use std::sync::Arc;

use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wgtun_daemon::commands::tunnel::TunnelSession;
use wgtun_daemon::commands::{CommandParams, CommandRegistry, CommandResult, ExecutionContext};
use wgtun_daemon::config::Settings;
use wgtun_daemon::lifecycle::{ServiceController, ServiceStage, ServiceWorker};
use wgtun_daemon::scm;

const VERSION: &str = env!("CARGO_PKG_VERSION");
const NAME: &str = env!("CARGO_PKG_NAME");

/// Action requested on the command line.
enum Action {
    Start { config_file: String },
    Stop,
    Status,
    Watch,
    NativeInit,
    GenerateKeyPair,
}

fn main() -> ExitCode {
    // Parse command line arguments (simple std::env approach)
    let args: Vec<String> = env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return ExitCode::SUCCESS;
    }

    if args.iter().any(|a| a == "--version" || a == "-V") {
        println!("{} {}", NAME, VERSION);
        return ExitCode::SUCCESS;
    }

    let action = match get_action(&args) {
        Some(action) => action,
        None => {
            print_help();
            return ExitCode::FAILURE;
        }
    };

    // Load configuration, falling back to built-in defaults
    let settings = match get_config_path(&args) {
        Some(path) => match Settings::load(&path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("Error loading configuration: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => Settings::default(),
    };

    // Initialize logging based on configuration
    if let Err(e) = init_logging(&settings) {
        eprintln!("Error initializing logging: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Starting {} v{}", NAME, VERSION);
    info!("Service name: {}", settings.service.name);

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!(error = %e, "Failed to create Tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(async_main(settings, action)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Daemon failed");
            ExitCode::FAILURE
        }
    }
}

/// Async main function.
async fn async_main(settings: Settings, action: Action) -> Result<(), Box<dyn std::error::Error>> {
    let service_name = settings.service.name.clone();
    let session = Arc::new(TunnelSession::new(scm::system_manager(), settings));
    let registry = CommandRegistry::new(Arc::clone(&session));

    session.register_listener(Arc::new(|stage: ServiceStage| {
        info!(stage = %stage, "Tunnel stage");
    }));

    dispatch(
        &registry,
        "tunnel.initialize",
        serde_json::json!({ "service_name": service_name }),
    )
    .await?;

    match action {
        Action::Start { config_file } => {
            let config = tokio::fs::read_to_string(&config_file).await.map_err(|e| {
                format!("Failed to read tunnel config '{}': {}", config_file, e)
            })?;
            dispatch(
                &registry,
                "tunnel.start",
                serde_json::json!({ "wg_quick_config": config }),
            )
            .await
        }
        Action::Stop => dispatch(&registry, "tunnel.stop", serde_json::json!({})).await,
        Action::Status => dispatch(&registry, "tunnel.stage", serde_json::json!({})).await,
        Action::Watch => watch(session.controller()?).await,
        Action::NativeInit => {
            dispatch(&registry, "tunnel.native_init", serde_json::json!({})).await
        }
        Action::GenerateKeyPair => {
            dispatch(&registry, "tunnel.generate_key_pair", serde_json::json!({})).await
        }
    }
}

/// Run a command on the blocking pool and print its result as JSON.
async fn dispatch(
    registry: &CommandRegistry,
    command: &'static str,
    params: serde_json::Value,
) -> Result<(), Box<dyn std::error::Error>> {
    let ctx = ExecutionContext::now(command);
    let registry = registry.clone();

    // Dispatch using spawn_blocking: lifecycle commands sleep and poll
    let result = tokio::task::spawn_blocking(move || {
        registry.dispatch(&ctx, command, CommandParams::new(params))
    })
    .await?;

    let (output, failed) = match result {
        Ok(result) => (result, false),
        Err(e) => (CommandResult::from_error(&e), true),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);

    if failed {
        return Err(output
            .error_message
            .unwrap_or_else(|| format!("{} failed", command))
            .into());
    }
    Ok(())
}

/// Log every stage change until Ctrl+C.
async fn watch(controller: Arc<ServiceController>) -> Result<(), Box<dyn std::error::Error>> {
    let interval = controller.timing().stop_poll_interval;
    let worker = ServiceWorker::new(controller);
    let mut ticker = tokio::time::interval(interval);
    let mut last: Option<ServiceStage> = None;

    info!(service = %worker.controller().service_name(), "Watching tunnel service");

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let stage = worker.status().await?;
                if last != Some(stage) {
                    println!("{}", stage);
                    last = Some(stage);
                }
            }
            result = signal::ctrl_c() => {
                result?;
                info!("Interrupted, stopping watch");
                return Ok(());
            }
        }
    }
}

/// Print help message.
fn print_help() {
    println!(
        r#"{} {}
Manage the OS service hosting a WireGuard tunnel.

USAGE:
    {} [OPTIONS] <COMMAND>

COMMANDS:
    start <CONFIG_FILE>    Write the wg-quick config and start the tunnel service
    stop                   Stop the tunnel service
    status                 Print the current tunnel stage
    watch                  Print stage changes until interrupted
    native-init            Stop and disable the packet forwarding service
    genkey                 Generate a WireGuard key pair

OPTIONS:
    -c, --config <PATH>    Path to configuration file
    -h, --help             Print help information
    -V, --version          Print version information
"#,
        NAME, VERSION, NAME
    );
}

/// Get configuration file path from command line arguments.
fn get_config_path(args: &[String]) -> Option<String> {
    for (i, arg) in args.iter().enumerate() {
        if (arg == "--config" || arg == "-c") && i + 1 < args.len() {
            return Some(args[i + 1].clone());
        }
        if let Some(path) = arg.strip_prefix("--config=") {
            return Some(path.to_string());
        }
    }
    None
}

/// Get the requested action, skipping options and their values.
fn get_action(args: &[String]) -> Option<Action> {
    let mut positional = Vec::new();
    let mut iter = args.iter().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--config" || arg == "-c" {
            iter.next();
        } else if !arg.starts_with('-') {
            positional.push(arg.as_str());
        }
    }

    match positional.as_slice() {
        ["start", config_file] => Some(Action::Start {
            config_file: config_file.to_string(),
        }),
        ["stop"] => Some(Action::Stop),
        ["status"] => Some(Action::Status),
        ["watch"] => Some(Action::Watch),
        ["native-init"] => Some(Action::NativeInit),
        ["genkey"] => Some(Action::GenerateKeyPair),
        _ => None,
    }
}

/// Initialize logging based on settings.
fn init_logging(settings: &Settings) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&settings.logging.level));

    match settings.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            // Default to pretty format
            tracing_subscriber::registry()
                .with(env_filter)
                .with(fmt::layer().pretty().with_writer(std::io::stderr))
                .init();
        }
    }

    Ok(())
}
