use anyhow::Context;
use axum::{response::IntoResponse, routing::get, Router};
use clap::{Parser, Subcommand};
use prometheus::{Encoder, TextEncoder};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use smuctl::smu::status;
use smuctl::tuning::topology;
use smuctl::{
    CollectorConfig, CpuIdentity, DynSmuClient, HardwareAccess, LinuxPlatform, MsrAccess,
    PlatformConfig, SmuClient, SmuCollector, SmuMetricExporter, SmuctlError, TransportConfig,
};

#[derive(Parser, Debug)]
#[command(name = "smuctl")]
#[command(about = "AMD Zen SMU mailbox access and monitoring")]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[arg(long, help = "Pin CPUID execution to this CPU")]
    cpuid_cpu: Option<u32>,

    #[arg(long, default_value_t = 0, help = "CPU used for MSR reads")]
    msr_cpu: u32,

    #[arg(long, default_value_t = 1000, help = "Response register polls per transaction")]
    poll_budget: u32,

    #[arg(long, default_value_t = 0, help = "Pause between polls in microseconds")]
    poll_interval_us: u64,

    #[arg(long, default_value_t = 5000, help = "Mailbox lock timeout in milliseconds")]
    lock_timeout_ms: u64,

    #[arg(
        short,
        long,
        help = "Enable verbose logging (shows all SMU register reads/writes)"
    )]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Show CPU identity, SMU version and throttling state
    Info,

    /// Send an opcode without an argument and print the result
    Query {
        #[arg(value_parser = parse_u32)]
        opcode: u32,
    },

    /// Send an opcode with an argument and print the result
    Request {
        #[arg(value_parser = parse_u32)]
        opcode: u32,
        #[arg(value_parser = parse_u32)]
        argument: u32,
    },

    /// Describe an SMU response byte
    Status {
        #[arg(value_parser = parse_u8)]
        byte: u8,
    },

    /// Serve SMU state as Prometheus metrics
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        listen: SocketAddr,

        #[arg(long, default_value_t = 1, help = "Collection interval in seconds")]
        interval: u64,
    },
}

/// Accept decimal or 0x-prefixed hex
fn parse_u32(s: &str) -> std::result::Result<u32, String> {
    let s = s.trim();
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u32::from_str_radix(hex, 16),
        None => s.parse(),
    };
    parsed.map_err(|e| format!("invalid number '{s}': {e}"))
}

fn parse_u8(s: &str) -> std::result::Result<u8, String> {
    let value = parse_u32(s)?;
    u8::try_from(value).map_err(|_| format!("{value:#X} does not fit in a byte"))
}

struct AppState {
    exporter: Arc<SmuMetricExporter>,
}

async fn metrics_handler(
    axum::extract::State(state): axum::extract::State<Arc<AppState>>,
) -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    smuctl::gather_metrics!(buffer, encoder, state.exporter, "SMU");

    let content_type = encoder.format_type().to_string();
    (
        [("Content-Type", content_type)],
        String::from_utf8(buffer).unwrap_or_default(),
    )
}

fn check_permissions(msr_cpu: u32) {
    let pci_root = smuctl::common::pci::proc_bus_pci_root();
    if std::fs::metadata(pci_root).is_err() {
        eprintln!("\n⚠️  ERROR: Cannot access {pci_root}\n\nPCI configuration space is not exposed by procfs.\n");
        std::process::exit(1);
    }

    let msr_path = format!("/dev/cpu/{msr_cpu}/msr");
    if std::fs::metadata(&msr_path).is_err() {
        eprintln!("\n⚠️  WARNING: Cannot access {msr_path}\n\nThe MSR kernel module may not be loaded, patch level will read as 0.\nRun: sudo modprobe msr\n");
        return;
    }

    if let Err(e) = std::fs::File::open(&msr_path) {
        if e.kind() == std::io::ErrorKind::PermissionDenied {
            eprintln!("\n⚠️  ERROR: Permission denied accessing {msr_path}\n\nSMU access needs root: sudo smuctl ...\n");
            std::process::exit(1);
        }
    }
}

fn describe_failure(e: &SmuctlError) {
    if let Some(byte) = e.status() {
        eprintln!("SMU status 0x{:02X}: {}", byte, status::describe(byte));
    }
}

fn run_info(
    platform: Arc<dyn HardwareAccess>,
    transport_config: TransportConfig,
    msr_cpu: u32,
) -> anyhow::Result<()> {
    let identity: CpuIdentity = smuctl::detect(&*platform)?;

    println!("CPU:           {}", topology::cpu_name(&*platform));
    println!(
        "Family:        {} ({}), family 0x{:X} model 0x{:X}",
        identity.variant.name(),
        identity.variant.microarchitecture(),
        identity.family(),
        identity.model()
    );
    println!("Signature:     0x{:08X}", identity.signature);
    println!("Package type:  {}", identity.package_type);

    match topology::core_count(&*platform) {
        Ok(count) => println!(
            "Cores:         {} physical, {} logical",
            count.physical, count.logical
        ),
        Err(e) => tracing::warn!("Failed to read core count: {}", e),
    }

    match SmuClient::with_identity(Arc::clone(&platform), identity, transport_config) {
        Ok(client) => {
            let client = client.with_msr_cpu(msr_cpu);
            println!("SMU version:   {}", client.smu_version());
            println!("Patch level:   0x{:08X}", client.get_patch_level());
            println!("OC mode:       {}", client.get_oc_mode());
            match client.is_prochot_enabled() {
                Ok(enabled) => println!("PROCHOT:       {enabled}"),
                Err(e) => println!("PROCHOT:       unavailable ({e})"),
            }
        }
        Err(SmuctlError::UnsupportedVariant(variant)) => {
            tracing::warn!(
                "No SMU register map for {}, running in diagnostic mode",
                variant.name()
            );
            let patch_level = platform
                .read_msr_on(msr_cpu, smuctl_raw::msr::MSR_PATCH_LEVEL)
                .map(|(eax, _)| eax)
                .unwrap_or(0);
            println!("SMU version:   unsupported");
            println!("Patch level:   0x{patch_level:08X}");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

fn run_exchange(client: &DynSmuClient, opcode: u32, argument: Option<u32>) -> anyhow::Result<()> {
    let result = match argument {
        Some(argument) => client.request(opcode, argument),
        None => client.query(opcode),
    };

    match result {
        Ok(value) => {
            println!("0x{value:08X}");
            Ok(())
        }
        Err(e) => {
            describe_failure(&e);
            Err(e).with_context(|| format!("message 0x{opcode:X} failed"))
        }
    }
}

async fn shutdown_signal(cancel_token: CancellationToken) {
    tracing::info!("Installing signal handlers...");

    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => tracing::info!("Ctrl+C received!"),
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                tracing::info!("SIGTERM received!");
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::warn!("Shutdown triggered by Ctrl+C");
        },
        _ = terminate => {
            tracing::warn!("Shutdown triggered by SIGTERM");
        },
    }

    cancel_token.cancel();
    tracing::warn!("Cancellation token activated");
}

async fn serve(client: Arc<DynSmuClient>, listen: SocketAddr, interval: u64) -> anyhow::Result<()> {
    let collector = SmuCollector::new(
        client,
        CollectorConfig {
            interval: Duration::from_secs(interval),
        },
    )?;
    let exporter = collector.exporter();

    let cancel_token = CancellationToken::new();
    let collection_handle = collector.start(cancel_token.clone());

    let app = Router::new()
        .route("/metrics", get(metrics_handler))
        .with_state(Arc::new(AppState { exporter }));

    tracing::warn!("Starting HTTP server on {}", listen);
    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind {listen}"))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cancel_token))
        .await?;

    tracing::info!("Server shutdown complete, waiting for collection loop to finish...");
    if let Err(e) = collection_handle.await {
        tracing::error!("Collection loop panicked: {}", e);
    }

    tracing::info!("All tasks completed, exiting");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    if let Command::Status { byte } = args.command {
        println!("0x{:02X}: {}", byte, status::describe(byte));
        return Ok(());
    }

    check_permissions(args.msr_cpu);

    if !smuctl::common::cpuid::is_amd() {
        tracing::warn!("CPU vendor is not AuthenticAMD, SMU access will most likely fail");
    }

    let platform_config = PlatformConfig {
        cpuid_cpu: args.cpuid_cpu,
        msr_cpu: args.msr_cpu,
    };
    platform_config.validate()?;

    let transport_config = TransportConfig {
        poll_budget: args.poll_budget,
        poll_interval: Duration::from_micros(args.poll_interval_us),
        lock_timeout: Duration::from_millis(args.lock_timeout_ms),
    };
    transport_config.validate()?;

    let platform: Arc<dyn HardwareAccess> = Arc::new(LinuxPlatform::new(platform_config));

    if let Command::Info = args.command {
        return run_info(platform, transport_config, args.msr_cpu);
    }

    let client: DynSmuClient = SmuClient::new(platform, transport_config)
        .context("SMU access is unavailable on this CPU")?
        .with_msr_cpu(args.msr_cpu);

    match args.command {
        Command::Query { opcode } => run_exchange(&client, opcode, None),
        Command::Request { opcode, argument } => run_exchange(&client, opcode, Some(argument)),
        Command::Serve { listen, interval } => serve(Arc::new(client), listen, interval).await,
        Command::Info | Command::Status { .. } => Ok(()),
    }
}
