mod config;

/// Version injected at compile time via SYNERGOS_VERSION env var (set by CI/CD),
/// or the crate version for local builds.
pub const VERSION: &str = match option_env!("SYNERGOS_VERSION") {
    Some(v) => v,
    None => env!("CARGO_PKG_VERSION"),
};

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use config::Config;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use synergos::grid::format_grid_error;
use synergos::resource::{endpoint_table, ResourceTask};
use synergos::{Driver, GridError, NodeDescriptor, NodeRegistry, Operation, ResourceKind, Role, ScopeKey, ScopeKeys};
use tracing::Level;
use tracing_subscriber::fmt::writer::MakeWriterExt;

/// Command-line client for a Synergos grid
#[derive(Parser, Debug)]
#[command(name = "synergos", version = VERSION, about, long_about = None)]
struct Args {
    /// Grid host
    #[arg(long)]
    host: Option<String>,

    /// Grid REST port
    #[arg(long)]
    port: Option<u16>,

    /// Connect over https; `--secure false` overrides a saved default
    #[arg(long, num_args = 0..=1, default_missing_value = "true")]
    secure: Option<bool>,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "off")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one operation against a resource kind
    Call {
        /// Resource kind, e.g. "runs" or "model"
        kind: ResourceKind,

        /// create, read_all, read, update or delete
        operation: Operation,

        #[command(flatten)]
        scope: ScopeArgs,

        /// Inline JSON payload
        #[arg(long, conflicts_with = "payload_file")]
        payload: Option<String>,

        /// JSON or YAML file holding the payload
        #[arg(long)]
        payload_file: Option<PathBuf>,
    },

    /// Register a participant's nodes under a project
    Register {
        #[arg(long)]
        collab: String,

        #[arg(long)]
        project: String,

        #[arg(long)]
        participant: String,

        /// guest, host or arbiter
        #[arg(long)]
        role: Role,

        /// Node as HOST:PORT:CONTROL_PORT (repeatable)
        #[arg(long = "node", required = true)]
        nodes: Vec<NodeDescriptor>,

        /// Log computation operations on every node
        #[arg(long)]
        log_msgs: bool,

        #[arg(long)]
        verbose: bool,
    },

    /// List endpoint templates and their signatures
    Endpoints {
        kind: Option<ResourceKind>,
    },

    /// Persist connection defaults and print the effective configuration
    Config {
        #[arg(long)]
        host: Option<String>,

        #[arg(long)]
        port: Option<u16>,

        #[arg(long)]
        secure: Option<bool>,
    },
}

/// Identifiers scoping a call
#[derive(ClapArgs, Debug, Default)]
struct ScopeArgs {
    #[arg(long)]
    collab: Option<String>,

    #[arg(long)]
    project: Option<String>,

    #[arg(long)]
    expt: Option<String>,

    #[arg(long)]
    run: Option<String>,

    #[arg(long)]
    participant: Option<String>,
}

impl ScopeArgs {
    fn keys(&self) -> ScopeKeys {
        ScopeKeys::new()
            .with_opt(ScopeKey::Collaboration, self.collab.as_deref())
            .with_opt(ScopeKey::Project, self.project.as_deref())
            .with_opt(ScopeKey::Experiment, self.expt.as_deref())
            .with_opt(ScopeKey::Run, self.run.as_deref())
            .with_opt(ScopeKey::Participant, self.participant.as_deref())
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(level: LogLevel) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let log_path = get_log_path();

    if let Some(parent) = log_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }

    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {:?}", log_path))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);

    tracing_subscriber::fmt()
        .with_max_level(tracing_level)
        .with_writer(non_blocking.with_max_level(tracing_level))
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("synergos {} started with log level: {:?}", VERSION, level);
    tracing::info!("Log file: {:?}", log_path);

    Ok(Some(guard))
}

fn get_log_path() -> PathBuf {
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("synergos").join("synergos.log");
    }
    if let Some(home) = dirs::home_dir() {
        return home.join(".synergos").join("synergos.log");
    }
    PathBuf::from("synergos.log")
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = match setup_logging(args.log_level) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Warning: logging disabled: {err:#}");
            None
        },
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{:#}", err);
            match err.downcast_ref::<GridError>() {
                Some(grid_err) => eprintln!("Error: {}", format_grid_error(grid_err)),
                None => eprintln!("Error: {err:#}"),
            }
            ExitCode::FAILURE
        },
    }
}

async fn run(args: Args) -> Result<()> {
    let config = Config::load();

    match args.command {
        Command::Endpoints { kind } => print_endpoints(kind),
        Command::Config { host, port, secure } => {
            let mut config = config;
            if host.is_some() || port.is_some() || secure.is_some() {
                config
                    .update(host, port, secure)
                    .context("Failed to save configuration")?;
            }
            print_config(&config)
        },
        Command::Call {
            kind,
            operation,
            scope,
            payload,
            payload_file,
        } => {
            let driver = connect(&args.host, args.port, args.secure, &config)?;
            let payload = match (payload, payload_file) {
                (Some(inline), _) => Some(serde_json::from_str(&inline).context("Invalid --payload JSON")?),
                (None, Some(path)) => Some(read_payload_file(&path)?),
                (None, None) => None,
            };
            if operation == Operation::Update && payload.is_none() {
                bail!("update needs a payload (--payload or --payload-file)");
            }

            let task = ResourceTask::new(kind, driver.client().clone());
            let envelope = task.perform(operation, &scope.keys(), payload.as_ref()).await?;
            print_json(envelope.as_value())
        },
        Command::Register {
            collab,
            project,
            participant,
            role,
            nodes,
            log_msgs,
            verbose,
        } => {
            let driver = connect(&args.host, args.port, args.secure, &config)?;
            let mut registry = NodeRegistry::new();
            for node in nodes {
                let node_id = registry.add_node(node.log_msgs(log_msgs).verbose(verbose));
                tracing::debug!("Queued {}", node_id);
            }

            let envelope = driver
                .registrations()
                .create(&collab, &project, &participant, role, &mut registry)
                .await?;
            print_json(envelope.as_value())
        },
    }
}

fn connect(host: &Option<String>, port: Option<u16>, secure: Option<bool>, config: &Config) -> Result<Driver> {
    let host = config.effective_host(host.as_deref());
    let port = config.effective_port(port);
    let secure = config.effective_secure(secure);
    tracing::info!("Using grid {}:{} (secure: {})", host, port, secure);
    Ok(Driver::new(&host, port, secure)?)
}

fn read_payload_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path).with_context(|| format!("Failed to read {:?}", path))?;
    let is_yaml = matches!(
        path.extension().and_then(|ext| ext.to_str()),
        Some("yaml") | Some("yml")
    );

    if is_yaml {
        serde_yaml::from_str(&content).with_context(|| format!("Invalid YAML in {:?}", path))
    } else {
        serde_json::from_str(&content).with_context(|| format!("Invalid JSON in {:?}", path))
    }
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_endpoints(kind: Option<ResourceKind>) -> Result<()> {
    let table = endpoint_table();
    let kinds = match kind {
        Some(kind) => vec![kind],
        None => table.kinds(),
    };

    for kind in kinds {
        let endpoints = table.get(kind)?;
        let operations: Vec<&str> = endpoints.operations.iter().map(|op| op.as_str()).collect();
        println!("{} [{}]", endpoints.display_name, operations.join(", "));
        for template in endpoints.templates() {
            println!("  ({}) {}", template.signature(), template.as_str());
        }
    }
    Ok(())
}

fn print_config(config: &Config) -> Result<()> {
    if let Some(path) = Config::config_path() {
        println!("# {}", path.display());
    }
    let effective = serde_json::json!({
        "host": config.effective_host(None),
        "port": config.effective_port(None),
        "secure": config.effective_secure(None),
    });
    print_json(&effective)
}
