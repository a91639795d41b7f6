// # hookdns-lambda - Lifecycle Hook Handler
//
// This binary is a THIN integration layer:
// - DO NOT add DNS logic, template logic or polling logic here
// - All lifecycle handling lives in hookdns-core
// - All AWS calls live in hookdns-aws
// - Configuration is via environment variables only
//
// The binary is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Building the AWS adapters and the lifecycle engine once per process
// 4. Handing every Lambda event to the engine
//
// ## Configuration
//
// - `HOOKDNS_POLL_INTERVAL_SECS`: Delay between change status checks (default 5)
// - `HOOKDNS_MAX_POLL_ATTEMPTS`: Status checks before abandoning (default 24)
// - `HOOKDNS_LOG_LEVEL`: trace, debug, info, warn or error (default info)
// - `HOOKDNS_MODE`: `live` or `dry-run` (default live)
//
// AWS region and credentials come from the standard provider chain.
//
// ## Invocation Result
//
// Failures before the change batch is submitted are returned to the Lambda
// runtime as errors, so the notification is redelivered. Everything after
// submission ends in a successful invocation.

use anyhow::{Context, Result};
use hookdns_aws::{AutoScalingLifecycleController, Ec2InstanceDirectory, Route53RecordStore};
use hookdns_core::{EngineConfig, InvocationOutcome, LifecycleEngine, PropagationConfig};
use lambda_runtime::{LambdaEvent, service_fn};
use serde_json::{Value, json};
use std::env;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
#[derive(Debug, Clone, Copy)]
enum HookdnsExitCode {
    /// The runtime loop ended normally
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// The runtime loop failed
    RuntimeError = 2,
}

impl From<HookdnsExitCode> for ExitCode {
    fn from(code: HookdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
#[derive(Debug)]
struct Config {
    poll_interval_secs: Option<u64>,
    max_poll_attempts: Option<u32>,
    log_level: String,
    mode: String,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            poll_interval_secs: lookup("HOOKDNS_POLL_INTERVAL_SECS")
                .map(|s| s.trim().parse())
                .transpose()
                .context("HOOKDNS_POLL_INTERVAL_SECS must be a whole number of seconds")?,
            max_poll_attempts: lookup("HOOKDNS_MAX_POLL_ATTEMPTS")
                .map(|s| s.trim().parse())
                .transpose()
                .context("HOOKDNS_MAX_POLL_ATTEMPTS must be a whole number")?,
            log_level: lookup("HOOKDNS_LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            mode: lookup("HOOKDNS_MODE").unwrap_or_else(|| "live".to_string()),
        })
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        match self.mode.as_str() {
            "live" | "dry-run" => {}
            _ => anyhow::bail!(
                "HOOKDNS_MODE '{}' is not valid. Valid modes: live, dry-run",
                self.mode
            ),
        }

        match self.log_level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!(
                "HOOKDNS_LOG_LEVEL '{}' is not valid. \
                Valid levels: trace, debug, info, warn, error",
                self.log_level
            ),
        }

        self.engine_config()
            .validate()
            .map_err(|e| anyhow::anyhow!("{}", e))
    }

    /// Engine settings, with defaults for anything not set
    fn engine_config(&self) -> EngineConfig {
        let defaults = PropagationConfig::default();
        let propagation = PropagationConfig::new(
            self.poll_interval_secs.unwrap_or(defaults.poll_interval_secs),
            self.max_poll_attempts.unwrap_or(defaults.max_attempts),
        );

        EngineConfig::new().with_propagation(propagation)
    }

    fn dry_run(&self) -> bool {
        self.mode == "dry-run"
    }

    fn log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }
}

fn main() -> ExitCode {
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return HookdnsExitCode::ConfigError.into();
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Configuration validation error: {:#}", e);
        return HookdnsExitCode::ConfigError.into();
    }

    // The Lambda log stream timestamps every line already.
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level())
        .with_ansi(false)
        .without_time()
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return HookdnsExitCode::ConfigError.into();
    }

    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return HookdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        if let Err(e) = run(config).await {
            error!("Runtime error: {:#}", e);
            HookdnsExitCode::RuntimeError
        } else {
            HookdnsExitCode::CleanShutdown
        }
    });

    result.into()
}

/// Build the engine and serve Lambda events until the runtime stops
async fn run(config: Config) -> Result<()> {
    let clients = hookdns_aws::load_clients().await;

    let store = Route53RecordStore::new(clients.route53, config.dry_run());
    if store.is_dry_run() {
        warn!("Route 53 record store running in DRY-RUN mode - no changes will be made");
    }

    let engine_config = config.engine_config();
    info!(
        "Polling change status every {}s, at most {} time(s)",
        engine_config.propagation.poll_interval_secs, engine_config.propagation.max_attempts
    );

    let engine = LifecycleEngine::new(
        Box::new(Ec2InstanceDirectory::new(clients.ec2)),
        Box::new(store),
        Box::new(AutoScalingLifecycleController::new(clients.autoscaling)),
        engine_config,
    )
    .map_err(|e| anyhow::anyhow!("{}", e))?;
    let engine = Arc::new(engine);

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let engine = Arc::clone(&engine);
        async move { handle_event(&engine, event).await }
    }))
    .await
    .map_err(|e| anyhow::anyhow!("Lambda runtime failed: {}", e))
}

/// Hand one Lambda event to the engine
async fn handle_event(
    engine: &LifecycleEngine,
    event: LambdaEvent<Value>,
) -> std::result::Result<Value, lambda_runtime::Error> {
    let payload = serde_json::to_vec(&event.payload)?;

    match engine.handle(&payload).await {
        Ok(outcome) => Ok(outcome_response(&outcome)),
        Err(e) => {
            error!("Notification not handled, returning error for redelivery: {}", e);
            Err(e.into())
        }
    }
}

fn outcome_response(outcome: &InvocationOutcome) -> Value {
    match outcome {
        InvocationOutcome::Ignored => json!({ "outcome": "ignored" }),
        InvocationOutcome::Continued => json!({ "outcome": "continued" }),
        InvocationOutcome::Abandoned { reason } => {
            json!({ "outcome": "abandoned", "reason": reason })
        }
    }
}
