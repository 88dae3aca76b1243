//! meshsim demo CLI.
//!
//! Runs one of the reference protocol scenarios under the simulation
//! engine, optionally writing a trace log and a PlantUML sequence diagram.
//!
//! ```bash
//! # four seconds of ping/pong with a trace log
//! meshsim --scenario pingpong -d 4 -l run.log
//!
//! # crash detection and leader election, with a rendered diagram
//! MESHSIM_JAVA_PATH=java MESHSIM_PLANTUML_JAR=plantuml.jar \
//!     meshsim --scenario crash -u run.uml
//! ```

mod scenarios;

use clap::{Parser, ValueEnum};
use meshsim_simulation::SimulationOptions;
use scenarios::Scenario;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Environment variable naming the java runtime for diagram rendering.
const JAVA_ENV: &str = "MESHSIM_JAVA_PATH";
/// Environment variable naming the PlantUML jar for diagram rendering.
const PLANTUML_ENV: &str = "MESHSIM_PLANTUML_JAR";

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ScenarioKind {
    /// A client pinging a server on an interval timer.
    Pingpong,
    /// A client bouncing payloads off an echo server.
    Echo,
    /// Three staggered senders broadcasting through a relay.
    Broadcast,
    /// Crash-stop nodes under a failure detector and leader election.
    Crash,
}

#[derive(Parser, Debug)]
#[command(name = "meshsim")]
#[command(version, about = "Discrete distributed-systems simulator", long_about = None)]
struct Args {
    /// Scenario to run
    #[arg(short, long, value_enum, default_value = "pingpong")]
    scenario: ScenarioKind,

    /// Simulation duration in seconds
    #[arg(short, long, default_value = "5")]
    duration: u64,

    /// Path to the trace log file
    #[arg(short = 'l', long = "logfile")]
    logfile: Option<PathBuf>,

    /// Path to the PlantUML sequence diagram file
    #[arg(short = 'u', long = "umlfile")]
    umlfile: Option<PathBuf>,

    /// Minimum message latency in milliseconds (inclusive)
    #[arg(long, default_value = "10")]
    min_latency: u64,

    /// Maximum message latency in milliseconds (exclusive)
    #[arg(long, default_value = "100")]
    max_latency: u64,

    /// Per-node mailbox capacity for messages and timers
    #[arg(long, default_value = "64")]
    buffer_size: usize,
}

impl Args {
    fn options(&self) -> SimulationOptions {
        let mut options = SimulationOptions::default()
            .with_latency(
                Duration::from_millis(self.min_latency),
                Duration::from_millis(self.max_latency),
            )
            .with_duration(Duration::from_secs(self.duration))
            .with_buffer_size(self.buffer_size);
        if let Some(path) = &self.logfile {
            options = options.with_trace_path(path);
        }
        if let Some(path) = &self.umlfile {
            options = options.with_uml_path(path);
        }
        // Diagram rendering needs both the runtime and the renderer jar;
        // without them the .uml file is still written.
        if let (Ok(java), Ok(jar)) = (std::env::var(JAVA_ENV), std::env::var(PLANTUML_ENV)) {
            options = options.with_renderer(java, jar);
        }
        options
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let Scenario { mut sim, report } = match args.scenario {
        ScenarioKind::Pingpong => scenarios::pingpong(args.options()),
        ScenarioKind::Echo => scenarios::echo(args.options()),
        ScenarioKind::Broadcast => scenarios::broadcast(args.options()),
        ScenarioKind::Crash => scenarios::crash(args.options()),
    };

    match sim.run().await {
        Ok(stats) => {
            info!(
                messages_sent = stats.messages_sent,
                messages_handled = stats.messages_handled,
                messages_dropped = stats.messages_dropped,
                timers_set = stats.timers_set,
                interrupts_sent = stats.interrupts_sent,
                "simulation finished"
            );
            report();
        }
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(1);
        }
    }
}
