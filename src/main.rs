//! Speech Launcher - launch commands by voice
//!
//! `<wake word> <object> <action>` runs the configured command.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use speechlauncher::asr::{self, InputKind, RecognizerHandle};
use speechlauncher::config::{config_path, Config};
use speechlauncher::dispatch::Dispatcher;
use speechlauncher::launcher::SystemLauncher;
use speechlauncher::notify::{self, LogNotifier};
use speechlauncher::pipeline::Pipeline;
use speechlauncher::{audit, grammar, menu};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Settings file (default: user config dir)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Cmd>,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// Listen for voice commands (default)
    Listen {
        /// Recognition input
        #[arg(long, value_enum)]
        input: Option<InputKind>,

        /// Audio input device index
        #[arg(short, long)]
        device: Option<usize>,
    },
    /// Validate the settings and report unreachable or ambiguous entries
    Check,
    /// Print the compiled grammar
    Grammar {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// List objects and their actions
    List,
    /// Run one action directly
    Run { object: String, action: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Setup logging
    let filter = if args.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let path = args.config.unwrap_or_else(config_path);
    let config = Config::load_from(&path)?;

    match args.command.unwrap_or(Cmd::Listen {
        input: None,
        device: None,
    }) {
        Cmd::Listen { input, device } => listen(config, input.unwrap_or_default(), device).await,
        Cmd::Check => check(&config, &path),
        Cmd::Grammar { json } => print_grammar(&config, json),
        Cmd::List => {
            print!("{}", menu::render(&config));
            Ok(())
        }
        Cmd::Run { object, action } => {
            config.validate().context("Invalid configuration")?;
            let dispatcher = dispatcher(&config, Arc::new(LogNotifier));
            menu::run(&config, &dispatcher, &object, &action)?;
            Ok(())
        }
    }
}

fn dispatcher(config: &Config, notifier: Arc<dyn notify::Notifier>) -> Dispatcher {
    let dispatcher = Dispatcher::new(notifier, Arc::new(SystemLauncher::default()));
    if config.audit_log {
        dispatcher.with_audit_log(audit::audit_path())
    } else {
        dispatcher
    }
}

async fn listen(config: Config, input: InputKind, device: Option<usize>) -> Result<()> {
    info!("🎙️ Speech Launcher v{} starting...", env!("CARGO_PKG_VERSION"));

    config.validate().context("Invalid configuration")?;
    for diagnostic in config.diagnostics() {
        warn!("⚠️ {}", diagnostic);
    }
    let grammar = grammar::compile(&config).context("No grammar to match")?;

    let config = Arc::new(config);
    let notifier = notify::create_notifier(&config).await;
    let pipeline = Pipeline::new(config.clone(), dispatcher(&config, notifier));

    let mut recognizer = asr::create_recognizer(input, &config, device)?;
    recognizer
        .load_grammar(&grammar)
        .context("Recognizer rejected the grammar")?;

    let (tx, rx) = mpsc::channel(asr::EVENT_QUEUE_SIZE);
    let handle = RecognizerHandle::spawn(recognizer, tx)?;

    info!(
        "✅ Ready (threshold {}) - say '{} <object> <action>'",
        pipeline.threshold(),
        grammar.wake_phrase
    );

    tokio::select! {
        _ = pipeline.run(rx) => {}
        _ = tokio::signal::ctrl_c() => {
            info!("Stopping recognizer");
            handle.stop();
        }
    }

    Ok(())
}

fn check(config: &Config, path: &std::path::Path) -> Result<()> {
    println!("Settings: {}", path.display());
    config.validate().context("Invalid configuration")?;

    let diagnostics = config.diagnostics();
    for diagnostic in &diagnostics {
        println!("warning: {}", diagnostic);
    }

    let grammar = grammar::compile(config)?;
    println!(
        "OK: {} objects, {} object phrases, {} action phrases, {} warnings",
        config.objects.len(),
        grammar.object.vocabulary_size(),
        grammar.action.vocabulary_size(),
        diagnostics.len()
    );
    Ok(())
}

fn print_grammar(config: &Config, json: bool) -> Result<()> {
    let grammar = grammar::compile(config)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&grammar)?);
        return Ok(());
    }

    println!("wake: {}", grammar.wake_phrase);
    for slot in [&grammar.object, &grammar.action] {
        println!("{}:", slot.key);
        for alt in &slot.alternatives {
            println!("  {} -> {}", alt.phrase, alt.label);
        }
    }
    println!("phrases:");
    for phrase in grammar.phrases() {
        println!("  {}", phrase);
    }
    Ok(())
}
