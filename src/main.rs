use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use step_recorder::capture::HotkeyCommand;
use step_recorder::generation::{GenerationHooks, GenerationState, Generator, HttpGenerationBackend};
use step_recorder::{describe, Config, Step};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "step-recorder", version, about = "Record browser interactions as test steps")]
struct Cli {
    /// JSON config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open a page and record interactions until Ctrl-C or the duration elapses
    Record {
        url: String,
        /// Stop after this many seconds
        #[arg(long)]
        duration: Option<u64>,
        /// Write the recorded steps here as JSON
        #[arg(long)]
        output: Option<PathBuf>,
        /// Send the steps to the generation service when recording ends
        #[arg(long)]
        generate: bool,
        #[arg(long)]
        endpoint: Option<String>,
        #[arg(long)]
        display_key: Option<String>,
        #[arg(long)]
        url_key: Option<String>,
        #[arg(long)]
        headless: bool,
    },
    /// Print the numbered descriptor for a saved steps file
    Describe { steps: PathBuf },
    /// Stream generated test code for a saved steps file
    Generate {
        steps: PathBuf,
        #[arg(long)]
        endpoint: Option<String>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => Config::default(),
    };

    match cli.command {
        Command::Record {
            url,
            duration,
            output,
            generate,
            endpoint,
            display_key,
            url_key,
            headless,
        } => {
            if let Some(key) = display_key {
                set_hotkey(&mut config, HotkeyCommand::Display, &key);
            }
            if let Some(key) = url_key {
                set_hotkey(&mut config, HotkeyCommand::Url, &key);
            }
            if let Some(endpoint) = endpoint {
                config.generation.endpoint = endpoint;
            }
            config.browser.headless |= headless;
            let config = config.validated()?;

            let steps = record(&config, &url, duration).await?;
            info!("recorded {} steps", steps.len());
            println!("{}", describe(&steps));

            if let Some(path) = output {
                save_steps(&path, &steps)?;
                info!("steps written to {}", path.display());
            }
            if generate {
                run_generation(&config, &steps).await?;
            }
        }
        Command::Describe { steps } => {
            let steps = load_steps(&steps)?;
            println!("{}", describe(&steps));
        }
        Command::Generate { steps, endpoint } => {
            if let Some(endpoint) = endpoint {
                config.generation.endpoint = endpoint;
            }
            let config = config.validated()?;
            let steps = load_steps(&steps)?;
            run_generation(&config, &steps).await?;
        }
    }

    Ok(())
}

fn set_hotkey(config: &mut Config, command: HotkeyCommand, key: &str) {
    if !config.hotkeys.set(command, key) {
        warn!(?command, key, "ignoring invalid hotkey, expected one letter or digit");
    }
}

#[cfg(feature = "chrome")]
async fn record(config: &Config, url: &str, duration: Option<u64>) -> anyhow::Result<Vec<Step>> {
    use step_recorder::{ChromeBrowser, RecordingSession};

    let mut session = RecordingSession::new(ChromeBrowser::new(), config.clone()).await?;
    session.open(url).await?;
    session.recorder_mut().start_recording();
    info!(
        "recording {} (display hotkey '{}', url hotkey '{}'), Ctrl-C to stop",
        url,
        config.hotkeys.get(HotkeyCommand::Display),
        config.hotkeys.get(HotkeyCommand::Url)
    );

    let shutdown = async move {
        match duration {
            Some(secs) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                }
            }
            None => {
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    };

    session.run_until(shutdown).await?;
    Ok(session.close().await?)
}

#[cfg(not(feature = "chrome"))]
async fn record(_config: &Config, _url: &str, _duration: Option<u64>) -> anyhow::Result<Vec<Step>> {
    bail!("recording needs the `chrome` feature")
}

async fn run_generation(config: &Config, steps: &[Step]) -> anyhow::Result<()> {
    if steps.is_empty() {
        bail!("no steps to generate from");
    }

    let backend = HttpGenerationBackend::new(&config.generation)?;
    info!(endpoint = %backend.endpoint(), "requesting test generation");
    let generator = Generator::new(backend).with_hooks(
        GenerationHooks::new()
            .on_chunk(|chunk| {
                print!("{}", chunk);
                let _ = std::io::stdout().flush();
            })
            .on_error(|message| error!("generation failed: {}", message)),
    );

    let request = generator.generate(steps)?;
    let canceller = request.cancel_handle();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            canceller.cancel();
        }
    });
    let finished = request.wait().await;
    ctrl_c.abort();
    println!();

    match finished {
        GenerationState::Completed(_) => Ok(()),
        GenerationState::Cancelled => {
            warn!("generation cancelled");
            Ok(())
        }
        GenerationState::Failed(message) => bail!(message),
        GenerationState::InFlight => Ok(()),
    }
}

fn load_steps(path: &Path) -> anyhow::Result<Vec<Step>> {
    let raw =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("parsing steps from {}", path.display()))
}

fn save_steps(path: &Path, steps: &[Step]) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(steps)?;
    std::fs::write(path, json).with_context(|| format!("writing {}", path.display()))
}
