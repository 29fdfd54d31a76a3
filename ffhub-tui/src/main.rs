//! ffhub-tui: terminal client for FF Hub tournaments.
//!
//! Browse upcoming matches, register and pay over UPI, get AI scouting tips,
//! and (with the admin passcode) edit and publish the shared tournament list.
//!
//! Without a subcommand the interactive UI starts. Headless subcommands:
//!
//!   list                         - print the current tournament list
//!   publish <file>               - push a tournaments.json to the GitHub mirror
//!   strategy --map M --mode X    - print AI pro-tips for a match
//!   verify-payment <image> --amount N  - check a UPI payment screenshot

mod app;
mod config;
mod form;
mod ui;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use base64::Engine;
use clap::{Parser, Subcommand};
use crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::mpsc;

use ffhub_sdk::admin::AdminGate;
use ffhub_sdk::gemini::{FALLBACK_STRATEGY, GeminiClient};
use ffhub_sdk::github::{GitHubConfig, Publisher};
use ffhub_sdk::model::AppData;
use ffhub_sdk::source::SourceChain;
use ffhub_sdk::store::Store;

use app::{Action, App, BgResult};
use config::{Config, Resolved};

#[derive(Parser)]
#[command(name = "ffhub-tui", about = "FF Hub tournament client", version)]
pub struct Cli {
    /// Local tournaments.json, tried first
    #[arg(long)]
    data: Option<PathBuf>,

    /// URL serving tournaments.json, tried after the local file
    #[arg(long)]
    origin: Option<String>,

    /// GitHub mirror as owner/repo[@branch][:path], tried last
    #[arg(long)]
    mirror: Option<String>,

    /// Player store database
    #[arg(long)]
    store: Option<PathBuf>,

    /// Gemini API key for scouting tips and payment checks
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    gemini_key: Option<String>,

    /// Admin panel passcode
    #[arg(long, env = "FFHUB_ADMIN_PASSCODE", hide_env_values = true)]
    admin_passcode: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive UI (default)
    Tui,
    /// Print the tournament list from the first source that answers
    List,
    /// Publish a tournaments.json file to the configured GitHub repo
    Publish {
        file: PathBuf,
        /// GitHub token (otherwise the one saved from the admin panel)
        #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
        token: Option<String>,
        /// Target as owner/repo[@branch][:path] (otherwise the saved one)
        #[arg(long)]
        repo: Option<String>,
    },
    /// Print AI pro-tips for a map and mode
    Strategy {
        #[arg(long, default_value = "Bermuda")]
        map: String,
        #[arg(long, default_value = "Squad")]
        mode: String,
    },
    /// Check a UPI payment screenshot against the expected amount
    VerifyPayment {
        image: PathBuf,
        #[arg(long)]
        amount: u32,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let mut cli = Cli::parse();
    let command = cli.command.take().unwrap_or(Command::Tui);
    let interactive = matches!(command, Command::Tui);
    init_tracing(interactive)?;

    let resolved = Resolved::merge(&cli, &Config::load());
    let chain = SourceChain::standard(
        resolved.local_path.clone(),
        resolved.origin_url.clone(),
        resolved.mirror.clone(),
    );
    tracing::debug!(
        sources = chain.sources().len(),
        mirror = ?resolved.mirror,
        "Resolved config"
    );
    let gemini = resolved.gemini_key.clone().map(|key| {
        let mut client = GeminiClient::new(key);
        if let Some(model) = &resolved.gemini_model {
            client = client.with_model(model);
        }
        if let Some(model) = &resolved.gemini_image_model {
            client = client.with_image_model(model);
        }
        client
    });

    match command {
        Command::Tui => run_tui(resolved, chain, gemini).await,
        Command::List => {
            let loaded = chain.load().await;
            println!("# {} matches from {}", loaded.data.tournaments.len(), loaded.origin.label());
            for t in &loaded.data.tournaments {
                println!(
                    "{:<8} {:<28} {:<6} {:<10} {:<6} fee ₹{:<5} prize ₹{:<6} {}/{}{}",
                    t.id,
                    t.title,
                    t.match_type.label(),
                    t.date,
                    t.time,
                    t.entry_fee,
                    t.prize_pool,
                    t.joined_slots,
                    t.total_slots,
                    if t.is_full() { "  FULL" } else { "" },
                );
            }
            Ok(())
        }
        Command::Publish { file, token, repo } => {
            let store = Store::open(&resolved.store_path)
                .with_context(|| format!("opening store {}", resolved.store_path.display()))?;
            let config = publish_target(&store, token, repo.as_deref())?;
            let raw = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let data: AppData = serde_json::from_str(&raw)
                .with_context(|| format!("parsing {}", file.display()))?;

            let outcome = Publisher::new(Some(config)).publish(&data).await;
            if !outcome.success {
                bail!("{}", outcome.message);
            }
            println!("{}", outcome.message);
            Ok(())
        }
        Command::Strategy { map, mode } => {
            let tips = match &gemini {
                Some(client) => client.match_strategy(&map, &mode).await,
                None => {
                    tracing::warn!("GEMINI_API_KEY not set, showing default tips");
                    FALLBACK_STRATEGY.to_string()
                }
            };
            println!("{tips}");
            Ok(())
        }
        Command::VerifyPayment { image, amount } => {
            let Some(client) = &gemini else {
                bail!("GEMINI_API_KEY is required for payment verification");
            };
            let bytes =
                std::fs::read(&image).with_context(|| format!("reading {}", image.display()))?;
            let encoded = base64::engine::general_purpose::STANDARD.encode(bytes);
            let verdict = client.verify_payment_screenshot(&encoded, amount).await;
            println!("{}: {}", if verdict.is_valid { "valid" } else { "invalid" }, verdict.message);
            Ok(())
        }
    }
}

/// Interactive sessions log to a file so output doesn't tear the UI;
/// headless commands log to stderr.
fn init_tracing(interactive: bool) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "ffhub_tui=info,ffhub_sdk=info".into());

    if interactive {
        let path = config::log_path();
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
        }
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening log {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

/// GitHub target for headless publish: flags first, then the config saved
/// from the admin panel.
fn publish_target(
    store: &Store,
    token: Option<String>,
    repo: Option<&str>,
) -> Result<GitHubConfig> {
    let mut config = store.github_config()?.unwrap_or_default();
    if let Some(token) = token {
        config.token = token;
    }
    if let Some(spec) = repo {
        let location = ffhub_sdk::source::RepoLocation::parse(spec)
            .with_context(|| format!("bad --repo {spec:?}, expected owner/repo[@branch][:path]"))?;
        config.owner = location.owner;
        config.repo = location.repo;
        config.branch = location.branch;
        config.path = location.path;
    }
    if !config.is_complete() {
        bail!(
            "GitHub configuration is missing. Pass --token and --repo or save it from the admin panel."
        );
    }
    Ok(config)
}

/// Everything background tasks need to run an [`Action`].
struct Services {
    chain: SourceChain,
    gemini: Option<Arc<GeminiClient>>,
    tx: mpsc::Sender<BgResult>,
}

impl Services {
    fn run(&self, action: Action) {
        match action {
            Action::OpenUrl(url) => {
                tracing::info!(%url, "Opening");
                if let Err(e) = open::that_detached(&url) {
                    tracing::warn!(%url, error = %e, "Can't open browser");
                }
            }
            Action::FetchStrategy { tournament_id, map, mode } => {
                let tx = self.tx.clone();
                let gemini = self.gemini.clone();
                tokio::spawn(async move {
                    let text = match gemini {
                        Some(client) => client.match_strategy(&map, &mode).await,
                        None => FALLBACK_STRATEGY.to_string(),
                    };
                    let _ = tx.send(BgResult::Strategy { tournament_id, text }).await;
                });
            }
            Action::Publish { config, data } => {
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let outcome = Publisher::new(Some(config)).publish(&data).await;
                    let _ = tx.send(BgResult::Published(outcome)).await;
                });
            }
            Action::Export { path, json } => {
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    let result = write_export(&path, &json)
                        .await
                        .map(|_| path)
                        .map_err(|e| format!("{e:#}"));
                    let _ = tx.send(BgResult::Exported(result)).await;
                });
            }
            Action::Refresh => {
                let tx = self.tx.clone();
                let chain = self.chain.clone();
                tokio::spawn(async move {
                    let loaded = chain.load().await;
                    let _ = tx.send(BgResult::Refreshed(loaded)).await;
                });
            }
        }
    }
}

async fn write_export(path: &Path, json: &str) -> Result<()> {
    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("writing {}", path.display()))?;
    tracing::info!(path = %path.display(), "Exported tournaments");
    Ok(())
}

async fn run_tui(
    resolved: Resolved,
    chain: SourceChain,
    gemini: Option<GeminiClient>,
) -> Result<()> {
    let store = Store::open(&resolved.store_path)
        .with_context(|| format!("opening store {}", resolved.store_path.display()))?;
    let mut terminal = ratatui::init();
    tracing::info!(store = %resolved.store_path.display(), "Initializing Hub...");
    let splash = terminal.draw(|frame| {
        let text = ratatui::widgets::Paragraph::new("Initializing Hub...").centered();
        frame.render_widget(text, frame.area());
    });
    let loaded = chain.load().await;

    let (tx, mut rx) = mpsc::channel(64);
    let services = Services { chain, gemini: gemini.map(Arc::new), tx };
    let mut app = App::new(loaded, store, AdminGate::new(resolved.admin_passcode));

    let result = match splash {
        Ok(_) => event_loop(&mut terminal, &mut app, &services, &mut rx),
        Err(e) => Err(e.into()),
    };
    ratatui::restore();
    result
}

fn event_loop(
    terminal: &mut ratatui::DefaultTerminal,
    app: &mut App,
    services: &Services,
    rx: &mut mpsc::Receiver<BgResult>,
) -> Result<()> {
    while !app.should_quit {
        while let Ok(result) = rx.try_recv() {
            app.apply_bg(result);
        }
        app.tick(Instant::now());
        terminal.draw(|frame| ui::draw(frame, app))?;

        if event::poll(Duration::from_millis(200))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    if let Some(action) = app.handle_key(key) {
                        services.run(action);
                    }
                }
            }
        }
    }
    Ok(())
}
