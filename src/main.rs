mod app;
mod config;
mod core;
mod domain;
mod infrastructure;
mod modules;
mod ui;

use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use crossterm::event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

use crate::app::{App, StatusLevel};
use crate::config::Config;
use crate::core::Action;
use crate::infrastructure::ethereum::NetworkProfile;
use crate::infrastructure::runtime::{RuntimeBridge, RuntimeCommand, WorkerConfig};

#[derive(Debug, Parser)]
#[command(
    name = "fundrace",
    version,
    about = "FundRace: a terminal client for CryptoFundRacing crowdfunding pools"
)]
struct Args {
    /// HTTP JSON-RPC endpoint; overrides the configured network list
    #[arg(long)]
    rpc: Option<String>,

    /// Expected chain id for --rpc (any chain is accepted when omitted)
    #[arg(long)]
    chain_id: Option<u64>,

    /// Config file path (default: ~/.config/fundrace/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Skip the network entirely and browse demo campaigns
    #[arg(long)]
    demo: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => config::load_path(path)?,
        None => config::load(),
    };

    let runtime = if args.demo {
        None
    } else {
        let profiles = profiles_from_args(&args, &config)?;
        Some(RuntimeBridge::new(WorkerConfig {
            profiles,
            wallet: config.wallet_source(),
            pinning: config.pinning.clone(),
            fetch_mode: config.fetch_mode,
        })?)
    };

    let wallet_needs_password = wallet_needs_password(&config);

    let mut stdout = io::stdout();
    enable_raw_mode()?;
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(wallet_needs_password);
    if args.demo {
        app.load_demo();
        app.set_status("demo mode: no network access", StatusLevel::Warn);
    } else {
        app.set_status("resolving network...", StatusLevel::Info);
    }

    let res = run_app(&mut terminal, app, runtime);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("{err:?}");
    }

    Ok(())
}

/// --rpc collapses the probe list to a single candidate.
fn profiles_from_args(args: &Args, config: &Config) -> Result<Vec<NetworkProfile>> {
    if let Some(rpc) = &args.rpc {
        return Ok(vec![NetworkProfile {
            name: "cli".to_string(),
            chain_id: args.chain_id.unwrap_or(0),
            endpoints: vec![rpc.clone()],
            factory: None,
        }]);
    }
    config.network_profiles()
}

/// The keystore is only consulted when no private key env var is set, and it
/// always needs a password prompt.
fn wallet_needs_password(config: &Config) -> bool {
    let env_name = config
        .wallet
        .private_key_env
        .as_deref()
        .unwrap_or("FUNDRACE_PRIVATE_KEY");
    let env_key_present = std::env::var(env_name)
        .map(|value| !value.trim().is_empty())
        .unwrap_or(false);
    !env_key_present && config.wallet.keystore.is_some()
}

fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
    runtime: Option<RuntimeBridge>,
) -> Result<()> {
    let tick_rate = Duration::from_millis(200);
    let mut last_tick = Instant::now();

    loop {
        pump_background(&mut app, runtime.as_ref());
        terminal.draw(|f| ui::draw(f, &app))?;
        if app.should_quit {
            if let Some(runtime) = &runtime {
                let _ = runtime.send(RuntimeCommand::Shutdown);
            }
            return Ok(());
        }

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or_else(|| Duration::from_secs(0));

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let action = app.handle_key(key);
                    perform_action(&mut app, action);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            app.on_tick();
            last_tick = Instant::now();
        }

        pump_background(&mut app, runtime.as_ref());
    }
}

fn pump_background(app: &mut App, runtime: Option<&RuntimeBridge>) {
    if let Some(runtime) = runtime {
        for event in runtime.poll_events() {
            app.apply_event(event);
        }
    }
    for command in app.take_commands() {
        match runtime {
            Some(runtime) => {
                if runtime.send(command).is_err() {
                    app.set_status("worker stopped; restart to reconnect", StatusLevel::Error);
                }
            }
            None => app.set_status("demo mode: chain access disabled", StatusLevel::Warn),
        }
    }
}

fn perform_action(app: &mut App, action: Action) {
    match action {
        Action::None => {}
        Action::Quit => app.should_quit = true,
        Action::Notify(message, level) => app.set_status(message, StatusLevel::from(level)),
        Action::Copy(text) => match arboard::Clipboard::new().and_then(|mut cb| cb.set_text(&text))
        {
            Ok(()) => app.set_status(format!("copied {}", text), StatusLevel::Info),
            Err(err) => app.set_status(format!("clipboard: {}", err), StatusLevel::Error),
        },
    }
}
