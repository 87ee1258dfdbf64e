//! Application state
//!
//! Owns everything the renderer reads: the campaign list plus its
//! filter/sort/search view, wallet state, network status, prompts, and the
//! outbox of runtime commands. Input handling mutates this struct and emits
//! `Action`s; network results come back in via `apply_event`. No locking -
//! the UI thread is the only writer.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use alloy_primitives::Address;
use chrono::Utc;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::core::{parse_command, Action, Command, CreateArgs, NotifyLevel};
use crate::domain::pool::{short_addr, Campaign};
use crate::domain::units::eth_to_wei;
use crate::domain::wallet::WalletState;
use crate::infrastructure::ethereum::ChainError;
use crate::infrastructure::runtime::{RuntimeCommand, RuntimeEvent, TxKind};
use crate::modules::export;

const STATUS_TTL: Duration = Duration::from_secs(6);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignFilter {
    All,
    Active,
    Ended,
}

impl CampaignFilter {
    pub fn cycle(self) -> Self {
        match self {
            CampaignFilter::All => CampaignFilter::Active,
            CampaignFilter::Active => CampaignFilter::Ended,
            CampaignFilter::Ended => CampaignFilter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            CampaignFilter::All => "all",
            CampaignFilter::Active => "active",
            CampaignFilter::Ended => "ended",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Newest,
    Progress,
    Deadline,
}

impl SortKey {
    pub fn cycle(self) -> Self {
        match self {
            SortKey::Newest => SortKey::Progress,
            SortKey::Progress => SortKey::Deadline,
            SortKey::Deadline => SortKey::Newest,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            SortKey::Newest => "newest",
            SortKey::Progress => "progress",
            SortKey::Deadline => "deadline",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptKind {
    Search,
    ContributeAmount,
    WithdrawTarget,
    KeystorePassword,
    PinPath,
}

impl PromptKind {
    pub fn label(self) -> &'static str {
        match self {
            PromptKind::Search => "search",
            PromptKind::ContributeAmount => "amount (ETH)",
            PromptKind::WithdrawTarget => "recipient address",
            PromptKind::KeystorePassword => "keystore password",
            PromptKind::PinPath => "image file path",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Command,
    Prompt(PromptKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLevel {
    Info,
    Warn,
    Error,
}

impl From<NotifyLevel> for StatusLevel {
    fn from(level: NotifyLevel) -> Self {
        match level {
            NotifyLevel::Info => StatusLevel::Info,
            NotifyLevel::Warn => StatusLevel::Warn,
            NotifyLevel::Error => StatusLevel::Error,
        }
    }
}

/// Where the campaign list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataMode {
    Demo,
    Chain,
}

/// A write waiting for the user's y/n confirmation.
#[derive(Debug, Clone)]
pub struct PendingTx {
    pub command: RuntimeCommand,
    pub describe: String,
}

pub struct App {
    pub should_quit: bool,
    pub show_help: bool,

    pub campaigns: Vec<Campaign>,
    pub my_pools: Vec<Address>,
    pub contributions: HashMap<Address, String>,
    pub data_mode: DataMode,
    pub skipped: usize,

    pub filter: CampaignFilter,
    pub sort: SortKey,
    pub search: String,
    pub selected: usize,

    pub wallet: WalletState,
    wallet_needs_password: bool,

    pub network_name: Option<String>,
    pub chain_id: Option<u64>,
    pub endpoint: Option<String>,
    pub factory_configured: bool,

    pub input_mode: InputMode,
    pub input_buffer: String,

    pub pending_tx: Option<PendingTx>,
    pub tx_in_flight: bool,
    pub last_pinned_url: Option<String>,

    status: Option<(String, StatusLevel, Instant)>,
    outbox: Vec<RuntimeCommand>,
}

impl App {
    pub fn new(wallet_needs_password: bool) -> Self {
        Self {
            should_quit: false,
            show_help: false,
            campaigns: Vec::new(),
            my_pools: Vec::new(),
            contributions: HashMap::new(),
            data_mode: DataMode::Chain,
            skipped: 0,
            filter: CampaignFilter::All,
            sort: SortKey::Newest,
            search: String::new(),
            selected: 0,
            wallet: WalletState::new(),
            wallet_needs_password,
            network_name: None,
            chain_id: None,
            endpoint: None,
            factory_configured: false,
            input_mode: InputMode::Normal,
            input_buffer: String::new(),
            pending_tx: None,
            tx_in_flight: false,
            last_pinned_url: None,
            status: None,
            outbox: Vec::new(),
        }
    }

    /// Drain queued runtime commands for the main loop to forward.
    pub fn take_commands(&mut self) -> Vec<RuntimeCommand> {
        std::mem::take(&mut self.outbox)
    }

    fn queue(&mut self, cmd: RuntimeCommand) {
        self.outbox.push(cmd);
    }

    pub fn set_status(&mut self, message: impl Into<String>, level: StatusLevel) {
        self.status = Some((message.into(), level, Instant::now()));
    }

    pub fn status_line(&self) -> Option<(&str, StatusLevel)> {
        self.status
            .as_ref()
            .map(|(message, level, _)| (message.as_str(), *level))
    }

    /// Expire stale status messages. Called every frame.
    pub fn on_tick(&mut self) {
        if let Some((_, _, at)) = &self.status {
            if at.elapsed() > STATUS_TTL && self.pending_tx.is_none() {
                self.status = None;
            }
        }
    }

    // ---- campaign view -----------------------------------------------------

    /// Indices into `campaigns` after filter, search, and sort.
    pub fn visible_indices(&self) -> Vec<usize> {
        let now = Utc::now();
        let needle = self.search.to_lowercase();
        let mut indices: Vec<usize> = self
            .campaigns
            .iter()
            .enumerate()
            .filter(|(_, campaign)| {
                let summary = &campaign.summary;
                let ended = summary.is_finished || summary.deadline_passed(now);
                match self.filter {
                    CampaignFilter::All => true,
                    CampaignFilter::Active => !ended,
                    CampaignFilter::Ended => ended,
                }
            })
            .filter(|(_, campaign)| {
                if needle.is_empty() {
                    return true;
                }
                campaign.title.to_lowercase().contains(&needle)
                    || campaign.description.to_lowercase().contains(&needle)
                    || campaign.summary.purpose.to_lowercase().contains(&needle)
                    || format!("{:#x}", campaign.summary.address).contains(&needle)
                    || format!("{:#x}", campaign.summary.owner).contains(&needle)
            })
            .map(|(index, _)| index)
            .collect();

        match self.sort {
            // Factory order is creation order, so newest means reversed.
            SortKey::Newest => indices.reverse(),
            SortKey::Progress => indices.sort_by(|&a, &b| {
                let pa = self.campaigns[a].summary.progress_fraction();
                let pb = self.campaigns[b].summary.progress_fraction();
                pb.partial_cmp(&pa).unwrap_or(std::cmp::Ordering::Equal)
            }),
            SortKey::Deadline => indices.sort_by_key(|&i| self.campaigns[i].summary.deadline),
        }
        indices
    }

    pub fn selected_campaign(&self) -> Option<&Campaign> {
        let visible = self.visible_indices();
        visible.get(self.selected).map(|&i| &self.campaigns[i])
    }

    fn clamp_selection(&mut self) {
        let len = self.visible_indices().len();
        if len == 0 {
            self.selected = 0;
        } else if self.selected >= len {
            self.selected = len - 1;
        }
    }

    pub fn select_next(&mut self) {
        let len = self.visible_indices().len();
        if len > 0 && self.selected + 1 < len {
            self.selected += 1;
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self) {
        self.selected = self.visible_indices().len().saturating_sub(1);
    }

    pub fn load_demo(&mut self) {
        self.campaigns = Campaign::demo_set();
        self.data_mode = DataMode::Demo;
        self.skipped = 0;
        self.clamp_selection();
    }

    // ---- runtime events ----------------------------------------------------

    pub fn apply_event(&mut self, event: RuntimeEvent) {
        match event {
            RuntimeEvent::ResolverNote { message } => {
                self.set_status(message, StatusLevel::Warn);
            }
            RuntimeEvent::NetworkResolved {
                name,
                chain_id,
                endpoint,
                factory_configured,
            } => {
                self.set_status(
                    format!("connected to {} (chain {})", name, chain_id),
                    StatusLevel::Info,
                );
                self.network_name = Some(name);
                self.chain_id = Some(chain_id);
                self.endpoint = Some(endpoint);
                self.factory_configured = factory_configured;
                self.data_mode = DataMode::Chain;
            }
            RuntimeEvent::DemoMode => {
                // A live chain list is never replaced by demo data; the
                // fallback only fills an otherwise empty screen.
                if self.data_mode == DataMode::Demo || self.campaigns.is_empty() {
                    self.load_demo();
                    self.set_status(
                        "no campaign data on chain - showing demo campaigns",
                        StatusLevel::Warn,
                    );
                }
            }
            RuntimeEvent::WalletConnecting => {
                self.wallet.begin_connect();
            }
            RuntimeEvent::WalletConnected {
                account,
                balance_eth,
                chain_id,
            } => {
                self.wallet.connected(account, balance_eth, chain_id);
                self.set_status(
                    format!("wallet connected: {}", short_addr(account)),
                    StatusLevel::Info,
                );
                self.queue(RuntimeCommand::RefreshPools);
                self.queue(RuntimeCommand::FetchMyPools);
            }
            RuntimeEvent::WalletSynced {
                balance_eth,
                chain_id,
            } => {
                self.wallet.sync(balance_eth, chain_id);
            }
            RuntimeEvent::WalletDisconnected => {
                if self.wallet.is_connecting() {
                    self.wallet.connect_failed();
                } else {
                    self.wallet.disconnect();
                }
                self.my_pools.clear();
                self.contributions.clear();
            }
            RuntimeEvent::CampaignsLoaded { campaigns, skipped } => {
                self.campaigns = campaigns;
                self.data_mode = DataMode::Chain;
                self.skipped = skipped;
                self.clamp_selection();
                if skipped > 0 {
                    self.set_status(
                        format!("{} pool(s) failed to load and were skipped", skipped),
                        StatusLevel::Warn,
                    );
                }
            }
            RuntimeEvent::MyPoolsLoaded { pools } => {
                self.my_pools = pools;
            }
            RuntimeEvent::ContributionLoaded { pool, amount_eth } => {
                self.set_status(
                    format!("your contribution to {}: {} ETH", short_addr(pool), amount_eth),
                    StatusLevel::Info,
                );
                self.contributions.insert(pool, amount_eth);
            }
            RuntimeEvent::TxConfirmed { kind, pool, hash } => {
                self.tx_in_flight = false;
                let what = match &kind {
                    TxKind::Create => "pool created".to_string(),
                    TxKind::Contribute { amount_eth } => {
                        format!("contributed {} ETH", amount_eth)
                    }
                    TxKind::Withdraw => "funds withdrawn".to_string(),
                    TxKind::Refund => "refund claimed".to_string(),
                };
                self.set_status(format!("{} ({:#x})", what, hash), StatusLevel::Info);
                match kind {
                    TxKind::Create => self.queue(RuntimeCommand::RefreshPools),
                    TxKind::Contribute { amount_eth } => {
                        if let Some(pool) = pool {
                            self.patch_contribution(pool, &amount_eth);
                        }
                    }
                    TxKind::Withdraw | TxKind::Refund => {
                        self.queue(RuntimeCommand::RefreshPools)
                    }
                }
            }
            RuntimeEvent::ImagePinned { url } => {
                self.set_status(
                    format!("image pinned: {} (use img={} in create)", url, url),
                    StatusLevel::Info,
                );
                self.last_pinned_url = Some(url);
            }
            RuntimeEvent::Failure { context, error } => {
                self.tx_in_flight = false;
                self.set_status(format!("{}: {}", context, error), StatusLevel::Error);
            }
        }
    }

    /// Bump the local total so the gauge moves before the next full refresh.
    fn patch_contribution(&mut self, pool: Address, amount_eth: &str) {
        let Ok(amount_wei) = eth_to_wei(amount_eth) else {
            return;
        };
        if let Some(campaign) = self
            .campaigns
            .iter_mut()
            .find(|c| c.summary.address == pool)
        {
            campaign.summary.total_contributed_wei =
                campaign.summary.total_contributed_wei.saturating_add(amount_wei);
        }
    }

    // ---- input -------------------------------------------------------------

    pub fn handle_key(&mut self, key: KeyEvent) -> Action {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return Action::Quit;
        }

        match self.input_mode {
            InputMode::Normal => self.handle_normal_key(key),
            InputMode::Command => self.handle_line_key(key, true),
            InputMode::Prompt(_) => self.handle_line_key(key, false),
        }
    }

    fn handle_normal_key(&mut self, key: KeyEvent) -> Action {
        // A queued write takes over y/n until answered.
        if self.pending_tx.is_some() {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') => return self.confirm_pending(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    return self.cancel_pending()
                }
                _ => return Action::None,
            }
        }

        if self.show_help {
            self.show_help = false;
            return Action::None;
        }

        match key.code {
            KeyCode::Char('q') => {
                self.should_quit = true;
                Action::Quit
            }
            KeyCode::Char('?') => {
                self.show_help = true;
                Action::None
            }
            KeyCode::Char('j') | KeyCode::Down => {
                self.select_next();
                Action::None
            }
            KeyCode::Char('k') | KeyCode::Up => {
                self.select_prev();
                Action::None
            }
            KeyCode::Char('g') | KeyCode::Home => {
                self.select_first();
                Action::None
            }
            KeyCode::Char('G') | KeyCode::End => {
                self.select_last();
                Action::None
            }
            KeyCode::Char('/') => {
                self.open_prompt(PromptKind::Search);
                Action::None
            }
            KeyCode::Char(':') => {
                self.input_mode = InputMode::Command;
                self.input_buffer.clear();
                Action::None
            }
            KeyCode::Char('n') => {
                self.input_mode = InputMode::Command;
                self.input_buffer = "create ".to_string();
                Action::None
            }
            KeyCode::Char('f') => {
                self.filter = self.filter.cycle();
                self.clamp_selection();
                Action::None
            }
            KeyCode::Char('s') => {
                self.sort = self.sort.cycle();
                Action::None
            }
            KeyCode::Char('r') => self.execute_command(Command::Refresh),
            KeyCode::Char('m') => self.execute_command(Command::Mine),
            KeyCode::Char('p') => {
                if self.wallet.is_connected() || self.wallet.is_connecting() {
                    self.execute_command(Command::Disconnect)
                } else {
                    self.execute_command(Command::Connect)
                }
            }
            KeyCode::Char('c') => self.execute_command(Command::Contribute(None)),
            KeyCode::Char('d') => self.execute_command(Command::Contribution),
            KeyCode::Char('w') => self.execute_command(Command::Withdraw),
            KeyCode::Char('t') => {
                if self.selected_campaign().is_none() {
                    return Action::Notify("no campaign selected".to_string(), NotifyLevel::Warn);
                }
                self.open_prompt(PromptKind::WithdrawTarget);
                Action::None
            }
            KeyCode::Char('u') => self.execute_command(Command::Refund),
            KeyCode::Char('i') => {
                self.open_prompt(PromptKind::PinPath);
                Action::None
            }
            KeyCode::Char('e') => self.execute_command(Command::Export),
            KeyCode::Char('y') => match self.selected_campaign() {
                Some(campaign) => Action::Copy(format!("{:#x}", campaign.summary.address)),
                None => Action::Notify("no campaign selected".to_string(), NotifyLevel::Warn),
            },
            _ => Action::None,
        }
    }

    fn handle_line_key(&mut self, key: KeyEvent, is_command: bool) -> Action {
        match key.code {
            KeyCode::Esc => {
                let was_password =
                    self.input_mode == InputMode::Prompt(PromptKind::KeystorePassword);
                self.input_mode = InputMode::Normal;
                self.input_buffer.clear();
                if was_password {
                    self.wallet.connect_failed();
                    return Action::Notify(
                        ChainError::UserRejected.to_string(),
                        NotifyLevel::Warn,
                    );
                }
                Action::None
            }
            KeyCode::Backspace => {
                self.input_buffer.pop();
                Action::None
            }
            KeyCode::Enter => {
                let line = std::mem::take(&mut self.input_buffer);
                let mode = self.input_mode;
                self.input_mode = InputMode::Normal;
                if is_command {
                    match parse_command(&line) {
                        Some(command) => self.execute_command(command),
                        None => Action::None,
                    }
                } else if let InputMode::Prompt(kind) = mode {
                    self.finish_prompt(kind, line)
                } else {
                    Action::None
                }
            }
            KeyCode::Char(ch) => {
                self.input_buffer.push(ch);
                Action::None
            }
            _ => Action::None,
        }
    }

    fn open_prompt(&mut self, kind: PromptKind) {
        self.input_mode = InputMode::Prompt(kind);
        self.input_buffer.clear();
        if kind == PromptKind::Search {
            self.input_buffer = self.search.clone();
        }
    }

    fn finish_prompt(&mut self, kind: PromptKind, line: String) -> Action {
        match kind {
            PromptKind::Search => {
                self.search = line.trim().to_string();
                self.selected = 0;
                Action::None
            }
            PromptKind::ContributeAmount => {
                self.execute_command(Command::Contribute(Some(line.trim().to_string())))
            }
            PromptKind::WithdrawTarget => self.execute_command(Command::WithdrawTo(
                line.trim().to_string(),
            )),
            PromptKind::KeystorePassword => {
                if line.is_empty() {
                    self.wallet.connect_failed();
                    return Action::Notify(
                        ChainError::UserRejected.to_string(),
                        NotifyLevel::Warn,
                    );
                }
                self.queue(RuntimeCommand::ConnectWallet {
                    password: Some(line),
                });
                Action::Notify("connecting wallet...".to_string(), NotifyLevel::Info)
            }
            PromptKind::PinPath => {
                let path = line.trim();
                if path.is_empty() {
                    return Action::None;
                }
                self.queue(RuntimeCommand::PinImage {
                    path: PathBuf::from(path),
                });
                Action::Notify("uploading image...".to_string(), NotifyLevel::Info)
            }
        }
    }

    // ---- commands ----------------------------------------------------------

    pub fn execute_command(&mut self, command: Command) -> Action {
        match command {
            Command::Connect => {
                if !self.wallet.begin_connect() {
                    return Action::Notify(
                        "wallet already connected".to_string(),
                        NotifyLevel::Warn,
                    );
                }
                if self.wallet_needs_password {
                    self.open_prompt(PromptKind::KeystorePassword);
                    return Action::None;
                }
                self.queue(RuntimeCommand::ConnectWallet { password: None });
                Action::Notify("connecting wallet...".to_string(), NotifyLevel::Info)
            }
            Command::Disconnect => {
                self.queue(RuntimeCommand::DisconnectWallet);
                Action::None
            }
            Command::Refresh => {
                self.queue(RuntimeCommand::RefreshPools);
                Action::Notify("refreshing campaigns...".to_string(), NotifyLevel::Info)
            }
            Command::Mine => {
                if !self.wallet.is_connected() {
                    return Action::Notify(
                        ChainError::NotConnected.to_string(),
                        NotifyLevel::Warn,
                    );
                }
                self.queue(RuntimeCommand::FetchMyPools);
                Action::Notify("fetching your pools...".to_string(), NotifyLevel::Info)
            }
            Command::Create(args) => self.command_create(args),
            Command::Contribute(amount) => self.command_contribute(amount),
            Command::Withdraw => self.command_withdraw(None),
            Command::WithdrawTo(target) => {
                let Ok(to) = target.parse::<Address>() else {
                    return Action::Notify(
                        format!("bad recipient address: {}", target),
                        NotifyLevel::Error,
                    );
                };
                self.command_withdraw(Some(to))
            }
            Command::Refund => self.command_refund(),
            Command::Contribution => {
                if !self.wallet.is_connected() {
                    return Action::Notify(
                        ChainError::NotConnected.to_string(),
                        NotifyLevel::Warn,
                    );
                }
                match self.selected_campaign() {
                    Some(campaign) => {
                        let pool = campaign.summary.address;
                        self.queue(RuntimeCommand::FetchContribution { pool });
                        Action::None
                    }
                    None => Action::Notify("no campaign selected".to_string(), NotifyLevel::Warn),
                }
            }
            Command::Pin(path) => {
                self.queue(RuntimeCommand::PinImage {
                    path: PathBuf::from(path),
                });
                Action::Notify("uploading image...".to_string(), NotifyLevel::Info)
            }
            Command::Export => export::export_campaigns(&self.campaigns),
            Command::Demo => {
                self.load_demo();
                Action::Notify("loaded demo campaigns".to_string(), NotifyLevel::Info)
            }
            Command::Unknown(what) => {
                Action::Notify(format!("unknown command: {}", what), NotifyLevel::Warn)
            }
        }
    }

    fn command_create(&mut self, args: Option<CreateArgs>) -> Action {
        if !self.wallet.is_connected() {
            return Action::Notify(ChainError::NotConnected.to_string(), NotifyLevel::Warn);
        }
        let Some(mut args) = args else {
            return Action::Notify(
                "usage: create <goal-eth> <hours> [link=URL] [img=URL] <purpose>".to_string(),
                NotifyLevel::Warn,
            );
        };
        if args.image_url.is_empty() {
            if let Some(url) = &self.last_pinned_url {
                args.image_url = url.clone();
            }
        }
        let describe = format!(
            "create pool: goal {} ETH, {} hours",
            args.goal_eth, args.duration_hours
        );
        self.stage_tx(
            RuntimeCommand::CreatePool {
                goal_eth: args.goal_eth,
                duration_hours: args.duration_hours,
                social_link: args.social_link,
                purpose: args.purpose,
                image_url: args.image_url,
            },
            describe,
        )
    }

    fn command_contribute(&mut self, amount: Option<String>) -> Action {
        if !self.wallet.is_connected() {
            return Action::Notify(ChainError::NotConnected.to_string(), NotifyLevel::Warn);
        }
        let Some(campaign) = self.selected_campaign() else {
            return Action::Notify("no campaign selected".to_string(), NotifyLevel::Warn);
        };
        let pool = campaign.summary.address;
        let Some(amount_eth) = amount else {
            self.open_prompt(PromptKind::ContributeAmount);
            return Action::None;
        };
        if eth_to_wei(&amount_eth).is_err() {
            return Action::Notify(
                format!("bad amount: {}", amount_eth),
                NotifyLevel::Error,
            );
        }
        let describe = format!("contribute {} ETH to {}", amount_eth, short_addr(pool));
        self.stage_tx(RuntimeCommand::Contribute { pool, amount_eth }, describe)
    }

    fn command_withdraw(&mut self, to: Option<Address>) -> Action {
        let Some(account) = self.wallet.account else {
            return Action::Notify(ChainError::NotConnected.to_string(), NotifyLevel::Warn);
        };
        let Some(campaign) = self.selected_campaign() else {
            return Action::Notify("no campaign selected".to_string(), NotifyLevel::Warn);
        };
        let summary = &campaign.summary;
        if !summary.can_withdraw(account) {
            return Action::Notify(
                "not eligible: you must own this pool and its goal must be met".to_string(),
                NotifyLevel::Warn,
            );
        }
        let pool = summary.address;
        match to {
            Some(to) => {
                let describe = format!(
                    "withdraw {} to {}",
                    short_addr(pool),
                    short_addr(to)
                );
                self.stage_tx(RuntimeCommand::WithdrawTo { pool, to }, describe)
            }
            None => {
                let describe = format!("withdraw funds from {}", short_addr(pool));
                self.stage_tx(RuntimeCommand::Withdraw { pool }, describe)
            }
        }
    }

    fn command_refund(&mut self) -> Action {
        if !self.wallet.is_connected() {
            return Action::Notify(ChainError::NotConnected.to_string(), NotifyLevel::Warn);
        }
        let Some(campaign) = self.selected_campaign() else {
            return Action::Notify("no campaign selected".to_string(), NotifyLevel::Warn);
        };
        let summary = &campaign.summary;
        if !summary.can_refund(Utc::now()) {
            return Action::Notify(
                "not eligible: refunds open after the deadline if the goal was missed".to_string(),
                NotifyLevel::Warn,
            );
        }
        let pool = summary.address;
        let describe = format!("claim refund from {}", short_addr(pool));
        self.stage_tx(RuntimeCommand::Refund { pool }, describe)
    }

    // ---- confirmation ------------------------------------------------------

    fn stage_tx(&mut self, command: RuntimeCommand, describe: String) -> Action {
        if self.tx_in_flight {
            return Action::Notify(
                "a transaction is already in flight".to_string(),
                NotifyLevel::Warn,
            );
        }
        self.set_status(format!("confirm: {} (y/n)", describe), StatusLevel::Warn);
        self.pending_tx = Some(PendingTx { command, describe });
        Action::None
    }

    fn confirm_pending(&mut self) -> Action {
        if let Some(pending) = self.pending_tx.take() {
            self.tx_in_flight = true;
            self.set_status(
                format!("submitting: {}", pending.describe),
                StatusLevel::Info,
            );
            self.queue(pending.command);
        }
        Action::None
    }

    fn cancel_pending(&mut self) -> Action {
        self.pending_tx = None;
        Action::Notify(ChainError::UserRejected.to_string(), NotifyLevel::Warn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::{address, U256};
    use chrono::Duration as ChronoDuration;

    use crate::domain::pool::PoolSummary;
    use crate::domain::wallet::WalletStatus;

    fn campaign(addr: Address, goal: u64, total: u64, hours_left: i64) -> Campaign {
        Campaign::from_summary(PoolSummary {
            address: addr,
            owner: address!("00000000000000000000000000000000000000aa"),
            goal_wei: U256::from(goal),
            total_contributed_wei: U256::from(total),
            deadline: Utc::now() + ChronoDuration::hours(hours_left),
            social_link: String::new(),
            purpose: "test pool".to_string(),
            image_url: String::new(),
            is_finished: false,
        })
    }

    #[test]
    fn filter_active_hides_expired_pools() {
        let mut app = App::new(false);
        app.campaigns = vec![
            campaign(address!("0000000000000000000000000000000000000001"), 10, 1, 24),
            campaign(address!("0000000000000000000000000000000000000002"), 10, 1, -24),
        ];
        app.filter = CampaignFilter::Active;
        assert_eq!(app.visible_indices(), vec![0]);
        app.filter = CampaignFilter::Ended;
        assert_eq!(app.visible_indices(), vec![1]);
    }

    #[test]
    fn progress_sort_puts_best_funded_first() {
        let mut app = App::new(false);
        app.campaigns = vec![
            campaign(address!("0000000000000000000000000000000000000001"), 10, 2, 24),
            campaign(address!("0000000000000000000000000000000000000002"), 10, 9, 24),
        ];
        app.sort = SortKey::Progress;
        assert_eq!(app.visible_indices(), vec![1, 0]);
    }

    #[test]
    fn optimistic_patch_bumps_total_after_contribute() {
        let addr = address!("0000000000000000000000000000000000000001");
        let mut app = App::new(false);
        app.campaigns = vec![campaign(addr, 10, 0, 24)];
        app.apply_event(RuntimeEvent::TxConfirmed {
            kind: TxKind::Contribute {
                amount_eth: "1".to_string(),
            },
            pool: Some(addr),
            hash: Default::default(),
        });
        assert_eq!(
            app.campaigns[0].summary.total_contributed_wei,
            U256::from(10u64).pow(U256::from(18u64))
        );
    }

    #[test]
    fn fetch_failure_without_chain_data_falls_back_to_demo() {
        let mut app = App::new(false);
        app.factory_configured = false;
        app.apply_event(RuntimeEvent::Failure {
            context: "load campaigns".to_string(),
            error: ChainError::Transport("call to the zero address".to_string()),
        });
        app.apply_event(RuntimeEvent::DemoMode);
        assert_eq!(app.data_mode, DataMode::Demo);
        assert!(!app.campaigns.is_empty());
    }

    #[test]
    fn demo_fallback_does_not_clobber_live_campaigns() {
        let addr = address!("0000000000000000000000000000000000000001");
        let mut app = App::new(false);
        app.apply_event(RuntimeEvent::CampaignsLoaded {
            campaigns: vec![campaign(addr, 10, 2, 24)],
            skipped: 0,
        });
        app.apply_event(RuntimeEvent::DemoMode);
        assert_eq!(app.data_mode, DataMode::Chain);
        assert_eq!(app.campaigns.len(), 1);
        assert_eq!(app.campaigns[0].summary.address, addr);
    }

    #[test]
    fn disconnect_keeps_campaign_browsing_state() {
        let addr = address!("0000000000000000000000000000000000000001");
        let mut app = App::new(false);
        app.apply_event(RuntimeEvent::CampaignsLoaded {
            campaigns: vec![campaign(addr, 10, 2, 24)],
            skipped: 0,
        });
        app.wallet.connected(
            address!("00000000000000000000000000000000000000bb"),
            "1".to_string(),
            31337,
        );
        app.apply_event(RuntimeEvent::WalletDisconnected);
        assert_eq!(app.wallet.status, WalletStatus::Disconnected);
        assert_eq!(app.campaigns.len(), 1);
        assert!(app.my_pools.is_empty());
    }

    #[test]
    fn cancelling_a_staged_tx_reports_user_rejection() {
        let addr = address!("0000000000000000000000000000000000000001");
        let mut app = App::new(false);
        app.campaigns = vec![campaign(addr, 10, 0, 24)];
        app.wallet.connected(
            address!("00000000000000000000000000000000000000bb"),
            "1".to_string(),
            31337,
        );
        let action = app.execute_command(Command::Contribute(Some("0.5".to_string())));
        assert_eq!(action, Action::None);
        assert!(app.pending_tx.is_some());

        let action = app.handle_key(KeyEvent::from(KeyCode::Char('n')));
        assert!(matches!(action, Action::Notify(_, NotifyLevel::Warn)));
        assert!(app.pending_tx.is_none());
        assert!(app.take_commands().is_empty());
    }
}
