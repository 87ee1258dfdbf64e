use chrono::Utc;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;

pub mod layout;

use crate::app::{App, DataMode, InputMode, PromptKind, StatusLevel};
use crate::domain::pool::{short_addr, Campaign};
use crate::domain::wallet::WalletStatus;

pub fn draw(f: &mut Frame, app: &App) {
    let areas = layout::areas(f.size());

    draw_header(f, areas.header, app);
    draw_list_panel(f, areas.list, app);
    draw_detail_panel(f, areas.details, app);
    draw_status_line(f, areas.status_line, app);
    draw_command_line(f, areas.command_line, app);

    if app.show_help {
        draw_help_popup(f, areas.size, app);
    }
}

fn draw_header(f: &mut Frame, area: Rect, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .split(area);

    let network = match app.data_mode {
        DataMode::Demo => "demo".to_string(),
        DataMode::Chain => app
            .network_name
            .clone()
            .unwrap_or_else(|| "resolving...".to_string()),
    };
    let chain = app
        .chain_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "--".to_string());
    let title = Line::from(vec![
        Span::styled(
            "FundRace",
            Style::default()
                .fg(Color::LightCyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw("  "),
        Span::styled("Network", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" {} ", network)),
        Span::styled("Chain", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" {} ", chain)),
        Span::styled("Filter", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" {} ", app.filter.label())),
        Span::styled("Sort", Style::default().fg(Color::DarkGray)),
        Span::raw(format!(" {}", app.sort.label())),
    ]);
    let left = Paragraph::new(title)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    let wallet_line = match app.wallet.status {
        WalletStatus::Disconnected => Line::from(vec![
            Span::styled("Wallet ", Style::default().fg(Color::DarkGray)),
            Span::styled("disconnected", Style::default().fg(Color::DarkGray)),
        ]),
        WalletStatus::Connecting => Line::from(vec![
            Span::styled("Wallet ", Style::default().fg(Color::DarkGray)),
            Span::styled("connecting...", Style::default().fg(Color::LightYellow)),
        ]),
        WalletStatus::Connected => {
            let account = app
                .wallet
                .account
                .map(short_addr)
                .unwrap_or_else(|| "--".to_string());
            Line::from(vec![
                Span::styled("Wallet ", Style::default().fg(Color::DarkGray)),
                Span::styled(account, Style::default().fg(Color::LightGreen)),
                Span::raw("  "),
                Span::styled("Balance ", Style::default().fg(Color::DarkGray)),
                Span::raw(format!("{} ETH", app.wallet.balance_eth)),
            ])
        }
    };
    let right = Paragraph::new(wallet_line)
        .block(Block::default().borders(Borders::ALL))
        .alignment(Alignment::Left);

    f.render_widget(left, chunks[0]);
    f.render_widget(right, chunks[1]);
}

fn campaign_item<'a>(app: &App, campaign: &'a Campaign) -> ListItem<'a> {
    let summary = &campaign.summary;
    let now = Utc::now();
    let marker = if summary.is_finished {
        Span::styled("[closed]", Style::default().fg(Color::DarkGray))
    } else if summary.is_funded() {
        Span::styled("[funded]", Style::default().fg(Color::LightGreen))
    } else if summary.deadline_passed(now) {
        Span::styled("[ended] ", Style::default().fg(Color::LightRed))
    } else {
        Span::styled("[open]  ", Style::default().fg(Color::LightCyan))
    };
    let mine = if app.my_pools.contains(&summary.address) {
        Span::styled(" *", Style::default().fg(Color::LightYellow))
    } else {
        Span::raw("")
    };
    let line = Line::from(vec![
        marker,
        Span::raw(" "),
        Span::raw(campaign.title.clone()),
        Span::raw(format!(
            "  {}/{} ETH",
            summary.total_contributed_eth(),
            summary.goal_eth()
        )),
        mine,
    ]);
    ListItem::new(line)
}

fn draw_list_panel(f: &mut Frame, area: Rect, app: &App) {
    let visible = app.visible_indices();
    let title = if app.search.is_empty() {
        format!("Campaigns ({})", visible.len())
    } else {
        format!("Campaigns ({}) /{}", visible.len(), app.search)
    };

    let items: Vec<ListItem> = visible
        .iter()
        .map(|&i| campaign_item(app, &app.campaigns[i]))
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(title))
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol(">> ");

    let mut state = ListState::default();
    if !visible.is_empty() {
        state.select(Some(app.selected.min(visible.len() - 1)));
    }
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_detail_panel(f: &mut Frame, area: Rect, app: &App) {
    let block = Block::default().borders(Borders::ALL).title("Campaign");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let Some(campaign) = app.selected_campaign() else {
        let empty = Paragraph::new("No campaign selected").wrap(Wrap { trim: true });
        f.render_widget(empty, inner);
        return;
    };
    let summary = &campaign.summary;
    let now = Utc::now();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    let mut lines = vec![
        Line::from(Span::styled(
            campaign.title.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::from(""),
        field("Pool", format!("{:#x}", summary.address)),
        field("Owner", format!("{:#x}", summary.owner)),
        field(
            "Raised",
            format!(
                "{} / {} ETH",
                summary.total_contributed_eth(),
                summary.goal_eth()
            ),
        ),
        field("Deadline", summary.deadline.format("%Y-%m-%d %H:%M UTC").to_string()),
    ];
    if !summary.purpose.is_empty() {
        lines.push(field("Purpose", summary.purpose.clone()));
    }
    if !summary.social_link.is_empty() {
        lines.push(field("Link", summary.social_link.clone()));
    }
    if !summary.image_url.is_empty() {
        lines.push(field("Image", summary.image_url.clone()));
    }
    if let Some(amount) = app.contributions.get(&summary.address) {
        lines.push(field("Yours", format!("{} ETH", amount)));
    }
    lines.push(Line::from(""));

    let state_text = if summary.is_finished {
        Span::styled("closed by owner", Style::default().fg(Color::DarkGray))
    } else if summary.is_funded() {
        Span::styled("goal met", Style::default().fg(Color::LightGreen))
    } else if summary.deadline_passed(now) {
        Span::styled("deadline passed, goal missed", Style::default().fg(Color::LightRed))
    } else {
        Span::styled("accepting contributions", Style::default().fg(Color::LightCyan))
    };
    lines.push(Line::from(vec![
        Span::styled("State    ", Style::default().fg(Color::DarkGray)),
        state_text,
    ]));

    if let Some(account) = app.wallet.account {
        let withdraw = if summary.can_withdraw(account) { "yes" } else { "no" };
        let refund = if summary.can_refund(now) { "yes" } else { "no" };
        lines.push(Line::from(vec![
            Span::styled("Withdraw ", Style::default().fg(Color::DarkGray)),
            Span::raw(withdraw),
            Span::raw("   "),
            Span::styled("Refund ", Style::default().fg(Color::DarkGray)),
            Span::raw(refund),
        ]));
    }

    let paragraph = Paragraph::new(Text::from(lines)).wrap(Wrap { trim: true });
    f.render_widget(paragraph, chunks[0]);

    let fraction = summary.progress_fraction().clamp(0.0, 1.0);
    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(Color::Cyan))
        .ratio(fraction)
        .label(format!("{:.0}%", fraction * 100.0));
    f.render_widget(gauge, chunks[1]);
}

fn field(name: &str, value: String) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("{:<9}", name), Style::default().fg(Color::DarkGray)),
        Span::raw(value),
    ])
}

fn draw_status_line(f: &mut Frame, area: Rect, app: &App) {
    let endpoint = app.endpoint.as_deref().unwrap_or("--");
    let mut spans = vec![
        Span::styled("RPC ", Style::default().fg(Color::DarkGray)),
        Span::raw(format!("{}  ", endpoint)),
        Span::styled("Factory ", Style::default().fg(Color::DarkGray)),
        Span::raw(if app.factory_configured { "ok  " } else { "--  " }),
    ];
    if app.data_mode == DataMode::Demo {
        spans.push(Span::styled(
            "DEMO DATA  ",
            Style::default().fg(Color::LightYellow),
        ));
    }
    if app.skipped > 0 {
        spans.push(Span::styled(
            format!("{} skipped  ", app.skipped),
            Style::default().fg(Color::LightYellow),
        ));
    }
    if app.tx_in_flight {
        spans.push(Span::styled(
            "tx pending...",
            Style::default().fg(Color::LightYellow),
        ));
    }

    let paragraph = Paragraph::new(Line::from(spans))
        .style(Style::default().fg(Color::White))
        .alignment(Alignment::Left);
    f.render_widget(paragraph, area);
}

fn draw_command_line(f: &mut Frame, area: Rect, app: &App) {
    let content = match app.input_mode {
        InputMode::Command => Line::from(vec![
            Span::styled(": ", Style::default().fg(Color::Yellow)),
            Span::raw(app.input_buffer.clone()),
            Span::styled(
                "  (connect refresh mine create contribute withdraw refund pin export)",
                Style::default().fg(Color::DarkGray),
            ),
        ]),
        InputMode::Prompt(kind) => {
            let shown = if kind == PromptKind::KeystorePassword {
                "*".repeat(app.input_buffer.chars().count())
            } else {
                app.input_buffer.clone()
            };
            Line::from(vec![
                Span::styled(
                    format!("> {} ", kind.label()),
                    Style::default().fg(Color::LightCyan),
                ),
                Span::raw(shown),
                Span::styled(
                    "  (Enter=ok Esc=cancel)",
                    Style::default().fg(Color::DarkGray),
                ),
            ])
        }
        InputMode::Normal => {
            if let Some((text, level)) = app.status_line() {
                let color = match level {
                    StatusLevel::Info => Color::LightGreen,
                    StatusLevel::Warn => Color::LightYellow,
                    StatusLevel::Error => Color::LightRed,
                };
                Line::from(vec![
                    Span::styled("msg: ", Style::default().fg(Color::DarkGray)),
                    Span::styled(text.to_string(), Style::default().fg(color)),
                ])
            } else {
                Line::from(Span::styled(
                    "? help  : command  / search  c contribute  w withdraw  u refund  q quit",
                    Style::default().fg(Color::DarkGray),
                ))
            }
        }
    };

    let paragraph = Paragraph::new(content).style(Style::default().fg(Color::White));
    f.render_widget(paragraph, area);
}

fn draw_help_popup(f: &mut Frame, area: Rect, _app: &App) {
    let popup_area = layout::centered_rect(70, 70, area);
    f.render_widget(Clear, popup_area);

    let lines = vec![
        Line::from("Navigation"),
        Line::from("  j / k      Move selection (vim)"),
        Line::from("  g / G      Top / bottom"),
        Line::from("  /          Search campaigns"),
        Line::from("  f          Cycle filter (all / active / ended)"),
        Line::from("  s          Cycle sort (newest / progress / deadline)"),
        Line::from(""),
        Line::from("Wallet"),
        Line::from("  p          Connect / disconnect wallet"),
        Line::from("  m          Show pools you created"),
        Line::from("  d          Show your contribution to selected pool"),
        Line::from(""),
        Line::from("Actions (y confirms, n cancels)"),
        Line::from("  c          Contribute to selected pool"),
        Line::from("  n          New pool (prefills :create)"),
        Line::from("  w          Withdraw (owner, goal met)"),
        Line::from("  t          Withdraw to another address"),
        Line::from("  u          Refund (deadline passed, goal missed)"),
        Line::from("  i          Pin a campaign image"),
        Line::from(""),
        Line::from("Misc"),
        Line::from("  y          Copy pool address"),
        Line::from("  e          Export campaigns (CSV + JSON)"),
        Line::from("  r          Refresh from chain"),
        Line::from("  ?          Toggle help"),
        Line::from("  q          Quit"),
        Line::from(""),
        Line::from("Command examples:"),
        Line::from("  :create 2.5 720 link=https://x.com/me img=https://pic/a.png laptops"),
        Line::from("  :contribute 0.25"),
        Line::from("  :withdraw 0x<40-hex-address>"),
    ];

    let paragraph = Paragraph::new(Text::from(lines))
        .block(Block::default().title("Help").borders(Borders::ALL))
        .alignment(Alignment::Left)
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}
