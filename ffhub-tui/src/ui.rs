//! Ratatui rendering for the TUI.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{
    Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Tabs, Wrap,
};

use ffhub_sdk::model::{JoinStatus, Tournament};
use ffhub_sdk::registration::Step;

use crate::app::{AdminState, AdminTab, App, Modal, RegisterState, ScoutState, Tab};
use crate::form::Form;

const CARD_HEIGHT: u16 = 7;
const ACCENT: Color = Color::Yellow;

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // status bar
            Constraint::Length(1), // tab bar
            Constraint::Min(3),    // body
            Constraint::Length(1), // footer
        ])
        .split(frame.area());

    draw_status_bar(frame, app, chunks[0]);
    draw_tab_bar(frame, app, chunks[1]);
    match app.tab {
        Tab::Home => draw_home(frame, app, chunks[2]),
        Tab::History => draw_history(frame, app, chunks[2]),
    }
    draw_footer(frame, app, chunks[3]);

    match &app.modal {
        Some(Modal::Onboarding(form)) => {
            let area = centered(frame.area(), 60, 12);
            draw_form(frame, form, area, " Create your player profile ");
        }
        Some(Modal::Register(st)) => draw_register(frame, st),
        Some(Modal::Scout(st)) => draw_scout(frame, st),
        Some(Modal::AdminLogin(form)) => {
            let area = centered(frame.area(), 40, 3);
            draw_form(frame, form, area, " Admin Login ");
        }
        Some(Modal::Admin(st)) => draw_admin(frame, st),
        None => {}
    }
}

fn draw_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let player = match &app.profile {
        Some(p) => format!("{} ({})", p.ign, p.uid),
        None => "new player".to_string(),
    };
    let refreshing = if app.refreshing { " | refreshing..." } else { "" };
    let text = format!(" FF HUB | {player} | data: {}{refreshing}", app.origin.label());
    let status = Paragraph::new(text).style(Style::default().bg(Color::Blue).fg(Color::White));
    frame.render_widget(status, area);
}

fn draw_tab_bar(frame: &mut Frame, app: &App, area: Rect) {
    let joined = format!("Joined ({})", app.history.len());
    let tabs = Tabs::new(vec![Line::from("Tourney"), Line::from(joined)])
        .select(match app.tab {
            Tab::Home => 0,
            Tab::History => 1,
        })
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .divider("|");
    frame.render_widget(tabs, area);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let line = match &app.notice {
        Some(n) => Line::from(Span::styled(format!(" {n}"), Style::default().fg(ACCENT))),
        None => Line::from(Span::styled(
            match app.tab {
                Tab::Home => " ↑↓ select  Enter join  s scout  Tab joined  p profile  a admin  ^R refresh  q quit",
                Tab::History => " Tab tourney  p profile  ^R refresh  q quit",
            },
            Style::default().fg(Color::DarkGray),
        )),
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn draw_home(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(CARD_HEIGHT)])
        .split(area);

    let banners = &app.data.config.banners;
    let banner_text = banners.get(app.banner).map(String::as_str).unwrap_or("");
    let dots: String = (0..banners.len())
        .map(|i| if i == app.banner { '●' } else { '○' })
        .collect();
    let banner = Paragraph::new(banner_text)
        .block(Block::default().borders(Borders::ALL).title(format!(" {dots} ")));
    frame.render_widget(banner, chunks[0]);

    let list = chunks[1];
    if app.data.tournaments.is_empty() {
        frame.render_widget(
            Paragraph::new("No matches scheduled.").block(Block::default().borders(Borders::ALL)),
            list,
        );
        return;
    }

    let visible = usize::from((list.height / CARD_HEIGHT).max(1));
    let first = app.selected.saturating_sub(visible - 1);
    let mut y = list.y;
    for (i, t) in app.data.tournaments.iter().enumerate().skip(first).take(visible) {
        let rect = Rect::new(list.x, y, list.width, CARD_HEIGHT.min(list.bottom() - y));
        draw_card(frame, t, i == app.selected, rect);
        y += CARD_HEIGHT;
    }
}

fn draw_card(frame: &mut Frame, t: &Tournament, selected: bool, area: Rect) {
    let border = if selected {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(Color::DarkGray)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(Span::styled(
            format!(" {} ", t.title),
            Style::default().add_modifier(Modifier::BOLD),
        ));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Min(0),
        ])
        .split(inner);

    let info = format!("{} | {} | {} {}", t.match_type, t.map, t.date, t.time);
    frame.render_widget(Paragraph::new(info), rows[0]);

    let money = Line::from(vec![
        Span::raw(format!("Entry ₹{}   ", t.entry_fee)),
        Span::styled(format!("Prize ₹{}", t.prize_pool), Style::default().fg(Color::Green)),
    ]);
    frame.render_widget(Paragraph::new(money), rows[1]);

    let gauge = Gauge::default()
        .gauge_style(Style::default().fg(if t.is_full() { Color::Red } else { ACCENT }))
        .ratio(f64::from(t.fill_percent()) / 100.0)
        .label(format!("{}/{} joined, {} left", t.joined_slots, t.total_slots, t.slots_left()));
    frame.render_widget(gauge, rows[2]);

    let button = if t.is_full() {
        Span::styled("[ MATCH FULL ]", Style::default().fg(Color::Red))
    } else {
        Span::styled(
            "[ JOIN NOW ]",
            Style::default().fg(Color::Black).bg(Color::Green).add_modifier(Modifier::BOLD),
        )
    };
    frame.render_widget(Paragraph::new(Line::from(button)), rows[3]);
}

fn draw_history(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default().borders(Borders::ALL).title(" My Matches ");
    if app.history.is_empty() {
        let text = vec![
            Line::from(""),
            Line::from("You haven't joined any matches yet.").centered(),
            Line::from(Span::styled(
                "Press Enter to explore tournaments",
                Style::default().fg(ACCENT),
            ))
            .centered(),
        ];
        frame.render_widget(Paragraph::new(text).block(block), area);
        return;
    }

    let items: Vec<ListItem> = app
        .history
        .iter()
        .map(|h| {
            let status = match h.status {
                JoinStatus::Pending => Style::default().fg(Color::Yellow),
                JoinStatus::Confirmed => Style::default().fg(Color::Green),
            };
            let joined = chrono::DateTime::from_timestamp_millis(h.joined_at)
                .map(|t| t.with_timezone(&chrono::Local).format("%d %b %H:%M").to_string())
                .unwrap_or_default();
            ListItem::new(vec![
                Line::from(vec![
                    Span::styled(
                        h.tournament_title.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                    Span::raw("  "),
                    Span::styled(format!("[{}]", h.status.label()), status),
                ]),
                Line::from(Span::styled(
                    format!("  match {} | paid ₹{} | joined {joined}", h.date, h.entry_fee),
                    Style::default().fg(Color::DarkGray),
                )),
            ])
        })
        .collect();
    frame.render_widget(List::new(items).block(block), area);
}

fn draw_register(frame: &mut Frame, st: &RegisterState) {
    let area = centered(frame.area(), 64, 16);
    frame.render_widget(Clear, area);
    let t = st.reg.tournament();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(format!(" Join {} | Step {}/3 ", t.title, st.reg.step().number()));

    match st.reg.step() {
        Step::Rules => {
            let text = vec![
                Line::from(Span::styled(
                    "Match rules",
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(t.rules.as_str()),
                Line::from(""),
                Line::from(Span::styled(
                    "Enter: I agree   Esc: cancel",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: true }).block(block), area);
        }
        Step::Details => {
            let title = format!(" Confirm your details | Step 2/3 - {} ", t.title);
            draw_form(frame, &st.details, area, &title);
        }
        Step::Payment => {
            let text = vec![
                Line::from(vec![
                    Span::raw("Pay "),
                    Span::styled(
                        format!("₹{}", t.entry_fee),
                        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                    ),
                    Span::raw(" via UPI"),
                ]),
                Line::from(""),
                Line::from(st.reg.upi_link()),
                Line::from(""),
                Line::from(Span::styled("QR code:", Style::default().fg(Color::DarkGray))),
                Line::from(st.reg.qr_url()),
                Line::from(""),
                Line::from(Span::styled(
                    "o: open QR   Enter: I've paid, send on WhatsApp   Esc: back",
                    Style::default().fg(Color::DarkGray),
                )),
            ];
            frame.render_widget(Paragraph::new(text).wrap(Wrap { trim: false }).block(block), area);
        }
    }
}

fn draw_scout(frame: &mut Frame, st: &ScoutState) {
    let area = centered(frame.area(), 60, 12);
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Magenta))
        .title(format!(" AI Scout | {} ({}) ", st.map, st.mode));
    let mut lines: Vec<Line> = match &st.text {
        Some(text) => text.lines().map(Line::from).collect(),
        None => vec![Line::from(Span::styled(
            "Analyzing map data...",
            Style::default().fg(Color::DarkGray),
        ))],
    };
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "r: regenerate   Esc: close",
        Style::default().fg(Color::DarkGray),
    )));
    frame.render_widget(Paragraph::new(lines).wrap(Wrap { trim: true }).block(block), area);
}

fn draw_admin(frame: &mut Frame, st: &AdminState) {
    let area = centered(frame.area(), 90, 26);
    frame.render_widget(Clear, area);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Red))
        .title(" Admin Panel ");
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(1), Constraint::Min(3), Constraint::Length(1)])
        .split(inner);

    let titles: Vec<Line> = AdminTab::ALL
        .iter()
        .enumerate()
        .map(|(i, t)| Line::from(format!("F{} {}", i + 1, t.label())))
        .collect();
    let selected = AdminTab::ALL.iter().position(|t| *t == st.tab).unwrap_or(0);
    let tabs = Tabs::new(titles)
        .select(selected)
        .style(Style::default().fg(Color::DarkGray))
        .highlight_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD))
        .divider("|");
    frame.render_widget(tabs, chunks[0]);

    let hint = match st.tab {
        AdminTab::Matches if st.edit.is_some() => "Enter save  Esc discard",
        AdminTab::Matches => "n new  e edit  t type  d delete  ^A apply draft  Esc close",
        AdminTab::Settings => "Enter save  ^B add banner  ^X remove banner  ^A apply draft  Esc close",
        AdminTab::Export => "w write file  ^A apply draft  Esc close",
        AdminTab::Sync if st.publishing => "Publishing...",
        AdminTab::Sync => "Enter save and publish draft  Esc close",
    };

    match st.tab {
        AdminTab::Matches => match &st.edit {
            Some((_, form)) => draw_form(frame, form, chunks[1], " Edit match "),
            None => draw_admin_matches(frame, st, chunks[1]),
        },
        AdminTab::Settings => draw_form(frame, &st.settings, chunks[1], " App settings "),
        AdminTab::Export => {
            let json = st.editor.export_json();
            let export = Paragraph::new(json)
                .block(Block::default().borders(Borders::ALL).title(" tournaments.json "));
            frame.render_widget(export, chunks[1]);
        }
        AdminTab::Sync => draw_form(frame, &st.sync, chunks[1], " GitHub sync "),
    }

    frame.render_widget(
        Paragraph::new(Span::styled(hint, Style::default().fg(Color::DarkGray))),
        chunks[2],
    );
}

fn draw_admin_matches(frame: &mut Frame, st: &AdminState, area: Rect) {
    let items: Vec<ListItem> = st
        .editor
        .draft()
        .tournaments
        .iter()
        .map(|t| {
            ListItem::new(format!(
                "{:<28} {:<6} ₹{:<5} {}/{}  {} {}",
                t.title,
                t.match_type.label(),
                t.entry_fee,
                t.joined_slots,
                t.total_slots,
                t.date,
                t.time
            ))
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(" Matches (draft) "))
        .highlight_style(Style::default().fg(Color::Black).bg(ACCENT))
        .highlight_symbol("> ");
    let mut state = ListState::default().with_selected(Some(st.selected));
    frame.render_stateful_widget(list, area, &mut state);
}

fn draw_form(frame: &mut Frame, form: &Form, area: Rect, title: &str) {
    frame.render_widget(Clear, area);
    let lines: Vec<Line> = form
        .fields
        .iter()
        .enumerate()
        .map(|(i, f)| {
            let focused = i == form.focus;
            let label = format!("{}{}: ", f.label, if f.required { "*" } else { "" });
            let label_style = if focused {
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            };
            let mut value = f.display();
            if focused {
                value.push('_');
            }
            Line::from(vec![Span::styled(label, label_style), Span::raw(value)])
        })
        .collect();
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(ACCENT))
        .title(title.to_string());
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// A `width` x `height` rect (plus borders) centered in `area`, clamped to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = (width + 2).min(area.width);
    let h = (height + 2).min(area.height);
    Rect::new(area.x + (area.width - w) / 2, area.y + (area.height - h) / 2, w, h)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn centered_fits_inside() {
        let outer = Rect::new(0, 0, 100, 40);
        let r = centered(outer, 60, 12);
        assert_eq!((r.width, r.height), (62, 14));
        assert_eq!((r.x, r.y), (19, 13));

        let tiny = Rect::new(0, 0, 20, 5);
        let r = centered(tiny, 60, 12);
        assert_eq!(r, tiny);
    }
}
