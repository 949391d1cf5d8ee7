use ratatui::{
    Frame,
    layout::{Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
};

use crate::session::render::InboxContent;
use crate::terminal::state::{Focus, InboxView, ViewMode};

pub fn render(f: &mut Frame, view: &InboxView) {
    let [header, main, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .margin(1)
    .areas(f.area());

    render_header(f, view, header);

    match view.mode {
        ViewMode::ListOnly => render_list(f, view, main),
        ViewMode::Split => {
            let [left, right] =
                Layout::horizontal([Constraint::Percentage(35), Constraint::Percentage(65)])
                    .areas(main);
            render_list(f, view, left);
            render_body(f, view, right);
        }
    }

    let hint = Paragraph::new(Line::from(vec![
        Span::styled("g", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" new address  "),
        Span::styled("c", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" copy  "),
        Span::styled("r", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" refresh  "),
        Span::styled("j/k", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" move  "),
        Span::styled("Enter", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" open  "),
        Span::styled("Tab", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" focus  "),
        Span::styled("q", Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(" quit"),
    ]));
    f.render_widget(hint, footer);
}

fn render_header(f: &mut Frame, view: &InboxView, area: Rect) {
    let address_style = if view.address_ready {
        Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let mut spans = vec![
        Span::styled(view.address_line.clone(), address_style),
        Span::raw("  "),
        Span::styled(
            format!("[{}]", view.copy_button.label()),
            Style::default().fg(Color::Yellow),
        ),
    ];
    if view.refreshing {
        spans.push(Span::styled(
            "  refreshing…",
            Style::default().fg(Color::DarkGray),
        ));
    }

    let block = Block::default()
        .title(" Temporary address ")
        .title_bottom(Line::from(format!(" {} ", view.counter)).right_aligned())
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Blue));

    f.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_list(f: &mut Frame, view: &InboxView, area: Rect) {
    let border = if view.focus == Focus::List {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .title(" Inbox ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    match &view.inbox {
        InboxContent::Notice(text) => {
            let p = Paragraph::new(*text)
                .style(Style::default().fg(Color::Gray))
                .block(block);
            f.render_widget(p, area);
        }
        InboxContent::Messages(cards) => {
            let items: Vec<ListItem> = cards
                .iter()
                .map(|c| {
                    let top = Line::from(vec![
                        Span::styled(c.from.clone(), Style::default().fg(Color::Cyan)),
                        Span::raw("  "),
                        Span::styled(c.date.clone(), Style::default().fg(Color::DarkGray)),
                    ]);
                    let subj = Span::styled(
                        c.subject.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    );
                    ListItem::new(Text::from(vec![top, Line::from(subj)]))
                })
                .collect();

            let list = List::new(items)
                .block(block)
                .highlight_symbol("➜ ")
                .highlight_style(Style::default().fg(Color::Green));

            f.render_stateful_widget(list, area, &mut view.list_state.clone());
        }
    }
}

fn render_body(f: &mut Frame, view: &InboxView, area: Rect) {
    let border = if view.focus == Focus::Body {
        Color::Yellow
    } else {
        Color::DarkGray
    };
    let block = Block::default()
        .title(" Message ")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border));

    let text = match view.selected_card() {
        Some(c) => Text::from(
            [
                Line::from(vec![
                    Span::styled("From: ", Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(c.from.clone()),
                ]),
                Line::from(vec![
                    Span::styled("Date: ", Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(c.date.clone()),
                ]),
                Line::from(vec![
                    Span::styled("Subject: ", Style::default().add_modifier(Modifier::BOLD)),
                    Span::raw(c.subject.clone()),
                ]),
                Line::raw(""),
            ]
            .into_iter()
            .chain(c.body.lines().map(|l| Line::raw(l.to_string())))
            .collect::<Vec<_>>(),
        ),
        None => Text::raw("No message selected."),
    };

    let p = Paragraph::new(text)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((view.body_scroll, 0));

    f.render_widget(p, area);
}
