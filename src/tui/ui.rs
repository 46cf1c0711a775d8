//! Render projection: `App` state in, ratatui widgets out. Nothing in here
//! mutates state.

use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};
use ratatui::Frame;
use unicode_width::UnicodeWidthStr;

use crate::api::types::{CapsuleStatus, DecisionStatus, TaskPriority, TaskStatus};
use crate::config::VERSION;
use crate::tui::app::{App, MenuAction, Screen, PROJECT_MENU};

const ACCENT: Color = Color::Cyan;
const DIM: Color = Color::DarkGray;
const ERROR: Color = Color::Red;

pub fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(2),
        ])
        .split(frame.area());

    draw_header(frame, app, chunks[0]);
    draw_content(frame, app, chunks[1]);
    draw_footer(frame, app, chunks[2]);
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let mut context = String::new();
    if let Some(org) = &app.session.organization {
        context.push_str(&org.name);
    }
    if let Some(project) = &app.session.project {
        if !context.is_empty() {
            context.push_str(" / ");
        }
        context.push_str(&project.name);
    }
    let user = app
        .session
        .user
        .as_ref()
        .map(|u| u.email.clone())
        .unwrap_or_default();

    let mut spans = vec![
        Span::styled("hopsule", Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        Span::styled(format!(" v{VERSION}"), Style::default().fg(DIM)),
        Span::raw("  "),
        Span::styled(screen_title(app.screen), Style::default().add_modifier(Modifier::BOLD)),
    ];
    if !context.is_empty() {
        spans.push(Span::styled(format!("  {context}"), Style::default().fg(DIM)));
    }
    if !user.is_empty() {
        spans.push(Span::styled(format!("  ({user})"), Style::default().fg(DIM)));
    }

    let header = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::BOTTOM).border_style(Style::default().fg(DIM)));
    frame.render_widget(header, area);
}

fn screen_title(screen: Screen) -> &'static str {
    match screen {
        Screen::Login => "Login",
        Screen::Organizations => "Organizations",
        Screen::Projects => "Projects",
        Screen::ProjectMenu => "Project",
        Screen::Dashboard => "Dashboard",
        Screen::Decisions => "Decisions",
        Screen::Memories => "Memories",
        Screen::Capsules => "Capsules",
        Screen::Tasks => "Tasks",
        Screen::Brain => "Brain",
        Screen::Chat => "Hopper",
    }
}

fn draw_content(frame: &mut Frame, app: &App, area: Rect) {
    if app.loading && app.screen != Screen::Chat {
        let loading = Paragraph::new(Line::from(Span::styled(
            "  Loading...",
            Style::default().fg(DIM),
        )));
        frame.render_widget(loading, area);
        return;
    }

    let lines = match app.screen {
        Screen::Login => login_lines(),
        Screen::Organizations => organization_lines(app),
        Screen::Projects => project_lines(app),
        Screen::ProjectMenu => menu_lines(app),
        Screen::Dashboard => dashboard_lines(app),
        Screen::Decisions => decision_lines(app, area.width),
        Screen::Memories => memory_lines(app, area.width),
        Screen::Capsules => capsule_lines(app, area.width),
        Screen::Tasks => task_lines(app, area.width),
        Screen::Brain => brain_lines(app),
        Screen::Chat => {
            draw_chat(frame, app, area);
            return;
        }
    };

    frame.render_widget(Paragraph::new(lines), area);
}

fn login_lines() -> Vec<Line<'static>> {
    vec![
        Line::raw(""),
        Line::from(Span::styled(
            "  Not logged in.",
            Style::default().add_modifier(Modifier::BOLD),
        )),
        Line::raw(""),
        Line::from(vec![
            Span::raw("  Press "),
            Span::styled("enter", Style::default().fg(ACCENT)),
            Span::raw(" to log in through your browser."),
        ]),
    ]
}

fn selectable<'a>(selected: bool, text: String) -> Line<'a> {
    if selected {
        Line::from(Span::styled(
            format!("▸ {text}"),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        ))
    } else {
        Line::from(Span::raw(format!("  {text}")))
    }
}

fn organization_lines(app: &App) -> Vec<Line<'_>> {
    let mut lines = vec![Line::raw("")];
    let orgs = &app.session.organizations;
    if orgs.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No organizations.",
            Style::default().fg(DIM),
        )));
    }
    for (i, org) in orgs.iter().enumerate() {
        let selected = app.cursor.selected == i;
        lines.push(selectable(selected, format!("{} ({})", org.name, org.slug)));
    }
    lines.push(Line::raw(""));
    lines.push(selectable(
        app.cursor.selected == orgs.len(),
        "Logout".to_string(),
    ));
    lines
}

fn project_lines(app: &App) -> Vec<Line<'_>> {
    let mut lines = vec![Line::raw("")];
    let projects = app.session.org_projects();
    if projects.is_empty() {
        lines.push(Line::from(Span::styled(
            "  No projects in this organization.",
            Style::default().fg(DIM),
        )));
    }
    for (i, project) in projects.iter().enumerate() {
        let selected = app.cursor.selected == i;
        let mut text = project.name.clone();
        if !project.description.is_empty() {
            text.push_str(&format!("  - {}", project.description));
        }
        lines.push(selectable(selected, text));
    }
    lines
}

fn menu_lines(app: &App) -> Vec<Line<'_>> {
    let mut lines = vec![Line::raw("")];
    for (i, item) in PROJECT_MENU.iter().enumerate() {
        if item.action == MenuAction::Separator {
            lines.push(Line::raw(""));
            continue;
        }
        let selected = app.cursor.selected == i;
        let marker = if selected { "▸" } else { " " };
        let style = if selected {
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        lines.push(Line::from(vec![
            Span::styled(format!(" {marker} {} {:<12}", item.icon, item.title), style),
            Span::styled(item.detail, Style::default().fg(DIM)),
        ]));
    }
    lines
}

fn dashboard_lines(app: &App) -> Vec<Line<'_>> {
    let Some(data) = &app.dashboard else {
        return vec![Line::from(Span::styled("  No data.", Style::default().fg(DIM)))];
    };
    let accepted = data
        .decisions
        .iter()
        .filter(|d| d.status == DecisionStatus::Accepted)
        .count();
    let pending = data
        .decisions
        .iter()
        .filter(|d| d.status.acceptable())
        .count();
    let open_tasks = data
        .tasks
        .iter()
        .filter(|t| t.status != TaskStatus::Done)
        .count();

    let kpi = |label: &str, value: String| {
        Line::from(vec![
            Span::styled(format!("  {label:<12}"), Style::default().fg(DIM)),
            Span::styled(value, Style::default().add_modifier(Modifier::BOLD)),
        ])
    };
    vec![
        Line::raw(""),
        kpi(
            "Decisions",
            format!(
                "{} total, {} accepted, {} draft/pending",
                data.decisions.len(),
                accepted,
                pending
            ),
        ),
        kpi("Memories", format!("{}", data.memories.len())),
        kpi(
            "Tasks",
            format!("{} total, {} open", data.tasks.len(), open_tasks),
        ),
        kpi("Capsules", format!("{}", data.capsules.len())),
    ]
}

/// Shared list framing: window slice plus "more above/below" markers.
fn windowed<'a, T>(
    app: &App,
    items: &'a [T],
    empty_text: &'static str,
    mut row: impl FnMut(usize, &'a T, bool) -> Line<'a>,
) -> Vec<Line<'a>> {
    let mut lines = vec![Line::raw("")];
    if items.is_empty() {
        lines.push(Line::from(Span::styled(
            format!("  {empty_text}"),
            Style::default().fg(DIM),
        )));
        return lines;
    }
    let above = app.cursor.hidden_above();
    if above > 0 {
        lines.push(Line::from(Span::styled(
            format!("    ↑ {above} more above"),
            Style::default().fg(DIM),
        )));
    }
    for i in app.cursor.window(items.len()) {
        lines.push(row(i, &items[i], app.cursor.selected == i));
    }
    let below = app.cursor.hidden_below(items.len());
    if below > 0 {
        lines.push(Line::from(Span::styled(
            format!("    ↓ {below} more below"),
            Style::default().fg(DIM),
        )));
    }
    lines
}

fn status_color(status: DecisionStatus) -> Color {
    match status {
        DecisionStatus::Accepted => Color::Green,
        DecisionStatus::Pending | DecisionStatus::Draft => Color::Yellow,
        DecisionStatus::Rejected | DecisionStatus::Deprecated => Color::Red,
    }
}

fn decision_lines(app: &App, width: u16) -> Vec<Line<'_>> {
    windowed(app, &app.decisions, "No decisions yet.", move |_, d, selected| {
        let marker = if selected { "▸" } else { " " };
        let style = if selected {
            Style::default().add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        Line::from(vec![
            Span::styled(format!(" {marker} "), Style::default().fg(ACCENT)),
            Span::styled(
                format!("[{:^11}]", d.status.as_str()),
                Style::default().fg(status_color(d.status)),
            ),
            Span::styled(format!(" {}", fit(&d.statement, width, 18)), style),
        ])
    })
}

fn memory_lines(app: &App, width: u16) -> Vec<Line<'_>> {
    windowed(app, &app.memories, "No memories yet.", move |_, m, selected| {
        let marker = if selected { "▸" } else { " " };
        let first_line = m.content.lines().next().unwrap_or("");
        let mut text = fit(first_line, width, 6);
        if !m.tags.is_empty() {
            text.push_str(&format!("  [{}]", m.tags.join(", ")));
        }
        if !m.decision_ids.is_empty() {
            text.push_str(&format!("  ({} linked)", m.decision_ids.len()));
        }
        selectable_row(marker, text, selected)
    })
}

fn capsule_lines(app: &App, width: u16) -> Vec<Line<'_>> {
    windowed(app, &app.capsules, "No capsules yet.", move |_, c, selected| {
        let marker = if selected { "▸" } else { " " };
        let status = match c.status {
            CapsuleStatus::Frozen => "frozen",
            CapsuleStatus::Draft => "draft",
            CapsuleStatus::Unknown => "?",
        };
        let text = format!(
            "{}  ({status}, {} decisions, {} memories)",
            fit(&c.name, width, 40),
            c.decision_ids.len(),
            c.memory_ids.len()
        );
        selectable_row(marker, text, selected)
    })
}

fn task_lines(app: &App, width: u16) -> Vec<Line<'_>> {
    windowed(app, &app.tasks, "No tasks yet.", move |_, t, selected| {
        let marker = if selected { "▸" } else { " " };
        let check = match t.status {
            TaskStatus::Done => "[x]",
            TaskStatus::InProgress => "[~]",
            TaskStatus::Review => "[r]",
            TaskStatus::Todo | TaskStatus::Unknown => "[ ]",
        };
        let priority = match t.priority {
            TaskPriority::Medium => String::new(),
            p => format!(" [{}]", p.as_str()),
        };
        selectable_row(
            marker,
            format!(
                "{check} {}  {}{priority}",
                fit(&t.title, width, 28),
                t.status.as_str()
            ),
            selected,
        )
    })
}

fn selectable_row(marker: &str, text: String, selected: bool) -> Line<'static> {
    let style = if selected {
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    Line::from(Span::styled(format!(" {marker} {text}"), style))
}

fn brain_lines(app: &App) -> Vec<Line<'_>> {
    let Some(stats) = &app.graph else {
        return vec![Line::from(Span::styled(
            "  No graph data.",
            Style::default().fg(DIM),
        ))];
    };
    let mut lines = vec![
        Line::raw(""),
        Line::from(vec![
            Span::styled("  Nodes  ", Style::default().fg(DIM)),
            Span::styled(stats.node_count.to_string(), Style::default().add_modifier(Modifier::BOLD)),
            Span::styled("   Edges  ", Style::default().fg(DIM)),
            Span::styled(stats.edge_count.to_string(), Style::default().add_modifier(Modifier::BOLD)),
        ]),
        Line::raw(""),
    ];
    let mut kinds: Vec<_> = stats.nodes_by_type.iter().collect();
    kinds.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
    for (kind, count) in kinds {
        lines.push(Line::from(vec![
            Span::styled(format!("    {kind:<16}"), Style::default().fg(DIM)),
            Span::raw(count.to_string()),
        ]));
    }
    lines
}

fn draw_chat(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(3)])
        .split(area);

    let mut lines = Vec::new();
    if app.loading {
        lines.push(Line::from(Span::styled(
            "  Loading project context...",
            Style::default().fg(DIM),
        )));
    }
    for msg in &app.chat.messages {
        let (label, color) = match msg.role {
            crate::api::types::ChatRole::User => ("you", ACCENT),
            crate::api::types::ChatRole::Assistant => ("hopper", Color::Magenta),
        };
        lines.push(Line::from(Span::styled(
            format!("{label}:"),
            Style::default().fg(color).add_modifier(Modifier::BOLD),
        )));
        for text_line in msg.content.lines() {
            lines.push(Line::raw(format!("  {text_line}")));
        }
        lines.push(Line::raw(""));
    }
    if app.chat.streaming {
        lines.push(Line::from(Span::styled(
            "hopper is thinking...",
            Style::default().fg(DIM),
        )));
    }

    // keep the tail of the transcript in view
    let visible = chunks[0].height as usize;
    let skip = lines.len().saturating_sub(visible);
    let transcript = Paragraph::new(lines.split_off(skip.min(lines.len())))
        .wrap(Wrap { trim: false });
    frame.render_widget(transcript, chunks[0]);

    let input = Paragraph::new(Line::from(vec![
        Span::styled("> ", Style::default().fg(ACCENT)),
        Span::raw(app.chat.input.as_str()),
        Span::styled("█", Style::default().fg(DIM)),
    ]))
    .block(Block::default().borders(Borders::TOP).border_style(Style::default().fg(DIM)));
    frame.render_widget(input, chunks[1]);
}

fn draw_footer(frame: &mut Frame, app: &App, area: Rect) {
    let mut lines = Vec::new();
    if let Some(err) = &app.error {
        lines.push(Line::from(Span::styled(
            format!("  {err}"),
            Style::default().fg(ERROR),
        )));
    }
    lines.push(Line::from(Span::styled(
        format!("  {}", help_text(app.screen)),
        Style::default().fg(DIM),
    )));
    frame.render_widget(Paragraph::new(lines), area);
}

fn help_text(screen: Screen) -> &'static str {
    match screen {
        Screen::Login => "enter login • q quit",
        Screen::Organizations => "↑↓ navigate • enter select • q quit",
        Screen::Projects => "←→↑↓ navigate • enter select • esc back • q quit",
        Screen::ProjectMenu => "↑↓ navigate • enter select • esc back • q quit",
        Screen::Dashboard | Screen::Brain => "esc back • q quit",
        Screen::Decisions => "↑↓ navigate • [n]ew • [a]ccept • [x] deprecate • esc back • q quit",
        Screen::Memories => "↑↓ navigate • [n]ew • [d]elete • esc back • q quit",
        Screen::Capsules => "↑↓ navigate • esc back • q quit",
        Screen::Tasks => "↑↓ navigate • [n]ew • [t]oggle • [d]elete • esc back • q quit",
        Screen::Chat => "type your message • enter send • esc back",
    }
}

/// Truncate to the terminal width, leaving `reserved` columns for markers.
fn fit(s: &str, width: u16, reserved: u16) -> String {
    let budget = width.saturating_sub(reserved) as usize;
    if budget == 0 || s.width() <= budget {
        return s.to_string();
    }
    let mut out = String::new();
    let mut used = 0usize;
    for c in s.chars() {
        let w = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);
        if used + w + 3 > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push_str("...");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_leaves_short_strings_alone() {
        assert_eq!(fit("hello", 80, 10), "hello");
    }

    #[test]
    fn fit_truncates_with_ellipsis() {
        let long = "x".repeat(100);
        let out = fit(&long, 40, 10);
        assert!(out.ends_with("..."));
        assert!(out.width() <= 30);
    }

    #[test]
    fn help_text_mentions_mutation_keys_on_decisions() {
        let help = help_text(Screen::Decisions);
        assert!(help.contains("[a]ccept"));
        assert!(help.contains("deprecate"));
    }
}
