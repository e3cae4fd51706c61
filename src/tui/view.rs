//! Frame rendering for the selector and the dashboard.
//!
//! Every function here only reads the state it is given.

use crate::dns::{format_latency, LatencyBand, MonitorStats, ProviderCatalog};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

/// Format elapsed seconds as `Ns`, `Nm Ns` or `Nh Nm`.
///
/// Seconds are dropped once the value reaches an hour.
#[must_use]
pub fn format_duration(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds}s");
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{}m {}s", minutes, seconds % 60);
    }
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// Colour of a latency band.
#[must_use]
pub fn band_style(band: LatencyBand) -> Style {
    let color = match band {
        LatencyBand::Fast => Color::Green,
        LatencyBand::Medium => Color::Yellow,
        LatencyBand::Slow => Color::Red,
        LatencyBand::NotTested => Color::DarkGray,
    };
    Style::default().fg(color)
}

fn title_style() -> Style {
    Style::default()
        .fg(Color::Magenta)
        .add_modifier(Modifier::BOLD)
}

fn header_style() -> Style {
    Style::default()
        .fg(Color::LightBlue)
        .add_modifier(Modifier::BOLD)
}

fn help_style() -> Style {
    Style::default()
        .fg(Color::DarkGray)
        .add_modifier(Modifier::ITALIC)
}

fn bordered(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(title)
}

/// Split into title, body and help rows.
fn frame_layout(area: Rect) -> [Rect; 3] {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(5),
            Constraint::Length(2),
        ])
        .split(area);
    [chunks[0], chunks[1], chunks[2]]
}

fn servers_text(servers: &[String]) -> String {
    match servers {
        [] => String::new(),
        [only] => only.clone(),
        [first, second, ..] => format!("{first:<17} {second}"),
    }
}

/// Provider table with the cursor row highlighted.
///
/// `banner` replaces the quit hint under the title, in red.
pub fn draw_provider_list(
    f: &mut Frame,
    catalog: &ProviderCatalog,
    state: &mut TableState,
    banner: Option<&str>,
) {
    let [title_area, body, help_area] = frame_layout(f.area());

    let subtitle = match banner {
        Some(banner) => Span::styled(banner, Style::default().fg(Color::Red)),
        None => Span::styled("Press q or ctrl+c to quit", help_style()),
    };
    let title = Paragraph::new(vec![
        Line::from(Span::styled("DNS Changer", title_style())),
        Line::from(subtitle),
    ]);
    f.render_widget(title, title_area);

    let header = Row::new(vec![
        Cell::from("Provider"),
        Cell::from("DNS Servers"),
        Cell::from("Latency"),
    ])
    .style(header_style());

    let rows: Vec<Row> = catalog
        .providers()
        .iter()
        .map(|p| {
            Row::new(vec![
                Cell::from(p.name.clone()),
                Cell::from(servers_text(&p.servers)).style(Style::default().fg(Color::Cyan)),
                Cell::from(Line::from(format_latency(p.latency_ms)).alignment(Alignment::Right))
                    .style(band_style(p.band())),
            ])
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(22),
            Constraint::Length(40),
            Constraint::Length(9),
        ],
    )
    .header(header)
    .block(bordered(" Providers "))
    .row_highlight_style(
        Style::default()
            .bg(Color::DarkGray)
            .fg(Color::LightGreen)
            .add_modifier(Modifier::BOLD),
    )
    .highlight_symbol("▸ ");

    // Stateful rendering keeps the cursor row scrolled into view.
    f.render_stateful_widget(table, body, state);

    let help = Paragraph::new("Use ↑/↓ or j/k to navigate • enter to select • q to quit")
        .style(help_style());
    f.render_widget(help, help_area);
}

/// Custom server prompt.
pub fn draw_custom_entry(f: &mut Frame, buffer: &str, error: Option<&str>) {
    let [title_area, body, help_area] = frame_layout(f.area());

    f.render_widget(
        Paragraph::new(Span::styled("Add Custom DNS", title_style())),
        title_area,
    );

    let mut lines = vec![
        Line::from(Span::styled(
            "Enter DNS servers (comma or space separated):",
            Style::default().fg(Color::Cyan),
        )),
        Line::default(),
        Line::from(format!("> {buffer}_")),
        Line::default(),
    ];
    if let Some(error) = error {
        lines.push(Line::from(Span::styled(
            error,
            Style::default().fg(Color::Red),
        )));
    }
    f.render_widget(Paragraph::new(lines).block(bordered(" Custom DNS ")), body);

    let help = Paragraph::new(vec![
        Line::from("Example: 8.8.8.8,1.1.1.1 or 8.8.8.8 1.1.1.1"),
        Line::from("enter: confirm • esc: cancel"),
    ])
    .style(help_style());
    f.render_widget(help, help_area);
}

/// Monitoring dashboard for one stats snapshot, with `warnings` below it.
pub fn draw_dashboard(f: &mut Frame, stats: &MonitorStats, warnings: &[String]) {
    let [title_area, body, help_area] = frame_layout(f.area());

    f.render_widget(
        Paragraph::new(Span::styled("DNS Monitoring Dashboard", title_style())),
        title_area,
    );

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(
                u16::try_from(stats.active_servers.len())
                    .unwrap_or(u16::MAX)
                    .saturating_add(4),
            ),
            Constraint::Length(6),
            Constraint::Min(0),
        ])
        .split(body);

    let mut info = vec![
        Line::from(vec![
            Span::styled("Provider: ", header_style()),
            Span::styled(stats.provider_name.clone(), Style::default().fg(Color::Cyan)),
        ]),
        Line::from(Span::styled("Current DNS Servers:", header_style())),
    ];
    info.extend(stats.active_servers.iter().map(|s| {
        Line::from(vec![
            Span::raw("  • "),
            Span::styled(s.clone(), Style::default().fg(Color::Cyan)),
        ])
    }));
    f.render_widget(Paragraph::new(info).block(bordered(" Active ")), chunks[0]);

    let failed_style = if stats.failed_count > 0 {
        Style::default().fg(Color::Red)
    } else {
        Style::default().fg(Color::Cyan)
    };

    let rows = vec![
        Row::new(vec![
            Cell::from("Uptime").style(header_style()),
            Cell::from(format_duration(stats.uptime_secs())).style(Style::default().fg(Color::Cyan)),
        ]),
        Row::new(vec![
            Cell::from("Current Latency").style(header_style()),
            Cell::from(format_latency(stats.last_latency_ms))
                .style(band_style(LatencyBand::classify(stats.last_latency_ms))),
        ]),
        Row::new(vec![
            Cell::from("Queries Success").style(header_style()),
            Cell::from(stats.success_count.to_string()).style(Style::default().fg(Color::Green)),
        ]),
        Row::new(vec![
            Cell::from("Queries Failed").style(header_style()),
            Cell::from(stats.failed_count.to_string()).style(failed_style),
        ]),
    ];

    let table = Table::new(rows, [Constraint::Length(22), Constraint::Length(14)])
        .block(bordered(" Statistics "));
    f.render_widget(table, chunks[1]);

    if !warnings.is_empty() {
        let lines: Vec<Line> = warnings
            .iter()
            .map(|w| Line::from(Span::styled(w.as_str(), Style::default().fg(Color::Yellow))))
            .collect();
        f.render_widget(
            Paragraph::new(lines)
                .wrap(Wrap { trim: true })
                .block(bordered(" Warnings ")),
            chunks[2],
        );
    }

    f.render_widget(
        Paragraph::new("r: refresh • c: change DNS • q: quit").style(help_style()),
        help_area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::Provider;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::time::Duration;

    fn screen_text(terminal: &Terminal<TestBackend>) -> String {
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|row| row.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    #[test]
    fn duration_boundaries() {
        assert_eq!(format_duration(0), "0s");
        assert_eq!(format_duration(59), "59s");
        assert_eq!(format_duration(60), "1m 0s");
        assert_eq!(format_duration(61), "1m 1s");
        assert_eq!(format_duration(3599), "59m 59s");
        assert_eq!(format_duration(3600), "1h 0m");
        assert_eq!(format_duration(3661), "1h 1m");
        assert_eq!(format_duration(90_000), "25h 0m");
    }

    #[test]
    fn servers_column() {
        assert_eq!(servers_text(&[]), "");
        assert_eq!(servers_text(&["1.1.1.1".into()]), "1.1.1.1");
        assert_eq!(
            servers_text(&["1.1.1.1".into(), "1.0.0.1".into(), "x".into()]),
            "1.1.1.1           1.0.0.1"
        );
    }

    #[test]
    fn band_colours_differ() {
        let styles = [
            band_style(LatencyBand::Fast),
            band_style(LatencyBand::Medium),
            band_style(LatencyBand::Slow),
            band_style(LatencyBand::NotTested),
        ];
        for (i, a) in styles.iter().enumerate() {
            for b in &styles[i + 1..] {
                assert_ne!(a.fg, b.fg);
            }
        }
    }

    #[test]
    fn provider_list_shows_latency() {
        let catalog = ProviderCatalog::new(vec![
            Provider::new("Cloudflare", ["1.1.1.1", "1.0.0.1"]).with_latency(Some(12)),
            Provider::new("Quad9", ["9.9.9.9"]),
            Provider::add_custom(),
        ]);
        let mut state = TableState::default();
        state.select(Some(0));

        let mut terminal = Terminal::new(TestBackend::new(90, 20)).unwrap();
        terminal
            .draw(|f| draw_provider_list(f, &catalog, &mut state, None))
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Press q or ctrl+c to quit"));
        assert!(text.contains("Cloudflare"));
        assert!(text.contains("12ms"));
        assert!(text.contains("N/A"));
        assert!(text.contains("Add Custom DNS"));
        assert!(text.contains("▸"));
    }

    #[test]
    fn provider_list_shows_banner() {
        let catalog = ProviderCatalog::builtin();
        let mut state = TableState::default();

        let mut terminal = Terminal::new(TestBackend::new(90, 20)).unwrap();
        terminal
            .draw(|f| {
                draw_provider_list(
                    f,
                    &catalog,
                    &mut state,
                    Some("Could not apply Google: IO error: permission denied"),
                );
            })
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Could not apply Google"));
        assert!(!text.contains("Press q or ctrl+c to quit"));
    }

    #[test]
    fn dashboard_shows_warnings() {
        let stats = MonitorStats::for_provider(&Provider::new("Quad9", ["9.9.9.9"]));
        let warnings = vec![
            "Warning: `systemctl` failed: unit not found".to_string(),
            "Validation failed: DNS server 9.9.9.9 is not responding".to_string(),
        ];

        let mut terminal = Terminal::new(TestBackend::new(80, 24)).unwrap();
        terminal
            .draw(|f| draw_dashboard(f, &stats, &warnings))
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("Warnings"));
        assert!(text.contains("`systemctl` failed: unit not found"));
        assert!(text.contains("DNS server 9.9.9.9 is not responding"));
    }

    #[test]
    fn dashboard_survives_huge_server_list() {
        let servers: Vec<String> = (0..70_000)
            .map(|i| format!("10.{}.{}.{}", i / 65536, i / 256 % 256, i % 256))
            .collect();
        let stats = MonitorStats::for_provider(&Provider::custom(servers));

        let mut terminal = Terminal::new(TestBackend::new(60, 20)).unwrap();
        terminal.draw(|f| draw_dashboard(f, &stats, &[])).unwrap();

        assert!(screen_text(&terminal).contains("DNS Monitoring Dashboard"));
    }

    #[test]
    fn custom_entry_shows_buffer_and_error() {
        let mut terminal = Terminal::new(TestBackend::new(70, 16)).unwrap();
        terminal
            .draw(|f| draw_custom_entry(f, "8.8.8.8,", Some("Invalid DNS format")))
            .unwrap();

        let text = screen_text(&terminal);
        assert!(text.contains("> 8.8.8.8,_"));
        assert!(text.contains("Invalid DNS format"));
    }

    #[test]
    fn dashboard_shows_counters() {
        let stats = MonitorStats {
            success_count: 7,
            failed_count: 2,
            last_latency_ms: Some(31),
            uptime: Duration::from_secs(125),
            ..MonitorStats::for_provider(&Provider::new("Google", ["8.8.8.8", "8.8.4.4"]))
        };

        let mut terminal = Terminal::new(TestBackend::new(70, 24)).unwrap();
        terminal.draw(|f| draw_dashboard(f, &stats, &[])).unwrap();

        let text = screen_text(&terminal);
        assert!(!text.contains("Warnings"));
        assert!(text.contains("Google"));
        assert!(text.contains("8.8.4.4"));
        assert!(text.contains("2m 5s"));
        assert!(text.contains("31ms"));
        assert!(text.contains("Queries Failed"));
    }
}
