use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::Config;
use crate::reminder::Reminder;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::popup::popup_area;
use crate::utils::{format_datetime, TASK_TIME_FORMAT};

/// Modal for the oldest pending reminder; `pending` counts the ones queued behind it
pub fn render_reminder_alert(
    f: &mut Frame,
    area: Rect,
    reminder: &Reminder,
    pending: usize,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let text_fg = get_contrast_text_color(highlight_bg);
    let style = Style::default().fg(text_fg).bg(highlight_bg);

    let popup_area = popup_area(area, 50, 30);
    f.render_widget(Clear, popup_area);

    let mut lines = vec![
        Line::from(""),
        Line::from(Span::styled(
            reminder.message(),
            style.add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format_datetime(reminder.due, &config.time_display_format)
                .unwrap_or_else(|| reminder.due.format(TASK_TIME_FORMAT).to_string()),
            style,
        )),
        Line::from(""),
    ];
    if pending > 0 {
        lines.push(Line::from(Span::styled(format!("({} more)", pending), style)));
    }
    lines.push(Line::from(Span::styled("Press Enter to dismiss", style)));

    let paragraph = Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Reminder")
                .title_alignment(Alignment::Center)
                .style(style),
        )
        .style(style)
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(paragraph, popup_area);
}
