use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::widgets::{
    Block, Borders, Cell, Row, Scrollbar, ScrollbarOrientation, ScrollbarState, Table, TableState,
};

use crate::Config;
use crate::models::Task;
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::utils::{format_key_binding_for_display, format_time_for_display};

/// Text of the per-row action column
pub fn row_actions(task: &Task, config: &Config) -> String {
    let keys = &config.key_bindings;
    let toggle = if task.completed {
        "Mark Incomplete"
    } else {
        "Mark Complete"
    };
    format!(
        "{} Edit · {} Delete · {} {}",
        format_key_binding_for_display(&keys.edit),
        format_key_binding_for_display(&keys.delete),
        format_key_binding_for_display(&keys.toggle_complete),
        toggle
    )
}

pub fn render_task_table(
    f: &mut Frame,
    area: Rect,
    tasks: &[Task],
    table_state: &mut TableState,
    focused: bool,
    config: &Config,
) {
    let active_theme = config.get_active_theme();
    let fg = parse_color(&active_theme.fg);
    let header_bg = parse_color(&active_theme.header_bg);
    let completed_fg = parse_color(&active_theme.completed_fg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = if active_theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&active_theme.highlight_fg)
    };

    let header = Row::new(["Title", "Description", "Time", "Status", "Actions"])
        .style(
            Style::default()
                .fg(get_contrast_text_color(header_bg))
                .bg(header_bg)
                .add_modifier(Modifier::BOLD),
        );

    let rows: Vec<Row> = tasks
        .iter()
        .map(|task| {
            let status_style = if task.completed {
                Style::default().fg(completed_fg)
            } else {
                Style::default().fg(fg)
            };
            Row::new(vec![
                Cell::from(task.title.clone()),
                Cell::from(task.description.clone()),
                Cell::from(format_time_for_display(&task.time, &config.time_display_format)),
                Cell::from(task.status_label()).style(status_style),
                Cell::from(row_actions(task, config)),
            ])
        })
        .collect();

    let widths = [
        Constraint::Percentage(18),
        Constraint::Percentage(27),
        Constraint::Percentage(20),
        Constraint::Length(14),
        Constraint::Min(20),
    ];

    let title = format!("Tasks ({})", tasks.len());
    let border_style = if focused {
        Style::default().fg(highlight_bg)
    } else {
        Style::default().fg(fg)
    };
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(title)
                .border_style(border_style),
        )
        .style(Style::default().fg(fg))
        .row_highlight_style(Style::default().fg(highlight_fg).bg(highlight_bg))
        .highlight_symbol("> ");

    f.render_stateful_widget(table, area, table_state);

    // Rows visible below the header inside the border
    let visible_rows = area.height.saturating_sub(3) as usize;
    if tasks.len() > visible_rows && area.height > 3 {
        let scrollbar_area = Rect::new(
            area.x + area.width.saturating_sub(1),
            area.y + 2,
            1,
            area.height.saturating_sub(3),
        );
        let mut scrollbar_state = ScrollbarState::new(tasks.len())
            .viewport_content_length(visible_rows)
            .position(table_state.selected().unwrap_or(0));
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("↑"))
            .end_symbol(Some("↓"))
            .track_symbol(Some("│"))
            .thumb_symbol("█");
        f.render_stateful_widget(scrollbar, scrollbar_area, &mut scrollbar_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_follow_completion_state() {
        let config = Config::default();
        let mut task = Task::new("a".into(), "b".into(), "".into());
        assert_eq!(
            row_actions(&task, &config),
            "e Edit · d Delete · Space Mark Complete"
        );
        task.completed = true;
        assert!(row_actions(&task, &config).ends_with("Mark Incomplete"));
    }
}
