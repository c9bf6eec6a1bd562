use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::Config;
use crate::tui::app::{TaskField, TaskForm};
use crate::tui::widgets::color::{get_contrast_text_color, parse_color};
use crate::tui::widgets::editor::Editor;

pub fn render_task_form(
    f: &mut Frame,
    area: Rect,
    form: &TaskForm,
    focused: bool,
    saving: bool,
    config: &Config,
) {
    if area.width < 4 || area.height < 4 {
        return;
    }

    let active_theme = config.get_active_theme();
    let fg = parse_color(&active_theme.fg);
    let highlight_bg = parse_color(&active_theme.highlight_bg);
    let highlight_fg = if active_theme.highlight_fg.is_empty() {
        get_contrast_text_color(highlight_bg)
    } else {
        parse_color(&active_theme.highlight_fg)
    };
    let active_style = Style::default().fg(highlight_fg).bg(highlight_bg);
    let inactive_style = Style::default().fg(fg).add_modifier(Modifier::DIM);

    let field_areas = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Description
            Constraint::Length(3), // Time
            Constraint::Length(1), // Submit
        ])
        .split(area);

    let fields = [
        (TaskField::Title, &form.title, "Task Title"),
        (TaskField::Description, &form.description, "Task Description"),
        (TaskField::Time, &form.time, "Time (YYYY-MM-DDTHH:MM)"),
    ];

    for (index, (field, editor, label)) in fields.into_iter().enumerate() {
        let is_active = focused && form.current_field == field;
        let style = if is_active { active_style } else { inactive_style };
        let field_area = field_areas[index];
        let (text, cursor_x) = editor_window(editor, field_area);

        let paragraph = Paragraph::new(Line::from(Span::styled(text, style)))
            .block(Block::default().borders(Borders::ALL).title(label));
        f.render_widget(paragraph, field_area);

        if is_active {
            f.set_cursor_position((field_area.x + 1 + cursor_x, field_area.y + 1));
        }
    }

    let mut submit = format!("[ {} ]", form.submit_label());
    if saving {
        submit.push_str("  Saving...");
    }
    let submit_style = if focused {
        Style::default().fg(fg).add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(fg)
    };
    f.render_widget(
        Paragraph::new(submit)
            .style(submit_style)
            .alignment(Alignment::Left),
        field_areas[3],
    );
}

/// Visible slice of a field's text and the cursor's x offset inside the border
fn editor_window(editor: &Editor, field_area: Rect) -> (String, u16) {
    let content_width = field_area.width.saturating_sub(2) as usize;
    let (text, cursor) = editor.visible(content_width);
    (text, cursor as u16)
}
