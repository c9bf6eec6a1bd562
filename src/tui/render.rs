use ratatui::Frame;
use ratatui::layout::Alignment;
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders};

use crate::tui::app::{Focus, Mode};
use crate::tui::widgets::{
    color::parse_color, confirm_delete::render_confirm_delete, form::render_task_form,
    help::render_help, reminder_alert::render_reminder_alert, status_bar::render_status_bar,
    task_table::render_task_table,
};
use crate::tui::{App, Layout};
use crate::utils::format_key_binding_for_display as key;

pub fn render(f: &mut Frame, app: &mut App, layout: &Layout) {
    let active_theme = app.config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);
    let outer_block = Block::default()
        .borders(Borders::ALL)
        .title("Task Manager")
        .title_alignment(Alignment::Center)
        .style(Style::default().fg(fg_color).bg(bg_color));
    f.render_widget(outer_block, f.area());

    // Overlays own the keyboard, so the form must not claim the cursor under them
    let overlay_open =
        app.mode == Mode::Help || app.delete_confirmation.is_some() || !app.alerts.is_empty();
    let form_focused = app.focus == Focus::Form && !overlay_open;

    render_task_form(
        f,
        layout.form_area,
        &app.form,
        form_focused,
        app.saving,
        &app.config,
    );
    render_task_table(
        f,
        layout.table_area,
        &app.tasks,
        &mut app.table_state,
        app.focus == Focus::Table,
        &app.config,
    );

    let hints = key_hints(app);
    render_status_bar(
        f,
        layout.status_area,
        app.status.message.as_deref(),
        &hints,
        &app.config,
    );

    if app.mode == Mode::Help {
        render_help(f, f.area(), &app.config);
    }
    if let Some(ref task) = app.delete_confirmation {
        render_confirm_delete(f, f.area(), task, app.delete_modal_selection, &app.config);
    }
    if let Some(reminder) = app.alerts.front() {
        render_reminder_alert(f, f.area(), reminder, app.alerts.len() - 1, &app.config);
    }
}

fn key_hints(app: &App) -> Vec<String> {
    let kb = &app.config.key_bindings;
    if !app.alerts.is_empty() {
        return vec!["Enter: Dismiss reminder".to_string()];
    }
    if app.delete_confirmation.is_some() {
        return vec![
            "↑/↓: Choose".to_string(),
            "Enter: Confirm".to_string(),
            "Esc: Cancel".to_string(),
        ];
    }
    if app.mode == Mode::Help {
        return vec![format!("Esc or {}: Close help", key(&kb.help))];
    }
    match app.focus {
        Focus::Form => vec![
            "Tab/Enter: Next field".to_string(),
            "Shift+Tab: Previous field".to_string(),
            format!("{}: {}", key(&kb.save), app.form.submit_label()),
            "Esc: Back to list".to_string(),
        ],
        Focus::Table => vec![
            format!("{}: Quit", key(&kb.quit)),
            format!("{}: New", key(&kb.new)),
            format!("{}: Edit", key(&kb.edit)),
            format!("{}: Delete", key(&kb.delete)),
            format!("{}: Toggle", key(&kb.toggle_complete)),
            format!("{}: Refresh", key(&kb.refresh)),
            format!("{}: Form", key(&kb.switch_focus)),
            format!("{}: Help", key(&kb.help)),
        ],
    }
}
