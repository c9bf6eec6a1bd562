use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
    size as terminal_size,
};
use futures_util::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::Rect;
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::reminder::ReminderMonitor;
use crate::tui::app::{AppEvent, Focus, Mode, TaskField};
use crate::tui::error::TuiError;
use crate::tui::layout::Layout;
use crate::tui::widgets::confirm_delete::DELETE_OPTIONS;
use crate::tui::App;
use crate::utils::{has_primary_modifier, parse_key_binding, ParsedKeyBinding};

/// Redraw cadence when nothing else wakes the loop (status timeouts, clock)
const TICK: Duration = Duration::from_millis(250);

/// Restores the terminal on drop, so a panic or early return never leaves
/// the user's shell in raw mode or on the alternate screen.
struct TerminalGuard {
    raw_mode_enabled: bool,
    alternate_screen_enabled: bool,
}

impl TerminalGuard {
    fn new() -> Result<Self, TuiError> {
        enable_raw_mode()?;
        execute!(io::stdout(), EnterAlternateScreen)?;
        Ok(Self {
            raw_mode_enabled: true,
            alternate_screen_enabled: true,
        })
    }

    fn restore(&mut self) -> Result<(), TuiError> {
        if self.raw_mode_enabled {
            disable_raw_mode()?;
            self.raw_mode_enabled = false;
        }
        if self.alternate_screen_enabled {
            execute!(io::stdout(), LeaveAlternateScreen)?;
            self.alternate_screen_enabled = false;
        }
        Ok(())
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        if self.raw_mode_enabled {
            let _ = disable_raw_mode();
        }
        if self.alternate_screen_enabled {
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
        }
    }
}

/// Drive the TUI until the user quits.
///
/// Wakes on terminal input, finished API operations, task list changes,
/// reminders, and a short tick. The reminder monitor is owned by this loop
/// and stops when it returns.
pub async fn run_event_loop(
    mut app: App,
    mut app_rx: mpsc::UnboundedReceiver<AppEvent>,
) -> Result<(), TuiError> {
    // Checked before entering the alternate screen so the message stays readable
    let (width, height) = terminal_size()?;
    let min_width = Layout::MIN_WIDTH + 2;
    let min_height = Layout::MIN_HEIGHT + 2;
    if width < min_width || height < min_height {
        return Err(TuiError::RenderError(format!(
            "Terminal size too small. Current: {}x{}, Minimum required: {}x{}. Please resize your terminal window.",
            width, height, min_width, min_height
        )));
    }

    let (reminder_tx, mut reminder_rx) = mpsc::unbounded_channel();
    let _monitor = ReminderMonitor::new(app.store.subscribe(), reminder_tx)
        .with_period(Duration::from_secs(app.config.reminder_interval_secs))
        .start();
    let mut tasks_rx = app.store.subscribe();

    app.request_fetch();

    let mut guard = TerminalGuard::new()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let mut input = EventStream::new();
    let mut tick = tokio::time::interval(TICK);

    info!("tui started");
    loop {
        app.check_status_message_timeout();

        let size = terminal.size()?;
        let layout = Layout::calculate(Rect::new(0, 0, size.width, size.height));
        terminal.draw(|f| crate::tui::render::render(f, &mut app, &layout))?;

        tokio::select! {
            maybe_event = input.next() => match maybe_event {
                Some(Ok(Event::Key(key_event))) if key_event.kind == KeyEventKind::Press => {
                    if handle_key_event(&mut app, key_event)? {
                        break;
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(TuiError::IoError(e)),
                None => break,
            },
            Some(event) = app_rx.recv() => app.handle_app_event(event),
            changed = tasks_rx.changed() => {
                if changed.is_err() {
                    break;
                }
                let tasks = tasks_rx.borrow_and_update().clone();
                app.sync_tasks(tasks);
            }
            Some(reminder) = reminder_rx.recv() => app.push_reminder(reminder),
            _ = tick.tick() => {}
        }
    }

    info!("tui exiting");
    guard.restore()?;
    Ok(())
}

/// Route one key press. Returns true when the app should quit.
///
/// Precedence: reminder alert, delete modal, help, then whichever pane has focus.
pub(crate) fn handle_key_event(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    if !app.alerts.is_empty() {
        if matches!(key_event.code, KeyCode::Enter | KeyCode::Esc | KeyCode::Char(' ')) {
            app.dismiss_alert();
        }
        return Ok(false);
    }

    if app.delete_confirmation.is_some() {
        handle_delete_confirmation_modal(app, key_event);
        return Ok(false);
    }

    if app.mode == Mode::Help {
        let help = binding(&app.config.key_bindings.help)?;
        if key_event.code == KeyCode::Esc || matches_key_event(key_event, &help) {
            app.mode = Mode::View;
        }
        return Ok(false);
    }

    if key_event.code == KeyCode::Char('c') && key_event.modifiers.contains(KeyModifiers::CONTROL) {
        return Ok(true);
    }

    match app.focus {
        Focus::Form => handle_form_key(app, key_event),
        Focus::Table => handle_table_key(app, key_event),
    }
}

fn handle_delete_confirmation_modal(app: &mut App, key_event: KeyEvent) {
    let last = DELETE_OPTIONS.len() - 1;
    match key_event.code {
        KeyCode::Up | KeyCode::Char('k') => {
            app.delete_modal_selection = app.delete_modal_selection.checked_sub(1).unwrap_or(last);
        }
        KeyCode::Down | KeyCode::Char('j') | KeyCode::Tab => {
            app.delete_modal_selection = if app.delete_modal_selection >= last {
                0
            } else {
                app.delete_modal_selection + 1
            };
        }
        KeyCode::Enter => {
            if app.delete_modal_selection == 0 {
                app.confirm_delete();
            } else {
                app.cancel_delete();
            }
        }
        KeyCode::Esc => app.cancel_delete(),
        _ => {}
    }
}

fn handle_form_key(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let save = binding(&app.config.key_bindings.save)?;
    if matches_key_event(key_event, &save) {
        app.submit_form();
        return Ok(false);
    }

    let primary = has_primary_modifier(key_event.modifiers);
    if primary && matches!(key_event.code, KeyCode::Char('v') | KeyCode::Char('V')) {
        paste_into_form(app);
        return Ok(false);
    }

    match key_event.code {
        KeyCode::Esc => app.focus = Focus::Table,
        KeyCode::Tab | KeyCode::Down => app.form.next_field(),
        KeyCode::BackTab | KeyCode::Up => app.form.prev_field(),
        KeyCode::Enter => {
            if app.form.current_field == TaskField::Time {
                app.submit_form();
            } else {
                app.form.next_field();
            }
        }
        KeyCode::Left if primary => app.form.current_editor_mut().move_cursor_word_left(),
        KeyCode::Right if primary => app.form.current_editor_mut().move_cursor_word_right(),
        KeyCode::Left => app.form.current_editor_mut().move_cursor_left(),
        KeyCode::Right => app.form.current_editor_mut().move_cursor_right(),
        KeyCode::Home => app.form.current_editor_mut().move_cursor_home(),
        KeyCode::End => app.form.current_editor_mut().move_cursor_end(),
        KeyCode::Backspace => app.form.current_editor_mut().delete_char(),
        KeyCode::Delete => app.form.current_editor_mut().delete_forward(),
        KeyCode::Char(ch) if !primary => app.form.current_editor_mut().insert_char(ch),
        _ => {}
    }
    Ok(false)
}

fn paste_into_form(app: &mut App) {
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.get_text()) {
        Ok(text) => {
            // Fields are single-line
            let line = text.replace(['\r', '\n'], " ");
            app.form.current_editor_mut().insert_str(line.trim_end());
        }
        Err(e) => {
            debug!(error = %e, "clipboard read failed");
            app.set_status_message("Failed to access clipboard".to_string());
        }
    }
}

fn handle_table_key(app: &mut App, key_event: KeyEvent) -> Result<bool, TuiError> {
    let kb = &app.config.key_bindings;
    let quit = binding(&kb.quit)?;
    let new = binding(&kb.new)?;
    let edit = binding(&kb.edit)?;
    let delete = binding(&kb.delete)?;
    let toggle = binding(&kb.toggle_complete)?;
    let refresh = binding(&kb.refresh)?;
    let switch_focus = binding(&kb.switch_focus)?;
    let list_up = binding(&kb.list_up)?;
    let list_down = binding(&kb.list_down)?;
    let help = binding(&kb.help)?;

    if matches_key_event(key_event, &quit) {
        return Ok(true);
    }

    if matches_key_event(key_event, &new) {
        app.start_new_task();
    } else if matches_key_event(key_event, &edit) {
        app.edit_selected();
    } else if matches_key_event(key_event, &delete) {
        app.request_delete_selected();
    } else if matches_key_event(key_event, &toggle) {
        app.toggle_selected();
    } else if matches_key_event(key_event, &refresh) {
        app.request_fetch();
        app.set_status_message("Refreshing...".to_string());
    } else if matches_key_event(key_event, &switch_focus) {
        app.focus = Focus::Form;
    } else if matches_key_event(key_event, &list_up) || key_event.code == KeyCode::Up {
        app.select_previous();
    } else if matches_key_event(key_event, &list_down) || key_event.code == KeyCode::Down {
        app.select_next();
    } else if matches_key_event(key_event, &help) {
        app.mode = Mode::Help;
    }
    Ok(false)
}

fn binding(key_str: &str) -> Result<ParsedKeyBinding, TuiError> {
    parse_key_binding(key_str).map_err(TuiError::KeyBindingError)
}

fn matches_key_event(key_event: KeyEvent, binding: &ParsedKeyBinding) -> bool {
    // Primary modifier is Ctrl, or Option/Alt on macOS
    if binding.requires_ctrl != has_primary_modifier(key_event.modifiers) {
        return false;
    }
    binding.key_code == key_event.code
}
