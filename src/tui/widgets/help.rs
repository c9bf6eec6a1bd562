use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::Config;
use crate::tui::widgets::color::parse_color;
use crate::tui::widgets::popup::popup_area;
use crate::utils::format_key_binding_for_display as key;

pub fn render_help(f: &mut Frame, area: Rect, config: &Config) {
    let active_theme = config.get_active_theme();
    let fg_color = parse_color(&active_theme.fg);
    let bg_color = parse_color(&active_theme.bg);

    let popup_area = popup_area(area, 60, 70);
    f.render_widget(Clear, popup_area);

    let paragraph = Paragraph::new(build_help_text(config))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Help - Key Bindings")
                .title_alignment(Alignment::Center)
                .style(Style::default().fg(fg_color).bg(bg_color)),
        )
        .style(Style::default().fg(fg_color).bg(bg_color))
        .wrap(Wrap { trim: true });

    f.render_widget(paragraph, popup_area);
}

fn build_help_text(config: &Config) -> String {
    let kb = &config.key_bindings;
    let mut text = String::new();

    text.push_str("Task list:\n");
    text.push_str(&format!(
        "  {} / {}: Move selection up/down\n",
        key(&kb.list_up),
        key(&kb.list_down)
    ));
    text.push_str(&format!("  {}: New task\n", key(&kb.new)));
    text.push_str(&format!("  {}: Edit selected task\n", key(&kb.edit)));
    text.push_str(&format!("  {}: Delete selected task\n", key(&kb.delete)));
    text.push_str(&format!(
        "  {}: Mark complete / incomplete\n",
        key(&kb.toggle_complete)
    ));
    text.push_str(&format!("  {}: Reload from server\n", key(&kb.refresh)));
    text.push_str(&format!(
        "  {}: Switch between form and list\n",
        key(&kb.switch_focus)
    ));
    text.push('\n');

    text.push_str("Form:\n");
    text.push_str("  Tab / ↓: Next field\n");
    text.push_str("  Shift+Tab / ↑: Previous field\n");
    text.push_str("  Enter on Time: Submit\n");
    text.push_str(&format!("  {}: Submit\n", key(&kb.save)));
    text.push_str(&format!("  {}: Paste\n", key("Ctrl+v")));
    text.push_str(&format!("  {} / {}: Word navigation\n", key("Ctrl+Left"), key("Ctrl+Right")));
    text.push_str("  Esc: Back to the list\n");
    text.push('\n');

    text.push_str("General:\n");
    text.push_str("  Enter / Esc: Dismiss reminder\n");
    text.push_str(&format!("  {}: Show/hide help\n", key(&kb.help)));
    text.push_str(&format!("  {}: Quit\n", key(&kb.quit)));

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_lists_configured_keys() {
        let mut config = Config::default();
        config.key_bindings.refresh = "F5".to_string();
        let text = build_help_text(&config);
        assert!(text.contains("F5: Reload from server"));
        assert!(text.contains("n: New task"));
    }
}
