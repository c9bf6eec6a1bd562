use chrono::format::{Item, StrftimeItems};
use chrono::{NaiveDateTime, Timelike};
use std::fmt::Write;
use directories::{BaseDirs, ProjectDirs};
use std::path::PathBuf;

/// Profile mode for the application (dev or prod)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    Dev,
    Prod,
}

impl Profile {
    fn app_name(self) -> &'static str {
        match self {
            Profile::Dev => "tasksync-dev",
            Profile::Prod => "tasksync",
        }
    }
}

/// Get the configuration directory path
/// If profile is Dev, uses "tasksync-dev" instead of "tasksync"
pub fn get_config_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "tasksync", profile.app_name())
        .map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the data directory path (log files live here)
pub fn get_data_dir(profile: Profile) -> Option<PathBuf> {
    ProjectDirs::from("com", "tasksync", profile.app_name())
        .map(|dirs| dirs.data_dir().to_path_buf())
}

/// Expand `~` in a path string to the user's home directory
pub fn expand_path(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = BaseDirs::new().map(|d| d.home_dir().to_path_buf()) {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Wire format of `Task::time` (what an HTML datetime-local input produces)
pub const TASK_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

const ACCEPTED_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

/// Parse a stored or typed task time. Returns None for empty or unrecognized input.
pub fn parse_task_time(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }
    ACCEPTED_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
}

/// Truncate a timestamp to the start of its minute
pub fn minute_bucket(at: NaiveDateTime) -> NaiveDateTime {
    at.with_second(0)
        .and_then(|t| t.with_nanosecond(0))
        .unwrap_or(at)
}

/// Normalize typed time input to the wire format, e.g. "2024-01-01 09:00" -> "2024-01-01T09:00"
pub fn normalize_time_input(value: &str) -> Option<String> {
    parse_task_time(value).map(|t| minute_bucket(t).format(TASK_TIME_FORMAT).to_string())
}

/// Localized display of a task time; unparseable values are shown as-is
pub fn format_time_for_display(value: &str, display_format: &str) -> String {
    match parse_task_time(value) {
        Some(t) => format_datetime(t, display_format).unwrap_or_else(|| value.to_string()),
        None => value.to_string(),
    }
}

/// Format with a user-supplied strftime string. None when the format has a bad specifier.
pub fn format_datetime(at: NaiveDateTime, display_format: &str) -> Option<String> {
    let mut out = String::new();
    write!(out, "{}", at.format(display_format)).ok()?;
    Some(out)
}

/// True when every specifier in `display_format` is one chrono understands
pub fn is_valid_display_format(display_format: &str) -> bool {
    !StrftimeItems::new(display_format).any(|item| matches!(item, Item::Error))
}

/// Current local wall-clock time as a naive timestamp
pub fn local_now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

/// Parsed key binding information
#[derive(Debug, Clone)]
pub struct ParsedKeyBinding {
    pub key_code: crossterm::event::KeyCode,
    pub requires_ctrl: bool,
}

/// Check if a key event has the primary modifier (Ctrl on Windows/Linux, Option/Alt on macOS)
pub fn has_primary_modifier(modifiers: crossterm::event::KeyModifiers) -> bool {
    #[cfg(target_os = "macos")]
    {
        modifiers.contains(crossterm::event::KeyModifiers::CONTROL)
            || modifiers.contains(crossterm::event::KeyModifiers::ALT)
    }

    #[cfg(not(target_os = "macos"))]
    {
        modifiers.contains(crossterm::event::KeyModifiers::CONTROL)
    }
}

/// Format a key binding string for display, showing the platform-appropriate modifier
/// On macOS, "Ctrl+" is replaced with "Opt+"
pub fn format_key_binding_for_display(key_binding: &str) -> String {
    #[cfg(target_os = "macos")]
    {
        key_binding.replace("Ctrl+", "Opt+")
    }

    #[cfg(not(target_os = "macos"))]
    {
        key_binding.to_string()
    }
}

/// Parse a key binding string from config into a ParsedKeyBinding
/// Supports: single keys ("q", "n"), special keys ("Enter", "Tab", "F5"),
/// and modifiers ("Ctrl+s")
pub fn parse_key_binding(key_str: &str) -> Result<ParsedKeyBinding, String> {
    let key_str = key_str.trim();

    if let Some(key_part) = key_str.strip_prefix("Ctrl+") {
        let key_code = parse_key_code(key_part)?;
        return Ok(ParsedKeyBinding {
            key_code,
            requires_ctrl: true,
        });
    }

    let key_code = parse_key_code(key_str)?;
    Ok(ParsedKeyBinding {
        key_code,
        requires_ctrl: false,
    })
}

/// Parse a key code from a string (without modifiers)
fn parse_key_code(key_str: &str) -> Result<crossterm::event::KeyCode, String> {
    use crossterm::event::KeyCode;

    match key_str {
        "Enter" => Ok(KeyCode::Enter),
        "Esc" | "Escape" => Ok(KeyCode::Esc),
        "Backspace" => Ok(KeyCode::Backspace),
        "Tab" => Ok(KeyCode::Tab),
        "Space" | " " => Ok(KeyCode::Char(' ')),
        "Left" => Ok(KeyCode::Left),
        "Right" => Ok(KeyCode::Right),
        "Up" => Ok(KeyCode::Up),
        "Down" => Ok(KeyCode::Down),
        "Home" => Ok(KeyCode::Home),
        "End" => Ok(KeyCode::End),
        "Delete" => Ok(KeyCode::Delete),
        _ => {
            if let Some(n) = key_str.strip_prefix('F').and_then(|n| n.parse::<u8>().ok()) {
                if (1..=12).contains(&n) {
                    return Ok(KeyCode::F(n));
                }
            }
            let mut chars = key_str.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Ok(KeyCode::Char(c)),
                _ => Err(format!("Unknown key binding: {}", key_str)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyCode;

    #[test]
    fn parses_wire_and_typed_times() {
        let wire = parse_task_time("2024-01-01T09:00").unwrap();
        let typed = parse_task_time("2024-01-01 09:00").unwrap();
        assert_eq!(wire, typed);
        assert!(parse_task_time("").is_none());
        assert!(parse_task_time("tomorrow").is_none());
    }

    #[test]
    fn minute_bucket_drops_seconds() {
        let t = parse_task_time("2024-01-01T09:00:42.5").unwrap();
        assert_eq!(minute_bucket(t), parse_task_time("2024-01-01T09:00").unwrap());
    }

    #[test]
    fn normalizes_input_to_wire_format() {
        assert_eq!(
            normalize_time_input(" 2024-03-05 17:30 ").as_deref(),
            Some("2024-03-05T17:30")
        );
        assert_eq!(normalize_time_input("2024-13-05 17:30"), None);
    }

    #[test]
    fn display_falls_back_to_raw_value() {
        assert_eq!(
            format_time_for_display("2024-01-01T09:00", "%d/%m/%Y %H:%M"),
            "01/01/2024 09:00"
        );
        assert_eq!(format_time_for_display("", "%H:%M"), "");
        assert_eq!(format_time_for_display("soon", "%H:%M"), "soon");
    }

    #[test]
    fn bad_display_format_falls_back_instead_of_panicking() {
        assert_eq!(
            format_time_for_display("2024-01-01T09:00", "%Q %H"),
            "2024-01-01T09:00"
        );
        assert!(format_datetime(parse_task_time("2024-01-01T09:00").unwrap(), "%Q").is_none());
        assert!(!is_valid_display_format("%Q %H"));
        assert!(is_valid_display_format("%a %b %e %Y %H:%M"));
    }

    #[test]
    fn parses_key_bindings() {
        let save = parse_key_binding("Ctrl+s").unwrap();
        assert!(save.requires_ctrl);
        assert_eq!(save.key_code, KeyCode::Char('s'));
        assert_eq!(parse_key_binding("F5").unwrap().key_code, KeyCode::F(5));
        assert_eq!(parse_key_binding("Space").unwrap().key_code, KeyCode::Char(' '));
        assert!(parse_key_binding("Hyper+x").is_err());
    }
}
