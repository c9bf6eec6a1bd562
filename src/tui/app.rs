use crate::models::{Task, TaskId};
use crate::reminder::Reminder;
use crate::store::{SyncError, TaskStore};
use crate::tui::widgets::editor::Editor;
use crate::utils::normalize_time_input;
use crate::Config;
use ratatui::widgets::TableState;
use std::collections::VecDeque;
use std::future::Future;
use std::time::Instant;
use tokio::sync::mpsc;

/// How long a status-bar message stays up
const STATUS_MESSAGE_TIMEOUT_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Table,
    Form,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    View,
    Help,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskField {
    Title,
    Description,
    Time,
}

impl TaskField {
    fn next(self) -> Self {
        match self {
            TaskField::Title => TaskField::Description,
            TaskField::Description => TaskField::Time,
            TaskField::Time => TaskField::Title,
        }
    }

    fn prev(self) -> Self {
        match self {
            TaskField::Title => TaskField::Time,
            TaskField::Description => TaskField::Title,
            TaskField::Time => TaskField::Description,
        }
    }
}

#[derive(Debug, Clone)]
pub struct TaskForm {
    pub current_field: TaskField,
    pub title: Editor,
    pub description: Editor,
    pub time: Editor,
    /// The task being edited, None when creating. Holds the id and the
    /// fields the form doesn't show so an update sends the full object.
    pub editing: Option<Task>,
}

impl Default for TaskForm {
    fn default() -> Self {
        Self {
            current_field: TaskField::Title,
            title: Editor::new(),
            description: Editor::new(),
            time: Editor::new(),
            editing: None,
        }
    }
}

impl TaskForm {
    pub fn from_task(task: &Task) -> Self {
        Self {
            current_field: TaskField::Title,
            title: Editor::from_string(&task.title),
            description: Editor::from_string(&task.description),
            time: Editor::from_string(&task.time),
            editing: Some(task.clone()),
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_editing(&self) -> bool {
        self.editing.as_ref().is_some_and(|t| t.id.is_some())
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_editing() {
            "Update Task"
        } else {
            "Add Task"
        }
    }

    pub fn current_editor_mut(&mut self) -> &mut Editor {
        match self.current_field {
            TaskField::Title => &mut self.title,
            TaskField::Description => &mut self.description,
            TaskField::Time => &mut self.time,
        }
    }

    pub fn next_field(&mut self) {
        self.current_field = self.current_field.next();
    }

    pub fn prev_field(&mut self) {
        self.current_field = self.current_field.prev();
    }

    /// Build the task to submit. All three fields are required and the
    /// time must parse; on error the message names the first bad field.
    pub fn to_task(&self) -> Result<Task, String> {
        if self.title.is_blank() {
            return Err("Title is required".to_string());
        }
        if self.description.is_blank() {
            return Err("Description is required".to_string());
        }
        if self.time.is_blank() {
            return Err("Time is required".to_string());
        }
        let base = self.editing.clone().unwrap_or_default();

        // An untouched time is echoed back exactly as the server sent it
        let typed = self.time.value();
        let time = if self.editing.is_some() && typed == base.time {
            base.time.clone()
        } else {
            normalize_time_input(&typed)
                .ok_or_else(|| format!("Invalid time '{}', use YYYY-MM-DDTHH:MM", typed))?
        };

        Ok(Task {
            title: self.title.value().trim().to_string(),
            description: self.description.value().trim().to_string(),
            time,
            ..base
        })
    }
}

/// Results of background API work, delivered back to the UI loop
#[derive(Debug)]
pub enum AppEvent {
    Fetched(Result<(), SyncError>),
    Saved {
        was_update: bool,
        result: Result<(), SyncError>,
    },
    Deleted {
        title: String,
        result: Result<(), SyncError>,
    },
    Toggled {
        title: String,
        result: Result<(), SyncError>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct StatusState {
    pub message: Option<String>,
    pub message_time: Option<Instant>,
}

pub struct App {
    pub config: Config,
    pub store: TaskStore,

    /// Latest list from the store, what the table draws
    pub tasks: Vec<Task>,

    pub focus: Focus,
    pub mode: Mode,
    pub table_state: TableState,
    pub form: TaskForm,
    pub saving: bool,
    pub delete_confirmation: Option<Task>,
    pub delete_modal_selection: usize, // 0 = Delete, 1 = Cancel
    pub alerts: VecDeque<Reminder>,
    pub status: StatusState,

    events_tx: mpsc::UnboundedSender<AppEvent>,
}

impl App {
    pub fn new(config: Config, store: TaskStore) -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let tasks = store.tasks();
        let mut app = Self {
            config,
            store,
            tasks: Vec::new(),
            focus: Focus::Table,
            mode: Mode::View,
            table_state: TableState::default(),
            form: TaskForm::default(),
            saving: false,
            delete_confirmation: None,
            delete_modal_selection: 0,
            alerts: VecDeque::new(),
            status: StatusState::default(),
            events_tx,
        };
        app.sync_tasks(tasks);
        (app, events_rx)
    }

    /// Run `op` on the runtime and hand its outcome to the UI loop.
    /// If the loop is gone by then, the outcome is dropped.
    fn spawn_op<F>(&self, op: F)
    where
        F: Future<Output = AppEvent> + Send + 'static,
    {
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(op.await);
        });
    }

    /// Replace the displayed list, keeping the selection on the same task when possible
    pub fn sync_tasks(&mut self, tasks: Vec<Task>) {
        let selected_id = self.selected_task().and_then(|t| t.id.clone());
        self.tasks = tasks;

        if self.tasks.is_empty() {
            self.table_state.select(None);
            return;
        }
        let index = selected_id
            .and_then(|id| self.tasks.iter().position(|t| t.id.as_ref() == Some(&id)))
            .or_else(|| self.table_state.selected())
            .unwrap_or(0)
            .min(self.tasks.len() - 1);
        self.table_state.select(Some(index));
    }

    pub fn selected_task(&self) -> Option<&Task> {
        self.table_state.selected().and_then(|i| self.tasks.get(i))
    }

    pub fn select_next(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        let next = match self.table_state.selected() {
            Some(i) if i + 1 < self.tasks.len() => i + 1,
            Some(i) => i,
            None => 0,
        };
        self.table_state.select(Some(next));
    }

    pub fn select_previous(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        let prev = self.table_state.selected().map_or(0, |i| i.saturating_sub(1));
        self.table_state.select(Some(prev));
    }

    pub fn request_fetch(&self) {
        let store = self.store.clone();
        self.spawn_op(async move { AppEvent::Fetched(store.fetch_all().await) });
    }

    /// Empty form, ready to create
    pub fn start_new_task(&mut self) {
        self.form.reset();
        self.focus = Focus::Form;
    }

    /// Load the selected task into the form
    pub fn edit_selected(&mut self) {
        if let Some(task) = self.selected_task().cloned() {
            self.form = TaskForm::from_task(&task);
            self.focus = Focus::Form;
        }
    }

    /// Validate and send the form. The form is only cleared once the save succeeds.
    pub fn submit_form(&mut self) {
        // One save in flight at a time
        if self.saving {
            return;
        }
        let task = match self.form.to_task() {
            Ok(task) => task,
            Err(message) => {
                self.set_status_message(message);
                return;
            }
        };
        let was_update = !task.is_new();
        self.saving = true;
        let store = self.store.clone();
        self.spawn_op(async move {
            AppEvent::Saved {
                was_update,
                result: store.save(task).await,
            }
        });
    }

    pub fn toggle_selected(&mut self) {
        let Some(task) = self.selected_task().cloned() else {
            return;
        };
        let Some(id) = task.id.clone() else {
            self.set_status_message("Task has no id yet, refresh first".to_string());
            return;
        };
        let store = self.store.clone();
        self.spawn_op(async move {
            AppEvent::Toggled {
                title: task.title,
                result: store.toggle_complete(&id).await,
            }
        });
    }

    pub fn request_delete_selected(&mut self) {
        if let Some(task) = self.selected_task().cloned() {
            self.delete_confirmation = Some(task);
            self.delete_modal_selection = 0;
        }
    }

    pub fn cancel_delete(&mut self) {
        self.delete_confirmation = None;
        self.delete_modal_selection = 0;
    }

    pub fn confirm_delete(&mut self) {
        let Some(task) = self.delete_confirmation.take() else {
            return;
        };
        self.delete_modal_selection = 0;
        let Some(id) = task.id.clone() else {
            return;
        };
        let store = self.store.clone();
        self.spawn_op(async move {
            AppEvent::Deleted {
                title: task.title,
                result: store.delete(&id).await,
            }
        });
    }

    /// Failures were already logged by the store; here they only become a status line
    pub fn handle_app_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Fetched(Ok(())) => {}
            AppEvent::Fetched(Err(e)) => {
                self.set_status_message(format!("Could not load tasks: {}", e));
            }
            AppEvent::Saved { was_update, result } => {
                self.saving = false;
                match result {
                    Ok(()) => {
                        self.form.reset();
                        let message = if was_update { "Task updated" } else { "Task added" };
                        self.set_status_message(message.to_string());
                    }
                    Err(e) => self.set_status_message(format!("Error saving task: {}", e)),
                }
            }
            AppEvent::Deleted { title, result } => match result {
                Ok(()) => self.set_status_message(format!("Deleted '{}'", title)),
                Err(e) => self.set_status_message(format!("Error deleting task: {}", e)),
            },
            AppEvent::Toggled { title, result } => match result {
                Ok(()) => self.set_status_message(format!("Updated '{}'", title)),
                Err(SyncError::TaskNotFound(_)) => {}
                Err(e) => self.set_status_message(format!("Error updating task status: {}", e)),
            },
        }
    }

    pub fn push_reminder(&mut self, reminder: Reminder) {
        self.alerts.push_back(reminder);
    }

    pub fn dismiss_alert(&mut self) {
        self.alerts.pop_front();
    }

    pub fn set_status_message(&mut self, message: String) {
        self.status.message = Some(message);
        self.status.message_time = Some(Instant::now());
    }

    pub fn clear_status_message(&mut self) {
        self.status = StatusState::default();
    }

    pub fn check_status_message_timeout(&mut self) {
        if let Some(time) = self.status.message_time {
            if time.elapsed().as_secs() >= STATUS_MESSAGE_TIMEOUT_SECS {
                self.clear_status_message();
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{task, Call, MemoryApi};
    use std::sync::Arc;

    async fn app_over(api: &Arc<MemoryApi>) -> (App, mpsc::UnboundedReceiver<AppEvent>) {
        let store = TaskStore::new(api.clone());
        store.fetch_all().await.unwrap();
        App::new(Config::default(), store)
    }

    fn fill(form: &mut TaskForm, title: &str, description: &str, time: &str) {
        form.title = Editor::from_string(title);
        form.description = Editor::from_string(description);
        form.time = Editor::from_string(time);
    }

    async fn settle(app: &mut App, rx: &mut mpsc::UnboundedReceiver<AppEvent>) {
        let event = rx.recv().await.unwrap();
        app.handle_app_event(event);
        let tasks = app.store.tasks();
        app.sync_tasks(tasks);
    }

    #[tokio::test]
    async fn successful_create_resets_form() {
        let api = Arc::new(MemoryApi::with_tasks(Vec::new()));
        let (mut app, mut rx) = app_over(&api).await;

        fill(&mut app.form, "Standup", "daily", "2024-01-01 09:00");
        app.submit_form();
        assert!(app.saving);
        settle(&mut app, &mut rx).await;

        assert!(!app.saving);
        assert_eq!(app.form.title.value(), "");
        assert_eq!(app.form.description.value(), "");
        assert_eq!(app.form.time.value(), "");
        assert!(!app.form.is_editing());
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.tasks[0].time, "2024-01-01T09:00");
    }

    #[tokio::test]
    async fn failed_create_keeps_form_values() {
        let api = Arc::new(MemoryApi::with_tasks(Vec::new()));
        *api.fail_writes.lock().unwrap() = true;
        let (mut app, mut rx) = app_over(&api).await;

        fill(&mut app.form, "Standup", "daily", "2024-01-01T09:00");
        app.submit_form();
        settle(&mut app, &mut rx).await;

        assert_eq!(app.form.title.value(), "Standup");
        assert_eq!(app.form.description.value(), "daily");
        assert_eq!(app.form.time.value(), "2024-01-01T09:00");
        assert!(app.status.message.as_deref().unwrap().starts_with("Error saving task"));
    }

    #[tokio::test]
    async fn invalid_form_makes_no_request() {
        let api = Arc::new(MemoryApi::with_tasks(Vec::new()));
        let (mut app, _rx) = app_over(&api).await;

        fill(&mut app.form, "Standup", "", "2024-01-01T09:00");
        app.submit_form();
        assert_eq!(app.status.message.as_deref(), Some("Description is required"));

        fill(&mut app.form, "Standup", "daily", "next tuesday");
        app.submit_form();
        assert!(!app.saving);
        assert_eq!(api.calls(), vec![Call::List]);
    }

    #[tokio::test]
    async fn editing_sends_full_task_back() {
        let mut existing = task(5, "Standup", "2024-01-01T09:00", true);
        existing.extra.insert("owner".into(), serde_json::json!("kim"));
        let api = Arc::new(MemoryApi::with_tasks(vec![existing.clone()]));
        let (mut app, mut rx) = app_over(&api).await;

        app.edit_selected();
        assert_eq!(app.focus, Focus::Form);
        assert_eq!(app.form.submit_label(), "Update Task");
        app.form.title = Editor::from_string("Standup (moved)");
        app.submit_form();
        settle(&mut app, &mut rx).await;

        let expected = Task {
            title: "Standup (moved)".into(),
            ..existing
        };
        assert_eq!(api.calls()[1], Call::Update(TaskId::Number(5), expected));
        assert_eq!(app.form.submit_label(), "Add Task");
    }

    #[tokio::test]
    async fn second_submit_while_saving_is_ignored() {
        let api = Arc::new(MemoryApi::with_tasks(Vec::new()));
        let (mut app, mut rx) = app_over(&api).await;

        fill(&mut app.form, "Standup", "daily", "2024-01-01T09:00");
        app.submit_form();
        app.submit_form();
        settle(&mut app, &mut rx).await;

        let creates = api
            .calls()
            .into_iter()
            .filter(|c| matches!(c, Call::Create(_)))
            .count();
        assert_eq!(creates, 1);
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn untouched_time_is_sent_back_verbatim() {
        let existing = task(8, "Review", "2024-01-01T09:00:00", false);
        let api = Arc::new(MemoryApi::with_tasks(vec![existing]));
        let (mut app, mut rx) = app_over(&api).await;

        app.edit_selected();
        app.form.title = Editor::from_string("Review notes");
        app.submit_form();
        settle(&mut app, &mut rx).await;

        match &api.calls()[1] {
            Call::Update(_, sent) => {
                assert_eq!(sent.title, "Review notes");
                assert_eq!(sent.time, "2024-01-01T09:00:00");
            }
            other => panic!("expected update, got {other:?}"),
        }

        // An edited time is still normalized
        app.edit_selected();
        app.form.time = Editor::from_string("2024-01-02 10:15");
        assert_eq!(app.form.to_task().unwrap().time, "2024-01-02T10:15");
    }

    #[tokio::test]
    async fn toggle_and_delete_selected() {
        let api = Arc::new(MemoryApi::with_tasks(vec![
            task(1, "a", "2024-01-01T09:00", false),
            task(2, "b", "2024-01-01T10:00", false),
        ]));
        let (mut app, mut rx) = app_over(&api).await;

        app.select_next();
        app.toggle_selected();
        settle(&mut app, &mut rx).await;
        assert!(app.tasks[1].completed);
        assert_eq!(app.selected_task().unwrap().title, "b");

        app.request_delete_selected();
        assert!(app.delete_confirmation.is_some());
        app.confirm_delete();
        settle(&mut app, &mut rx).await;
        assert_eq!(app.tasks.len(), 1);
        assert_eq!(app.selected_task().unwrap().title, "a");
    }

    #[tokio::test]
    async fn selection_follows_task_across_refetch() {
        let api = Arc::new(MemoryApi::with_tasks(vec![
            task(1, "a", "", false),
            task(2, "b", "", false),
        ]));
        let (mut app, _rx) = app_over(&api).await;
        app.select_next();

        app.sync_tasks(vec![task(2, "b", "", false), task(1, "a", "", false)]);
        assert_eq!(app.table_state.selected(), Some(0));

        app.sync_tasks(Vec::new());
        assert_eq!(app.table_state.selected(), None);
    }

    #[tokio::test]
    async fn reminders_queue_until_dismissed() {
        let api = Arc::new(MemoryApi::with_tasks(Vec::new()));
        let (mut app, _rx) = app_over(&api).await;
        let due = crate::utils::parse_task_time("2024-01-01T09:00").unwrap();

        for title in ["a", "b"] {
            app.push_reminder(Reminder {
                task_id: None,
                title: title.into(),
                due,
            });
        }
        assert_eq!(app.alerts.front().unwrap().title, "a");
        app.dismiss_alert();
        assert_eq!(app.alerts.front().unwrap().title, "b");
        app.dismiss_alert();
        assert!(app.alerts.is_empty());
    }
}
