use ratatui::widgets::ListState;
use taskboard_core::{BoardView, TaskDto, TaskInput, TaskRepository, TaskService, TaskState};
use uuid::Uuid;

use crate::commands::merge;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputMode {
    Normal,
    Creating,
    Editing(Uuid),
    ConfirmDelete(Uuid),
}

pub struct App<R: TaskRepository> {
    pub service: TaskService<R>,
    pub board: BoardView,
    /// Index into `TaskState::ALL` of the focused column.
    pub column: usize,
    pub selections: Vec<ListState>,
    pub input: String,
    pub input_mode: InputMode,
    pub cursor_position: usize,
    /// The line the edit dialog opened with.
    pub prefill: String,
    pub message: Option<String>,
}

impl<R: TaskRepository> App<R> {
    pub fn new(service: TaskService<R>) -> App<R> {
        let mut app = App {
            service,
            board: BoardView::from_tasks(Vec::new()),
            column: 0,
            selections: TaskState::ALL.iter().map(|_| ListState::default()).collect(),
            input: String::new(),
            input_mode: InputMode::Normal,
            cursor_position: 0,
            prefill: String::new(),
            message: None,
        };
        app.reload_tasks();
        app
    }

    pub fn current_state(&self) -> TaskState {
        TaskState::ALL
            .get(self.column)
            .copied()
            .unwrap_or_default()
    }

    fn column_len(&self, column: usize) -> usize {
        self.board
            .columns
            .get(column)
            .map(|c| c.tasks.len())
            .unwrap_or(0)
    }

    pub fn selected_task(&self) -> Option<&TaskDto> {
        let index = self.selections.get(self.column)?.selected()?;
        self.board.columns.get(self.column)?.tasks.get(index)
    }

    pub fn next(&mut self) {
        let len = self.column_len(self.column);
        if len == 0 {
            return;
        }
        if let Some(state) = self.selections.get_mut(self.column) {
            let i = match state.selected() {
                Some(i) if i + 1 < len => i + 1,
                _ => 0,
            };
            state.select(Some(i));
        }
    }

    pub fn previous(&mut self) {
        let len = self.column_len(self.column);
        if len == 0 {
            return;
        }
        if let Some(state) = self.selections.get_mut(self.column) {
            let i = match state.selected() {
                Some(0) | None => len - 1,
                Some(i) => i - 1,
            };
            state.select(Some(i));
        }
    }

    pub fn focus_left(&mut self) {
        if self.column > 0 {
            self.column -= 1;
        }
    }

    pub fn focus_right(&mut self) {
        if self.column + 1 < TaskState::ALL.len() {
            self.column += 1;
        }
    }

    /// Moves the selected task one column forward or back, and follows it.
    pub fn shift_selected(&mut self, forward: bool) {
        let Some(task) = self.selected_task() else {
            return;
        };
        let id = task.id;
        let target = if forward {
            task.state.next()
        } else {
            task.state.previous()
        };
        let Some(target) = target else {
            return;
        };

        match self.service.move_task(&id, target) {
            Ok(_) => {
                self.reload_tasks();
                self.column = target.position();
                self.select_task(id);
            }
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    pub fn request_delete(&mut self) {
        if let Some(task) = self.selected_task() {
            self.input_mode = InputMode::ConfirmDelete(task.id);
        }
    }

    pub fn answer_delete(&mut self, confirmed: bool) {
        if let InputMode::ConfirmDelete(id) = self.input_mode {
            if confirmed {
                match self.service.remove_task(&id) {
                    Ok(_) => self.message = Some("Task deleted.".to_string()),
                    Err(e) => self.message = Some(e.to_string()),
                }
                self.reload_tasks();
            }
        }
        self.input_mode = InputMode::Normal;
    }

    pub fn reload_tasks(&mut self) {
        match self.service.board() {
            Ok(board) => self.board = board,
            Err(e) => {
                self.message = Some(e.to_string());
                return;
            }
        }

        // Keep each selection inside its column.
        for (column, state) in self.selections.iter_mut().enumerate() {
            let len = self
                .board
                .columns
                .get(column)
                .map(|c| c.tasks.len())
                .unwrap_or(0);
            let selected = match state.selected() {
                _ if len == 0 => None,
                Some(i) if i >= len => Some(len - 1),
                Some(i) => Some(i),
                None => Some(0),
            };
            state.select(selected);
        }
    }

    fn select_task(&mut self, id: Uuid) {
        let position = self
            .board
            .columns
            .get(self.column)
            .and_then(|c| c.tasks.iter().position(|t| t.id == id));
        if let (Some(i), Some(state)) = (position, self.selections.get_mut(self.column)) {
            state.select(Some(i));
        }
    }

    pub fn enter_create_mode(&mut self) {
        self.input_mode = InputMode::Creating;
        self.input.clear();
        self.cursor_position = 0;
        self.message = None;
    }

    pub fn enter_edit_mode(&mut self) {
        let Some(id) = self.selected_task().map(|t| t.id) else {
            return;
        };
        match self.service.get_task(&id) {
            Ok(Some(task)) => {
                self.input = TaskInput::line_for(&task);
                self.prefill = self.input.clone();
                self.cursor_position = self.input.chars().count();
                self.input_mode = InputMode::Editing(id);
                self.message = None;
            }
            Ok(None) => self.reload_tasks(),
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    pub fn exit_input_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    pub fn input_char(&mut self, c: char) {
        let byte_index = self.input.chars().take(self.cursor_position).map(|c| c.len_utf8()).sum();
        self.input.insert(byte_index, c);
        self.cursor_position += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_position > 0 {
            let byte_index: usize = self.input.chars().take(self.cursor_position - 1).map(|c| c.len_utf8()).sum();
            self.input.remove(byte_index);
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_left(&mut self) {
        if self.cursor_position > 0 {
            self.cursor_position -= 1;
        }
    }

    pub fn move_cursor_right(&mut self) {
        if self.cursor_position < self.input.chars().count() {
            self.cursor_position += 1;
        }
    }

    pub fn submit_command(&mut self) {
        if self.input.trim().is_empty() {
            self.exit_input_mode();
            return;
        }

        let result = match self.input_mode {
            InputMode::Creating => self.submit_create(),
            InputMode::Editing(_) if self.input == self.prefill => Ok(()),
            InputMode::Editing(id) => self.submit_edit(id),
            InputMode::Normal | InputMode::ConfirmDelete(_) => Ok(()),
        };

        match result {
            Ok(()) => {
                self.input.clear();
                self.cursor_position = 0;
                self.exit_input_mode();
            }
            // Stay in the dialog so the input can be corrected.
            Err(e) => self.message = Some(e.to_string()),
        }
    }

    fn submit_create(&mut self) -> anyhow::Result<()> {
        let input = TaskInput::parse_line(&self.input)?;
        let description = input
            .description
            .ok_or_else(|| anyhow::anyhow!("A description is required."))?;
        let estimation = input.estimation.unwrap_or_else(|| "0m".to_string());
        let state = input.state.unwrap_or(self.current_state());

        let task = self
            .service
            .create_task(description, estimation, state.label())?;
        self.reload_tasks();
        self.column = task.state.position();
        self.select_task(task.id);
        Ok(())
    }

    fn submit_edit(&mut self, id: Uuid) -> anyhow::Result<()> {
        let input = TaskInput::parse_line(&self.input)?;
        let Some(current) = self.service.get_task(&id)? else {
            self.reload_tasks();
            return Ok(());
        };
        let (description, estimation, state) = merge(&current, input);
        self.service
            .update_task(&id, description, estimation, state.label())?;
        self.reload_tasks();
        self.column = state.position();
        self.select_task(id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_core::InMemoryTaskRepository;

    fn app() -> App<InMemoryTaskRepository> {
        let service = TaskService::new(InMemoryTaskRepository::new());
        service.create_task("a", "1h", "To Do").unwrap();
        service.create_task("b", "2h", "To Do").unwrap();
        service.create_task("c", "3h", "Done").unwrap();
        App::new(service)
    }

    fn type_line(app: &mut App<InMemoryTaskRepository>, line: &str) {
        for c in line.chars() {
            app.input_char(c);
        }
    }

    #[test]
    fn test_navigation_wraps_within_column() {
        let mut app = app();
        assert_eq!(app.selected_task().unwrap().description, "a");
        app.next();
        assert_eq!(app.selected_task().unwrap().description, "b");
        app.next();
        assert_eq!(app.selected_task().unwrap().description, "a");
        app.previous();
        assert_eq!(app.selected_task().unwrap().description, "b");

        app.focus_right();
        assert!(app.selected_task().is_none());
        app.focus_right();
        app.focus_right();
        app.focus_right();
        assert_eq!(app.current_state(), TaskState::Done);
        assert_eq!(app.selected_task().unwrap().description, "c");
    }

    #[test]
    fn test_shift_selected_follows_task() {
        let mut app = app();
        app.shift_selected(true);
        assert_eq!(app.current_state(), TaskState::InProgress);
        assert_eq!(app.selected_task().unwrap().description, "a");
        app.shift_selected(false);
        assert_eq!(app.current_state(), TaskState::ToDo);
        // Already in the first column.
        app.shift_selected(false);
        assert_eq!(app.current_state(), TaskState::ToDo);
    }

    #[test]
    fn test_create_defaults_to_focused_column() {
        let mut app = app();
        app.focus_right();
        app.enter_create_mode();
        type_line(&mut app, "Review est:30m");
        app.submit_command();

        assert_eq!(app.input_mode, InputMode::Normal);
        let task = app.selected_task().unwrap();
        assert_eq!(task.description, "Review");
        assert_eq!(task.state, TaskState::InProgress);
        assert_eq!(task.estimation_minutes, 30);
    }

    #[test]
    fn test_invalid_input_keeps_dialog_open() {
        let mut app = app();
        app.enter_create_mode();
        type_line(&mut app, "x est:someday");
        app.submit_command();
        assert_eq!(app.input_mode, InputMode::Creating);
        assert!(app.message.is_some());
        assert_eq!(app.board.task_count(), 3);
    }

    #[test]
    fn test_edit_prefills_and_replaces() {
        let mut app = app();
        app.enter_edit_mode();
        assert!(matches!(app.input_mode, InputMode::Editing(_)));
        assert!(app.input.starts_with("\"a\" est:1h"));

        app.input.clear();
        app.cursor_position = 0;
        type_line(&mut app, "a2 state:verify");
        app.submit_command();

        assert_eq!(app.current_state(), TaskState::ToVerify);
        let task = app.selected_task().unwrap();
        assert_eq!(task.description, "a2");
        assert_eq!(task.estimation_minutes, 60);
    }

    #[test]
    fn test_edit_keeps_markdown_description() {
        let service = TaskService::new(InMemoryTaskRepository::new());
        let description = "Fix \"login\" bug\n- step one\n-  step two";
        let task = service.create_task(description, "2h", "To Do").unwrap();
        let mut app = App::new(service);

        // Saved untouched.
        app.enter_edit_mode();
        app.submit_command();
        assert_eq!(app.input_mode, InputMode::Normal);
        let stored = app.service.get_task(&task.id).unwrap().unwrap();
        assert_eq!(stored.description, description);

        // Only the estimation changed.
        app.enter_edit_mode();
        app.input = app.input.replace("est:2h", "est:3h");
        app.submit_command();
        let stored = app.service.get_task(&task.id).unwrap().unwrap();
        assert_eq!(stored.description, description);
        assert_eq!(stored.estimation.minutes(), 180);
    }

    #[test]
    fn test_delete_needs_confirmation() {
        let mut app = app();
        app.request_delete();
        app.answer_delete(false);
        assert_eq!(app.board.task_count(), 3);

        app.request_delete();
        assert!(matches!(app.input_mode, InputMode::ConfirmDelete(_)));
        app.answer_delete(true);
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.board.task_count(), 2);
        assert_eq!(app.selected_task().unwrap().description, "b");
    }

    #[test]
    fn test_cursor_editing_handles_multibyte() {
        let mut app = app();
        app.enter_create_mode();
        type_line(&mut app, "héllo");
        app.move_cursor_left();
        app.delete_char();
        assert_eq!(app.input, "hélo");
        app.move_cursor_right();
        app.move_cursor_right();
        app.input_char('!');
        assert_eq!(app.input, "hélo!");
    }
}
