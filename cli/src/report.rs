use tabled::settings::object::Rows;
use tabled::settings::{Color, Modify, Style};
use tabled::{Table, Tabled};
use taskboard_core::{format_minutes, BoardView, Column, TaskDto};

// Helper struct for Table Row
#[derive(Tabled)]
struct TaskRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "State")]
    state: String,
    #[tabled(rename = "Est")]
    est: String,
    #[tabled(rename = "Description")]
    desc: String,
}

impl From<&TaskDto> for TaskRow {
    fn from(task: &TaskDto) -> Self {
        Self {
            id: task.short_id.clone(),
            state: task.state.to_string(),
            est: task.estimation.clone(),
            desc: first_line(&task.description),
        }
    }
}

// Descriptions may hold markdown over several lines; tables show the first.
fn first_line(text: &str) -> String {
    let mut lines = text.lines();
    let first = lines.next().unwrap_or_default().to_string();
    if lines.next().is_some() {
        format!("{first} …")
    } else {
        first
    }
}

fn styled(rows: Vec<TaskRow>) -> String {
    let mut table = Table::new(rows);
    table
        .with(Style::modern())
        .with(Modify::new(Rows::first()).with(Color::FG_CYAN));
    table.to_string()
}

pub fn task_table(tasks: &[TaskDto]) -> String {
    if tasks.is_empty() {
        return "No tasks found.".to_string();
    }
    styled(tasks.iter().map(TaskRow::from).collect())
}

fn column_header(column: &Column) -> String {
    format!(
        "\x1b[1;36m{}\x1b[0m ({} tasks, {})",
        column.state,
        column.tasks.len(),
        format_minutes(u32::try_from(column.total_minutes).unwrap_or(u32::MAX))
    )
}

/// Renders each column as its own table, in workflow order.
pub fn board_report(board: &BoardView) -> String {
    let mut out = Vec::new();
    for column in &board.columns {
        out.push(column_header(column));
        if column.tasks.is_empty() {
            out.push("  (empty)".to_string());
        } else {
            out.push(styled(column.tasks.iter().map(TaskRow::from).collect()));
        }
        out.push(String::new());
    }
    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use taskboard_core::{Estimation, Task, TaskState};

    fn dto(description: &str, state: TaskState) -> TaskDto {
        TaskDto::from_entity(Task::new(
            description.to_string(),
            Estimation::parse("2h").unwrap(),
            state,
        ))
    }

    #[test]
    fn test_first_line() {
        assert_eq!(first_line("one"), "one");
        assert_eq!(first_line("one\ntwo"), "one …");
        assert_eq!(first_line(""), "");
    }

    #[test]
    fn test_task_table() {
        assert_eq!(task_table(&[]), "No tasks found.");
        let table = task_table(&[dto("Write report", TaskState::ToDo)]);
        assert!(table.contains("Write report"));
        assert!(table.contains("To Do"));
        assert!(table.contains("2h"));
    }

    #[test]
    fn test_board_report_lists_columns_in_order() {
        let board = BoardView::from_tasks(vec![]);
        let report = board_report(&board);
        let positions: Vec<usize> = TaskState::ALL
            .iter()
            .map(|s| report.find(s.label()).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(report.matches("(empty)").count(), 4);
    }
}
