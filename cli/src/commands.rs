use std::io::{self, BufRead, Write};

use anyhow::{anyhow, bail, Result};
use taskboard_core::{Task, TaskDto, TaskInput, TaskRepository, TaskService, TaskState};

use crate::report;

pub const DELETE_PROMPT: &str = "Do you really want to delete this task?";
const DEFAULT_ESTIMATION: &str = "0m";

pub fn add<R: TaskRepository>(service: &TaskService<R>, args: &[String]) -> Result<()> {
    let input = TaskInput::parse(args)?;
    let description = input
        .description
        .ok_or_else(|| anyhow!("Task description is required."))?;
    let estimation = input
        .estimation
        .unwrap_or_else(|| DEFAULT_ESTIMATION.to_string());
    let state = input.state.unwrap_or_default();

    let task = service.create_task(description, estimation, state.label())?;
    println!("Task added: {} (ID: {})", task.description, task.short_id());
    println!("  Estimation: {}", task.estimation);
    println!("  State: {}", task.state);
    Ok(())
}

/// Fields for a full replacement: whatever the user gave, the current value
/// for the rest.
pub fn merge(current: &Task, input: TaskInput) -> (String, String, TaskState) {
    (
        input
            .description
            .unwrap_or_else(|| current.description.clone()),
        input
            .estimation
            .unwrap_or_else(|| current.estimation.to_string()),
        input.state.unwrap_or(current.state),
    )
}

pub fn edit<R: TaskRepository>(service: &TaskService<R>, id: &str, args: &[String]) -> Result<()> {
    let input = TaskInput::parse(args)?;
    if input == TaskInput::default() {
        bail!("Nothing to change: give a description, est:<duration> or state:<state>.");
    }

    let task = find(service, id)?;
    let (description, estimation, state) = merge(&task, input);
    service.update_task(&task.id, description, estimation, state.label())?;
    println!("Task updated: {}", task.short_id());
    Ok(())
}

pub fn move_to<R: TaskRepository>(service: &TaskService<R>, id: &str, state: &str) -> Result<()> {
    let state = TaskState::from_alias(state)?;
    let task = find(service, id)?;
    service.move_task(&task.id, state)?;
    println!("Task {}: {} -> {}", task.short_id(), task.state, state);
    Ok(())
}

pub fn remove<R: TaskRepository>(service: &TaskService<R>, id: &str, yes: bool) -> Result<()> {
    let task = find(service, id)?;
    if !yes {
        println!("{}  {}", task.short_id(), task.description);
        let stdin = io::stdin();
        if !confirm(stdin.lock(), io::stdout(), DELETE_PROMPT)? {
            println!("Cancelled.");
            return Ok(());
        }
    }
    service.remove_task(&task.id)?;
    println!("Task removed: {}", task.short_id());
    Ok(())
}

pub fn list<R: TaskRepository>(service: &TaskService<R>, state: Option<&str>) -> Result<()> {
    let tasks = match state {
        Some(s) => service.find_by_state(TaskState::from_alias(s)?)?,
        None => service.list_tasks()?,
    };
    let dtos: Vec<TaskDto> = tasks.into_iter().map(TaskDto::from_entity).collect();
    println!("{}", report::task_table(&dtos));
    Ok(())
}

pub fn board<R: TaskRepository>(service: &TaskService<R>) -> Result<()> {
    println!("{}", report::board_report(&service.board()?));
    Ok(())
}

pub fn states() {
    for (i, state) in TaskState::ALL.iter().enumerate() {
        println!("{}. {}", i + 1, state);
    }
}

fn find<R: TaskRepository>(service: &TaskService<R>, id: &str) -> Result<Task> {
    let id = service.resolve_id(id)?;
    service
        .get_task(&id)?
        .ok_or_else(|| anyhow!("No task with ID {}", id))
}

pub fn confirm(mut input: impl BufRead, mut output: impl Write, prompt: &str) -> Result<bool> {
    write!(output, "{} [y/N] ", prompt)?;
    output.flush()?;
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
