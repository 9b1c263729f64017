use std::fs::{self, File};
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;
use uuid::Uuid;

use crate::error::Result;
use crate::model::task::Task;
use crate::policy::WriteGrant;
use crate::repository::traits::TaskRepository;

const DEFAULT_FILE_NAME: &str = "tasks.json";
const DEFAULT_DIR_NAME: &str = ".taskboard";

/// Tasks kept as a pretty-printed JSON array in `<base_dir>/tasks.json`.
#[derive(Clone, Debug)]
pub struct FileTaskRepository {
    file_path: PathBuf,
    // Serialises read-modify-write cycles between clones in this process.
    lock: Arc<Mutex<()>>,
}

impl FileTaskRepository {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut path = match base_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        fs::create_dir_all(&path)?;
        path.push(DEFAULT_FILE_NAME);

        // Start from an empty array so reads never see a missing file.
        if !path.exists() {
            write_json(&path, &Vec::<Task>::new())?;
        }

        debug!(path = %path.display(), "opened task file");
        Ok(FileTaskRepository {
            file_path: path,
            lock: Arc::new(Mutex::new(())),
        })
    }

    pub fn path(&self) -> &Path {
        &self.file_path
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn read_tasks(&self) -> Result<Vec<Task>> {
        let file = File::open(&self.file_path)?;
        let reader = BufReader::new(file);
        let tasks = serde_json::from_reader(reader)?;
        Ok(tasks)
    }

    fn write_tasks(&self, tasks: &[Task]) -> Result<()> {
        write_json(&self.file_path, tasks)
    }
}

/// `~/.taskboard`
pub fn default_data_dir() -> Result<PathBuf> {
    let home_dir = dirs::home_dir().ok_or_else(|| {
        io::Error::new(io::ErrorKind::NotFound, "could not determine home directory")
    })?;
    Ok(home_dir.join(DEFAULT_DIR_NAME))
}

// Write to a sibling file and rename, so readers never see a half-written array.
fn write_json(path: &Path, tasks: &[Task]) -> Result<()> {
    let tmp_path = path.with_extension("json.tmp");
    let file = File::create(&tmp_path)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, tasks)?;
    writer.flush()?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

impl TaskRepository for FileTaskRepository {
    fn list(&self) -> Result<Vec<Task>> {
        let _guard = self.guard();
        self.read_tasks()
    }

    fn insert(&self, task: Task, _grant: &WriteGrant) -> Result<Task> {
        let _guard = self.guard();
        let mut tasks = self.read_tasks()?;
        tasks.push(task.clone());
        self.write_tasks(&tasks)?;
        Ok(task)
    }

    fn replace(&self, task: &Task, _grant: &WriteGrant) -> Result<bool> {
        let _guard = self.guard();
        let mut tasks = self.read_tasks()?;
        if let Some(pos) = tasks.iter().position(|t| t.id == task.id) {
            tasks[pos] = task.clone();
            self.write_tasks(&tasks)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    fn remove(&self, id: &Uuid, _grant: &WriteGrant) -> Result<bool> {
        let _guard = self.guard();
        let mut tasks = self.read_tasks()?;
        let initial_len = tasks.len();
        tasks.retain(|t| t.id != *id);

        if tasks.len() == initial_len {
            return Ok(false);
        }

        self.write_tasks(&tasks)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::estimation::Estimation;
    use crate::model::task::TaskState;

    fn task(description: &str, state: TaskState) -> Task {
        Task::new(description.to_string(), Estimation::parse("1h").unwrap(), state)
    }

    #[test]
    fn test_new_creates_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileTaskRepository::new(Some(dir.path().to_path_buf())).unwrap();
        assert!(repo.path().exists());
        assert_eq!(fs::read_to_string(repo.path()).unwrap().trim(), "[]");
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn test_tasks_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileTaskRepository::new(Some(dir.path().to_path_buf())).unwrap();
        let a = repo.insert(task("a", TaskState::ToDo), &WriteGrant::new()).unwrap();
        let b = repo.insert(task("b", TaskState::Done), &WriteGrant::new()).unwrap();

        let reopened = FileTaskRepository::new(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(reopened.list().unwrap(), vec![a, b.clone()]);
        assert_eq!(reopened.find_by_state(TaskState::Done).unwrap(), vec![b]);
    }

    #[test]
    fn test_file_uses_labels() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileTaskRepository::new(Some(dir.path().to_path_buf())).unwrap();
        repo.insert(task("a", TaskState::ToVerify), &WriteGrant::new()).unwrap();
        let raw = fs::read_to_string(repo.path()).unwrap();
        assert!(raw.contains("\"To Verify\""));
        assert!(raw.contains("\"1h\""));
    }

    #[test]
    fn test_replace_and_remove_report_matches() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileTaskRepository::new(Some(dir.path().to_path_buf())).unwrap();
        let mut a = repo.insert(task("a", TaskState::ToDo), &WriteGrant::new()).unwrap();

        a.description = "changed".to_string();
        assert!(repo.replace(&a, &WriteGrant::new()).unwrap());
        assert_eq!(repo.get(&a.id).unwrap().unwrap().description, "changed");

        let stranger = task("b", TaskState::ToDo);
        assert!(!repo.replace(&stranger, &WriteGrant::new()).unwrap());
        assert!(!repo.remove(&stranger.id, &WriteGrant::new()).unwrap());
        assert!(repo.remove(&a.id, &WriteGrant::new()).unwrap());
        assert!(repo.list().unwrap().is_empty());
    }

    #[test]
    fn test_concurrent_inserts_are_not_lost() {
        let dir = tempfile::tempdir().unwrap();
        let repo = FileTaskRepository::new(Some(dir.path().to_path_buf())).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let repo = repo.clone();
                std::thread::spawn(move || {
                    repo.insert(task(&format!("t{i}"), TaskState::ToDo), &WriteGrant::new())
                        .unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(repo.list().unwrap().len(), 8);
    }
}
