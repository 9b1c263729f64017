use std::collections::HashMap;

use anyhow::{anyhow, Result};

use crate::model::task::{Task, TaskState};

/// Keys understood in `key:value` words. A unique prefix of at least
/// [`MIN_PREFIX_LEN`] letters works too (`es:3h`, `st:done`).
pub const TASK_KEYS: [&str; 2] = ["estimation", "state"];

pub const MIN_PREFIX_LEN: usize = 2;

#[derive(Debug, PartialEq)]
pub struct ParsedInput {
    pub name: String,
    pub metadata: HashMap<String, String>,
}

/// Splits words into free text and `key:value` pairs. A word only counts as a
/// pair when its key expands to one of `known_keys`; anything else, such as
/// `Fix:`, `e:mail` or `http://…`, stays part of the text.
pub fn parse_args(args: &[String], known_keys: &[&str]) -> Result<ParsedInput> {
    let mut name_parts = Vec::new();
    let mut metadata = HashMap::new();

    for arg in args {
        if let Some((key, value)) = arg.split_once(':') {
            if !key.is_empty() && !key.contains(char::is_whitespace) {
                match match_key(key, known_keys) {
                    KeyMatch::One(full_key) => {
                        metadata.insert(full_key, value.to_string());
                        continue;
                    }
                    KeyMatch::Many(matches) => {
                        return Err(anyhow!("Ambiguous key: '{}' matches {:?}", key, matches))
                    }
                    KeyMatch::None => {}
                }
            }
        }
        name_parts.push(arg.as_str());
    }

    Ok(ParsedInput {
        name: name_parts.join(" "),
        metadata,
    })
}

enum KeyMatch<'a> {
    One(String),
    Many(Vec<&'a str>),
    None,
}

fn match_key<'a>(key: &str, candidates: &[&'a str]) -> KeyMatch<'a> {
    let key = key.to_lowercase();

    if candidates.contains(&key.as_str()) {
        return KeyMatch::One(key);
    }
    // Single letters are too easily part of the text (`e:mail`).
    if key.chars().count() < MIN_PREFIX_LEN {
        return KeyMatch::None;
    }

    let matches: Vec<&str> = candidates
        .iter()
        .filter(|&&c| c.starts_with(&key))
        .cloned()
        .collect();

    match matches.as_slice() {
        [only] => KeyMatch::One(only.to_string()),
        [] => KeyMatch::None,
        _ => KeyMatch::Many(matches),
    }
}

/// Task fields given on a command line or in the board's input dialog.
/// Missing fields are `None`; callers pick defaults or keep current values.
#[derive(Debug, Default, PartialEq)]
pub struct TaskInput {
    pub description: Option<String>,
    pub estimation: Option<String>,
    pub state: Option<TaskState>,
}

impl TaskInput {
    pub fn parse(args: &[String]) -> Result<Self> {
        let parsed = parse_args(args, &TASK_KEYS)?;
        let state = match parsed.metadata.get("state") {
            Some(value) => Some(TaskState::from_alias(value)?),
            None => None,
        };
        let description = Some(parsed.name).filter(|n| !n.trim().is_empty());

        Ok(Self {
            description,
            estimation: parsed.metadata.get("estimation").cloned(),
            state,
        })
    }

    pub fn parse_line(line: &str) -> Result<Self> {
        Self::parse(&split_words(line))
    }

    /// The inverse of [`TaskInput::parse_line`] for an existing task, used to
    /// prefill the edit dialog.
    pub fn line_for(task: &Task) -> String {
        format!(
            "{} est:{} state:\"{}\"",
            quote(&task.description),
            task.estimation,
            task.state
        )
    }
}

/// Wraps `text` in double quotes so that [`split_words`] gives it back as one
/// word, unchanged.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Whitespace splitting with double quotes grouping words:
/// `state:"In Progress"` is one word, `state:In Progress` two. A backslash
/// escapes `"` and itself, and `\n` is a line break; any other backslash is
/// kept as typed.
pub fn split_words(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    // A quoted empty string is still a word.
    let mut started = false;
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                started = true;
                match chars.peek() {
                    Some('"') | Some('\\') => current.extend(chars.next()),
                    Some('n') => {
                        chars.next();
                        current.push('\n');
                    }
                    _ => current.push('\\'),
                }
            }
            '"' => {
                in_quotes = !in_quotes;
                started = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if started {
                    words.push(std::mem::take(&mut current));
                    started = false;
                }
            }
            c => {
                current.push(c);
                started = true;
            }
        }
    }
    if started {
        words.push(current);
    }
    words
}
