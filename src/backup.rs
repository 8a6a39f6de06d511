use crate::dates::parse_date;
use crate::errors::BackupError;
use crate::models::{AppData, Completion, Habit, ImportSummary};
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

pub const BACKUP_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Backup {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub export_date: String,
    pub habits: Vec<Habit>,
    #[serde(default)]
    pub completions: Vec<Completion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportMode {
    /// Clear every habit and completion before inserting the backup.
    #[default]
    Overwrite,
    /// Upsert habits by id and completions by (habit, date).
    Merge,
}

#[derive(Debug, Default, Deserialize)]
pub struct ImportQuery {
    #[serde(default)]
    pub mode: ImportMode,
}

pub fn export(data: &AppData, now: DateTime<Local>) -> Backup {
    Backup {
        version: BACKUP_VERSION,
        export_date: now.to_rfc3339(),
        habits: data.habits.clone(),
        completions: data.all_completions(),
    }
}

/// Structural checks on an untyped backup document.
pub fn validate(value: &Value) -> Result<(), BackupError> {
    let Some(document) = value.as_object() else {
        return Err(invalid("backup must be a JSON object"));
    };

    let Some(habits) = document.get("habits").and_then(Value::as_array) else {
        return Err(invalid("missing or invalid habits array"));
    };
    for habit in habits {
        let has_field = |field: &str| {
            habit
                .get(field)
                .and_then(Value::as_str)
                .is_some_and(|value| !value.trim().is_empty())
        };
        if !has_field("id") || !has_field("name") || !has_field("type") {
            return Err(invalid("invalid habit structure"));
        }
    }

    match document.get("completions") {
        None | Some(Value::Null) => {}
        Some(Value::Array(completions)) => {
            for completion in completions {
                let habit_id = completion.get("habitId").and_then(Value::as_str);
                let date = completion.get("date").and_then(Value::as_str);
                if habit_id.is_none_or(str::is_empty) || date.and_then(parse_date).is_none() {
                    return Err(invalid("invalid completion structure"));
                }
            }
        }
        Some(_) => return Err(invalid("invalid completions array")),
    }

    Ok(())
}

/// Validates and decodes a backup document without touching any data.
pub fn parse(mut value: Value) -> Result<Backup, BackupError> {
    validate(&value)?;
    if let Some(document) = value.as_object_mut() {
        if document.get("completions").is_some_and(Value::is_null) {
            document.remove("completions");
        }
    }
    serde_json::from_value(value).map_err(|err| invalid(err.to_string()))
}

pub fn apply(data: &mut AppData, backup: Backup, mode: ImportMode) -> ImportSummary {
    let summary = ImportSummary {
        habits: backup.habits.len(),
        completions: backup.completions.len(),
    };

    match mode {
        ImportMode::Overwrite => {
            *data = AppData::from_parts(backup.habits, backup.completions);
        }
        ImportMode::Merge => {
            for habit in backup.habits {
                data.upsert_habit(habit);
            }
            for completion in backup.completions {
                data.insert_completion(completion);
            }
        }
    }

    info!(
        "imported {} habits and {} completions ({mode:?})",
        summary.habits, summary.completions
    );
    summary
}

fn invalid(message: impl Into<String>) -> BackupError {
    BackupError::InvalidFormat(message.into())
}
