use crate::dates::{format_date, parse_date};
use crate::errors::DataError;
use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

pub const DEFAULT_COLOR: &str = "teal";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HabitType {
    #[serde(rename = "yesno")]
    YesNo,
    #[serde(rename = "numeric")]
    Numeric,
}

/// Stored value of a completion.
///
/// Serialized as the bare JSON value so a yes/no entry reads `"value": true`
/// and a numeric entry reads `"value": 2.5`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CompletionValue {
    Done(bool),
    Amount(f64),
}

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub habit_type: HabitType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<f64>,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub order: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    #[serde(default)]
    pub id: String,
    pub habit_id: String,
    pub date: String,
    pub value: CompletionValue,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub timestamp: i64,
}

pub fn completion_id(habit_id: &str, date: &str) -> String {
    format!("{habit_id}_{date}")
}

/// Completions of one habit keyed by `YYYY-MM-DD`.
pub type CompletionMap = BTreeMap<String, Completion>;

static EMPTY_COMPLETIONS: CompletionMap = BTreeMap::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitStats {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub strength: u32,
    pub completion_rate_30_days: u32,
    /// Every stored entry, including numeric entries recorded as zero.
    pub total_completions: u32,
    pub valid_completions: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortBy {
    #[default]
    Order,
    Name,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHabit {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(rename = "type", default = "default_habit_type")]
    pub habit_type: HabitType,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub target: Option<f64>,
    #[serde(default)]
    pub color: Option<String>,
}

fn default_habit_type() -> HabitType {
    HabitType::YesNo
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub habit_type: Option<HabitType>,
    pub unit: Option<String>,
    pub target: Option<f64>,
    pub color: Option<String>,
    pub order: Option<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CompletionRequest {
    pub value: CompletionValue,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct HabitsQuery {
    #[serde(default)]
    pub sort: SortBy,
}

#[derive(Debug, Default, Deserialize)]
pub struct GridQuery {
    pub days: Option<u32>,
    pub end: Option<String>,
    #[serde(default)]
    pub sort: SortBy,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
    pub date: String,
    pub completion: Option<Completion>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportSummary {
    pub habits: usize,
    pub completions: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StorageInfo {
    pub backend: String,
    pub degraded: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitSummary {
    #[serde(flatten)]
    pub habit: Habit,
    pub stats: HabitStats,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewResponse {
    pub date: String,
    pub total_habits: usize,
    pub completed_today: usize,
    pub today_completion_rate: u32,
    pub total_completions: u32,
    pub best_streak: u32,
    pub habits: Vec<HabitSummary>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CellKind {
    Empty,
    Done,
    Amount,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    pub date: String,
    pub label: String,
    pub is_today: bool,
    pub is_future: bool,
    pub status: CellKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridRow {
    pub habit_id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub habit_type: HabitType,
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    pub current_streak: u32,
    pub cells: Vec<GridCell>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GridResponse {
    pub start_date: String,
    pub end_date: String,
    pub rows: Vec<GridRow>,
}

/// In-memory snapshot of every habit and completion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppData {
    pub habits: Vec<Habit>,
    pub completions: BTreeMap<String, CompletionMap>,
}

impl AppData {
    /// Builds a snapshot from flat lists. Later completions for the same
    /// (habit, date) replace earlier ones; completions of unknown habits or
    /// with malformed dates are dropped.
    pub fn from_parts(habits: Vec<Habit>, completions: Vec<Completion>) -> Self {
        let mut data = Self {
            habits: Vec::with_capacity(habits.len()),
            completions: BTreeMap::new(),
        };
        for habit in habits {
            data.upsert_habit(habit);
        }
        for completion in completions {
            data.insert_completion(completion);
        }
        data
    }

    pub fn habit(&self, id: &str) -> Option<&Habit> {
        self.habits.iter().find(|habit| habit.id == id)
    }

    pub fn habits_sorted(&self, sort: SortBy) -> Vec<Habit> {
        let mut habits = self.habits.clone();
        match sort {
            SortBy::Order => habits.sort_by_key(|habit| habit.order),
            SortBy::Name => habits.sort_by_key(|habit| habit.name.to_lowercase()),
        }
        habits
    }

    pub fn completions_for(&self, habit_id: &str) -> &CompletionMap {
        self.completions.get(habit_id).unwrap_or(&EMPTY_COMPLETIONS)
    }

    pub fn all_completions(&self) -> Vec<Completion> {
        self.completions
            .values()
            .flat_map(|map| map.values().cloned())
            .collect()
    }

    pub fn completion_count(&self) -> usize {
        self.completions.values().map(BTreeMap::len).sum()
    }

    pub fn add_habit(&mut self, input: NewHabit, now: DateTime<Local>) -> Result<Habit, DataError> {
        let name = required_name(&input.name)?;
        let mut millis = now.timestamp_millis();
        while self.habit(&millis.to_string()).is_some() {
            millis += 1;
        }

        let numeric = input.habit_type == HabitType::Numeric;
        let habit = Habit {
            id: millis.to_string(),
            name,
            description: non_empty(input.description),
            habit_type: input.habit_type,
            unit: non_empty(input.unit).filter(|_| numeric),
            target: checked_target(input.target)?.filter(|_| numeric),
            color: non_empty(input.color).unwrap_or_else(default_color),
            created_at: now.to_rfc3339(),
            order: self.habits.len() as i64,
        };
        self.habits.push(habit.clone());
        Ok(habit)
    }

    pub fn update_habit(&mut self, id: &str, update: HabitUpdate) -> Result<Habit, DataError> {
        let name = update.name.as_deref().map(required_name).transpose()?;
        let target = checked_target(update.target)?;
        let habit = self
            .habits
            .iter_mut()
            .find(|habit| habit.id == id)
            .ok_or_else(|| DataError::HabitNotFound(id.to_string()))?;

        if let Some(name) = name {
            habit.name = name;
        }
        if let Some(description) = update.description {
            habit.description = non_empty(Some(description));
        }
        if let Some(habit_type) = update.habit_type {
            habit.habit_type = habit_type;
        }
        if let Some(unit) = update.unit {
            habit.unit = non_empty(Some(unit));
        }
        if target.is_some() {
            habit.target = target;
        }
        if let Some(color) = non_empty(update.color) {
            habit.color = color;
        }
        if let Some(order) = update.order {
            habit.order = order;
        }
        if habit.habit_type == HabitType::YesNo {
            habit.unit = None;
            habit.target = None;
        }
        Ok(habit.clone())
    }

    /// Removes a habit together with all of its completions.
    pub fn remove_habit(&mut self, id: &str) -> Result<Habit, DataError> {
        let index = self
            .habits
            .iter()
            .position(|habit| habit.id == id)
            .ok_or_else(|| DataError::HabitNotFound(id.to_string()))?;
        self.completions.remove(id);
        Ok(self.habits.remove(index))
    }

    pub fn set_completion(
        &mut self,
        habit_id: &str,
        date: &str,
        value: CompletionValue,
        notes: Option<String>,
        now: DateTime<Local>,
    ) -> Result<Completion, DataError> {
        let habit = self
            .habit(habit_id)
            .ok_or_else(|| DataError::HabitNotFound(habit_id.to_string()))?;
        let date = checked_date(date)?;
        check_value(habit.habit_type, value)?;

        let completion = Completion {
            id: completion_id(habit_id, &date),
            habit_id: habit_id.to_string(),
            date: date.clone(),
            value,
            notes: notes.unwrap_or_default(),
            timestamp: now.timestamp_millis(),
        };
        self.completions
            .entry(habit_id.to_string())
            .or_default()
            .insert(date, completion.clone());
        Ok(completion)
    }

    /// Returns the removed completion, if there was one.
    pub fn remove_completion(
        &mut self,
        habit_id: &str,
        date: &str,
    ) -> Result<Option<Completion>, DataError> {
        if self.habit(habit_id).is_none() {
            return Err(DataError::HabitNotFound(habit_id.to_string()));
        }
        let date = checked_date(date)?;
        let Some(map) = self.completions.get_mut(habit_id) else {
            return Ok(None);
        };
        let removed = map.remove(&date);
        if map.is_empty() {
            self.completions.remove(habit_id);
        }
        Ok(removed)
    }

    /// Flips a yes/no habit for one day: an existing entry is removed,
    /// otherwise the day is recorded as done.
    pub fn toggle_completion(
        &mut self,
        habit_id: &str,
        date: &str,
        now: DateTime<Local>,
    ) -> Result<Option<Completion>, DataError> {
        let habit = self
            .habit(habit_id)
            .ok_or_else(|| DataError::HabitNotFound(habit_id.to_string()))?;
        if habit.habit_type != HabitType::YesNo {
            return Err(DataError::InvalidValue(
                "only yes/no habits can be toggled".to_string(),
            ));
        }

        if self.remove_completion(habit_id, date)?.is_some() {
            return Ok(None);
        }
        self.set_completion(habit_id, date, CompletionValue::Done(true), None, now)
            .map(Some)
    }

    pub(crate) fn upsert_habit(&mut self, habit: Habit) {
        match self.habits.iter_mut().find(|existing| existing.id == habit.id) {
            Some(existing) => *existing = habit,
            None => self.habits.push(habit),
        }
    }

    pub(crate) fn insert_completion(&mut self, mut completion: Completion) {
        if self.habit(&completion.habit_id).is_none() {
            warn!(
                "dropping completion for unknown habit {}",
                completion.habit_id
            );
            return;
        }
        let Some(date) = parse_date(&completion.date) else {
            warn!("dropping completion with malformed date {}", completion.date);
            return;
        };
        completion.date = format_date(date);
        completion.id = completion_id(&completion.habit_id, &completion.date);
        self.completions
            .entry(completion.habit_id.clone())
            .or_default()
            .insert(completion.date.clone(), completion);
    }
}

fn required_name(raw: &str) -> Result<String, DataError> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(DataError::InvalidName);
    }
    Ok(name.to_string())
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn checked_target(target: Option<f64>) -> Result<Option<f64>, DataError> {
    match target {
        Some(value) if !value.is_finite() || value < 0.0 => Err(DataError::InvalidValue(
            "target must be a non-negative number".to_string(),
        )),
        other => Ok(other),
    }
}

fn checked_date(raw: &str) -> Result<String, DataError> {
    parse_date(raw)
        .map(format_date)
        .ok_or_else(|| DataError::InvalidDate(raw.to_string()))
}

fn check_value(habit_type: HabitType, value: CompletionValue) -> Result<(), DataError> {
    match (habit_type, value) {
        (HabitType::YesNo, CompletionValue::Done(_)) => Ok(()),
        (HabitType::Numeric, CompletionValue::Amount(amount))
            if amount.is_finite() && amount >= 0.0 =>
        {
            Ok(())
        }
        (HabitType::YesNo, _) => Err(DataError::InvalidValue(
            "yes/no habits take a boolean value".to_string(),
        )),
        (HabitType::Numeric, _) => Err(DataError::InvalidValue(
            "numeric habits take a non-negative number".to_string(),
        )),
    }
}
