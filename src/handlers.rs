use crate::backup::{self, Backup, ImportMode, ImportQuery};
use crate::dates::{format_date, parse_date, today};
use crate::errors::{AppError, DataError};
use crate::models::{
    AppData, Completion, CompletionMap, CompletionRequest, GridQuery, GridResponse, Habit,
    HabitStats, HabitUpdate, HabitsQuery, ImportSummary, NewHabit, OverviewResponse,
    StorageInfo, ToggleResponse,
};
use crate::state::AppState;
use crate::stats::{grid_at, habit_stats, overview_at};
use crate::storage::{Change, Persistence};
use crate::ui::render_index;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Html,
    Json,
};
use chrono::Local;
use serde_json::Value;
use tracing::info;

const DEFAULT_GRID_DAYS: u32 = 7;
const MAX_GRID_DAYS: u32 = 366;

pub async fn index() -> Html<String> {
    Html(render_index(&format_date(today())))
}

pub async fn list_habits(
    State(state): State<AppState>,
    Query(query): Query<HabitsQuery>,
) -> Json<Vec<Habit>> {
    let data = state.data.lock().await;
    Json(data.habits_sorted(query.sort))
}

pub async fn get_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Habit>, AppError> {
    let data = state.data.lock().await;
    Ok(Json(find_habit(&data, &id)?.clone()))
}

pub async fn create_habit(
    State(state): State<AppState>,
    Json(payload): Json<NewHabit>,
) -> Result<(StatusCode, Json<Habit>), AppError> {
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    let habit = next.add_habit(payload, Local::now())?;
    state
        .backend
        .persist(&next, Change::HabitSaved(&habit))
        .await?;
    *data = next;

    info!("created habit {} ({})", habit.id, habit.name);
    Ok((StatusCode::CREATED, Json(habit)))
}

pub async fn update_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(payload): Json<HabitUpdate>,
) -> Result<Json<Habit>, AppError> {
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    let habit = next.update_habit(&id, payload)?;
    state
        .backend
        .persist(&next, Change::HabitSaved(&habit))
        .await?;
    *data = next;
    Ok(Json(habit))
}

pub async fn delete_habit(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    let removed = next.remove_habit(&id)?;
    state
        .backend
        .persist(&next, Change::HabitDeleted(&removed.id))
        .await?;
    *data = next;

    info!("deleted habit {} ({})", removed.id, removed.name);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_completions(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CompletionMap>, AppError> {
    let data = state.data.lock().await;
    find_habit(&data, &id)?;
    Ok(Json(data.completions_for(&id).clone()))
}

pub async fn set_completion(
    State(state): State<AppState>,
    Path((id, date)): Path<(String, String)>,
    Json(payload): Json<CompletionRequest>,
) -> Result<Json<Completion>, AppError> {
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    let completion =
        next.set_completion(&id, &date, payload.value, payload.notes, Local::now())?;
    state
        .backend
        .persist(&next, Change::CompletionSet(&completion))
        .await?;
    *data = next;
    Ok(Json(completion))
}

pub async fn delete_completion(
    State(state): State<AppState>,
    Path((id, date)): Path<(String, String)>,
) -> Result<StatusCode, AppError> {
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    if let Some(removed) = next.remove_completion(&id, &date)? {
        state
            .backend
            .persist(
                &next,
                Change::CompletionDeleted {
                    habit_id: &removed.habit_id,
                    date: &removed.date,
                },
            )
            .await?;
        *data = next;
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn toggle_completion(
    State(state): State<AppState>,
    Path((id, date)): Path<(String, String)>,
) -> Result<Json<ToggleResponse>, AppError> {
    let mut data = state.data.lock().await;
    let mut next = data.clone();
    let completion = next.toggle_completion(&id, &date, Local::now())?;
    let date = parse_date(&date).map(format_date).unwrap_or(date);
    let change = match &completion {
        Some(completion) => Change::CompletionSet(completion),
        None => Change::CompletionDeleted {
            habit_id: &id,
            date: &date,
        },
    };
    state.backend.persist(&next, change).await?;
    *data = next;
    Ok(Json(ToggleResponse { date, completion }))
}

pub async fn get_habit_stats(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<HabitStats>, AppError> {
    let data = state.data.lock().await;
    let habit = find_habit(&data, &id)?;
    Ok(Json(habit_stats(habit, data.completions_for(&id))))
}

pub async fn get_overview(State(state): State<AppState>) -> Json<OverviewResponse> {
    let data = state.data.lock().await;
    Json(overview_at(&data, today()))
}

pub async fn get_grid(
    State(state): State<AppState>,
    Query(query): Query<GridQuery>,
) -> Result<Json<GridResponse>, AppError> {
    let days = query.days.unwrap_or(DEFAULT_GRID_DAYS);
    if days == 0 || days > MAX_GRID_DAYS {
        return Err(AppError::bad_request(format!(
            "days must be between 1 and {MAX_GRID_DAYS}"
        )));
    }
    let today = today();
    let end = match query.end.as_deref() {
        Some(raw) => parse_date(raw).ok_or(DataError::InvalidDate(raw.to_string()))?,
        None => today,
    };

    let data = state.data.lock().await;
    Ok(Json(grid_at(&data, end, days, query.sort, today)))
}

pub async fn export_backup(State(state): State<AppState>) -> Json<Backup> {
    let data = state.data.lock().await;
    Json(backup::export(&data, Local::now()))
}

pub async fn import_backup(
    State(state): State<AppState>,
    Query(query): Query<ImportQuery>,
    Json(payload): Json<Value>,
) -> Result<Json<ImportSummary>, AppError> {
    let parsed = backup::parse(payload)?;
    let mut data = state.data.lock().await;
    let mut rebuilt = data.clone();
    let summary = backup::apply(&mut rebuilt, parsed, query.mode);
    state.backend.persist(&rebuilt, Change::Replaced).await?;
    *data = rebuilt;
    Ok(Json(summary))
}

pub async fn clear_data(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    let empty = Backup {
        version: backup::BACKUP_VERSION,
        export_date: String::new(),
        habits: Vec::new(),
        completions: Vec::new(),
    };
    let mut data = state.data.lock().await;
    let mut cleared = data.clone();
    backup::apply(&mut cleared, empty, ImportMode::Overwrite);
    state.backend.persist(&cleared, Change::Replaced).await?;
    *data = cleared;

    info!("cleared all habits and completions");
    Ok(StatusCode::NO_CONTENT)
}

pub async fn storage_info(State(state): State<AppState>) -> Json<StorageInfo> {
    Json(StorageInfo {
        backend: state.backend.kind().to_string(),
        degraded: state.backend.is_degraded(),
    })
}

fn find_habit<'a>(data: &'a AppData, id: &str) -> Result<&'a Habit, DataError> {
    data.habit(id)
        .ok_or_else(|| DataError::HabitNotFound(id.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompletionValue, HabitType};
    use crate::storage::{Backend, DocumentStore};
    use serde_json::json;
    use std::path::Path as FsPath;
    use tempfile::tempdir;

    fn new_habit(name: &str) -> NewHabit {
        NewHabit {
            name: name.to_string(),
            description: None,
            habit_type: HabitType::YesNo,
            unit: None,
            target: None,
            color: None,
        }
    }

    async fn document_state(root: &FsPath) -> AppState {
        let store = DocumentStore::open(&root.join("store/habits.json"))
            .await
            .unwrap();
        AppState::new(Backend::Document(store), AppData::default())
    }

    /// Swaps the store directory for a plain file so every write fails.
    async fn block_store(root: &FsPath) {
        let store_dir = root.join("store");
        tokio::fs::remove_dir_all(&store_dir).await.unwrap();
        tokio::fs::write(&store_dir, b"not a directory").await.unwrap();
    }

    #[tokio::test]
    async fn failed_write_keeps_snapshot_unchanged() {
        let dir = tempdir().unwrap();
        let state = document_state(dir.path()).await;

        let (_, Json(habit)) = create_habit(State(state.clone()), Json(new_habit("Run")))
            .await
            .unwrap();
        let before = state.data.lock().await.clone();

        block_store(dir.path()).await;

        let set = set_completion(
            State(state.clone()),
            Path((habit.id.clone(), "2026-01-05".to_string())),
            Json(CompletionRequest {
                value: CompletionValue::Done(true),
                notes: None,
            }),
        )
        .await;
        assert_eq!(set.unwrap_err().status, StatusCode::INTERNAL_SERVER_ERROR);

        let toggled = toggle_completion(
            State(state.clone()),
            Path((habit.id.clone(), "2026-01-05".to_string())),
        )
        .await;
        assert!(toggled.is_err());

        let created = create_habit(State(state.clone()), Json(new_habit("Read"))).await;
        assert!(created.is_err());

        let deleted = delete_habit(State(state.clone()), Path(habit.id.clone())).await;
        assert!(deleted.is_err());

        let cleared = clear_data(State(state.clone())).await;
        assert!(cleared.is_err());

        let data = state.data.lock().await;
        assert_eq!(*data, before);
        assert_eq!(data.completion_count(), 0);
        assert_eq!(data.habits.len(), 1);
    }

    #[tokio::test]
    async fn failed_import_keeps_existing_habits() {
        let dir = tempdir().unwrap();
        let state = document_state(dir.path()).await;
        create_habit(State(state.clone()), Json(new_habit("Run")))
            .await
            .unwrap();
        let before = state.data.lock().await.clone();

        block_store(dir.path()).await;

        let backup = json!({
            "version": 1,
            "habits": [{ "id": "7", "name": "Swim", "type": "yesno" }],
            "completions": [],
        });
        let imported = import_backup(
            State(state.clone()),
            Query(ImportQuery::default()),
            Json(backup),
        )
        .await;
        assert!(imported.is_err());
        assert_eq!(*state.data.lock().await, before);
    }

    #[tokio::test]
    async fn successful_write_commits_snapshot() {
        let dir = tempdir().unwrap();
        let state = document_state(dir.path()).await;
        let (_, Json(habit)) = create_habit(State(state.clone()), Json(new_habit("Run")))
            .await
            .unwrap();

        let Json(toggled) = toggle_completion(
            State(state.clone()),
            Path((habit.id.clone(), "2026-01-05".to_string())),
        )
        .await
        .unwrap();
        assert!(toggled.completion.is_some());

        let in_memory = state.data.lock().await.clone();
        assert_eq!(in_memory.completion_count(), 1);
        assert_eq!(state.backend.load().await, in_memory);
    }
}
