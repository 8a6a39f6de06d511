use crate::dates::{
    created_date, days_between, format_date, format_date_display, is_future_at, is_today_at,
    last_n_days_from, parse_date, today,
};
use crate::models::{
    AppData, CellKind, Completion, CompletionMap, CompletionValue, GridCell, GridResponse,
    GridRow, Habit, HabitStats, HabitSummary, HabitType, OverviewResponse, SortBy,
};
use chrono::{Duration, NaiveDate};

/// How far back the current streak is searched. Older runs are not found.
pub const STREAK_LOOKBACK_DAYS: u32 = 365;
pub const RATE_WINDOW_DAYS: u32 = 30;

/// Window sizes and weights (in tenths) of the strength blend. The all-time
/// window is appended with the remaining weight.
const STRENGTH_WINDOWS: [(u32, u32); 3] = [(7, 4), (30, 3), (90, 2)];
const ALL_TIME_WEIGHT: u32 = 1;

/// Whether a stored completion counts as "done" for a habit of `habit_type`.
pub fn is_valid(completion: Option<&Completion>, habit_type: HabitType) -> bool {
    let Some(completion) = completion else {
        return false;
    };
    match (habit_type, completion.value) {
        (HabitType::YesNo, CompletionValue::Done(done)) => done,
        (HabitType::Numeric, CompletionValue::Amount(amount)) => amount > 0.0,
        _ => false,
    }
}

pub fn current_streak(map: &CompletionMap, habit_type: HabitType) -> u32 {
    current_streak_at(map, habit_type, today())
}

/// Consecutive valid days ending at `today`, capped at
/// [`STREAK_LOOKBACK_DAYS`].
pub fn current_streak_at(map: &CompletionMap, habit_type: HabitType, today: NaiveDate) -> u32 {
    if map.is_empty() {
        return 0;
    }

    let mut streak = 0;
    for offset in 0..STREAK_LOOKBACK_DAYS {
        let date = today - Duration::days(i64::from(offset));
        if !is_valid(map.get(&format_date(date)), habit_type) {
            break;
        }
        streak += 1;
    }
    streak
}

pub fn longest_streak(map: &CompletionMap, habit_type: HabitType) -> u32 {
    let mut dates: Vec<NaiveDate> = map
        .iter()
        .filter(|(_, completion)| is_valid(Some(completion), habit_type))
        .filter_map(|(key, _)| parse_date(key))
        .collect();
    dates.sort_unstable();
    dates.dedup();

    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for date in dates {
        run = match previous {
            Some(prev) if days_between(prev, date) == 1 => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(date);
    }
    longest
}

pub fn completion_rate(map: &CompletionMap, window_days: u32, habit_type: HabitType) -> u32 {
    completion_rate_at(map, window_days, habit_type, today())
}

/// Percentage of valid days among the `window_days` days ending at `today`.
/// An empty window is 0%.
pub fn completion_rate_at(
    map: &CompletionMap,
    window_days: u32,
    habit_type: HabitType,
    today: NaiveDate,
) -> u32 {
    if window_days == 0 {
        return 0;
    }

    let completed = (0..window_days)
        .filter(|offset| {
            let date = today - Duration::days(i64::from(*offset));
            is_valid(map.get(&format_date(date)), habit_type)
        })
        .count() as u64;

    let window = u64::from(window_days);
    ((completed * 200 + window) / (2 * window)) as u32
}

/// Weighted blend of the 7/30/90 day and all-time rates, rounded.
pub fn weighted_strength(last_7: u32, last_30: u32, last_90: u32, all_time: u32) -> u32 {
    let [(_, w7), (_, w30), (_, w90)] = STRENGTH_WINDOWS;
    let tenths = last_7 * w7 + last_30 * w30 + last_90 * w90 + all_time * ALL_TIME_WEIGHT;
    (tenths + 5) / 10
}

pub fn habit_strength(map: &CompletionMap, created_at: &str, habit_type: HabitType) -> u32 {
    habit_strength_at(map, created_at, habit_type, today())
}

pub fn habit_strength_at(
    map: &CompletionMap,
    created_at: &str,
    habit_type: HabitType,
    today: NaiveDate,
) -> u32 {
    let days_since_creation = days_between(created_date(created_at, today), today);
    if days_since_creation <= 0 || map.is_empty() {
        return 0;
    }

    let [r7, r30, r90] =
        STRENGTH_WINDOWS.map(|(days, _)| completion_rate_at(map, days, habit_type, today));
    let all_time = all_time_rate_at(map, days_since_creation, habit_type, today);
    weighted_strength(r7, r30, r90, all_time)
}

/// Same as [`completion_rate_at`] over `window_days`, but counts stored
/// entries instead of walking every day, so very old habits stay cheap.
fn all_time_rate_at(
    map: &CompletionMap,
    window_days: i64,
    habit_type: HabitType,
    today: NaiveDate,
) -> u32 {
    if window_days <= 0 {
        return 0;
    }
    let first = today - Duration::days(window_days - 1);
    let completed = map
        .iter()
        .filter(|(_, completion)| is_valid(Some(completion), habit_type))
        .filter_map(|(key, _)| parse_date(key))
        .filter(|date| (first..=today).contains(date))
        .count() as u64;

    let window = window_days as u64;
    ((completed * 200 + window) / (2 * window)) as u32
}

pub fn habit_stats(habit: &Habit, map: &CompletionMap) -> HabitStats {
    habit_stats_at(habit, map, today())
}

pub fn habit_stats_at(habit: &Habit, map: &CompletionMap, today: NaiveDate) -> HabitStats {
    let habit_type = habit.habit_type;
    HabitStats {
        current_streak: current_streak_at(map, habit_type, today),
        longest_streak: longest_streak(map, habit_type),
        strength: habit_strength_at(map, &habit.created_at, habit_type, today),
        completion_rate_30_days: completion_rate_at(map, RATE_WINDOW_DAYS, habit_type, today),
        total_completions: map.len() as u32,
        valid_completions: valid_count(map, habit_type),
    }
}

/// What a single grid cell should show for `date`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CompletionStatus {
    Empty,
    Done,
    Amount(f64),
}

pub fn completion_status(
    map: &CompletionMap,
    date: NaiveDate,
    habit_type: HabitType,
) -> CompletionStatus {
    let Some(completion) = map.get(&format_date(date)) else {
        return CompletionStatus::Empty;
    };
    match habit_type {
        HabitType::YesNo if is_valid(Some(completion), habit_type) => CompletionStatus::Done,
        HabitType::Numeric => match completion.value {
            CompletionValue::Amount(amount) => CompletionStatus::Amount(amount),
            CompletionValue::Done(_) => CompletionStatus::Empty,
        },
        _ => CompletionStatus::Empty,
    }
}

pub fn overview_at(data: &AppData, today: NaiveDate) -> OverviewResponse {
    let today_key = format_date(today);
    let mut completed_today = 0;
    let mut total_completions = 0;
    let mut best_streak = 0;
    let mut habits = Vec::with_capacity(data.habits.len());

    for habit in data.habits_sorted(SortBy::Order) {
        let map = data.completions_for(&habit.id);
        if is_valid(map.get(&today_key), habit.habit_type) {
            completed_today += 1;
        }
        let stats = habit_stats_at(&habit, map, today);
        total_completions += stats.valid_completions;
        best_streak = best_streak.max(stats.longest_streak);
        habits.push(HabitSummary { habit, stats });
    }

    let total_habits = habits.len();
    let today_completion_rate = if total_habits == 0 {
        0
    } else {
        ((completed_today * 200 + total_habits) / (2 * total_habits)) as u32
    };

    OverviewResponse {
        date: today_key,
        total_habits,
        completed_today,
        today_completion_rate,
        total_completions,
        best_streak,
        habits,
    }
}

/// One row per habit over the `days` days ending at `end`. A month view is
/// the same call with `end` on the month's last day.
pub fn grid_at(
    data: &AppData,
    end: NaiveDate,
    days: u32,
    sort: SortBy,
    today: NaiveDate,
) -> GridResponse {
    let dates = last_n_days_from(end, days);
    let rows = data
        .habits_sorted(sort)
        .into_iter()
        .map(|habit| {
            let map = data.completions_for(&habit.id);
            let cells = dates
                .iter()
                .map(|&date| {
                    let (status, amount) = match completion_status(map, date, habit.habit_type) {
                        CompletionStatus::Empty => (CellKind::Empty, None),
                        CompletionStatus::Done => (CellKind::Done, None),
                        CompletionStatus::Amount(amount) => (CellKind::Amount, Some(amount)),
                    };
                    GridCell {
                        date: format_date(date),
                        label: format_date_display(date),
                        is_today: is_today_at(date, today),
                        is_future: is_future_at(date, today),
                        status,
                        amount,
                    }
                })
                .collect();
            GridRow {
                current_streak: current_streak_at(map, habit.habit_type, today),
                habit_id: habit.id,
                name: habit.name,
                habit_type: habit.habit_type,
                color: habit.color,
                unit: habit.unit,
                cells,
            }
        })
        .collect();

    GridResponse {
        start_date: dates.first().map(|d| format_date(*d)).unwrap_or_default(),
        end_date: format_date(end),
        rows,
    }
}

fn valid_count(map: &CompletionMap, habit_type: HabitType) -> u32 {
    map.values()
        .filter(|completion| is_valid(Some(completion), habit_type))
        .count() as u32
}
