use std::{
    fs,
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, Ordering},
    },
};

use chrono::{NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use shiftlog_core::{
    backup,
    backup::ImportSummary,
    goal::{Goal, GoalStore},
    progress::{GoalProgress, MetricProgress, evaluate_goal_progress},
    record::{ShiftInput, ShiftRecord, derive_record},
    stats::{LifetimeStats, MonthlyAggregate, compute_lifetime_stats, compute_monthly_aggregate},
    store::RecordStore,
    time::month_key,
};

#[derive(Debug, thiserror::Error)]
enum AppError {
    #[error("io error: {0}")]
    Io(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("backup error: {0}")]
    Backup(String),
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value.to_string())
    }
}

impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.to_string().as_ref())
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, AppError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::InvalidInput(format!("bad date: {raw}")))
}

fn parse_time(raw: &str) -> Result<NaiveTime, AppError> {
    NaiveTime::parse_from_str(raw, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M:%S"))
        .map_err(|_| AppError::InvalidInput(format!("bad clock time: {raw}")))
}

/// Form payload as the frontend submits it: dates and clock times as
/// strings, everything else already coerced to numbers.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct ShiftInputDto {
    date: String,
    start_time: String,
    end_time: String,
    device: String,
    health: u8,
    motivation: u8,
    total_customers: u32,
    coin_users: u32,
    regular_customers: u32,
    paid_users: u32,
    high_spenders: u32,
    total_sales: u64,
    entrance_fee: u64,
    tips: u64,
    special_reward: u64,
    talk_theme: String,
    sales_approach: String,
    tension: String,
    success_memo: String,
    failure_memo: String,
    has_event: bool,
    payday: String,
}

impl TryFrom<ShiftInputDto> for ShiftInput {
    type Error = AppError;

    fn try_from(value: ShiftInputDto) -> Result<Self, Self::Error> {
        Ok(ShiftInput {
            date: parse_date(&value.date)?,
            start_time: parse_time(&value.start_time)?,
            end_time: parse_time(&value.end_time)?,
            device: value.device,
            health: value.health,
            motivation: value.motivation,
            total_customers: value.total_customers,
            coin_users: value.coin_users,
            regular_customers: value.regular_customers,
            paid_users: value.paid_users,
            high_spenders: value.high_spenders,
            total_sales: value.total_sales,
            entrance_fee: value.entrance_fee,
            tips: value.tips,
            special_reward: value.special_reward,
            talk_theme: value.talk_theme,
            sales_approach: value.sales_approach,
            tension: value.tension,
            success_memo: value.success_memo,
            failure_memo: value.failure_memo,
            has_event: value.has_event,
            payday: value.payday,
        })
    }
}

/// Goal form payload. The conversion rate arrives as a percentage and
/// is stored as a fraction.
#[derive(Clone, Debug, Serialize, Deserialize)]
struct GoalDto {
    month: String,
    monthly_sales: u64,
    hourly_wage: u64,
    sessions: u32,
    conversion_rate_percent: f64,
}

impl From<GoalDto> for Goal {
    fn from(value: GoalDto) -> Self {
        Goal {
            month: value.month,
            monthly_sales: value.monthly_sales,
            hourly_wage: value.hourly_wage,
            sessions: value.sessions,
            conversion_rate: value.conversion_rate_percent / 100.0,
        }
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
struct AppStateOnDisk {
    records: Vec<ShiftRecord>,
    goals: Vec<Goal>,
}

struct CoreData {
    records: RecordStore,
    goals: GoalStore,
}

struct AppState {
    path: PathBuf,
    data: Mutex<CoreData>,
    sync_pending: Arc<AtomicBool>,
}

impl AppState {
    fn init() -> Result<Self, AppError> {
        let base = default_data_dir();
        fs::create_dir_all(&base)?;
        let path = base.join("state.json");

        let on_disk: AppStateOnDisk = if path.exists() {
            let raw = fs::read_to_string(&path)?;
            serde_json::from_str(&raw).unwrap_or_default()
        } else {
            AppStateOnDisk::default()
        };

        let mut records = RecordStore::new();
        records.replace_all(on_disk.records);
        let mut goals = GoalStore::new();
        goals.replace_all(on_disk.goals);

        // Any mutation raises the sync flag; the sync layer polls and
        // clears it on its own schedule.
        let sync_pending = Arc::new(AtomicBool::new(false));
        let record_flag = Arc::clone(&sync_pending);
        records.on_change(move |_| record_flag.store(true, Ordering::SeqCst));
        let goal_flag = Arc::clone(&sync_pending);
        goals.on_change(move |_| goal_flag.store(true, Ordering::SeqCst));

        let state = Self {
            path,
            data: Mutex::new(CoreData { records, goals }),
            sync_pending,
        };
        state.save()?;
        Ok(state)
    }

    fn save(&self) -> Result<(), AppError> {
        let payload = {
            let guard = self.lock()?;
            let on_disk = AppStateOnDisk {
                records: guard.records.all().to_vec(),
                goals: guard.goals.snapshot(),
            };
            serde_json::to_string_pretty(&on_disk).map_err(|e| AppError::Io(e.to_string()))?
        };
        fs::write(&self.path, payload)?;
        Ok(())
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, CoreData>, AppError> {
        self.data
            .lock()
            .map_err(|e| AppError::Io(format!("mutex poisoned: {e}")))
    }
}

fn default_data_dir() -> PathBuf {
    if let Ok(xdg) = std::env::var("XDG_DATA_HOME") {
        return PathBuf::from(xdg).join("shiftlog");
    }

    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".local/share/shiftlog")
}

fn exceeded_metrics(progress: &GoalProgress) -> Vec<MetricProgress> {
    match progress {
        GoalProgress::Evaluated(metrics) => {
            metrics.iter().filter(|m| m.exceeded).cloned().collect()
        }
        _ => Vec::new(),
    }
}

fn notify_goal_reached(metrics: &[MetricProgress]) {
    if metrics.is_empty() {
        return;
    }
    let body = metrics
        .iter()
        .map(|m| format!("{:?}: {:.1}%", m.metric, m.percent))
        .collect::<Vec<_>>()
        .join("\n");
    let _ = notify_rust::Notification::new()
        .summary("Shiftlog: goal reached")
        .body(&body)
        .show();
}

#[tauri::command]
fn save_record(
    input: ShiftInputDto,
    state: tauri::State<'_, AppState>,
) -> Result<ShiftRecord, AppError> {
    let input = ShiftInput::try_from(input)?;
    let record = derive_record(input);
    let month = month_key(record.date);

    let newly_exceeded = {
        let mut guard = state.lock()?;
        let before = {
            let month_records = guard.records.records_for_month(&month);
            let aggregate = compute_monthly_aggregate(&month_records);
            exceeded_metrics(&evaluate_goal_progress(
                guard.goals.find_by_month(&month),
                aggregate.as_ref(),
            ))
        };

        guard.records.append(record.clone());

        let month_records = guard.records.records_for_month(&month);
        let aggregate = compute_monthly_aggregate(&month_records);
        let after = exceeded_metrics(&evaluate_goal_progress(
            guard.goals.find_by_month(&month),
            aggregate.as_ref(),
        ));

        after
            .into_iter()
            .filter(|m| !before.iter().any(|b| b.metric == m.metric))
            .collect::<Vec<_>>()
    };
    state.save()?;

    notify_goal_reached(&newly_exceeded);
    Ok(record)
}

#[tauri::command]
fn save_goal(goal: GoalDto, state: tauri::State<'_, AppState>) -> Result<Goal, AppError> {
    let goal = Goal::from(goal);
    {
        let mut guard = state.lock()?;
        guard.goals.upsert(goal.clone());
    }
    state.save()?;
    Ok(goal)
}

#[tauri::command]
fn delete_goal(month: String, state: tauri::State<'_, AppState>) -> Result<bool, AppError> {
    let removed = {
        let mut guard = state.lock()?;
        guard.goals.delete_by_month(&month).is_some()
    };
    state.save()?;
    Ok(removed)
}

#[tauri::command]
fn list_goals(state: tauri::State<'_, AppState>) -> Result<Vec<Goal>, AppError> {
    let guard = state.lock()?;
    let mut goals = guard.goals.snapshot();
    // Newest month first for display.
    goals.sort_by(|a, b| b.month.cmp(&a.month));
    Ok(goals)
}

#[tauri::command]
fn list_records(state: tauri::State<'_, AppState>) -> Result<Vec<ShiftRecord>, AppError> {
    let guard = state.lock()?;
    Ok(guard.records.all().to_vec())
}

#[tauri::command]
fn records_for_date(
    date: String,
    state: tauri::State<'_, AppState>,
) -> Result<Vec<ShiftRecord>, AppError> {
    let date = parse_date(&date)?;
    let guard = state.lock()?;
    Ok(guard
        .records
        .records_for_date(date)
        .into_iter()
        .cloned()
        .collect())
}

#[tauri::command]
fn monthly_stats(
    month: String,
    state: tauri::State<'_, AppState>,
) -> Result<Option<MonthlyAggregate>, AppError> {
    let guard = state.lock()?;
    let month_records = guard.records.records_for_month(&month);
    Ok(compute_monthly_aggregate(&month_records))
}

#[tauri::command]
fn goal_progress(
    month: String,
    state: tauri::State<'_, AppState>,
) -> Result<GoalProgress, AppError> {
    let guard = state.lock()?;
    let month_records = guard.records.records_for_month(&month);
    let aggregate = compute_monthly_aggregate(&month_records);
    Ok(evaluate_goal_progress(
        guard.goals.find_by_month(&month),
        aggregate.as_ref(),
    ))
}

#[tauri::command]
fn lifetime_stats(state: tauri::State<'_, AppState>) -> Result<Option<LifetimeStats>, AppError> {
    let guard = state.lock()?;
    Ok(compute_lifetime_stats(guard.records.all()))
}

#[tauri::command]
fn import_backup(
    raw: String,
    state: tauri::State<'_, AppState>,
) -> Result<ImportSummary, AppError> {
    let summary = {
        let mut guard = state.lock()?;
        let CoreData { records, goals } = &mut *guard;
        backup::restore(&raw, records, goals).map_err(|e| AppError::Backup(e.to_string()))?
    };
    state.save()?;
    Ok(summary)
}

#[tauri::command]
fn export_backup(state: tauri::State<'_, AppState>) -> Result<String, AppError> {
    let guard = state.lock()?;
    let payload = backup::export(
        guard.records.all(),
        guard.goals.snapshot(),
        Utc::now().to_rfc3339(),
    );
    serde_json::to_string_pretty(&payload).map_err(|e| AppError::Backup(e.to_string()))
}

#[tauri::command]
fn sync_pending(state: tauri::State<'_, AppState>) -> bool {
    state.sync_pending.load(Ordering::SeqCst)
}

#[tauri::command]
fn mark_synced(state: tauri::State<'_, AppState>) {
    state.sync_pending.store(false, Ordering::SeqCst);
}

fn main() {
    let state = AppState::init().expect("failed to initialize state");

    tauri::Builder::default()
        .manage(state)
        .invoke_handler(tauri::generate_handler![
            save_record,
            save_goal,
            delete_goal,
            list_goals,
            list_records,
            records_for_date,
            monthly_stats,
            goal_progress,
            lifetime_stats,
            import_backup,
            export_backup,
            sync_pending,
            mark_synced
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
