use chrono::{NaiveDate, Utc};
use sqlx::SqliteConnection;
use tracing::info;
use uuid::Uuid;

use crate::db::repository;
use crate::error::AppError;
use crate::models::{CompletionResult, Progress, WorkoutPlan, WorkoutSession};

pub const XP_PER_LEVEL: i64 = 500;

pub fn level_for(total_xp: i64) -> i64 {
    total_xp / XP_PER_LEVEL + 1
}

/// Streak after a workout on `today`, given the previous workout date.
pub fn next_streak(current: i64, last_workout: Option<NaiveDate>, today: NaiveDate) -> i64 {
    match last_workout.map(|last| (today - last).num_days()) {
        Some(0) => current,
        Some(1) => current + 1,
        _ => 1,
    }
}

/// Achievement ids reached with the given totals, in unlock order.
pub fn reached_achievements(total_workouts: i64, streak: i64) -> Vec<&'static str> {
    let thresholds = [
        ("first_5", total_workouts >= 5),
        ("first_10", total_workouts >= 10),
        ("warrior_50", total_workouts >= 50),
        ("streak_7", streak >= 7),
        ("streak_30", streak >= 30),
    ];

    thresholds
        .into_iter()
        .filter(|(_, reached)| *reached)
        .map(|(id, _)| id)
        .collect()
}

/// Applies one completed workout to `progress`.
///
/// `total_workouts` already includes the workout being applied. Returns the
/// achievements unlocked by this workout.
pub fn apply_completion(
    progress: &mut Progress,
    xp_reward: i64,
    total_workouts: i64,
    today: NaiveDate,
) -> Vec<String> {
    progress.total_xp += xp_reward;
    progress.level = level_for(progress.total_xp);
    progress.streak = next_streak(progress.streak, progress.last_workout_date, today);
    progress.last_workout_date = Some(today);

    let mut unlocked = Vec::new();
    for id in reached_achievements(total_workouts, progress.streak) {
        if !progress.achievements.iter().any(|a| a == id) {
            progress.achievements.push(id.to_string());
            unlocked.push(id.to_string());
        }
    }
    unlocked
}

/// Records a completed workout session and updates XP, level, streak and achievements.
pub async fn record_completion(
    conn: &mut SqliteConnection,
    user_id: &str,
    plan: &WorkoutPlan,
    duration_minutes: u32,
    today: NaiveDate,
) -> Result<CompletionResult, AppError> {
    let session = WorkoutSession {
        id: Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        workout_plan_id: plan.id.clone(),
        completed_at: Utc::now().to_rfc3339(),
        xp_earned: plan.xp_reward,
        duration_minutes,
        status: "completed".to_string(),
    };
    repository::insert_session(&mut *conn, &session).await?;

    let mut progress = repository::fetch_progress(&mut *conn, user_id)
        .await?
        .unwrap_or_else(|| Progress::new(user_id));
    let total_workouts = repository::count_sessions(&mut *conn, user_id).await?;

    let new_achievements = apply_completion(&mut progress, plan.xp_reward, total_workouts, today);
    repository::upsert_progress(&mut *conn, &progress).await?;

    info!(
        "user {} completed {} (+{} xp, level {}, streak {})",
        user_id, plan.name, plan.xp_reward, progress.level, progress.streak
    );

    Ok(CompletionResult {
        success: true,
        xp_earned: plan.xp_reward,
        new_total_xp: progress.total_xp,
        new_level: progress.level,
        new_streak: progress.streak,
        new_achievements,
    })
}
