use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};
use uuid::Uuid;

use super::plan::WorkoutPlan;
use super::user::DayOfWeek;

/// One calendar day of a user's schedule.
///
/// A rest entry never references a plan and a workout entry always does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: String,
    pub user_id: String,
    pub workout_plan_id: Option<String>,
    pub scheduled_date: NaiveDate,
    pub day_of_week: DayOfWeek,
    pub is_rest_day: bool,
    pub is_completed: bool,
}

impl ScheduleEntry {
    pub fn rest(user_id: &str, date: NaiveDate, day: DayOfWeek) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            workout_plan_id: None,
            scheduled_date: date,
            day_of_week: day,
            is_rest_day: true,
            is_completed: false,
        }
    }

    pub fn workout(user_id: &str, date: NaiveDate, day: DayOfWeek, plan_id: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            workout_plan_id: Some(plan_id.to_string()),
            scheduled_date: date,
            day_of_week: day,
            is_rest_day: false,
            is_completed: false,
        }
    }
}

impl FromRow<'_, SqliteRow> for ScheduleEntry {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let day: String = row.try_get("day_of_week")?;

        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            workout_plan_id: row.try_get("workout_plan_id")?,
            scheduled_date: row.try_get("scheduled_date")?,
            day_of_week: day
                .parse::<DayOfWeek>()
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            is_rest_day: row.try_get("is_rest_day")?,
            is_completed: row.try_get("is_completed")?,
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct WorkoutDetails {
    pub name: String,
    pub difficulty: String,
    pub duration_minutes: u32,
    pub xp_reward: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_muscles: Option<String>,
}

impl WorkoutDetails {
    pub fn rest_day() -> Self {
        Self {
            name: "Rest Day".to_string(),
            difficulty: "Recovery".to_string(),
            duration_minutes: 0,
            xp_reward: 0,
            target_muscles: None,
        }
    }
}

impl From<&WorkoutPlan> for WorkoutDetails {
    fn from(plan: &WorkoutPlan) -> Self {
        Self {
            name: plan.name.clone(),
            difficulty: plan.difficulty.clone(),
            duration_minutes: plan.duration_minutes,
            xp_reward: plan.xp_reward,
            target_muscles: Some(plan.target_muscles.clone()),
        }
    }
}

/// Schedule entry as shown on the calendar.
#[derive(Debug, Clone, Serialize)]
pub struct CalendarEntry {
    #[serde(flatten)]
    pub entry: ScheduleEntry,
    pub workout_details: Option<WorkoutDetails>,
}

#[derive(Debug, Serialize)]
pub struct GenerateScheduleResponse {
    pub success: bool,
    pub scheduled_count: usize,
    pub total_weeks: u32,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct ResetScheduleResponse {
    pub success: bool,
    pub deleted_count: u64,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteEntryRequest {
    pub duration_minutes: u32,
}
