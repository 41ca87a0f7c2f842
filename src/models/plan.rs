use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Exercise {
    pub name: String,
    pub reps: String,
    pub sets: u32,
    pub rest_seconds: u32,
    pub icon: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutPlan {
    pub id: String,
    pub name: String,
    pub difficulty: String,
    pub exercises: Vec<Exercise>,
    pub target_muscles: String,
    pub xp_reward: i64,
    pub duration_minutes: u32,
}

impl FromRow<'_, SqliteRow> for WorkoutPlan {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let exercises: String = row.try_get("exercises")?;

        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            difficulty: row.try_get("difficulty")?,
            exercises: serde_json::from_str(&exercises)
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            target_muscles: row.try_get("target_muscles")?,
            xp_reward: row.try_get("xp_reward")?,
            duration_minutes: row.try_get("duration_minutes")?,
        })
    }
}

/// Catalog plan annotated with the user's progress through it.
#[derive(Debug, Clone, Serialize)]
pub struct JourneyStep {
    #[serde(flatten)]
    pub plan: WorkoutPlan,
    pub is_completed: bool,
    pub is_next: bool,
    pub position: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompleteWorkoutRequest {
    pub workout_plan_id: String,
    pub duration_minutes: u32,
}

#[derive(Debug, Serialize)]
pub struct GeneratedPlansResponse {
    pub success: bool,
    pub plans: Vec<WorkoutPlan>,
}
