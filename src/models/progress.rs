use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Progress {
    pub user_id: String,
    pub total_xp: i64,
    pub level: i64,
    pub streak: i64,
    pub last_workout_date: Option<NaiveDate>,
    pub achievements: Vec<String>,
}

impl Progress {
    pub fn new(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            total_xp: 0,
            level: 1,
            streak: 0,
            last_workout_date: None,
            achievements: Vec::new(),
        }
    }
}

impl FromRow<'_, SqliteRow> for Progress {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let achievements: String = row.try_get("achievements")?;

        Ok(Self {
            user_id: row.try_get("user_id")?,
            total_xp: row.try_get("total_xp")?,
            level: row.try_get("level")?,
            streak: row.try_get("streak")?,
            last_workout_date: row.try_get("last_workout_date")?,
            achievements: serde_json::from_str(&achievements)
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkoutSession {
    pub id: String,
    pub user_id: String,
    pub workout_plan_id: String,
    pub completed_at: String,
    pub xp_earned: i64,
    pub duration_minutes: u32,
    pub status: String,
}

/// Static description of an unlockable achievement.
#[derive(Debug, Clone, Copy)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
}

pub const ACHIEVEMENTS: [Achievement; 5] = [
    Achievement {
        id: "first_5",
        name: "First Steps",
        description: "Complete 5 workouts",
        icon: "award",
    },
    Achievement {
        id: "first_10",
        name: "Getting Strong",
        description: "Complete 10 workouts",
        icon: "trophy",
    },
    Achievement {
        id: "warrior_50",
        name: "Warrior",
        description: "Complete 50 workouts",
        icon: "crown",
    },
    Achievement {
        id: "streak_7",
        name: "Week Warrior",
        description: "7-day streak",
        icon: "flame",
    },
    Achievement {
        id: "streak_30",
        name: "Unstoppable",
        description: "30-day streak",
        icon: "zap",
    },
];

#[derive(Debug, Clone, Serialize)]
pub struct AchievementStatus {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub unlocked: bool,
}

#[derive(Debug, Serialize)]
pub struct AchievementsResponse {
    pub achievements: Vec<AchievementStatus>,
    pub total_workouts: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompletionResult {
    pub success: bool,
    pub xp_earned: i64,
    pub new_total_xp: i64,
    pub new_level: i64,
    pub new_streak: i64,
    pub new_achievements: Vec<String>,
}
