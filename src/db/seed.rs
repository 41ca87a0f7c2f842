use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;

use crate::db::repository;
use crate::models::{Exercise, WorkoutPlan};

fn exercise(name: &str, reps: &str, sets: u32, rest_seconds: u32, icon: &str) -> Exercise {
    Exercise {
        name: name.to_string(),
        reps: reps.to_string(),
        sets,
        rest_seconds,
        icon: icon.to_string(),
    }
}

fn plan(
    name: &str,
    difficulty: &str,
    target_muscles: &str,
    duration_minutes: u32,
    exercises: Vec<Exercise>,
) -> WorkoutPlan {
    WorkoutPlan {
        id: Uuid::new_v4().to_string(),
        name: name.to_string(),
        difficulty: difficulty.to_string(),
        exercises,
        target_muscles: target_muscles.to_string(),
        xp_reward: 50,
        duration_minutes,
    }
}

/// The shared catalog used when a user has no AI-generated plans.
pub fn default_catalog() -> Vec<WorkoutPlan> {
    vec![
        plan("Full Body Starter", "Beginner", "Full Body", 20, vec![
            exercise("Jumping Jacks", "30 reps", 2, 30, "zap"),
            exercise("Push-ups", "10 reps", 3, 45, "activity"),
            exercise("Squats", "15 reps", 3, 45, "trending-up"),
            exercise("Plank", "30 sec", 2, 30, "minus"),
        ]),
        plan("Core Crush", "Beginner", "Core", 15, vec![
            exercise("Crunches", "20 reps", 3, 30, "circle"),
            exercise("Bicycle Crunches", "15 reps", 3, 30, "repeat"),
            exercise("Leg Raises", "12 reps", 3, 30, "arrow-up"),
            exercise("Mountain Climbers", "20 reps", 2, 45, "triangle"),
        ]),
        plan("Upper Body Push", "Intermediate", "Chest, Shoulders, Triceps", 25, vec![
            exercise("Push-ups", "15 reps", 4, 45, "activity"),
            exercise("Diamond Push-ups", "10 reps", 3, 45, "diamond"),
            exercise("Tricep Dips", "12 reps", 3, 45, "chevron-down"),
            exercise("Shoulder Taps", "20 reps", 3, 30, "hand"),
        ]),
        plan("Lower Body Power", "Intermediate", "Legs, Glutes", 25, vec![
            exercise("Squats", "20 reps", 4, 45, "trending-up"),
            exercise("Lunges", "12 each", 3, 45, "move"),
            exercise("Glute Bridges", "15 reps", 3, 30, "chevrons-up"),
            exercise("Calf Raises", "20 reps", 3, 30, "arrow-up-circle"),
        ]),
        plan("Cardio Flow", "Beginner", "Cardio", 18, vec![
            exercise("High Knees", "30 sec", 3, 30, "zap"),
            exercise("Butt Kicks", "30 sec", 3, 30, "wind"),
            exercise("Jump Squats", "10 reps", 3, 45, "trending-up"),
            exercise("Burpees", "8 reps", 2, 60, "layers"),
        ]),
        plan("Core & Cardio Mix", "Intermediate", "Core, Cardio", 22, vec![
            exercise("Plank to Downward Dog", "12 reps", 3, 30, "minus"),
            exercise("Russian Twists", "20 reps", 3, 30, "rotate-cw"),
            exercise("High Knees", "40 sec", 3, 30, "zap"),
            exercise("V-ups", "10 reps", 3, 45, "chevron-up"),
        ]),
        plan("Upper Body Pull", "Intermediate", "Back, Biceps", 20, vec![
            exercise("Pull-up Hold", "20 sec", 3, 45, "arrow-up"),
            exercise("Inverted Rows", "12 reps", 3, 45, "minimize-2"),
            exercise("Superman Hold", "30 sec", 3, 30, "user"),
            exercise("Arm Circles", "20 each", 2, 20, "disc"),
        ]),
        plan("HIIT Challenge", "Advanced", "Full Body, Cardio", 28, vec![
            exercise("Burpees", "15 reps", 4, 45, "layers"),
            exercise("Jump Lunges", "10 each", 3, 45, "move"),
            exercise("Plank Jacks", "20 reps", 3, 30, "minus"),
            exercise("Tuck Jumps", "12 reps", 3, 60, "arrow-up-circle"),
        ]),
        plan("Full Body Blast", "Intermediate", "Full Body", 24, vec![
            exercise("Push-ups", "15 reps", 3, 45, "activity"),
            exercise("Squats", "20 reps", 3, 45, "trending-up"),
            exercise("Plank", "45 sec", 3, 30, "minus"),
            exercise("Jumping Jacks", "40 reps", 3, 30, "zap"),
        ]),
        plan("Recovery Stretch", "Beginner", "Flexibility", 12, vec![
            exercise("Hamstring Stretch", "30 sec", 2, 15, "minimize"),
            exercise("Shoulder Stretch", "30 sec", 2, 15, "move-horizontal"),
            exercise("Cat-Cow Pose", "10 reps", 2, 15, "wave"),
            exercise("Child's Pose", "60 sec", 1, 0, "heart"),
        ]),
    ]
}

/// Seeds the default catalog unless one already exists. Returns the number of plans inserted.
pub async fn seed_default_catalog(db: &SqlitePool) -> Result<usize, sqlx::Error> {
    if repository::count_default_plans(db).await? > 0 {
        return Ok(0);
    }

    let plans = default_catalog();
    let mut tx = db.begin().await?;
    repository::insert_plans(&mut *tx, None, &plans).await?;
    tx.commit().await?;

    info!("Seeded {} workout plans", plans.len());
    Ok(plans.len())
}
