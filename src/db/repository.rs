use chrono::Utc;
use sqlx::{SqliteConnection, SqliteExecutor, SqlitePool};
use uuid::Uuid;

use crate::models::{
    AvailabilityEntry, DayOfWeek, NewUserRequest, Progress, ScheduleEntry, UpdateProfileRequest,
    User, WorkoutPlan, WorkoutSession,
};

const USER_COLUMNS: &str = "id, email, name, gender, height, weight, goal, equipment, experience_level, plan_duration, plan_duration_unit, created_at";
const PLAN_COLUMNS: &str = "id, name, difficulty, exercises, target_muscles, xp_reward, duration_minutes";
const ENTRY_COLUMNS: &str = "id, user_id, workout_plan_id, scheduled_date, day_of_week, is_rest_day, is_completed";

fn encode_json<T: serde::Serialize>(value: &T) -> Result<String, sqlx::Error> {
    serde_json::to_string(value).map_err(|e| sqlx::Error::Encode(Box::new(e)))
}

pub async fn insert_user(db: &SqlitePool, req: NewUserRequest) -> Result<User, sqlx::Error> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();
    let equipment = encode_json(&req.equipment)?;

    let mut tx = db.begin().await?;

    sqlx::query(
        r#"
        INSERT INTO users
            (id, email, name, gender, height, weight, goal, equipment, created_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
        "#,
    )
    .bind(&id)
    .bind(&req.email)
    .bind(&req.name)
    .bind(&req.gender)
    .bind(req.height)
    .bind(req.weight)
    .bind(&req.goal)
    .bind(&equipment)
    .bind(&now)
    .execute(&mut *tx)
    .await?;

    upsert_progress(&mut *tx, &Progress::new(&id)).await?;

    tx.commit().await?;

    find_user_by_id(db, &id)
        .await?
        .ok_or(sqlx::Error::RowNotFound)
}

pub async fn find_user_by_id(db: &SqlitePool, id: &str) -> Result<Option<User>, sqlx::Error> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(db)
        .await?;

    match user {
        Some(mut user) => {
            user.available_days = fetch_availability(db, id).await?;
            Ok(Some(user))
        }
        None => Ok(None),
    }
}

pub async fn user_exists<'e, E>(db: E, id: &str) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE id = ?")
        .bind(id)
        .fetch_one(db)
        .await?;
    Ok(count > 0)
}

pub async fn email_exists<'e, E>(db: E, email: &str) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
        .bind(email)
        .fetch_one(db)
        .await?;
    Ok(count > 0)
}

pub async fn fetch_availability<'e, E>(
    db: E,
    user_id: &str,
) -> Result<Vec<AvailabilityEntry>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let rows: Vec<(String, u32)> = sqlx::query_as(
        "SELECT day_of_week, minutes FROM availability WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_all(db)
    .await?;

    let mut entries = rows
        .into_iter()
        .map(|(day, minutes)| {
            day.parse::<DayOfWeek>()
                .map(|day| AvailabilityEntry { day, minutes })
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))
        })
        .collect::<Result<Vec<_>, _>>()?;
    entries.sort_by_key(|entry| entry.day);

    Ok(entries)
}

pub async fn replace_availability(
    conn: &mut SqliteConnection,
    user_id: &str,
    entries: &[AvailabilityEntry],
) -> Result<(), sqlx::Error> {
    sqlx::query("DELETE FROM availability WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    for entry in entries {
        sqlx::query("INSERT INTO availability (user_id, day_of_week, minutes) VALUES (?1, ?2, ?3)")
            .bind(user_id)
            .bind(entry.day.as_str())
            .bind(entry.minutes)
            .execute(&mut *conn)
            .await?;
    }

    Ok(())
}

pub async fn update_profile(
    db: &SqlitePool,
    id: &str,
    req: UpdateProfileRequest,
) -> Result<Option<User>, sqlx::Error> {
    let mut tx = db.begin().await?;

    let mut current = match sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    {
        Some(u) => u,
        None => return Ok(None),
    };

    if let Some(name) = req.name {
        current.name = name;
    }
    if let Some(gender) = req.gender {
        current.gender = Some(gender);
    }
    if let Some(height) = req.height {
        current.height = Some(height);
    }
    if let Some(weight) = req.weight {
        current.weight = Some(weight);
    }
    if let Some(goal) = req.goal {
        current.goal = Some(goal);
    }
    if let Some(equipment) = req.equipment {
        current.equipment = equipment;
    }
    if let Some(level) = req.experience_level {
        current.experience_level = Some(level);
    }
    if let Some(amount) = req.plan_duration {
        current.plan_duration = amount;
    }
    if let Some(unit) = req.plan_duration_unit {
        current.plan_duration_unit = unit;
    }

    sqlx::query(
        r#"
        UPDATE users
        SET name = ?1,
            gender = ?2,
            height = ?3,
            weight = ?4,
            goal = ?5,
            equipment = ?6,
            experience_level = ?7,
            plan_duration = ?8,
            plan_duration_unit = ?9
        WHERE id = ?10
        "#,
    )
    .bind(&current.name)
    .bind(&current.gender)
    .bind(current.height)
    .bind(current.weight)
    .bind(&current.goal)
    .bind(encode_json(&current.equipment)?)
    .bind(current.experience_level.map(|level| level.as_str()))
    .bind(current.plan_duration)
    .bind(current.plan_duration_unit.as_str())
    .bind(id)
    .execute(&mut *tx)
    .await?;

    if let Some(days) = req.available_days {
        replace_availability(&mut *tx, id, &days).await?;
    }

    tx.commit().await?;

    find_user_by_id(db, id).await
}

pub async fn fetch_default_plans<'e, E>(db: E) -> Result<Vec<WorkoutPlan>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, WorkoutPlan>(&format!(
        "SELECT {PLAN_COLUMNS} FROM workout_plans WHERE owner_id IS NULL ORDER BY position"
    ))
    .fetch_all(db)
    .await
}

pub async fn count_default_plans<'e, E>(db: E) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM workout_plans WHERE owner_id IS NULL")
        .fetch_one(db)
        .await
}

pub async fn fetch_ai_plans<'e, E>(db: E, user_id: &str) -> Result<Vec<WorkoutPlan>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, WorkoutPlan>(&format!(
        "SELECT {PLAN_COLUMNS} FROM workout_plans WHERE owner_id = ? ORDER BY position"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
}

/// A default-catalog plan or one of `user_id`'s own AI plans.
pub async fn find_plan_for_user<'e, E>(
    db: E,
    id: &str,
    user_id: &str,
) -> Result<Option<WorkoutPlan>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, WorkoutPlan>(&format!(
        "SELECT {PLAN_COLUMNS} FROM workout_plans WHERE id = ? AND (owner_id IS NULL OR owner_id = ?)"
    ))
    .bind(id)
    .bind(user_id)
    .fetch_optional(db)
    .await
}

/// Inserts `plans` in order; `owner_id` of `None` adds them to the default catalog.
pub async fn insert_plans(
    conn: &mut SqliteConnection,
    owner_id: Option<&str>,
    plans: &[WorkoutPlan],
) -> Result<(), sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    for (position, plan) in plans.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO workout_plans
                (id, owner_id, position, name, difficulty, exercises,
                target_muscles, xp_reward, duration_minutes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&plan.id)
        .bind(owner_id)
        .bind(position as i64)
        .bind(&plan.name)
        .bind(&plan.difficulty)
        .bind(encode_json(&plan.exercises)?)
        .bind(&plan.target_muscles)
        .bind(plan.xp_reward)
        .bind(plan.duration_minutes)
        .bind(&now)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub async fn delete_ai_plans<'e, E>(db: E, user_id: &str) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM workout_plans WHERE owner_id = ?")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn fetch_schedule<'e, E>(db: E, user_id: &str) -> Result<Vec<ScheduleEntry>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, ScheduleEntry>(&format!(
        "SELECT {ENTRY_COLUMNS} FROM schedule_entries WHERE user_id = ? ORDER BY scheduled_date"
    ))
    .bind(user_id)
    .fetch_all(db)
    .await
}

pub async fn insert_schedule_entries(
    conn: &mut SqliteConnection,
    entries: &[ScheduleEntry],
) -> Result<(), sqlx::Error> {
    let now = Utc::now().to_rfc3339();

    for entry in entries {
        sqlx::query(
            r#"
            INSERT INTO schedule_entries
                (id, user_id, workout_plan_id, scheduled_date, day_of_week,
                is_rest_day, is_completed, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.user_id)
        .bind(&entry.workout_plan_id)
        .bind(entry.scheduled_date)
        .bind(entry.day_of_week.as_str())
        .bind(entry.is_rest_day)
        .bind(entry.is_completed)
        .bind(&now)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

pub async fn delete_schedule<'e, E>(db: E, user_id: &str) -> Result<u64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query("DELETE FROM schedule_entries WHERE user_id = ?")
        .bind(user_id)
        .execute(db)
        .await?;
    Ok(result.rows_affected())
}

pub async fn mark_entry_completed<'e, E>(db: E, id: &str) -> Result<bool, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    let result = sqlx::query(
        "UPDATE schedule_entries SET is_completed = 1 WHERE id = ? AND is_rest_day = 0",
    )
    .bind(id)
    .execute(db)
    .await?
    .rows_affected();

    Ok(result > 0)
}

pub async fn insert_session<'e, E>(db: E, session: &WorkoutSession) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO workout_sessions
            (id, user_id, workout_plan_id, completed_at, xp_earned, duration_minutes, status)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
        "#,
    )
    .bind(&session.id)
    .bind(&session.user_id)
    .bind(&session.workout_plan_id)
    .bind(&session.completed_at)
    .bind(session.xp_earned)
    .bind(session.duration_minutes)
    .bind(&session.status)
    .execute(db)
    .await?;

    Ok(())
}

pub async fn count_sessions<'e, E>(db: E, user_id: &str) -> Result<i64, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar("SELECT COUNT(*) FROM workout_sessions WHERE user_id = ?")
        .bind(user_id)
        .fetch_one(db)
        .await
}

pub async fn completed_plan_ids<'e, E>(db: E, user_id: &str) -> Result<Vec<String>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_scalar("SELECT DISTINCT workout_plan_id FROM workout_sessions WHERE user_id = ?")
        .bind(user_id)
        .fetch_all(db)
        .await
}

pub async fn fetch_progress<'e, E>(db: E, user_id: &str) -> Result<Option<Progress>, sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Progress>(
        "SELECT user_id, total_xp, level, streak, last_workout_date, achievements FROM progress WHERE user_id = ?",
    )
    .bind(user_id)
    .fetch_optional(db)
    .await
}

pub async fn upsert_progress<'e, E>(db: E, progress: &Progress) -> Result<(), sqlx::Error>
where
    E: SqliteExecutor<'e>,
{
    sqlx::query(
        r#"
        INSERT INTO progress (user_id, total_xp, level, streak, last_workout_date, achievements)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6)
        ON CONFLICT(user_id) DO UPDATE SET
            total_xp = excluded.total_xp,
            level = excluded.level,
            streak = excluded.streak,
            last_workout_date = excluded.last_workout_date,
            achievements = excluded.achievements
        "#,
    )
    .bind(&progress.user_id)
    .bind(progress.total_xp)
    .bind(progress.level)
    .bind(progress.streak)
    .bind(progress.last_workout_date)
    .bind(encode_json(&progress.achievements)?)
    .execute(db)
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::test_support::setup_test_db;
    use crate::models::ExperienceLevel;
    use chrono::NaiveDate;

    fn new_user(email: &str) -> NewUserRequest {
        NewUserRequest {
            email: email.to_string(),
            name: "Asha".to_string(),
            gender: None,
            height: Some(168.0),
            weight: None,
            goal: Some("muscle_building".to_string()),
            equipment: vec!["dumbbells".to_string()],
        }
    }

    fn plan(id: &str, minutes: u32) -> WorkoutPlan {
        WorkoutPlan {
            id: id.to_string(),
            name: format!("Plan {}", id),
            difficulty: "Beginner".to_string(),
            exercises: Vec::new(),
            target_muscles: "Core".to_string(),
            xp_reward: 50,
            duration_minutes: minutes,
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_user() {
        let pool = setup_test_db().await;

        let user = insert_user(&pool, new_user("asha@example.com"))
            .await
            .expect("Failed to insert user");
        assert_eq!(user.name, "Asha");
        assert_eq!(user.equipment, vec!["dumbbells".to_string()]);
        assert_eq!(user.plan_duration, 4);
        assert!(user.available_days.is_empty());

        let found = find_user_by_id(&pool, &user.id)
            .await
            .expect("Failed to fetch user")
            .expect("User not found");
        assert_eq!(found.email, "asha@example.com");

        let progress = fetch_progress(&pool, &user.id)
            .await
            .expect("Failed to fetch progress")
            .expect("Progress not created");
        assert_eq!(progress.level, 1);

        assert!(email_exists(&pool, "asha@example.com").await.unwrap());
        assert!(!email_exists(&pool, "other@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn test_update_profile_replaces_availability() {
        let pool = setup_test_db().await;
        let user = insert_user(&pool, new_user("a@example.com")).await.unwrap();

        let update = UpdateProfileRequest {
            experience_level: Some(ExperienceLevel::Intermediate),
            available_days: Some(vec![
                AvailabilityEntry { day: DayOfWeek::Friday, minutes: 45 },
                AvailabilityEntry { day: DayOfWeek::Monday, minutes: 30 },
            ]),
            ..Default::default()
        };
        let updated = update_profile(&pool, &user.id, update)
            .await
            .expect("Failed to update profile")
            .expect("User not found");

        assert_eq!(updated.experience_level, Some(ExperienceLevel::Intermediate));
        assert_eq!(updated.name, "Asha");
        let days: Vec<DayOfWeek> = updated.available_days.iter().map(|a| a.day).collect();
        assert_eq!(days, vec![DayOfWeek::Monday, DayOfWeek::Friday]);

        let update = UpdateProfileRequest {
            available_days: Some(vec![AvailabilityEntry { day: DayOfWeek::Sunday, minutes: 60 }]),
            ..Default::default()
        };
        let updated = update_profile(&pool, &user.id, update).await.unwrap().unwrap();
        assert_eq!(updated.available_days.len(), 1);
        assert_eq!(updated.available_days[0].minutes, 60);

        let missing = update_profile(&pool, "nobody", UpdateProfileRequest::default())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_plans_keep_catalog_order() {
        let pool = setup_test_db().await;
        let user = insert_user(&pool, new_user("a@example.com")).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        insert_plans(&mut conn, None, &[plan("d2", 20), plan("d1", 30)])
            .await
            .unwrap();
        insert_plans(&mut conn, Some(&user.id), &[plan("ai-b", 25), plan("ai-a", 40)])
            .await
            .unwrap();
        drop(conn);

        let defaults = fetch_default_plans(&pool).await.unwrap();
        let ids: Vec<&str> = defaults.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["d2", "d1"]);
        assert_eq!(count_default_plans(&pool).await.unwrap(), 2);

        let ai = fetch_ai_plans(&pool, &user.id).await.unwrap();
        let ids: Vec<&str> = ai.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, vec!["ai-b", "ai-a"]);

        assert_eq!(delete_ai_plans(&pool, &user.id).await.unwrap(), 2);
        assert!(fetch_ai_plans(&pool, &user.id).await.unwrap().is_empty());
        assert!(find_plan_for_user(&pool, "d1", &user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_plan_lookup_is_scoped_to_owner() {
        let pool = setup_test_db().await;
        let owner = insert_user(&pool, new_user("owner@example.com")).await.unwrap();
        let other = insert_user(&pool, new_user("other@example.com")).await.unwrap();
        let mut conn = pool.acquire().await.unwrap();

        insert_plans(&mut conn, None, &[plan("d1", 20)]).await.unwrap();
        insert_plans(&mut conn, Some(&owner.id), &[plan("ai-1", 25)])
            .await
            .unwrap();
        drop(conn);

        assert!(find_plan_for_user(&pool, "ai-1", &owner.id).await.unwrap().is_some());
        assert!(find_plan_for_user(&pool, "ai-1", &other.id).await.unwrap().is_none());
        assert!(find_plan_for_user(&pool, "d1", &other.id).await.unwrap().is_some());

        assert!(user_exists(&pool, &owner.id).await.unwrap());
        assert!(!user_exists(&pool, "nobody").await.unwrap());
    }

    #[tokio::test]
    async fn test_schedule_entries_roundtrip_in_date_order() {
        let pool = setup_test_db().await;
        let user = insert_user(&pool, new_user("a@example.com")).await.unwrap();
        let monday = NaiveDate::from_ymd_opt(2026, 10, 12).unwrap();
        let tuesday = NaiveDate::from_ymd_opt(2026, 10, 13).unwrap();

        let entries = vec![
            ScheduleEntry::rest(&user.id, tuesday, DayOfWeek::Tuesday),
            ScheduleEntry::workout(&user.id, monday, DayOfWeek::Monday, "p1"),
        ];
        let mut conn = pool.acquire().await.unwrap();
        insert_schedule_entries(&mut conn, &entries).await.unwrap();
        drop(conn);

        let stored = fetch_schedule(&pool, &user.id).await.unwrap();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].scheduled_date, monday);
        assert_eq!(stored[0].workout_plan_id.as_deref(), Some("p1"));
        assert!(stored[1].is_rest_day);
        assert_eq!(stored[1].workout_plan_id, None);

        assert!(!mark_entry_completed(&pool, &stored[1].id).await.unwrap());
        assert!(mark_entry_completed(&pool, &stored[0].id).await.unwrap());
        let stored = fetch_schedule(&pool, &user.id).await.unwrap();
        assert!(stored[0].is_completed);

        assert_eq!(delete_schedule(&pool, &user.id).await.unwrap(), 2);
        assert!(fetch_schedule(&pool, &user.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_progress_upsert() {
        let pool = setup_test_db().await;
        let user = insert_user(&pool, new_user("a@example.com")).await.unwrap();

        let mut progress = Progress::new(&user.id);
        progress.total_xp = 550;
        progress.level = 2;
        progress.streak = 3;
        progress.last_workout_date = NaiveDate::from_ymd_opt(2026, 10, 16);
        progress.achievements = vec!["first_5".to_string()];
        upsert_progress(&pool, &progress).await.unwrap();

        let stored = fetch_progress(&pool, &user.id).await.unwrap().unwrap();
        assert_eq!(stored, progress);
    }
}
