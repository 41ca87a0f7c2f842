use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tokio::sync::OwnedMutexGuard;
use tracing::info;

use crate::db::repository;
use crate::error::AppError;
use crate::llm::PlanGenerator;
use crate::models::{
    ACHIEVEMENTS, AchievementStatus, AchievementsResponse, CompletionResult, JourneyStep, Progress,
    User, WorkoutPlan,
};
use crate::services::{catalog, progress};
use crate::state::UserLocks;

/// Plan catalog, AI generation and workout progress for a user.
pub struct WorkoutService {
    db: SqlitePool,
    planner: Arc<dyn PlanGenerator>,
    locks: UserLocks,
}

impl WorkoutService {
    pub fn new(db: SqlitePool, planner: Arc<dyn PlanGenerator>, locks: UserLocks) -> Self {
        Self { db, planner, locks }
    }

    /// Fails with `NotFound` before touching the lock registry when the user does not exist.
    async fn lock_user(&self, user_id: &str) -> Result<OwnedMutexGuard<()>, AppError> {
        if !repository::user_exists(&self.db, user_id).await? {
            return Err(AppError::NotFound);
        }
        Ok(self.locks.lock(user_id).await)
    }

    async fn find_user(&self, user_id: &str) -> Result<User, AppError> {
        repository::find_user_by_id(&self.db, user_id)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// The user's AI plans, or the default catalog when there are none.
    pub async fn plans(&self, user_id: &str) -> Result<Vec<WorkoutPlan>, AppError> {
        self.find_user(user_id).await?;

        let ai_plans = repository::fetch_ai_plans(&self.db, user_id).await?;
        if !ai_plans.is_empty() {
            return Ok(ai_plans);
        }
        Ok(repository::fetch_default_plans(&self.db).await?)
    }

    pub async fn ai_plans(&self, user_id: &str) -> Result<Vec<WorkoutPlan>, AppError> {
        self.find_user(user_id).await?;
        Ok(repository::fetch_ai_plans(&self.db, user_id).await?)
    }

    /// Replaces the user's AI catalog with a fresh one.
    ///
    /// The current schedule refers to the old catalog and is discarded with it.
    pub async fn generate_ai_plans(&self, user_id: &str) -> Result<Vec<WorkoutPlan>, AppError> {
        let _guard = self.lock_user(user_id).await?;

        let user = self.find_user(user_id).await?;
        let plans = self.planner.generate_plans(&user, &user.available_days).await?;
        if plans.is_empty() {
            return Err(AppError::PlanGenerator(
                "AI plan generation returned no plans".to_string(),
            ));
        }

        let mut tx = self.db.begin().await?;
        let discarded = repository::delete_schedule(&mut *tx, user_id).await?;
        repository::delete_ai_plans(&mut *tx, user_id).await?;
        repository::insert_plans(&mut *tx, Some(user_id), &plans).await?;
        tx.commit().await?;

        info!(
            "Stored {} AI plans for user {} ({} schedule entries discarded)",
            plans.len(),
            user_id,
            discarded
        );
        Ok(plans)
    }

    pub async fn journey(&self, user_id: &str) -> Result<Vec<JourneyStep>, AppError> {
        let catalog = self.plans(user_id).await?;
        let completed: HashSet<String> = repository::completed_plan_ids(&self.db, user_id)
            .await?
            .into_iter()
            .collect();

        Ok(catalog::build_journey(catalog, &completed))
    }

    /// Records a workout done outside the schedule.
    pub async fn complete_workout(
        &self,
        user_id: &str,
        workout_plan_id: &str,
        duration_minutes: u32,
        today: NaiveDate,
    ) -> Result<CompletionResult, AppError> {
        let _guard = self.lock_user(user_id).await?;

        let plan = repository::find_plan_for_user(&self.db, workout_plan_id, user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut tx = self.db.begin().await?;
        let result =
            progress::record_completion(&mut *tx, user_id, &plan, duration_minutes, today).await?;
        tx.commit().await?;

        Ok(result)
    }

    pub async fn progress(&self, user_id: &str) -> Result<Progress, AppError> {
        self.find_user(user_id).await?;
        Ok(repository::fetch_progress(&self.db, user_id)
            .await?
            .unwrap_or_else(|| Progress::new(user_id)))
    }

    pub async fn achievements(&self, user_id: &str) -> Result<AchievementsResponse, AppError> {
        let progress = self.progress(user_id).await?;
        let total_workouts = repository::count_sessions(&self.db, user_id).await?;

        let achievements = ACHIEVEMENTS
            .iter()
            .map(|a| AchievementStatus {
                id: a.id.to_string(),
                name: a.name.to_string(),
                description: a.description.to_string(),
                icon: a.icon.to_string(),
                unlocked: progress.achievements.iter().any(|id| id == a.id),
            })
            .collect();

        Ok(AchievementsResponse {
            achievements,
            total_workouts,
        })
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::db::seed::seed_default_catalog;
    use crate::db::test_support::setup_test_db;
    use crate::llm::NoopPlanGenerator;
    use crate::models::{AvailabilityEntry, NewUserRequest};

    struct FixedGenerator;

    #[async_trait]
    impl PlanGenerator for FixedGenerator {
        async fn generate_plans(
            &self,
            _user: &User,
            _availability: &[AvailabilityEntry],
        ) -> Result<Vec<WorkoutPlan>, AppError> {
            Ok(vec![WorkoutPlan {
                id: uuid::Uuid::new_v4().to_string(),
                name: "Custom Circuit".to_string(),
                difficulty: "Beginner".to_string(),
                exercises: Vec::new(),
                target_muscles: "Full Body".to_string(),
                xp_reward: 80,
                duration_minutes: 20,
            }])
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 15).unwrap()
    }

    async fn new_user(pool: &SqlitePool) -> String {
        repository::insert_user(
            pool,
            NewUserRequest {
                email: "lifter@example.com".to_string(),
                name: "Lifter".to_string(),
                gender: None,
                height: None,
                weight: None,
                goal: None,
                equipment: Vec::new(),
            },
        )
        .await
        .unwrap()
        .id
    }

    #[tokio::test]
    async fn plans_prefer_ai_catalog() {
        let pool = setup_test_db().await;
        seed_default_catalog(&pool).await.unwrap();
        let user_id = new_user(&pool).await;
        let service = WorkoutService::new(pool.clone(), Arc::new(FixedGenerator), UserLocks::new());

        assert_eq!(service.plans(&user_id).await.unwrap().len(), 10);

        service.generate_ai_plans(&user_id).await.unwrap();
        let plans = service.plans(&user_id).await.unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].name, "Custom Circuit");
    }

    #[tokio::test]
    async fn generate_ai_plans_without_generator_fails() {
        let pool = setup_test_db().await;
        let user_id = new_user(&pool).await;
        let service = WorkoutService::new(pool, Arc::new(NoopPlanGenerator), UserLocks::new());

        let result = service.generate_ai_plans(&user_id).await;
        assert!(matches!(result, Err(AppError::PlanGenerator(_))));
    }

    #[tokio::test]
    async fn completing_workouts_advances_journey_and_progress() {
        let pool = setup_test_db().await;
        seed_default_catalog(&pool).await.unwrap();
        let user_id = new_user(&pool).await;
        let service = WorkoutService::new(pool.clone(), Arc::new(NoopPlanGenerator), UserLocks::new());

        let first = service.plans(&user_id).await.unwrap()[0].id.clone();
        let result = service.complete_workout(&user_id, &first, 20, today()).await.unwrap();
        assert_eq!(result.new_total_xp, 50);
        assert_eq!(result.new_level, 1);

        let journey = service.journey(&user_id).await.unwrap();
        assert!(journey[0].is_completed);
        assert!(journey[1].is_next);

        let achievements = service.achievements(&user_id).await.unwrap();
        assert_eq!(achievements.total_workouts, 1);
        assert_eq!(achievements.achievements.len(), 5);
        assert!(achievements.achievements.iter().all(|a| !a.unlocked));
    }

    #[tokio::test]
    async fn completing_unknown_plan_is_not_found() {
        let pool = setup_test_db().await;
        let user_id = new_user(&pool).await;
        let service = WorkoutService::new(pool, Arc::new(NoopPlanGenerator), UserLocks::new());

        let result = service.complete_workout(&user_id, "missing", 20, today()).await;
        assert!(matches!(result, Err(AppError::NotFound)));
    }
}
