use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDate;
use sqlx::SqlitePool;
use tokio::sync::OwnedMutexGuard;
use tracing::{debug, info, warn};

use crate::db::repository;
use crate::error::{AppError, ScheduleError};
use crate::llm::PlanGenerator;
use crate::models::{
    CalendarEntry, CompletionResult, GenerateScheduleResponse, ResetScheduleResponse, User,
    WorkoutDetails, WorkoutPlan,
};
use crate::services::catalog;
use crate::services::progress;
use crate::services::schedule_state::{ResolvedCatalog, UserSchedule};
use crate::services::scheduler::Availability;
use crate::state::UserLocks;

pub struct ScheduleService {
    db: SqlitePool,
    planner: Arc<dyn PlanGenerator>,
    locks: UserLocks,
}

impl ScheduleService {
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

    async fn load_schedule(&self, user_id: &str) -> Result<UserSchedule, AppError> {
        let ai_catalog = repository::fetch_ai_plans(&self.db, user_id).await?;
        let entries = repository::fetch_schedule(&self.db, user_id).await?;
        Ok(UserSchedule::new(user_id, ai_catalog, entries))
    }

    /// Picks the catalog for a generation: stored AI plans, then fresh AI plans,
    /// then the default catalog filtered by experience level.
    async fn resolve_catalog(
        &self,
        user: &User,
        schedule: &UserSchedule,
    ) -> Result<ResolvedCatalog, AppError> {
        if schedule.has_ai_catalog() {
            debug!("Reusing {} stored AI plans for user {}", schedule.ai_catalog().len(), user.id);
            return Ok(ResolvedCatalog::StoredAi);
        }

        match self.planner.generate_plans(user, &user.available_days).await {
            Ok(plans) if !plans.is_empty() => return Ok(ResolvedCatalog::FreshAi(plans)),
            Ok(_) => debug!("No AI plans available for user {}", user.id),
            Err(e) => warn!("AI plan generation failed for user {}, using defaults: {}", user.id, e),
        }

        let defaults = repository::fetch_default_plans(&self.db).await?;
        if defaults.is_empty() {
            return Err(ScheduleError::CatalogUnavailable.into());
        }
        Ok(ResolvedCatalog::Default(catalog::filter_by_experience(
            defaults,
            user.experience(),
        )))
    }

    pub async fn generate(
        &self,
        user_id: &str,
        today: NaiveDate,
    ) -> Result<GenerateScheduleResponse, AppError> {
        let _guard = self.lock_user(user_id).await?;

        let user = self.find_user(user_id).await?;
        let availability = Availability::from_entries(&user.available_days)?;
        let total_weeks = user.plan_duration().total_weeks()?;

        let mut schedule = self.load_schedule(user_id).await?;
        debug!("Generating schedule for user {} from state {:?}", user_id, schedule.state());
        let catalog = self.resolve_catalog(&user, &schedule).await?;
        let outcome = schedule.generate(today, total_weeks, &availability, catalog)?;

        let mut tx = self.db.begin().await?;
        repository::delete_schedule(&mut *tx, user_id).await?;
        if outcome.created_catalog {
            repository::delete_ai_plans(&mut *tx, user_id).await?;
            repository::insert_plans(&mut *tx, Some(user_id), schedule.ai_catalog()).await?;
        }
        repository::insert_schedule_entries(&mut *tx, schedule.entries()).await?;
        tx.commit().await?;

        let scheduled_count = schedule.entries().len();
        info!(
            "Generated {} entries over {} weeks for user {} (replaced {}, new AI catalog: {})",
            scheduled_count, total_weeks, user_id, outcome.discarded_entries, outcome.created_catalog
        );

        Ok(GenerateScheduleResponse {
            success: true,
            scheduled_count,
            total_weeks,
            message: format!(
                "Workout schedule generated successfully for {} weeks",
                total_weeks
            ),
        })
    }

    pub async fn reset(&self, user_id: &str) -> Result<ResetScheduleResponse, AppError> {
        let _guard = self.lock_user(user_id).await?;

        let mut schedule = self.load_schedule(user_id).await?;
        let outcome = schedule.reset();

        let mut tx = self.db.begin().await?;
        let deleted_count = repository::delete_schedule(&mut *tx, user_id).await?;
        if outcome.discarded_catalog {
            repository::delete_ai_plans(&mut *tx, user_id).await?;
        }
        tx.commit().await?;

        info!(
            "Reset schedule for user {}: {} entries removed, AI catalog removed: {}",
            user_id, deleted_count, outcome.discarded_catalog
        );

        Ok(ResetScheduleResponse {
            success: true,
            deleted_count,
            message: "Schedule reset successfully".to_string(),
        })
    }

    /// Entries ordered by date, each with the details of its workout.
    pub async fn calendar(&self, user_id: &str) -> Result<Vec<CalendarEntry>, AppError> {
        self.find_user(user_id).await?;
        let entries = repository::fetch_schedule(&self.db, user_id).await?;

        let mut plans: HashMap<String, Option<WorkoutPlan>> = HashMap::new();
        let mut calendar = Vec::with_capacity(entries.len());

        for entry in entries {
            let workout_details = match &entry.workout_plan_id {
                None => Some(WorkoutDetails::rest_day()),
                Some(plan_id) => {
                    if !plans.contains_key(plan_id) {
                        let plan =
                            repository::find_plan_for_user(&self.db, plan_id, user_id).await?;
                        plans.insert(plan_id.clone(), plan);
                    }
                    plans
                        .get(plan_id)
                        .and_then(|plan| plan.as_ref())
                        .map(WorkoutDetails::from)
                }
            };
            calendar.push(CalendarEntry {
                entry,
                workout_details,
            });
        }

        Ok(calendar)
    }

    pub async fn complete_entry(
        &self,
        user_id: &str,
        entry_id: &str,
        duration_minutes: u32,
        today: NaiveDate,
    ) -> Result<CompletionResult, AppError> {
        let _guard = self.lock_user(user_id).await?;

        let mut schedule = self.load_schedule(user_id).await?;
        let entry = schedule.complete_entry(entry_id)?;

        let plan_id = entry.workout_plan_id.clone().ok_or(AppError::NotFound)?;
        let plan = repository::find_plan_for_user(&self.db, &plan_id, user_id)
            .await?
            .ok_or(AppError::NotFound)?;

        let mut tx = self.db.begin().await?;
        if !repository::mark_entry_completed(&mut *tx, entry_id).await? {
            return Err(AppError::NotFound);
        }
        let result =
            progress::record_completion(&mut *tx, user_id, &plan, duration_minutes, today).await?;
        tx.commit().await?;

        Ok(result)
    }
}
