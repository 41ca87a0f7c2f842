use chrono::NaiveDate;

use crate::error::{AppError, ScheduleError};
use crate::models::{ScheduleEntry, WorkoutPlan};
use crate::services::scheduler::{self, Availability};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScheduleState {
    NoSchedule,
    Scheduled,
}

/// Where the catalog used for a generation came from.
#[derive(Debug, Clone)]
pub enum ResolvedCatalog {
    /// The user's existing AI catalog, reused as-is.
    StoredAi,
    /// A freshly generated AI catalog that becomes the user's catalog.
    FreshAi(Vec<WorkoutPlan>),
    /// The shared default catalog.
    Default(Vec<WorkoutPlan>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerateOutcome {
    pub discarded_entries: usize,
    pub created_catalog: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResetOutcome {
    pub discarded_entries: usize,
    pub discarded_catalog: bool,
}

/// One user's schedule together with the AI catalog it was built from.
///
/// `generate`, `reset` and `complete_entry` are the only ways to change it.
#[derive(Debug, Clone)]
pub struct UserSchedule {
    user_id: String,
    ai_catalog: Vec<WorkoutPlan>,
    entries: Vec<ScheduleEntry>,
}

impl UserSchedule {
    pub fn new(user_id: &str, ai_catalog: Vec<WorkoutPlan>, entries: Vec<ScheduleEntry>) -> Self {
        Self {
            user_id: user_id.to_string(),
            ai_catalog,
            entries,
        }
    }

    pub fn state(&self) -> ScheduleState {
        if self.entries.is_empty() {
            ScheduleState::NoSchedule
        } else {
            ScheduleState::Scheduled
        }
    }

    pub fn ai_catalog(&self) -> &[WorkoutPlan] {
        &self.ai_catalog
    }

    pub fn has_ai_catalog(&self) -> bool {
        !self.ai_catalog.is_empty()
    }

    pub fn entries(&self) -> &[ScheduleEntry] {
        &self.entries
    }

    /// Replaces every entry with a freshly computed schedule.
    ///
    /// The previous entries are only discarded once the new schedule has been
    /// computed, so a failed generation leaves the aggregate untouched.
    pub fn generate(
        &mut self,
        today: NaiveDate,
        total_weeks: u32,
        availability: &Availability,
        catalog: ResolvedCatalog,
    ) -> Result<GenerateOutcome, ScheduleError> {
        let (plans, created_catalog) = match catalog {
            ResolvedCatalog::StoredAi => (self.ai_catalog.clone(), false),
            ResolvedCatalog::FreshAi(plans) => (plans, true),
            ResolvedCatalog::Default(plans) => (plans, false),
        };

        let entries =
            scheduler::build_schedule(&self.user_id, today, total_weeks, availability, &plans)?;

        if created_catalog {
            self.ai_catalog = plans;
        }
        let discarded_entries = std::mem::replace(&mut self.entries, entries).len();

        Ok(GenerateOutcome {
            discarded_entries,
            created_catalog,
        })
    }

    /// Drops the schedule and the AI catalog so the next generation starts over.
    pub fn reset(&mut self) -> ResetOutcome {
        let discarded_entries = std::mem::take(&mut self.entries).len();
        let discarded_catalog = !std::mem::take(&mut self.ai_catalog).is_empty();

        ResetOutcome {
            discarded_entries,
            discarded_catalog,
        }
    }

    pub fn complete_entry(&mut self, entry_id: &str) -> Result<&ScheduleEntry, AppError> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == entry_id)
            .ok_or(AppError::NotFound)?;

        if entry.is_rest_day {
            return Err(AppError::BadRequest("Cannot complete a rest day".to_string()));
        }
        if entry.is_completed {
            return Err(AppError::Conflict("Workout already completed".to_string()));
        }

        entry.is_completed = true;
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AvailabilityEntry, DayOfWeek};

    fn plan(id: &str) -> WorkoutPlan {
        WorkoutPlan {
            id: id.to_string(),
            name: id.to_string(),
            difficulty: "Beginner".to_string(),
            exercises: Vec::new(),
            target_muscles: "Core".to_string(),
            xp_reward: 50,
            duration_minutes: 20,
        }
    }

    fn mon_wed_fri() -> Availability {
        let entries: Vec<AvailabilityEntry> = [DayOfWeek::Monday, DayOfWeek::Wednesday, DayOfWeek::Friday]
            .into_iter()
            .map(|day| AvailabilityEntry { day, minutes: 30 })
            .collect();
        Availability::from_entries(&entries).unwrap()
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
    }

    #[test]
    fn generate_moves_to_scheduled_and_keeps_fresh_catalog() {
        let mut schedule = UserSchedule::new("u1", Vec::new(), Vec::new());
        assert_eq!(schedule.state(), ScheduleState::NoSchedule);

        let outcome = schedule
            .generate(today(), 4, &mon_wed_fri(), ResolvedCatalog::FreshAi(vec![plan("ai-1")]))
            .unwrap();

        assert_eq!(schedule.state(), ScheduleState::Scheduled);
        assert!(outcome.created_catalog);
        assert_eq!(outcome.discarded_entries, 0);
        assert_eq!(schedule.entries().len(), 12);
        assert_eq!(schedule.ai_catalog()[0].id, "ai-1");
    }

    #[test]
    fn regenerate_reuses_stored_catalog() {
        let mut schedule = UserSchedule::new("u1", vec![plan("ai-1"), plan("ai-2")], Vec::new());

        schedule
            .generate(today(), 2, &mon_wed_fri(), ResolvedCatalog::StoredAi)
            .unwrap();
        let first: Vec<Option<String>> = schedule
            .entries()
            .iter()
            .map(|e| e.workout_plan_id.clone())
            .collect();

        let outcome = schedule
            .generate(today(), 2, &mon_wed_fri(), ResolvedCatalog::StoredAi)
            .unwrap();
        let second: Vec<Option<String>> = schedule
            .entries()
            .iter()
            .map(|e| e.workout_plan_id.clone())
            .collect();

        assert!(!outcome.created_catalog);
        assert_eq!(outcome.discarded_entries, 6);
        assert_eq!(first, second);
        assert_eq!(schedule.ai_catalog().len(), 2);
    }

    #[test]
    fn default_catalog_is_not_adopted_as_ai_catalog() {
        let mut schedule = UserSchedule::new("u1", Vec::new(), Vec::new());

        schedule
            .generate(today(), 1, &mon_wed_fri(), ResolvedCatalog::Default(vec![plan("default-1")]))
            .unwrap();

        assert!(!schedule.has_ai_catalog());
        assert_eq!(schedule.entries()[0].workout_plan_id.as_deref(), Some("default-1"));
    }

    #[test]
    fn failed_generation_keeps_previous_entries() {
        let mut schedule = UserSchedule::new("u1", Vec::new(), Vec::new());
        schedule
            .generate(today(), 1, &mon_wed_fri(), ResolvedCatalog::Default(vec![plan("p")]))
            .unwrap();

        let result = schedule.generate(today(), 1, &mon_wed_fri(), ResolvedCatalog::Default(Vec::new()));

        assert_eq!(result, Err(ScheduleError::CatalogUnavailable));
        assert_eq!(schedule.entries().len(), 3);
    }

    #[test]
    fn reset_discards_entries_and_catalog() {
        let mut schedule = UserSchedule::new("u1", Vec::new(), Vec::new());
        schedule
            .generate(today(), 1, &mon_wed_fri(), ResolvedCatalog::FreshAi(vec![plan("ai")]))
            .unwrap();

        let outcome = schedule.reset();

        assert_eq!(outcome.discarded_entries, 3);
        assert!(outcome.discarded_catalog);
        assert_eq!(schedule.state(), ScheduleState::NoSchedule);
        assert!(!schedule.has_ai_catalog());
    }

    #[test]
    fn complete_entry_marks_workout_once() {
        let mut schedule = UserSchedule::new("u1", Vec::new(), Vec::new());
        schedule
            .generate(today(), 1, &mon_wed_fri(), ResolvedCatalog::Default(vec![plan("p")]))
            .unwrap();
        let id = schedule.entries()[0].id.clone();

        let entry = schedule.complete_entry(&id).unwrap();
        assert!(entry.is_completed);

        assert!(matches!(schedule.complete_entry(&id), Err(AppError::Conflict(_))));
        assert!(matches!(schedule.complete_entry("missing"), Err(AppError::NotFound)));
    }

    #[test]
    fn rest_day_cannot_be_completed() {
        let rest = ScheduleEntry::rest("u1", today(), DayOfWeek::Saturday);
        let id = rest.id.clone();
        let mut schedule = UserSchedule::new("u1", Vec::new(), vec![rest]);

        assert!(matches!(schedule.complete_entry(&id), Err(AppError::BadRequest(_))));
        assert!(!schedule.entries()[0].is_completed);
    }
}
