//! Workout calendar generation.
//!
//! Everything here is pure and synchronous: given the availability, a horizon
//! and an ordered plan catalog, it lays out rest and workout days starting from
//! the Monday of the current week.

use std::collections::BTreeMap;

use chrono::{Datelike, Days, NaiveDate};

use crate::error::ScheduleError;
use crate::models::user::MAX_PLAN_WEEKS;
use crate::models::{AvailabilityEntry, DayOfWeek, ScheduleEntry, WorkoutPlan};

/// Per-weekday minute budgets of a user, in weekday order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Availability {
    budgets: BTreeMap<DayOfWeek, u32>,
}

impl Availability {
    pub fn from_entries(entries: &[AvailabilityEntry]) -> Result<Self, ScheduleError> {
        if entries.is_empty() {
            return Err(ScheduleError::no_availability());
        }

        let mut budgets = BTreeMap::new();
        for entry in entries {
            if entry.minutes == 0 {
                return Err(ScheduleError::PreconditionViolation(format!(
                    "{} must have a positive number of minutes",
                    entry.day
                )));
            }
            if budgets.insert(entry.day, entry.minutes).is_some() {
                return Err(ScheduleError::PreconditionViolation(format!(
                    "{} is listed more than once",
                    entry.day
                )));
            }
        }

        Ok(Self { budgets })
    }

    pub fn budget(&self, day: DayOfWeek) -> Option<u32> {
        self.budgets.get(&day).copied()
    }

    pub fn days(&self) -> impl Iterator<Item = DayOfWeek> + '_ {
        self.budgets.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.budgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.budgets.is_empty()
    }
}

/// Longest stretch of calendar-adjacent available days within one Monday..Sunday week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub has_consecutive: bool,
    pub max_run: u32,
}

/// Sunday does not wrap around to Monday.
pub fn classify_runs(days: impl IntoIterator<Item = DayOfWeek>) -> RunSummary {
    let mut ordinals: Vec<u32> = days.into_iter().map(DayOfWeek::ordinal).collect();
    ordinals.sort_unstable();
    ordinals.dedup();

    let mut has_consecutive = false;
    let mut max_run = 1;
    let mut current = 1;

    for pair in ordinals.windows(2) {
        if pair[1] == pair[0] + 1 {
            current += 1;
            has_consecutive = true;
            max_run = max_run.max(current);
        } else {
            current = 1;
        }
    }

    RunSummary {
        has_consecutive,
        max_run,
    }
}

/// When to force a rest day among consecutive workouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestPolicy {
    pub enabled: bool,
    pub period: u32,
}

impl RestPolicy {
    // A single period derived from the longest run applies to every run of the week.
    pub fn from_runs(runs: RunSummary) -> Self {
        Self {
            enabled: runs.has_consecutive && runs.max_run >= 2,
            period: if runs.max_run >= 2 { runs.max_run } else { 2 },
        }
    }

    pub fn is_rest_due(&self, consecutive_workouts: u32) -> bool {
        self.enabled && consecutive_workouts > 0 && consecutive_workouts % self.period == 0
    }
}

/// Monday on or before `today`.
pub fn week_start(today: NaiveDate) -> NaiveDate {
    let offset = today.weekday().num_days_from_monday();
    today - Days::new(u64::from(offset))
}

/// Walks `total_weeks * 7` days from `start` and emits one entry per available day.
pub fn walk_calendar(
    user_id: &str,
    start: NaiveDate,
    total_weeks: u32,
    availability: &Availability,
    policy: RestPolicy,
    catalog: &[WorkoutPlan],
) -> Result<Vec<ScheduleEntry>, ScheduleError> {
    if availability.is_empty() {
        return Err(ScheduleError::no_availability());
    }
    if catalog.is_empty() {
        return Err(ScheduleError::CatalogUnavailable);
    }
    if total_weeks == 0 {
        return Err(ScheduleError::PreconditionViolation(
            "schedule must cover at least one week".to_string(),
        ));
    }
    if policy.period == 0 {
        return Err(ScheduleError::PreconditionViolation(
            "rest period must be positive".to_string(),
        ));
    }

    let weeks = total_weeks.min(MAX_PLAN_WEEKS);
    let total_days = u64::from(weeks) * 7;
    let mut entries = Vec::with_capacity(weeks as usize * availability.len());
    let mut round_robin = 0usize;
    let mut consecutive = 0u32;

    for offset in 0..total_days {
        let date = start + Days::new(offset);
        let day = DayOfWeek::from(date.weekday());

        let Some(budget) = availability.budget(day) else {
            consecutive = 0;
            continue;
        };

        if policy.is_rest_due(consecutive) {
            entries.push(ScheduleEntry::rest(user_id, date, day));
            consecutive = 0;
            continue;
        }

        let plan = pick_plan(catalog, budget, round_robin);
        entries.push(ScheduleEntry::workout(user_id, date, day, &plan.id));
        round_robin += 1;
        consecutive += 1;
    }

    Ok(entries)
}

// Round-robin over plans fitting the budget; the whole catalog if none fits.
fn pick_plan(catalog: &[WorkoutPlan], budget: u32, round_robin: usize) -> &WorkoutPlan {
    let fitting: Vec<&WorkoutPlan> = catalog
        .iter()
        .filter(|plan| plan.duration_minutes <= budget)
        .collect();

    if fitting.is_empty() {
        &catalog[round_robin % catalog.len()]
    } else {
        fitting[round_robin % fitting.len()]
    }
}

/// Full schedule for a user, anchored to the Monday of `today`'s week.
pub fn build_schedule(
    user_id: &str,
    today: NaiveDate,
    total_weeks: u32,
    availability: &Availability,
    catalog: &[WorkoutPlan],
) -> Result<Vec<ScheduleEntry>, ScheduleError> {
    let policy = RestPolicy::from_runs(classify_runs(availability.days()));

    walk_calendar(
        user_id,
        week_start(today),
        total_weeks,
        availability,
        policy,
        catalog,
    )
}
