use std::collections::HashSet;

use crate::models::{ExperienceLevel, JourneyStep, WorkoutPlan};

/// Default-catalog plans suitable for `level`: its own difficulty plus Beginner.
///
/// Falls back to the whole catalog when nothing matches.
pub fn filter_by_experience(plans: Vec<WorkoutPlan>, level: ExperienceLevel) -> Vec<WorkoutPlan> {
    let wanted = level.difficulty();
    let suitable: Vec<WorkoutPlan> = plans
        .iter()
        .filter(|p| p.difficulty.eq_ignore_ascii_case(wanted) || p.difficulty.eq_ignore_ascii_case("Beginner"))
        .cloned()
        .collect();

    if suitable.is_empty() { plans } else { suitable }
}

/// Annotates the catalog, in order, with the user's progress through it.
pub fn build_journey(catalog: Vec<WorkoutPlan>, completed: &HashSet<String>) -> Vec<JourneyStep> {
    let mut previous_completed = true;

    catalog
        .into_iter()
        .enumerate()
        .map(|(position, plan)| {
            let is_completed = completed.contains(&plan.id);
            let is_next = !is_completed && previous_completed;
            previous_completed = is_completed;

            JourneyStep {
                plan,
                is_completed,
                is_next,
                position,
            }
        })
        .collect()
}
