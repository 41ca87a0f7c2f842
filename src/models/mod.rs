pub mod plan;
pub mod progress;
pub mod schedule;
pub mod user;

pub use plan::{CompleteWorkoutRequest, Exercise, GeneratedPlansResponse, JourneyStep, WorkoutPlan};
pub use progress::{
    ACHIEVEMENTS, Achievement, AchievementStatus, AchievementsResponse, CompletionResult, Progress,
    WorkoutSession,
};
pub use schedule::{
    CalendarEntry, CompleteEntryRequest, GenerateScheduleResponse, ResetScheduleResponse,
    ScheduleEntry, WorkoutDetails,
};
pub use user::{
    AvailabilityEntry, DayOfWeek, DurationUnit, ExperienceLevel, NewUserRequest, PlanDuration,
    UpdateProfileRequest, User,
};
