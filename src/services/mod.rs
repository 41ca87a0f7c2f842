pub mod catalog;
pub mod progress;
pub mod schedule_service;
pub mod schedule_state;
pub mod scheduler;
pub mod workout_service;

pub use schedule_service::ScheduleService;
pub use workout_service::WorkoutService;
