use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::{FromRow, Row};

use crate::error::ScheduleError;

/// Day of the week as exchanged over the API ("Monday".."Sunday").
///
/// Variant order is the Monday-first ordinal order used by the scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl DayOfWeek {
    pub const ALL: [DayOfWeek; 7] = [
        DayOfWeek::Monday,
        DayOfWeek::Tuesday,
        DayOfWeek::Wednesday,
        DayOfWeek::Thursday,
        DayOfWeek::Friday,
        DayOfWeek::Saturday,
        DayOfWeek::Sunday,
    ];

    /// Monday = 0 .. Sunday = 6
    pub fn ordinal(self) -> u32 {
        self as u32
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DayOfWeek::Monday => "Monday",
            DayOfWeek::Tuesday => "Tuesday",
            DayOfWeek::Wednesday => "Wednesday",
            DayOfWeek::Thursday => "Thursday",
            DayOfWeek::Friday => "Friday",
            DayOfWeek::Saturday => "Saturday",
            DayOfWeek::Sunday => "Sunday",
        }
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        DayOfWeek::ALL[day.num_days_from_monday() as usize]
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unrecognized value: {0}")]
pub struct ParseValueError(String);

impl FromStr for DayOfWeek {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DayOfWeek::ALL
            .into_iter()
            .find(|day| day.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseValueError(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityEntry {
    pub day: DayOfWeek,
    pub minutes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExperienceLevel {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

impl ExperienceLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "beginner",
            ExperienceLevel::Intermediate => "intermediate",
            ExperienceLevel::Advanced => "advanced",
        }
    }

    /// Catalog difficulty label matching this level
    pub fn difficulty(self) -> &'static str {
        match self {
            ExperienceLevel::Beginner => "Beginner",
            ExperienceLevel::Intermediate => "Intermediate",
            ExperienceLevel::Advanced => "Advanced",
        }
    }
}

impl FromStr for ExperienceLevel {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "beginner" => Ok(ExperienceLevel::Beginner),
            "intermediate" => Ok(ExperienceLevel::Intermediate),
            "advanced" => Ok(ExperienceLevel::Advanced),
            _ => Err(ParseValueError(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DurationUnit {
    #[default]
    Weeks,
    Months,
    Years,
}

impl DurationUnit {
    pub fn as_str(self) -> &'static str {
        match self {
            DurationUnit::Weeks => "weeks",
            DurationUnit::Months => "months",
            DurationUnit::Years => "years",
        }
    }
}

impl FromStr for DurationUnit {
    type Err = ParseValueError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "weeks" | "week" => Ok(DurationUnit::Weeks),
            "months" | "month" => Ok(DurationUnit::Months),
            "years" | "year" => Ok(DurationUnit::Years),
            _ => Err(ParseValueError(s.to_string())),
        }
    }
}

pub const MAX_PLAN_WEEKS: u32 = 156;
pub const DEFAULT_PLAN_WEEKS: u32 = 4;

/// Requested horizon of a schedule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanDuration {
    pub amount: u32,
    pub unit: DurationUnit,
}

impl Default for PlanDuration {
    fn default() -> Self {
        Self {
            amount: DEFAULT_PLAN_WEEKS,
            unit: DurationUnit::Weeks,
        }
    }
}

impl PlanDuration {
    /// Week count covered by this duration, capped at three years.
    pub fn total_weeks(&self) -> Result<u32, ScheduleError> {
        if self.amount == 0 {
            return Err(ScheduleError::PreconditionViolation(
                "plan duration must be a positive amount".to_string(),
            ));
        }

        let weeks = match self.unit {
            DurationUnit::Weeks => self.amount,
            DurationUnit::Months => self.amount.saturating_mul(4),
            DurationUnit::Years => self.amount.saturating_mul(52),
        };

        Ok(weeks.min(MAX_PLAN_WEEKS))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub goal: Option<String>,
    pub equipment: Vec<String>,
    pub experience_level: Option<ExperienceLevel>,
    pub available_days: Vec<AvailabilityEntry>,
    pub plan_duration: u32,
    pub plan_duration_unit: DurationUnit,
    pub created_at: String,
}

impl User {
    pub fn plan_duration(&self) -> PlanDuration {
        PlanDuration {
            amount: self.plan_duration,
            unit: self.plan_duration_unit,
        }
    }

    pub fn experience(&self) -> ExperienceLevel {
        self.experience_level.unwrap_or_default()
    }
}

// available_days lives in its own table and is filled in by the repository
impl FromRow<'_, SqliteRow> for User {
    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error> {
        let equipment: String = row.try_get("equipment")?;
        let experience_level: Option<String> = row.try_get("experience_level")?;
        let unit: String = row.try_get("plan_duration_unit")?;

        Ok(Self {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            name: row.try_get("name")?,
            gender: row.try_get("gender")?,
            height: row.try_get("height")?,
            weight: row.try_get("weight")?,
            goal: row.try_get("goal")?,
            equipment: serde_json::from_str(&equipment)
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            experience_level: experience_level
                .map(|level| level.parse::<ExperienceLevel>())
                .transpose()
                .map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            available_days: Vec::new(),
            plan_duration: row.try_get("plan_duration")?,
            plan_duration_unit: unit.parse::<DurationUnit>().map_err(|e| sqlx::Error::Decode(Box::new(e)))?,
            created_at: row.try_get("created_at")?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewUserRequest {
    pub email: String,
    pub name: String,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub goal: Option<String>,
    #[serde(default)]
    pub equipment: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub goal: Option<String>,
    pub equipment: Option<Vec<String>>,
    pub experience_level: Option<ExperienceLevel>,
    pub available_days: Option<Vec<AvailabilityEntry>>,
    pub plan_duration: Option<u32>,
    pub plan_duration_unit: Option<DurationUnit>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_of_week_ordinals_are_monday_first() {
        assert_eq!(DayOfWeek::Monday.ordinal(), 0);
        assert_eq!(DayOfWeek::Sunday.ordinal(), 6);
        assert_eq!(DayOfWeek::from(Weekday::Wed), DayOfWeek::Wednesday);
        assert_eq!("friday".parse::<DayOfWeek>().unwrap(), DayOfWeek::Friday);
        assert!("Funday".parse::<DayOfWeek>().is_err());
    }

    #[test]
    fn day_of_week_uses_full_english_names_on_the_wire() {
        let json = serde_json::to_string(&DayOfWeek::Thursday).unwrap();
        assert_eq!(json, "\"Thursday\"");

        let entry: AvailabilityEntry =
            serde_json::from_str(r#"{"day":"Monday","minutes":45}"#).unwrap();
        assert_eq!(entry.day, DayOfWeek::Monday);
        assert_eq!(entry.minutes, 45);
    }

    #[test]
    fn plan_duration_normalizes_to_weeks() {
        let weeks = |amount, unit| PlanDuration { amount, unit }.total_weeks().unwrap();

        assert_eq!(weeks(3, DurationUnit::Weeks), 3);
        assert_eq!(weeks(2, DurationUnit::Months), 8);
        assert_eq!(weeks(1, DurationUnit::Years), 52);
        assert_eq!(PlanDuration::default().total_weeks().unwrap(), 4);
    }

    #[test]
    fn plan_duration_is_clamped_to_three_years() {
        let duration = PlanDuration {
            amount: 200,
            unit: DurationUnit::Weeks,
        };
        assert_eq!(duration.total_weeks().unwrap(), MAX_PLAN_WEEKS);

        let duration = PlanDuration {
            amount: 10,
            unit: DurationUnit::Years,
        };
        assert_eq!(duration.total_weeks().unwrap(), 156);
    }

    #[test]
    fn zero_plan_duration_is_rejected() {
        let duration = PlanDuration {
            amount: 0,
            unit: DurationUnit::Months,
        };
        assert!(matches!(
            duration.total_weeks(),
            Err(ScheduleError::PreconditionViolation(_))
        ));
    }
}
