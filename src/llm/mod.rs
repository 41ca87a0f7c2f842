pub mod dto;

use std::env;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{AvailabilityEntry, User, WorkoutPlan};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_TIMEOUT_SECS: u64 = 30;

#[derive(Clone, Debug)]
pub struct GeminiConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Returns `None` when `GEMINI_API_KEY` is unset or empty.
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("GEMINI_API_KEY").ok().filter(|k| !k.trim().is_empty())?;
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string());
        let base_url =
            env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_GEMINI_BASE_URL.to_string());
        let timeout_secs = env::var("GEMINI_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_GEMINI_TIMEOUT_SECS);

        Some(Self {
            api_key,
            model,
            base_url,
            timeout: Duration::from_secs(timeout_secs),
        })
    }
}

#[async_trait]
pub trait PlanGenerator: Send + Sync {
    async fn generate_plans(
        &self,
        user: &User,
        availability: &[AvailabilityEntry],
    ) -> Result<Vec<WorkoutPlan>, AppError>;
}

pub struct GeminiPlanGenerator {
    client: Client,
    config: GeminiConfig,
}

impl GeminiPlanGenerator {
    pub fn new(config: GeminiConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::PlanGenerator(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.config.base_url.trim_end_matches('/'),
            self.config.model
        )
    }

    async fn generate_content(&self, prompt: String) -> Result<String, AppError> {
        let request_body = dto::GenerateContentRequest {
            contents: vec![dto::Content {
                parts: vec![dto::Part { text: prompt }],
            }],
            generation_config: dto::GenerationConfig {
                response_mime_type: "application/json".to_string(),
                temperature: 0.7,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.config.api_key)
            .json(&request_body)
            .send()
            .await
            .map_err(request_error)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::PlanGenerator(format!(
                "Gemini API error {}: {}",
                status, body
            )));
        }

        let parsed: dto::GenerateContentResponse =
            response.json().await.map_err(request_error)?;

        parsed
            .first_text()
            .map(str::to_string)
            .ok_or_else(|| AppError::PlanGenerator("Gemini returned no candidates".to_string()))
    }
}

#[async_trait]
impl PlanGenerator for GeminiPlanGenerator {
    async fn generate_plans(
        &self,
        user: &User,
        availability: &[AvailabilityEntry],
    ) -> Result<Vec<WorkoutPlan>, AppError> {
        let text = self.generate_content(build_prompt(user, availability)).await?;
        let plans = parse_plans(&text)?;
        tracing::info!("Gemini generated {} plans for user {}", plans.len(), user.id);
        Ok(plans)
    }
}

fn request_error(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        AppError::PlanGenerator(format!("Gemini request timed out: {}", e))
    } else if e.is_decode() {
        AppError::PlanGenerator(format!("Failed to parse Gemini response: {}", e))
    } else {
        AppError::PlanGenerator(format!("Gemini request failed: {}", e))
    }
}

pub struct NoopPlanGenerator;

#[async_trait]
impl PlanGenerator for NoopPlanGenerator {
    async fn generate_plans(
        &self,
        _user: &User,
        _availability: &[AvailabilityEntry],
    ) -> Result<Vec<WorkoutPlan>, AppError> {
        Ok(Vec::new())
    }
}

fn build_prompt(user: &User, availability: &[AvailabilityEntry]) -> String {
    let days = availability
        .iter()
        .map(|a| format!("{} ({} min)", a.day, a.minutes))
        .collect::<Vec<_>>()
        .join(", ");
    let equipment = if user.equipment.is_empty() {
        "none".to_string()
    } else {
        user.equipment.join(", ")
    };
    let longest = availability.iter().map(|a| a.minutes).max().unwrap_or(30);

    format!(
        "Create 8 home workout plans for a fitness app user.\n\
         Goal: {goal}\n\
         Experience level: {level}\n\
         Available equipment: {equipment}\n\
         Available days: {days}\n\
         Gender: {gender}, height: {height}, weight: {weight}\n\n\
         Order the plans from easiest to hardest. Each plan must fit in {longest} minutes.\n\
         Respond with a JSON array only. Each element has the fields \
         name, difficulty (Beginner, Intermediate or Advanced), target_muscles, \
         xp_reward (integer), duration_minutes (integer) and exercises, \
         an array of objects with name, reps, sets, rest_seconds and icon.",
        goal = user.goal.as_deref().unwrap_or("general fitness"),
        level = user.experience().difficulty(),
        equipment = equipment,
        days = days,
        gender = user.gender.as_deref().unwrap_or("unspecified"),
        height = user.height.map(|h| h.to_string()).unwrap_or_else(|| "unspecified".to_string()),
        weight = user.weight.map(|w| w.to_string()).unwrap_or_else(|| "unspecified".to_string()),
        longest = longest,
    )
}

fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string, e.g. ```json
    let rest = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    rest.trim_end().strip_suffix("```").unwrap_or(rest).trim()
}

/// Parses the model output into plans with fresh ids.
///
/// Elements that do not describe a plan, or that have no duration, are skipped.
pub fn parse_plans(text: &str) -> Result<Vec<WorkoutPlan>, AppError> {
    let values: Vec<serde_json::Value> = serde_json::from_str(strip_code_fences(text))
        .map_err(|e| AppError::PlanGenerator(format!("Generated plans are not a JSON array: {}", e)))?;

    let mut plans = Vec::new();
    for value in values {
        match serde_json::from_value::<dto::GeneratedPlan>(value) {
            Ok(plan) if plan.duration_minutes > 0 => plans.push(WorkoutPlan {
                id: Uuid::new_v4().to_string(),
                name: plan.name,
                difficulty: plan.difficulty,
                exercises: plan.exercises,
                target_muscles: plan.target_muscles,
                xp_reward: plan.xp_reward,
                duration_minutes: plan.duration_minutes,
            }),
            Ok(plan) => tracing::warn!("Dropping generated plan {} without duration", plan.name),
            Err(e) => tracing::warn!("Failed to parse generated plan: {}", e),
        }
    }

    Ok(plans)
}
