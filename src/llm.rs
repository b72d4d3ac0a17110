//! LLM integration for workout plan generation
//!
//! This module handles communication with the Gemini API for generating
//! training plans. Model output is untrusted: it is extracted, parsed and
//! validated before anything is stored.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::config::GeminiConfig;
use crate::models::workout::text_or_number;
use crate::models::NewExercise;

/// ---------------------------------------------------------------------------
/// Error Types
/// ---------------------------------------------------------------------------

#[derive(Error, Debug, Serialize)]
pub enum LlmError {
  #[error("API key not configured")]
  MissingApiKey,

  #[error("Request failed: {0}")]
  Request(String),

  #[error("API error: {0}")]
  Api(String),

  #[error("Invalid request: {0}")]
  InvalidRequest(String),

  #[error("Invalid response: {0}")]
  InvalidResponse(String),

  #[error("Parse error: {0}")]
  Parse(String),
}

/// ---------------------------------------------------------------------------
/// Gemini API Types
/// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
  system_instruction: Content,
  contents: Vec<Content>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
  #[serde(skip_serializing_if = "Option::is_none")]
  role: Option<String>,
  #[serde(default)]
  parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
  #[serde(default)]
  text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateResponse {
  #[serde(default)]
  candidates: Vec<Candidate>,
  usage_metadata: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
  content: Option<Content>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Usage {
  #[serde(default)]
  pub prompt_token_count: u32,
  #[serde(default)]
  pub candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorResponse {
  error: GeminiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetail {
  message: String,
}

/// ---------------------------------------------------------------------------
/// Plan Request
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Objective {
  Hypertrophy,
  Strength,
  Endurance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperienceLevel {
  Beginner,
  Intermediate,
  Advanced,
}

impl fmt::Display for Objective {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      Objective::Hypertrophy => "hypertrophy",
      Objective::Strength => "strength",
      Objective::Endurance => "endurance",
    };
    write!(f, "{}", s)
  }
}

impl fmt::Display for ExperienceLevel {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      ExperienceLevel::Beginner => "beginner",
      ExperienceLevel::Intermediate => "intermediate",
      ExperienceLevel::Advanced => "advanced",
    };
    write!(f, "{}", s)
  }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanRequest {
  pub objective: Objective,
  pub level: ExperienceLevel,
  pub days_per_week: u8,
}

impl Default for PlanRequest {
  fn default() -> Self {
    Self {
      objective: Objective::Hypertrophy,
      level: ExperienceLevel::Intermediate,
      days_per_week: 4,
    }
  }
}

impl PlanRequest {
  pub fn validate(&self) -> Result<(), LlmError> {
    if !(1..=7).contains(&self.days_per_week) {
      return Err(LlmError::InvalidRequest(format!(
        "days per week must be between 1 and 7, got {}",
        self.days_per_week
      )));
    }
    Ok(())
  }

  /// User message sent alongside the planner system prompt
  pub fn to_prompt(&self) -> String {
    format!(
      r#"Create a weight-training program for this athlete:
- Objective: {objective}
- Experience level: {level}
- Training days per week: {days}

Split the program into {days} workouts, one per training day.
Use "{days}-Day {objective} Plan" style naming for planName.

Respond with valid JSON matching the OUTPUT FORMAT specified in your instructions."#,
      objective = self.objective,
      level = self.level,
      days = self.days_per_week,
    )
  }
}

/// ---------------------------------------------------------------------------
/// Generated Plan (from Gemini)
/// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedPlan {
  pub plan_name: String,
  pub routines: Vec<PlanRoutine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanRoutine {
  pub name: String,
  pub description: String,
  pub exercises: Vec<PlanExercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanExercise {
  pub name: String,
  pub sets: i64,
  #[serde(deserialize_with = "text_or_number")]
  pub reps: String,
}

impl From<&PlanExercise> for NewExercise {
  fn from(exercise: &PlanExercise) -> Self {
    Self {
      name: exercise.name.clone(),
      sets: exercise.sets,
      reps: exercise.reps.clone(),
    }
  }
}

impl GeneratedPlan {
  /// Reject plans that parsed but cannot be saved as routines
  pub fn validate(&self) -> Result<(), LlmError> {
    if self.routines.is_empty() {
      return Err(LlmError::InvalidResponse("plan has no routines".into()));
    }
    for routine in &self.routines {
      if routine.name.trim().is_empty() {
        return Err(LlmError::InvalidResponse("routine without a name".into()));
      }
      if routine.exercises.is_empty() {
        return Err(LlmError::InvalidResponse(format!(
          "routine '{}' has no exercises",
          routine.name
        )));
      }
      for exercise in &routine.exercises {
        if exercise.name.trim().is_empty() || exercise.sets < 1 || exercise.reps.trim().is_empty() {
          return Err(LlmError::InvalidResponse(format!(
            "routine '{}' has an invalid exercise: {:?}",
            routine.name, exercise
          )));
        }
      }
    }
    Ok(())
  }
}

/// Parse raw model text into a validated plan
pub fn parse_plan(text: &str) -> Result<GeneratedPlan, LlmError> {
  let json_str = extract_json(text)?;

  let plan: GeneratedPlan =
    serde_json::from_str(&json_str).map_err(|e| LlmError::Parse(format!("{}: {}", e, json_str)))?;

  plan.validate()?;
  Ok(plan)
}

/// ---------------------------------------------------------------------------
/// Gemini Client
/// ---------------------------------------------------------------------------

pub struct GeminiClient {
  client: Client,
  api_key: String,
  endpoint: String,
}

impl GeminiClient {
  pub fn from_config(config: &GeminiConfig) -> Result<Self, LlmError> {
    let api_key = config.api_key.clone().ok_or(LlmError::MissingApiKey)?;
    let endpoint = format!(
      "{}/models/{}:generateContent",
      config.api_base.as_str().trim_end_matches('/'),
      config.model
    );

    Ok(Self {
      client: Client::new(),
      api_key,
      endpoint,
    })
  }

  /// Call Gemini with a system prompt and user message
  pub async fn complete(&self, system_prompt: &str, user_message: &str) -> Result<(String, Usage), LlmError> {
    let request = GenerateRequest {
      system_instruction: Content {
        role: None,
        parts: vec![Part {
          text: Some(system_prompt.to_string()),
        }],
      },
      contents: vec![Content {
        role: Some("user".to_string()),
        parts: vec![Part {
          text: Some(user_message.to_string()),
        }],
      }],
    };

    let response = self
      .client
      .post(&self.endpoint)
      .header("x-goog-api-key", &self.api_key)
      .json(&request)
      .send()
      .await
      .map_err(|e| LlmError::Request(e.to_string()))?;

    let status = response.status();
    let body = response
      .text()
      .await
      .map_err(|e| LlmError::Request(e.to_string()))?;

    if !status.is_success() {
      if let Ok(error_resp) = serde_json::from_str::<GeminiErrorResponse>(&body) {
        return Err(LlmError::Api(error_resp.error.message));
      }
      return Err(LlmError::Api(format!("HTTP {}: {}", status, body)));
    }

    let generated: GenerateResponse =
      serde_json::from_str(&body).map_err(|e| LlmError::Parse(e.to_string()))?;

    let text = generated
      .candidates
      .into_iter()
      .next()
      .and_then(|c| c.content)
      .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
      .ok_or_else(|| LlmError::InvalidResponse("No text content in response".to_string()))?;

    Ok((text, generated.usage_metadata.unwrap_or_default()))
  }

  /// Generate a training plan for the given athlete profile
  pub async fn generate_plan(&self, request: &PlanRequest) -> Result<(GeneratedPlan, Usage), LlmError> {
    request.validate()?;

    let system_prompt = include_str!("prompts/planner_system.txt");
    let (response_text, usage) = self.complete(system_prompt, &request.to_prompt()).await?;

    tracing::debug!(
      prompt_tokens = usage.prompt_token_count,
      output_tokens = usage.candidates_token_count,
      "plan generated"
    );

    let plan = parse_plan(&response_text)?;
    Ok((plan, usage))
  }
}

/// Extract JSON from the model response (handles markdown code blocks)
fn extract_json(text: &str) -> Result<String, LlmError> {
  // Try direct parse first
  let trimmed = text.trim();
  if trimmed.starts_with('{') && trimmed.ends_with('}') {
    return Ok(trimmed.to_string());
  }

  // Look for JSON in code blocks
  if let Some(start) = text.find("```json") {
    let start = start + 7;
    if let Some(end) = text[start..].find("```") {
      return Ok(text[start..start + end].trim().to_string());
    }
  }

  // Look for plain code blocks
  if let Some(start) = text.find("```") {
    let start = start + 3;
    // Skip language identifier if present
    let content_start = text[start..]
      .find('\n')
      .map(|i| start + i + 1)
      .unwrap_or(start);
    if let Some(end) = text[content_start..].find("```") {
      return Ok(text[content_start..content_start + end].trim().to_string());
    }
  }

  // Last resort: find first { to last }
  if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
    if start < end {
      return Ok(text[start..=end].to_string());
    }
  }

  Err(LlmError::Parse("Could not extract JSON from response".to_string()))
}

/// ---------------------------------------------------------------------------
/// Tests
/// ---------------------------------------------------------------------------
