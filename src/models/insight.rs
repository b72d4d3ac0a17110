use serde::{Deserialize, Serialize};

/// Post-workout load suggestion for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Insight {
  pub exercise_name: String,
  pub message: String,
  /// Suggested next working weight in kg, rounded to one decimal
  pub suggested_weight: f64,
}

/// Stalled-progress notice for one exercise
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlateauWarning {
  pub exercise_name: String,
  pub message: String,
}
