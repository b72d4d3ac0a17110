//! Progression extraction
//!
//! Turns logged sessions into per-exercise weight progressions:
//! - max working weight of one exercise within one session
//! - per-exercise progression across the whole history (feeds plateau detection)
//! - chart series for a single exercise
//!
//! Everything here is pure. Set weights and reps are free text typed during a
//! session, so parsing is lenient: anything that does not start with a number
//! counts as "no value" and is simply left out.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::models::{ExerciseMap, WorkoutRecord};

// ---------------------------------------------------------------------------
/// Lenient number parsing
// ---------------------------------------------------------------------------

/// Parse the longest numeric prefix of `text` ("100kg" -> 100, " 82.5" -> 82.5).
/// Returns None when the text does not start with a number.
pub fn parse_leading_float(text: &str) -> Option<f64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }

    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut digits = end - int_start;

    if end < bytes.len() && bytes[end] == b'.' {
        let frac_start = end + 1;
        let mut frac_end = frac_start;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
        }
        if digits > 0 || frac_end > frac_start {
            digits += frac_end - frac_start;
            end = frac_end;
        }
    }

    if digits == 0 {
        return None;
    }

    // Exponent only counts when followed by at least one digit
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_digits_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_digits_start {
            end = exp_end;
        }
    }

    s[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse the leading integer of `text` ("12 reps" -> 12). Decimals are truncated.
pub fn parse_leading_int(text: &str) -> Option<i64> {
    let s = text.trim_start();
    let bytes = s.as_bytes();
    let mut end = 0;

    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let digits_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    if end == digits_start {
        return None;
    }

    s[..end].parse::<i64>().ok()
}

// ---------------------------------------------------------------------------
/// Progression extractor
// ---------------------------------------------------------------------------

/// Heaviest completed set of `exercise_id` in `record`.
///
/// Returns 0.0 when the exercise is absent, no set is marked done, or no done
/// set has a positive numeric weight.
pub fn max_done_weight(record: &WorkoutRecord, exercise_id: &str) -> f64 {
    record
        .log
        .get(exercise_id)
        .map(|sets| {
            sets.iter()
                .filter(|set| set.done)
                .filter_map(|set| parse_leading_float(&set.weight))
                .fold(0.0, f64::max)
        })
        .unwrap_or(0.0)
}

/// Heaviest logged set regardless of the done flag (what the progress chart plots)
fn max_logged_weight(record: &WorkoutRecord, exercise_id: &str) -> f64 {
    record
        .log
        .get(exercise_id)
        .map(|sets| {
            sets.iter()
                .filter_map(|set| parse_leading_float(&set.weight))
                .fold(0.0, f64::max)
        })
        .unwrap_or(0.0)
}

// ---------------------------------------------------------------------------
/// Per-exercise progressions
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressPoint {
    pub date: DateTime<Utc>,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseProgression {
    pub exercise_name: String,
    /// Sessions where the exercise was done with a positive weight, oldest first
    pub points: Vec<ProgressPoint>,
}

impl ExerciseProgression {
    /// The last `n` points, oldest first. None if fewer than `n` were recorded.
    pub fn last_points(&self, n: usize) -> Option<&[ProgressPoint]> {
        self.points
            .len()
            .checked_sub(n)
            .map(|start| &self.points[start..])
    }
}

/// Group the history into one progression per exercise name.
///
/// `history` must be ascending by completion time. Exercises whose id is not in
/// `exercise_map` are skipped. Output order is the order in which each exercise
/// name first appears in the history; an exercise that appears but never with a
/// positive completed weight still gets an (empty) entry.
pub fn progressions(history: &[WorkoutRecord], exercise_map: &ExerciseMap) -> Vec<ExerciseProgression> {
    let mut result: Vec<ExerciseProgression> = Vec::new();
    let mut index_by_name: HashMap<String, usize> = HashMap::new();

    for record in history {
        for exercise_id in record.log.exercise_ids() {
            let Some(name) = exercise_map.name(exercise_id) else {
                continue;
            };

            let idx = *index_by_name.entry(name.to_string()).or_insert_with(|| {
                result.push(ExerciseProgression {
                    exercise_name: name.to_string(),
                    points: Vec::new(),
                });
                result.len() - 1
            });

            let weight = max_done_weight(record, exercise_id);
            if weight > 0.0 {
                result[idx].points.push(ProgressPoint {
                    date: record.completed_at,
                    weight,
                });
            }
        }
    }

    result
}

/// Chart series for one exercise: heaviest logged weight per session, sessions
/// without a positive weight dropped.
pub fn weight_series(history: &[WorkoutRecord], exercise_id: &str) -> Vec<ProgressPoint> {
    history
        .iter()
        .map(|record| ProgressPoint {
            date: record.completed_at,
            weight: max_logged_weight(record, exercise_id),
        })
        .filter(|point| point.weight > 0.0)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedExercise {
    pub id: String,
    pub name: String,
}

/// Distinct exercises that appear in the history and still exist, in order of
/// first appearance.
pub fn tracked_exercises(history: &[WorkoutRecord], exercise_map: &ExerciseMap) -> Vec<TrackedExercise> {
    let mut seen = std::collections::HashSet::new();
    history
        .iter()
        .flat_map(|record| record.log.exercise_ids())
        .filter(|id| seen.insert(*id))
        .filter_map(|id| {
            exercise_map.name(id).map(|name| TrackedExercise {
                id: id.to_string(),
                name: name.to_string(),
            })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SetEntry;
    use crate::test_utils::{mock_exercise_map, mock_record};

    #[test]
    fn test_parse_leading_float() {
        assert_eq!(parse_leading_float("100"), Some(100.0));
        assert_eq!(parse_leading_float(" 82.5"), Some(82.5));
        assert_eq!(parse_leading_float("100kg"), Some(100.0));
        assert_eq!(parse_leading_float(".5"), Some(0.5));
        assert_eq!(parse_leading_float("-5"), Some(-5.0));
        assert_eq!(parse_leading_float("1e2x"), Some(100.0));
        assert_eq!(parse_leading_float("3e"), Some(3.0));
        assert_eq!(parse_leading_float(""), None);
        assert_eq!(parse_leading_float("abc"), None);
        assert_eq!(parse_leading_float("."), None);
        assert_eq!(parse_leading_float("-"), None);
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("8"), Some(8));
        assert_eq!(parse_leading_int("12 reps"), Some(12));
        assert_eq!(parse_leading_int("7.9"), Some(7));
        assert_eq!(parse_leading_int("to failure"), None);
        assert_eq!(parse_leading_int(""), None);
    }

    #[test]
    fn test_max_done_weight_ignores_undone_and_junk() {
        let record = mock_record(
            "w1",
            1,
            vec![(
                "squat",
                vec![
                    SetEntry::new("100", "5", true),
                    SetEntry::new("140", "5", false),
                    SetEntry::new("abc", "5", true),
                    SetEntry::new("", "5", true),
                    SetEntry::new("110", "3", true),
                ],
            )],
        );

        assert_eq!(max_done_weight(&record, "squat"), 110.0);
        assert_eq!(max_done_weight(&record, "bench"), 0.0);
    }

    #[test]
    fn test_max_done_weight_zero_without_done_sets() {
        let record = mock_record(
            "w1",
            1,
            vec![("squat", vec![SetEntry::new("100", "5", false)])],
        );
        assert_eq!(max_done_weight(&record, "squat"), 0.0);

        let negative = mock_record("w2", 2, vec![("squat", vec![SetEntry::new("-20", "5", true)])]);
        assert_eq!(max_done_weight(&negative, "squat"), 0.0);
    }

    #[test]
    fn test_progressions_group_by_name_in_first_appearance_order() {
        let map = mock_exercise_map(&[("bench", "Bench Press"), ("squat", "Squat")]);
        let history = vec![
            mock_record("w1", 3, vec![
                ("squat", vec![SetEntry::new("100", "5", true)]),
                ("bench", vec![SetEntry::new("", "", false)]),
            ]),
            mock_record("w2", 2, vec![
                ("bench", vec![SetEntry::new("60", "8", true)]),
                ("deleted", vec![SetEntry::new("500", "1", true)]),
            ]),
        ];

        let result = progressions(&history, &map);

        let names: Vec<&str> = result.iter().map(|p| p.exercise_name.as_str()).collect();
        assert_eq!(names, vec!["Squat", "Bench Press"]);
        assert_eq!(result[0].points.len(), 1);
        assert_eq!(result[1].points.len(), 1);
        assert_eq!(result[1].points[0].weight, 60.0);
        assert_eq!(result[1].points[0].date, history[1].completed_at);
    }

    #[test]
    fn test_last_points() {
        let map = mock_exercise_map(&[("squat", "Squat")]);
        let history: Vec<_> = [100, 105, 110, 115]
            .iter()
            .enumerate()
            .map(|(i, w)| {
                mock_record(&format!("w{}", i), 10 - i as i64, vec![
                    ("squat", vec![SetEntry::new(w.to_string(), "5", true)]),
                ])
            })
            .collect();

        let progression = &progressions(&history, &map)[0];
        let last = progression.last_points(3).unwrap();
        let weights: Vec<f64> = last.iter().map(|p| p.weight).collect();
        assert_eq!(weights, vec![105.0, 110.0, 115.0]);
        assert!(progression.last_points(5).is_none());
    }

    #[test]
    fn test_weight_series_uses_all_logged_sets() {
        let history = vec![
            mock_record("w1", 3, vec![("squat", vec![SetEntry::new("90", "5", false)])]),
            mock_record("w2", 2, vec![("bench", vec![SetEntry::new("60", "5", true)])]),
            mock_record("w3", 1, vec![("squat", vec![
                SetEntry::new("100", "5", true),
                SetEntry::new("95", "5", true),
            ])]),
        ];

        let series = weight_series(&history, "squat");
        let weights: Vec<f64> = series.iter().map(|p| p.weight).collect();
        assert_eq!(weights, vec![90.0, 100.0]);
        assert_eq!(series[0].date, history[0].completed_at);
    }

    #[test]
    fn test_tracked_exercises_drops_deleted() {
        let map = mock_exercise_map(&[("bench", "Bench Press"), ("squat", "Squat")]);
        let history = vec![
            mock_record("w1", 2, vec![("squat", vec![]), ("gone", vec![])]),
            mock_record("w2", 1, vec![("bench", vec![]), ("squat", vec![])]),
        ];

        let tracked = tracked_exercises(&history, &map);
        assert_eq!(
            tracked,
            vec![
                TrackedExercise { id: "squat".into(), name: "Squat".into() },
                TrackedExercise { id: "bench".into(), name: "Bench Press".into() },
            ]
        );
    }
}
