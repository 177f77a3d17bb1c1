//! Parsing and validation of generated plans.

use std::borrow::Cow;
use std::sync::OnceLock;

use habitual_core::{DailyTask, Difficulty};
use regex::Regex;
use serde::Deserialize;

use crate::GenerationError;

/// One entry as the model is asked to emit it.
#[derive(Debug, Deserialize)]
struct PlanEntry {
    day: u32,
    goal: String,
    explanation: String,
    difficulty: String,
}

fn code_fence() -> Option<&'static Regex> {
    static FENCE: OnceLock<Option<Regex>> = OnceLock::new();
    FENCE.get_or_init(|| Regex::new(r"```[A-Za-z]*").ok()).as_ref()
}

/// Strip markdown code fences and any prose around the JSON array.
fn extract_json_array(text: &str) -> Result<&str, GenerationError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(GenerationError::EmptyResponse);
    }
    let start = trimmed.find('[');
    let end = trimmed.rfind(']');
    match (start, end) {
        (Some(start), Some(end)) if start < end => Ok(&trimmed[start..=end]),
        _ => Err(GenerationError::Malformed(
            "response does not contain a JSON array".to_string(),
        )),
    }
}

/// Parse model output into exactly `timeframe_days` tasks.
///
/// The whole plan is rejected if any entry is malformed or if the day numbers
/// are not exactly `1..=timeframe_days`.
pub fn parse_plan(text: &str, timeframe_days: u32) -> Result<Vec<DailyTask>, GenerationError> {
    let cleaned = match code_fence() {
        Some(re) => re.replace_all(text, ""),
        None => Cow::Borrowed(text),
    };
    let json = extract_json_array(&cleaned)?;

    let entries: Vec<PlanEntry> =
        serde_json::from_str(json).map_err(|e| GenerationError::Malformed(e.to_string()))?;

    if entries.len() != timeframe_days as usize {
        return Err(GenerationError::DaySequence(format!(
            "expected {} days, got {}",
            timeframe_days,
            entries.len()
        )));
    }

    let mut tasks = entries
        .into_iter()
        .map(|entry| {
            if entry.goal.trim().is_empty() {
                return Err(GenerationError::Malformed(format!(
                    "day {} has an empty goal",
                    entry.day
                )));
            }
            let difficulty: Difficulty = entry
                .difficulty
                .parse()
                .map_err(|e: habitual_core::ParseError| GenerationError::Malformed(e.to_string()))?;
            Ok(DailyTask::new(
                entry.day,
                entry.goal.trim(),
                entry.explanation.trim(),
                difficulty,
            ))
        })
        .collect::<Result<Vec<_>, _>>()?;

    tasks.sort_by_key(|t| t.day);
    for (expected, task) in (1..=timeframe_days).zip(&tasks) {
        if task.day != expected {
            return Err(GenerationError::DaySequence(format!(
                "expected day {}, found day {}",
                expected, task.day
            )));
        }
    }

    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::*;

    const THREE_DAYS: &str = r#"[
        {"day": 1, "goal": "Do 5 push-ups", "explanation": "Start small", "difficulty": "easy"},
        {"day": 2, "goal": "Do 8 push-ups", "explanation": "Add a few", "difficulty": "medium"},
        {"day": 3, "goal": "Do 12 push-ups", "explanation": "Push harder", "difficulty": "hard"}
    ]"#;

    #[test]
    fn test_parse_plain_json() {
        let tasks = parse_plan(THREE_DAYS, 3).unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].goal, "Do 5 push-ups");
        assert_eq!(tasks[2].difficulty, Difficulty::Hard);
        assert!(tasks.iter().all(|t| !t.completed && t.completed_at.is_none() && t.date.is_none()));
    }

    #[test]
    fn test_parse_fenced_json_with_prose() {
        let text = format!("Here is your plan:\n```json\n{}\n```\nGood luck!", THREE_DAYS);
        assert_eq!(parse_plan(&text, 3).unwrap().len(), 3);
    }

    #[test]
    fn test_out_of_order_days_are_sorted() {
        let text = r#"[
            {"day": 2, "goal": "b", "explanation": "", "difficulty": "easy"},
            {"day": 1, "goal": "a", "explanation": "", "difficulty": "EASY"}
        ]"#;
        let tasks = parse_plan(text, 2).unwrap();
        assert_eq!(tasks[0].day, 1);
        assert_eq!(tasks[0].goal, "a");
    }

    #[test]
    fn test_wrong_length_rejected() {
        let err = parse_plan(THREE_DAYS, 4).unwrap_err();
        assert!(matches!(err, GenerationError::DaySequence(_)));
    }

    #[test]
    fn test_gap_and_duplicate_days_rejected() {
        let gap = r#"[
            {"day": 1, "goal": "a", "explanation": "", "difficulty": "easy"},
            {"day": 3, "goal": "c", "explanation": "", "difficulty": "easy"}
        ]"#;
        assert!(matches!(parse_plan(gap, 2), Err(GenerationError::DaySequence(_))));

        let duplicate = r#"[
            {"day": 1, "goal": "a", "explanation": "", "difficulty": "easy"},
            {"day": 1, "goal": "b", "explanation": "", "difficulty": "easy"}
        ]"#;
        assert!(matches!(parse_plan(duplicate, 2), Err(GenerationError::DaySequence(_))));

        let zero_based = r#"[
            {"day": 0, "goal": "a", "explanation": "", "difficulty": "easy"}
        ]"#;
        assert!(matches!(parse_plan(zero_based, 1), Err(GenerationError::DaySequence(_))));
    }

    #[test]
    fn test_bad_shapes_rejected() {
        assert_eq!(parse_plan("   ", 1).unwrap_err(), GenerationError::EmptyResponse);
        assert!(matches!(parse_plan("no plan today", 1), Err(GenerationError::Malformed(_))));
        assert!(matches!(
            parse_plan(r#"[{"day": 1, "goal": "a", "difficulty": "easy"}]"#, 1),
            Err(GenerationError::Malformed(_))
        ));
        assert!(matches!(
            parse_plan(r#"[{"day": 1, "goal": "a", "explanation": "", "difficulty": "brutal"}]"#, 1),
            Err(GenerationError::Malformed(_))
        ));
        assert!(matches!(
            parse_plan(r#"[{"day": "1", "goal": "a", "explanation": "", "difficulty": "easy"}]"#, 1),
            Err(GenerationError::Malformed(_))
        ));
        assert!(matches!(
            parse_plan(r#"[{"day": 1, "goal": "  ", "explanation": "", "difficulty": "easy"}]"#, 1),
            Err(GenerationError::Malformed(_))
        ));
    }
}
