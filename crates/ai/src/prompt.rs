//! Prompt construction for plan generation.

/// Build the prompt asking for a `timeframe_days`-day plan.
pub fn build_plan_prompt(current_condition: &str, goal: &str, timeframe_days: u32) -> String {
    format!(
        r#"Create a detailed plan to help someone achieve their goal.
Current condition: {current_condition}
Goal: {goal}
Timeframe: {timeframe_days} days

Please provide:
1. A list of daily goals, starting from the current condition and gradually increasing in difficulty
2. Each goal should be specific, measurable, and achievable
3. The progression should be natural and sustainable
4. Include a brief explanation for each goal

Return exactly {timeframe_days} entries, one per day, numbered from 1 to {timeframe_days}.
Format the response as a JSON array of objects with the following structure:
{{
  "day": number,
  "goal": string,
  "explanation": string,
  "difficulty": "easy" | "medium" | "hard"
}}"#,
        current_condition = current_condition.trim(),
        goal = goal.trim(),
        timeframe_days = timeframe_days,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_mentions_inputs() {
        let prompt = build_plan_prompt("  can run 1km ", "run 5km", 14);
        assert!(prompt.contains("Current condition: can run 1km\n"));
        assert!(prompt.contains("Goal: run 5km"));
        assert!(prompt.contains("Timeframe: 14 days"));
        assert!(prompt.contains("numbered from 1 to 14"));
        assert!(prompt.contains("\"difficulty\": \"easy\" | \"medium\" | \"hard\""));
    }
}
