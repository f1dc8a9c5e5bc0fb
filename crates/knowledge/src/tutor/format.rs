//! Answer formatting.

use crate::datasets::{choice_letter, MmluRow, ScienceQaRow};
use crate::subjects::{suggestions, Subject};

pub const INCOMPLETE_QUESTION: &str = "⚠️ Please ask a complete question.";

const RELATED_PREFIX: &str = "⚠️ **Related information** (not an exact match):\n\n";

/// Add visual separators around formulas and examples for formula-heavy topics.
pub fn format_answer_with_steps(answer: &str, topic: Option<&str>) -> String {
    let formula_topic = topic.is_some_and(|t| {
        let t = t.to_lowercase();
        ["equation", "formula", "theorem", "law"]
            .iter()
            .any(|marker| t.contains(marker))
    });

    if !formula_topic {
        return answer.to_string();
    }

    answer
        .replace(
            "**Formula:**",
            &format!("\n{}\n**📐 Formula:**", "=".repeat(50)),
        )
        .replace(
            "**Example:**",
            &format!("\n{}\n**📝 Example:**", "-".repeat(50)),
        )
}

/// Answer, lecture and solution of a ScienceQA row.
pub fn format_scienceqa(row: &ScienceQaRow) -> String {
    let mut parts = Vec::new();
    if let Some(choice) = row.correct_choice().filter(|c| !c.is_empty()) {
        parts.push(format!("**Answer:** {}", choice));
    }
    if let Some(lecture) = row.lecture() {
        parts.push(format!("\n**📚 Explanation:**\n{}", lecture));
    }
    if let Some(solution) = row.solution() {
        parts.push(format!("\n**💡 Solution:**\n{}", solution));
    }
    parts.join("\n")
}

/// Question, lettered choices and the correct answer of an MMLU row.
pub fn format_mmlu(row: &MmluRow) -> String {
    let choices: Vec<String> = row
        .choices
        .iter()
        .enumerate()
        .map(|(i, choice)| format!("  {}. {}", choice_letter(i), choice))
        .collect();

    format!(
        "**Question:** {}\n\n**Choices:**\n{}\n\n**Answer:** {}. {}",
        row.question,
        choices.join("\n"),
        choice_letter(row.answer),
        row.correct_choice().unwrap_or_default()
    )
}

pub fn related_answer(answer: &str) -> String {
    format!("{}{}", RELATED_PREFIX, answer)
}

/// Reply used when nothing matched.
pub fn no_match_message(subject: Option<Subject>) -> String {
    format!(
        "I couldn't find specific information on that topic. \n\n\
         **Try asking about:**\n\
         {}\n\n\
         **Tips for better results:**\n\
         • Be specific (e.g., \"What is Newton's first law?\" instead of \"Tell me about physics\")\n\
         • Use standard terminology\n\
         • Break complex questions into smaller parts",
        suggestions(subject)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONTENT: &str = "**Formula:** F = ma\n**Example:** 10 kg at 5 m/s²";

    #[test]
    fn test_steps_for_law_topic() {
        let formatted = format_answer_with_steps(CONTENT, Some("newtons_second_law"));
        assert!(formatted.starts_with(&format!("\n{}\n**📐 Formula:**", "=".repeat(50))));
        assert!(formatted.contains(&format!("\n{}\n**📝 Example:**", "-".repeat(50))));
    }

    #[test]
    fn test_steps_untouched_for_other_topics() {
        assert_eq!(format_answer_with_steps(CONTENT, Some("gravity")), CONTENT);
        assert_eq!(format_answer_with_steps(CONTENT, None), CONTENT);
    }

    #[test]
    fn test_format_scienceqa() {
        let row = ScienceQaRow {
            question: "Which is a mammal?".to_string(),
            choices: vec!["frog".to_string(), "whale".to_string()],
            answer: 1,
            lecture: Some("Mammals nurse their young.".to_string()),
            solution: Some("A whale is a mammal.".to_string()),
        };
        assert_eq!(
            format_scienceqa(&row),
            "**Answer:** whale\n\n**📚 Explanation:**\nMammals nurse their young.\n\n**💡 Solution:**\nA whale is a mammal."
        );
    }

    #[test]
    fn test_format_mmlu() {
        let row = MmluRow {
            question: "Unit of force?".to_string(),
            choices: vec!["Joule".to_string(), "Newton".to_string()],
            answer: 1,
            subject: "high_school_physics".to_string(),
        };
        assert_eq!(
            format_mmlu(&row),
            "**Question:** Unit of force?\n\n**Choices:**\n  A. Joule\n  B. Newton\n\n**Answer:** B. Newton"
        );
    }

    #[test]
    fn test_related_and_no_match() {
        assert!(related_answer("x").ends_with(":\n\nx"));
        let message = no_match_message(Some(Subject::Biology));
        assert!(message.contains("• Photosynthesis"));
        assert!(message.contains("Tips for better results"));
    }
}
