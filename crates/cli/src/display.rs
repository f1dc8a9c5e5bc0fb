//! Terminal rendering of tutor answers.

use stemtutor_knowledge::TutorResponse;

const RULE_WIDTH: usize = 70;
const BAR_CELLS: usize = 20;

pub fn rule(ch: char) -> String {
    ch.to_string().repeat(RULE_WIDTH)
}

/// Filled cells for a confidence in `[0, 1]`, truncated.
pub fn confidence_bar(confidence: f32) -> String {
    let cells = (confidence.clamp(0.0, 1.0) * BAR_CELLS as f32) as usize;
    "█".repeat(cells)
}

/// Answer followed by its metadata block.
pub fn render_response(response: &TutorResponse) -> String {
    let mut lines = vec![
        rule('='),
        "🤖 **Answer:**".to_string(),
        rule('='),
        String::new(),
        response.answer.clone(),
        String::new(),
        rule('-'),
    ];

    if let Some(question) = &response.matched_question {
        lines.push(format!("📋 Similar question: {}", question));
    }
    if let Some(topic) = &response.topic {
        lines.push(format!("📖 Topic: {}", topic));
    }
    if let Some(subject) = response.subject {
        lines.push(format!("📚 Subject: {}", subject.as_str().to_uppercase()));
    }
    if let Some(source) = &response.source {
        let icon = if source.contains("Local") { "🧠" } else { "📚" };
        lines.push(format!("{} Source: {}", icon, source));
    }
    if let Some(span) = &response.highlight {
        lines.push(format!("🔎 Key sentence: {}", span.text));
    }
    if response.confidence > 0.0 {
        lines.push(format!(
            "🎯 Confidence: {} {:.1}%",
            confidence_bar(response.confidence),
            response.confidence * 100.0
        ));
        lines.push(format!("   {}", response.confidence_level().description()));
    }

    lines.push(rule('='));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use stemtutor_knowledge::Subject;

    #[test]
    fn test_confidence_bar() {
        assert_eq!(confidence_bar(1.0).chars().count(), 20);
        assert_eq!(confidence_bar(0.95).chars().count(), 19);
        assert_eq!(confidence_bar(0.0), "");
        assert_eq!(confidence_bar(1.7).chars().count(), 20);
    }

    #[test]
    fn test_render_metadata() {
        let response = TutorResponse {
            answer: "**Atom** is the smallest unit of matter.".to_string(),
            subject: Some(Subject::Chemistry),
            source: Some("Local Knowledge Base".to_string()),
            confidence: 0.6,
            topic: Some("atom".to_string()),
            matched_question: None,
            highlight: None,
        };

        let text = render_response(&response);
        assert!(text.contains("📖 Topic: atom"));
        assert!(text.contains("📚 Subject: CHEMISTRY"));
        assert!(text.contains("🧠 Source: Local Knowledge Base"));
        assert!(text.contains("🎯 Confidence: ████████████ 60.0%"));
        assert!(text.contains("Moderate confidence"));
        assert!(!text.contains("Similar question"));
    }

    #[test]
    fn test_no_confidence_block_without_match() {
        let text = render_response(&TutorResponse::message("I couldn't find anything."));
        assert!(!text.contains("Confidence"));
        assert!(!text.contains("Source"));
    }
}
