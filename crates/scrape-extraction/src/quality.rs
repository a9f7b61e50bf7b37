//! Heuristic quality score (0-100) attached to the `extraction_completed`
//! log event. It has no bearing on the accept/reject decision, which is
//! driven purely by content length in the strategy cascade; this score is
//! for dashboards and after-the-fact comparison across strategies.

pub struct QualityAssessor;

impl QualityAssessor {
    pub fn calculate(title: &Option<String>, content: &str) -> u32 {
        let mut score = 0u32;

        if title.as_ref().is_some_and(|t| t.trim().len() >= 5) {
            score += 25;
        }

        let len = content.len();
        if len > 2000 {
            score += 45;
        } else if len > 500 {
            score += 30;
        } else if len > 100 {
            score += 15;
        }

        let word_count = content.split_whitespace().count();
        if word_count > 500 {
            score += 15;
        } else if word_count > 100 {
            score += 8;
        }

        let sentence_count = content.matches('.').count();
        if sentence_count > 10 {
            score += 15;
        } else if sentence_count > 3 {
            score += 8;
        }

        score.min(100)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rewards_title_and_length() {
        let title = Some("A Proper Headline".to_string());
        let content = "Sentence one. ".repeat(50);
        let score = QualityAssessor::calculate(&title, &content);
        assert!(score > 50);
    }

    #[test]
    fn scores_low_for_sparse_content() {
        let score = QualityAssessor::calculate(&None, "short");
        assert!(score < 20);
    }

    #[test]
    fn caps_at_one_hundred() {
        let title = Some("Headline".to_string());
        let content = "Sentence. ".repeat(1000);
        assert_eq!(QualityAssessor::calculate(&title, &content), 100);
    }
}
