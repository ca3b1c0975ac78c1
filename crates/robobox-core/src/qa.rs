//! Built-in grounding data for the FAQ assistant

use crate::models::QaPair;

/// The fixed pairs handed to the model by the default `getQAPairs` tool
pub fn sample_pairs() -> Vec<QaPair> {
    vec![
        QaPair::new(
            "What products does RoboBox Reimagined offer?",
            "RoboBox Reimagined offers a variety of robotics kits and educational resources.",
        ),
        QaPair::new(
            "How can schools register for RoboBox Reimagined?",
            "Schools can register by filling out the school registration form on our website.",
        ),
    ]
}

/// Common questions shown in site search and used as a richer knowledge base
pub fn common_questions() -> Vec<QaPair> {
    vec![
        QaPair::new(
            "What products does RoboBox Reimagined offer?",
            "RoboBox Reimagined offers a variety of robotics kits and educational resources, \
             including the Starter Bot Kit, Advanced Sensor Pack, and an AI Vision Module. \
             Our ecosystem also provides curriculum support and teacher training.",
        ),
        QaPair::new(
            "How can schools register for RoboBox Reimagined?",
            "Schools can register by filling out the school registration form on our website. \
             Just navigate to the 'For Schools' section and submit your inquiry to partner \
             with us.",
        ),
        QaPair::new(
            "Is there a discount available?",
            "Yes! We have an interactive discount generator on our homepage. Scratch the card \
             to reveal a unique discount code for your purchase.",
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_pairs_cover_product_question() {
        let pairs = sample_pairs();
        assert_eq!(pairs.len(), 2);
        assert!(pairs
            .iter()
            .any(|p| p.question == "What products does RoboBox Reimagined offer?"));
    }

    #[test]
    fn test_common_questions_non_empty_answers() {
        assert!(common_questions()
            .iter()
            .all(|p| !p.question.is_empty() && !p.answer.is_empty()));
    }
}
