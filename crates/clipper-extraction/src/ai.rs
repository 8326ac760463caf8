//! AI re-analysis escalation (§4.3 step 4): triggered when the
//! selector-based pass is too weak, asks the LLM to extract structured
//! content directly from the HTML.

use clipper_intelligence::{extract_content_request, parse_extract_content, LlmProvider};
use clipper_types::Result;

/// Confidence floor a selector-based pass must clear to be accepted
/// without escalation.
const MIN_ACCEPTABLE_CONFIDENCE: f32 = 0.5;
const MIN_CONTENT_LEN: usize = 100;
const MIN_TITLE_LEN: usize = 10;

/// `true` when the selector-based extraction is weak enough that AI
/// re-analysis should be attempted: short content, low confidence,
/// short title, or a failed quality gate.
pub fn should_reanalyze(content_len: usize, confidence: f32, title_len: usize, quality_gate_passed: bool) -> bool {
    content_len < MIN_CONTENT_LEN
        || confidence < MIN_ACCEPTABLE_CONFIDENCE
        || title_len < MIN_TITLE_LEN
        || !quality_gate_passed
}

pub struct ReanalysisResult {
    pub title: String,
    pub content: String,
    pub author: Option<String>,
    pub date_raw: Option<String>,
    pub confidence: f32,
}

/// Ask the LLM to extract structured content directly from `html`.
/// Accepted by the caller only when `confidence > 0.5` (§4.3 step 4).
pub async fn reanalyze(llm: &dyn LlmProvider, model: &str, url: &str, html: &str) -> Result<ReanalysisResult> {
    let request = extract_content_request(model, url, html);
    let response = llm.complete(request).await?;
    let parsed = parse_extract_content(&response.content)?;
    Ok(ReanalysisResult {
        title: parsed.title,
        content: parsed.content,
        author: parsed.author,
        date_raw: parsed.date,
        confidence: parsed.confidence,
    })
}

/// Whether a re-analysis result clears the bar to be used in place of
/// the selector-based pass.
pub fn reanalysis_is_acceptable(confidence: f32) -> bool {
    confidence > MIN_ACCEPTABLE_CONFIDENCE
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triggers_on_short_content() {
        assert!(should_reanalyze(50, 0.9, 20, true));
    }

    #[test]
    fn triggers_on_low_confidence() {
        assert!(should_reanalyze(500, 0.4, 20, true));
    }

    #[test]
    fn triggers_on_short_title() {
        assert!(should_reanalyze(500, 0.9, 5, true));
    }

    #[test]
    fn triggers_on_failed_quality_gate() {
        assert!(should_reanalyze(500, 0.9, 20, false));
    }

    #[test]
    fn does_not_trigger_when_all_pass() {
        assert!(!should_reanalyze(500, 0.9, 20, true));
    }

    #[test]
    fn acceptance_threshold_is_strictly_above_half() {
        assert!(!reanalysis_is_acceptable(0.5));
        assert!(reanalysis_is_acceptable(0.51));
    }
}
