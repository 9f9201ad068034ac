//! Best-effort extraction of a code block from a model reply.

/// Strategy for reducing a free-text reply to a code candidate.
///
/// The default heuristic below is approximate on purpose; callers that
/// negotiate a stricter output contract with the model can swap in a
/// different implementation without touching the rest of the pipeline.
pub trait CodeExtractor {
    fn extract(&self, response: &str) -> String;
}

/// Fenced block first, explanatory-marker line scan second, whole
/// response last.
pub struct FencedBlockExtractor;

const EXPLANATION_MARKERS: &[&str] = &["the error", "explanation", "this code", "note:"];

impl CodeExtractor for FencedBlockExtractor {
    fn extract(&self, response: &str) -> String {
        if let Some(block) = fenced_block(response) {
            return block;
        }

        let mut kept = Vec::new();
        for line in response.lines() {
            let lower = line.to_lowercase();
            if EXPLANATION_MARKERS.iter().any(|m| lower.starts_with(m)) {
                break;
            }
            kept.push(line);
        }
        kept.join("\n").trim().to_string()
    }
}

/// Inner content of the first ``` fence pair, ignoring any language tag
/// on the opening fence line.
fn fenced_block(response: &str) -> Option<String> {
    let start = response.find("```")?;
    let rest = &response[start + 3..];
    let tag_end = rest.find('\n')?;
    let body = &rest[tag_end + 1..];
    let end = body.find("```")?;
    Some(body[..end].trim().to_string())
}
