use serde_json::Value;
use super::SynthesisError;

/// Remove markdown fence delimiters, keeping everything between them. Other
/// language tags are left behind as prose, which the brace slice skips.
pub fn strip_fences(text: &str) -> String {
    text.replace("```json", "")
        .replace("```JSON", "")
        .replace("```", "")
}

/// Slice from the first `{` to the last `}`, inclusive.
pub fn outer_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (start < end).then(|| &text[start..=end])
}

/// Recover the JSON object embedded in a model response.
pub fn extract_json(response: &str) -> Result<Value, SynthesisError> {
    let unfenced = strip_fences(response);
    let candidate = outer_object(&unfenced)
        .ok_or_else(|| SynthesisError::Parse("no JSON object found in response".to_string()))?;
    serde_json::from_str(candidate).map_err(|e| SynthesisError::Parse(e.to_string()))
}
