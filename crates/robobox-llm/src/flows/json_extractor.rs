//! JSON extraction utilities for cleaning LLM responses

use crate::error::{LLMError, Result};
use regex::Regex;
use serde_json::Value;

const FENCE_PATTERN: &str = r"(?s)```(?:json|JSON)?\s*\n?(.*?)```";

/// Extracts the first JSON object from an LLM response
///
/// This function handles common LLM output patterns:
/// - Markdown code blocks (```json ... ```)
/// - Explanatory text before/after the object
/// - Braces inside string values
///
/// # Returns
/// * `Ok(Value)` - The parsed object
/// * `Err(LLMError::InvalidResponse)` - If no JSON object is found
pub fn extract_json_object(llm_output: &str) -> Result<Value> {
    let cleaned = llm_output.trim();
    if cleaned.is_empty() {
        return Err(LLMError::InvalidResponse("Empty response".to_string()));
    }

    let fence = Regex::new(FENCE_PATTERN).map_err(|e| LLMError::Other(e.to_string()))?;
    if let Some(inner) = fence.captures(cleaned).and_then(|c| c.get(1)) {
        if let Some(object) = find_object(inner.as_str()) {
            return parse_object(object);
        }
    }

    match find_object(cleaned) {
        Some(object) => parse_object(object),
        None => Err(LLMError::InvalidResponse(
            "No JSON object found in response".to_string(),
        )),
    }
}

/// Locate the first balanced `{...}` span
fn find_object(content: &str) -> Option<&str> {
    let start = content.find('{')?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in content[start..].char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&content[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_object(content: &str) -> Result<Value> {
    let value: Value = serde_json::from_str(content)
        .map_err(|e| LLMError::InvalidResponse(format!("Invalid JSON: {}", e)))?;
    if !value.is_object() {
        return Err(LLMError::InvalidResponse(
            "Expected a JSON object".to_string(),
        ));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_bare_object() {
        let value = extract_json_object(r#"{"discountCode": "ROBO-1", "discountPercentage": 15}"#)
            .unwrap();
        assert_eq!(value["discountCode"], "ROBO-1");
    }

    #[test]
    fn test_extract_from_markdown_json() {
        let input = r#"Here's your code:

```json
{"discountCode": "SPARK", "discountPercentage": 20}
```

Enjoy!"#;
        let value = extract_json_object(input).unwrap();
        assert_eq!(value["discountPercentage"], 20);
    }

    #[test]
    fn test_extract_from_markdown_generic() {
        let input = "```\n{\"answer\": \"Kits and workshops\"}\n```";
        assert_eq!(extract_json_object(input).unwrap()["answer"], "Kits and workshops");
    }

    #[test]
    fn test_extract_with_prose_around() {
        let input = r#"Sure! {"answer": "We offer {many} kits"} Hope that helps."#;
        let value = extract_json_object(input).unwrap();
        assert_eq!(value["answer"], "We offer {many} kits");
    }

    #[test]
    fn test_escaped_quotes_in_string() {
        let input = r#"{"answer": "Say \"hi\" to {bots}"}"#;
        assert_eq!(extract_json_object(input).unwrap()["answer"], "Say \"hi\" to {bots}");
    }

    #[test]
    fn test_no_object_error() {
        assert!(matches!(
            extract_json_object("This is not JSON at all."),
            Err(LLMError::InvalidResponse(_))
        ));
        assert!(extract_json_object("   \n ").is_err());
        assert!(extract_json_object(r#"{"answer": "unclosed"#).is_err());
    }
}
