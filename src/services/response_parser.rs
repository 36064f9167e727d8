//! 模型回复解析
//!
//! 模型经常把 JSON 包在 Markdown 代码块里，或在前后加说明文字。

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value as JsonValue;

static CODE_FENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```(?:json|JSON)?\s*(.*?)\s*```").expect("valid regex")
});

/// 从模型回复中取出第一个 JSON 对象
pub fn extract_json_object(response: &str) -> Result<JsonValue, String> {
    let body = CODE_FENCE
        .captures(response)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or(response)
        .trim();

    if let Ok(value @ JsonValue::Object(_)) = serde_json::from_str::<JsonValue>(body) {
        return Ok(value);
    }

    // 退而求其次：截取第一个 '{' 到最后一个 '}'
    let start = body.find('{');
    let end = body.rfind('}');
    match (start, end) {
        (Some(start), Some(end)) if start < end => {
            serde_json::from_str::<JsonValue>(&body[start..=end])
                .map_err(|e| format!("模型返回的 JSON 无法解析: {}", e))
        }
        _ => Err(format!(
            "模型返回内容中没有 JSON 对象: {}",
            crate::utils::logging::truncate_text(response, 80)
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json() {
        let value = extract_json_object(r#"{"summary":"ok"}"#).unwrap();
        assert_eq!(value["summary"], "ok");
    }

    #[test]
    fn test_fenced_json() {
        let reply = "Here you go:\n```json\n{\"questions\": []}\n```\nGood luck!";
        let value = extract_json_object(reply).unwrap();
        assert!(value["questions"].as_array().unwrap().is_empty());
    }

    #[test]
    fn test_json_with_surrounding_prose() {
        let reply = "Result: {\"summary\": \"cells\"} -- end";
        assert_eq!(extract_json_object(reply).unwrap()["summary"], "cells");
    }

    #[test]
    fn test_no_json() {
        assert!(extract_json_object("I cannot help with that.").is_err());
        assert!(extract_json_object("[1, 2, 3]").is_err());
    }
}
