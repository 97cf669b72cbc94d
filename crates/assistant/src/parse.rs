use serde_json::Value;

/// Pulls the outermost JSON array or object out of a model reply.
///
/// Markdown code fences and any prose around the payload are ignored.
pub fn extract_json(content: &str) -> Option<Value> {
    let body = strip_fences(content);

    let start = body.find(['[', '{'])?;
    let close = if body[start..].starts_with('[') { ']' } else { '}' };
    let end = body.rfind(close)?;
    if end < start {
        return None;
    }

    serde_json::from_str(&body[start..=end]).ok()
}

fn strip_fences(content: &str) -> &str {
    let Some(open) = content.find("```") else {
        return content;
    };

    let rest = &content[open + 3..];
    // Skip the language tag on the fence line.
    let rest = match rest.find('\n') {
        Some(pos) => &rest[pos + 1..],
        None => rest,
    };

    match rest.find("```") {
        Some(close) => &rest[..close],
        None => rest,
    }
}

pub(crate) fn parse_error() -> mealmate_shared::Error {
    mealmate_shared::Error::Server("AI response could not be parsed".to_owned())
}

pub(crate) fn as_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_owned()).filter(|s| !s.is_empty()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Accepts `30`, `"30"` and `"30 minutes"`.
pub(crate) fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => s
            .split_whitespace()
            .next()
            .and_then(|n| n.parse::<f64>().ok())
            .map(|f| f.round() as i64),
        _ => None,
    }
}

pub(crate) fn as_strings(value: &Value) -> Vec<String> {
    match value {
        Value::Array(items) => items.iter().filter_map(as_string).collect(),
        Value::String(s) => s
            .split([',', '\n'])
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_owned)
            .collect(),
        _ => Vec::new(),
    }
}

/// Finds the list under one of `keys`, or the value itself when it is a list.
pub(crate) fn find_list<'a>(value: &'a Value, keys: &[&str]) -> Option<&'a Vec<Value>> {
    if let Value::Array(items) = value {
        return Some(items);
    }

    keys.iter().find_map(|key| value.get(key)?.as_array())
}
