use regex::Regex;
use std::sync::LazyLock;

static ISO_DURATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)^P(?:(\d+(?:\.\d+)?)D)?(?:T(?:(\d+(?:\.\d+)?)H)?(?:(\d+(?:\.\d+)?)M)?(?:(\d+(?:\.\d+)?)S)?)?$",
    )
    .unwrap()
});

/// Converts an ISO-8601 duration such as `PT1H30M` into whole minutes.
pub fn parse_iso_duration(value: &str) -> Option<i64> {
    let value = value.trim();
    let captures = ISO_DURATION.captures(value)?;

    let part = |index: usize| {
        captures
            .get(index)
            .and_then(|m| m.as_str().parse::<f64>().ok())
            .unwrap_or(0.0)
    };

    if (1..=4).all(|i| captures.get(i).is_none()) {
        return None;
    }

    let minutes = part(1) * 1440.0 + part(2) * 60.0 + part(3) + part(4) / 60.0;

    Some(minutes.round() as i64)
}
