use mealmate_shared::{pantry::Unit, recipe::RecipeIngredient};

const VULGAR_FRACTIONS: [(char, f64); 15] = [
    ('½', 1.0 / 2.0),
    ('⅓', 1.0 / 3.0),
    ('⅔', 2.0 / 3.0),
    ('¼', 1.0 / 4.0),
    ('¾', 3.0 / 4.0),
    ('⅕', 1.0 / 5.0),
    ('⅖', 2.0 / 5.0),
    ('⅗', 3.0 / 5.0),
    ('⅘', 4.0 / 5.0),
    ('⅙', 1.0 / 6.0),
    ('⅚', 5.0 / 6.0),
    ('⅛', 1.0 / 8.0),
    ('⅜', 3.0 / 8.0),
    ('⅝', 5.0 / 8.0),
    ('⅞', 7.0 / 8.0),
];

fn vulgar(c: char) -> Option<f64> {
    VULGAR_FRACTIONS
        .iter()
        .find(|(v, _)| *v == c)
        .map(|(_, value)| *value)
}

/// Parses "2", "1.5", "1/2", "½" or "1½". Ranges such as "2-3" keep the
/// lower bound.
fn parse_number(token: &str) -> Option<f64> {
    let token = token.split(['-', '–']).next().unwrap_or(token).trim();
    if token.is_empty() {
        return None;
    }

    if let Some((numerator, denominator)) = token.split_once('/') {
        let numerator: f64 = numerator.parse().ok()?;
        let denominator: f64 = denominator.parse().ok()?;
        if denominator == 0.0 {
            return None;
        }

        return Some(numerator / denominator);
    }

    let last = token.chars().last()?;
    if let Some(fraction) = vulgar(last) {
        let whole = &token[..token.len() - last.len_utf8()];
        if whole.is_empty() {
            return Some(fraction);
        }

        return whole.parse::<u32>().ok().map(|w| w as f64 + fraction);
    }

    token.parse::<f64>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

/// Splits a token like "200g" into its number and trailing unit text.
fn split_glued(token: &str) -> Option<(f64, &str)> {
    let index = token.find(|c: char| c.is_alphabetic())?;
    if index == 0 {
        return None;
    }

    let quantity = parse_number(&token[..index])?;

    Some((quantity, &token[index..]))
}

/// Parses a free text ingredient line.
///
/// `"1 1/2 cups flour, sifted"` gives quantity 1.5, unit cup, name "flour"
/// and note "sifted". Lines without a leading number keep `quantity` empty.
pub fn parse_ingredient_line(line: &str) -> RecipeIngredient {
    let line = line
        .trim()
        .trim_start_matches(['-', '*', '•', '·'])
        .trim();

    let (body, note) = match line.split_once(',') {
        Some((body, note)) => (body.trim(), Some(note.trim().to_owned())),
        None => (line, None),
    };

    let tokens = body.split_whitespace().collect::<Vec<_>>();
    let mut index = 0;
    let mut quantity = None;
    let mut glued_unit = None;

    if let Some(first) = tokens.first() {
        if let Some(value) = parse_number(first) {
            quantity = Some(value);
            index = 1;

            if let Some(fraction) = tokens
                .get(1)
                .filter(|t| t.contains('/') || t.chars().all(|c| vulgar(c).is_some()))
                .and_then(|t| parse_number(t))
            {
                quantity = Some(value + fraction);
                index = 2;
            }
        } else if let Some((value, unit)) = split_glued(first) {
            quantity = Some(value);
            glued_unit = Unit::parse_loose(unit);
            index = 1;
        }
    }

    let mut unit = glued_unit;
    if unit.is_none()
        && quantity.is_some()
        && tokens.len() > index + 1
        && let Some(parsed) = Unit::parse_loose(tokens[index])
    {
        unit = Some(parsed);
        index += 1;
    }

    if unit.is_some() && tokens.get(index).is_some_and(|t| t.eq_ignore_ascii_case("of")) {
        index += 1;
    }

    let name = tokens[index.min(tokens.len())..].join(" ");
    let name = if name.is_empty() { body.to_owned() } else { name };

    RecipeIngredient {
        name,
        quantity,
        unit,
        note: note.filter(|n| !n.is_empty()),
    }
}
