// Display labels for the Australian Curriculum identifiers used by search.

const LEARNING_AREAS: &[(&str, &str)] = &[
    ("english", "English"),
    ("mathematics", "Mathematics"),
    ("maths", "Mathematics"),
    ("science", "Science"),
    ("hass", "Humanities and Social Sciences"),
    ("humanities-and-social-sciences", "Humanities and Social Sciences"),
    ("the-arts", "The Arts"),
    ("arts", "The Arts"),
    ("technologies", "Technologies"),
    ("health-and-physical-education", "Health and Physical Education"),
    ("hpe", "Health and Physical Education"),
    ("languages", "Languages"),
];

fn slug(value: &str) -> String {
    value
        .trim()
        .to_lowercase()
        .split(|c: char| c.is_whitespace() || c == '_' || c == '-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Learning-area name for a slug such as `hass` or `the-arts`.
/// Unknown identifiers pass through trimmed.
pub fn learning_area_label(id: &str) -> String {
    let key = slug(id);
    LEARNING_AREAS
        .iter()
        .find(|(slug, _)| *slug == key)
        .map(|(_, label)| label.to_string())
        .unwrap_or_else(|| id.trim().to_string())
}

/// Level label: `foundation`/`f`/`k` → `Foundation`, `year-7`/`year7`/`7` → `Year 7`.
pub fn year_level_label(id: &str) -> String {
    let key = slug(id).replace('-', "");
    match key.as_str() {
        "foundation" | "f" | "k" | "prep" | "year0" | "0" => return "Foundation".to_string(),
        _ => {}
    }

    let digits = key.strip_prefix("year").unwrap_or(&key);
    match digits.parse::<u8>() {
        Ok(year) if (1..=12).contains(&year) => format!("Year {}", year),
        _ => id.trim().to_string(),
    }
}
