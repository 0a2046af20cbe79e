//! Participant roster, participant cell parsing and display colors.

use serde::Serialize;

/// Catch-all roster entry meaning "everyone".
pub const EVERYONE: &str = "All";

/// Names selectable as participants, in display order.
pub const ROSTER: &[&str] = &[EVERYONE, "Eve", "Jari", "Maja", "Stijn"];

/// Colors used to render one event on the calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Palette {
    pub background: &'static str,
    pub border: &'static str,
    pub text: &'static str,
}

const fn palette(background: &'static str, border: &'static str, text: &'static str) -> Palette {
    Palette {
        background,
        border,
        text,
    }
}

const PERSON_COLORS: &[(&str, Palette)] = &[
    (EVERYONE, palette("#90CAF9", "#1E88E5", "#0D47A1")),
    ("Eve", palette("#EF9A9A", "#E53935", "#B71C1C")),
    ("Jari", palette("#A5D6A7", "#43A047", "#1B5E20")),
    ("Maja", palette("#F48FB1", "#EC407A", "#880E4F")),
    ("Stijn", palette("#FFF59D", "#FDD835", "#F57F17")),
];

/// Used whenever two or more people take part.
pub const COMBINATION_COLOR: Palette = palette("#FFCC80", "#FB8C00", "#E65100");

/// Used when nobody, or somebody off the roster, takes part.
pub const DEFAULT_COLOR: Palette = palette("#ECEFF1", "#B0BEC5", "#263238");

/// Split a stored participants cell into names.
///
/// Tokens are trimmed, empty tokens are dropped, order is preserved.
pub fn parse_participants(cell: &str) -> Vec<String> {
    cell.split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

/// Join participant names into the stored cell format.
pub fn join_participants<S: AsRef<str>>(parts: &[S]) -> String {
    parts
        .iter()
        .map(|p| p.as_ref())
        .collect::<Vec<&str>>()
        .join(", ")
}

/// Trim names, drop blanks and repeated names, keeping first occurrences.
pub fn normalize_selection(parts: &[String]) -> Vec<String> {
    let mut selected: Vec<String> = Vec::with_capacity(parts.len());
    for name in parts.iter().map(|p| p.trim()).filter(|p| !p.is_empty()) {
        if !selected.iter().any(|s| s == name) {
            selected.push(name.to_string());
        }
    }
    selected
}

pub fn person_color(name: &str) -> Option<Palette> {
    PERSON_COLORS
        .iter()
        .find(|(person, _)| *person == name)
        .map(|(_, colors)| *colors)
}

/// Pick the display colors for a participant list.
pub fn pick_color<S: AsRef<str>>(parts: &[S]) -> Palette {
    match parts {
        [] => DEFAULT_COLOR,
        [only] => person_color(only.as_ref()).unwrap_or(DEFAULT_COLOR),
        _ => COMBINATION_COLOR,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_participants() {
        assert_eq!(parse_participants("Eve, Jari"), vec!["Eve", "Jari"]);
        assert_eq!(parse_participants(" Maja ,, ,Stijn,"), vec!["Maja", "Stijn"]);
        assert!(parse_participants("").is_empty());
        assert!(parse_participants(" , ").is_empty());
    }

    #[test]
    fn test_join_normalizes_parsed_cell() {
        assert_eq!(join_participants(&parse_participants("Eve,Jari")), "Eve, Jari");
        assert_eq!(
            join_participants(&parse_participants("  All ,,Maja  , ")),
            "All, Maja"
        );
        assert_eq!(join_participants::<String>(&[]), "");
    }

    #[test]
    fn test_pick_color() {
        assert_eq!(pick_color::<&str>(&[]), DEFAULT_COLOR);
        assert_eq!(pick_color(&["Eve"]), person_color("Eve").unwrap());
        assert_eq!(pick_color(&["Eve", "Jari"]), COMBINATION_COLOR);
        assert_eq!(pick_color(&["Unknown"]), DEFAULT_COLOR);
        assert_eq!(pick_color(&["Unknown", "Other"]), COMBINATION_COLOR);
    }

    #[test]
    fn test_every_roster_name_has_a_color() {
        for name in ROSTER {
            assert!(person_color(name).is_some(), "{} has no color", name);
        }
    }

    #[test]
    fn test_normalize_selection_keeps_first_occurrence() {
        let picked = vec![
            "Eve".to_string(),
            " Jari ".to_string(),
            "Eve".to_string(),
            "".to_string(),
        ];
        assert_eq!(normalize_selection(&picked), vec!["Eve", "Jari"]);
    }
}
