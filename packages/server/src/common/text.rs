//! Text normalization helpers shared by the roster and analytics code.

/// Trims a string, returning `None` when nothing is left.
pub fn trim_or_none(value: Option<&str>) -> Option<String> {
    match value {
        Some(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        None => None,
    }
}

/// Builds a case- and diacritic-insensitive sort key.
///
/// Participant imports mix accented and unaccented spellings of the same
/// names ("Déléguée" vs "Deleguee"), so ordering must fold Latin-1
/// diacritics before comparing. Unmapped characters pass through lowercased.
pub fn fold_key(value: &str) -> String {
    value
        .chars()
        .flat_map(|c| c.to_lowercase())
        .map(fold_char)
        .collect()
}

fn fold_char(c: char) -> char {
    match c {
        'à' | 'á' | 'â' | 'ã' | 'ä' | 'å' => 'a',
        'ç' => 'c',
        'è' | 'é' | 'ê' | 'ë' => 'e',
        'ì' | 'í' | 'î' | 'ï' => 'i',
        'ñ' => 'n',
        'ò' | 'ó' | 'ô' | 'õ' | 'ö' => 'o',
        'ù' | 'ú' | 'û' | 'ü' => 'u',
        'ý' | 'ÿ' => 'y',
        'œ' => 'o',
        'æ' => 'a',
        other => other,
    }
}
