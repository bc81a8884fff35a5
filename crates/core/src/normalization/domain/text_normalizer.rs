use super::normalized_text::NormalizedText;
use crate::shared::constants::MARKUP_DELIMITERS;
use crate::shared::language_profile::PlaceholderMap;

/// Canonicalizes raw transcripts before comparison.
///
/// Steps, in order:
/// 1. Placeholder characters → diacritic letters
/// 2. `<...>` and `[...]` spans removed
/// 3. Punctuation removed (anything not alphanumeric or whitespace)
/// 4. Case folded
/// 5. Whitespace runs collapsed to one space, ends trimmed
///
/// The result is idempotent: normalizing normalized text is a no-op.
#[derive(Clone, Debug, Default)]
pub struct TextNormalizer {
    placeholders: PlaceholderMap,
}

impl TextNormalizer {
    pub fn new(placeholders: PlaceholderMap) -> Self {
        Self { placeholders }
    }

    pub fn normalize(&self, raw: &str) -> NormalizedText {
        let translated: String = raw.chars().map(|c| self.placeholders.translate(c)).collect();
        let unmarked = strip_markup(&translated);

        let folded: String = unmarked
            .chars()
            .filter(|c| is_kept(*c))
            .flat_map(char::to_lowercase)
            // Lower-casing can emit combining marks (e.g. 'İ'); drop them too.
            .filter(|c| is_kept(*c))
            .collect();

        NormalizedText::new(folded.split_whitespace().collect::<Vec<_>>().join(" "))
    }
}

fn is_kept(c: char) -> bool {
    c.is_alphanumeric() || c.is_whitespace()
}

/// Removes every delimited span, shortest match first. An opener with no
/// closer is left in place (it is punctuation and goes later).
fn strip_markup(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        let closer = MARKUP_DELIMITERS
            .iter()
            .find(|(open, _)| *open == c)
            .map(|(_, close)| *close);

        if let Some(close) = closer {
            if let Some(offset) = chars[i + 1..].iter().position(|&x| x == close) {
                i += offset + 2;
                continue;
            }
        }

        out.push(c);
        i += 1;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn normalize(raw: &str) -> String {
        TextNormalizer::default().normalize(raw).as_str().to_string()
    }

    #[test]
    fn test_lowercases_and_strips_punctuation() {
        assert_eq!(normalize("Dobar dan, Ivana!"), "dobar dan ivana");
    }

    #[test]
    fn test_translates_placeholders_before_punctuation_removal() {
        assert_eq!(normalize("~ovjek {to ^e"), "čovjek što će");
        assert_eq!(normalize("`aba i }ak"), "žaba i đak");
    }

    #[test]
    fn test_removes_angle_markup_spans() {
        assert_eq!(normalize("<noise> ide <breath>gore"), "ide gore");
    }

    #[test]
    fn test_removes_bracket_annotations() {
        assert_eq!(normalize("[smijeh] pa da [nerazumljivo]"), "pa da");
    }

    #[test]
    fn test_unclosed_markup_is_treated_as_punctuation() {
        assert_eq!(normalize("a <b c"), "a b c");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(normalize("  jedan \t dva\n\ntri  "), "jedan dva tri");
    }

    #[test]
    fn test_uppercase_diacritics_fold() {
        assert_eq!(normalize("ČAŠA ŽUĆ"), "čaša žuć");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(normalize(""), "");
        assert_eq!(normalize("<only markup> ..."), "");
    }

    #[test]
    fn test_custom_placeholders() {
        let map = PlaceholderMap::new(&[('#', 'ä')]).unwrap();
        let normalizer = TextNormalizer::new(map);
        assert_eq!(normalizer.normalize("M#rchen").as_str(), "märchen");
    }

    #[test]
    fn test_combining_marks_from_case_folding_are_dropped() {
        assert_eq!(normalize("İ"), "i");
    }

    #[rstest]
    #[case("Dobar dan, Ivana!")]
    #[case("~ovjek {to ^e <noise> [x] `aba")]
    #[case("  RAZMACI \t\t i   tabovi ")]
    #[case("a <b c ] d [e")]
    #[case("İstanbul Straße ǅemal")]
    #[case("")]
    fn test_normalize_is_idempotent(#[case] raw: &str) {
        let normalizer = TextNormalizer::default();
        let once = normalizer.normalize(raw);
        let twice = normalizer.normalize(once.as_str());
        assert_eq!(once, twice);
    }
}
