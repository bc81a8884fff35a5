use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{
    DEFAULT_DIACRITIC_LETTERS, DEFAULT_PLACEHOLDERS, PROFILE_DIR_NAME, PROFILE_FILE_NAME,
};

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("failed to read language profile {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid language profile {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("expected a single character, got '{0}'")]
    NotACharacter(String),
    #[error("placeholder '{0}' must not be alphanumeric or whitespace")]
    InvalidPlaceholder(char),
    #[error("diacritic '{0}' must be an alphabetic character")]
    InvalidLetter(char),
    #[error("diacritic '{0}' has no single-character case variant")]
    AmbiguousCase(char),
    #[error("language profile tracks no letters")]
    EmptyAlphabet,
}

/// Placeholder character → canonical diacritic letter.
///
/// Every entry is stored for both cases: when a placeholder has a distinct
/// upper-case form it maps to the upper-case letter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaceholderMap {
    entries: BTreeMap<char, char>,
}

impl PlaceholderMap {
    pub fn new(pairs: &[(char, char)]) -> Result<Self, ProfileError> {
        let mut entries = BTreeMap::new();
        for &(placeholder, letter) in pairs {
            if placeholder.is_alphanumeric() || placeholder.is_whitespace() {
                return Err(ProfileError::InvalidPlaceholder(placeholder));
            }
            if !letter.is_alphabetic() {
                return Err(ProfileError::InvalidLetter(letter));
            }
            entries.insert(placeholder, letter);
        }

        let upper: Vec<(char, char)> = entries
            .iter()
            .filter_map(|(&p, &l)| match (single_upper(p), single_upper(l)) {
                (Some(up), Some(ul)) if up != p => Some((up, ul)),
                _ => None,
            })
            .collect();
        for (p, l) in upper {
            entries.entry(p).or_insert(l);
        }

        Ok(Self { entries })
    }

    pub fn translate(&self, c: char) -> char {
        self.entries.get(&c).copied().unwrap_or(c)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for PlaceholderMap {
    fn default() -> Self {
        Self {
            entries: DEFAULT_PLACEHOLDERS.iter().copied().collect(),
        }
    }
}

/// The fixed set of special letters whose recognition is tracked, in both cases.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DiacriticAlphabet {
    letters: BTreeSet<char>,
}

impl DiacriticAlphabet {
    /// Builds the alphabet from base letters; each letter is added with its
    /// lower- and upper-case form.
    pub fn new(base_letters: &[char]) -> Result<Self, ProfileError> {
        if base_letters.is_empty() {
            return Err(ProfileError::EmptyAlphabet);
        }
        let mut letters = BTreeSet::new();
        for &letter in base_letters {
            if !letter.is_alphabetic() {
                return Err(ProfileError::InvalidLetter(letter));
            }
            let lower = single_lower(letter).ok_or(ProfileError::AmbiguousCase(letter))?;
            let upper = single_upper(letter).ok_or(ProfileError::AmbiguousCase(letter))?;
            letters.insert(lower);
            letters.insert(upper);
        }
        Ok(Self { letters })
    }

    pub fn contains(&self, c: char) -> bool {
        self.letters.contains(&c)
    }

    /// All tracked letters (both cases), sorted.
    pub fn letters(&self) -> impl Iterator<Item = char> + '_ {
        self.letters.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.letters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.letters.is_empty()
    }
}

impl Default for DiacriticAlphabet {
    fn default() -> Self {
        let letters = DEFAULT_DIACRITIC_LETTERS
            .iter()
            .flat_map(|&c| [c, single_upper(c).unwrap_or(c)])
            .collect();
        Self { letters }
    }
}

/// Immutable language configuration handed to the normalizer and the
/// diacritic tracker.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LanguageProfile {
    pub placeholders: PlaceholderMap,
    pub alphabet: DiacriticAlphabet,
}

/// On-disk form of a language profile.
///
/// ```json
/// { "placeholders": { "{": "š", "~": "č" }, "letters": ["č", "š"] }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileFile {
    #[serde(default)]
    pub placeholders: BTreeMap<String, String>,
    pub letters: Vec<String>,
}

impl LanguageProfile {
    pub fn from_file(file: &ProfileFile) -> Result<Self, ProfileError> {
        let pairs = file
            .placeholders
            .iter()
            .map(|(p, l)| Ok((to_char(p)?, to_char(l)?)))
            .collect::<Result<Vec<_>, ProfileError>>()?;
        let letters = file
            .letters
            .iter()
            .map(|l| to_char(l))
            .collect::<Result<Vec<_>, ProfileError>>()?;

        Ok(Self {
            placeholders: PlaceholderMap::new(&pairs)?,
            alphabet: DiacriticAlphabet::new(&letters)?,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ProfileError> {
        let text = fs::read_to_string(path).map_err(|e| ProfileError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let file: ProfileFile = serde_json::from_str(&text).map_err(|e| ProfileError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_file(&file)
    }

    /// Resolve the profile to use.
    ///
    /// Resolution order:
    /// 1. Explicit path (errors if unreadable)
    /// 2. `profile.json` in the user config directory, if present
    /// 3. Built-in Croatian profile
    pub fn resolve(explicit: Option<&Path>) -> Result<Self, ProfileError> {
        if let Some(path) = explicit {
            log::info!("Loading language profile from {}", path.display());
            return Self::load(path);
        }

        if let Some(path) = user_profile_path() {
            if path.exists() {
                log::info!("Loading language profile from {}", path.display());
                return Self::load(&path);
            }
        }

        log::debug!("Using built-in language profile");
        Ok(Self::default())
    }
}

/// Platform-specific location of the user's language profile.
pub fn user_profile_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(PROFILE_DIR_NAME).join(PROFILE_FILE_NAME))
}

fn to_char(s: &str) -> Result<char, ProfileError> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err(ProfileError::NotACharacter(s.to_string())),
    }
}

fn single_upper(c: char) -> Option<char> {
    let mut upper = c.to_uppercase();
    match (upper.next(), upper.next()) {
        (Some(u), None) => Some(u),
        _ => None,
    }
}

fn single_lower(c: char) -> Option<char> {
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => Some(l),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_alphabet_tracks_both_cases() {
        let alphabet = DiacriticAlphabet::default();
        assert_eq!(alphabet.len(), 10);
        assert!(alphabet.contains('č'));
        assert!(alphabet.contains('Č'));
        assert!(alphabet.contains('đ'));
        assert!(alphabet.contains('Đ'));
        assert!(!alphabet.contains('c'));
    }

    #[test]
    fn test_letters_are_sorted() {
        let letters: Vec<char> = DiacriticAlphabet::default().letters().collect();
        assert!(letters.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_alphabet_from_uppercase_letter_adds_lowercase() {
        let alphabet = DiacriticAlphabet::new(&['Ä']).unwrap();
        assert!(alphabet.contains('ä'));
        assert!(alphabet.contains('Ä'));
    }

    #[test]
    fn test_alphabet_rejects_non_letters() {
        assert!(matches!(
            DiacriticAlphabet::new(&['1']),
            Err(ProfileError::InvalidLetter('1'))
        ));
        assert!(matches!(
            DiacriticAlphabet::new(&[]),
            Err(ProfileError::EmptyAlphabet)
        ));
    }

    #[test]
    fn test_default_placeholders_translate() {
        let map = PlaceholderMap::default();
        assert_eq!(map.translate('{'), 'š');
        assert_eq!(map.translate('~'), 'č');
        assert_eq!(map.translate('^'), 'ć');
        assert_eq!(map.translate('`'), 'ž');
        assert_eq!(map.translate('}'), 'đ');
        assert_eq!(map.translate('a'), 'a');
    }

    #[test]
    fn test_placeholder_map_rejects_alphanumeric_placeholder() {
        assert!(matches!(
            PlaceholderMap::new(&[('x', 'š')]),
            Err(ProfileError::InvalidPlaceholder('x'))
        ));
    }

    #[test]
    fn test_placeholder_map_caseless_placeholders_keep_lowercase_letter() {
        let map = PlaceholderMap::new(&[('{', 'š')]).unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(map.translate('{'), 'š');
    }

    #[test]
    fn test_profile_from_file() {
        let file = ProfileFile {
            placeholders: BTreeMap::from([("#".to_string(), "ä".to_string())]),
            letters: vec!["ä".to_string(), "ö".to_string()],
        };
        let profile = LanguageProfile::from_file(&file).unwrap();
        assert_eq!(profile.placeholders.translate('#'), 'ä');
        assert!(profile.alphabet.contains('Ö'));
    }

    #[test]
    fn test_profile_from_file_rejects_multi_char_entries() {
        let file = ProfileFile {
            placeholders: BTreeMap::new(),
            letters: vec!["ae".to_string()],
        };
        assert!(matches!(
            LanguageProfile::from_file(&file),
            Err(ProfileError::NotACharacter(_))
        ));
    }

    #[test]
    fn test_resolve_explicit_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "placeholders": {{ "~": "č" }}, "letters": ["č"] }}"#
        )
        .unwrap();

        let profile = LanguageProfile::resolve(Some(file.path())).unwrap();
        assert_eq!(profile.alphabet.len(), 2);
        assert_eq!(profile.placeholders.translate('~'), 'č');
    }

    #[test]
    fn test_resolve_missing_explicit_path_fails() {
        let result = LanguageProfile::resolve(Some(Path::new("/nonexistent/profile.json")));
        assert!(matches!(result, Err(ProfileError::Read { .. })));
    }

    #[test]
    fn test_load_malformed_json_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            LanguageProfile::load(file.path()),
            Err(ProfileError::Parse { .. })
        ));
    }
}
