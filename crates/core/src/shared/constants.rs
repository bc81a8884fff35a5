/// Two-sided significance threshold shared by every hypothesis test.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Rank-sum tests use the exact null distribution when both samples are
/// smaller than this and contain no ties.
pub const EXACT_RANK_SUM_MAX_N: usize = 8;

/// Signed-rank tests use the exact null distribution up to this many
/// non-zero differences (without tied magnitudes).
pub const EXACT_SIGNED_RANK_MAX_N: usize = 50;

/// Decimal places kept for persisted WER/CER/DER values.
pub const METRIC_PRECISION: i32 = 4;

/// Base letters tracked by the diacritic analysis (Croatian).
pub const DEFAULT_DIACRITIC_LETTERS: &[char] = &['č', 'ć', 'š', 'ž', 'đ'];

/// ASCII placeholders used by the reference transcripts for the diacritic letters.
pub const DEFAULT_PLACEHOLDERS: &[(char, char)] = &[
    ('{', 'š'),
    ('~', 'č'),
    ('^', 'ć'),
    ('`', 'ž'),
    ('}', 'đ'),
];

/// Opening/closing pairs whose enclosed spans are annotation markup.
pub const MARKUP_DELIMITERS: &[(char, char)] = &[('<', '>'), ('[', ']')];

pub const REFERENCE_EXTENSION: &str = "txt";
pub const AUDIO_EXTENSION: &str = "wav";

pub const PROFILE_DIR_NAME: &str = "asreval";
pub const PROFILE_FILE_NAME: &str = "profile.json";

/// Progress is reported every this many utterances.
pub const DEFAULT_PROGRESS_THROTTLE: usize = 25;

/// Number of confusion pairs listed per model in reports.
pub const DEFAULT_TOP_CONFUSIONS: usize = 10;
