use std::fs::File;
use std::io::{self, BufWriter, Read};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use serde::Serialize;

use asreval_core::dataset::domain::dataset::Dataset;
use asreval_core::dataset::domain::speaker_category::SpeakerCategory;
use asreval_core::diacritics::domain::confusion_tracker::ComparisonMode;
use asreval_core::evaluation::domain::evaluation_executor::EvaluationExecutor;
use asreval_core::evaluation::domain::utterance_evaluator::UtteranceEvaluator;
use asreval_core::evaluation::infrastructure::corpus_directory::{load_corpus, CorpusDirectory};
use asreval_core::evaluation::infrastructure::hypothesis_directory_transcriber::HypothesisDirectoryTranscriber;
use asreval_core::evaluation::infrastructure::sequential_evaluation_executor::SequentialEvaluationExecutor;
use asreval_core::evaluation::infrastructure::threaded_evaluation_executor::ThreadedEvaluationExecutor;
use asreval_core::normalization::domain::text_normalizer::TextNormalizer;
use asreval_core::persistence::domain::record_store::RecordStore;
use asreval_core::persistence::infrastructure::json_lines_record_store::JsonLinesRecordStore;
use asreval_core::pipeline::analyze_dataset_use_case::AnalyzeDatasetUseCase;
use asreval_core::pipeline::evaluate_corpus_use_case::EvaluateCorpusUseCase;
use asreval_core::pipeline::evaluation_logger::StdoutEvaluationLogger;
use asreval_core::shared::constants::{DEFAULT_PROGRESS_THROTTLE, DEFAULT_TOP_CONFUSIONS};
use asreval_core::shared::language_profile::LanguageProfile;
use asreval_core::statistics::domain::model_comparison::ModelComparison;
use asreval_core::statistics::domain::statistical_comparator::ComparisonResult;

/// Diacritic-aware evaluation of ASR transcripts.
#[derive(Parser)]
#[command(name = "asreval")]
struct Cli {
    /// Language profile (placeholder map and tracked letters) as JSON.
    #[arg(long, global = true)]
    profile: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the normalized form of each line of a transcript.
    Normalize {
        /// Transcript file (stdin when omitted).
        input: Option<PathBuf>,
    },

    /// Score pre-computed hypotheses against a reference corpus.
    Evaluate {
        /// Reference directory for one speaker category, as CATEGORY=DIR.
        #[arg(long = "corpus", value_parser = parse_category_dir, required = true)]
        corpora: Vec<(SpeakerCategory, PathBuf)>,

        /// Audio directory for one speaker category, as CATEGORY=DIR.
        #[arg(long = "audio", value_parser = parse_category_dir)]
        audio: Vec<(SpeakerCategory, PathBuf)>,

        /// Directory of `<file_id>.txt` hypotheses written by the ASR engine.
        #[arg(long)]
        hypotheses: PathBuf,

        /// Label stored with every record (e.g. the model size).
        #[arg(long)]
        model: Option<String>,

        /// Records file to write (JSON Lines).
        #[arg(long)]
        output: PathBuf,

        /// Worker threads (1 = evaluate on the main thread).
        #[arg(long)]
        threads: Option<usize>,
    },

    /// Summaries, significance tests and diacritic analysis of records files.
    Analyze {
        /// One or more records files; they are merged in order.
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Pair diacritics through the character alignment instead of by position.
        #[arg(long)]
        alignment_anchored: bool,

        /// Number of confusion pairs and missed words to list.
        #[arg(long, default_value_t = DEFAULT_TOP_CONFUSIONS)]
        top: usize,

        /// Also write the report as JSON.
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Per-utterance differences between two runs over the same corpus.
    Compare {
        first: PathBuf,
        second: PathBuf,

        /// Model label to take from the first file when it holds several.
        #[arg(long)]
        first_model: Option<String>,

        /// Model label to take from the second file when it holds several.
        #[arg(long)]
        second_model: Option<String>,

        /// Also write the comparison as JSON.
        #[arg(long)]
        json: Option<PathBuf>,
    },
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let profile = LanguageProfile::resolve(cli.profile.as_deref())?;
    let normalizer = TextNormalizer::new(profile.placeholders.clone());

    match cli.command {
        Command::Normalize { input } => run_normalize(input.as_deref(), &normalizer),
        Command::Evaluate {
            corpora,
            audio,
            hypotheses,
            model,
            output,
            threads,
        } => run_evaluate(
            &corpora,
            &audio,
            hypotheses,
            model,
            output,
            threads,
            normalizer,
        ),
        Command::Analyze {
            inputs,
            alignment_anchored,
            top,
            json,
        } => {
            let mode = if alignment_anchored {
                ComparisonMode::AlignmentAnchored
            } else {
                ComparisonMode::Positional
            };
            let dataset = load_datasets(&inputs, &normalizer)?;
            let report = AnalyzeDatasetUseCase::new(profile.alphabet, mode, top).run(&dataset);
            print!("{report}");
            if let Some(path) = json {
                write_json(&path, &report)?;
            }
            Ok(())
        }
        Command::Compare {
            first,
            second,
            first_model,
            second_model,
            json,
        } => run_compare(
            (&first, first_model.as_deref()),
            (&second, second_model.as_deref()),
            json.as_deref(),
            &normalizer,
        ),
    }
}

fn run_normalize(
    input: Option<&Path>,
    normalizer: &TextNormalizer,
) -> Result<(), Box<dyn std::error::Error>> {
    let text = match input {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {e}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    for line in text.lines() {
        println!("{}", normalizer.normalize(line));
    }
    Ok(())
}

fn run_evaluate(
    corpora: &[(SpeakerCategory, PathBuf)],
    audio: &[(SpeakerCategory, PathBuf)],
    hypotheses: PathBuf,
    model: Option<String>,
    output: PathBuf,
    threads: Option<usize>,
    normalizer: TextNormalizer,
) -> Result<(), Box<dyn std::error::Error>> {
    let directories: Vec<CorpusDirectory> = corpora
        .iter()
        .map(|(category, dir)| {
            let directory = CorpusDirectory::new(category.clone(), dir);
            match audio.iter().find(|(c, _)| c == category) {
                Some((_, audio_dir)) => directory.with_audio(audio_dir),
                None => directory,
            }
        })
        .collect();
    let sources = load_corpus(&directories)?;

    let executor: Box<dyn EvaluationExecutor> = match threads {
        Some(1) => Box::new(SequentialEvaluationExecutor),
        Some(n) => Box::new(ThreadedEvaluationExecutor::new(n)),
        None => Box::new(ThreadedEvaluationExecutor::default()),
    };

    let mut use_case = EvaluateCorpusUseCase::new(
        Box::new(HypothesisDirectoryTranscriber::new(hypotheses)),
        executor,
        UtteranceEvaluator::new(normalizer.clone(), model),
        Box::new(JsonLinesRecordStore::with_normalizer(&output, normalizer)),
        Box::new(StdoutEvaluationLogger::new(DEFAULT_PROGRESS_THROTTLE)),
    );
    let outcome = use_case.run(&sources)?;

    let rates = outcome.dataset.micro_average().rates();
    println!(
        "Evaluated {} utterance(s), skipped {}",
        outcome.dataset.len(),
        outcome.skipped.len()
    );
    println!(
        "WER {}  CER {}  DER {}",
        percent(rates.wer),
        percent(rates.cer),
        percent(rates.der)
    );
    log::info!("Records written to {}", output.display());
    Ok(())
}

fn run_compare(
    (first, first_model): (&Path, Option<&str>),
    (second, second_model): (&Path, Option<&str>),
    json: Option<&Path>,
    normalizer: &TextNormalizer,
) -> Result<(), Box<dyn std::error::Error>> {
    let first_dataset = load_run(first, first_model, normalizer)?;
    let second_dataset = load_run(second, second_model, normalizer)?;

    let comparison = ModelComparison::between(
        run_label(&first_dataset, first),
        &first_dataset,
        run_label(&second_dataset, second),
        &second_dataset,
    )?;

    println!(
        "{} vs {}: {} matched, {} unmatched in first, {} unmatched in second",
        comparison.first_label,
        comparison.second_label,
        comparison.matched(),
        comparison.unmatched_first,
        comparison.unmatched_second
    );
    for test in &comparison.tests {
        let mean = test
            .mean_difference
            .map_or_else(|| "n/a".to_string(), |d| format!("{d:+.4}"));
        match &test.result {
            ComparisonResult::Available(outcome) => {
                println!("  {} mean difference {mean}: {outcome}", test.metric)
            }
            ComparisonResult::Unavailable { reason } => {
                println!("  {} mean difference {mean}: unavailable ({reason})", test.metric)
            }
        }
    }

    if let Some(path) = json {
        write_json(path, &comparison)?;
    }
    Ok(())
}

fn load_datasets(
    paths: &[PathBuf],
    normalizer: &TextNormalizer,
) -> Result<Dataset, Box<dyn std::error::Error>> {
    let mut dataset = Dataset::default();
    for path in paths {
        let store = JsonLinesRecordStore::with_normalizer(path, normalizer.clone());
        dataset = dataset.merge(store.load()?)?;
    }
    Ok(dataset)
}

/// One records file, narrowed to a single model when asked.
fn load_run(
    path: &Path,
    model: Option<&str>,
    normalizer: &TextNormalizer,
) -> Result<Dataset, Box<dyn std::error::Error>> {
    let dataset = load_datasets(&[path.to_path_buf()], normalizer)?;
    match model {
        Some(model) => {
            let selected = dataset.for_model(model);
            if selected.is_empty() {
                return Err(format!("No records of model '{model}' in {}", path.display()).into());
            }
            Ok(selected)
        }
        None => Ok(dataset),
    }
}

/// The single model label of a run, or the file stem.
fn run_label(dataset: &Dataset, path: &Path) -> String {
    match dataset.models().as_slice() {
        [Some(model)] => model.clone(),
        _ => path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string()),
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn std::error::Error>> {
    let file =
        File::create(path).map_err(|e| format!("Failed to create {}: {e}", path.display()))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value)?;
    log::info!("JSON written to {}", path.display());
    Ok(())
}

fn percent(value: Option<f64>) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{:.2}%", v * 100.0))
}

fn parse_category_dir(value: &str) -> Result<(SpeakerCategory, PathBuf), String> {
    let (category, dir) = value
        .split_once('=')
        .ok_or_else(|| format!("expected CATEGORY=DIR, got '{value}'"))?;
    let category: SpeakerCategory = category.parse().map_err(|e| format!("{e}"))?;
    if dir.is_empty() {
        return Err(format!("missing directory in '{value}'"));
    }
    Ok((category, PathBuf::from(dir)))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(profile) = &cli.profile {
        if !profile.is_file() {
            return Err(format!("Profile file not found: {}", profile.display()).into());
        }
    }
    match &cli.command {
        Command::Normalize { input: Some(input) } if !input.is_file() => {
            Err(format!("Input file not found: {}", input.display()).into())
        }
        Command::Evaluate {
            hypotheses,
            threads,
            audio,
            corpora,
            ..
        } => {
            if !hypotheses.is_dir() {
                return Err(
                    format!("Hypothesis directory not found: {}", hypotheses.display()).into(),
                );
            }
            if *threads == Some(0) {
                return Err("Threads must be at least 1".into());
            }
            for (category, _) in audio {
                if !corpora.iter().any(|(c, _)| c == category) {
                    return Err(
                        format!("--audio given for category '{category}' without --corpus").into(),
                    );
                }
            }
            Ok(())
        }
        Command::Analyze { inputs, top, .. } => {
            if *top == 0 {
                return Err("Top must be at least 1".into());
            }
            ensure_files_exist(inputs)
        }
        Command::Compare { first, second, .. } => {
            ensure_files_exist(&[first.clone(), second.clone()])
        }
        _ => Ok(()),
    }
}

fn ensure_files_exist(paths: &[PathBuf]) -> Result<(), Box<dyn std::error::Error>> {
    match paths.iter().find(|p| !p.is_file()) {
        Some(missing) => Err(format!("Records file not found: {}", missing.display()).into()),
        None => Ok(()),
    }
}
