use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn asreval(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_asreval"))
        .args(args)
        .output()
        .expect("failed to launch asreval")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn path(p: &Path) -> &str {
    p.to_str().unwrap()
}

/// Two male and one female reference, hypotheses for all but one.
fn corpus(root: &Path) {
    let male = root.join("refs/m");
    let female = root.join("refs/f");
    let hyp = root.join("hyp");
    fs::create_dir_all(&male).unwrap();
    fs::create_dir_all(&female).unwrap();
    fs::create_dir_all(&hyp).unwrap();

    fs::write(male.join("sm01.txt"), "Dobar dan, ~ovje~e.").unwrap();
    fs::write(male.join("sm02.txt"), "Laku no^.").unwrap();
    fs::write(female.join("sf01.txt"), "Ku^a je <noise> lijepa.").unwrap();

    fs::write(hyp.join("sm01.txt"), "dobar dan covjece").unwrap();
    fs::write(hyp.join("sf01.txt"), "kuća je lijepa").unwrap();
}

fn evaluate(root: &Path, model: &str, output: &str) -> Output {
    asreval(&[
        "evaluate",
        "--corpus",
        &format!("m={}", path(&root.join("refs/m"))),
        "--corpus",
        &format!("f={}", path(&root.join("refs/f"))),
        "--hypotheses",
        path(&root.join("hyp")),
        "--model",
        model,
        "--output",
        path(&root.join(output)),
        "--threads",
        "2",
    ])
}

#[test]
fn test_normalize_file() {
    let dir = TempDir::new().unwrap();
    let input = dir.path().join("raw.txt");
    fs::write(&input, "Dobar  dan, ~ovje~e! [laugh]\nLaku no^.\n").unwrap();

    let output = asreval(&["normalize", path(&input)]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "dobar dan čovječe\nlaku noć\n");
}

#[test]
fn test_normalize_missing_file_fails() {
    let output = asreval(&["normalize", "/definitely/not/here.txt"]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Input file not found"));
}

#[test]
fn test_evaluate_writes_records_and_skips_missing_hypotheses() {
    let dir = TempDir::new().unwrap();
    corpus(dir.path());

    let output = evaluate(dir.path(), "small", "small.jsonl");

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout(&output).contains("Evaluated 2 utterance(s), skipped 1"));

    let records = fs::read_to_string(dir.path().join("small.jsonl")).unwrap();
    let lines: Vec<serde_json::Value> = records
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(lines.len(), 2);
    assert!(lines.iter().all(|l| l["model"] == "small"));

    let female = lines.iter().find(|l| l["category"] == "f").unwrap();
    assert_eq!(female["ref"], "kuća je lijepa");
    assert_eq!(female["wer"], 0.0);

    let male = lines.iter().find(|l| l["file_id"] == "sm01").unwrap();
    assert_eq!(male["ref"], "dobar dan čovječe");
    // a diacritic slip is a substitution, not a deletion
    assert!(male["cer"].as_f64().unwrap() > 0.0);
    assert_eq!(male["der"], 0.0);
}

#[test]
fn test_evaluate_rejects_zero_threads() {
    let dir = TempDir::new().unwrap();
    corpus(dir.path());
    let output = asreval(&[
        "evaluate",
        "--corpus",
        &format!("m={}", path(&dir.path().join("refs/m"))),
        "--hypotheses",
        path(&dir.path().join("hyp")),
        "--output",
        path(&dir.path().join("out.jsonl")),
        "--threads",
        "0",
    ]);
    assert!(!output.status.success());
}

#[test]
fn test_analyze_reports_and_writes_json() {
    let dir = TempDir::new().unwrap();
    corpus(dir.path());
    assert!(evaluate(dir.path(), "small", "small.jsonl").status.success());
    let report_path = dir.path().join("report.json");

    let output = asreval(&[
        "analyze",
        path(&dir.path().join("small.jsonl")),
        "--json",
        path(&report_path),
    ]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let text = stdout(&output);
    assert!(text.starts_with("Overall (2 utterances"));
    assert!(text.contains("Diacritics for small"));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&report_path).unwrap()).unwrap();
    assert_eq!(report["diacritic_mode"], "positional");
    assert_eq!(report["overall"]["utterances"], 2);
}

#[test]
fn test_analyze_rejects_malformed_records() {
    let dir = TempDir::new().unwrap();
    let records = dir.path().join("bad.jsonl");
    fs::write(&records, "{\"not\": \"a record\"}\n").unwrap();

    let output = asreval(&["analyze", path(&records)]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Error:"));
}

#[test]
fn test_compare_two_runs() {
    let dir = TempDir::new().unwrap();
    corpus(dir.path());
    assert!(evaluate(dir.path(), "small", "small.jsonl").status.success());
    fs::write(dir.path().join("hyp/sm01.txt"), "dobar dan čovječe").unwrap();
    assert!(evaluate(dir.path(), "large", "large.jsonl").status.success());

    let output = asreval(&[
        "compare",
        path(&dir.path().join("small.jsonl")),
        path(&dir.path().join("large.jsonl")),
    ]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let text = stdout(&output);
    assert!(text.starts_with("small vs large: 2 matched"));
    assert!(text.contains("WER mean difference"));
}

#[test]
fn test_custom_profile_changes_placeholders() {
    let dir = TempDir::new().unwrap();
    let profile = dir.path().join("profile.json");
    fs::write(&profile, r##"{"placeholders": {"#": "š"}, "letters": ["š"]}"##).unwrap();
    let input = dir.path().join("raw.txt");
    fs::write(&input, "#uma ~\n").unwrap();

    let output = asreval(&["--profile", path(&profile), "normalize", path(&input)]);

    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(stdout(&output), "šuma\n");
}

#[test]
fn test_analyze_rejects_same_utterance_in_two_files() {
    let dir = TempDir::new().unwrap();
    corpus(dir.path());
    assert!(evaluate(dir.path(), "small", "run1.jsonl").status.success());
    assert!(evaluate(dir.path(), "small", "run2.jsonl").status.success());

    let output = asreval(&[
        "analyze",
        path(&dir.path().join("run1.jsonl")),
        path(&dir.path().join("run2.jsonl")),
    ]);

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("occurs more than once"));
}

#[test]
fn test_compare_needs_a_model_for_mixed_runs() {
    let dir = TempDir::new().unwrap();
    corpus(dir.path());
    assert!(evaluate(dir.path(), "small", "small.jsonl").status.success());
    assert!(evaluate(dir.path(), "large", "large.jsonl").status.success());
    let both = dir.path().join("whisper.jsonl");
    let mut records = fs::read_to_string(dir.path().join("small.jsonl")).unwrap();
    records.push_str(&fs::read_to_string(dir.path().join("large.jsonl")).unwrap());
    fs::write(&both, records).unwrap();
    let google = path(&dir.path().join("large.jsonl")).to_string();

    let mixed = asreval(&["compare", path(&both), &google]);
    assert!(!mixed.status.success());
    assert!(String::from_utf8_lossy(&mixed.stderr).contains("holds 2 model labels"));

    let selected = asreval(&["compare", path(&both), &google, "--first-model", "small"]);
    assert!(selected.status.success(), "{}", String::from_utf8_lossy(&selected.stderr));
    assert!(stdout(&selected).starts_with("small vs large: 2 matched"));
}
