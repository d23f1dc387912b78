use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use bmx::{Attributes, Document, ErrorKind, ParseError};

const TEST_SUFFIX: &str = ".test.bmx";

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// If true, loading must fail before parsing (empty input).
    #[serde(default)]
    pub expect_input_error: bool,

    /// Expected syntax error: the message must contain this substring.
    #[serde(default)]
    pub expect_error: Option<String>,

    /// 1-based line the expected syntax error must be reported on.
    #[serde(default)]
    pub expect_line: Option<usize>,

    /// Exact contents of the document's text blocks.
    #[serde(default)]
    pub expect_texts: Option<BTreeMap<String, String>>,

    /// Exact contents of the document's attribute blocks.
    #[serde(default)]
    pub expect_attributes: Option<BTreeMap<String, Attributes>>,

    /// If true, dumping and reloading the document must reproduce it.
    #[serde(default)]
    pub expect_roundtrip: bool,
}

/// Split a `.test.bmx` file into its TOML config and BMX source.
fn parse_test_file(content: &str) -> Result<(TestConfig, &str), String> {
    let content = content.trim_start_matches('\u{feff}'); // strip BOM

    let after_open = content
        .strip_prefix("---")
        .ok_or("missing opening --- frontmatter delimiter")?;
    let after_open = after_open
        .strip_prefix('\n')
        .or_else(|| after_open.strip_prefix("\r\n"))
        .unwrap_or(after_open);

    let close_pos = after_open
        .find("\n---")
        .ok_or("missing closing --- frontmatter delimiter")?;

    let toml_str = after_open[..close_pos].trim_end_matches('\r');
    let rest = &after_open[close_pos + 4..]; // skip \n---
    let source = rest
        .strip_prefix("\r\n")
        .or_else(|| rest.strip_prefix('\n'))
        .unwrap_or(rest);

    let config: TestConfig =
        toml::from_str(toml_str).map_err(|e| format!("TOML parse error: {}", e))?;

    Ok((config, source))
}

pub enum TestOutcome {
    Pass,
    Fail(String),
}

pub struct TestResult {
    pub path: PathBuf,
    pub description: Option<String>,
    pub outcome: TestOutcome,
}

impl TestResult {
    fn label(&self) -> &str {
        self.description.as_deref().unwrap_or_else(|| {
            self.path
                .file_name()
                .and_then(|s| s.to_str())
                .map(|s| s.trim_end_matches(TEST_SUFFIX))
                .unwrap_or("?")
        })
    }
}

fn run_single_test(path: &Path) -> TestResult {
    let fail = |description: Option<String>, reason: String| TestResult {
        path: path.to_path_buf(),
        description,
        outcome: TestOutcome::Fail(reason),
    };

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => return fail(None, format!("cannot read file: {}", e)),
    };

    let (config, source) = match parse_test_file(&content) {
        Ok(pair) => pair,
        Err(e) => return fail(None, format!("frontmatter error: {}", e)),
    };

    let description = config.description.clone();
    let outcome = match check(&config, bmx::load(source)) {
        None => TestOutcome::Pass,
        Some(reason) => TestOutcome::Fail(reason),
    };

    TestResult {
        path: path.to_path_buf(),
        description,
        outcome,
    }
}

/// Compare a load result against the expectations. Returns `Some(reason)` on mismatch.
fn check(config: &TestConfig, result: Result<Document, ParseError>) -> Option<String> {
    if config.expect_input_error {
        return match result {
            Err(e) if e.kind() == ErrorKind::Input => None,
            Err(e) => Some(format!("expected an input error, got: {}", e)),
            Ok(_) => Some("expected an input error, but loading succeeded".into()),
        };
    }

    if let Some(expected) = &config.expect_error {
        return match result {
            Ok(_) => Some(format!(
                "expected error containing \"{}\", but loading succeeded",
                expected
            )),
            Err(e) if e.kind() != ErrorKind::Syntax => {
                Some(format!("expected a syntax error, got: {}", e))
            }
            Err(e) if !e.message().contains(expected.as_str()) => Some(format!(
                "expected error containing \"{}\", got: {}",
                expected, e
            )),
            Err(e) => check_line(config.expect_line, &e),
        };
    }

    let document = match result {
        Ok(document) => document,
        Err(e) => return Some(format!("unexpected error: {}", e)),
    };

    if let Some(expected) = &config.expect_texts {
        if *expected != document.texts {
            return Some(format!(
                "text blocks mismatch\n  expected: {:?}\n  actual:   {:?}",
                expected, document.texts
            ));
        }
    }

    if let Some(expected) = &config.expect_attributes {
        if *expected != document.attributes {
            return Some(format!(
                "attribute blocks mismatch\n  expected: {:?}\n  actual:   {:?}",
                expected, document.attributes
            ));
        }
    }

    if config.expect_roundtrip {
        let dumped = bmx::dumps(&document);
        match bmx::load(&dumped) {
            Ok(reloaded) if reloaded == document => {}
            Ok(reloaded) => {
                return Some(format!(
                    "round-trip changed the document\n  dumped:   {:?}\n  reloaded: {:?}",
                    dumped, reloaded
                ));
            }
            Err(e) => return Some(format!("dumped document failed to load: {}", e)),
        }
    }

    None
}

fn check_line(expected_line: Option<usize>, error: &ParseError) -> Option<String> {
    let expected_line = expected_line?;
    match error.position() {
        Some(position) if position.line == expected_line => None,
        Some(position) => Some(format!(
            "expected error on line {}, but it is on line {}",
            expected_line, position.line
        )),
        None => Some(format!(
            "expected error on line {}, but the error has no position",
            expected_line
        )),
    }
}

/// Discover `.test.bmx` files grouped by category (subfolder relative to root).
/// Files directly in `root` get category "" (uncategorized).
fn discover_categorized(root: &Path) -> BTreeMap<String, Vec<PathBuf>> {
    let mut categories: BTreeMap<String, Vec<PathBuf>> = BTreeMap::new();
    collect_tests(root, root, &mut categories);
    for files in categories.values_mut() {
        files.sort();
    }
    categories
}

fn collect_tests(dir: &Path, root: &Path, out: &mut BTreeMap<String, Vec<PathBuf>>) {
    let Ok(entries) = std::fs::read_dir(dir) else {
        tracing::warn!(dir = %dir.display(), "cannot read test directory");
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            if name.ends_with(TEST_SUFFIX) {
                let category = path
                    .parent()
                    .and_then(|p| p.strip_prefix(root).ok())
                    .map(|p| p.to_string_lossy().replace('\\', "/"))
                    .unwrap_or_default();
                out.entry(category).or_default().push(path);
            }
        }
    }
}

fn category_label(category: &str) -> &str {
    if category.is_empty() { "(root)" } else { category }
}

/// List available categories for the given test path.
pub fn list_categories(path: &Path) {
    if path.is_file() {
        eprintln!("(single file, no categories)");
        return;
    }

    let categories = discover_categorized(path);
    if categories.is_empty() {
        eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
        return;
    }

    eprintln!("available categories:");
    for (cat, files) in &categories {
        eprintln!("  {} ({} tests)", category_label(cat), files.len());
    }
}

fn paint(s: &str, code: &str, no_color: bool) -> String {
    if no_color {
        s.to_string()
    } else {
        format!("\x1b[{}m{}\x1b[0m", code, s)
    }
}

/// Keep the categories matching `requested` (a category or any of its parents).
fn filter_categories<'a>(
    all: &'a BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<&'a str, &'a Vec<PathBuf>> {
    if requested.is_empty() {
        return all.iter().map(|(k, v)| (k.as_str(), v)).collect();
    }

    let mut filtered = BTreeMap::new();
    for requested in requested {
        let req = requested.trim_matches('/');
        let before = filtered.len();
        for (cat, files) in all {
            if cat == req || cat.starts_with(&format!("{}/", req)) {
                filtered.insert(cat.as_str(), files);
            }
        }
        if filtered.len() == before {
            eprintln!(
                "warning: category '{}' not found (available: {})",
                req,
                all.keys()
                    .map(|k| category_label(k))
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
    filtered
}

/// Run all `.test.bmx` files under `path` (or a single file).
/// If `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    // Single file mode ignores categories.
    let all_categories = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        discover_categorized(path)
    };

    if all_categories.is_empty() {
        eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
        return 1;
    }

    let run_categories = filter_categories(&all_categories, categories);
    if run_categories.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &run_categories {
        eprintln!();
        eprintln!("{}", paint(category_label(cat), "1", no_color));

        for file in *files {
            let result = run_single_test(file);
            match &result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", paint("PASS", "32", no_color), result.label());
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", paint("FAIL", "31", no_color), result.label());
                    failures.push(result);
                }
            }
        }
    }

    if !failures.is_empty() {
        eprintln!();
        eprintln!("failures:");
        for f in &failures {
            eprintln!();
            eprintln!("  --- {} ---", f.path.display());
            if let TestOutcome::Fail(reason) = &f.outcome {
                for line in reason.lines() {
                    eprintln!("  {}", line);
                }
            }
        }
    }

    eprintln!();
    let failed = failures.len();
    if failed == 0 {
        eprintln!(
            "test result: {}. {} passed, 0 failed",
            paint("ok", "32", no_color),
            passed
        );
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            paint("FAILED", "31", no_color),
            passed,
            failed,
            passed + failed
        );
        1
    }
}
