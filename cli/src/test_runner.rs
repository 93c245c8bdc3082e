use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::debug;

use quasi::{Argument, Context, Session, SyntaxKind, SyntaxNode};

const TEST_SUFFIX: &str = ".test.toml";

#[derive(Debug, Deserialize)]
pub struct TestConfig {
    /// Human-readable test description.
    #[serde(default)]
    pub description: Option<String>,

    /// Template text, with `%s`/`%d` slots.
    pub template: String,

    /// Render context name. Defaults to "statement".
    #[serde(default = "default_context")]
    pub context: String,

    /// Slot arguments: strings, integers, or tables (see `toml_arg_to_argument`).
    #[serde(default)]
    pub args: Vec<toml::Value>,

    /// Expected exact text of the rendered node.
    #[serde(default)]
    pub expect_text: Option<String>,

    /// Expected kind of the rendered node, e.g. "Call".
    #[serde(default)]
    pub expect_kind: Option<String>,

    /// Expected render error; its Display string must contain this substring.
    #[serde(default)]
    pub expect_error: Option<String>,
}

fn default_context() -> String {
    "statement".to_string()
}

/// Build an argument from a TOML value.
///
/// Strings are literal text and integers are `Int`. Tables select a fragment
/// form: `{ fragment = "a + b", context = "expression" }`, `{ absent = true }`,
/// `{ optional = "x" }`, `{ sequence = ["a", "b"], separator = " + " }` and
/// `{ arguments_of = "bar(a, b)" }`, the last taking the argument nodes of the
/// first call in the code. Parsed trees that must outlive the call (the call
/// owning `arguments_of` nodes) are pushed onto `keep`.
fn toml_arg_to_argument(
    session: &Session,
    val: &toml::Value,
    keep: &mut Vec<SyntaxNode>,
) -> Result<Argument, String> {
    let table = match val {
        toml::Value::Integer(n) => return Ok(Argument::Int(*n)),
        toml::Value::String(s) => return Ok(Argument::Str(s.clone())),
        toml::Value::Table(table) => table,
        other => return Err(format!("unsupported argument `{}`", other)),
    };

    let context = match table.get("context").and_then(|v| v.as_str()) {
        Some(name) => name.parse::<Context>()?,
        None => Context::STATEMENT,
    };
    let parse = |code: &str| quasi::fragment(session, code, &context).map_err(|e| e.to_string());
    let separator = table
        .get("separator")
        .and_then(|v| v.as_str())
        .unwrap_or(quasi::DEFAULT_SEPARATOR);

    if let Some(code) = table.get("fragment").and_then(|v| v.as_str()) {
        return parse(code).map(Argument::Fragment);
    }
    if table.get("absent").and_then(|v| v.as_bool()) == Some(true) {
        return Ok(Argument::Optional(None));
    }
    if let Some(code) = table.get("optional").and_then(|v| v.as_str()) {
        return parse(code).map(|node| Argument::Optional(Some(node)));
    }
    if let Some(items) = table.get("sequence").and_then(|v| v.as_array()) {
        let nodes = items
            .iter()
            .map(|item| match item.as_str() {
                Some(code) => parse(code),
                None => Err(format!("sequence element `{}` is not a string", item)),
            })
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Argument::sequence_with(nodes, separator));
    }
    if let Some(code) = table.get("arguments_of").and_then(|v| v.as_str()) {
        let tree = parse(code)?;
        let call = tree
            .descendants()
            .into_iter()
            .find(|node| node.kind() == SyntaxKind::Call)
            .ok_or_else(|| format!("`{}` contains no call", code))?;
        let nodes = call
            .child_of_kind(SyntaxKind::ArgList)
            .map(|list| list.child_nodes())
            .unwrap_or_default();
        keep.push(tree);
        return Ok(Argument::sequence_with(nodes, separator));
    }

    Err(format!("unrecognized argument table `{}`", val))
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
    let mut result = TestResult {
        path: path.to_path_buf(),
        description: None,
        outcome: TestOutcome::Pass,
    };

    let config = match std::fs::read_to_string(path)
        .map_err(|e| format!("cannot read file: {}", e))
        .and_then(|content| {
            toml::from_str::<TestConfig>(&content).map_err(|e| format!("TOML parse error: {}", e))
        }) {
        Ok(config) => config,
        Err(reason) => {
            result.outcome = TestOutcome::Fail(reason);
            return result;
        }
    };

    result.description = config.description.clone();
    debug!(path = %path.display(), template = %config.template, "running case");
    if let Some(reason) = check_case(&config) {
        result.outcome = TestOutcome::Fail(reason);
    }
    result
}

/// Render one case and compare against its expectations. Returns `Some(reason)` on mismatch.
fn check_case(config: &TestConfig) -> Option<String> {
    let session = Session::default();

    let context = match config.context.parse::<Context>() {
        Ok(context) => context,
        Err(e) => return Some(e),
    };

    let mut keep = Vec::new();
    let arguments = match config
        .args
        .iter()
        .map(|arg| toml_arg_to_argument(&session, arg, &mut keep))
        .collect::<Result<Vec<_>, _>>()
    {
        Ok(arguments) => arguments,
        Err(e) => return Some(format!("bad argument: {}", e)),
    };

    let rendered = quasi::render(&session, config.template.as_str(), &arguments, &context);

    match (&config.expect_error, rendered) {
        (Some(expected_err), Err(err)) => {
            let err_str = err.to_string();
            (!err_str.contains(expected_err.as_str())).then(|| {
                format!("expected error containing \"{}\", got: {}", expected_err, err_str)
            })
        }
        (Some(expected_err), Ok(node)) => Some(format!(
            "expected error containing \"{}\", but rendering produced `{}`",
            expected_err, node
        )),
        (None, Err(err)) => Some(format!("unexpected render error: {}", err)),
        (None, Ok(node)) => check_node(config, &node),
    }
}

fn check_node(config: &TestConfig, node: &SyntaxNode) -> Option<String> {
    if let Some(expected) = &config.expect_text {
        let actual = node.text();
        if actual != *expected {
            return Some(format!(
                "text mismatch\n  expected: {}\n  actual:   {}",
                expected, actual
            ));
        }
    }
    if let Some(expected) = &config.expect_kind {
        let actual = node.kind().to_string();
        if actual != *expected {
            return Some(format!("expected a {} node, got {}", expected, actual));
        }
    }
    if node.parent().is_some() {
        return Some("rendered node still has a parent".into());
    }
    None
}

/// Discover `.test.toml` files grouped by category (subfolder relative to root).
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
        return;
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            collect_tests(&path, root, out);
        } else if path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|name| name.ends_with(TEST_SUFFIX))
        {
            let category = path
                .parent()
                .and_then(|p| p.strip_prefix(root).ok())
                .map(|p| p.to_string_lossy().replace('\\', "/"))
                .unwrap_or_default();
            out.entry(category).or_default().push(path);
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

/// Keep the categories named in `requested`, including their subcategories.
fn select_categories(
    all: BTreeMap<String, Vec<PathBuf>>,
    requested: &[String],
) -> BTreeMap<String, Vec<PathBuf>> {
    if requested.is_empty() {
        return all;
    }

    for req in requested {
        let req = req.trim_matches('/');
        if !all.keys().any(|cat| in_category(cat, req)) {
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

    all.into_iter()
        .filter(|(cat, _)| requested.iter().any(|req| in_category(cat, req.trim_matches('/'))))
        .collect()
}

fn in_category(category: &str, requested: &str) -> bool {
    category == requested
        || category
            .strip_prefix(requested)
            .is_some_and(|rest| rest.starts_with('/'))
}

struct Style {
    no_color: bool,
}

impl Style {
    fn paint(&self, s: &str, code: &str) -> String {
        if self.no_color {
            s.to_string()
        } else {
            format!("\x1b[{}m{}\x1b[0m", code, s)
        }
    }

    fn pass(&self) -> String {
        self.paint("PASS", "32")
    }

    fn fail(&self) -> String {
        self.paint("FAIL", "31")
    }

    fn bold(&self, s: &str) -> String {
        self.paint(s, "1")
    }
}

/// Run all `.test.toml` files under `path` (or a single file).
/// If `categories` is non-empty, only run tests in those categories.
/// Returns exit code: 0 = all pass, 1 = any failure.
pub fn run_tests(path: &Path, no_color: bool, categories: &[String]) -> i32 {
    let style = Style { no_color };

    // A single file runs as its own uncategorized group.
    let groups = if path.is_file() {
        BTreeMap::from([(String::new(), vec![path.to_path_buf()])])
    } else {
        let all = discover_categorized(path);
        if all.is_empty() {
            eprintln!("no {} files found in {}", TEST_SUFFIX, path.display());
            return 1;
        }
        select_categories(all, categories)
    };

    if groups.is_empty() {
        eprintln!("no matching categories found");
        return 1;
    }

    let mut passed = 0usize;
    let mut failures: Vec<TestResult> = Vec::new();

    for (cat, files) in &groups {
        if !path.is_file() {
            eprintln!();
            eprintln!("{}", style.bold(category_label(cat)));
        }

        for file in files {
            let result = run_single_test(file);
            match result.outcome {
                TestOutcome::Pass => {
                    passed += 1;
                    eprintln!("  {}  {}", style.pass(), result.label());
                }
                TestOutcome::Fail(_) => {
                    eprintln!("  {}  {}", style.fail(), result.label());
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
    if failures.is_empty() {
        eprintln!("test result: {}. {} passed, 0 failed", style.paint("ok", "32"), passed);
        0
    } else {
        eprintln!(
            "test result: {}. {} passed, {} failed (of {})",
            style.paint("FAILED", "31"),
            passed,
            failures.len(),
            passed + failures.len()
        );
        1
    }
}
