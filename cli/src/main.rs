mod test_runner;

use std::path::Path;
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use quasi::{Argument, Context, Session, TemplateError};

const SUBCOMMANDS: &[&str] = &["render", "test", "help"];

/// Options whose value is the following argument.
const VALUE_FLAGS: &[&str] = &["-c", "--context", "--category"];

#[derive(Parser)]
#[command(name = "quasi", version, about = "Build syntax trees from code templates")]
struct Cli {
    /// Disable colored error output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log template compilation and splicing to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render one template and print the resulting code
    Render(RenderArgs),

    /// Run .test.toml template cases
    Test(TestArgs),
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Template text; `%s`/`%d` mark slots, `%%` is a literal percent
    template: String,

    /// Syntactic position to render for: statement, expression or type
    #[arg(short, long, default_value = "statement")]
    context: Context,

    /// Print the syntax tree instead of the code
    #[arg(long)]
    tree: bool,

    /// Slot arguments (after --): integers, `@code` fragments, `@:type`
    /// fragments, `?` (absent), `?@code` (present optional) or literal text
    #[arg(last = true)]
    args: Vec<String>,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.toml file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    let args = with_implicit_render(std::env::args().collect());
    let cli = Cli::parse_from(&args);
    init_logging(cli.verbose);

    match cli.command {
        Command::Render(render_args) => do_render(render_args, cli.no_color),
        Command::Test(test_args) => {
            let path = Path::new(&test_args.path);
            if test_args.list_categories {
                test_runner::list_categories(path);
                return;
            }
            let exit_code = test_runner::run_tests(path, cli.no_color, &test_args.category);
            process::exit(exit_code);
        }
    }
}

/// If the first positional arg is not a known subcommand, inject "render"
/// so `quasi 'f(%s)' -- x` works like `quasi render 'f(%s)' -- x`.
/// The subcommand goes right after the program name: global flags are
/// accepted after it, and render's own options must follow it.
fn with_implicit_render(mut args: Vec<String>) -> Vec<String> {
    if first_positional(&args).is_some_and(|pos| !SUBCOMMANDS.contains(&args[pos].as_str())) {
        args.insert(1, "render".to_string());
    }
    args
}

/// Index of the first positional argument, skipping option values.
fn first_positional(args: &[String]) -> Option<usize> {
    let mut i = 1;
    while let Some(arg) = args.get(i) {
        if arg == "--" {
            return None;
        }
        if !arg.starts_with('-') {
            return Some(i);
        }
        if VALUE_FLAGS.contains(&arg.as_str()) {
            i += 1;
        }
        i += 1;
    }
    None
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "quasi=debug" } else { "quasi=warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn do_render(args: RenderArgs, no_color: bool) {
    let session = Session::new("<template>", 0);

    let arguments: Result<Vec<Argument>, TemplateError> =
        args.args.iter().map(|s| parse_arg(&session, s)).collect();
    let result = arguments.and_then(|arguments| {
        quasi::render(&session, args.template.as_str(), &arguments, &args.context)
    });

    match result {
        Ok(node) if args.tree => print!("{}", node.dump()),
        Ok(node) => println!("{}", node),
        Err(error) => {
            emit_template_error(&error, &session, no_color);
            process::exit(1);
        }
    }
}

/// Print a render failure through codespan-reporting. Parse errors point
/// into the composed source, registered under the session's file id.
fn emit_template_error(error: &TemplateError, session: &Session, no_color: bool) {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };
    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();

    // SimpleFiles numbers from 0, matching the session `do_render` creates.
    let mut files = SimpleFiles::new();
    if let TemplateError::Parse { source_text, .. } = error {
        files.add(session.name().to_string(), source_text.clone());
    }
    let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &error.to_diagnostic());
}

/// Parse a command-line argument into a template Argument.
/// Integers become `Int`; `@`-prefixed text is parsed into a fragment.
fn parse_arg(session: &Session, s: &str) -> Result<Argument, TemplateError> {
    if let Ok(n) = s.parse::<i64>() {
        return Ok(Argument::Int(n));
    }
    if s == "?" {
        return Ok(Argument::Optional(None));
    }
    if let Some(code) = s.strip_prefix("?@") {
        return parse_fragment(session, code).map(|node| Argument::Optional(Some(node)));
    }
    if let Some(code) = s.strip_prefix('@') {
        return parse_fragment(session, code).map(Argument::Fragment);
    }
    Ok(Argument::Str(s.to_string()))
}

/// `:`-prefixed code is a type, anything else a statement.
fn parse_fragment(session: &Session, code: &str) -> Result<quasi::SyntaxNode, TemplateError> {
    match code.strip_prefix(':') {
        Some(ty) => quasi::fragment(session, ty, &Context::TYPE),
        None => quasi::fragment(session, code, &Context::STATEMENT),
    }
}
