mod test_runner;
mod vars;

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use clap::{Parser, Subcommand};
use codespan_reporting::diagnostic::Diagnostic;
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream, WriteColor};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use renderer::{Engine, Renderer, TemplateSource, Value};

const SUBCOMMANDS: &[&str] = &["render", "test", "help"];

/// Options whose value is a separate argument, which may look like a
/// subcommand name or start with `-`.
const VALUE_OPTIONS: &[&str] = &["-e", "--inline", "--var", "--vars", "-o", "--output"];

/// Flags that are complete without a subcommand.
const TOP_LEVEL_FLAGS: &[&str] = &["-h", "--help", "-V", "--version", "--no-color", "-v", "--verbose"];

#[derive(Parser)]
#[command(name = "tmpl", version, about = "Render {$variable} templates")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log debug output to stderr (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a template file or inline template
    Render(RenderArgs),

    /// Run .test.tpl golden files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct RenderArgs {
    /// Template file to render
    #[arg(required_unless_present = "inline", conflicts_with = "inline")]
    file: Option<PathBuf>,

    /// Render this template text instead of a file
    #[arg(short = 'e', long, value_name = "TEMPLATE", allow_hyphen_values = true)]
    inline: Option<String>,

    /// Bind a variable (repeatable)
    #[arg(long = "var", value_name = "NAME=VALUE", value_parser = vars::parse_binding)]
    bindings: Vec<(String, Value)>,

    /// Load variables from a TOML file (repeatable, later files win)
    #[arg(long = "vars", value_name = "FILE")]
    var_files: Vec<PathBuf>,

    /// Read and parse only, without rendering
    #[arg(long)]
    check: bool,

    /// Dump parsed segments
    #[arg(long)]
    segments: bool,

    /// List the variables the template references
    #[arg(long)]
    list_vars: bool,

    /// Warn about variables that have no binding
    #[arg(long)]
    warn_missing: bool,

    /// Write the result to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.tpl file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    let args = with_default_subcommand(std::env::args().collect());
    let cli = Cli::parse_from(&args);
    init_logging(cli.verbose, cli.no_color);

    match cli.command {
        Command::Render(render_args) => {
            let color_choice = if cli.no_color {
                ColorChoice::Never
            } else {
                ColorChoice::Auto
            };
            let mut stderr = StandardStream::stderr(color_choice);
            let exit_code = run_render(&render_args, &mut io::stdout().lock(), &mut stderr);
            process::exit(exit_code);
        }
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

/// `tmpl file.tpl` and `tmpl -e '...'` mean `tmpl render ...`.
///
/// `render` is inserted unless the first positional argument is a
/// subcommand. Values of [`VALUE_OPTIONS`] are skipped, so `tmpl -e test`
/// renders the text "test".
fn with_default_subcommand(mut args: Vec<String>) -> Vec<String> {
    let mut i = 1;
    while let Some(arg) = args.get(i) {
        if VALUE_OPTIONS.contains(&arg.as_str()) {
            i += 2;
        } else if arg.starts_with('-') {
            i += 1;
        } else if SUBCOMMANDS.contains(&arg.as_str()) {
            return args;
        } else {
            break;
        }
    }

    let only_top_level = args
        .iter()
        .skip(1)
        .all(|a| TOP_LEVEL_FLAGS.contains(&a.as_str()));
    if !only_top_level {
        args.insert(1, "render".to_string());
    }
    args
}

fn init_logging(verbose: bool, no_color: bool) {
    let level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_ansi(!no_color)
        .with_target(false)
        .init();
}

/// Run the `render` subcommand and return the process exit code.
fn run_render<W: WriteColor>(args: &RenderArgs, stdout: &mut dyn Write, stderr: &mut W) -> i32 {
    let config = term::Config::default();

    let source = match (&args.inline, &args.file) {
        (Some(text), _) => TemplateSource::Inline(text.clone()),
        (None, Some(path)) => TemplateSource::File(path.clone()),
        (None, None) => {
            let _ = writeln!(stderr, "error: no template given");
            return 2;
        }
    };

    let engine = Engine::new();
    let text = match engine.read_source(&source) {
        Ok(text) => text,
        Err(e) => {
            let _ = writeln!(stderr, "error: {}", e);
            return 1;
        }
    };

    // Set up codespan file database
    let mut files = SimpleFiles::new();
    let file_id = files.add(source.name(), text.clone());
    let template = tmpl::Parser::new(text, file_id).parse();

    if args.check {
        let _ = writeln!(stderr, "ok: {} parsed successfully", source.name());
        return 0;
    }

    let listing = if args.segments {
        Some(format!("{:#?}\n", template.segments()))
    } else if args.list_vars {
        Some(
            template
                .variables()
                .iter()
                .map(|name| format!("{}\n", name))
                .collect(),
        )
    } else {
        None
    };
    if let Some(listing) = listing {
        return match stdout.write_all(listing.as_bytes()).and_then(|()| stdout.flush()) {
            Ok(()) => 0,
            Err(e) => {
                let _ = writeln!(stderr, "error: cannot write output: {}", e);
                1
            }
        };
    }

    let vars = match vars::collect(&args.var_files, &args.bindings) {
        Ok(vars) => vars,
        Err(e) => {
            let _ = writeln!(stderr, "error: {}", e);
            return 1;
        }
    };
    debug!(
        template = %source.name(),
        bindings = vars.len(),
        "rendering"
    );

    let (output, warnings) = engine.renderer().render_with_warnings(&template, &vars);
    if args.warn_missing {
        for warning in &warnings {
            emit(stderr, &config, &files, &warning.to_diagnostic());
        }
    }

    let written = match &args.output {
        Some(path) => std::fs::write(path, &output),
        None => write_output(stdout, &output),
    };
    if let Err(e) = written {
        let _ = writeln!(stderr, "error: cannot write output: {}", e);
        return 1;
    }
    0
}

/// Write `output`, ending it with a newline if it lacks one.
fn write_output(out: &mut dyn Write, output: &str) -> io::Result<()> {
    out.write_all(output.as_bytes())?;
    if !output.ends_with('\n') {
        out.write_all(b"\n")?;
    }
    out.flush()
}

fn emit<W: WriteColor>(
    writer: &mut W,
    config: &term::Config,
    files: &SimpleFiles<String, String>,
    diagnostic: &Diagnostic<usize>,
) {
    let _ = term::emit_to_write_style(writer, config, files, diagnostic);
}

#[cfg(test)]
mod tests {
    use super::*;
    use codespan_reporting::term::termcolor::NoColor;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("tmpl")
            .chain(args.iter().copied())
            .map(String::from)
            .collect()
    }

    fn rewritten(args: &[&str]) -> Vec<String> {
        with_default_subcommand(argv(args))
    }

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(rewritten(args))
    }

    fn render_args(args: &[&str]) -> RenderArgs {
        match parse(args).unwrap().command {
            Command::Render(args) => args,
            Command::Test(_) => panic!("expected the render subcommand"),
        }
    }

    /// Exit code, stdout and stderr of a render run.
    fn run(args: &[&str]) -> (i32, String, String) {
        let args = render_args(args);
        let mut stdout = Vec::new();
        let mut stderr = NoColor::new(Vec::new());
        let code = run_render(&args, &mut stdout, &mut stderr);
        (
            code,
            String::from_utf8(stdout).unwrap(),
            String::from_utf8(stderr.into_inner()).unwrap(),
        )
    }

    #[test]
    fn render_is_inserted_before_a_file() {
        assert_eq!(rewritten(&["page.tpl"]), argv(&["render", "page.tpl"]));
        assert_eq!(
            rewritten(&["--var", "x=1", "test.tpl"]),
            argv(&["render", "--var", "x=1", "test.tpl"])
        );
    }

    #[test]
    fn inline_text_is_never_a_subcommand() {
        for text in ["test", "help", "render", "-{$x}"] {
            assert_eq!(
                rewritten(&["-e", text]),
                argv(&["render", "-e", text]),
                "text: {:?}",
                text
            );
        }
        assert_eq!(rewritten(&["-e=-{$x}"]), argv(&["render", "-e=-{$x}"]));
        assert_eq!(render_args(&["-e", "-{$x}"]).inline.as_deref(), Some("-{$x}"));
        assert_eq!(
            rewritten(&["--inline", "help", "-o", "test"]),
            argv(&["render", "--inline", "help", "-o", "test"])
        );
    }

    #[test]
    fn explicit_subcommands_are_kept() {
        let cases: [&[&str]; 4] = [
            &["render", "page.tpl"],
            &["test", "conformance"],
            &["-v", "test", "conformance"],
            &["help"],
        ];
        for args in cases {
            assert_eq!(rewritten(args), argv(args));
        }
    }

    #[test]
    fn top_level_flags_alone_are_kept() {
        assert_eq!(rewritten(&[]), argv(&[]));
        assert_eq!(rewritten(&["--help"]), argv(&["--help"]));
        assert_eq!(rewritten(&["--version"]), argv(&["--version"]));
    }

    #[test]
    fn shorthand_parses_inline_text() {
        let args = render_args(&["-e", "test"]);
        assert_eq!(args.inline.as_deref(), Some("test"));
        assert!(args.file.is_none());

        let args = render_args(&["-e=-{$x}", "--var", "x=1"]);
        assert_eq!(args.inline.as_deref(), Some("-{$x}"));
        assert_eq!(args.bindings, vec![("x".to_string(), Value::Integer(1))]);
    }

    #[test]
    fn file_and_inline_are_exclusive() {
        assert!(parse(&["page.tpl", "-e", "text"]).is_err());
        assert!(parse(&["render"]).is_err());
        assert!(parse(&["render", "--check"]).is_err());
        assert!(render_args(&["page.tpl"]).file.is_some());
    }

    #[test]
    fn renders_inline_with_bindings() {
        let (code, stdout, stderr) = run(&["-e", "Hello {$name}!", "--var", "name=World"]);
        assert_eq!(code, 0);
        assert_eq!(stdout, "Hello World!\n");
        assert!(stderr.is_empty());
    }

    #[test]
    fn inline_text_named_like_a_subcommand_renders() {
        assert_eq!(run(&["-e", "test"]).1, "test\n");
        assert_eq!(run(&["-e", "help"]).1, "help\n");
    }

    #[test]
    fn check_reads_without_rendering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("page.tpl");
        std::fs::write(&path, "{* not a comment {$x}").unwrap();
        let path = path.to_string_lossy().to_string();

        let (code, stdout, stderr) = run(&["--check", path.as_str()]);
        assert_eq!(code, 0);
        assert!(stdout.is_empty());
        assert!(stderr.contains("parsed successfully"));
    }

    #[test]
    fn list_vars_prints_each_name_once() {
        let (code, stdout, _) = run(&["--list-vars", "-e", "{$b} {$a.c} {$b} {$ no}"]);
        assert_eq!(code, 0);
        assert_eq!(stdout, "b\na.c\n");

        let (code, stdout, _) = run(&["--list-vars", "-e", "static"]);
        assert_eq!(code, 0);
        assert_eq!(stdout, "");
    }

    #[test]
    fn warn_missing_reports_on_stderr() {
        let (code, stdout, stderr) = run(&["--warn-missing", "-e", "x={$gone}"]);
        assert_eq!(code, 0);
        assert_eq!(stdout, "x=\n");
        assert!(stderr.contains("`gone`"));

        let (_, _, stderr) = run(&["-e", "x={$gone}"]);
        assert!(stderr.is_empty());
    }

    #[test]
    fn output_file_receives_the_render() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.txt");
        let out_arg = out.to_string_lossy().to_string();

        let (code, stdout, _) = run(&["-e", "{$a}", "--var", "a=7", "-o", out_arg.as_str()]);
        assert_eq!(code, 0);
        assert!(stdout.is_empty());
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "7");
    }

    #[test]
    fn unreadable_inputs_fail() {
        let (code, _, stderr) = run(&["/no/such/page.tpl"]);
        assert_eq!(code, 1);
        assert!(stderr.contains("cannot read template"));

        let (code, _, stderr) = run(&["-e", "{$x}", "--vars", "/no/such/vars.toml"]);
        assert_eq!(code, 1);
        assert!(stderr.contains("/no/such/vars.toml"));
    }
}
