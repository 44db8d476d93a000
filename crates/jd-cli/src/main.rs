//! Command-line interface for diffing and patching JSON/YAML documents.
//!
//! Mirrors the upstream Go `jd` tool's invocation shape: `jd [OPTION]...
//! FILE1 [FILE2]`, with a second file argument falling back to stdin, `-p`
//! switching FILE1 from "a document" to "a diff to apply", and `-set`/
//! `-mset`/`-setkeys`/`-yaml` selecting the comparison semantics and I/O
//! format.

use std::ffi::OsString;
use std::fs;
use std::io::{self, Read, Write};
use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{ArgAction, Parser};
use jd_core::{ArrayMode, DiffOptions, Node, RenderConfig};

const VERSION_BANNER: &str = concat!("jd version ", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Parser)]
#[command(
    name = "jd",
    about = "Diff and patch JSON and YAML documents.",
    version = VERSION_BANNER,
    disable_help_subcommand = true,
    disable_version_flag = true,
    arg_required_else_help = false,
)]
struct Cli {
    /// Print version information and exit.
    #[arg(
        long = "version",
        action = ArgAction::SetTrue,
        help = "Print version information and exit.",
    )]
    version: bool,

    /// Patch mode: FILE1 is a diff, applied to FILE2 (or stdin).
    #[arg(short = 'p', long = "patch", action = ArgAction::SetTrue)]
    patch: bool,

    /// Write output here instead of stdout.
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    output: Option<PathBuf>,

    /// Treat arrays as sets.
    #[arg(long = "set", action = ArgAction::SetTrue)]
    set: bool,

    /// Treat arrays as multisets.
    #[arg(long = "mset", action = ArgAction::SetTrue)]
    mset: bool,

    /// Comma-separated identity keys for set elements.
    #[arg(long = "setkeys", value_name = "KEYS")]
    setkeys: Option<String>,

    /// Read and write YAML instead of JSON.
    #[arg(long = "yaml", action = ArgAction::SetTrue)]
    yaml: bool,

    /// Serve the web UI on this port, if one is bundled.
    #[arg(long = "port", value_name = "N")]
    port: Option<u16>,

    /// Enable debug-level logging on stderr (also controlled by RUST_LOG).
    #[arg(short = 'v', long = "verbose", action = ArgAction::SetTrue)]
    verbose: bool,

    /// FILE1 [FILE2].
    #[arg(value_name = "FILE", num_args = 0..=2)]
    files: Vec<PathBuf>,
}

fn main() {
    if let Err(err) = try_main() {
        let _ = writeln!(io::stderr(), "{err:#}");
        std::process::exit(1);
    }
}

fn try_main() -> Result<()> {
    let args = canonicalize_args(std::env::args_os());
    let cli = Cli::parse_from(args);
    init_tracing(cli.verbose);

    if cli.version {
        println!("{VERSION_BANNER}");
        return Ok(());
    }

    if let Some(port) = cli.port {
        return serve_web_ui(port);
    }

    if cli.patch {
        run_patch(&cli)
    } else {
        run_diff(&cli)
    }
}

fn run_diff(cli: &Cli) -> Result<()> {
    let options = build_options(cli)?;
    let (lhs_text, rhs_text) = read_inputs(cli)?;
    let lhs = parse_node(&lhs_text, cli.yaml).context("parsing FILE1")?;
    let rhs = parse_node(&rhs_text, cli.yaml).context("parsing FILE2")?;
    let diff = lhs.diff(&rhs, &options);
    write_output(cli, &diff.render(&RenderConfig::default()))
}

fn run_patch(cli: &Cli) -> Result<()> {
    let (diff_text, doc_text) = read_inputs(cli)?;
    let diff = jd_core::parse_diff_str(&diff_text).context("parsing diff in FILE1")?;
    let base = parse_node(&doc_text, cli.yaml).context("parsing FILE2")?;
    let patched = base.apply_patch(&diff).context("applying patch")?;
    write_output(cli, &render_node(&patched, cli.yaml)?)
}

fn build_options(cli: &Cli) -> Result<DiffOptions> {
    let mut options = DiffOptions::default();
    if cli.mset {
        options = options
            .with_array_mode(ArrayMode::MultiSet)
            .context("enabling -mset array mode")?;
    } else if cli.set {
        options =
            options.with_array_mode(ArrayMode::Set).context("enabling -set array mode")?;
    }
    if let Some(keys) = &cli.setkeys {
        let keys: Vec<&str> = keys.split(',').map(str::trim).collect();
        options = options.with_set_keys(keys).context("parsing -setkeys")?;
    }
    Ok(options)
}

fn read_inputs(cli: &Cli) -> Result<(String, String)> {
    let first_path = cli.files.first().context("missing FILE1 argument")?;
    let first = fs::read_to_string(first_path)
        .with_context(|| format!("reading {}", first_path.display()))?;
    let second = match cli.files.get(1) {
        Some(path) => {
            fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?
        }
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).context("reading stdin")?;
            buf
        }
    };
    Ok((first, second))
}

fn parse_node(text: &str, yaml: bool) -> Result<Node> {
    if yaml {
        Ok(Node::from_yaml_str(text)?)
    } else {
        Ok(Node::from_json_str(text)?)
    }
}

fn render_node(node: &Node, yaml: bool) -> Result<String> {
    let value = node.to_json_value().context("cannot render an absent value")?;
    if yaml {
        Ok(serde_yaml::to_string(&value)?)
    } else {
        Ok(serde_json::to_string_pretty(&value)?)
    }
}

fn write_output(cli: &Cli, text: &str) -> Result<()> {
    match &cli.output {
        Some(path) => fs::write(path, text).with_context(|| format!("writing {}", path.display())),
        None => {
            print!("{text}");
            if !text.is_empty() && !text.ends_with('\n') {
                println!();
            }
            Ok(())
        }
    }
}

/// Mirrors `original_source/web/serve/plugin.go`'s nil-by-default `Handle`
/// hook: the web UI is an optional, swappable collaborator, not a required
/// dependency of this binary.
fn serve_web_ui(port: u16) -> Result<()> {
    let assets_dir = PathBuf::from("web/dist");
    if assets_dir.is_dir() {
        bail!(
            "found web UI assets at {} but serving them is not implemented in this build (port {port})",
            assets_dir.display()
        );
    }
    println!("the web UI is not bundled in this build; ignoring -port {port}");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(io::stderr).try_init();
}

fn canonicalize_args<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut canonicalized = Vec::new();
    for (idx, arg) in args.into_iter().enumerate() {
        if idx == 0 {
            canonicalized.push(arg);
            continue;
        }
        match arg.to_str() {
            Some("-help") => canonicalized.push(OsString::from("--help")),
            Some("-version") => canonicalized.push(OsString::from("--version")),
            Some("-set") => canonicalized.push(OsString::from("--set")),
            Some("-mset") => canonicalized.push(OsString::from("--mset")),
            Some("-setkeys") => canonicalized.push(OsString::from("--setkeys")),
            Some("-yaml") => canonicalized.push(OsString::from("--yaml")),
            Some("-port") => canonicalized.push(OsString::from("--port")),
            Some("-verbose") => canonicalized.push(OsString::from("--verbose")),
            _ => canonicalized.push(arg),
        }
    }
    canonicalized
}

#[cfg(test)]
mod tests {
    use super::canonicalize_args;
    use std::ffi::OsString;

    #[test]
    fn canonicalizes_single_dash_variants() {
        let input = vec![
            OsString::from("jd"),
            OsString::from("-help"),
            OsString::from("-version"),
            OsString::from("-set"),
            OsString::from("-mset"),
            OsString::from("-setkeys"),
            OsString::from("-yaml"),
            OsString::from("-port"),
            OsString::from("--other"),
        ];
        let canonicalized = canonicalize_args(input.clone());
        assert_eq!(canonicalized[0], "jd");
        assert_eq!(canonicalized[1], "--help");
        assert_eq!(canonicalized[2], "--version");
        assert_eq!(canonicalized[3], "--set");
        assert_eq!(canonicalized[4], "--mset");
        assert_eq!(canonicalized[5], "--setkeys");
        assert_eq!(canonicalized[6], "--yaml");
        assert_eq!(canonicalized[7], "--port");
        assert_eq!(canonicalized[8], "--other");
    }

    #[test]
    fn short_flags_pass_through_unchanged() {
        let input = vec![OsString::from("jd"), OsString::from("-p"), OsString::from("-o")];
        let canonicalized = canonicalize_args(input.clone());
        assert_eq!(canonicalized, input);
    }
}
