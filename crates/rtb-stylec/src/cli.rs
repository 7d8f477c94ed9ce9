//! Argument parsing and the compile pipeline.

use std::io::{self, Write};
use std::path::{Path, PathBuf};

use clap::Parser;
use rtb_style::embed::{AssetManifest, DEFAULT_LINE_WRAP, EmbedOptions, embed_assets};
use rtb_style::emit::{DEFAULT_VAR_NAME, EmitOptions, emit};
use rtb_style::watch::StylesheetWatcher;
use rtb_style::{Error, Result, Stylesheet};

/// Compile a rutabaga stylesheet into C style tables.
#[derive(Parser, Debug, Clone, PartialEq, Eq)]
#[command(name = "rtb-stylec", version, about, long_about = None)]
pub struct Cli {
    /// Stylesheet to compile; `-` or nothing reads stdin.
    pub input: Option<PathBuf>,

    /// Write the generated C here instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Name of the emitted `struct rtb_style` array.
    #[arg(long, value_name = "NAME", default_value = DEFAULT_VAR_NAME)]
    pub var_name: String,

    /// Directory for generated asset headers [default: the output's directory].
    #[arg(long, value_name = "DIR")]
    pub embed_dir: Option<PathBuf>,

    /// Storage qualifier for embedded data arrays.
    #[arg(long, value_name = "PREFIX", default_value = "static")]
    pub variable_prefix: String,

    /// Width of hex lines in generated headers.
    #[arg(long, value_name = "COLUMNS", default_value_t = DEFAULT_LINE_WRAP)]
    pub line_wrap: usize,

    /// Do not generate asset headers or include lines.
    #[arg(long)]
    pub no_embed: bool,

    /// Leave asset includes to the surrounding translation unit.
    #[arg(long)]
    pub forward_declared: bool,

    /// Recompile whenever the input changes.
    #[arg(long, requires = "input")]
    pub watch: bool,

    /// More logging (repeat for more).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Input file, or `None` for stdin.
    pub fn input_path(&self) -> Option<&Path> {
        self.input.as_deref().filter(|p| *p != Path::new("-"))
    }

    /// Name used for the input in diagnostics.
    pub fn input_name(&self) -> String {
        self.input_path()
            .map_or_else(|| "<stdin>".to_string(), |p| p.display().to_string())
    }

    fn embed_options(&self) -> Result<EmbedOptions> {
        let c_dir = self
            .output
            .as_deref()
            .and_then(parent_dir)
            .unwrap_or_else(|| PathBuf::from("."));
        let base_dir = self
            .input_path()
            .and_then(parent_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        let options = EmbedOptions::new(self.embed_dir.clone().unwrap_or_else(|| c_dir.clone()))
            .with_base_dir(base_dir)
            .with_line_wrap(self.line_wrap)
            .with_variable_prefix(self.variable_prefix.as_str());

        // Quoted includes resolve against the including file, so headers
        // outside the C file's directory need a path from there.
        let Some(embed_dir) = &self.embed_dir else {
            return Ok(options);
        };
        let embed_dir = absolute(embed_dir)?;
        let include_dir = match embed_dir.strip_prefix(absolute(&c_dir)?) {
            Ok(relative) if relative.as_os_str().is_empty() => return Ok(options),
            Ok(relative) if self.output.is_some() => relative.to_path_buf(),
            _ => embed_dir,
        };

        Ok(options.with_include_dir(include_dir))
    }

    fn emit_options(&self) -> EmitOptions {
        EmitOptions::new()
            .with_var_name(self.var_name.as_str())
            .forward_declared(self.forward_declared || self.no_embed)
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|e| Error::io(path, e))
}

fn parent_dir(path: &Path) -> Option<PathBuf> {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

/// Parse, embed and emit once.
pub fn compile(cli: &Cli) -> Result<()> {
    let sheet = match cli.input_path() {
        Some(path) => Stylesheet::from_file(path)?,
        None => {
            let css = io::read_to_string(io::stdin()).map_err(|e| Error::io("<stdin>", e))?;
            Stylesheet::from_css(&css)?
        }
    };

    let manifest = if cli.no_embed {
        AssetManifest::new()
    } else {
        embed_assets(&sheet, &cli.embed_options()?)?
    };

    let source = emit(&sheet, &manifest, &cli.emit_options());

    match &cli.output {
        Some(path) => std::fs::write(path, source).map_err(|e| Error::io(path, e))?,
        None => io::stdout()
            .write_all(source.as_bytes())
            .map_err(|e| Error::io("<stdout>", e))?,
    }

    tracing::info!(input = %cli.input_name(), styles = sheet.len(), "compiled");
    Ok(())
}

/// Print an error the way compilers do: one `file:line:column: message`
/// line per diagnostic.
pub fn report(cli: &Cli, error: &Error) {
    let diagnostics = error.diagnostics();
    if diagnostics.is_empty() {
        eprintln!("error: {}", error);
        return;
    }

    let name = cli.input_name();
    for diagnostic in diagnostics {
        eprintln!("{}:{}: {}", name, diagnostic.location(), diagnostic.message);
    }
}

/// Compile, then keep recompiling on every change to the input.
pub fn watch(cli: &Cli) -> Result<()> {
    let Some(path) = cli.input_path() else {
        return Err(Error::Watch("--watch needs an input file".to_string()));
    };

    if let Err(e) = compile(cli) {
        report(cli, &e);
    }

    let mut watcher = StylesheetWatcher::new()?;
    watcher.watch(path)?;

    loop {
        let changes = watcher.wait();
        if changes.is_empty() {
            return Err(Error::Watch("file watcher stopped".to_string()));
        }

        watcher.apply_changes(&changes, |_| {
            compile(cli).inspect_err(|e| report(cli, e))
        });
    }
}
