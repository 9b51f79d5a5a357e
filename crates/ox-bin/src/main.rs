//! oxsay entrypoint.
use anyhow::{Context, Result, bail};
use clap::Parser;
use core_config::{Config, ViewportContext, load_from};
use core_render::{
    AttributeMode, BalloonStyle, InfoLevel, RenderOptions, TruncateFrom, render,
};
use core_text::segment::normalize_message;
use std::io::{IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Once;
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;

/// CLI arguments.
#[derive(Parser, Debug)]
#[command(name = "oxsay", version, about = "Figure art with a speech balloon")]
struct Args {
    /// Art template to render.
    pub template: PathBuf,
    /// Message words; read from stdin when omitted.
    pub message: Vec<String>,
    /// Balloon style file (`key:value` lines). Defaults to the built-in say style.
    #[arg(long = "balloon", short = 'b')]
    pub balloon: Option<PathBuf>,
    /// Use the built-in thought balloon.
    #[arg(long = "think", conflicts_with = "balloon")]
    pub think: bool,
    /// Wrap column (overrides `[wrap] column`).
    #[arg(long = "wrap", short = 'W')]
    pub wrap: Option<usize>,
    /// Viewport width; 0 disables width clipping. Defaults to the terminal width.
    #[arg(long = "width")]
    pub width: Option<u16>,
    /// Viewport height; 0 disables height clipping. Defaults to the terminal height.
    #[arg(long = "height")]
    pub height: Option<u16>,
    /// Which lines the height limit drops: `bottom` or `top`.
    #[arg(long = "truncate-from")]
    pub truncate_from: Option<String>,
    /// Glyph appended where a word is split.
    #[arg(long = "hyphen")]
    pub hyphen: Option<String>,
    /// Template metadata: 0 strips it, 1 or 2 keep it.
    #[arg(long = "info-level", value_parser = clap::value_parser!(u8).range(0..=2))]
    pub info_level: Option<u8>,
    /// Strip every escape sequence from the output.
    #[arg(long = "plain")]
    pub plain: bool,
    /// Optional configuration file path (overrides discovery of `oxsay.toml`).
    #[arg(long = "config")]
    pub config: Option<PathBuf>,
    /// Write logs to this file instead of stderr.
    #[arg(long = "log-file")]
    pub log_file: Option<PathBuf>,
}

struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn configure_logging(&mut self, log_file: Option<&Path>) -> Result<()> {
        let filter = tracing_subscriber::EnvFilter::from_default_env();
        let Some(path) = log_file else {
            // Global subscriber may already be installed; keep going either way.
            let _ = tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .try_init();
            return Ok(());
        };

        let dir = match path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir,
            _ => Path::new("."),
        };
        let name = path
            .file_name()
            .with_context(|| format!("log file path {} has no file name", path.display()))?;
        let file_appender = tracing_appender::rolling::never(dir, name);
        let (nb_writer, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(nb_writer)
            .try_init()
        {
            Ok(_) => {
                self.log_guard = Some(guard);
            }
            Err(_err) => {
                // Global tracing subscriber already installed; drop guard so writer shuts down.
            }
        }
        Ok(())
    }

    fn install_panic_hook() {
        static HOOK: Once = Once::new();
        HOOK.call_once(|| {
            let default_panic = std::panic::take_hook();
            std::panic::set_hook(Box::new(move |info| {
                tracing::error!(target: "runtime.panic", ?info, "panic");
                default_panic(info);
            }));
        });
    }
}

/// Terminal size, with explicit flags taking precedence.
fn viewport_context(args: &Args) -> ViewportContext {
    let (columns, rows) = crossterm::terminal::size().unwrap_or((0, 0));
    ViewportContext::new(args.width.unwrap_or(columns), args.height.unwrap_or(rows))
}

fn load_style(args: &Args) -> Result<BalloonStyle> {
    if let Some(path) = &args.balloon {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading balloon style {}", path.display()))?;
        return BalloonStyle::parse(&text)
            .with_context(|| format!("parsing balloon style {}", path.display()));
    }
    Ok(if args.think {
        BalloonStyle::think()
    } else {
        BalloonStyle::say()
    })
}

/// Merge config file values with command-line overrides.
fn render_options(args: &Args, config: &Config, ctx: ViewportContext) -> Result<RenderOptions> {
    let file = &config.file;
    let attribute_mode = if args.plain {
        AttributeMode::Plain
    } else {
        file.output
            .attribute_mode
            .parse()
            .context("[output] attribute_mode")?
    };
    let truncate_from: TruncateFrom = args
        .truncate_from
        .as_deref()
        .unwrap_or(&file.output.truncate_from)
        .parse()
        .context("truncate-from")?;
    Ok(RenderOptions {
        wrap_column: args
            .wrap
            .or(config.effective_wrap_column.map(usize::from)),
        viewport_width: ctx.width(),
        viewport_height: ctx.height(),
        truncate_from,
        balloon_style: Some(load_style(args)?),
        hyphen: args.hyphen.clone().unwrap_or_else(|| file.wrap.hyphen.clone()),
        link_color: file.colors.link.clone(),
        balloon_color: file.colors.balloon.clone(),
        attribute_mode,
        wrap_limit: file.wrap.limit,
        wrap_exceed: file.wrap.exceed,
        tab_width: file.wrap.tab_width,
        info_level: InfoLevel::from_level(args.info_level.unwrap_or(file.output.info_level)),
        ..RenderOptions::default()
    })
}

fn read_message(args: &Args) -> Result<String> {
    if !args.message.is_empty() {
        return Ok(args.message.join(" "));
    }
    let mut stdin = std::io::stdin();
    if stdin.is_terminal() {
        bail!("no message given and stdin is a terminal");
    }
    let mut message = String::new();
    stdin
        .read_to_string(&mut message)
        .context("reading message from stdin")?;
    // one trailing newline belongs to the input, not the message
    if message.ends_with('\n') {
        message.pop();
    }
    Ok(message)
}

fn run(args: Args) -> Result<()> {
    let mut config = load_from(args.config.clone())?;
    let ctx = viewport_context(&args);
    config.apply_context(ctx);
    let opts = render_options(&args, &config, ctx)?;

    let template = std::fs::read_to_string(&args.template)
        .with_context(|| format!("reading template {}", args.template.display()))?;
    let message = normalize_message(&read_message(&args)?);
    info!(
        target: "runtime",
        template_bytes = template.len(),
        message_bytes = message.len(),
        viewport_columns = ctx.columns,
        viewport_rows = ctx.rows,
        config = config.source.is_some(),
        "render_start"
    );

    let out = render(&template, &message, &opts)
        .with_context(|| format!("rendering {}", args.template.display()))?;
    if let Some(diagnostics) = &out.diagnostics {
        warn!(
            target: "runtime",
            count = diagnostics.lines().count(),
            "render_diagnostics"
        );
        for line in diagnostics.lines() {
            eprintln!("oxsay: {line}");
        }
    }

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(out.text.as_bytes())?;
    if !out.text.ends_with('\n') {
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let mut startup = AppStartup::new();
    startup.configure_logging(args.log_file.as_deref())?;
    AppStartup::install_panic_hook();
    info!(target: "runtime", "startup");

    let result = run(args);
    if let Err(e) = &result {
        tracing::error!(target: "runtime", error = %e, "render_failed");
    }
    info!(target: "runtime", ok = result.is_ok(), "shutdown");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_config::ConfigFile;
    use std::io::Write as _;

    fn parse(argv: &[&str]) -> Args {
        Args::try_parse_from(argv.iter().copied()).expect("valid arguments")
    }

    #[test]
    fn message_words_joined() {
        let args = parse(&["oxsay", "cow.txt", "hello", "there"]);
        assert_eq!(args.template, PathBuf::from("cow.txt"));
        assert_eq!(read_message(&args).unwrap(), "hello there");
    }

    #[test]
    fn think_conflicts_with_balloon_file() {
        assert!(Args::try_parse_from(["oxsay", "t", "--think", "--balloon", "b"]).is_err());
        assert!(Args::try_parse_from(["oxsay", "t", "--info-level", "3"]).is_err());
    }

    #[test]
    fn config_values_flow_into_options() {
        let mut config = Config::default();
        config.file.wrap.hyphen = "~".into();
        config.file.colors.balloon = "\u{1b}[34m".into();
        config.file.output.info_level = 1;
        config.effective_wrap_column = Some(30);
        let args = parse(&["oxsay", "t", "--think"]);
        let opts = render_options(&args, &config, ViewportContext::new(80, 0)).unwrap();
        assert_eq!(opts.wrap_column, Some(30));
        assert_eq!(opts.viewport_width, Some(80));
        assert_eq!(opts.viewport_height, None);
        assert_eq!(opts.hyphen, "~");
        assert_eq!(opts.balloon_color, "\u{1b}[34m");
        assert_eq!(opts.info_level, InfoLevel::Verbatim);
        assert_eq!(opts.balloon_style, Some(BalloonStyle::think()));
    }

    #[test]
    fn flags_override_config() {
        let config = Config {
            file: ConfigFile::default(),
            effective_wrap_column: Some(30),
            ..Config::default()
        };
        let args = parse(&[
            "oxsay", "t", "--wrap", "12", "--plain", "--truncate-from", "top", "--hyphen", "+",
        ]);
        let opts = render_options(&args, &config, ViewportContext::default()).unwrap();
        assert_eq!(opts.wrap_column, Some(12));
        assert_eq!(opts.attribute_mode, AttributeMode::Plain);
        assert_eq!(opts.truncate_from, TruncateFrom::Top);
        assert_eq!(opts.hyphen, "+");
    }

    #[test]
    fn bad_config_values_are_errors() {
        let mut config = Config::default();
        config.file.output.attribute_mode = "sparkly".into();
        let args = parse(&["oxsay", "t"]);
        let err = render_options(&args, &config, ViewportContext::default()).unwrap_err();
        assert!(format!("{err:#}").contains("sparkly"));
    }

    #[test]
    fn balloon_style_file_loaded() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        let style = "\\:o\n/:o\nX:o\nww:[\nee:]\nnww:[\nw:[\nsww:[\nnee:]\ne:]\nsee:]\n\
                     nw:.\nnnw:\nn:-\nnne:\nne:.\nsw:'\nssw:\ns:-\nsse:\nse:'\n";
        tmp.write_all(style.as_bytes()).unwrap();
        let path = tmp.path().to_str().unwrap().to_string();
        let args = parse(&["oxsay", "t", "--balloon", &path]);
        let loaded = load_style(&args).unwrap();
        assert_eq!(loaded.west.single, "[");
        assert_eq!(loaded.north[0].fill, "-");
        assert_eq!(loaded.min_width(), 2);
    }
}
