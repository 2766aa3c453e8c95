use std::io::Read;
use std::path::{Path, PathBuf};

use chatmark_editor_core::{FormatAction, Range, apply_action};
use chatmark_markdown::{Parser as MarkupParser, TimestampFormatter, TimestampStyle};
use chatmark_renderer::{
    Clock, NoHighlighting, RenderOptions, Renderer, SyntectRegistry, SystemClock,
};
use miette::{IntoDiagnostic, Result, WrapErr};

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(version, about = "chatmark - render and edit chat markup", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Clock and locale settings shared by the commands that format timestamps.
#[derive(Args)]
struct TimeArgs {
    /// Epoch seconds to treat as "now" (defaults to the system clock)
    #[arg(long, env = "CHATMARK_NOW", allow_negative_numbers = true)]
    now: Option<i64>,

    /// Minutes east of UTC for absolute timestamps
    #[arg(
        long,
        env = "CHATMARK_UTC_OFFSET",
        default_value_t = 0,
        allow_negative_numbers = true
    )]
    utc_offset: i32,

    /// Locale for month and weekday names
    #[arg(long, env = "CHATMARK_LOCALE", default_value = "en_US")]
    locale: String,
}

impl TimeArgs {
    fn now(&self) -> i64 {
        self.now.unwrap_or_else(|| SystemClock.now())
    }

    fn formatter(&self) -> TimestampFormatter {
        TimestampFormatter::from_settings(self.utc_offset, &self.locale)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Render markup to HTML
    Render {
        /// Input file (reads stdin when omitted)
        file: Option<PathBuf>,

        #[command(flatten)]
        time: TimeArgs,

        /// Print the HTML before sanitizing
        #[arg(long)]
        raw: bool,

        /// Render code blocks without syntax highlighting
        #[arg(long)]
        no_highlight: bool,
    },
    /// Print the parsed token stream
    Tokens {
        /// Input file (reads stdin when omitted)
        file: Option<PathBuf>,

        #[command(flatten)]
        time: TimeArgs,
    },
    /// Format an epoch timestamp
    Format {
        #[arg(allow_negative_numbers = true)]
        epoch: i64,

        /// Style code: t, T, d, D, f, F or R
        #[arg(long, default_value = "f")]
        style: TimestampStyle,

        #[command(flatten)]
        time: TimeArgs,
    },
    /// Apply a formatting action to a selection
    Wrap {
        action: ActionKind,

        /// Selection start, in characters
        #[arg(long)]
        start: usize,

        /// Selection end, in characters (defaults to start)
        #[arg(long)]
        end: Option<usize>,

        /// Language for code blocks
        #[arg(long, default_value = "")]
        language: String,

        /// Link target
        #[arg(long, default_value = chatmark_editor_core::URL_PLACEHOLDER)]
        url: String,

        /// Heading level
        #[arg(long, default_value_t = 1)]
        level: u8,

        /// Epoch seconds for inserted timestamps
        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        epoch: i64,

        /// Style code for inserted timestamps
        #[arg(long, default_value = "f")]
        style: TimestampStyle,

        /// Input file (reads stdin when omitted)
        file: Option<PathBuf>,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ActionKind {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Spoiler,
    Code,
    Quote,
    List,
    Heading,
    CodeBlock,
    Link,
    Timestamp,
}

fn main() -> Result<()> {
    init_miette()?;
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            file,
            time,
            raw,
            no_highlight,
        } => {
            let text = read_input(file.as_deref())?;
            tracing::debug!(len = text.len(), raw, no_highlight, "rendering");
            let options = RenderOptions {
                now: Some(time.now()),
                utc_offset_minutes: time.utc_offset,
                locale: time.locale.as_str().into(),
                sanitize: !raw,
            };
            let html = if no_highlight {
                Renderer::new(NoHighlighting)
                    .with_options(options)
                    .render(&text)
            } else {
                Renderer::new(SyntectRegistry::with_all_languages())
                    .with_options(options)
                    .render(&text)
            };
            print!("{html}");
        }
        Commands::Tokens { file, time } => {
            let text = read_input(file.as_deref())?;
            let parser = MarkupParser::new()
                .with_now(time.now())
                .with_formatter(time.formatter());
            for token in parser.parse(&text) {
                println!("{token}");
            }
        }
        Commands::Format { epoch, style, time } => {
            println!("{}", time.formatter().format(epoch, style, time.now()));
        }
        Commands::Wrap {
            action,
            start,
            end,
            language,
            url,
            level,
            epoch,
            style,
            file,
        } => {
            let text = read_input(file.as_deref())?;
            let action = match action {
                ActionKind::Bold => FormatAction::Bold,
                ActionKind::Italic => FormatAction::Italic,
                ActionKind::Underline => FormatAction::Underline,
                ActionKind::Strikethrough => FormatAction::Strikethrough,
                ActionKind::Spoiler => FormatAction::Spoiler,
                ActionKind::Code => FormatAction::InlineCode,
                ActionKind::Quote => FormatAction::Quote,
                ActionKind::List => FormatAction::BulletList,
                ActionKind::Heading => FormatAction::Heading(level),
                ActionKind::CodeBlock => FormatAction::CodeBlock {
                    language: language.into(),
                },
                ActionKind::Link => FormatAction::Link { url: url.into() },
                ActionKind::Timestamp => FormatAction::Timestamp { epoch, style },
            };
            let range = Range::new(start, end.unwrap_or(start));
            let result = apply_action(&text, range, &action);
            println!("{} {}", result.selection.start, result.selection.end);
            print!("{}", result.text);
        }
    }

    Ok(())
}

/// Read `path`, or all of stdin when there is no path.
fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .into_diagnostic()
                .wrap_err("failed to read stdin")?;
            Ok(text)
        }
    }
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();
}

fn init_miette() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .with_cause_chain()
                .color(true)
                .context_lines(5)
                .tab_width(2)
                .break_words(true)
                .build(),
        )
    }))
    .into_diagnostic()
    .wrap_err("couldn't set the miette hook")?;
    miette::set_panic_hook();
    Ok(())
}
