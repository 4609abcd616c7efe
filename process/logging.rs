use std::{
    fs::OpenOptions,
    io::{BufRead, BufReader, Result, Write as IoWrite},
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Stdio},
    sync::{LazyLock, OnceLock},
    thread,
    time::Duration,
};

use bon::Builder;
use chrono::Local;
use colored::{control::ShouldColorize, ColoredString, Colorize};
use flokkr_utils::{constants::LOG_DIR as DEFAULT_LOG_DIR, home_dir};
use indicatif::{MultiProgress, ProgressBar};
use indicatif_log_bridge::LogWrapper;
use log::{warn, Level, LevelFilter, Record};
use log4rs::{
    append::{
        console::{ConsoleAppender, Target},
        rolling_file::{
            policy::compound::{
                roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger, CompoundPolicy,
            },
            RollingFileAppender,
        },
    },
    config::{Appender, Root},
    encode::{pattern::PatternEncoder, Encode, Write},
    Config, Logger as L4RSLogger,
};
use miette::{IntoDiagnostic, WrapErr};
use nu_ansi_term::Color;
use private::Private;
use rand::Rng;

mod private {
    pub trait Private {}
}

impl Private for Command {}

static MULTI_PROGRESS: LazyLock<MultiProgress> = LazyLock::new(MultiProgress::new);
static LOG_DIR: OnceLock<PathBuf> = OnceLock::new();

#[derive(Debug, Clone)]
pub struct Logger {
    modules: Vec<(String, LevelFilter)>,
    level: LevelFilter,
    log_dir: Option<PathBuf>,
}

impl Logger {
    const TRIGGER_FILE_SIZE: u64 = 10 * 1024;
    const ARCHIVE_FILENAME_PATTERN: &'static str = "flokkr.{}.log";
    const LOG_FILENAME: &'static str = "flokkr.log";
    const LOG_FILE_COUNT: u32 = 4;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter_modules<I, S>(&mut self, filter_modules: I) -> &mut Self
    where
        I: IntoIterator<Item = (S, LevelFilter)>,
        S: AsRef<str>,
    {
        self.modules = filter_modules
            .into_iter()
            .map(|(module, level)| (module.as_ref().to_string(), level))
            .collect::<Vec<_>>();
        self
    }

    pub const fn filter_level(&mut self, filter_level: LevelFilter) -> &mut Self {
        self.level = filter_level;
        self
    }

    pub fn log_out_dir<P>(&mut self, path: Option<P>) -> &mut Self
    where
        P: AsRef<Path>,
    {
        self.log_dir = path.map(|p| p.as_ref().to_path_buf());
        self
    }

    /// Initializes logging for the application.
    ///
    /// Logs go to stderr and to a rolling file in the log dir.
    /// When the log dir can't be created only stderr is used.
    ///
    /// # Errors
    /// Will error if the logger was already initialized.
    pub fn init(&self) -> miette::Result<()> {
        let log_dir = self.log_dir.clone().unwrap_or_else(|| {
            home_dir()
                .unwrap_or_default()
                .join(DEFAULT_LOG_DIR)
        });
        let log_dir = LOG_DIR.get_or_init(|| log_dir);

        let log_out_path = log_dir.join(Self::LOG_FILENAME);
        let log_archive_pattern =
            format!("{}/{}", log_dir.display(), Self::ARCHIVE_FILENAME_PATTERN);

        let stderr = ConsoleAppender::builder()
            .encoder(Box::new(
                CustomPatternEncoder::builder()
                    .filter_modules(self.modules.clone())
                    .build(),
            ))
            .target(Target::Stderr)
            .tty_only(true)
            .build();

        let config =
            Config::builder().appender(Appender::builder().build("stderr", Box::new(stderr)));
        let mut root = Root::builder().appender("stderr");

        let file_appender = FixedWindowRoller::builder()
            .build(&log_archive_pattern, Self::LOG_FILE_COUNT)
            .and_then(|window_roller| {
                Ok(RollingFileAppender::builder()
                    .encoder(Box::new(PatternEncoder::new("{d} - {l} - {m}{n}")))
                    .build(
                        log_out_path,
                        Box::new(CompoundPolicy::new(
                            Box::new(SizeTrigger::new(Self::TRIGGER_FILE_SIZE)),
                            Box::new(window_roller),
                        )),
                    )?)
            });

        let config = match file_appender {
            Err(e) => {
                eprintln!("Cannot create logs directory:\n{e}");
                config
            }
            Ok(file_appender) => {
                root = root.appender("file");
                config.appender(Appender::builder().build("file", Box::new(file_appender)))
            }
        }
        .build(root.build(self.level))
        .into_diagnostic()
        .wrap_err("Failed to configure logging")?;

        LogWrapper::new(MULTI_PROGRESS.clone(), L4RSLogger::new(config))
            .try_init()
            .into_diagnostic()
            .wrap_err("Failed to initialize logging")
    }

    pub fn multi_progress() -> MultiProgress {
        MULTI_PROGRESS.clone()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self {
            modules: vec![],
            level: LevelFilter::Info,
            log_dir: None,
        }
    }
}

trait ColoredLevel {
    fn colored(&self) -> ColoredString;
}

impl ColoredLevel for Level {
    fn colored(&self) -> ColoredString {
        match self {
            Self::Error => Self::Error.as_str().red(),
            Self::Warn => Self::Warn.as_str().yellow(),
            Self::Info => Self::Info.as_str().green(),
            Self::Debug => Self::Debug.as_str().blue(),
            Self::Trace => Self::Trace.as_str().cyan(),
        }
    }
}

pub trait CommandLogging: Private {
    /// Prints each line of stdout/stderr prefixed with an image ref
    /// under a progress spinner, and copies it to a per image log
    /// file in the log dir.
    ///
    /// # Errors
    /// Will error if there was an issue executing the process.
    fn build_status<T, U>(self, image_ref: T, message: U) -> Result<ExitStatus>
    where
        T: AsRef<str>,
        U: AsRef<str>;
}

impl CommandLogging for Command {
    fn build_status<T, U>(self, image_ref: T, message: U) -> Result<ExitStatus>
    where
        T: AsRef<str>,
        U: AsRef<str>,
    {
        fn inner(mut command: Command, image_ref: &str, message: &str) -> Result<ExitStatus> {
            let ansi_color = gen_random_ansi_color();
            let name = color_str(image_ref, ansi_color);
            let short_name = color_str(shorten_name(image_ref), ansi_color);
            let (reader, writer) = os_pipe::pipe()?;

            command
                .stdout(writer.try_clone()?)
                .stderr(writer)
                .stdin(Stdio::null());

            let progress = Logger::multi_progress()
                .add(ProgressBar::new_spinner().with_message(format!("{message} {name}")));
            progress.enable_steady_tick(Duration::from_millis(100));

            let mut child = command.spawn()?;

            // The command holds the write end of the pipe,
            // the reader only sees EOF once it is gone.
            drop(command);

            let reader = BufReader::new(reader);
            let log_file_path = LOG_DIR
                .get()
                .map(|dir| dir.join(format!("{}.log", image_ref.replace(['/', ':', '.'], "_"))));
            let log_file = log_file_path.as_ref().and_then(|path| {
                OpenOptions::new()
                    .create(true)
                    .append(true)
                    .open(path)
                    .inspect_err(|e| warn!("Failed to open build log {}: {e}", path.display()))
                    .ok()
            });

            let printer = thread::spawn(move || {
                let mp = Logger::multi_progress();
                for line in reader.lines().map_while(|line| line.ok()) {
                    let text = format!("{log_prefix} {line}", log_prefix = log_header(&short_name));
                    if mp.is_hidden() || mp.println(&text).is_err() {
                        eprintln!("{text}");
                    }
                    if let Some(mut file) = log_file.as_ref() {
                        if let Err(e) = writeln!(file, "{line}") {
                            warn!("Failed to write to build log: {e}");
                        }
                    }
                }
            });

            let status = child.wait()?;
            if printer.join().is_err() {
                warn!("Output of {image_ref} was cut short");
            }

            progress.finish();
            Logger::multi_progress().remove(&progress);

            Ok(status)
        }
        inner(self, image_ref.as_ref(), message.as_ref())
    }
}

#[derive(Debug, Builder)]
struct CustomPatternEncoder {
    #[builder(default, into)]
    filter_modules: Vec<(String, LevelFilter)>,
}

impl Encode for CustomPatternEncoder {
    fn encode(&self, w: &mut dyn Write, record: &Record) -> anyhow::Result<()> {
        if record.module_path().is_some_and(|mp| {
            self.filter_modules
                .iter()
                .any(|(module, level)| mp.contains(module) && *level <= record.level())
        }) {
            return Ok(());
        }

        let prefix = match log::max_level() {
            LevelFilter::Off => return Ok(()),
            LevelFilter::Error | LevelFilter::Warn | LevelFilter::Info => log_header(format!(
                "{level:width$}",
                level = record.level().colored(),
                width = 5,
            )),
            LevelFilter::Debug => log_header(format!(
                "{level:>width$}",
                level = record.level().colored(),
                width = 5,
            )),
            LevelFilter::Trace => log_header(format!(
                "{level:width$} {module}:{line}",
                level = record.level().colored(),
                width = 5,
                module = record.module_path().unwrap_or_default().bright_yellow(),
                line = record
                    .line()
                    .map_or_else(String::new, |l| l.to_string())
                    .bright_green(),
            )),
        };

        Ok(writeln!(w, "{prefix} {args}", args = record.args())?)
    }
}

/// Used to keep the style of logs consistent between
/// normal log use and command output.
fn log_header<T>(text: T) -> String
where
    T: AsRef<str>,
{
    fn inner(text: &str) -> String {
        match log::max_level() {
            LevelFilter::Error | LevelFilter::Warn | LevelFilter::Info => {
                format!("{text} {sep}", sep = "=>".bold())
            }
            LevelFilter::Debug | LevelFilter::Trace => format!(
                "[{time} {text}] {sep}",
                time = Local::now().format("%H:%M:%S"),
                sep = "=>".bold(),
            ),
            LevelFilter::Off => String::new(),
        }
    }
    inner(text.as_ref())
}

/// Shortens the image name so that it won't take up the
/// entire width of the terminal.
///
/// # Examples
/// `flokkr/hadoop:3.2.1` -> `f/hadoop:3.2.1`
/// `registry.example.com/flokkr/spark:build` -> `r.e.c/f/spark:build`
#[must_use]
fn shorten_name<T>(text: T) -> String
where
    T: AsRef<str>,
{
    let text = text.as_ref();

    let (path, tag) = match text.rsplit_once(':') {
        Some((path, tag)) if !tag.contains('/') => (path, Some(tag)),
        _ => (text, None),
    };

    let path_parts = path.split('/').collect::<Vec<_>>();
    let last = path_parts.len() - 1;

    let joined_path = path_parts
        .iter()
        .enumerate()
        .map(|(i, part)| {
            if i < last {
                part.split('.')
                    .filter_map(|p| p.chars().next())
                    .map(String::from)
                    .collect::<Vec<_>>()
                    .join(".")
            } else {
                (*part).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("/");

    match tag {
        Some(t) => format!("{joined_path}:{t}"),
        None => joined_path,
    }
}

#[must_use]
pub fn gen_random_ansi_color() -> u8 {
    // ANSI extended color range
    // https://www.ditig.com/publications/256-colors-cheat-sheet
    const LOW_END: u8 = 21; // Blue1 #0000ff
    const HIGH_END: u8 = 230; // Cornsilk1 #ffffd7

    rand::rng().random_range(LOW_END..=HIGH_END)
}

pub fn color_str<T>(text: T, ansi_color: u8) -> String
where
    T: AsRef<str>,
{
    if ShouldColorize::from_env().should_colorize() {
        Color::Fixed(ansi_color)
            .paint(text.as_ref().to_string())
            .to_string()
    } else {
        text.as_ref().to_string()
    }
}
