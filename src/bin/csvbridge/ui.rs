use indicatif::{ProgressBar, ProgressStyle};
use nu_ansi_term::{Color, Style};
use std::fmt::Display;
use std::io::{IsTerminal, Write};
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Theme {
    Auto,
    Light,
    Dark,
    Plain,
}

#[derive(Clone, Copy)]
enum Tone {
    Info,
    Success,
    Warn,
}

/// Console presentation for the menu and the subcommands.
///
/// Colour is only used when stdout is a terminal; `quiet` drops icons,
/// headings and spinners but never the data itself.
pub struct Ui {
    palette: Palette,
    paint: bool,
    quiet: bool,
}

impl Ui {
    pub fn new(theme: Theme, quiet: bool) -> Self {
        let paint = theme != Theme::Plain && !quiet && std::io::stdout().is_terminal();

        #[cfg(windows)]
        if paint {
            let _ = nu_ansi_term::enable_ansi_support();
        }

        Self {
            palette: Palette::for_theme(theme),
            paint,
            quiet,
        }
    }

    /// Aligned `key: value` block under a heading.
    pub fn section<'a, I, V>(&self, title: &str, rows: I)
    where
        I: IntoIterator<Item = (&'a str, V)>,
        V: Display,
    {
        let rows: Vec<(&str, String)> = rows
            .into_iter()
            .map(|(key, value)| (key, value.to_string()))
            .collect();
        if rows.is_empty() {
            return;
        }

        self.heading(title);
        let width = rows.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
        for (key, value) in rows {
            let key = format!("{key:>width$}:");
            println!("  {} {}", self.paint(self.palette.key, key), value);
        }
    }

    /// Numbered menu entries, `1. label`.
    pub fn menu(&self, title: &str, entries: &[&str]) {
        println!();
        self.heading(title);
        for (idx, entry) in entries.iter().enumerate() {
            let number = format!("{}.", idx + 1);
            println!("{} {entry}", self.paint(self.palette.accent, number));
        }
    }

    /// Prints `text` without a newline and flushes so input lands after it.
    pub fn prompt(&self, text: &str) {
        print!("{}", self.paint(self.palette.key, text));
        let _ = std::io::stdout().flush();
    }

    /// A bare output line, unaffected by theme or quiet mode.
    pub fn line(&self, text: impl Display) {
        println!("{text}");
    }

    pub fn info(&self, message: &str) {
        self.notice(Tone::Info, message);
    }

    pub fn success(&self, message: &str) {
        self.notice(Tone::Success, message);
    }

    pub fn warn(&self, message: &str) {
        self.notice(Tone::Warn, message);
    }

    /// Spinner on stderr for an operation that may block for a while.
    pub fn task(&self, label: impl Into<String>) -> TaskGuard<'_> {
        let label = label.into();
        let pb = (!self.quiet).then(|| {
            let style = ProgressStyle::with_template("{spinner} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏");
            let pb = ProgressBar::new_spinner().with_style(style);
            pb.set_message(label.clone());
            pb.enable_steady_tick(Duration::from_millis(120));
            pb
        });
        TaskGuard {
            ui: self,
            label,
            start: Instant::now(),
            finished: false,
            pb,
        }
    }

    fn notice(&self, tone: Tone, message: &str) {
        let (icon, style) = match tone {
            Tone::Info => ("ℹ", self.palette.info),
            Tone::Success => ("✔", self.palette.success),
            Tone::Warn => ("⚠", self.palette.warn),
        };
        let line = if self.quiet {
            message.to_string()
        } else {
            format!("{} {message}", self.paint(style, icon))
        };
        match tone {
            Tone::Warn => eprintln!("{line}"),
            Tone::Info | Tone::Success => println!("{line}"),
        }
    }

    fn heading(&self, title: &str) {
        if self.quiet {
            println!("{title}");
        } else {
            println!("{}", self.paint(self.palette.heading, format!("▸ {title}")));
        }
    }

    fn paint(&self, style: Style, text: impl Into<String>) -> String {
        let text = text.into();
        if self.paint {
            style.paint(text).to_string()
        } else {
            text
        }
    }
}

pub struct TaskGuard<'a> {
    ui: &'a Ui,
    label: String,
    start: Instant,
    finished: bool,
    pb: Option<ProgressBar>,
}

impl TaskGuard<'_> {
    pub fn finish(mut self) -> Duration {
        self.finished = true;
        if let Some(pb) = self.pb.take() {
            pb.finish_and_clear();
        }
        self.start.elapsed()
    }
}

impl Drop for TaskGuard<'_> {
    fn drop(&mut self) {
        if self.finished {
            return;
        }
        let message = format!(
            "{} interrupted after {}",
            self.label,
            format_duration(self.start.elapsed())
        );
        match self.pb.take() {
            Some(pb) => pb.abandon_with_message(message),
            None => self.ui.warn(&message),
        }
    }
}

pub fn format_duration(duration: Duration) -> String {
    if duration.as_secs_f64() >= 1.0 {
        format!("{:.2}s", duration.as_secs_f64())
    } else {
        format!("{:.0}ms", duration.as_secs_f64() * 1_000.0)
    }
}

#[derive(Clone, Copy)]
struct Palette {
    heading: Style,
    key: Style,
    accent: Style,
    info: Style,
    success: Style,
    warn: Style,
}

impl Palette {
    fn for_theme(theme: Theme) -> Self {
        match theme {
            Theme::Plain => Self {
                heading: Style::new(),
                key: Style::new(),
                accent: Style::new(),
                info: Style::new(),
                success: Style::new(),
                warn: Style::new(),
            },
            Theme::Light => Self {
                heading: Style::new().fg(Color::Blue).bold(),
                key: Style::new().fg(Color::Black).bold(),
                accent: Style::new().fg(Color::Blue),
                info: Style::new().fg(Color::Purple),
                success: Style::new().fg(Color::Green).bold(),
                warn: Style::new().fg(Color::Red).bold(),
            },
            Theme::Dark | Theme::Auto => Self {
                heading: Style::new().fg(Color::Purple).bold(),
                key: Style::new().fg(Color::LightBlue).bold(),
                accent: Style::new().fg(Color::LightBlue),
                info: Style::new().fg(Color::LightCyan),
                success: Style::new().fg(Color::LightGreen).bold(),
                warn: Style::new().fg(Color::Yellow).bold(),
            },
        }
    }
}
