use std::io::Write;

const PINK: &str = "\x1b[95m";
const DIM: &str = "\x1b[2m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    Info,
    Success,
    Error,
    Warn,
    Found,
    Run,
    Retry,
}

impl Level {
    pub fn tag(&self) -> &str {
        match self {
            Level::Info => "[INF]",
            Level::Success => "[SUC]",
            Level::Error => "[ERR]",
            Level::Warn => "[WAR]",
            Level::Found => "[*]",
            Level::Run => "[>]",
            Level::Retry => "[~]",
        }
    }
}

/// Where progress events and discovered subdomains go. Never consulted for
/// control flow.
pub trait EventSink: Send + Sync {
    fn log(&self, level: Level, message: &str, data: Option<&str>);
    fn result(&self, subdomain: &str);
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl EventSink for NullSink {
    fn log(&self, _level: Level, _message: &str, _data: Option<&str>) {}
    fn result(&self, _subdomain: &str) {}
}

/// Timestamped, colored console output. In silent mode only bare
/// subdomains reach stdout.
#[derive(Debug, Clone)]
pub struct ConsoleReporter {
    silent: bool,
}

impl ConsoleReporter {
    pub fn new(silent: bool) -> Self {
        Self { silent }
    }

    pub fn format_line(level: Level, timestamp: &str, message: &str, data: Option<&str>) -> String {
        let icon = format!("{}{}{}", PINK, level.tag(), RESET);
        match data {
            Some(d) if !d.is_empty() => format!(
                "{DIM}{timestamp}{RESET} {icon} {message} {PINK}{BOLD}{d}{RESET}"
            ),
            _ => format!("{DIM}{timestamp}{RESET} {icon} {message}"),
        }
    }

    pub fn print_banner(&self, version: &str) {
        if self.silent {
            return;
        }
        println!(r#"{PINK}{BOLD}
   _____       _     _    _             _
  / ____|     | |   | |  | |           | |
 | (___  _   _| |__ | |__| |_   _ _ __ | |_ ___ _ __
  \___ \| | | | '_ \|  __  | | | | '_ \| __/ _ \ '__|
  ____) | |_| | |_) | |  | | |_| | | | | ||  __/ |
 |_____/ \__,_|_.__/|_|  |_|\__,_|_| |_|\__\___|_|

  Certificate Transparency Subdomain Enumerator
  Powered by crt.sh | v{version}
{RESET}"#);
    }

    /// Boxed section with aligned `key: value` rows.
    pub fn print_section(&self, title: &str, rows: &[(&str, String)]) {
        if self.silent {
            return;
        }
        let rule = "━".repeat(60);
        println!("{PINK}{rule}{RESET}");
        println!("{PINK}{BOLD}[{title}]{RESET}");
        println!("{PINK}{rule}{RESET}");
        for (key, value) in rows {
            println!("  {:<17} {PINK}{BOLD}{value}{RESET}", format!("{key}:"));
        }
        println!("{PINK}{rule}{RESET}\n");
    }
}

impl EventSink for ConsoleReporter {
    fn log(&self, level: Level, message: &str, data: Option<&str>) {
        if self.silent {
            return;
        }
        let timestamp = chrono::Local::now().format("%H:%M:%S").to_string();
        let line = Self::format_line(level, &timestamp, message, data);
        let mut out = std::io::stdout().lock();
        let _ = writeln!(out, "{}", line);
    }

    fn result(&self, subdomain: &str) {
        let mut out = std::io::stdout().lock();
        let _ = if self.silent {
            writeln!(out, "{}", subdomain)
        } else {
            writeln!(out, "{PINK}[R]{RESET} {}", subdomain)
        };
    }
}
