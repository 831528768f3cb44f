//! Console messages for commands and sessions

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tone {
    Info,
    Warn,
    Error,
    Success,
}

impl Tone {
    fn label(self) -> &'static str {
        match self {
            Tone::Info => "\x1b[1;36m[INFO]\x1b[0m",
            Tone::Warn => "\x1b[1;33m[WARN]\x1b[0m",
            Tone::Error => "\x1b[1;31m[ERROR]\x1b[0m",
            Tone::Success => "\x1b[1;32m[SUCCESS]\x1b[0m",
        }
    }
}

pub fn format_line(tone: Tone, title: &str, details: &str) -> String {
    if details.is_empty() {
        format!("{} {}", tone.label(), title)
    } else {
        format!("{} {}\t {}", tone.label(), title, details)
    }
}

/// Errors go to stderr so scripted use can still parse stdout.
pub fn print_line(tone: Tone, title: &str, details: &str) {
    let line = format_line(tone, title, details);
    if tone == Tone::Error {
        eprintln!("{}", line);
    } else {
        println!("{}", line);
    }
}

pub fn print_block(lines: &[String]) {
    for line in lines {
        println!("  {}", line);
    }
}

#[macro_export]
macro_rules! print_cmd_info {
    ($title:expr) => {
        $crate::messages::print_line($crate::messages::Tone::Info, $title, "")
    };
    ($title:expr, $($details:tt)*) => {
        $crate::messages::print_line($crate::messages::Tone::Info, $title, &format!($($details)*))
    };
}

#[macro_export]
macro_rules! print_cmd_warn {
    ($title:expr, $($details:tt)*) => {
        $crate::messages::print_line($crate::messages::Tone::Warn, $title, &format!($($details)*))
    };
}

#[macro_export]
macro_rules! print_cmd_error {
    ($title:expr) => {
        $crate::messages::print_line($crate::messages::Tone::Error, $title, "")
    };
    ($title:expr, $($details:tt)*) => {
        $crate::messages::print_line($crate::messages::Tone::Error, $title, &format!($($details)*))
    };
}

#[macro_export]
macro_rules! print_cmd_success {
    ($title:expr) => {
        $crate::messages::print_line($crate::messages::Tone::Success, $title, "")
    };
    ($title:expr, $($details:tt)*) => {
        $crate::messages::print_line($crate::messages::Tone::Success, $title, &format!($($details)*))
    };
}
