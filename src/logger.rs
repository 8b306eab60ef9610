use chrono::Utc;
use colored::*;
use once_cell::sync::Lazy;
use regex::Regex;
use std::io::{ self, Write };
use std::sync::atomic::{ AtomicBool, Ordering };

static DEBUG_MODE: AtomicBool = AtomicBool::new(false);

// Signatures first: the address pattern would otherwise swallow the first
// 44 characters of an 88-character signature.
static SIGNATURE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([1-9A-HJ-NP-Za-km-z]{80,90})").unwrap()
});
static ADDRESS_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([1-9A-HJ-NP-Za-km-z]{32,44})").unwrap()
});

/// Enable or disable debug-level output for the whole process.
pub fn set_debug_mode(enabled: bool) {
    DEBUG_MODE.store(enabled, Ordering::Relaxed);
}

pub fn is_debug_mode() -> bool {
    DEBUG_MODE.load(Ordering::Relaxed)
}

pub struct Logger;

impl Logger {
    // Basic log levels with proper formatting
    pub fn info(message: &str) {
        let timestamp = Self::get_timestamp();
        println!("{} {} {}", "ℹ".blue().bold(), format!("[{}]", timestamp).dimmed(), message);
        io::stdout().flush().unwrap();
    }

    pub fn warn(message: &str) {
        let timestamp = Self::get_timestamp();
        println!(
            "{} {} {}",
            "⚠".yellow().bold(),
            format!("[{}]", timestamp).dimmed(),
            message.yellow()
        );
        io::stdout().flush().unwrap();
    }

    pub fn error(message: &str) {
        let timestamp = Self::get_timestamp();
        println!("{} {} {}", "❌".red().bold(), format!("[{}]", timestamp).dimmed(), message.red());
        io::stdout().flush().unwrap();
    }

    /// Only printed when debug mode is enabled (--debug or config).
    pub fn debug(message: &str) {
        if !is_debug_mode() {
            return;
        }
        let timestamp = Self::get_timestamp();
        println!(
            "{} {} {}",
            "🐛".purple().bold(),
            format!("[{}]", timestamp).dimmed(),
            message.dimmed()
        );
        io::stdout().flush().unwrap();
    }

    pub fn success(message: &str) {
        let timestamp = Self::get_timestamp();
        println!(
            "{} {} {}",
            "✅".green().bold(),
            format!("[{}]", timestamp).dimmed(),
            message.green()
        );
        io::stdout().flush().unwrap();
    }

    // Specialized category loggers with enhanced formatting
    pub fn monitor(message: &str) {
        let timestamp = Self::get_timestamp();
        println!(
            "{} {} {} {}",
            "📡".cyan().bold(),
            "MONITOR".cyan().bold(),
            format!("[{}]", timestamp).dimmed(),
            Self::format_message(message)
        );
        io::stdout().flush().unwrap();
    }

    pub fn rpc(message: &str) {
        let timestamp = Self::get_timestamp();
        println!(
            "{} {} {} {}",
            "🌐".bright_green().bold(),
            "RPC".bright_green().bold(),
            format!("[{}]", timestamp).dimmed(),
            Self::format_message(message)
        );
        io::stdout().flush().unwrap();
    }

    pub fn database(message: &str) {
        let timestamp = Self::get_timestamp();
        println!(
            "{} {} {} {}",
            "🗄️".bright_blue().bold(),
            "DATABASE".bright_blue().bold(),
            format!("[{}]", timestamp).dimmed(),
            Self::format_message(message)
        );
        io::stdout().flush().unwrap();
    }

    pub fn pool(message: &str) {
        let timestamp = Self::get_timestamp();
        println!(
            "{} {} {} {}",
            "💧".bright_cyan().bold(),
            "POOL".bright_cyan().bold(),
            format!("[{}]", timestamp).dimmed(),
            Self::format_message(message)
        );
        io::stdout().flush().unwrap();
    }

    pub fn header(title: &str) {
        println!();
        println!(
            "{} {} {}",
            "🚀".green().bold(),
            "PoolTracker".green().bold(),
            format!("- {}", title).bright_white().bold()
        );
        println!("{}", "─".repeat(50).dimmed());
        io::stdout().flush().unwrap();
    }

    pub fn separator() {
        println!("{}", "─".repeat(50).dimmed());
        io::stdout().flush().unwrap();
    }

    pub fn print_key_value(key: &str, value: &str) {
        println!("  {} {}", format!("{}:", key).dimmed(), value.bright_white().bold());
    }

    // Shorten base58 addresses and signatures so log lines stay readable
    fn format_message(message: &str) -> String {
        let formatted = SIGNATURE_RE.replace_all(message, |caps: &regex::Captures| {
            let sig = &caps[1];
            format!(
                "{}...{}",
                sig[..12].bright_yellow().bold(),
                sig[sig.len() - 8..].bright_yellow().bold()
            )
        });

        ADDRESS_RE.replace_all(&formatted, |caps: &regex::Captures| {
            let addr = &caps[1];
            format!(
                "{}...{}",
                addr[..8].bright_cyan().bold(),
                addr[addr.len() - 4..].bright_cyan().bold()
            )
        }).to_string()
    }

    fn get_timestamp() -> String {
        Utc::now().format("%H:%M:%S").to_string()
    }
}
