//! Human-readable messages. Everything except errors is silenced by
//! `SRCTRL_QUIET`.

use crate::output::is_quiet;
use crate::ui::{theme, Icons};
use owo_colors::OwoColorize;

pub fn header(icon: &str, text: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", icon, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}", Icons::CHECK, label.style(theme().success.clone()));
}

pub fn error(label: &str) {
    eprintln!("{} {}", Icons::CROSS, label.style(theme().error.clone()));
}

pub fn warn(label: &str) {
    if is_quiet() {
        return;
    }
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn info(label: &str, value: &str) {
    if is_quiet() {
        return;
    }
    println!("{} {}: {}", Icons::INFO, label.style(theme().label.clone()), value);
}

/// Print a block of text as is (tables, listings)
pub fn block(text: &str) {
    if is_quiet() || text.is_empty() {
        return;
    }
    println!("{}", text);
}

/// Style a node or edge type name
pub fn kind(text: &str) -> String {
    text.style(theme().kind.clone()).to_string()
}

pub fn muted(text: &str) -> String {
    text.style(theme().muted.clone()).to_string()
}
