use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use termcolor::{Color, ColorChoice, ColorSpec, StandardStream, WriteColor};

use covenant_core::errors::RpcError;

static JSON_MODE: AtomicBool = AtomicBool::new(false);

pub fn init(json: bool) {
    JSON_MODE.store(json, Ordering::Relaxed);
}

pub fn is_json() -> bool {
    JSON_MODE.load(Ordering::Relaxed)
}

/// Wire-shaped error for command output.
#[derive(Debug, Serialize)]
pub struct ErrorOut {
    pub code: i64,
    pub kind: String,
    pub message: String,
}

impl From<&RpcError> for ErrorOut {
    fn from(e: &RpcError) -> Self {
        Self {
            code: e.code(),
            kind: e.kind.to_string(),
            message: e.message.clone(),
        }
    }
}

pub fn print<T: Serialize>(value: &T) -> anyhow::Result<()> {
    if is_json() {
        let s = serde_json::to_string(value)?;
        println!("{s}");
        return Ok(());
    }
    let s = serde_json::to_string_pretty(value)?;
    println!("{s}");
    Ok(())
}

/// Colored one-line verdict. Suppressed in JSON mode.
pub fn verdict(ok: bool, msg: &str) -> anyhow::Result<()> {
    if is_json() {
        return Ok(());
    }
    let mut out = stdout();
    let (color, label) = if ok { (Color::Green, "ok") } else { (Color::Red, "error") };
    out.set_color(ColorSpec::new().set_fg(Some(color)).set_bold(true))?;
    write!(out, "{label}")?;
    out.reset()?;
    writeln!(out, ": {msg}")?;
    Ok(())
}

pub fn stdout() -> StandardStream {
    StandardStream::stdout(ColorChoice::Auto)
}
