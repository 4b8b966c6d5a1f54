//! `jscarve` — carve a balanced expression out of a JavaScript file.
//!
//! Usage:
//!
//! ```text
//! jscarve [--brace|--paren|--bracket] <file.js> <anchor>
//! ```
//!
//! Finds the first occurrence of `<anchor>` in the file and prints the
//! balanced `{…}` / `(…)` / `[…]` expression that follows it.  Defaults
//! to `--brace`.  On failure the error is printed to stderr and the
//! process exits non-zero.

use std::env;
use std::fs;
use std::process::ExitCode;

use jscarve_core::extract::{DelimiterKind, match_to_closing};

fn usage() -> &'static str {
    "usage: jscarve [--brace|--paren|--bracket] <file.js> <anchor>"
}

fn run() -> Result<(), String> {
    let mut args = env::args().skip(1);

    let mut kind = DelimiterKind::Brace;
    let mut positional = Vec::new();
    for arg in &mut args {
        match arg.as_str() {
            "--brace" => kind = DelimiterKind::Brace,
            "--paren" => kind = DelimiterKind::Paren,
            "--bracket" => kind = DelimiterKind::Bracket,
            "--help" | "-h" => {
                println!("{}", usage());
                return Ok(());
            }
            other if other.starts_with("--") => {
                return Err(format!("unknown option `{other}`\n{}", usage()));
            }
            _ => positional.push(arg),
        }
    }

    let [path, anchor] = positional.as_slice() else {
        return Err(usage().to_owned());
    };

    let source =
        fs::read_to_string(path).map_err(|e| format!("cannot read {path}: {e}"))?;
    let carved = match_to_closing(&source, anchor, kind).map_err(|e| e.to_string())?;
    println!("{carved}");
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(msg) => {
            eprintln!("jscarve: {msg}");
            ExitCode::FAILURE
        }
    }
}
