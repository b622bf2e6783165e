use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use srcreport_core::output_formats;
use std::io::{self, Write};

pub fn print_structured<T: Serialize>(data: &T, format: &str) -> Result<()> {
    let content = match format.to_lowercase().as_str() {
        "yaml" | "yml" => output_formats::serialize_to_yaml(data)?,
        _ => output_formats::serialize_to_json(data, true)?,
    };
    write_to_stdout(&content)
}

pub fn print_heading(title: &str) {
    println!("{}", format!("\n--- {} ---", title).green().bold().underline());
}

pub fn print_path_list(title: &str, paths: &[String]) {
    print_heading(title);
    if paths.is_empty() {
        println!("{}", "(None)".dimmed());
    } else {
        paths.iter().for_each(|p| println!("- {}", p.cyan()));
    }
}

fn write_to_stdout(content: &str) -> Result<()> {
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    handle
        .write_all(content.as_bytes())
        .context("Failed to write to stdout")?;
    if !content.ends_with('\n') {
        handle
            .write_all(b"\n")
            .context("Failed to write newline to stdout")?;
    }
    handle.flush().context("Failed to flush stdout")?;
    Ok(())
}
