//! JSON output: report serialization, atomic file writes and timing stamps.

use serde::Serialize;
use serde_json::{json, Value};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Serialize an item to a JSON string.
pub fn to_json<T: Serialize>(item: &T, pretty: bool) -> Result<String, serde_json::Error> {
    if pretty {
        serde_json::to_string_pretty(item)
    } else {
        serde_json::to_string(item)
    }
}

/// Write one JSON document followed by a newline.
pub fn write_json<W: Write, T: Serialize>(mut writer: W, item: &T, pretty: bool) -> io::Result<()> {
    if pretty {
        serde_json::to_writer_pretty(&mut writer, item).map_err(io::Error::other)?;
    } else {
        serde_json::to_writer(&mut writer, item).map_err(io::Error::other)?;
    }
    writeln!(writer)?;
    writer.flush()
}

/// Write a JSON document to `path` atomically.
///
/// The document goes to a sibling temporary file first and is renamed into
/// place, so readers never see a half-written report.
pub fn write_report<T: Serialize>(path: &Path, item: &T, pretty: bool) -> io::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let tmp = temp_sibling(path);
    let result = std::fs::File::create(&tmp)
        .and_then(|file| write_json(io::BufWriter::new(file), item, pretty))
        .and_then(|()| std::fs::rename(&tmp, path));

    if result.is_err() {
        let _ = std::fs::remove_file(&tmp);
    }
    result
}

fn temp_sibling(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "report".into());
    name.push(format!(".{}.tmp", std::process::id()));
    path.with_file_name(name)
}

/// Format a duration as seconds with two decimals, e.g. `"12.34s"`.
pub fn format_duration(duration: Duration) -> String {
    format!("{:.2}s", duration.as_secs_f64())
}

/// Stamp a provider response with how long the call took.
///
/// Adds `_timing.api_call_duration_seconds` and
/// `_timing.api_call_duration_formatted`. Non-object bodies are left alone.
pub fn attach_timing(body: &mut Value, duration: Duration) {
    if let Value::Object(map) = body {
        let seconds = (duration.as_secs_f64() * 100.0).round() / 100.0;
        map.insert(
            "_timing".to_string(),
            json!({
                "api_call_duration_seconds": seconds,
                "api_call_duration_formatted": format_duration(duration),
            }),
        );
    }
}
