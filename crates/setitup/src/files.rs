// Copyright (c) Contributors to the setitup project.
// SPDX-License-Identifier: Apache-2.0

//! File effects of overwrite and update steps.

use std::path::Path;

use crate::{Error, Result};

#[cfg(test)]
#[path = "./files_test.rs"]
mod files_test;

fn create_parent(target: &Path) -> Result<()> {
    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|error| Error::FileOperation {
            action: "create parent directories of",
            target: target.to_path_buf(),
            error,
        })?;
    }
    Ok(())
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|error| Error::FileOperation {
        action: "read",
        target: path.to_path_buf(),
        error,
    })
}

/// Replace `target` with a copy of `source`, creating parent directories.
pub fn overwrite(source: &Path, target: &Path) -> Result<()> {
    create_parent(target)?;
    std::fs::copy(source, target).map_err(|error| Error::FileOperation {
        action: "copy into",
        target: target.to_path_buf(),
        error,
    })?;
    tracing::debug!("Copied {} to {}", source.display(), target.display());
    Ok(())
}

/// Replace marked sections of `target` with the same sections of `source`.
///
/// A section `name` spans from the line `<begin> name` through the line
/// `<end> name`, inclusive. Sections missing from `target` are appended;
/// a missing `target` is created. A section opened but never closed, in
/// either file, is rejected before anything is written.
pub fn update(source: &Path, target: &Path, sections: &[String], markers: &[String]) -> Result<()> {
    let [begin, end] = markers else {
        return Err(Error::InvalidMarkers {
            target: target.to_path_buf(),
            reason: format!("expected a begin and an end marker, found {}", markers.len()),
        });
    };

    let source_text = read(source)?;
    let source_lines: Vec<&str> = source_text.lines().collect();
    let mut lines: Vec<String> = if target.exists() {
        read(target)?.lines().map(String::from).collect()
    } else {
        Vec::new()
    };

    for section in sections {
        let open = format!("{begin} {section}");
        let close = format!("{end} {section}");
        let unterminated = |path: &Path, line: usize| Error::InvalidMarkers {
            target: target.to_path_buf(),
            reason: format!(
                "section `{section}` opened on line {} of {} is never closed",
                line + 1,
                path.display()
            ),
        };
        let (start, stop) = block_range(&source_lines, &open, &close)
            .map_err(|line| unterminated(source, line))?
            .ok_or_else(|| Error::InvalidMarkers {
                target: target.to_path_buf(),
                reason: format!("section `{section}` not found in {}", source.display()),
            })?;
        let block = source_lines[start..=stop].iter().map(|line| line.to_string());

        let existing =
            block_range(&lines, &open, &close).map_err(|line| unterminated(target, line))?;
        match existing {
            Some((start, stop)) => {
                lines.splice(start..=stop, block);
            }
            None => {
                if lines.last().is_some_and(|line| !line.trim().is_empty()) {
                    lines.push(String::new());
                }
                lines.extend(block);
            }
        }
    }

    create_parent(target)?;
    let mut content = lines.join("\n");
    content.push('\n');
    std::fs::write(target, content).map_err(|error| Error::FileOperation {
        action: "write",
        target: target.to_path_buf(),
        error,
    })?;
    tracing::debug!("Updated {} from {}", target.display(), source.display());
    Ok(())
}

/// Locate the first `open` line and its matching `close` line.
///
/// An `open` line with no `close` before the next `open` (or the end of the
/// text) is unterminated and is returned as the error, by line index.
fn block_range<S: AsRef<str>>(
    lines: &[S],
    open: &str,
    close: &str,
) -> std::result::Result<Option<(usize, usize)>, usize> {
    let Some(start) = lines.iter().position(|line| line.as_ref().trim() == open) else {
        return Ok(None);
    };
    for (offset, line) in lines[start + 1..].iter().enumerate() {
        match line.as_ref().trim() {
            text if text == close => return Ok(Some((start, start + 1 + offset))),
            text if text == open => return Err(start),
            _ => {}
        }
    }
    Err(start)
}
