// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::path::{Path, PathBuf};

/// Create a file appender that never rotates. A bare file name is resolved against the
/// current directory.
///
/// # Errors
///
/// Returns an error if `path_str` has no file name component.
pub fn try_create(
    path_str: &str,
) -> miette::Result<tracing_appender::rolling::RollingFileAppender> {
    let (parent, file_name) = try_split(path_str)?;
    Ok(tracing_appender::rolling::never(parent, file_name))
}

fn try_split(path_str: &str) -> miette::Result<(PathBuf, PathBuf)> {
    let path = PathBuf::from(path_str);

    let file_name = path.file_name().ok_or_else(|| {
        miette::miette!(
            "Can't get a file name from {}. Log file paths must name a file.",
            path.display()
        )
    })?;

    let parent = match path.parent() {
        Some(it) if !it.as_os_str().is_empty() => it.to_path_buf(),
        _ => Path::new(".").to_path_buf(),
    };

    Ok((parent, PathBuf::from(file_name)))
}
