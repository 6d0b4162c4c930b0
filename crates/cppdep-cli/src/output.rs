//! Report sink and error rendering for the `cppdep` binary.
//!
//! Reports go to stdout unless `--output` names a file; logs and errors
//! always go to stderr.

use anyhow::Context;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Open the report destination.
///
/// Missing parent directories of `path` are created.
pub fn open(path: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    let Some(path) = path else {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

/// Render `error` to stderr.
///
/// Outputs `error[<code>]: <message>\n  suggestion: <hint>` when the root cause
/// is a [`cppdep_core::Error`], and `error: <message>` otherwise.
pub fn render_error(error: &anyhow::Error) {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    // Nothing left to report to if stderr itself fails.
    let _ = write_error(&mut out, error);
}

fn write_error(w: &mut dyn Write, error: &anyhow::Error) -> io::Result<()> {
    match error.downcast_ref::<cppdep_core::Error>() {
        Some(cause) => {
            let code = cause.code();
            writeln!(w, "error[{}]: {error:#}", code.code())?;
            writeln!(w, "  {}", code.message())?;
            if let Some(hint) = code.hint() {
                writeln!(w, "  suggestion: {hint}")?;
            }
        }
        None => writeln!(w, "error: {error:#}")?,
    }
    Ok(())
}
