//! Reading command inputs from files or stdin.

use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// Name shown for text read from stdin
pub const STDIN_NAME: &str = "<stdin>";

/// The text of one input and the name to report it under
pub struct Input {
    pub name: String,
    pub text: String,
}

#[must_use]
pub fn is_stdin(path: &Path) -> bool {
    path.to_string_lossy() == "-"
}

/// Read one input; `-` reads stdin
///
/// # Errors
///
/// Returns an error if the file or stdin cannot be read as UTF-8 text.
pub fn read_input(path: &Path) -> anyhow::Result<Input> {
    if is_stdin(path) {
        let mut text = String::new();
        io::stdin().read_to_string(&mut text)?;
        return Ok(Input {
            name: STDIN_NAME.to_string(),
            text,
        });
    }

    let text = std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", path.display()))?;
    Ok(Input {
        name: path.display().to_string(),
        text,
    })
}

/// Read every input in order
///
/// # Errors
///
/// Returns an error if stdin is named more than once or any input cannot be read.
pub fn read_inputs(paths: &[PathBuf]) -> anyhow::Result<Vec<Input>> {
    if paths.iter().filter(|path| is_stdin(path)).count() > 1 {
        anyhow::bail!("'-' (stdin) can only be given once");
    }
    paths.iter().map(|path| read_input(path)).collect()
}
