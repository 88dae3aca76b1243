//! External sequence-diagram renderer invocation.

use crate::LogError;
use std::path::Path;
use std::process::Command;
use tracing::debug;

/// Render a PlantUML file to an image by invoking
/// `<runtime> -jar <renderer> <diagram>`.
///
/// Called by the engine after a run when both paths are configured. A
/// failure here never fails the run; callers log and continue.
pub fn render_sequence_diagram(
    runtime: &Path,
    renderer: &Path,
    diagram: &Path,
) -> Result<(), LogError> {
    debug!(runtime = %runtime.display(), renderer = %renderer.display(), diagram = %diagram.display(), "rendering sequence diagram");
    let status = Command::new(runtime)
        .arg("-jar")
        .arg(renderer)
        .arg(diagram)
        .status()
        .map_err(|e| LogError::Renderer(format!("failed to launch {}: {e}", runtime.display())))?;
    if !status.success() {
        return Err(LogError::Renderer(format!(
            "renderer exited with {status}"
        )));
    }
    Ok(())
}
