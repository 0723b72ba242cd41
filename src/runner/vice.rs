// CartBuilder - Assembles Commodore 64 cartridge images from build lists
// Copyright (C) 2026  Marcel Joachim Kloubert <marcel@kloubert.dev>
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! VICE emulator detection and launching.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus, Stdio};

use super::RunnerError;

/// VICE binaries to search for, in order of preference.
const VICE_BINARIES: &[&str] = &["x64sc", "x64"];

/// Find VICE on the system `PATH`.
///
/// ```no_run
/// use cartbuilder::runner::find_vice;
///
/// match find_vice() {
///     Some(path) => println!("Found VICE: {}", path.display()),
///     None => println!("VICE not found"),
/// }
/// ```
pub fn find_vice() -> Option<PathBuf> {
    VICE_BINARIES
        .iter()
        .find_map(|binary| which::which(binary).ok())
}

/// Run `<vice> -version` and return the reported version.
pub fn check_vice_version(vice_path: &Path) -> Result<String, RunnerError> {
    // VICE uses single-dash options.
    let output = Command::new(vice_path)
        .arg("-version")
        .stdin(Stdio::null())
        .output()
        .map_err(|e| RunnerError::VersionError(format!("Failed to run VICE: {}", e)))?;

    let text = if output.stdout.is_empty() {
        String::from_utf8_lossy(&output.stderr).into_owned()
    } else {
        String::from_utf8_lossy(&output.stdout).into_owned()
    };

    parse_vice_version(&text)
        .or_else(|| text.lines().next().map(str::to_string))
        .ok_or_else(|| RunnerError::VersionError("Could not determine VICE version".to_string()))
}

/// Extract `VICE x.y` from version output such as `x64sc (VICE 3.8)`.
fn parse_vice_version(output: &str) -> Option<String> {
    let after = &output[output.find("VICE")? + 4..];
    let version: String = after
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    (!version.is_empty()).then(|| format!("VICE {}", version))
}

/// A VICE process running a cartridge image.
pub struct ViceRunner {
    vice_path: PathBuf,
    child: Option<Child>,
}

impl ViceRunner {
    pub fn new(vice_path: PathBuf) -> Self {
        Self {
            vice_path,
            child: None,
        }
    }

    /// Get the VICE binary path.
    pub fn vice_path(&self) -> &Path {
        &self.vice_path
    }

    /// Arguments that boot VICE from a CRT file.
    pub fn cartridge_args(crt_path: &Path) -> Vec<String> {
        vec![
            "-cartcrt".to_string(),
            crt_path.display().to_string(),
        ]
    }

    /// Check if the VICE process we started is still running.
    pub fn is_running(&mut self) -> bool {
        match self.child.as_mut() {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    /// Start VICE with the cartridge attached, replacing any running instance.
    pub fn launch(&mut self, crt_path: &Path) -> Result<(), RunnerError> {
        self.kill();

        tracing::info!(vice = %self.vice_path.display(), crt = %crt_path.display(), "launching VICE");
        let child = Command::new(&self.vice_path)
            .args(Self::cartridge_args(crt_path))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        self.child = Some(child);
        Ok(())
    }

    /// Stop the VICE process if we started it.
    pub fn kill(&mut self) {
        if let Some(mut child) = self.child.take() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }

    /// Wait for VICE to exit.
    pub fn wait(&mut self) -> Option<ExitStatus> {
        self.child.as_mut().and_then(|child| child.wait().ok())
    }
}

impl Drop for ViceRunner {
    fn drop(&mut self) {
        self.kill();
    }
}
