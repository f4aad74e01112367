/// Clang AST Runner.
///
/// Invokes the clang front end in syntax-only mode with a JSON AST dump and
/// hands stdout/stderr to the ingestor. Clang still dumps the AST when the
/// source has errors, so a non-zero exit status is only logged; the
/// diagnostics travel with the translation unit.

use std::io::ErrorKind;
use std::path::Path;
use std::process::Command;

use anyhow::{bail, Context, Result};
use tracing::{debug, info, warn};

use super::clang_ingest::{parse_diagnostics, ClangJsonIngestor};
use super::config::ParseConfig;
use crate::domain::cursor::TranslationUnit;
use crate::ports::AstProvider;

const INSTALL_HINT: &str =
    "Install clang (e.g. `apt install clang` or `brew install llvm`) or set [parse] clang in codereptile.toml.";

// ═══════════════════════════════════════════════════════════════════════════
// Provider
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct ClangProvider {
    program: String,
    std: String,
    extra_args: Vec<String>,
}

impl Default for ClangProvider {
    fn default() -> Self {
        Self::from_config(&ParseConfig::default())
    }
}

impl ClangProvider {
    pub fn from_config(config: &ParseConfig) -> Self {
        Self {
            program: config.clang.clone(),
            std: config.std.clone(),
            extra_args: config.extra_args.clone(),
        }
    }

    /// Probe `<clang> --version`.
    pub fn check_available(&self) -> Result<()> {
        match Command::new(&self.program).arg("--version").output() {
            Ok(output) if output.status.success() => {
                let version = String::from_utf8_lossy(&output.stdout);
                info!(
                    "using {}: {}",
                    self.program,
                    version.lines().next().unwrap_or("").trim()
                );
                Ok(())
            }
            Ok(output) => bail!(
                "{} found but returned error: {:?}",
                self.program,
                output.status.code()
            ),
            Err(_) => bail!("{} not found in PATH. {}", self.program, INSTALL_HINT),
        }
    }

    /// Describe the command that would be run for `file`.
    pub fn build_command_spec(&self, file: &Path) -> ClangCommandSpec {
        let mut args = vec![
            "-x".to_string(),
            "c++".to_string(),
            format!("-std={}", self.std),
        ];
        args.extend(
            [
                "-fsyntax-only",
                "-fno-color-diagnostics",
                "-fdiagnostics-parseable-fixits",
                "-Xclang",
                "-ast-dump=json",
            ]
            .iter()
            .map(|s| s.to_string()),
        );
        args.extend(self.extra_args.iter().cloned());
        args.push(file.display().to_string());

        ClangCommandSpec {
            program: self.program.clone(),
            args,
        }
    }
}

impl AstProvider for ClangProvider {
    fn parse(&self, path: &Path) -> Result<TranslationUnit> {
        let spec = self.build_command_spec(path);
        debug!("running {} {}", spec.program, spec.args.join(" "));

        let output = match Command::new(&spec.program).args(&spec.args).output() {
            Ok(output) => output,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                bail!("{} not found in PATH. {}", spec.program, INSTALL_HINT)
            }
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to execute {}", spec.program))
            }
        };

        if !output.status.success() {
            warn!(
                "{} exited with {:?} on {}",
                spec.program,
                output.status.code(),
                path.display()
            );
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stdout.trim().is_empty() {
            bail!(
                "{} produced no AST for {}:\n{}",
                spec.program,
                path.display(),
                stderr.trim()
            );
        }

        let root = ClangJsonIngestor::new()
            .ingest(&stdout)
            .with_context(|| format!("Failed to ingest clang AST for {}", path.display()))?;
        Ok(TranslationUnit::new(path.display().to_string(), root)
            .with_diagnostics(parse_diagnostics(&stderr)))
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Testable Command Builder
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClangCommandSpec {
    pub program: String,
    pub args: Vec<String>,
}
