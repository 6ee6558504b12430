//! Invocation of the external `castxml` AST dumper.

use crate::builder;
use crate::error::{CastXmlError, Result};
use ffigen_core::node::TranslationUnit;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info, warn};

/// Options for the `castxml` invocation.
#[derive(Debug, Clone, Default)]
pub struct DumpOptions {
    /// Additional include directories (the header's own directory is always
    /// added).
    pub include_dirs: Vec<PathBuf>,
    /// Additional compiler flags passed through verbatim.
    pub flags: Vec<String>,
}

/// Main interface for dumping C headers with castxml.
#[derive(Debug)]
pub struct CastXml {
    binary: PathBuf,
}

impl CastXml {
    /// Creates a new runner, finding `castxml` in PATH.
    pub fn new() -> Result<Self> {
        let binary =
            which::which("castxml").map_err(|e| CastXmlError::BinaryNotFound(e.to_string()))?;

        info!("Found castxml at: {}", binary.display());
        Ok(Self { binary })
    }

    /// Creates a runner with a specific castxml path.
    pub fn with_path(binary: PathBuf) -> Result<Self> {
        if !binary.exists() {
            return Err(CastXmlError::FileNotFound(binary));
        }
        Ok(Self { binary })
    }

    /// The castxml version reported by `castxml --version`.
    pub fn version(&self) -> Result<String> {
        let output = self.run(&["--version".into()], None)?;
        parse_version_section(&output, "castxml")
    }

    /// The version of the clang castxml is built against.
    pub fn clang_version(&self) -> Result<String> {
        let output = self.run(&["--version".into()], None)?;
        parse_version_section(&output, "clang")
    }

    pub fn is_available(&self) -> bool {
        self.run(&["--version".to_string()], None).is_ok()
    }

    /// Dumps `header` into `out` as a CastXML document.
    pub fn dump(&self, header: &Path, out: &Path, options: &DumpOptions) -> Result<()> {
        if !header.is_file() {
            return Err(CastXmlError::FileNotFound(header.to_path_buf()));
        }

        let mut args: Vec<String> = vec![
            header.to_string_lossy().into_owned(),
            "--castxml-output=1".to_string(),
            "-o".to_string(),
            out.to_string_lossy().into_owned(),
        ];

        let mut include_dirs = options.include_dirs.clone();
        if let Some(parent) = header.parent() {
            include_dirs.push(parent.to_path_buf());
        }
        for dir in include_dirs {
            args.push(format!("--include-directory={}", dir.display()));
        }
        args.extend(options.flags.iter().cloned());

        let cwd = header.parent().map(Path::to_path_buf);
        self.run(&args, cwd.as_deref())?;

        if !out.is_file() {
            return Err(CastXmlError::FileNotFound(out.to_path_buf()));
        }
        Ok(())
    }

    /// Dumps and builds a header in one step, using a temporary directory
    /// for the intermediate XML document.
    pub fn parse_header(&self, header: &Path, options: &DumpOptions) -> Result<TranslationUnit> {
        let dir = tempfile::tempdir()?;
        let stem = header
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| "header".to_string());
        let out = dir.path().join(format!("{stem}.xml"));

        self.dump(header, &out, options)?;
        builder::parse_file(&out)
    }

    fn run(&self, args: &[String], cwd: Option<&Path>) -> Result<String> {
        let mut cmd = Command::new(&self.binary);
        cmd.args(args);
        if let Some(cwd) = cwd {
            cmd.current_dir(cwd);
        }

        debug!("Running castxml command: {:?}", cmd);

        let output = cmd.output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).to_string();
            warn!("castxml failed: {}", stderr);
            return Err(CastXmlError::ProcessFailed {
                status: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).to_string())
    }
}

/// Extracts the version number from a `<prefix> version x.y.z` line of the
/// tool's `--version` output. The full output is preserved in the error when
/// the section cannot be found.
fn parse_version_section(output: &str, prefix: &str) -> Result<String> {
    for line in output.lines() {
        let line = line.trim();
        let Some(rest) = line.strip_prefix(prefix) else {
            continue;
        };
        let Some(version) = rest.trim_start().strip_prefix("version") else {
            continue;
        };
        let version: String = version
            .trim_start()
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
            .collect();
        if !version.is_empty() {
            return Ok(version);
        }
    }

    Err(CastXmlError::VersionParse(output.to_string()))
}
