//! Conversion of other medical image formats into MRtrix images with the
//! external `mrconvert` tool.
//!
//! `converters()` lists the conversions available, so that they can be
//! registered with a pipeline framework. `MrConvert` builds and runs the
//! actual command.

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{MrtrixError, Result};
use crate::fileset::ImageFileSet;
use crate::format::{FormatVariant, ENCODING_EXT};

/// Environment variable which, when set to anything but `0`, asks tools to
/// only parse their command line instead of running.
pub const PARSE_ONLY_ENV: &str = "MRTRIX_CLI_PARSE_ONLY";

/// Description of one conversion into an MRtrix format.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConverterSpec {
    /// Name of the tool performing the conversion.
    pub tool: &'static str,
    /// The format produced.
    pub target: FormatVariant,
    /// Extension given to the output file, which selects the format.
    pub out_ext: &'static str,
}

/// The conversions from any medical image into MRtrix formats.
pub fn converters() -> Vec<ConverterSpec> {
    [
        FormatVariant::IMAGE_FORMAT,
        FormatVariant::IMAGE_HEADER,
        FormatVariant::IMAGE_FORMAT_GZ,
    ]
    .iter()
    .map(|&target| ConverterSpec {
        tool: "mrconvert",
        target,
        out_ext: target.ext(),
    })
    .collect()
}

/// Builder and runner for `mrconvert` invocations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MrConvert {
    program: PathBuf,
    parse_only: bool,
    extra_args: Vec<OsString>,
}

impl Default for MrConvert {
    fn default() -> Self {
        MrConvert {
            program: PathBuf::from("mrconvert"),
            parse_only: false,
            extra_args: Vec::new(),
        }
    }
}

impl MrConvert {
    /// `mrconvert` from the `PATH`, executing for real.
    pub fn new() -> Self {
        Self::default()
    }

    /// Like `new`, with `parse_only` taken from `MRTRIX_CLI_PARSE_ONLY`.
    pub fn from_env() -> Self {
        let parse_only = env::var(PARSE_ONLY_ENV)
            .map(|v| !v.is_empty() && v != "0")
            .unwrap_or(false);
        Self::default().parse_only(parse_only)
    }

    /// Use a specific executable.
    pub fn program<P: Into<PathBuf>>(mut self, program: P) -> Self {
        self.program = program.into();
        self
    }

    /// Only build commands, never execute them.
    pub fn parse_only(mut self, parse_only: bool) -> Self {
        self.parse_only = parse_only;
        self
    }

    /// Pass an extra option before the input and output arguments.
    pub fn arg<S: Into<OsString>>(mut self, arg: S) -> Self {
        self.extra_args.push(arg.into());
        self
    }

    /// Whether commands are only built.
    pub fn is_parse_only(&self) -> bool {
        self.parse_only
    }

    /// The output file for a conversion into `target` within `out_dir`.
    pub fn output_path<P: AsRef<Path>>(&self, out_dir: P, target: FormatVariant) -> PathBuf {
        out_dir.as_ref().join(format!("out{}", target.ext()))
    }

    /// Build the command converting `input` into `target` within `out_dir`.
    /// Targets requiring an encoding also export the gradient table.
    pub fn command<P, Q>(&self, input: P, target: FormatVariant, out_dir: Q) -> Result<Command>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        if !target.base().is_mrtrix() {
            return Err(MrtrixError::UnknownFormat(format!(
                "{} is not an MRtrix format",
                target
            )));
        }
        let mut cmd = Command::new(&self.program);
        let _ = cmd.args(&self.extra_args);
        if target.requires_encoding() {
            let b = out_dir.as_ref().join(format!("out{}", ENCODING_EXT));
            let _ = cmd.arg("-export_grad_mrtrix").arg(b);
        }
        let _ = cmd
            .arg(input.as_ref())
            .arg(self.output_path(&out_dir, target));
        Ok(cmd)
    }

    /// Convert `input` into `target` within `out_dir`.
    ///
    /// Returns `Ok(None)` without running anything in parse-only mode.
    pub fn convert<P, Q>(&self, input: P, target: FormatVariant, out_dir: Q) -> Result<Option<ImageFileSet>>
    where
        P: AsRef<Path>,
        Q: AsRef<Path>,
    {
        let mut cmd = self.command(&input, target, &out_dir)?;
        if self.parse_only {
            log::debug!("parse only, not running {:?}", cmd);
            return Ok(None);
        }
        log::debug!("running {:?}", cmd);
        let output = cmd.output()?;
        if !output.status.success() {
            return Err(MrtrixError::ConversionFailed(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        let out = self.output_path(&out_dir, target);
        ImageFileSet::new(target, vec![out]).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::{converters, MrConvert};
    use crate::error::MrtrixError;
    use crate::format::FormatVariant;
    use std::ffi::OsStr;
    use std::path::Path;

    #[test]
    fn registered_conversions() {
        let specs = converters();
        assert_eq!(specs.len(), 3);
        assert!(specs.iter().all(|s| s.tool == "mrconvert"));
        let exts: Vec<_> = specs.iter().map(|s| s.out_ext).collect();
        assert_eq!(exts, vec![".mif", ".mih", ".mif.gz"]);
    }

    #[test]
    fn command_line() {
        let conv = MrConvert::new().arg("-quiet");
        let cmd = conv
            .command("in/dwi.nii.gz", FormatVariant::IMAGE_FORMAT_B, "work")
            .unwrap();
        assert_eq!(cmd.get_program(), OsStr::new("mrconvert"));
        let args: Vec<&OsStr> = cmd.get_args().collect();
        let b = Path::new("work").join("out.b");
        let mif = Path::new("work").join("out.mif");
        let expected: Vec<&OsStr> = vec![
            OsStr::new("-quiet"),
            OsStr::new("-export_grad_mrtrix"),
            b.as_os_str(),
            OsStr::new("in/dwi.nii.gz"),
            mif.as_os_str(),
        ];
        assert_eq!(args, expected);
    }

    #[test]
    fn non_mrtrix_target() {
        let conv = MrConvert::new();
        assert!(conv.command("a.mif", FormatVariant::NIFTI_GZ, ".").is_err());
    }

    #[test]
    fn parse_only_does_not_run() {
        let conv = MrConvert::new()
            .program("/nonexistent/bin/mrconvert")
            .parse_only(true);
        let result = conv.convert("a.nii", FormatVariant::IMAGE_FORMAT, "/tmp").unwrap();
        assert!(result.is_none());

        let conv = conv.parse_only(false);
        match conv.convert("a.nii", FormatVariant::IMAGE_FORMAT, "/tmp") {
            Err(MrtrixError::Io(_)) => {}
            other => panic!("unexpected result {:?}", other),
        }
    }
}
