//! Types for error handling go here.
use std::io::Error as IOError;
use std::path::PathBuf;

quick_error! {
    /// Error type for all error kinds reported by the `mrtrix` crate.
    #[derive(Debug)]
    pub enum MrtrixError {
        /// The file does not start with the expected magic number.
        MagicNumberMismatch { expected: Vec<u8>, actual: Vec<u8> } {
            display("Magic number {:?} does not match reference {:?}",
                String::from_utf8_lossy(actual), String::from_utf8_lossy(expected))
        }
        /// A structural invariant of the file format was violated.
        FormatMismatch(msg: String) {
            display("Format mismatch: {}", msg)
        }
        /// A header line lacks the `": "` key/value separator.
        MalformedHeaderLine { line: usize, content: String } {
            display("Malformed header line {}: {:?}", line, content)
        }
        /// The metadata block ended before the `END` line.
        MissingEndMarker {
            display("Header ended without an `END` line")
        }
        /// A mandatory metadata key is not present in the header.
        MissingRequiredMetadata(key: &'static str) {
            display("Missing required metadata key `{}`", key)
        }
        /// The `file` entry of the header is not a path with an optional offset.
        InvalidFileEntry(value: String) {
            display("Invalid `file` entry: {:?}", value)
        }
        /// The data offset following the data file path is not a valid integer.
        MalformedOffset(token: String) {
            display("Malformed data offset {:?}", token)
        }
        /// The header names an absolute data file path, or one leaving the header's directory, and the options do not allow it.
        UntrustedDataPath(path: PathBuf) {
            display("Refusing data file path {} outside of the header's directory", path.display())
        }
        /// A required companion file is not present next to the image.
        MissingCompanionFile(path: PathBuf) {
            display("Missing companion file {}", path.display())
        }
        /// A metadata value has an unexpected shape.
        InvalidMetadata { key: &'static str, reason: String } {
            display("Invalid value for `{}`: {}", key, reason)
        }
        /// The diffusion encoding file could not be read as a numeric table.
        InvalidEncoding { line: usize, reason: String } {
            display("Invalid diffusion encoding at line {}: {}", line, reason)
        }
        /// The `datatype` entry does not name a known data type.
        UnknownDataType(name: String) {
            display("Unknown data type {:?}", name)
        }
        /// No format variant matches the given file name or MIME type.
        UnknownFormat(name: String) {
            display("Unknown format {:?}", name)
        }
        /// The external conversion tool failed.
        ConversionFailed(msg: String) {
            display("Conversion failed: {}", msg)
        }
        /// I/O Error
        Io(err: IOError) {
            from()
            source(err)
            display("I/O error: {}", err)
        }
    }
}

impl MrtrixError {
    /// Whether the file does not have the shape its format requires. A wrong
    /// magic number is one such case.
    pub fn is_format_mismatch(&self) -> bool {
        match self {
            MrtrixError::MagicNumberMismatch { .. } | MrtrixError::FormatMismatch(_) => true,
            _ => false,
        }
    }
}

/// Alias type for results originating from this crate.
pub type Result<T> = ::std::result::Result<T, MrtrixError>;
