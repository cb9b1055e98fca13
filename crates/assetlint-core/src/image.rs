//! Logo image header inspection.
//!
//! Only the PNG header is read; pixel data is never decoded.

use std::path::Path;

use crate::repo;

pub const MIN_LOGO_DIMENSION: u32 = 64;
pub const MAX_LOGO_DIMENSION: u32 = 512;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// Width and height from the IHDR chunk, if `bytes` start like a PNG.
pub fn png_dimensions(bytes: &[u8]) -> Option<ImageDimensions> {
    if bytes.len() < 24 || bytes[..8] != PNG_SIGNATURE || &bytes[12..16] != b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes([bytes[16], bytes[17], bytes[18], bytes[19]]);
    let height = u32::from_be_bytes([bytes[20], bytes[21], bytes[22], bytes[23]]);
    Some(ImageDimensions { width, height })
}

/// Findings for one logo file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogoFindings {
    pub errors: Vec<String>,
    pub warnings: Vec<String>,
}

impl LogoFindings {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Inspect logo bytes already read from `path`.
pub fn inspect_logo(path: &Path, bytes: &[u8]) -> LogoFindings {
    let mut findings = LogoFindings::default();
    let Some(dims) = png_dimensions(bytes) else {
        findings
            .errors
            .push(format!("Logo at path '{}' is not a valid PNG image", path.display()));
        return findings;
    };

    let in_range = |v: u32| (MIN_LOGO_DIMENSION..=MAX_LOGO_DIMENSION).contains(&v);
    if !in_range(dims.width) || !in_range(dims.height) {
        findings.errors.push(format!(
            "Logo at path '{}' has dimensions {}x{}, expected {}..={} px",
            path.display(),
            dims.width,
            dims.height,
            MIN_LOGO_DIMENSION,
            MAX_LOGO_DIMENSION
        ));
    }
    if dims.width != dims.height {
        findings.warnings.push(format!(
            "Logo at path '{}' is not square ({}x{})",
            path.display(),
            dims.width,
            dims.height
        ));
    }
    findings
}

/// Read and inspect the logo at `path`. A missing file is an error finding.
pub async fn check_logo(path: &Path) -> LogoFindings {
    match repo::read_bytes(path).await {
        Ok(bytes) => inspect_logo(path, &bytes),
        Err(err) => LogoFindings {
            errors: vec![format!("Cannot read logo: {err}")],
            warnings: Vec::new(),
        },
    }
}
