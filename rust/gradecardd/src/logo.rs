//! Institution logo intake: an uploaded image file becomes an inline
//! `data:` reference that the grade card embeds directly.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};

/// Advertised upload limit. Larger files are accepted.
pub const SOFT_LIMIT_BYTES: usize = 2 * 1024 * 1024;

#[derive(Debug, thiserror::Error)]
pub enum LogoError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("not a recognized image: {0}")]
    Unsupported(String),
    #[error("malformed data url: {0}")]
    BadDataUrl(String),
}

impl LogoError {
    pub fn code(&self) -> &'static str {
        match self {
            LogoError::Read { .. } => "logo_read_failed",
            LogoError::Unsupported(_) | LogoError::BadDataUrl(_) => "logo_unsupported",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Logo {
    pub data_url: String,
    pub mime: String,
    pub bytes: usize,
    pub sha256: String,
}

impl Logo {
    pub fn from_file(path: &Path) -> Result<Self, LogoError> {
        let raw = std::fs::read(path).map_err(|source| LogoError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mime = sniff_mime(&raw, Some(path))
            .ok_or_else(|| LogoError::Unsupported(path.to_string_lossy().to_string()))?;
        Ok(Self::from_bytes(&raw, mime))
    }

    pub fn from_bytes(raw: &[u8], mime: String) -> Self {
        let data_url = format!("data:{};base64,{}", mime, STANDARD.encode(raw));
        Self {
            data_url,
            mime,
            bytes: raw.len(),
            sha256: sha256_hex(raw),
        }
    }

    /// Accepts a `data:<mime>;base64,<payload>` reference produced elsewhere.
    pub fn from_data_url(data_url: &str) -> Result<Self, LogoError> {
        let rest = data_url
            .strip_prefix("data:")
            .ok_or_else(|| LogoError::BadDataUrl("missing data: prefix".into()))?;
        let (mime, payload) = rest
            .split_once(";base64,")
            .ok_or_else(|| LogoError::BadDataUrl("expected base64 payload".into()))?;
        if !mime.starts_with("image/") {
            return Err(LogoError::Unsupported(mime.to_string()));
        }
        let raw = STANDARD
            .decode(payload.trim())
            .map_err(|e| LogoError::BadDataUrl(e.to_string()))?;
        Ok(Self::from_bytes(&raw, mime.to_string()))
    }

    pub fn oversized(&self) -> bool {
        self.bytes > SOFT_LIMIT_BYTES
    }
}

fn sniff_mime(raw: &[u8], path: Option<&Path>) -> Option<String> {
    if let Ok(fmt) = image::guess_format(raw) {
        return Some(fmt.to_mime_type().to_string());
    }
    if looks_like_svg(raw) {
        return Some("image/svg+xml".to_string());
    }
    let guessed = mime_guess::from_path(path?).first()?;
    if guessed.type_() == mime_guess::mime::IMAGE {
        Some(guessed.essence_str().to_string())
    } else {
        None
    }
}

fn looks_like_svg(raw: &[u8]) -> bool {
    let head = &raw[..raw.len().min(1024)];
    let text = match std::str::from_utf8(head) {
        Ok(t) => t,
        // The window may cut a multi-byte character; keep the valid prefix.
        Err(e) => std::str::from_utf8(&head[..e.valid_up_to()]).unwrap_or_default(),
    };
    let mut rest = text.trim_start_matches('\u{feff}');
    loop {
        rest = rest.trim_start();
        if rest.starts_with("<svg") {
            return true;
        }
        // Skip the XML prolog: declaration, comments, doctype, processing instructions.
        let end = if rest.starts_with("<!--") {
            rest.find("-->").map(|i| i + 3)
        } else if rest.starts_with("<?") || rest.starts_with("<!") {
            rest.find('>').map(|i| i + 1)
        } else {
            None
        };
        match end {
            Some(i) => rest = &rest[i..],
            None => return false,
        }
    }
}

pub fn sha256_hex(raw: &[u8]) -> String {
    let digest = Sha256::digest(raw);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}
