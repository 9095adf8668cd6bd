use std::fmt;

/// Image MIME types the gallery writer understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MimeType {
    Png,
    Webp,
    Jpeg,
}

impl MimeType {
    /// Resolve from a file name by case-insensitive suffix match. Unknown
    /// suffixes fall back to JPEG rather than erroring.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        let lower = name.to_ascii_lowercase();
        if lower.ends_with(".png") {
            Self::Png
        } else if lower.ends_with(".webp") {
            Self::Webp
        } else {
            Self::Jpeg
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Webp => "image/webp",
            Self::Jpeg => "image/jpeg",
        }
    }
}

impl fmt::Display for MimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
