use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// Delimiter between an avatar path and its cache-busting token in stored
/// references. Existing forum data uses this exact literal.
pub const DATELINE_DELIMITER: &str = "?dateline=";

/// Target extension of every conversion.
pub const WEBP_EXTENSION: &str = "webp";

/// Stored avatar reference: a path plus an optional cache-busting token
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AvatarReference {
    /// Path to the avatar image, relative to the forum root
    pub path: String,
    /// Cache-busting token, not part of the physical path
    pub cache_token: Option<String>,
}

impl AvatarReference {
    pub fn new(path: impl Into<String>, cache_token: Option<String>) -> Self {
        Self {
            path: path.into(),
            cache_token,
        }
    }

    /// Parse a stored reference such as `./uploads/avatars/avatar_1.png?dateline=1700000000`.
    ///
    /// Only the first delimiter splits; an empty token is kept as `None`.
    pub fn parse(stored: &str) -> Self {
        match stored.split_once(DATELINE_DELIMITER) {
            Some((path, token)) => Self {
                path: path.to_string(),
                cache_token: (!token.is_empty()).then(|| token.to_string()),
            },
            None => Self {
                path: stored.to_string(),
                cache_token: None,
            },
        }
    }

    pub fn is_empty(&self) -> bool {
        self.path.is_empty()
    }

    /// Path with any embedded `?dateline=` suffix removed
    pub fn clean_path(&self) -> &str {
        strip_cache_token(&self.path)
    }

    /// Extension of the clean path, compared case-sensitively by callers
    pub fn extension(&self) -> &str {
        file_extension(self.clean_path())
    }

    pub fn is_webp(&self) -> bool {
        self.extension() == WEBP_EXTENSION
    }

    /// Format as the stored string: `path` or `path?dateline=token`
    pub fn to_stored(&self) -> String {
        match &self.cache_token {
            Some(token) => format!("{}{}{}", self.path, DATELINE_DELIMITER, token),
            None => self.path.clone(),
        }
    }
}

impl fmt::Display for AvatarReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_stored())
    }
}

/// Outcome of one conversion attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConversionResult {
    /// Whether a new WebP file was written
    pub changed: bool,
    /// Reference to persist; equal to the input when nothing changed
    pub new_reference: AvatarReference,
    /// Original file to delete, present only when `changed`
    pub removed_path: Option<PathBuf>,
}

impl ConversionResult {
    pub fn unchanged(reference: AvatarReference) -> Self {
        Self {
            changed: false,
            new_reference: reference,
            removed_path: None,
        }
    }
}

pub fn strip_cache_token(path: &str) -> &str {
    match path.split_once(DATELINE_DELIMITER) {
        Some((clean, _)) => clean,
        None => path,
    }
}

/// Substring after the final `.` of the file-name component, or `""`.
pub fn file_extension(path: &str) -> &str {
    let file_name_start = path.rfind(['/', '\\']).map_or(0, |index| index + 1);
    let file_name = &path[file_name_start..];

    match file_name.rfind('.') {
        Some(index) => &file_name[index + 1..],
        None => "",
    }
}

/// Sibling path whose final extension segment is replaced with `extension`.
///
/// Directory components are never touched; a path without an extension gets
/// one appended.
pub fn replace_extension(path: &str, extension: &str) -> String {
    let file_name_start = path.rfind(['/', '\\']).map_or(0, |index| index + 1);

    match path[file_name_start..].rfind('.') {
        Some(index) => format!("{}.{}", &path[..file_name_start + index], extension),
        None => format!("{}.{}", path, extension),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_splits_on_first_dateline() {
        let reference = AvatarReference::parse("./uploads/avatars/avatar_1.png?dateline=1700000000");

        assert_eq!(reference.path, "./uploads/avatars/avatar_1.png");
        assert_eq!(reference.cache_token.as_deref(), Some("1700000000"));
        assert_eq!(
            reference.to_stored(),
            "./uploads/avatars/avatar_1.png?dateline=1700000000"
        );
    }

    #[test]
    fn parse_without_token_keeps_whole_path() {
        let reference = AvatarReference::parse("uploads/avatars/avatar_2.jpg");

        assert_eq!(reference.path, "uploads/avatars/avatar_2.jpg");
        assert_eq!(reference.cache_token, None);
        assert_eq!(reference.to_string(), "uploads/avatars/avatar_2.jpg");
    }

    #[test]
    fn extension_is_case_sensitive() {
        assert!(AvatarReference::parse("a/avatar_3.webp?dateline=1").is_webp());
        assert!(!AvatarReference::parse("a/avatar_3.WEBP").is_webp());
        assert_eq!(AvatarReference::parse("a/avatar_3.WEBP").extension(), "WEBP");
    }

    #[test]
    fn extension_ignores_dots_in_directories() {
        assert_eq!(file_extension("uploads.png/avatar_4"), "");
        assert_eq!(file_extension("uploads.png/avatar_4.gif"), "gif");
    }

    #[test]
    fn replace_extension_only_touches_final_segment() {
        assert_eq!(
            replace_extension("uploads/png/avatar_png.png", "webp"),
            "uploads/png/avatar_png.webp"
        );
        assert_eq!(replace_extension("uploads.d/avatar_5", "webp"), "uploads.d/avatar_5.webp");
    }
}
