//! Package identifiers.
//!
//! Identifiers arrive straight from the command line and end up as arguments
//! to `git`, `pacman` and `makepkg` and as directory names under the build
//! root. [`PackageName`] is the only form the rest of the crate accepts, and
//! it can only be obtained through [`PackageName::parse`].

use std::fmt;

use crate::error::InvalidIdentifier;

/// Returns `true` if `name` is a well-formed package identifier.
///
/// Valid identifiers are non-empty and consist solely of ASCII alphanumerics
/// and `-`, `_`, `.`, `+`. A leading `-` (would be read as an option by the
/// external tools) and the directory references `.` and `..` are rejected too.
///
/// # Example
///
/// ```
/// use auh_core::name::is_valid_package_name;
///
/// assert!(is_valid_package_name("python-requests"));
/// assert!(is_valid_package_name("gtk+3"));
/// assert!(!is_valid_package_name("bad name"));
/// assert!(!is_valid_package_name("x;rm -rf ~"));
/// ```
pub fn is_valid_package_name(name: &str) -> bool {
    check(name).is_ok()
}

fn check(name: &str) -> Result<(), &'static str> {
    if name.is_empty() {
        return Err("empty identifier");
    }
    if let Some(c) = name
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '+')))
    {
        return Err(if c.is_whitespace() {
            "contains whitespace"
        } else {
            "contains a character outside [A-Za-z0-9._+-]"
        });
    }
    if name.starts_with('-') {
        return Err("starts with '-'");
    }
    if name == "." || name == ".." {
        return Err("is a directory reference");
    }
    Ok(())
}

/// A validated package identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PackageName(String);

impl PackageName {
    /// Validate `raw` and wrap it.
    pub fn parse(raw: &str) -> Result<Self, InvalidIdentifier> {
        check(raw).map_err(|reason| InvalidIdentifier {
            name: raw.to_string(),
            reason,
        })?;
        Ok(Self(raw.to_string()))
    }

    /// Return the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PackageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::ops::Deref for PackageName {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl AsRef<str> for PackageName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl AsRef<std::path::Path> for PackageName {
    fn as_ref(&self) -> &std::path::Path {
        std::path::Path::new(&self.0)
    }
}

impl PartialEq<&str> for PackageName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A package identifier exactly as the user typed it.
///
/// Consumed once: [`validate`](Self::validate) either yields a
/// [`PackageName`] or the reason it was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageRequest {
    raw: String,
}

impl PackageRequest {
    /// Wrap a raw identifier.
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The identifier as given.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Whether the identifier passes validation.
    pub fn is_valid(&self) -> bool {
        is_valid_package_name(&self.raw)
    }

    /// Validate the request, consuming it.
    pub fn validate(self) -> Result<PackageName, InvalidIdentifier> {
        PackageName::parse(&self.raw)
    }
}
