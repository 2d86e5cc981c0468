//! Name, version and homepage shown by `--version`.

/// Immutable library identity for the presentation layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LibraryInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub url: &'static str,
}

pub const LIBRARY: LibraryInfo = LibraryInfo {
    name: env!("CARGO_PKG_NAME"),
    version: env!("CARGO_PKG_VERSION"),
    url: env!("CARGO_PKG_REPOSITORY"),
};

impl LibraryInfo {
    /// `name vX.Y.Z` followed by the URL on its own line.
    pub fn banner(&self) -> String {
        format!("{} v{}\n{}", self.name, self.version, self.url)
    }
}

/// Print version information.
pub fn print_version() {
    println!("{}", LIBRARY.banner());
}
