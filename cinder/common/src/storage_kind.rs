use std::fmt;

/// The two places a value can live in on the target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StorageKind {
    /// A score holder on the main objective. Integer valued only.
    Register,
    /// A path inside the main data storage.
    Tree,
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            StorageKind::Register => "register",
            StorageKind::Tree => "tree",
        })
    }
}
