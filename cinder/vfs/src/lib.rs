//! Virtual in-memory file system.
//!
//! Files and directories keep their insertion order, so persisting or listing
//! a tree always produces the same order for the same sequence of insertions.
use std::{
    fs::{create_dir_all, remove_dir_all, OpenOptions},
    io::{self, Write},
    path::Path,
};

use indexmap::IndexMap;

/// Custom macro to easily generate predefined file structures
#[macro_export]
macro_rules! directories {
    ($($rest:tt)+) => {{
        let mut directory = $crate::Directory::new();
        $crate::directories_inner!(directory, $($rest)+);
        directory
    }};
    () => {
        $crate::Directory::new()
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! directories_inner {
    ($dir:ident, $k:expr => File($v:expr)) => {
        $dir.file($k).contents = ::std::string::ToString::to_string(&$v);
    };
    ($dir:ident, $k:expr => File($v:expr), $($rest:tt)+) => {{
        $crate::directories_inner!($dir, $k => File($v));
        $crate::directories_inner!($dir, $($rest)+);
    }};
    ($dir:ident, $k:ident => $v:expr) => {
        $dir.insert_dir(stringify!($k), $v);
    };
    ($dir:ident, $k:ident => $v:expr, $($rest:tt)+) => {{
        $crate::directories_inner!($dir, $k => $v);
        $crate::directories_inner!($dir, $($rest)+);
    }};
    ($dir:ident, $k:expr => $v:expr) => {
        $dir.insert_dir($k, $v);
    };
    ($dir:ident, $k:expr => $v:expr, $($rest:tt)+) => {{
        $crate::directories_inner!($dir, $k => $v);
        $crate::directories_inner!($dir, $($rest)+);
    }};
}

#[derive(Debug, Eq, PartialEq, Default, Clone)]
pub struct File {
    pub contents: String,
}

#[derive(Debug, Eq, PartialEq, Default, Clone)]
pub struct Directory {
    pub files: IndexMap<String, File>,
    pub directories: IndexMap<String, Directory>,
}

impl File {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_data(data: impl Into<String>) -> Self {
        File {
            contents: data.into(),
        }
    }

    pub fn push_string(&mut self, data: &str) {
        self.contents.push_str(data);
    }

    pub fn persist(&self, name: &str, path: &Path) -> io::Result<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path.join(name))?;

        file.write_all(self.contents.as_bytes())
    }
}

impl Directory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new file with this name or returns an existing file with this name
    pub fn file(&mut self, name: impl Into<String>) -> &mut File {
        self.files.entry(name.into()).or_default()
    }

    /// Returns a new directory with this name or returns an existing directory with this name
    pub fn dir(&mut self, name: impl Into<String>) -> &mut Directory {
        self.directories.entry(name.into()).or_default()
    }

    /// Inserts a directory, merging it into an existing directory of the same name
    pub fn insert_dir(&mut self, name: impl Into<String>, directory: Directory) {
        let target = self.dir(name);
        for (file_name, file) in directory.files {
            target.files.insert(file_name, file);
        }
        for (dir_name, dir) in directory.directories {
            target.insert_dir(dir_name, dir);
        }
    }

    /// Walks down `path`, creating every missing directory on the way
    pub fn dir_at(&mut self, path: &[&str]) -> &mut Directory {
        path.iter()
            .fold(self, |directory, segment| directory.dir(*segment))
    }

    /// Creates (or returns) the file at `path`, where the last segment is the file name.
    /// Returns `None` if `path` is empty.
    pub fn file_at(&mut self, path: &[&str]) -> Option<&mut File> {
        let (file_name, directories) = path.split_last()?;
        Some(self.dir_at(directories).file(*file_name))
    }

    pub fn get_file(&self, path: &[&str]) -> Option<&File> {
        let (file_name, directories) = path.split_last()?;
        let mut directory = self;
        for segment in directories {
            directory = directory.directories.get(*segment)?;
        }
        directory.files.get(*file_name)
    }

    pub fn get_dir(&self, path: &[&str]) -> Option<&Directory> {
        let mut directory = self;
        for segment in path {
            directory = directory.directories.get(*segment)?;
        }
        Some(directory)
    }

    /// Every file in this tree together with its path relative to this directory,
    /// files of a directory first, then its subdirectories
    pub fn walk_files(&self) -> Vec<(String, &File)> {
        let mut files = Vec::new();
        self.collect_files("", &mut files);
        files
    }

    fn collect_files<'a>(&'a self, prefix: &str, files: &mut Vec<(String, &'a File)>) {
        for (name, file) in &self.files {
            files.push((format!("{prefix}{name}"), file));
        }
        for (name, directory) in &self.directories {
            directory.collect_files(&format!("{prefix}{name}/"), files);
        }
    }

    pub fn persist(&self, name: &str, path: &Path) -> io::Result<()> {
        let own_path = path.join(name);
        create_dir_all(&own_path)?;

        for (dirname, dir) in &self.directories {
            dir.persist(dirname, &own_path)?;
        }

        for (filename, file) in &self.files {
            file.persist(filename, &own_path)?;
        }

        Ok(())
    }

    /// Like [`Directory::persist`], but removes any previous directory at the target first
    pub fn persist_clean(&self, name: &str, path: &Path) -> io::Result<()> {
        let own_path = path.join(name);
        if own_path.exists() {
            remove_dir_all(&own_path)?;
        }
        self.persist(name, path)
    }
}
