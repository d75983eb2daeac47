use std::fmt::Display;
use std::path::{Path, PathBuf};

use anyhow::bail;

#[derive(clap::Args, Debug, Clone)]
pub struct Directory {
    path: PathBuf,
}

impl Display for Directory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

pub fn directory(path: &str) -> Result<Directory, String> {
    let result = Directory {
        path: PathBuf::from(path),
    };

    Ok(result)
}

impl Directory {
    pub fn as_path_buf(&self) -> Result<PathBuf, anyhow::Error> {
        let path = Path::new(&self.path);
        if !path.is_dir() {
            bail!(
                "Provided path: {} does not point to a directory",
                path.display()
            );
        }

        Ok(path.to_path_buf())
    }
}

#[derive(Debug, Clone)]
pub struct InputFile {
    path: PathBuf,
}

impl Display for InputFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path.display())
    }
}

pub fn input_file(path: &str) -> Result<InputFile, String> {
    let input_path = Path::new(path);
    let result = InputFile {
        path: input_path.to_path_buf(),
    };

    Ok(result)
}

impl InputFile {
    pub fn as_path(&self) -> Result<&Path, anyhow::Error> {
        if !self.path.is_file() {
            bail!(
                "Provided path: {} does not point to a file",
                self.path.display()
            );
        }

        Ok(&self.path)
    }
}
