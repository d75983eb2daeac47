use std::ffi::OsStr;
use std::fmt::{Debug, Display, Formatter};
use std::fs::File;
use std::io;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use log::debug;

/// Extension of a plain text transcript.
pub const TRANSCRIPT_EXTENSION: &str = "sccg";

const BROTLI_EXTENSION: &str = "br";
const FASTA_EXTENSION: &str = "fa";
const GZIP_EXTENSION: &str = "gz";
const BUFFER_SIZE: usize = 4096;

/// Packs a finished transcript file and opens packed transcripts for reading.
pub trait Archiver: Debug + Send + Sync {
    /// Extension appended to the transcript name, if any.
    fn extension(&self) -> Option<&'static str>;

    /// Packs the file at `path`, replacing it, and returns the path of the
    /// archive.
    fn archive(&self, path: &Path) -> io::Result<PathBuf>;

    /// Opens an archive created by [`Archiver::archive`] and returns a reader
    /// over the original transcript text.
    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>>;
}

/// Keeps the transcript as plain text.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainArchiver;

impl Archiver for PlainArchiver {
    fn extension(&self) -> Option<&'static str> {
        None
    }

    fn archive(&self, path: &Path) -> io::Result<PathBuf> {
        Ok(path.to_owned())
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        Ok(Box::new(BufReader::new(File::open(path)?)))
    }
}

/// Brotli archiver; the default one.
#[derive(Debug, Clone, Copy)]
pub struct BrotliArchiver {
    quality: u32,
    window_size: u32,
}

impl BrotliArchiver {
    #[must_use]
    pub fn new(quality: u32, window_size: u32) -> Self {
        assert!(quality <= 11, "Invalid Brotli quality: {}", quality);
        assert!(
            (10..=24).contains(&window_size),
            "Invalid Brotli window size: {}",
            window_size
        );

        Self {
            quality,
            window_size,
        }
    }
}

impl Default for BrotliArchiver {
    fn default() -> Self {
        Self::new(11, 20)
    }
}

impl Archiver for BrotliArchiver {
    fn extension(&self) -> Option<&'static str> {
        Some(BROTLI_EXTENSION)
    }

    fn archive(&self, path: &Path) -> io::Result<PathBuf> {
        let archive_path = with_appended_extension(path, BROTLI_EXTENSION);
        let mut input = BufReader::new(File::open(path)?);

        let mut data = Vec::new();
        {
            let mut br_writer = brotli::enc::writer::CompressorWriter::new(
                &mut data,
                BUFFER_SIZE,
                self.quality,
                self.window_size,
            );
            io::copy(&mut input, &mut br_writer)?;
        }
        std::fs::write(&archive_path, &data)?;

        replace_with_archive(path, &archive_path)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        let file = File::open(path)?;
        Ok(Box::new(brotli::Decompressor::new(file, BUFFER_SIZE)))
    }
}

/// Gzip archiver.
#[derive(Debug, Clone, Copy, Default)]
pub struct GzipArchiver;

impl Archiver for GzipArchiver {
    fn extension(&self) -> Option<&'static str> {
        Some(GZIP_EXTENSION)
    }

    fn archive(&self, path: &Path) -> io::Result<PathBuf> {
        let archive_path = with_appended_extension(path, GZIP_EXTENSION);
        let mut input = BufReader::new(File::open(path)?);
        let output = BufWriter::new(File::create(&archive_path)?);

        let mut encoder = GzEncoder::new(output, Compression::best());
        io::copy(&mut input, &mut encoder)?;
        encoder.finish()?.flush()?;

        replace_with_archive(path, &archive_path)
    }

    fn open(&self, path: &Path) -> io::Result<Box<dyn Read>> {
        let file = BufReader::new(File::open(path)?);
        Ok(Box::new(MultiGzDecoder::new(file)))
    }
}

fn with_appended_extension(path: &Path, extension: &str) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".");
    name.push(extension);
    PathBuf::from(name)
}

fn replace_with_archive(path: &Path, archive_path: &Path) -> io::Result<PathBuf> {
    let text_len = std::fs::metadata(path)?.len();
    let archive_len = std::fs::metadata(archive_path)?.len();
    debug!(
        "Archived {} ({} bytes) into {} ({} bytes)",
        path.display(),
        text_len,
        archive_path.display(),
        archive_len
    );

    std::fs::remove_file(path)?;
    Ok(archive_path.to_owned())
}

/// Available archive formats.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum ArchiveFormat {
    Brotli,
    Gzip,
    Plain,
}

impl ArchiveFormat {
    pub const VALUES: [ArchiveFormat; 3] =
        [ArchiveFormat::Brotli, ArchiveFormat::Gzip, ArchiveFormat::Plain];

    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ArchiveFormat::Brotli => "brotli",
            ArchiveFormat::Gzip => "gzip",
            ArchiveFormat::Plain => "plain",
        }
    }

    #[must_use]
    pub fn archiver(&self) -> Box<dyn Archiver> {
        match self {
            ArchiveFormat::Brotli => Box::new(BrotliArchiver::default()),
            ArchiveFormat::Gzip => Box::new(GzipArchiver),
            ArchiveFormat::Plain => Box::new(PlainArchiver),
        }
    }

    /// Guesses the format of an archive from its extension. Anything not
    /// recognized is treated as a plain transcript.
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(OsStr::to_str) {
            Some(BROTLI_EXTENSION) => ArchiveFormat::Brotli,
            Some(GZIP_EXTENSION) => ArchiveFormat::Gzip,
            _ => ArchiveFormat::Plain,
        }
    }
}

impl Default for ArchiveFormat {
    fn default() -> Self {
        ArchiveFormat::Brotli
    }
}

impl Display for ArchiveFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for ArchiveFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::VALUES
            .into_iter()
            .find(|format| format.name() == s)
            .ok_or_else(|| format!("Unknown archive format: {}", s))
    }
}

/// Path of the plain text transcript written for `target` into `output_dir`:
/// the target file name with FASTA and gzip extensions stripped, followed by
/// `.sccg`.
#[must_use]
pub fn transcript_path(output_dir: &Path, target: &Path) -> PathBuf {
    let mut stem = target
        .file_name()
        .map(Path::new)
        .unwrap_or_else(|| Path::new("target"));
    while let (Some(inner), Some(ext)) = (stem.file_stem(), stem.extension()) {
        let ext = ext.to_string_lossy().to_ascii_lowercase();
        if !["gz", "fa", "fasta", "fna", "txt"].contains(&ext.as_str()) {
            break;
        }
        stem = Path::new(inner);
    }

    output_dir.join(with_appended_extension(stem, TRANSCRIPT_EXTENSION))
}

/// Path of the FASTA file restored from `archive` into `output_dir`: the
/// archive file name with the archiver and `.sccg` extensions stripped,
/// followed by `.fa`.
#[must_use]
pub fn restored_path(output_dir: &Path, archive: &Path) -> PathBuf {
    let stem = archive
        .file_name()
        .map(Path::new)
        .unwrap_or_else(|| Path::new("target"));
    let stem = strip_extension(stem, &[BROTLI_EXTENSION, GZIP_EXTENSION]);
    let stem = strip_extension(stem, &[TRANSCRIPT_EXTENSION]);

    output_dir.join(with_appended_extension(stem, FASTA_EXTENSION))
}

fn strip_extension<'a>(path: &'a Path, extensions: &[&str]) -> &'a Path {
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) if extensions.iter().any(|known| ext == OsStr::new(known)) => {
            Path::new(stem)
        }
        _ => path,
    }
}

/// Opens a transcript, picking the archiver by the file extension.
pub fn open_transcript(path: &Path) -> io::Result<Box<dyn Read>> {
    let format = ArchiveFormat::from_path(path);
    debug!("Opening {} as a {} archive", path.display(), format);

    format.archiver().open(path)
}
