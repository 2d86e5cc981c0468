//! Compression codecs for version files.
//!
//! Each algorithm implements [`StreamCodec`]; [`Compression::codec`] picks the
//! implementation. File-level helpers stream through a temporary file in the
//! destination directory and rename it into place, so a failed write never
//! leaves a partial file behind.

use crate::error::IoContext;
use crate::{VersionError, VersionResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File, FileTimes, Metadata};
use std::io::{self, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Compression algorithm applied to a version file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Compression {
    #[default]
    #[serde(rename = "none")]
    None,
    #[serde(rename = "gz")]
    Gzip,
    #[serde(rename = "bz2")]
    Bz2,
    #[serde(rename = "xz")]
    Xz,
}

impl Compression {
    pub const ALL: [Compression; 4] = [
        Compression::None,
        Compression::Gzip,
        Compression::Bz2,
        Compression::Xz,
    ];

    /// Canonical tag, also used as the file extension.
    pub fn tag(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Gzip => "gz",
            Compression::Bz2 => "bz2",
            Compression::Xz => "xz",
        }
    }

    /// Extension appended to compressed versions, without the dot.
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            Compression::None => None,
            other => Some(other.tag()),
        }
    }

    /// Infer the algorithm from a path's final extension.
    pub fn from_path(path: &Path) -> Self {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(Self::from_extension)
            .unwrap_or_default()
    }

    /// Map an extension (without the dot, any case) to an algorithm.
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_lowercase().as_str() {
            "gz" => Compression::Gzip,
            "bz2" => Compression::Bz2,
            "xz" => Compression::Xz,
            _ => Compression::None,
        }
    }

    /// The codec implementing this algorithm.
    pub fn codec(&self) -> &'static dyn StreamCodec {
        match self {
            Compression::None => &PlainCodec,
            Compression::Gzip => &GzipCodec,
            Compression::Bz2 => &Bzip2Codec,
            Compression::Xz => &XzCodec,
        }
    }
}

impl FromStr for Compression {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(Compression::None),
            "gz" | "gzip" => Ok(Compression::Gzip),
            "bz2" | "bzip2" => Ok(Compression::Bz2),
            "xz" | "lzma" => Ok(Compression::Xz),
            other => Err(VersionError::config(format!(
                "unknown compression '{other}' (expected none, gz, bz2 or xz)"
            ))),
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

/// A streaming compression algorithm.
pub trait StreamCodec: Sync {
    /// Compress everything from `input` into `output` at the highest level.
    /// Returns the number of uncompressed bytes read.
    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> io::Result<u64>;

    /// Decompress everything from `input` into `output`.
    /// Returns the number of decompressed bytes written.
    fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> io::Result<u64>;
}

/// Byte-identical copy.
pub struct PlainCodec;

impl StreamCodec for PlainCodec {
    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> io::Result<u64> {
        io::copy(input, output)
    }

    fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> io::Result<u64> {
        io::copy(input, output)
    }
}

/// gzip via flate2.
pub struct GzipCodec;

impl StreamCodec for GzipCodec {
    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> io::Result<u64> {
        let mut encoder = flate2::write::GzEncoder::new(output, flate2::Compression::best());
        let bytes = io::copy(input, &mut encoder)?;
        encoder.finish()?;
        Ok(bytes)
    }

    fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> io::Result<u64> {
        let mut decoder = flate2::read::MultiGzDecoder::new(input);
        io::copy(&mut decoder, output)
    }
}

/// bzip2.
pub struct Bzip2Codec;

impl StreamCodec for Bzip2Codec {
    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> io::Result<u64> {
        let mut encoder = bzip2::write::BzEncoder::new(output, bzip2::Compression::best());
        let bytes = io::copy(input, &mut encoder)?;
        encoder.finish()?;
        Ok(bytes)
    }

    fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> io::Result<u64> {
        let mut decoder = bzip2::read::MultiBzDecoder::new(input);
        io::copy(&mut decoder, output)
    }
}

/// xz (LZMA2), preset 9.
pub struct XzCodec;

impl StreamCodec for XzCodec {
    fn encode(&self, input: &mut dyn Read, output: &mut dyn Write) -> io::Result<u64> {
        let mut encoder = xz2::write::XzEncoder::new(output, 9);
        let bytes = io::copy(input, &mut encoder)?;
        encoder.finish()?;
        Ok(bytes)
    }

    fn decode(&self, input: &mut dyn Read, output: &mut dyn Write) -> io::Result<u64> {
        let mut decoder = xz2::read::XzDecoder::new_multi_decoder(input);
        io::copy(&mut decoder, output)
    }
}

/// How the finished temporary file is moved onto the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Persist {
    /// Fail if the destination already exists.
    NoClobber,
    /// Replace any existing destination.
    Replace,
}

/// Compress `source` into a new file at `dest`.
///
/// `dest` must not exist yet. The source's access time, modification time and
/// permission bits are copied onto the result.
pub fn compress_file(source: &Path, dest: &Path, compression: Compression) -> VersionResult<u64> {
    debug!(
        source = %source.display(),
        dest = %dest.display(),
        compression = compression.tag(),
        "Compressing file"
    );
    let codec = compression.codec();
    write_through(source, dest, Persist::NoClobber, |input, output| {
        codec.encode(input, output)
    })
    .map_err(|e| annotate(e, "compress", source, compression))
}

/// Decompress `source` into `dest`, replacing any existing file.
///
/// The algorithm is inferred from the extension of `source`. Metadata is
/// copied from `source` onto `dest`.
pub fn decompress_file(source: &Path, dest: &Path) -> VersionResult<u64> {
    let compression = Compression::from_path(source);
    debug!(
        source = %source.display(),
        dest = %dest.display(),
        compression = compression.tag(),
        "Decompressing file"
    );
    let codec = compression.codec();
    write_through(source, dest, Persist::Replace, |input, output| {
        codec.decode(input, output)
    })
    .map_err(|e| annotate(e, "decompress", source, compression))
}

fn annotate(err: VersionError, verb: &str, source: &Path, compression: Compression) -> VersionError {
    match err {
        VersionError::Io { context, source: io_err } => VersionError::io(
            format!(
                "Failed to {verb} {} ({}): {context}",
                source.display(),
                compression.tag()
            ),
            io_err,
        ),
        other => other,
    }
}

fn write_through<F>(source: &Path, dest: &Path, persist: Persist, transform: F) -> VersionResult<u64>
where
    F: FnOnce(&mut dyn Read, &mut dyn Write) -> io::Result<u64>,
{
    let metadata = fs::metadata(source).context_with(|| "reading source metadata")?;
    let mut input = BufReader::new(File::open(source).context_with(|| "opening source")?);

    let parent = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut temp = tempfile::Builder::new()
        .prefix(".fileversion-")
        .suffix(".tmp")
        .tempfile_in(parent)
        .context_with(|| format!("creating temporary file in {}", parent.display()))?;

    let bytes = {
        let mut output = BufWriter::new(temp.as_file_mut());
        let reader: &mut dyn Read = &mut input;
        let writer: &mut dyn Write = &mut output;
        let bytes = transform(reader, writer).context_with(|| "streaming data")?;
        output.flush().context_with(|| "flushing output")?;
        bytes
    };

    copy_metadata(&metadata, temp.as_file())?;

    let persisted = match persist {
        Persist::NoClobber => temp.persist_noclobber(dest),
        Persist::Replace => temp.persist(dest),
    };
    persisted.map_err(|e| VersionError::io(format!("moving into {}", dest.display()), e.error))?;

    Ok(bytes)
}

/// Copy access/modification times and permission bits onto an open file.
fn copy_metadata(metadata: &Metadata, file: &File) -> VersionResult<()> {
    let accessed = metadata.accessed().context_with(|| "reading access time")?;
    let modified = metadata.modified().context_with(|| "reading modification time")?;
    file.set_times(FileTimes::new().set_accessed(accessed).set_modified(modified))
        .context_with(|| "setting file times")?;
    file.set_permissions(metadata.permissions())
        .context_with(|| "setting permissions")?;
    Ok(())
}
