use std::{
    borrow::Cow,
    fs::{File, OpenOptions},
    io::{self, ErrorKind, Seek, Write},
    path::{Path, PathBuf},
};

use crate::error::{Error, Result};

/// Size of the in-memory buffer when none is given.
pub const DEFAULT_SIZE: usize = 1_024_000;

/// Largest slice a file-backed reader holds at once.
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Content shared by readers and writers.
///
/// Implementations do no synchronization of their own. They are only ever reached through
/// [`SharedResource`](crate::shared::SharedResource) guards, so `read` runs under shared access
/// and `write` under exclusive access.
pub trait Resource: Send + Sync {
    fn read(&self) -> Result<Cow<'_, [u8]>>;
    /// Feeds the content to `f` front to back, in as many slices as the resource likes.
    fn for_each_chunk(&self, f: &mut dyn FnMut(&[u8])) -> Result<()> {
        f(&self.read()?);
        Ok(())
    }
    /// Replaces the whole content with `bytes`.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;
}

/// In-memory byte buffer.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Buffer(Vec<u8>);

impl Buffer {
    pub fn zeroed(len: usize) -> Self {
        Self(vec![0; len])
    }
    pub fn as_slice(&self) -> &[u8] {
        &self.0
    }
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.0
    }
}

impl From<Vec<u8>> for Buffer {
    fn from(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }
}

impl Resource for Buffer {
    fn read(&self) -> Result<Cow<'_, [u8]>> {
        Ok(Cow::Borrowed(&self.0))
    }
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.0.clear();
        self.0.extend_from_slice(bytes);
        Ok(())
    }
}

/// Pre-existing file, opened for reading and writing once at setup.
#[derive(Debug)]
pub struct FileResource {
    path: PathBuf,
    file: File,
}

impl FileResource {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(&path)
            .map_err(|source| Error::Setup {
                path: path.clone(),
                source,
            })?;
        Ok(Self { path, file })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[cfg(unix)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    std::os::unix::fs::FileExt::read_at(file, buf, offset)
}

#[cfg(windows)]
fn read_at(file: &File, buf: &mut [u8], offset: u64) -> io::Result<usize> {
    std::os::windows::fs::FileExt::seek_read(file, buf, offset)
}

impl Resource for FileResource {
    fn read(&self) -> Result<Cow<'_, [u8]>> {
        let mut bytes = Vec::new();
        self.for_each_chunk(&mut |chunk| bytes.extend_from_slice(chunk))?;
        Ok(Cow::Owned(bytes))
    }
    // Positional reads on the handle opened at setup: no shared cursor between concurrent
    // readers, and they see the same file the writer writes even if the path is replaced.
    fn for_each_chunk(&self, f: &mut dyn FnMut(&[u8])) -> Result<()> {
        let mut chunk = vec![0; CHUNK_SIZE];
        let mut offset = 0;
        loop {
            match read_at(&self.file, &mut chunk, offset) {
                Ok(0) => return Ok(()),
                Ok(n) => {
                    f(&chunk[..n]);
                    offset += n as u64;
                }
                Err(e) if e.kind() == ErrorKind::Interrupted => {}
                Err(source) => return Err(Error::Io { op: "read", source }),
            }
        }
    }
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let io = |source| Error::Io { op: "write", source };
        self.file.set_len(0).map_err(io)?;
        self.file.rewind().map_err(io)?;
        self.file.write_all(bytes).map_err(io)?;
        self.file.flush().map_err(io)
    }
}

#[cfg(test)]
mod tests {
    use crate::error::Error;
    use crate::resource::{Buffer, FileResource, Resource, CHUNK_SIZE};
    use std::io::Write;

    #[test]
    fn buffer_write_replaces_content() {
        let mut buf = Buffer::zeroed(8);
        assert_eq!(buf.read().unwrap().as_ref(), &[0; 8]);
        buf.write(&[1, 2, 3]).unwrap();
        assert_eq!(buf.read().unwrap().as_ref(), &[1, 2, 3]);
    }

    #[test]
    fn file_write_truncates() {
        let mut tmp = tempfile::NamedTempFile::new().unwrap();
        tmp.write_all(b"longer original content").unwrap();

        let mut res = FileResource::open(tmp.path()).unwrap();
        assert_eq!(res.read().unwrap().as_ref(), b"longer original content");
        res.write(b"short").unwrap();
        assert_eq!(res.read().unwrap().as_ref(), b"short");
        assert_eq!(std::fs::read(tmp.path()).unwrap(), b"short");
    }

    #[test]
    fn missing_file_is_setup_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing");
        match FileResource::open(&path) {
            Err(Error::Setup { path: p, .. }) => assert_eq!(p, path),
            other => panic!("expected setup error, got {other:?}"),
        }
    }

    #[test]
    fn readers_follow_the_open_file_not_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let shared = dir.path().join("shared");
        let moved = dir.path().join("moved");
        std::fs::write(&shared, b"before").unwrap();

        let mut res = FileResource::open(&shared).unwrap();
        std::fs::rename(&shared, &moved).unwrap();
        std::fs::write(&shared, b"unrelated").unwrap();

        res.write(b"writer content").unwrap();
        assert_eq!(res.read().unwrap().as_ref(), b"writer content");
        assert_eq!(std::fs::read(&moved).unwrap(), b"writer content");
        assert_eq!(std::fs::read(&shared).unwrap(), b"unrelated");
    }

    #[test]
    fn large_file_is_read_in_bounded_chunks() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let mut res = FileResource::open(tmp.path()).unwrap();
        let content = (0..CHUNK_SIZE * 3 + 17)
            .map(|i| (i % 251) as u8)
            .collect::<Vec<_>>();
        res.write(&content).unwrap();

        let mut sizes = Vec::new();
        let mut seen = Vec::new();
        res.for_each_chunk(&mut |chunk| {
            sizes.push(chunk.len());
            seen.extend_from_slice(chunk);
        })
        .unwrap();
        assert!(sizes.len() > 1);
        assert!(sizes.iter().all(|n| *n <= CHUNK_SIZE));
        assert_eq!(seen, content);
    }

    #[test]
    fn buffer_hands_over_one_chunk() {
        let buf = Buffer::from(vec![5; 10]);
        let mut chunks = 0;
        buf.for_each_chunk(&mut |chunk| {
            chunks += 1;
            assert_eq!(chunk, &[5; 10]);
        })
        .unwrap();
        assert_eq!(chunks, 1);
    }
}
