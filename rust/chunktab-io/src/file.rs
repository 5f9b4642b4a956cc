//! File-backed [`ReadAt`] and [`SealingWrite`].

use std::{
    fs::File,
    io::{BufWriter, Write},
    ops::Range,
    path::Path,
};

use crate::{ReadAt, SealingWrite, verify};

/// Positional reader over an immutable file. The size is taken once at open.
pub struct FileReader {
    file: File,
    size: u64,
}

impl FileReader {
    pub fn open<P: AsRef<Path>>(path: P) -> std::io::Result<FileReader> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        Ok(FileReader { file, size })
    }
}

impl ReadAt for FileReader {
    fn size(&self) -> std::io::Result<u64> {
        Ok(self.size)
    }

    fn read_at(&self, range: Range<u64>) -> std::io::Result<Vec<u8>> {
        verify!(range.end >= range.start);
        let start = range.start.min(self.size);
        let end = range.end.min(self.size);
        let mut buf = vec![0u8; (end - start) as usize];
        if !buf.is_empty() {
            read_exact_at(&self.file, &mut buf, start)?;
        }
        Ok(buf)
    }
}

/// Buffered writer to a newly created file. Sealing flushes and syncs it to disk.
pub struct FileWriter {
    inner: Option<BufWriter<File>>,
}

impl FileWriter {
    /// Creates a new file at `path`; fails if the file already exists.
    pub fn create<P: AsRef<Path>>(path: P) -> std::io::Result<FileWriter> {
        Ok(FileWriter {
            inner: Some(BufWriter::new(File::create_new(path)?)),
        })
    }
}

fn sealed() -> std::io::Error {
    std::io::Error::other("file writer is sealed")
}

impl SealingWrite for FileWriter {
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.inner.as_mut().ok_or_else(sealed)?.write_all(buf)
    }

    fn seal(&mut self) -> std::io::Result<()> {
        let file = self
            .inner
            .take()
            .ok_or_else(sealed)?
            .into_inner()
            .map_err(|e| e.into_error())?;
        file.sync_all()
    }
}

#[cfg(unix)]
fn read_exact_at(file: &File, buf: &mut [u8], offset: u64) -> std::io::Result<()> {
    std::os::unix::fs::FileExt::read_exact_at(file, buf, offset)
}

#[cfg(windows)]
fn read_exact_at(file: &File, mut buf: &mut [u8], mut offset: u64) -> std::io::Result<()> {
    use std::os::windows::fs::FileExt;

    while !buf.is_empty() {
        let n = file.seek_read(buf, offset)?;
        if n == 0 {
            return Err(std::io::ErrorKind::UnexpectedEof.into());
        }
        buf = &mut buf[n..];
        offset += n as u64;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::{
        ReadAt, SealingWrite,
        file::{FileReader, FileWriter},
    };

    #[test]
    fn test_write_then_read_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("rows.bin");
        let mut writer = FileWriter::create(&path).unwrap();
        for row in 0u8..10 {
            writer.write_all(&[row; 8]).unwrap();
        }
        writer.seal().unwrap();
        assert!(writer.write_all(b"late").is_err());
        assert!(writer.seal().is_err());

        let reader = FileReader::open(&path).unwrap();
        assert_eq!(reader.size().unwrap(), 80);
        for row in 0u64..10 {
            assert_eq!(reader.read_at(row * 8 + 2..row * 8 + 6).unwrap(), vec![row as u8; 4]);
        }
    }

    #[test]
    fn test_reads_clip_at_end_of_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("short.bin");
        std::fs::write(&path, b"0123456789").unwrap();

        let reader = FileReader::open(&path).unwrap();
        assert_eq!(reader.read_at(6..16).unwrap(), b"6789".to_vec());
        assert!(reader.read_at(10..12).unwrap().is_empty());
        assert!(reader.read_at(20..30).unwrap().is_empty());
        assert!(reader.read_at(std::ops::Range { start: 5, end: 3 }).is_err());
    }

    #[test]
    fn test_create_refuses_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("exists.bin");
        std::fs::write(&path, b"x").unwrap();
        assert!(FileWriter::create(&path).is_err());
    }
}
