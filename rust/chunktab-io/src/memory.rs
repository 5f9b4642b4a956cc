use std::ops::Range;

use crate::{ReadAt, SealingWrite, verify};

fn read_slice(content: &[u8], range: Range<u64>) -> std::io::Result<Vec<u8>> {
    verify!(range.end >= range.start);
    let len = content.len() as u64;
    if range.start >= len {
        return Ok(Vec::new());
    }
    let end = range.end.min(len);
    Ok(content[range.start as usize..end as usize].to_vec())
}

impl ReadAt for Vec<u8> {
    fn size(&self) -> std::io::Result<u64> {
        Ok(self.len() as u64)
    }

    fn read_at(&self, range: Range<u64>) -> std::io::Result<Vec<u8>> {
        read_slice(self, range)
    }
}

impl ReadAt for Box<[u8]> {
    fn size(&self) -> std::io::Result<u64> {
        Ok(self.len() as u64)
    }

    fn read_at(&self, range: Range<u64>) -> std::io::Result<Vec<u8>> {
        read_slice(self, range)
    }
}

impl SealingWrite for Vec<u8> {
    fn write_all(&mut self, buf: &[u8]) -> std::io::Result<()> {
        self.extend_from_slice(buf);
        Ok(())
    }

    fn seal(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::{ReadAt, SealingWrite};

    #[test]
    fn test_vec_read_at() {
        let data: Vec<u8> = (0u8..16).collect();
        assert_eq!(data.size().unwrap(), 16);
        assert_eq!(data.read_at(2..5).unwrap(), vec![2, 3, 4]);
        // Short only at end-of-object.
        assert_eq!(data.read_at(14..20).unwrap(), vec![14, 15]);
        assert!(data.read_at(16..20).unwrap().is_empty());
        assert!(data.read_at(5..3).is_err());
    }

    #[test]
    fn test_vec_sealing_write() {
        let mut buf = Vec::new();
        buf.write_all(b"abc").unwrap();
        buf.write_all(b"def").unwrap();
        buf.seal().unwrap();
        let boxed: Box<[u8]> = buf.into_boxed_slice();
        assert_eq!(boxed.read_at(1..4).unwrap(), b"bcd".to_vec());
    }
}
