//! Bitstream I/O utilities for LTC frame parsing.
//!
//! LTC transmits every field least-significant bit first, so frames are
//! packed LSB-first into bytes and read back through a little-endian
//! [`BitReader`].

use std::io;

use bitstream_io::{BitRead, BitReader, LittleEndian, UnsignedInteger};

#[derive(Debug)]
pub struct BitstreamIoReader<R: io::Read + io::Seek> {
    bs: BitReader<R, LittleEndian>,
}

pub type BsIoSliceReader<'a> = BitstreamIoReader<io::Cursor<&'a [u8]>>;

impl<R> BitstreamIoReader<R>
where
    R: io::Read + io::Seek,
{
    pub fn new(read: R) -> Self {
        Self {
            bs: BitReader::new(read),
        }
    }

    #[inline(always)]
    pub fn get(&mut self) -> io::Result<bool> {
        self.bs.read_bit()
    }

    #[inline(always)]
    pub fn get_n<I: UnsignedInteger>(&mut self, n: u32) -> io::Result<I> {
        match self.bs.read_unsigned_var(n) {
            Ok(val) => Ok(val),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "get_n({}): out of bounds bits at {}",
                    n,
                    self.bs.position_in_bits().unwrap_or(0)
                ),
            )),
            Err(e) => Err(e),
        }
    }
}

impl<'a> BsIoSliceReader<'a> {
    pub fn from_slice(buf: &'a [u8]) -> Self {
        Self::new(io::Cursor::new(buf))
    }
}

#[test]
fn reads_lsb_first() -> io::Result<()> {
    // 0b1010_0110: first bit read is bit 0 (0), nibble is 0x6
    let data = [0b1010_0110u8, 0xFF];
    let mut reader = BsIoSliceReader::from_slice(&data);

    assert_eq!(reader.get_n::<u8>(4)?, 0x6);
    assert!(!reader.get()?);
    assert!(reader.get()?);
    assert_eq!(reader.get_n::<u8>(2)?, 0b10);
    assert_eq!(reader.get_n::<u8>(8)?, 0xFF);
    assert!(reader.get().is_err());
    Ok(())
}
