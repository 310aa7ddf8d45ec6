pub trait WriteBytesLe {
    fn write_le(&self, dst: &mut Vec<u8>);
}

macro_rules! impl_num_le {
    ($($t:ty),+) => { $(
        impl WriteBytesLe for $t { #[inline] fn write_le(&self, dst: &mut Vec<u8>) { dst.extend_from_slice(&self.to_le_bytes()); }}
    )+ }
}

impl_num_le!(u8, u16, i16, u32, i32, f32);

impl<const N: usize> WriteBytesLe for [u8; N] {
    #[inline]
    fn write_le(&self, dst: &mut Vec<u8>) {
        dst.extend_from_slice(self);
    }
}

impl<T: WriteBytesLe> WriteBytesLe for [T] {
    #[inline]
    fn write_le(&self, dst: &mut Vec<u8>) {
        self.iter().for_each(|item| item.write_le(dst));
    }
}

#[macro_export]
macro_rules! join_bytes_le {
    ( $($value:expr),+ $(,)? ) => {{
        let mut vec = Vec::<u8>::new();
        $( $value.write_le(&mut vec); )+
        vec
    }};
}

/// Bounds-checked little-endian field access into a byte slice.
pub trait ReadBytesLe {
    fn u16_le(&self, offset: usize) -> Option<u16>;
    fn u32_le(&self, offset: usize) -> Option<u32>;
}

impl ReadBytesLe for [u8] {
    fn u16_le(&self, offset: usize) -> Option<u16> {
        Some(u16::from_le_bytes(self.get(offset..offset + 2)?.try_into().ok()?))
    }

    fn u32_le(&self, offset: usize) -> Option<u32> {
        Some(u32::from_le_bytes(self.get(offset..offset + 4)?.try_into().ok()?))
    }
}
