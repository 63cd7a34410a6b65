use std::fmt;

use crc::{Crc, CRC_16_GENIBUS};
use num_enum::TryFromPrimitive;

/// CRC-16 used by `.basis` headers (CRC-16/GENIBUS: poly 0x1021, init and
/// xorout 0xFFFF, not reflected).
pub static BASIS_CRC: Crc<u16> = Crc::<u16>::new(&CRC_16_GENIBUS);

pub fn crc16(data: &[u8]) -> u16 {
    BASIS_CRC.checksum(data)
}

pub fn enum_name_or_hex<T>(raw: T::Primitive) -> String
where
    T: TryFromPrimitive + fmt::Debug,
    T::Primitive: fmt::LowerHex,
{
    match T::try_from_primitive(raw) {
        Ok(variant) => format!("{:?}", variant),
        Err(_) => format!("0x{:x}", raw),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crc16_empty_is_zero() {
        assert_eq!(crc16(&[]), 0);
    }

    #[test]
    fn crc16_matches_genibus_check_value() {
        assert_eq!(crc16(b"123456789"), 0xD64E);
    }

    #[test]
    fn crc16_detects_single_bit_flip() {
        let a = crc16(b"basis universal");
        let b = crc16(b"basis universam");
        assert_ne!(a, b);
    }

    #[test]
    fn crc16_streams_in_pieces() {
        let mut digest = BASIS_CRC.digest();
        digest.update(b"hello ");
        digest.update(b"world");
        assert_eq!(digest.finalize(), crc16(b"hello world"));
    }
}
