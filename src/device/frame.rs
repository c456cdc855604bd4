/**
 * Decode a raw measurement frame as notified by the device.
 *
 * The DISTO sends the distance as a 32-bit IEEE-754 float (little endian) in
 * the first four bytes of the payload, in meters. Any trailing bytes are
 * ignored. Frames shorter than four bytes carry no measurement and decode to
 * None.
 */
pub fn decode_distance(frame: &[u8]) -> Option<f32> {
    let bytes: [u8; 4] = frame.get(..4)?.try_into().ok()?;
    Some(f32::from_le_bytes(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_little_endian_float() {
        assert_eq!(decode_distance(&[0x00, 0x00, 0x80, 0x3F]), Some(1.0));
    }

    #[test]
    fn decodes_typical_reading() {
        assert_eq!(decode_distance(&[0x9A, 0x99, 0x19, 0x40]), Some(2.4));
    }

    #[test]
    fn ignores_trailing_bytes() {
        assert_eq!(decode_distance(&[0x00, 0x00, 0x80, 0x3F, 0xAA, 0xBB]), Some(1.0));
    }

    #[test]
    fn rejects_short_frames() {
        assert_eq!(decode_distance(&[]), None);
        assert_eq!(decode_distance(&[0x9A]), None);
        assert_eq!(decode_distance(&[0x9A, 0x99]), None);
        assert_eq!(decode_distance(&[0x9A, 0x99, 0x19]), None);
    }
}
