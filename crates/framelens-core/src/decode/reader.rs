use super::error::DecodeError;
use crate::{Endianness, FieldDef, FieldType};

pub struct FieldReader<'a> {
    data: &'a [u8],
}

impl<'a> FieldReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data }
    }

    /// Exactly `field.length` bytes at `field.offset`.
    pub fn read_slice(&self, field: &FieldDef) -> Result<&'a [u8], DecodeError> {
        let data_len = self.data.len();
        let start = usize::try_from(field.offset)
            .ok()
            .filter(|start| *start < data_len)
            .ok_or(DecodeError::OffsetOutOfRange {
                offset: field.offset,
                data_len,
            })?;
        if field.length <= 0 {
            return Err(DecodeError::InvalidLength {
                field: field.name.clone(),
                length: field.length,
            });
        }
        let beyond = || DecodeError::BeyondData {
            field: field.name.clone(),
            offset: field.offset,
            length: field.length,
            data_len,
        };
        let end = usize::try_from(field.length)
            .ok()
            .and_then(|length| start.checked_add(length))
            .ok_or_else(beyond)?;
        self.data.get(start..end).ok_or_else(beyond)
    }
}

/// Natural-width window of `bytes` in little-endian order.
///
/// Big endianness reverses the whole slice first, so an oversized field
/// contributes its trailing bytes.
pub fn le_window<const N: usize>(
    bytes: &[u8],
    endian: Endianness,
    field_type: FieldType,
) -> Result<[u8; N], DecodeError> {
    if bytes.len() < N {
        return Err(DecodeError::Insufficient { field_type });
    }
    let mut window = [0u8; N];
    match endian {
        Endianness::Little => window.copy_from_slice(&bytes[..N]),
        Endianness::Big => {
            for (dst, src) in window.iter_mut().zip(bytes.iter().rev()) {
                *dst = *src;
            }
        }
    }
    Ok(window)
}

#[cfg(test)]
mod tests {
    use super::{FieldReader, le_window};
    use crate::decode::error::DecodeError;
    use crate::{Endianness, FieldDef, FieldType};

    fn field(offset: i64, length: i64) -> FieldDef {
        FieldDef::new("f", offset, length, FieldType::Fixed, Endianness::Little)
    }

    #[test]
    fn read_slice_ok() {
        let data = [1u8, 2, 3, 4, 5, 6];
        let reader = FieldReader::new(&data);
        assert_eq!(reader.read_slice(&field(2, 3)).unwrap(), &[3, 4, 5]);
        assert_eq!(reader.read_slice(&field(5, 1)).unwrap(), &[6]);
    }

    #[test]
    fn read_slice_offset_out_of_range() {
        let data = [0u8; 4];
        let reader = FieldReader::new(&data);
        assert!(matches!(
            reader.read_slice(&field(4, 1)),
            Err(DecodeError::OffsetOutOfRange { offset: 4, data_len: 4 })
        ));
        assert!(matches!(
            reader.read_slice(&field(-1, 1)),
            Err(DecodeError::OffsetOutOfRange { .. })
        ));
    }

    #[test]
    fn read_slice_rejects_non_positive_length() {
        let data = [0u8; 4];
        let reader = FieldReader::new(&data);
        assert!(matches!(
            reader.read_slice(&field(0, 0)),
            Err(DecodeError::InvalidLength { length: 0, .. })
        ));
    }

    #[test]
    fn read_slice_beyond_data() {
        let data = [0u8; 6];
        let reader = FieldReader::new(&data);
        let err = reader.read_slice(&field(5, 4)).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Field 'f' (offset 5, length 4) extends beyond data length 6"
        );
        assert!(matches!(
            reader.read_slice(&field(1, i64::MAX)),
            Err(DecodeError::BeyondData { .. })
        ));
    }

    #[test]
    fn window_reverses_for_big_endian() {
        let bytes = [0x01, 0x02, 0x03];
        let little: [u8; 2] = le_window(&bytes, Endianness::Little, FieldType::UInt16).unwrap();
        let big: [u8; 2] = le_window(&bytes, Endianness::Big, FieldType::UInt16).unwrap();
        assert_eq!(little, [0x01, 0x02]);
        assert_eq!(big, [0x03, 0x02]);
    }

    #[test]
    fn window_needs_natural_width() {
        let err = le_window::<4>(&[0, 0], Endianness::Little, FieldType::UInt32).unwrap_err();
        assert_eq!(err.to_string(), "Insufficient data for UInt32");
    }
}
