use super::error::ValidationError;
use crate::FieldDef;

/// Field ends at or beyond this byte index trigger an advisory entry.
pub const SUSPICIOUS_EXTENT: i64 = 1024;

/// Reports every structural defect in `fields`. An empty list is valid.
pub fn validate_fields(fields: &[FieldDef]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    if fields.is_empty() {
        return errors;
    }

    for field in fields {
        check_field(field, &mut errors);
    }

    for (i, first) in fields.iter().enumerate() {
        for second in &fields[i + 1..] {
            if overlaps(first, second) {
                let (first_start, first_end) = first.byte_range();
                let (second_start, second_end) = second.byte_range();
                errors.push(ValidationError::Overlap {
                    first: first.meaning.clone(),
                    first_start,
                    first_end,
                    second: second.meaning.clone(),
                    second_start,
                    second_end,
                });
            }
        }
    }

    let max_end = fields
        .iter()
        .map(|field| field.byte_range().1)
        .max()
        .unwrap_or(0)
        .max(0);
    if max_end >= SUSPICIOUS_EXTENT {
        errors.push(ValidationError::SuspiciousExtent { max_end });
    }

    errors
}

fn check_field(field: &FieldDef, errors: &mut Vec<ValidationError>) {
    if field.offset < 0 {
        errors.push(ValidationError::NegativeOffset {
            field: field.meaning.clone(),
            offset: field.offset,
        });
    }
    if field.length <= 0 {
        errors.push(ValidationError::InvalidLength {
            field: field.meaning.clone(),
            length: field.length,
        });
    }
    if let Some(min) = field.field_type.natural_width() {
        if field.length < min as i64 {
            errors.push(ValidationError::TooShortForType {
                field: field.meaning.clone(),
                field_type: field.field_type,
                min,
            });
        }
    }
}

/// Inclusive ranges intersect. Symmetric in its arguments.
pub(crate) fn overlaps(a: &FieldDef, b: &FieldDef) -> bool {
    let (a_start, a_end) = a.byte_range();
    let (b_start, b_end) = b.byte_range();
    a_start <= b_end && b_start <= a_end
}

#[cfg(test)]
mod tests {
    use super::{SUSPICIOUS_EXTENT, overlaps, validate_fields};
    use crate::schema::ValidationError;
    use crate::{Endianness, FieldDef, FieldType};

    fn field(meaning: &str, offset: i64, length: i64, field_type: FieldType) -> FieldDef {
        FieldDef::new(meaning, offset, length, field_type, Endianness::Little)
    }

    #[test]
    fn empty_schema_is_valid() {
        assert!(validate_fields(&[]).is_empty());
    }

    #[test]
    fn int32_needs_four_bytes() {
        let errors = validate_fields(&[field("count", 0, 2, FieldType::Int32)]);
        assert_eq!(
            errors,
            vec![ValidationError::TooShortForType {
                field: "count".to_string(),
                field_type: FieldType::Int32,
                min: 4,
            }]
        );
        assert_eq!(
            errors[0].to_string(),
            "Field 'count' type Int32 requires at least 4 bytes."
        );

        assert!(validate_fields(&[field("count", 0, 4, FieldType::Int32)]).is_empty());
    }

    #[test]
    fn oversized_numeric_fields_pass() {
        assert!(validate_fields(&[field("wide", 0, 8, FieldType::UInt16)]).is_empty());
    }

    #[test]
    fn variable_width_types_accept_any_positive_length() {
        let fields = [
            field("tag", 0, 1, FieldType::AsciiString),
            field("raw", 1, 3, FieldType::Fixed),
        ];
        assert!(validate_fields(&fields).is_empty());
    }

    #[test]
    fn reports_every_violation_of_a_field() {
        let errors = validate_fields(&[field("bad", -1, 0, FieldType::UInt8)]);
        assert!(errors.contains(&ValidationError::NegativeOffset {
            field: "bad".to_string(),
            offset: -1,
        }));
        assert!(errors.contains(&ValidationError::InvalidLength {
            field: "bad".to_string(),
            length: 0,
        }));
        assert!(errors.iter().any(|e| matches!(e, ValidationError::TooShortForType { min: 1, .. })));
        assert_eq!(
            errors
                .iter()
                .find(|e| matches!(e, ValidationError::TooShortForType { .. }))
                .map(|e| e.to_string()),
            Some("Field 'bad' type UInt8 requires at least 1 byte.".to_string())
        );
    }

    #[test]
    fn overlapping_pairs_are_reported_by_name_and_range() {
        let fields = [
            field("a", 0, 4, FieldType::UInt32),
            field("b", 3, 2, FieldType::UInt16),
            field("c", 10, 1, FieldType::UInt8),
        ];
        let errors = validate_fields(&fields);
        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors[0].to_string(),
            "Fields 'a' (offset 0-3) and 'b' (offset 3-4) overlap."
        );
    }

    #[test]
    fn overlap_is_symmetric() {
        let a = field("a", 2, 4, FieldType::Fixed);
        let b = field("b", 5, 4, FieldType::Fixed);
        let c = field("c", 6, 1, FieldType::Fixed);
        assert!(overlaps(&a, &b) && overlaps(&b, &a));
        assert!(!overlaps(&a, &c) && !overlaps(&c, &a));
    }

    #[test]
    fn sole_field_has_no_overlap() {
        assert!(validate_fields(&[field("only", 0, 4, FieldType::Fixed)]).is_empty());
    }

    #[test]
    fn extreme_offsets_are_reported_without_overflow() {
        let fields = [
            field("far", i64::MAX, 2, FieldType::UInt16),
            field("farther", i64::MAX - 1, 4, FieldType::UInt32),
        ];
        let errors = validate_fields(&fields);
        assert!(errors.iter().any(|e| matches!(e, ValidationError::Overlap { .. })));
        assert!(errors.contains(&ValidationError::SuspiciousExtent { max_end: i64::MAX }));
    }

    #[test]
    fn large_extent_is_advisory() {
        let errors = validate_fields(&[field("far", SUSPICIOUS_EXTENT, 1, FieldType::UInt8)]);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].is_advisory());

        let errors = validate_fields(&[field("near", SUSPICIOUS_EXTENT - 1, 1, FieldType::UInt8)]);
        assert!(errors.is_empty());
    }
}
