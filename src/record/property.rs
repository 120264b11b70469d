//! Property and LabeledProperty wire formats (SPEC_FULL §3), grounded on
//! `original_source/src/property.c` / `property.h`.

use crate::byteorder::{
    read_le_i32, read_le_i64, read_le_u32, read_le_u64, write_le_i32, write_le_i64, write_le_u32,
    write_le_u64,
};

/// On-disk data type tags for [`Property`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum DataType {
    Void = 0x00,
    False = 0x01,
    True = 0x02,
    Integer = 0x03,
    Real = 0x04,
    Ratio = 0x05,
    /// Sized as `i32` despite the name, matching the source literally
    /// (SPEC_FULL §9 open question).
    UChar = 0x06,
    Date = 0x0F,
    String0 = 0x10,
    String1 = 0x11,
    String2 = 0x12,
    String3 = 0x13,
    String4 = 0x14,
    String5 = 0x15,
    String6 = 0x16,
    String7 = 0x17,
    String8 = 0x18,
    String = 0x19,
    Blob = 0x1F,
    Document = 0x20,
    Array = 0x21,
    Symbol = 0x22,
}

impl DataType {
    fn from_u8(v: u8) -> Option<Self> {
        use DataType::*;
        Some(match v {
            0x00 => Void,
            0x01 => False,
            0x02 => True,
            0x03 => Integer,
            0x04 => Real,
            0x05 => Ratio,
            0x06 => UChar,
            0x0F => Date,
            0x10 => String0,
            0x11 => String1,
            0x12 => String2,
            0x13 => String3,
            0x14 => String4,
            0x15 => String5,
            0x16 => String6,
            0x17 => String7,
            0x18 => String8,
            0x19 => String,
            0x1F => Blob,
            0x20 => Document,
            0x21 => Array,
            0x22 => Symbol,
            _ => return None,
        })
    }
}

/// A ratio value, `numerator / denominator`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ratio {
    pub numer: i32,
    pub denom: i32,
}

pub const PROPERTY_DATATYPE_OFFSET: usize = 0;
pub const PROPERTY_DATA_OFFSET: usize = 1;
pub const PROPERTY_DISKSIZE: usize = 9;

/// A small tagged value stored inline in a record (9 bytes on disk).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Property {
    pub data_type: u8,
    pub data: [u8; 8],
}

impl Property {
    /// Load a `Property` from the 9 bytes at the start of `source`.
    pub fn load(source: &[u8]) -> Self {
        let data_type = source[PROPERTY_DATATYPE_OFFSET];
        let mut data = [0u8; 8];
        data.copy_from_slice(&source[PROPERTY_DATA_OFFSET..PROPERTY_DATA_OFFSET + 8]);
        Property { data_type, data }
    }

    /// Serialize this `Property` to the 9 bytes at the start of `dest`.
    pub fn unload(&self, dest: &mut [u8]) {
        dest[PROPERTY_DATATYPE_OFFSET] = self.data_type;
        dest[PROPERTY_DATA_OFFSET..PROPERTY_DATA_OFFSET + 8].copy_from_slice(&self.data);
    }

    fn tag(&self) -> Option<DataType> {
        DataType::from_u8(self.data_type)
    }

    /// Construct a `VOID` property.
    pub fn void() -> Self {
        Property {
            data_type: DataType::Void as u8,
            data: [0; 8],
        }
    }

    /// Construct a boolean property.
    pub fn boolean(v: bool) -> Self {
        Property {
            data_type: if v { DataType::True } else { DataType::False } as u8,
            data: [0; 8],
        }
    }

    /// Construct an `INTEGER` property.
    pub fn integer(v: i64) -> Self {
        let mut data = [0u8; 8];
        write_le_i64(&mut data, v);
        Property {
            data_type: DataType::Integer as u8,
            data,
        }
    }

    /// Construct a `SYMBOL` property referencing the given symbol id.
    pub fn symbol(id: u32) -> Self {
        let mut data = [0u8; 8];
        write_le_u32(&mut data, id);
        Property {
            data_type: DataType::Symbol as u8,
            data,
        }
    }

    /// True iff this is the `VOID` tag.
    pub fn is_void(&self) -> bool {
        self.tag() == Some(DataType::Void)
    }

    /// True iff this is `TRUE` or `FALSE`.
    pub fn is_boolean(&self) -> bool {
        matches!(self.tag(), Some(DataType::True) | Some(DataType::False))
    }

    /// True iff the discriminant falls in `INTEGER..=DATE`.
    pub fn is_numeric(&self) -> bool {
        (DataType::Integer as u8..=DataType::Date as u8).contains(&self.data_type)
    }

    /// True iff the discriminant falls in `STRING_0..=STRING`.
    pub fn is_string(&self) -> bool {
        (DataType::String0 as u8..=DataType::String as u8).contains(&self.data_type)
    }

    /// True iff the value is stored by reference (discriminant ≥ `STRING`).
    pub fn is_reference(&self) -> bool {
        self.data_type >= DataType::String as u8
    }

    /// The boolean value, or `false` for any non-boolean tag.
    pub fn to_bool(&self) -> bool {
        self.tag() == Some(DataType::True)
    }

    /// The `i64` value for `INTEGER`/`DATE`, or `0` otherwise.
    pub fn to_i64(&self) -> i64 {
        match self.tag() {
            Some(DataType::Integer) | Some(DataType::Date) => read_le_i64(&self.data),
            _ => 0,
        }
    }

    /// The `u64` reference id for `DOCUMENT`/`ARRAY`/`BLOB`/`STRING`, or `0`
    /// otherwise.
    pub fn to_u64(&self) -> u64 {
        match self.tag() {
            Some(DataType::Document) | Some(DataType::Array) | Some(DataType::Blob)
            | Some(DataType::String) => read_le_u64(&self.data),
            _ => 0,
        }
    }

    /// The `f64` value for `REAL`, or `0.0` otherwise.
    pub fn to_f64(&self) -> f64 {
        match self.tag() {
            Some(DataType::Real) => crate::byteorder::read_le_f64(&self.data),
            _ => 0.0,
        }
    }

    /// The `i32` value for `UCHAR`, or `0` otherwise.
    pub fn to_i32(&self) -> i32 {
        match self.tag() {
            Some(DataType::UChar) => read_le_i32(&self.data),
            _ => 0,
        }
    }

    /// The symbol id for `SYMBOL`, or `0` otherwise.
    pub fn to_u32(&self) -> u32 {
        match self.tag() {
            Some(DataType::Symbol) => read_le_u32(&self.data),
            _ => 0,
        }
    }

    /// The `Ratio` value for `RATIO`, or `{0, 0}` otherwise.
    pub fn to_ratio(&self) -> Ratio {
        match self.tag() {
            Some(DataType::Ratio) => Ratio {
                numer: read_le_i32(&self.data[0..4]),
                denom: read_le_i32(&self.data[4..8]),
            },
            _ => Ratio { numer: 0, denom: 0 },
        }
    }
}

pub const LABELED_PROPERTY_LABELID_OFFSET: usize = 0;
pub const LABELED_PROPERTY_PROPERTY_OFFSET: usize = 4;
pub const LABELED_PROPERTY_DISKSIZE: usize = 13;

/// A [`Property`] paired with a symbol id naming it (13 bytes on disk).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabeledProperty {
    pub label_id: u32,
    pub prop: Property,
}

impl LabeledProperty {
    /// Load a `LabeledProperty` from the 13 bytes at the start of `source`.
    pub fn load(source: &[u8]) -> Self {
        let label_id = read_le_u32(&source[LABELED_PROPERTY_LABELID_OFFSET..]);
        let prop = Property::load(&source[LABELED_PROPERTY_PROPERTY_OFFSET..]);
        LabeledProperty { label_id, prop }
    }

    /// Serialize this `LabeledProperty` to the 13 bytes at the start of
    /// `dest`.
    pub fn unload(&self, dest: &mut [u8]) {
        write_le_u32(&mut dest[LABELED_PROPERTY_LABELID_OFFSET..], self.label_id);
        self.prop
            .unload(&mut dest[LABELED_PROPERTY_PROPERTY_OFFSET..]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn integer_round_trip() {
        let p = Property::integer(-42);
        let mut buf = [0u8; PROPERTY_DISKSIZE];
        p.unload(&mut buf);
        let reloaded = Property::load(&buf);
        assert_eq!(reloaded.to_i64(), -42);
        assert!(reloaded.is_numeric());
    }

    #[test]
    fn boolean_classification() {
        assert!(Property::boolean(true).is_boolean());
        assert!(Property::boolean(true).to_bool());
        assert!(!Property::boolean(false).to_bool());
    }

    #[test]
    fn void_is_not_reference() {
        let p = Property::void();
        assert!(p.is_void());
        assert!(!p.is_reference());
    }

    #[test]
    fn symbol_round_trip() {
        let p = Property::symbol(7);
        let mut buf = [0u8; PROPERTY_DISKSIZE];
        p.unload(&mut buf);
        assert_eq!(Property::load(&buf).to_u32(), 7);
    }

    #[test]
    fn labeled_property_round_trip() {
        let lp = LabeledProperty {
            label_id: 3,
            prop: Property::integer(100),
        };
        let mut buf = [0u8; LABELED_PROPERTY_DISKSIZE];
        lp.unload(&mut buf);
        let reloaded = LabeledProperty::load(&buf);
        assert_eq!(reloaded.label_id, 3);
        assert_eq!(reloaded.prop.to_i64(), 100);
    }
}
