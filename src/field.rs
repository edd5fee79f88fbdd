//! Column metadata.

/// MariaDB column type codes (`MYSQL_TYPE_*`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FieldType {
    Decimal = 0x00,
    Tiny = 0x01,
    Short = 0x02,
    Long = 0x03,
    Float = 0x04,
    Double = 0x05,
    Null = 0x06,
    Timestamp = 0x07,
    LongLong = 0x08,
    Int24 = 0x09,
    Date = 0x0A,
    Time = 0x0B,
    DateTime = 0x0C,
    Year = 0x0D,
    NewDate = 0x0E,
    VarChar = 0x0F,
    Bit = 0x10,
    Json = 0xF5,
    NewDecimal = 0xF6,
    Enum = 0xF7,
    Set = 0xF8,
    TinyBlob = 0xF9,
    MediumBlob = 0xFA,
    LongBlob = 0xFB,
    Blob = 0xFC,
    VarString = 0xFD,
    String = 0xFE,
    Geometry = 0xFF,
}

impl FieldType {
    /// Map a raw type code. Unknown codes are treated as strings.
    pub fn from_u8(value: u8) -> Self {
        match value {
            0x00 => FieldType::Decimal,
            0x01 => FieldType::Tiny,
            0x02 => FieldType::Short,
            0x03 => FieldType::Long,
            0x04 => FieldType::Float,
            0x05 => FieldType::Double,
            0x06 => FieldType::Null,
            0x07 => FieldType::Timestamp,
            0x08 => FieldType::LongLong,
            0x09 => FieldType::Int24,
            0x0A => FieldType::Date,
            0x0B => FieldType::Time,
            0x0C => FieldType::DateTime,
            0x0D => FieldType::Year,
            0x0E => FieldType::NewDate,
            0x0F => FieldType::VarChar,
            0x10 => FieldType::Bit,
            0xF5 => FieldType::Json,
            0xF6 => FieldType::NewDecimal,
            0xF7 => FieldType::Enum,
            0xF8 => FieldType::Set,
            0xF9 => FieldType::TinyBlob,
            0xFA => FieldType::MediumBlob,
            0xFB => FieldType::LongBlob,
            0xFC => FieldType::Blob,
            0xFD => FieldType::VarString,
            0xFE => FieldType::String,
            0xFF => FieldType::Geometry,
            _ => FieldType::String,
        }
    }

    /// Integer column (YEAR included, as the server sends it as a number).
    pub const fn is_integer(self) -> bool {
        matches!(
            self,
            FieldType::Tiny
                | FieldType::Short
                | FieldType::Long
                | FieldType::LongLong
                | FieldType::Int24
                | FieldType::Year
        )
    }

    /// Any numeric column: integers, floats and decimals.
    pub const fn is_number(self) -> bool {
        self.is_integer()
            || matches!(
                self,
                FieldType::Float | FieldType::Double | FieldType::Decimal | FieldType::NewDecimal
            )
    }

    pub const fn is_temporal(self) -> bool {
        matches!(
            self,
            FieldType::Year
                | FieldType::Date
                | FieldType::NewDate
                | FieldType::Time
                | FieldType::DateTime
                | FieldType::Timestamp
        )
    }
}

/// Column flag bits (`*_FLAG`).
pub mod field_flag {
    pub const NOT_NULL: u32 = 1;
    pub const PRI_KEY: u32 = 1 << 1;
    pub const UNIQUE_KEY: u32 = 1 << 2;
    pub const MULTIPLE_KEY: u32 = 1 << 3;
    pub const BLOB: u32 = 1 << 4;
    pub const UNSIGNED: u32 = 1 << 5;
    pub const ZEROFILL: u32 = 1 << 6;
    pub const BINARY: u32 = 1 << 7;
    pub const ENUM: u32 = 1 << 8;
    pub const AUTO_INCREMENT: u32 = 1 << 9;
    pub const TIMESTAMP: u32 = 1 << 10;
    pub const SET: u32 = 1 << 11;
}

/// Static metadata of one result column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Column name (or alias)
    pub name: String,
    /// Table name (or alias), empty for computed columns
    pub table: String,
    /// Declared type
    pub field_type: FieldType,
    /// Bit set of [`field_flag`] values
    pub flags: u32,
    /// Declared display width
    pub length: u64,
    /// Number of decimals for numeric columns
    pub decimals: u32,
}

impl Field {
    /// Create a column description with no flags.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            table: String::new(),
            field_type,
            flags: 0,
            length: 0,
            decimals: 0,
        }
    }

    /// Builder-style flag setter.
    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags = flags;
        self
    }

    pub fn is_unsigned(&self) -> bool {
        self.flags & field_flag::UNSIGNED != 0
    }

    pub fn is_nullable(&self) -> bool {
        self.flags & field_flag::NOT_NULL == 0
    }

    /// SET column. The server may report these as `STRING` with the SET flag.
    pub fn is_set(&self) -> bool {
        self.field_type == FieldType::Set || self.flags & field_flag::SET != 0
    }

    /// ENUM column. The server may report these as `STRING` with the ENUM flag.
    pub fn is_enum(&self) -> bool {
        self.field_type == FieldType::Enum || self.flags & field_flag::ENUM != 0
    }
}
