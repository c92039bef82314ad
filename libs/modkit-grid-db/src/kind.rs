use std::fmt;

/// Logical column type, used to coerce grid filter values into `SeaORM` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    String,
    I64,
    F64,
    Bool,
    Uuid,
    DateTimeUtc,
    Date,
    Time,
    Decimal,
}

impl FieldKind {
    /// Kinds that support ordered comparisons and ranges.
    #[must_use]
    pub fn is_ordered(self) -> bool {
        !matches!(self, FieldKind::Bool | FieldKind::Uuid)
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::String => "String",
            FieldKind::I64 => "I64",
            FieldKind::F64 => "F64",
            FieldKind::Bool => "Bool",
            FieldKind::Uuid => "Uuid",
            FieldKind::DateTimeUtc => "DateTimeUtc",
            FieldKind::Date => "Date",
            FieldKind::Time => "Time",
            FieldKind::Decimal => "Decimal",
        };
        f.write_str(name)
    }
}
