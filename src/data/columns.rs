//! Column classification for raw customer tables.
//!
//! Decides which columns of an incoming table are clustering features. The
//! rules are fixed and independent of the data values:
//!
//! 1. a column whose kind is not [`ColumnKind::Numeric`] is excluded as
//!    [`ExclusionReason::NonNumeric`];
//! 2. a numeric column whose name contains an identifier token is excluded as
//!    [`ExclusionReason::Identifier`];
//! 3. every other column is a feature, in schema order.
//!
//! Names are tokenized on `_`, `-`, whitespace and lower-to-upper camel-case
//! boundaries, so `CustomerID`, `customer_id` and `Customer Id` all yield the
//! token `id`, while `Paid` or `Width` do not.

/// Tokens that mark a column as a row identifier.
pub const IDENTIFIER_TOKENS: [&str; 3] = ["id", "uuid", "identifier"];

/// Storage kind of a raw column as reported by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Numeric,
    Text,
    Boolean,
    Other,
}

/// Name and kind of one raw column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSchema {
    pub name: String,
    pub kind: ColumnKind,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    pub fn numeric(name: impl Into<String>) -> Self {
        Self::new(name, ColumnKind::Numeric)
    }
}

/// Why a column was not selected as a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExclusionReason {
    NonNumeric,
    Identifier,
}

/// Outcome of [`classify_columns`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnClassification {
    /// Feature column names, in schema order.
    pub numeric_features: Vec<String>,
    /// Excluded columns with the rule that excluded them, in schema order.
    pub excluded: Vec<(String, ExclusionReason)>,
}

/// Splits the schema into clustering features and excluded columns.
pub fn classify_columns(schema: &[ColumnSchema]) -> ColumnClassification {
    let mut out = ColumnClassification::default();
    for column in schema {
        let reason = if column.kind != ColumnKind::Numeric {
            Some(ExclusionReason::NonNumeric)
        } else if is_identifier(&column.name) {
            Some(ExclusionReason::Identifier)
        } else {
            None
        };
        match reason {
            Some(r) => out.excluded.push((column.name.clone(), r)),
            None => out.numeric_features.push(column.name.clone()),
        }
    }
    out
}

fn is_identifier(name: &str) -> bool {
    name_tokens(name)
        .iter()
        .any(|t| IDENTIFIER_TOKENS.contains(&t.as_str()))
}

/// Lowercased name tokens.
fn name_tokens(name: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut prev_lower = false;
    for ch in name.chars() {
        if ch == '_' || ch == '-' || ch.is_whitespace() {
            if !current.is_empty() {
                tokens.push(std::mem::take(&mut current));
            }
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower && !current.is_empty() {
            tokens.push(std::mem::take(&mut current));
        }
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
        current.extend(ch.to_lowercase());
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}
