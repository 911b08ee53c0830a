// Row Model
// Typed rows and the engine value-kind conversion table

pub mod bridge;

pub use bridge::{
    EmittedRow, InjectionError, ResultBuffers, RowBridge, RowClass, RowInjector, RowSink,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as Cell;

/// Value types the engine declares for its output columns.
///
/// `None` is the engine's typeless column; its values are carried as
/// rendered strings. Unknown tags coming over the seam deserialize to
/// `None` so the conversion stays total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    BigNumber,
    Boolean,
    Date,
    Integer,
    Number,
    String,
    #[serde(other)]
    #[default]
    None,
}

/// One typed cell in an output row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RowValue {
    /// Arbitrary-precision decimal, kept as its textual rendering.
    BigNumber(String),
    Boolean(bool),
    Date(DateTime<Utc>),
    Integer(i64),
    Number(f64),
    String(String),
    Null,
}

impl RowValue {
    /// Renders the value the way the engine's string conversion would.
    pub fn render(&self) -> String {
        match self {
            Self::BigNumber(s) | Self::String(s) => s.clone(),
            Self::Boolean(b) => b.to_string(),
            Self::Date(d) => d.to_rfc3339(),
            Self::Integer(i) => i.to_string(),
            Self::Number(n) => n.to_string(),
            Self::Null => String::new(),
        }
    }
}

/// A named, typed output column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    #[serde(default)]
    pub kind: ValueKind,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// The ordered column schema of a monitored stage's output.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RowSchema {
    pub columns: Vec<ColumnMeta>,
}

impl RowSchema {
    pub fn new(columns: Vec<ColumnMeta>) -> Self {
        Self { columns }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// One row of typed cells, positionally matching a `RowSchema`.
pub type Row = Vec<RowValue>;

/// Converts one engine-native row into a typed row, mapping each cell
/// through the declared kind of the column at the same position. Cells past
/// the schema width are dropped; missing cells become `Null`.
pub fn convert_row(schema: &RowSchema, cells: &[Cell]) -> Row {
    schema
        .columns
        .iter()
        .enumerate()
        .map(|(i, column)| match cells.get(i) {
            Some(cell) => convert_cell(column.kind, cell),
            None => RowValue::Null,
        })
        .collect()
}

/// Converts a single engine-native cell through a declared value kind.
///
/// Coercion is lenient: a payload that does not match its declared kind is
/// rendered as a string rather than dropped, so no emitted data is lost.
pub fn convert_cell(kind: ValueKind, cell: &Cell) -> RowValue {
    if cell.is_null() {
        return RowValue::Null;
    }

    match kind {
        ValueKind::BigNumber => RowValue::BigNumber(render_cell(cell)),
        ValueKind::Boolean => match cell {
            Cell::Bool(b) => RowValue::Boolean(*b),
            Cell::String(s) if s.eq_ignore_ascii_case("true") => RowValue::Boolean(true),
            Cell::String(s) if s.eq_ignore_ascii_case("false") => RowValue::Boolean(false),
            other => RowValue::String(render_cell(other)),
        },
        ValueKind::Date => match cell {
            Cell::String(s) => match DateTime::parse_from_rfc3339(s) {
                Ok(d) => RowValue::Date(d.with_timezone(&Utc)),
                Err(_) => RowValue::String(s.clone()),
            },
            Cell::Number(n) => match n.as_i64().and_then(DateTime::from_timestamp_millis) {
                Some(d) => RowValue::Date(d),
                None => RowValue::String(render_cell(cell)),
            },
            other => RowValue::String(render_cell(other)),
        },
        ValueKind::Integer => match cell {
            Cell::Number(n) if n.as_i64().is_some() => {
                RowValue::Integer(n.as_i64().unwrap_or_default())
            }
            Cell::String(s) => match s.trim().parse::<i64>() {
                Ok(i) => RowValue::Integer(i),
                Err(_) => RowValue::String(s.clone()),
            },
            other => RowValue::String(render_cell(other)),
        },
        ValueKind::Number => match cell {
            Cell::Number(n) if n.as_f64().is_some() => {
                RowValue::Number(n.as_f64().unwrap_or_default())
            }
            Cell::String(s) => match s.trim().parse::<f64>() {
                Ok(f) => RowValue::Number(f),
                Err(_) => RowValue::String(s.clone()),
            },
            other => RowValue::String(render_cell(other)),
        },
        // Typeless columns and declared strings both render as strings.
        ValueKind::String | ValueKind::None => RowValue::String(render_cell(cell)),
    }
}

fn render_cell(cell: &Cell) -> String {
    match cell {
        Cell::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> RowSchema {
        RowSchema::new(vec![
            ColumnMeta::new("id", ValueKind::Integer),
            ColumnMeta::new("name", ValueKind::String),
            ColumnMeta::new("amount", ValueKind::BigNumber),
            ColumnMeta::new("ratio", ValueKind::Number),
            ColumnMeta::new("active", ValueKind::Boolean),
            ColumnMeta::new("seen", ValueKind::Date),
        ])
    }

    #[test]
    fn test_convert_row_positional() {
        let row = convert_row(
            &schema(),
            &[
                json!(42),
                json!("alpha"),
                json!("12345678901234567890.5"),
                json!(0.25),
                json!(true),
                json!("2024-03-01T12:00:00Z"),
            ],
        );

        assert_eq!(row[0], RowValue::Integer(42));
        assert_eq!(row[1], RowValue::String("alpha".to_string()));
        assert_eq!(
            row[2],
            RowValue::BigNumber("12345678901234567890.5".to_string())
        );
        assert_eq!(row[3], RowValue::Number(0.25));
        assert_eq!(row[4], RowValue::Boolean(true));
        assert!(matches!(row[5], RowValue::Date(_)));
    }

    #[test]
    fn test_convert_row_pads_missing_cells() {
        let row = convert_row(&schema(), &[json!(1)]);
        assert_eq!(row.len(), 6);
        assert_eq!(row[0], RowValue::Integer(1));
        assert_eq!(row[5], RowValue::Null);
    }

    #[test]
    fn test_convert_cell_lenient_coercion() {
        assert_eq!(
            convert_cell(ValueKind::Integer, &json!("17")),
            RowValue::Integer(17)
        );
        assert_eq!(
            convert_cell(ValueKind::Boolean, &json!("TRUE")),
            RowValue::Boolean(true)
        );
        assert_eq!(
            convert_cell(ValueKind::Number, &json!("2.5")),
            RowValue::Number(2.5)
        );
    }

    #[test]
    fn test_convert_cell_mismatch_falls_back_to_string() {
        assert_eq!(
            convert_cell(ValueKind::Integer, &json!("not-a-number")),
            RowValue::String("not-a-number".to_string())
        );
        assert_eq!(
            convert_cell(ValueKind::Date, &json!("yesterday")),
            RowValue::String("yesterday".to_string())
        );
        assert_eq!(
            convert_cell(ValueKind::Boolean, &json!(3)),
            RowValue::String("3".to_string())
        );
    }

    #[test]
    fn test_convert_cell_epoch_millis_date() {
        let value = convert_cell(ValueKind::Date, &json!(0));
        match value {
            RowValue::Date(d) => assert_eq!(d.timestamp(), 0),
            other => panic!("expected date, got {other:?}"),
        }
    }

    #[test]
    fn test_convert_cell_null() {
        assert_eq!(convert_cell(ValueKind::String, &Cell::Null), RowValue::Null);
    }

    #[test]
    fn test_unknown_kind_tag_deserializes_to_none() {
        let kind: ValueKind = serde_json::from_str("\"timestamp-tz\"").unwrap();
        assert_eq!(kind, ValueKind::None);
    }

    #[test]
    fn test_render() {
        assert_eq!(RowValue::Integer(5).render(), "5");
        assert_eq!(RowValue::Null.render(), "");
        assert_eq!(RowValue::Boolean(false).render(), "false");
    }
}
