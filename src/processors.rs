//! Value processors applied when loading raw extracted values
//!
//! Processors come in two flavors. Input processors run at push time,
//! once per raw value (numeric coercion). Output processors run exactly
//! once per field at finalization and reduce the accumulated buffer to
//! a single value (take-first, take-max). List fields skip reduction
//! and keep their full buffer unchanged (identity).

use crate::jewel::Field;
use std::cmp::Ordering;
use thiserror::Error;

/// Error type for value processing
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProcessorError {
    /// An output processor was asked to reduce an empty buffer. This is
    /// distinct from a field that was never touched: those are simply
    /// omitted from the record.
    #[error("no values to reduce for field '{0}'")]
    EmptyValues(Field),

    /// A numeric field received text that does not parse as a number,
    /// which indicates a markup contract break on the source page.
    #[error("invalid numeric value {value:?} for field '{field}'")]
    NumberFormat {
        /// Field the value was pushed into
        field: Field,
        /// The offending raw text
        value: String,
    },
}

/// A raw value accumulated for a field before reduction.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Text(String),
    Number(f64),
}

impl Value {
    /// Text content, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(text) => Some(text),
            Value::Number(_) => None,
        }
    }

    /// Numeric content, if this is a number value.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(number) => Some(*number),
            Value::Text(_) => None,
        }
    }
}

/// Input processor: coerce one raw string into the field's value type.
///
/// Numeric fields are parsed to `f64` immediately so that malformed
/// markup surfaces at push time, attributable to the field and page
/// being extracted. All other fields keep the raw text.
pub fn coerce(field: Field, raw: &str) -> Result<Value, ProcessorError> {
    if field.is_numeric() {
        let number = raw
            .trim()
            .parse::<f64>()
            .map_err(|_| ProcessorError::NumberFormat {
                field,
                value: raw.to_string(),
            })?;
        Ok(Value::Number(number))
    } else {
        Ok(Value::Text(raw.to_string()))
    }
}

/// Output processor selection for a single-multiplicity field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputProcessor {
    /// Keep the first pushed value, ignore the rest.
    #[default]
    TakeFirst,
    /// Keep the maximum pushed value under a total order.
    TakeMax,
}

impl OutputProcessor {
    /// Reduce a non-empty buffer to a single value.
    pub fn apply(self, field: Field, values: &[Value]) -> Result<Value, ProcessorError> {
        match self {
            OutputProcessor::TakeFirst => take_first(field, values),
            OutputProcessor::TakeMax => take_max(field, values),
        }
    }
}

/// Return the first accumulated value.
pub fn take_first(field: Field, values: &[Value]) -> Result<Value, ProcessorError> {
    values
        .first()
        .cloned()
        .ok_or(ProcessorError::EmptyValues(field))
}

/// Return the maximum accumulated value.
pub fn take_max(field: Field, values: &[Value]) -> Result<Value, ProcessorError> {
    values
        .iter()
        .max_by(|a, b| compare(a, b))
        .cloned()
        .ok_or(ProcessorError::EmptyValues(field))
}

// A field's buffer is homogeneous because the input processor is fixed
// per field; the cross-type arms only make the order total.
fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.total_cmp(y),
        (Value::Text(x), Value::Text(y)) => x.cmp(y),
        (Value::Number(_), Value::Text(_)) => Ordering::Less,
        (Value::Text(_), Value::Number(_)) => Ordering::Greater,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn take_first_ignores_later_values() {
        let values = vec![
            Value::Text("first".to_string()),
            Value::Text("second".to_string()),
            Value::Text("third".to_string()),
        ];
        assert_eq!(
            take_first(Field::Title, &values).unwrap(),
            Value::Text("first".to_string())
        );
    }

    #[test]
    fn take_first_fails_on_empty_buffer() {
        assert_eq!(
            take_first(Field::Title, &[]),
            Err(ProcessorError::EmptyValues(Field::Title))
        );
    }

    #[test]
    fn take_max_picks_largest_number() {
        let values = vec![Value::Number(3.0), Value::Number(7.0), Value::Number(5.0)];
        assert_eq!(
            take_max(Field::Height, &values).unwrap(),
            Value::Number(7.0)
        );
    }

    #[test]
    fn take_max_of_single_value_is_that_value() {
        let values = vec![Value::Number(4.0)];
        assert_eq!(
            take_max(Field::Height, &values).unwrap(),
            Value::Number(4.0)
        );
    }

    #[test]
    fn take_max_fails_on_empty_buffer() {
        assert_eq!(
            take_max(Field::Height, &[]),
            Err(ProcessorError::EmptyValues(Field::Height))
        );
    }

    #[test]
    fn coerce_parses_numeric_fields() {
        assert_eq!(
            coerce(Field::Price, "12990.5").unwrap(),
            Value::Number(12990.5)
        );
        assert_eq!(coerce(Field::Weight, " 1.85 ").unwrap(), Value::Number(1.85));
    }

    #[test]
    fn coerce_rejects_non_numeric_text() {
        let err = coerce(Field::Price, "двенадцать").unwrap_err();
        assert!(matches!(
            err,
            ProcessorError::NumberFormat {
                field: Field::Price,
                ..
            }
        ));
    }

    #[test]
    fn coerce_keeps_text_fields_untouched() {
        assert_eq!(
            coerce(Field::Title, "Серьги с фианитами").unwrap(),
            Value::Text("Серьги с фианитами".to_string())
        );
    }
}
