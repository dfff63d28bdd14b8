//! Record builder accumulating raw values per field
//!
//! A `JewelLoader` is created per product page, filled by the site
//! adapter's handlers and consumed exactly once by `load()`, which
//! reduces every touched field with its output processor and yields the
//! finalized `Jewel`. Untouched fields stay absent from the record.

use std::collections::BTreeMap;

use crate::jewel::{Field, Jewel};
use crate::processors::{self, OutputProcessor, ProcessorError, Value};

/// Single-use builder for one `Jewel` record.
#[derive(Debug, Default)]
pub struct JewelLoader {
    buffers: BTreeMap<Field, Vec<Value>>,
    output_overrides: BTreeMap<Field, OutputProcessor>,
}

impl JewelLoader {
    /// Create a loader with default processors: take-first for every
    /// single-multiplicity field, identity for list fields.
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the output processor for one field.
    ///
    /// Used by adapters whose source pages push competing values into
    /// one semantic slot, e.g. take-max for a dimension field.
    pub fn with_output(mut self, field: Field, processor: OutputProcessor) -> Self {
        self.output_overrides.insert(field, processor);
        self
    }

    /// Append one raw value to the field's buffer, applying the field's
    /// input processor. Numeric fields fail here on non-numeric text.
    pub fn add_value(&mut self, field: Field, raw: impl AsRef<str>) -> Result<(), ProcessorError> {
        let value = processors::coerce(field, raw.as_ref())?;
        self.buffers.entry(field).or_default().push(value);
        Ok(())
    }

    /// Like `add_value`, but a `None` is a no-op. Convenient for
    /// pushing optional selector matches straight from the document.
    pub fn add_optional(
        &mut self,
        field: Field,
        raw: Option<impl AsRef<str>>,
    ) -> Result<(), ProcessorError> {
        match raw {
            Some(raw) => self.add_value(field, raw),
            None => Ok(()),
        }
    }

    /// Reduce every touched field exactly once and produce the record.
    ///
    /// Fields whose buffers are empty are omitted; list fields keep
    /// their full buffer in push order.
    pub fn load(mut self) -> Result<Jewel, ProcessorError> {
        let mut jewel = Jewel::default();

        for field in Field::ALL {
            let Some(buffer) = self.buffers.remove(&field) else {
                continue;
            };
            if buffer.is_empty() {
                continue;
            }

            if field.is_list() {
                let values = buffer.into_iter().filter_map(text_of).collect();
                match field {
                    Field::ImageUrls => jewel.image_urls = values,
                    Field::Images => jewel.images = values,
                    _ => unreachable!("only image fields are list-valued"),
                }
                continue;
            }

            let processor = self
                .output_overrides
                .get(&field)
                .copied()
                .unwrap_or_default();
            let reduced = processor.apply(field, &buffer)?;
            assign(&mut jewel, field, reduced);
        }

        Ok(jewel)
    }
}

fn text_of(value: Value) -> Option<String> {
    match value {
        Value::Text(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
    }
}

fn assign(jewel: &mut Jewel, field: Field, value: Value) {
    match field {
        Field::Title => jewel.title = text_of(value),
        Field::Description => jewel.description = text_of(value),
        Field::Category => jewel.category = text_of(value),
        Field::Brand => jewel.brand = text_of(value),
        Field::Price => jewel.price = value.as_number(),
        Field::Currency => jewel.currency = text_of(value),
        Field::Sku => jewel.sku = text_of(value),
        Field::Weight => jewel.weight = value.as_number(),
        Field::Width => jewel.width = value.as_number(),
        Field::Height => jewel.height = value.as_number(),
        Field::Metal => jewel.metal = text_of(value),
        Field::Probe => jewel.probe = text_of(value),
        Field::ForWhom => jewel.for_whom = text_of(value),
        Field::Gems => jewel.gems = text_of(value),
        Field::Collection => jewel.collection = text_of(value),
        Field::ImageUrls | Field::Images => {
            unreachable!("list fields are handled before reduction")
        }
    }
}
