use std::collections::HashMap;

use crate::canonical::{Cell, FieldType, canonicalize};
use crate::table::{Column, ColumnData, Table, Values};
use crate::value::{Document, Value};

// ═══════════════════════════════════════════════════════════════
//  Field — per-key cell accumulator
// ═══════════════════════════════════════════════════════════════

/// Cells for one key. `None` is an absent cell: padding for a missing
/// key, or an explicit null in the record.
#[derive(Debug)]
struct Field {
    name: String,
    nullable: bool,
    cells: Vec<Option<Cell>>,
}

impl Field {
    fn new(name: String, capacity: usize) -> Self {
        Self {
            name,
            nullable: false,
            cells: Vec::with_capacity(capacity),
        }
    }

    fn append(&mut self, value: Value) {
        let cell = self.cell(value);
        self.cells.push(cell);
    }

    fn replace_last(&mut self, value: Value) {
        let cell = self.cell(value);
        if let Some(last) = self.cells.last_mut() {
            *last = cell;
        }
    }

    fn cell(&mut self, value: Value) -> Option<Cell> {
        match value {
            Value::Null => {
                self.nullable = true;
                None
            }
            other => Some(canonicalize(other)),
        }
    }

    fn extend_to(&mut self, size: usize) {
        if self.cells.len() < size {
            self.nullable = true;
            self.cells.resize(size, None);
        }
    }

    /// Shared type of all present cells, or `String` when they disagree
    /// or none is present.
    fn field_type(&self) -> FieldType {
        let mut present = self.cells.iter().flatten().map(Cell::field_type);
        match present.next() {
            Some(first) if present.all(|t| t == first) => first,
            _ => FieldType::String,
        }
    }

    fn build(&self) -> Column {
        let field_type = self.field_type();
        let cells = self.cells.as_slice();
        let nullable = self.nullable;

        macro_rules! scalar {
            ($variant:ident) => {
                ColumnData::$variant(project(cells, nullable, |cell| match cell {
                    Cell::$variant(v) => Some(*v),
                    _ => None,
                }))
            };
        }

        let values = match field_type {
            FieldType::Bool => scalar!(Bool),
            FieldType::Int8 => scalar!(Int8),
            FieldType::Int16 => scalar!(Int16),
            FieldType::Int32 => scalar!(Int32),
            FieldType::Int64 => scalar!(Int64),
            FieldType::UInt8 => scalar!(UInt8),
            FieldType::UInt16 => scalar!(UInt16),
            FieldType::UInt32 => scalar!(UInt32),
            FieldType::UInt64 => scalar!(UInt64),
            FieldType::Float32 => scalar!(Float32),
            FieldType::Float64 => scalar!(Float64),
            FieldType::Time => scalar!(Time),
            FieldType::String => ColumnData::String(project(cells, nullable, |cell| {
                Some(match cell {
                    Cell::String(s) => s.clone(),
                    other => other.to_string(),
                })
            })),
        };

        Column {
            name: self.name.clone(),
            field_type,
            nullable,
            values,
        }
    }
}

/// One-time projection of tagged cells into a homogeneous vector.
fn project<T>(
    cells: &[Option<Cell>],
    nullable: bool,
    extract: impl Fn(&Cell) -> Option<T>,
) -> Values<T> {
    if nullable {
        Values::Nullable(
            cells
                .iter()
                .map(|cell| cell.as_ref().and_then(&extract))
                .collect(),
        )
    } else {
        Values::Dense(cells.iter().flatten().filter_map(&extract).collect())
    }
}

// ═══════════════════════════════════════════════════════════════
//  FieldBuilder
// ═══════════════════════════════════════════════════════════════

/// Schema-inferring accumulator over a record stream.
///
/// Columns appear in first-seen key order. Every column is padded with
/// absent cells so that all of them have one cell per ingested record.
/// One builder serves one query.
#[derive(Debug, Default)]
pub struct FieldBuilder {
    record_count: usize,
    fields: Vec<Field>,
    index: HashMap<String, usize>,
}

impl FieldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            record_count: 0,
            fields: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    pub fn record_count(&self) -> usize {
        self.record_count
    }

    pub fn process_record(&mut self, record: Document) {
        let row = self.record_count;
        for (key, value) in record {
            let capacity = row + 1;
            let field = self.field(key, capacity);
            if field.cells.len() > row {
                // key repeated within this record: last one wins
                field.replace_last(value);
            } else {
                field.extend_to(row);
                field.append(value);
            }
        }
        self.record_count += 1;
    }

    /// Resolve every column. Padding is the only mutation, so building
    /// again gives the same table.
    pub fn build_columns(&mut self) -> Table {
        let rows = self.record_count;
        let columns = self
            .fields
            .iter_mut()
            .map(|field| {
                field.extend_to(rows);
                field.build()
            })
            .collect();
        Table { columns }
    }

    fn field(&mut self, name: String, capacity: usize) -> &mut Field {
        let idx = match self.index.get(&name) {
            Some(&idx) => idx,
            None => {
                let idx = self.fields.len();
                self.index.insert(name.clone(), idx);
                self.fields.push(Field::new(name, capacity));
                idx
            }
        };
        &mut self.fields[idx]
    }
}
