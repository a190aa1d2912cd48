use grafana_plugin_sdk::data::{Field, Frame};
use grafana_plugin_sdk::prelude::*;
use mongo_query::{Column, ColumnData, Table, Values};

pub(crate) const FRAME_NAME: &str = "response";

// ═══════════════════════════════════════════════════════════════
//  Table → Frame
// ═══════════════════════════════════════════════════════════════

/// One field per column, in column order.
pub(crate) fn table_to_frame(table: Table) -> Frame {
    table
        .columns
        .into_iter()
        .fold(Frame::new(FRAME_NAME), |frame, column| {
            frame.with_field(column_to_field(column))
        })
}

fn column_to_field(column: Column) -> Field {
    let name = column.name;
    match column.values {
        ColumnData::Bool(v) => values_to_field(v, name),
        ColumnData::Int8(v) => values_to_field(v, name),
        ColumnData::Int16(v) => values_to_field(v, name),
        ColumnData::Int32(v) => values_to_field(v, name),
        ColumnData::Int64(v) => values_to_field(v, name),
        ColumnData::UInt8(v) => values_to_field(v, name),
        ColumnData::UInt16(v) => values_to_field(v, name),
        ColumnData::UInt32(v) => values_to_field(v, name),
        ColumnData::UInt64(v) => values_to_field(v, name),
        ColumnData::Float32(v) => values_to_field(v, name),
        ColumnData::Float64(v) => values_to_field(v, name),
        ColumnData::String(v) => values_to_field(v, name),
        ColumnData::Time(v) => values_to_field(v, name),
    }
}

fn values_to_field<T>(values: Values<T>, name: String) -> Field
where
    Vec<T>: IntoField,
    Vec<Option<T>>: IntoOptField,
{
    match values {
        Values::Dense(v) => v.into_field(name),
        Values::Nullable(v) => v.into_opt_field(name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongo_query::{FieldBuilder, Value};

    #[test]
    fn frame_keeps_column_order() {
        let mut builder = FieldBuilder::new();
        builder.process_record(
            vec![("str", Value::from("Tom")), ("int", Value::Int32(52))]
                .into_iter()
                .collect(),
        );
        builder.process_record(vec![("int", Value::Int32(22))].into_iter().collect());

        let frame = table_to_frame(builder.build_columns());

        let names: Vec<_> = frame.fields().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["str", "int"]);
        assert!(frame.check().is_ok());
    }

    #[test]
    fn empty_table_gives_empty_frame() {
        let frame = table_to_frame(Table::default());
        assert!(frame.fields().is_empty());
    }
}
