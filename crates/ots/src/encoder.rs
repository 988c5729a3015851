// SPDX-License-Identifier: Apache-2.0

//! Domain arguments to wire requests, one `encode_*` per operation.

use prost::Message;

use crate::error::{Error, Result};
use crate::metadata::{
    BatchGetRowItem, BatchWriteRowItem, CapacityUnit, Column, ColumnSchema, ColumnType,
    ColumnUpdate, ColumnValue, Condition, DeleteRowItem, Direction, GetRangeRequest,
    OperationType, PutRowItem, ReservedThroughput, RowExistenceExpectation, UpdateRowItem,
};
use crate::wire;

/// Marshals any wire message into the request body.
pub fn encode_body<M: Message>(message: &M) -> Vec<u8> {
    message.encode_to_vec()
}

pub fn encode_list_table() -> wire::ListTableRequest {
    wire::ListTableRequest {}
}

pub fn encode_create_table(
    table_name: &str,
    primary_key: &[ColumnSchema],
    reserved_throughput: &ReservedThroughput,
) -> Result<wire::CreateTableRequest> {
    check_table_name(table_name)?;
    if primary_key.is_empty() {
        return Err(Error::invalid_input(format!(
            "table {table_name} needs at least one primary key column"
        )));
    }
    let primary_key = primary_key
        .iter()
        .map(column_schema_to_wire)
        .collect::<Result<Vec<_>>>()?;
    Ok(wire::CreateTableRequest {
        table_meta: Some(wire::TableMeta {
            table_name: table_name.to_string(),
            primary_key,
        }),
        reserved_throughput: Some(reserved_throughput_to_wire(reserved_throughput)),
    })
}

pub fn encode_delete_table(table_name: &str) -> Result<wire::DeleteTableRequest> {
    check_table_name(table_name)?;
    Ok(wire::DeleteTableRequest {
        table_name: table_name.to_string(),
    })
}

pub fn encode_describe_table(table_name: &str) -> Result<wire::DescribeTableRequest> {
    check_table_name(table_name)?;
    Ok(wire::DescribeTableRequest {
        table_name: table_name.to_string(),
    })
}

pub fn encode_update_table(
    table_name: &str,
    reserved_throughput: &ReservedThroughput,
) -> Result<wire::UpdateTableRequest> {
    check_table_name(table_name)?;
    Ok(wire::UpdateTableRequest {
        table_name: table_name.to_string(),
        reserved_throughput: Some(reserved_throughput_to_wire(reserved_throughput)),
    })
}

pub fn encode_get_row(
    table_name: &str,
    primary_key: &[Column],
    columns_to_get: &[String],
) -> Result<wire::GetRowRequest> {
    check_table_name(table_name)?;
    Ok(wire::GetRowRequest {
        table_name: table_name.to_string(),
        primary_key: primary_key_to_wire(primary_key)?,
        columns_to_get: columns_to_get.to_vec(),
    })
}

pub fn encode_put_row(
    table_name: &str,
    condition: &Condition,
    primary_key: &[Column],
    attribute_columns: &[Column],
) -> Result<wire::PutRowRequest> {
    check_table_name(table_name)?;
    Ok(wire::PutRowRequest {
        table_name: table_name.to_string(),
        condition: Some(condition_to_wire(condition)),
        primary_key: primary_key_to_wire(primary_key)?,
        attribute_columns: columns_to_wire(attribute_columns)?,
    })
}

/// Put entries come first, then delete entries; the merged sequence has
/// exactly `columns_to_put.len() + columns_to_delete.len()` elements.
pub fn encode_update_row(
    table_name: &str,
    condition: &Condition,
    primary_key: &[Column],
    columns_to_put: &[Column],
    columns_to_delete: &[String],
) -> Result<wire::UpdateRowRequest> {
    check_table_name(table_name)?;
    Ok(wire::UpdateRowRequest {
        table_name: table_name.to_string(),
        condition: Some(condition_to_wire(condition)),
        primary_key: primary_key_to_wire(primary_key)?,
        attribute_columns: merge_column_updates(columns_to_put, columns_to_delete)?,
    })
}

pub fn encode_delete_row(
    table_name: &str,
    condition: &Condition,
    primary_key: &[Column],
) -> Result<wire::DeleteRowRequest> {
    check_table_name(table_name)?;
    Ok(wire::DeleteRowRequest {
        table_name: table_name.to_string(),
        condition: Some(condition_to_wire(condition)),
        primary_key: primary_key_to_wire(primary_key)?,
    })
}

/// Tables are emitted in the iteration order of `items`. Within a table, wire
/// row `i` describes input primary key `i`.
pub fn encode_batch_get_row<'a, I, K>(items: I) -> Result<wire::BatchGetRowRequest>
where
    I: IntoIterator<Item = (K, &'a BatchGetRowItem)>,
    K: AsRef<str>,
{
    let mut tables = Vec::new();
    for (table_name, item) in items {
        let table_name = table_name.as_ref();
        check_table_name(table_name)?;
        let rows = item
            .primary_keys
            .iter()
            .map(|pk| {
                Ok(wire::RowInBatchGetRowRequest {
                    primary_key: primary_key_to_wire(pk)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        tables.push(wire::TableInBatchGetRowRequest {
            table_name: table_name.to_string(),
            rows,
            columns_to_get: item.columns_to_get.clone(),
        });
    }
    Ok(wire::BatchGetRowRequest { tables })
}

pub fn encode_batch_write_row<'a, I, K>(items: I) -> Result<wire::BatchWriteRowRequest>
where
    I: IntoIterator<Item = (K, &'a BatchWriteRowItem)>,
    K: AsRef<str>,
{
    let mut tables = Vec::new();
    for (table_name, item) in items {
        let table_name = table_name.as_ref();
        check_table_name(table_name)?;
        tables.push(wire::TableInBatchWriteRowRequest {
            table_name: table_name.to_string(),
            put_rows: item
                .put_rows
                .iter()
                .map(put_row_item_to_wire)
                .collect::<Result<Vec<_>>>()?,
            update_rows: item
                .update_rows
                .iter()
                .map(update_row_item_to_wire)
                .collect::<Result<Vec<_>>>()?,
            delete_rows: item
                .delete_rows
                .iter()
                .map(delete_row_item_to_wire)
                .collect::<Result<Vec<_>>>()?,
        });
    }
    Ok(wire::BatchWriteRowRequest { tables })
}

pub fn encode_get_range(request: &GetRangeRequest) -> Result<wire::GetRangeRequest> {
    check_table_name(&request.table_name)?;
    if let Some(limit) = request.limit {
        if limit <= 0 {
            return Err(Error::invalid_input(format!(
                "range limit must be positive, got {limit}"
            )));
        }
    }
    Ok(wire::GetRangeRequest {
        table_name: request.table_name.clone(),
        direction: direction_to_wire(request.direction) as i32,
        columns_to_get: request.columns_to_get.clone(),
        limit: request.limit,
        inclusive_start_primary_key: primary_key_to_wire(&request.inclusive_start_primary_key)?,
        exclusive_end_primary_key: primary_key_to_wire(&request.exclusive_end_primary_key)?,
    })
}

// Entity conversions

pub fn column_type_to_wire(column_type: ColumnType) -> wire::ColumnType {
    match column_type {
        ColumnType::InfMin => wire::ColumnType::InfMin,
        ColumnType::InfMax => wire::ColumnType::InfMax,
        ColumnType::Integer => wire::ColumnType::Integer,
        ColumnType::String => wire::ColumnType::String,
        ColumnType::Boolean => wire::ColumnType::Boolean,
        ColumnType::Double => wire::ColumnType::Double,
        ColumnType::Binary => wire::ColumnType::Binary,
    }
}

/// Sets the type tag and only the payload field belonging to it.
pub fn column_value_to_wire(value: &ColumnValue) -> wire::ColumnValue {
    let mut out = wire::ColumnValue {
        r#type: column_type_to_wire(value.column_type()) as i32,
        ..Default::default()
    };
    match value {
        ColumnValue::InfMin | ColumnValue::InfMax => {}
        ColumnValue::Integer(v) => out.v_int = Some(*v),
        ColumnValue::String(v) => out.v_string = Some(v.clone()),
        ColumnValue::Boolean(v) => out.v_bool = Some(*v),
        ColumnValue::Double(v) => out.v_double = Some(*v),
        ColumnValue::Binary(v) => out.v_binary = Some(v.clone()),
    }
    out
}

pub fn column_to_wire(column: &Column) -> Result<wire::Column> {
    check_column_name(&column.name)?;
    Ok(wire::Column {
        name: column.name.clone(),
        value: Some(column_value_to_wire(&column.value)),
    })
}

pub fn columns_to_wire(columns: &[Column]) -> Result<Vec<wire::Column>> {
    columns.iter().map(column_to_wire).collect()
}

pub fn column_schema_to_wire(schema: &ColumnSchema) -> Result<wire::ColumnSchema> {
    check_column_name(&schema.name)?;
    if matches!(schema.column_type, ColumnType::InfMin | ColumnType::InfMax) {
        return Err(Error::invalid_input(format!(
            "primary key column {} cannot be declared {}",
            schema.name, schema.column_type
        )));
    }
    Ok(wire::ColumnSchema {
        name: schema.name.clone(),
        r#type: column_type_to_wire(schema.column_type) as i32,
    })
}

pub fn capacity_unit_to_wire(unit: &CapacityUnit) -> wire::CapacityUnit {
    wire::CapacityUnit {
        read: Some(unit.read),
        write: Some(unit.write),
    }
}

pub fn reserved_throughput_to_wire(throughput: &ReservedThroughput) -> wire::ReservedThroughput {
    wire::ReservedThroughput {
        capacity_unit: Some(capacity_unit_to_wire(&throughput.capacity_unit)),
    }
}

pub fn condition_to_wire(condition: &Condition) -> wire::Condition {
    let row_existence = match condition.row_existence {
        RowExistenceExpectation::Ignore => wire::RowExistenceExpectation::Ignore,
        RowExistenceExpectation::ExpectExist => wire::RowExistenceExpectation::ExpectExist,
        RowExistenceExpectation::ExpectNotExist => wire::RowExistenceExpectation::ExpectNotExist,
    };
    wire::Condition {
        row_existence: row_existence as i32,
    }
}

pub fn direction_to_wire(direction: Direction) -> wire::Direction {
    match direction {
        Direction::Forward => wire::Direction::Forward,
        Direction::Backward => wire::Direction::Backward,
    }
}

pub fn column_update_to_wire(update: &ColumnUpdate) -> Result<wire::ColumnUpdate> {
    check_column_name(&update.name)?;
    let (r#type, value) = match (update.operation, &update.value) {
        (OperationType::Put, Some(value)) => {
            (wire::OperationType::Put, Some(column_value_to_wire(value)))
        }
        (OperationType::Put, None) => {
            return Err(Error::invalid_input(format!(
                "put of column {} carries no value",
                update.name
            )));
        }
        (OperationType::Delete, _) => (wire::OperationType::Delete, None),
    };
    Ok(wire::ColumnUpdate {
        r#type: r#type as i32,
        name: update.name.clone(),
        value,
    })
}

pub fn merge_column_updates(
    columns_to_put: &[Column],
    columns_to_delete: &[String],
) -> Result<Vec<wire::ColumnUpdate>> {
    let updates = columns_to_put
        .iter()
        .map(|col| ColumnUpdate::put(col.name.clone(), col.value.clone()))
        .chain(columns_to_delete.iter().map(ColumnUpdate::delete));
    updates.map(|update| column_update_to_wire(&update)).collect()
}

fn put_row_item_to_wire(item: &PutRowItem) -> Result<wire::PutRowInBatchWriteRowRequest> {
    Ok(wire::PutRowInBatchWriteRowRequest {
        condition: Some(condition_to_wire(&item.condition)),
        primary_key: primary_key_to_wire(&item.primary_key)?,
        attribute_columns: columns_to_wire(&item.attribute_columns)?,
    })
}

fn update_row_item_to_wire(item: &UpdateRowItem) -> Result<wire::UpdateRowInBatchWriteRowRequest> {
    Ok(wire::UpdateRowInBatchWriteRowRequest {
        condition: Some(condition_to_wire(&item.condition)),
        primary_key: primary_key_to_wire(&item.primary_key)?,
        attribute_columns: merge_column_updates(&item.columns_to_put, &item.columns_to_delete)?,
    })
}

fn delete_row_item_to_wire(item: &DeleteRowItem) -> Result<wire::DeleteRowInBatchWriteRowRequest> {
    Ok(wire::DeleteRowInBatchWriteRowRequest {
        condition: Some(condition_to_wire(&item.condition)),
        primary_key: primary_key_to_wire(&item.primary_key)?,
    })
}

fn primary_key_to_wire(primary_key: &[Column]) -> Result<Vec<wire::Column>> {
    if primary_key.is_empty() {
        return Err(Error::invalid_input("primary key is empty"));
    }
    columns_to_wire(primary_key)
}

fn check_table_name(table_name: &str) -> Result<()> {
    if table_name.is_empty() {
        return Err(Error::invalid_input("table name is empty"));
    }
    Ok(())
}

fn check_column_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::invalid_input("column name is empty"));
    }
    Ok(())
}
