// SPDX-License-Identifier: Apache-2.0

//! Wire responses to domain responses, one `decode_*` per operation.
//!
//! A decode either yields a fully built response or an
//! [`Error::WireDecode`]; nothing half-populated escapes.

use prost::Message;

use crate::error::{Error, Result};
use crate::metadata::{
    BatchGetRowResponse, BatchWriteRowResponse, CapacityUnit, Column, ColumnSchema, ColumnType,
    ColumnUpdate, ColumnValue, Condition, ConsumedCapacity, CreateTableResponse, DeleteRowResponse,
    DeleteTableResponse, DescribeTableResponse, Direction, GetRangeResponse, GetRowResponse,
    ListTableResponse, PutRowResponse, ReservedThroughputDetails, Row, RowExistenceExpectation,
    RowInBatchGetRowResponse, RowInBatchWriteRowResponse, ServiceErrorRecord,
    TableInBatchGetRowResponse, TableInBatchWriteRowResponse, TableMeta, UpdateRowResponse,
    UpdateTableResponse,
};
use crate::wire;

fn unmarshal<M: Message + Default>(data: &[u8]) -> Result<M> {
    M::decode(data).map_err(Error::from)
}

pub fn decode_list_table(data: &[u8]) -> Result<ListTableResponse> {
    let msg: wire::ListTableResponse = unmarshal(data)?;
    Ok(ListTableResponse {
        table_names: msg.table_names,
    })
}

pub fn decode_create_table(data: &[u8]) -> Result<CreateTableResponse> {
    let _: wire::CreateTableResponse = unmarshal(data)?;
    Ok(CreateTableResponse {})
}

pub fn decode_delete_table(data: &[u8]) -> Result<DeleteTableResponse> {
    let _: wire::DeleteTableResponse = unmarshal(data)?;
    Ok(DeleteTableResponse {})
}

pub fn decode_describe_table(data: &[u8]) -> Result<DescribeTableResponse> {
    let msg: wire::DescribeTableResponse = unmarshal(data)?;
    let table_meta = msg
        .table_meta
        .ok_or_else(|| Error::wire_decode("DescribeTableResponse is missing table_meta"))?;
    let details = msg.reserved_throughput_details.ok_or_else(|| {
        Error::wire_decode("DescribeTableResponse is missing reserved_throughput_details")
    })?;
    Ok(DescribeTableResponse {
        table_meta: table_meta_from_wire(table_meta)?,
        reserved_throughput_details: reserved_throughput_details_from_wire(details)?,
    })
}

pub fn decode_update_table(data: &[u8]) -> Result<UpdateTableResponse> {
    let msg: wire::UpdateTableResponse = unmarshal(data)?;
    let details = msg.reserved_throughput_details.ok_or_else(|| {
        Error::wire_decode("UpdateTableResponse is missing reserved_throughput_details")
    })?;
    Ok(UpdateTableResponse {
        reserved_throughput_details: reserved_throughput_details_from_wire(details)?,
    })
}

pub fn decode_get_row(data: &[u8]) -> Result<GetRowResponse> {
    let msg: wire::GetRowResponse = unmarshal(data)?;
    let consumed = required_consumed(msg.consumed, "GetRowResponse")?;
    let row = match msg.row {
        Some(row) => Some(row_from_wire(row)?).filter(|row| !row.is_empty()),
        None => None,
    };
    Ok(GetRowResponse { consumed, row })
}

pub fn decode_put_row(data: &[u8]) -> Result<PutRowResponse> {
    let msg: wire::PutRowResponse = unmarshal(data)?;
    Ok(PutRowResponse {
        consumed: required_consumed(msg.consumed, "PutRowResponse")?,
    })
}

pub fn decode_update_row(data: &[u8]) -> Result<UpdateRowResponse> {
    let msg: wire::UpdateRowResponse = unmarshal(data)?;
    Ok(UpdateRowResponse {
        consumed: required_consumed(msg.consumed, "UpdateRowResponse")?,
    })
}

pub fn decode_delete_row(data: &[u8]) -> Result<DeleteRowResponse> {
    let msg: wire::DeleteRowResponse = unmarshal(data)?;
    Ok(DeleteRowResponse {
        consumed: required_consumed(msg.consumed, "DeleteRowResponse")?,
    })
}

pub fn decode_batch_get_row(data: &[u8]) -> Result<BatchGetRowResponse> {
    let msg: wire::BatchGetRowResponse = unmarshal(data)?;
    let mut tables = Vec::with_capacity(msg.tables.len());
    for table in msg.tables {
        let mut rows = Vec::with_capacity(table.rows.len());
        for row in table.rows {
            rows.push(RowInBatchGetRowResponse {
                is_ok: row.is_ok,
                error: row.error.map(service_error_record_from_wire),
                consumed: row.consumed.map(consumed_capacity_from_wire),
                row: match row.row {
                    Some(row) => Some(row_from_wire(row)?).filter(|row| !row.is_empty()),
                    None => None,
                },
            });
        }
        tables.push(TableInBatchGetRowResponse {
            table_name: table.table_name,
            rows,
        });
    }
    Ok(BatchGetRowResponse { tables })
}

pub fn decode_batch_write_row(data: &[u8]) -> Result<BatchWriteRowResponse> {
    let msg: wire::BatchWriteRowResponse = unmarshal(data)?;
    let tables = msg
        .tables
        .into_iter()
        .map(|table| TableInBatchWriteRowResponse {
            table_name: table.table_name,
            put_rows: table.put_rows.into_iter().map(write_status_from_wire).collect(),
            update_rows: table
                .update_rows
                .into_iter()
                .map(write_status_from_wire)
                .collect(),
            delete_rows: table
                .delete_rows
                .into_iter()
                .map(write_status_from_wire)
                .collect(),
        })
        .collect();
    Ok(BatchWriteRowResponse { tables })
}

pub fn decode_get_range(data: &[u8]) -> Result<GetRangeResponse> {
    let msg: wire::GetRangeResponse = unmarshal(data)?;
    Ok(GetRangeResponse {
        consumed: required_consumed(msg.consumed, "GetRangeResponse")?,
        next_start_primary_key: columns_from_wire(msg.next_start_primary_key)?,
        rows: msg
            .rows
            .into_iter()
            .map(row_from_wire)
            .collect::<Result<Vec<_>>>()?,
    })
}

/// Decodes the error record carried by a non-2xx response body.
pub fn decode_service_error(data: &[u8]) -> Result<ServiceErrorRecord> {
    let msg: wire::Error = unmarshal(data)?;
    Ok(service_error_record_from_wire(msg))
}

// Entity conversions

pub fn column_type_from_wire(value: i32) -> Result<ColumnType> {
    let column_type = wire::ColumnType::try_from(value)
        .map_err(|_| Error::wire_decode(format!("unknown column type {value}")))?;
    Ok(match column_type {
        wire::ColumnType::InfMin => ColumnType::InfMin,
        wire::ColumnType::InfMax => ColumnType::InfMax,
        wire::ColumnType::Integer => ColumnType::Integer,
        wire::ColumnType::String => ColumnType::String,
        wire::ColumnType::Boolean => ColumnType::Boolean,
        wire::ColumnType::Double => ColumnType::Double,
        wire::ColumnType::Binary => ColumnType::Binary,
    })
}

/// Reads the payload field that matches the type tag; the tag's field must be
/// present.
pub fn column_value_from_wire(value: wire::ColumnValue) -> Result<ColumnValue> {
    let column_type = column_type_from_wire(value.r#type)?;
    let missing = || Error::wire_decode(format!("{column_type} column value carries no payload"));
    Ok(match column_type {
        ColumnType::InfMin => ColumnValue::InfMin,
        ColumnType::InfMax => ColumnValue::InfMax,
        ColumnType::Integer => ColumnValue::Integer(value.v_int.ok_or_else(missing)?),
        ColumnType::String => ColumnValue::String(value.v_string.ok_or_else(missing)?),
        ColumnType::Boolean => ColumnValue::Boolean(value.v_bool.ok_or_else(missing)?),
        ColumnType::Double => ColumnValue::Double(value.v_double.ok_or_else(missing)?),
        ColumnType::Binary => ColumnValue::Binary(value.v_binary.ok_or_else(missing)?),
    })
}

pub fn column_from_wire(column: wire::Column) -> Result<Column> {
    let value = column
        .value
        .ok_or_else(|| Error::wire_decode(format!("column {} has no value", column.name)))?;
    Ok(Column {
        name: column.name,
        value: column_value_from_wire(value)?,
    })
}

pub fn columns_from_wire(columns: Vec<wire::Column>) -> Result<Vec<Column>> {
    columns.into_iter().map(column_from_wire).collect()
}

pub fn row_from_wire(row: wire::Row) -> Result<Row> {
    Ok(Row {
        primary_key_columns: columns_from_wire(row.primary_key_columns)?,
        attribute_columns: columns_from_wire(row.attribute_columns)?,
    })
}

pub fn table_meta_from_wire(meta: wire::TableMeta) -> Result<TableMeta> {
    let primary_key = meta
        .primary_key
        .into_iter()
        .map(|schema| -> Result<ColumnSchema> {
            Ok(ColumnSchema {
                column_type: column_type_from_wire(schema.r#type)?,
                name: schema.name,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(TableMeta {
        table_name: meta.table_name,
        primary_key,
    })
}

pub fn condition_from_wire(condition: wire::Condition) -> Result<Condition> {
    let expectation = wire::RowExistenceExpectation::try_from(condition.row_existence)
        .map_err(|_| {
            Error::wire_decode(format!(
                "unknown row existence expectation {}",
                condition.row_existence
            ))
        })?;
    Ok(Condition::new(match expectation {
        wire::RowExistenceExpectation::Ignore => RowExistenceExpectation::Ignore,
        wire::RowExistenceExpectation::ExpectExist => RowExistenceExpectation::ExpectExist,
        wire::RowExistenceExpectation::ExpectNotExist => RowExistenceExpectation::ExpectNotExist,
    }))
}

pub fn direction_from_wire(value: i32) -> Result<Direction> {
    match wire::Direction::try_from(value) {
        Ok(wire::Direction::Forward) => Ok(Direction::Forward),
        Ok(wire::Direction::Backward) => Ok(Direction::Backward),
        Err(_) => Err(Error::wire_decode(format!("unknown direction {value}"))),
    }
}

pub fn column_update_from_wire(update: wire::ColumnUpdate) -> Result<ColumnUpdate> {
    let operation = wire::OperationType::try_from(update.r#type)
        .map_err(|_| Error::wire_decode(format!("unknown operation type {}", update.r#type)))?;
    match operation {
        wire::OperationType::Put => {
            let value = update.value.ok_or_else(|| {
                Error::wire_decode(format!("put of column {} carries no value", update.name))
            })?;
            Ok(ColumnUpdate::put(update.name, column_value_from_wire(value)?))
        }
        wire::OperationType::Delete => Ok(ColumnUpdate::delete(update.name)),
    }
}

pub fn capacity_unit_from_wire(unit: wire::CapacityUnit) -> CapacityUnit {
    CapacityUnit {
        read: unit.read.unwrap_or_default(),
        write: unit.write.unwrap_or_default(),
    }
}

pub fn consumed_capacity_from_wire(consumed: wire::ConsumedCapacity) -> ConsumedCapacity {
    ConsumedCapacity {
        capacity_unit: consumed
            .capacity_unit
            .map(capacity_unit_from_wire)
            .unwrap_or_default(),
    }
}

pub fn reserved_throughput_details_from_wire(
    details: wire::ReservedThroughputDetails,
) -> Result<ReservedThroughputDetails> {
    let capacity_unit = details.capacity_unit.ok_or_else(|| {
        Error::wire_decode("ReservedThroughputDetails is missing capacity_unit")
    })?;
    Ok(ReservedThroughputDetails {
        capacity_unit: capacity_unit_from_wire(capacity_unit),
        last_increase_time: details.last_increase_time,
        last_decrease_time: details.last_decrease_time,
        number_of_decreases_today: details.number_of_decreases_today,
    })
}

pub fn service_error_record_from_wire(err: wire::Error) -> ServiceErrorRecord {
    ServiceErrorRecord {
        code: err.code,
        message: err.message.unwrap_or_default(),
    }
}

fn required_consumed(
    consumed: Option<wire::ConsumedCapacity>,
    message: &str,
) -> Result<ConsumedCapacity> {
    consumed
        .map(consumed_capacity_from_wire)
        .ok_or_else(|| Error::wire_decode(format!("{message} is missing consumed")))
}

fn write_status_from_wire(row: wire::RowInBatchWriteRowResponse) -> RowInBatchWriteRowResponse {
    RowInBatchWriteRowResponse {
        is_ok: row.is_ok,
        error: row.error.map(service_error_record_from_wire),
        consumed: row.consumed.map(consumed_capacity_from_wire),
    }
}
