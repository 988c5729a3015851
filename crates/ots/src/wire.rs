// SPDX-License-Identifier: Apache-2.0

//! Protobuf messages of the OTS 2014-08-08 API.
//!
//! Declared in the shape `prost-build` emits for the service's proto2 schema so
//! the crate builds without `protoc`. Sub-messages are `Option` and optional
//! scalars are `Option` as well; callers populate every field the service
//! treats as required.

#![allow(clippy::derive_partial_eq_without_eq)]

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ColumnType {
    InfMin = 0,
    InfMax = 1,
    Integer = 2,
    String = 3,
    Boolean = 4,
    Double = 5,
    Binary = 6,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum RowExistenceExpectation {
    Ignore = 0,
    ExpectExist = 1,
    ExpectNotExist = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum OperationType {
    Put = 1,
    Delete = 2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum Direction {
    Forward = 0,
    Backward = 1,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Error {
    #[prost(string, required, tag = "1")]
    pub code: String,
    #[prost(string, optional, tag = "2")]
    pub message: Option<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ColumnSchema {
    #[prost(string, required, tag = "1")]
    pub name: String,
    #[prost(enumeration = "ColumnType", required, tag = "2")]
    pub r#type: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ColumnValue {
    #[prost(enumeration = "ColumnType", required, tag = "1")]
    pub r#type: i32,
    #[prost(int64, optional, tag = "2")]
    pub v_int: Option<i64>,
    #[prost(string, optional, tag = "3")]
    pub v_string: Option<String>,
    #[prost(bool, optional, tag = "4")]
    pub v_bool: Option<bool>,
    #[prost(double, optional, tag = "5")]
    pub v_double: Option<f64>,
    #[prost(bytes = "vec", optional, tag = "6")]
    pub v_binary: Option<Vec<u8>>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Column {
    #[prost(string, required, tag = "1")]
    pub name: String,
    #[prost(message, optional, tag = "2")]
    pub value: Option<ColumnValue>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Row {
    #[prost(message, repeated, tag = "1")]
    pub primary_key_columns: Vec<Column>,
    #[prost(message, repeated, tag = "2")]
    pub attribute_columns: Vec<Column>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TableMeta {
    #[prost(string, required, tag = "1")]
    pub table_name: String,
    #[prost(message, repeated, tag = "2")]
    pub primary_key: Vec<ColumnSchema>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Condition {
    #[prost(enumeration = "RowExistenceExpectation", required, tag = "1")]
    pub row_existence: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CapacityUnit {
    #[prost(int32, optional, tag = "1")]
    pub read: Option<i32>,
    #[prost(int32, optional, tag = "2")]
    pub write: Option<i32>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReservedThroughputDetails {
    #[prost(message, optional, tag = "1")]
    pub capacity_unit: Option<CapacityUnit>,
    #[prost(int64, required, tag = "2")]
    pub last_increase_time: i64,
    #[prost(int64, optional, tag = "3")]
    pub last_decrease_time: Option<i64>,
    #[prost(int32, required, tag = "4")]
    pub number_of_decreases_today: i32,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReservedThroughput {
    #[prost(message, optional, tag = "1")]
    pub capacity_unit: Option<CapacityUnit>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ConsumedCapacity {
    #[prost(message, optional, tag = "1")]
    pub capacity_unit: Option<CapacityUnit>,
}

// Table operations

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateTableRequest {
    #[prost(message, optional, tag = "1")]
    pub table_meta: Option<TableMeta>,
    #[prost(message, optional, tag = "2")]
    pub reserved_throughput: Option<ReservedThroughput>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateTableResponse {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateTableRequest {
    #[prost(string, required, tag = "1")]
    pub table_name: String,
    #[prost(message, optional, tag = "2")]
    pub reserved_throughput: Option<ReservedThroughput>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateTableResponse {
    #[prost(message, optional, tag = "1")]
    pub reserved_throughput_details: Option<ReservedThroughputDetails>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DescribeTableRequest {
    #[prost(string, required, tag = "1")]
    pub table_name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DescribeTableResponse {
    #[prost(message, optional, tag = "1")]
    pub table_meta: Option<TableMeta>,
    #[prost(message, optional, tag = "2")]
    pub reserved_throughput_details: Option<ReservedThroughputDetails>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListTableRequest {}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ListTableResponse {
    #[prost(string, repeated, tag = "1")]
    pub table_names: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteTableRequest {
    #[prost(string, required, tag = "1")]
    pub table_name: String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteTableResponse {}

// Single row operations

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetRowRequest {
    #[prost(string, required, tag = "1")]
    pub table_name: String,
    #[prost(message, repeated, tag = "2")]
    pub primary_key: Vec<Column>,
    #[prost(string, repeated, tag = "3")]
    pub columns_to_get: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetRowResponse {
    #[prost(message, optional, tag = "1")]
    pub consumed: Option<ConsumedCapacity>,
    #[prost(message, optional, tag = "2")]
    pub row: Option<Row>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ColumnUpdate {
    #[prost(enumeration = "OperationType", required, tag = "1")]
    pub r#type: i32,
    #[prost(string, required, tag = "2")]
    pub name: String,
    #[prost(message, optional, tag = "3")]
    pub value: Option<ColumnValue>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateRowRequest {
    #[prost(string, required, tag = "1")]
    pub table_name: String,
    #[prost(message, optional, tag = "2")]
    pub condition: Option<Condition>,
    #[prost(message, repeated, tag = "3")]
    pub primary_key: Vec<Column>,
    #[prost(message, repeated, tag = "4")]
    pub attribute_columns: Vec<ColumnUpdate>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateRowResponse {
    #[prost(message, optional, tag = "1")]
    pub consumed: Option<ConsumedCapacity>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PutRowRequest {
    #[prost(string, required, tag = "1")]
    pub table_name: String,
    #[prost(message, optional, tag = "2")]
    pub condition: Option<Condition>,
    #[prost(message, repeated, tag = "3")]
    pub primary_key: Vec<Column>,
    #[prost(message, repeated, tag = "4")]
    pub attribute_columns: Vec<Column>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PutRowResponse {
    #[prost(message, optional, tag = "1")]
    pub consumed: Option<ConsumedCapacity>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteRowRequest {
    #[prost(string, required, tag = "1")]
    pub table_name: String,
    #[prost(message, optional, tag = "2")]
    pub condition: Option<Condition>,
    #[prost(message, repeated, tag = "3")]
    pub primary_key: Vec<Column>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteRowResponse {
    #[prost(message, optional, tag = "1")]
    pub consumed: Option<ConsumedCapacity>,
}

// Batch operations

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RowInBatchGetRowRequest {
    #[prost(message, repeated, tag = "1")]
    pub primary_key: Vec<Column>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TableInBatchGetRowRequest {
    #[prost(string, required, tag = "1")]
    pub table_name: String,
    #[prost(message, repeated, tag = "2")]
    pub rows: Vec<RowInBatchGetRowRequest>,
    #[prost(string, repeated, tag = "3")]
    pub columns_to_get: Vec<String>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BatchGetRowRequest {
    #[prost(message, repeated, tag = "1")]
    pub tables: Vec<TableInBatchGetRowRequest>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RowInBatchGetRowResponse {
    #[prost(bool, required, tag = "1", default = "true")]
    pub is_ok: bool,
    #[prost(message, optional, tag = "2")]
    pub error: Option<Error>,
    #[prost(message, optional, tag = "3")]
    pub consumed: Option<ConsumedCapacity>,
    #[prost(message, optional, tag = "4")]
    pub row: Option<Row>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TableInBatchGetRowResponse {
    #[prost(string, required, tag = "1")]
    pub table_name: String,
    #[prost(message, repeated, tag = "2")]
    pub rows: Vec<RowInBatchGetRowResponse>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BatchGetRowResponse {
    #[prost(message, repeated, tag = "1")]
    pub tables: Vec<TableInBatchGetRowResponse>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PutRowInBatchWriteRowRequest {
    #[prost(message, optional, tag = "1")]
    pub condition: Option<Condition>,
    #[prost(message, repeated, tag = "2")]
    pub primary_key: Vec<Column>,
    #[prost(message, repeated, tag = "3")]
    pub attribute_columns: Vec<Column>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct UpdateRowInBatchWriteRowRequest {
    #[prost(message, optional, tag = "1")]
    pub condition: Option<Condition>,
    #[prost(message, repeated, tag = "2")]
    pub primary_key: Vec<Column>,
    #[prost(message, repeated, tag = "3")]
    pub attribute_columns: Vec<ColumnUpdate>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DeleteRowInBatchWriteRowRequest {
    #[prost(message, optional, tag = "1")]
    pub condition: Option<Condition>,
    #[prost(message, repeated, tag = "2")]
    pub primary_key: Vec<Column>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TableInBatchWriteRowRequest {
    #[prost(string, required, tag = "1")]
    pub table_name: String,
    #[prost(message, repeated, tag = "2")]
    pub put_rows: Vec<PutRowInBatchWriteRowRequest>,
    #[prost(message, repeated, tag = "3")]
    pub update_rows: Vec<UpdateRowInBatchWriteRowRequest>,
    #[prost(message, repeated, tag = "4")]
    pub delete_rows: Vec<DeleteRowInBatchWriteRowRequest>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BatchWriteRowRequest {
    #[prost(message, repeated, tag = "1")]
    pub tables: Vec<TableInBatchWriteRowRequest>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RowInBatchWriteRowResponse {
    #[prost(bool, required, tag = "1", default = "true")]
    pub is_ok: bool,
    #[prost(message, optional, tag = "2")]
    pub error: Option<Error>,
    #[prost(message, optional, tag = "3")]
    pub consumed: Option<ConsumedCapacity>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct TableInBatchWriteRowResponse {
    #[prost(string, required, tag = "1")]
    pub table_name: String,
    #[prost(message, repeated, tag = "2")]
    pub put_rows: Vec<RowInBatchWriteRowResponse>,
    #[prost(message, repeated, tag = "3")]
    pub update_rows: Vec<RowInBatchWriteRowResponse>,
    #[prost(message, repeated, tag = "4")]
    pub delete_rows: Vec<RowInBatchWriteRowResponse>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct BatchWriteRowResponse {
    #[prost(message, repeated, tag = "1")]
    pub tables: Vec<TableInBatchWriteRowResponse>,
}

// Range scan

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetRangeRequest {
    #[prost(string, required, tag = "1")]
    pub table_name: String,
    #[prost(enumeration = "Direction", required, tag = "2")]
    pub direction: i32,
    #[prost(string, repeated, tag = "3")]
    pub columns_to_get: Vec<String>,
    #[prost(int32, optional, tag = "4")]
    pub limit: Option<i32>,
    #[prost(message, repeated, tag = "5")]
    pub inclusive_start_primary_key: Vec<Column>,
    #[prost(message, repeated, tag = "6")]
    pub exclusive_end_primary_key: Vec<Column>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct GetRangeResponse {
    #[prost(message, optional, tag = "1")]
    pub consumed: Option<ConsumedCapacity>,
    #[prost(message, repeated, tag = "2")]
    pub next_start_primary_key: Vec<Column>,
    #[prost(message, repeated, tag = "3")]
    pub rows: Vec<Row>,
}
