// SPDX-License-Identifier: Apache-2.0

//! Tablestore (OTS) protocol layer.
//!
//! Signs outgoing requests, verifies the integrity, freshness and
//! authenticity of responses, and converts between the typed value model in
//! [`metadata`] and the protobuf bodies of the twelve supported operations.
//! Transport is left to the caller; see the `ots-client` crate.

pub mod decoder;
pub mod encoder;
pub mod error;
pub mod metadata;
pub mod protocol;
pub mod wire;

#[cfg(test)]
mod test_util;

pub use crate::encoder::encode_body;
pub use crate::error::{is_service_error, Error, Result, ServiceError};
pub use crate::metadata::{
    BatchGetRowItem, BatchGetRowResponse, BatchWriteRowItem, BatchWriteRowResponse, CapacityUnit,
    Column, ColumnSchema, ColumnType, ColumnUpdate, ColumnValue, Condition, ConsumedCapacity,
    CreateTableResponse, DeleteRowItem, DeleteRowResponse, DeleteTableResponse,
    DescribeTableResponse, Direction, GetRangeRequest, GetRangeResponse, GetRowResponse,
    ListTableResponse, OperationType, PutRowItem, PutRowResponse, ReservedThroughput,
    ReservedThroughputDetails, Row, RowExistenceExpectation, ServiceErrorRecord, TableMeta,
    UpdateRowItem, UpdateRowResponse, UpdateTableResponse,
};
pub use crate::protocol::{
    Clock, Credentials, FixedClock, Operation, Protocol, RawResponse, SignedRequest, SystemClock,
};
