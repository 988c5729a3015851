// SPDX-License-Identifier: Apache-2.0

//! Domain value model: column values, rows, schemas and the per-operation
//! response wrappers handed back to callers.

use std::any::Any;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ColumnType {
    InfMin,
    InfMax,
    Integer,
    String,
    Boolean,
    Double,
    Binary,
}

impl ColumnType {
    pub const ALL: [ColumnType; 7] = [
        ColumnType::InfMin,
        ColumnType::InfMax,
        ColumnType::Integer,
        ColumnType::String,
        ColumnType::Boolean,
        ColumnType::Double,
        ColumnType::Binary,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ColumnType::InfMin => "INF_MIN",
            ColumnType::InfMax => "INF_MAX",
            ColumnType::Integer => "INTEGER",
            ColumnType::String => "STRING",
            ColumnType::Boolean => "BOOLEAN",
            ColumnType::Double => "DOUBLE",
            ColumnType::Binary => "BINARY",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ColumnType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        ColumnType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| Error::invalid_input(format!("unknown column type {s}")))
    }
}

/// A single typed cell value.
///
/// `InfMin` and `InfMax` are range bounds only and never hold a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColumnValue {
    InfMin,
    InfMax,
    Integer(i64),
    String(String),
    Boolean(bool),
    Double(f64),
    Binary(Vec<u8>),
}

impl ColumnValue {
    pub fn column_type(&self) -> ColumnType {
        match self {
            ColumnValue::InfMin => ColumnType::InfMin,
            ColumnValue::InfMax => ColumnType::InfMax,
            ColumnValue::Integer(_) => ColumnType::Integer,
            ColumnValue::String(_) => ColumnType::String,
            ColumnValue::Boolean(_) => ColumnType::Boolean,
            ColumnValue::Double(_) => ColumnType::Double,
            ColumnValue::Binary(_) => ColumnType::Binary,
        }
    }

    /// Classifies a caller-supplied value by its concrete type.
    ///
    /// Integers of up to 64 signed bits become `Integer`, text becomes
    /// `String`, floats become `Double`, `bool` becomes `Boolean` and byte
    /// buffers become `Binary`. Anything else is rejected.
    pub fn from_untyped(value: &dyn Any) -> Result<Self> {
        macro_rules! integer {
            ($($t:ty),*) => {
                $(
                    if let Some(v) = value.downcast_ref::<$t>() {
                        return Ok(ColumnValue::Integer(i64::from(*v)));
                    }
                )*
            };
        }
        integer!(i64, i32, i16, i8, u32, u16, u8);

        if let Some(v) = value.downcast_ref::<isize>() {
            return i64::try_from(*v)
                .map(ColumnValue::Integer)
                .map_err(|_| Error::UnsupportedValueType(format!("isize {v} overflows INTEGER")));
        }
        if let Some(v) = value.downcast_ref::<u64>() {
            return i64::try_from(*v)
                .map(ColumnValue::Integer)
                .map_err(|_| Error::UnsupportedValueType(format!("u64 {v} overflows INTEGER")));
        }
        if let Some(v) = value.downcast_ref::<usize>() {
            return i64::try_from(*v)
                .map(ColumnValue::Integer)
                .map_err(|_| Error::UnsupportedValueType(format!("usize {v} overflows INTEGER")));
        }
        if let Some(v) = value.downcast_ref::<String>() {
            return Ok(ColumnValue::String(v.clone()));
        }
        if let Some(v) = value.downcast_ref::<&str>() {
            return Ok(ColumnValue::String((*v).to_string()));
        }
        if let Some(v) = value.downcast_ref::<f64>() {
            return Ok(ColumnValue::Double(*v));
        }
        if let Some(v) = value.downcast_ref::<f32>() {
            return Ok(ColumnValue::Double(f64::from(*v)));
        }
        if let Some(v) = value.downcast_ref::<bool>() {
            return Ok(ColumnValue::Boolean(*v));
        }
        if let Some(v) = value.downcast_ref::<Vec<u8>>() {
            return Ok(ColumnValue::Binary(v.clone()));
        }
        if let Some(v) = value.downcast_ref::<&[u8]>() {
            return Ok(ColumnValue::Binary(v.to_vec()));
        }
        Err(Error::UnsupportedValueType(
            "expected an integer, text, float, bool or byte buffer".to_string(),
        ))
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            ColumnValue::Integer(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            ColumnValue::String(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ColumnValue::Boolean(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ColumnValue::Double(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            ColumnValue::Binary(v) => Some(v),
            _ => None,
        }
    }
}

macro_rules! impl_from_integer {
    ($($t:ty),*) => {
        $(
            impl From<$t> for ColumnValue {
                fn from(v: $t) -> Self {
                    ColumnValue::Integer(i64::from(v))
                }
            }
        )*
    };
}

impl_from_integer!(i64, i32, i16, i8, u32, u16, u8);

impl From<&str> for ColumnValue {
    fn from(v: &str) -> Self {
        ColumnValue::String(v.to_string())
    }
}

impl From<String> for ColumnValue {
    fn from(v: String) -> Self {
        ColumnValue::String(v)
    }
}

impl From<f64> for ColumnValue {
    fn from(v: f64) -> Self {
        ColumnValue::Double(v)
    }
}

impl From<f32> for ColumnValue {
    fn from(v: f32) -> Self {
        ColumnValue::Double(f64::from(v))
    }
}

impl From<bool> for ColumnValue {
    fn from(v: bool) -> Self {
        ColumnValue::Boolean(v)
    }
}

impl From<Vec<u8>> for ColumnValue {
    fn from(v: Vec<u8>) -> Self {
        ColumnValue::Binary(v)
    }
}

impl From<&[u8]> for ColumnValue {
    fn from(v: &[u8]) -> Self {
        ColumnValue::Binary(v.to_vec())
    }
}

impl TryFrom<&serde_json::Value> for ColumnValue {
    type Error = Error;

    fn try_from(value: &serde_json::Value) -> Result<Self> {
        use serde_json::Value;

        match value {
            Value::Bool(v) => Ok(ColumnValue::Boolean(*v)),
            Value::String(v) => Ok(ColumnValue::String(v.clone())),
            Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    Ok(ColumnValue::Integer(v))
                } else if n.is_u64() {
                    Err(Error::UnsupportedValueType(format!(
                        "number {n} overflows INTEGER"
                    )))
                } else {
                    n.as_f64().map(ColumnValue::Double).ok_or_else(|| {
                        Error::UnsupportedValueType(format!("number {n} is not representable"))
                    })
                }
            }
            Value::Null => Err(Error::UnsupportedValueType("null".to_string())),
            Value::Array(_) => Err(Error::UnsupportedValueType("array".to_string())),
            Value::Object(_) => Err(Error::UnsupportedValueType("object".to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub value: ColumnValue,
}

impl Column {
    pub fn new(name: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Builds one column per mapping entry.
///
/// The output follows the iteration order of `mapping`; for hash maps that
/// order is unspecified.
pub fn columns_from_mapping<I, K, V>(mapping: I) -> Vec<Column>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<ColumnValue>,
{
    mapping
        .into_iter()
        .map(|(name, value)| Column::new(name, value))
        .collect()
}

/// Untyped variant of [`columns_from_mapping`] over a JSON object.
pub fn try_columns_from_json(
    mapping: &serde_json::Map<String, serde_json::Value>,
) -> Result<Vec<Column>> {
    mapping
        .iter()
        .map(|(name, value)| {
            let value = ColumnValue::try_from(value).map_err(|err| match err {
                Error::UnsupportedValueType(kind) => {
                    Error::UnsupportedValueType(format!("column {name}: {kind}"))
                }
                other => other,
            })?;
            Ok(Column {
                name: name.clone(),
                value,
            })
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSchema {
    pub name: String,
    pub column_type: ColumnType,
}

impl ColumnSchema {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMeta {
    pub table_name: String,
    /// Composite primary key; order defines key ordering.
    pub primary_key: Vec<ColumnSchema>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Row {
    pub primary_key_columns: Vec<Column>,
    pub attribute_columns: Vec<Column>,
}

impl Row {
    pub fn is_empty(&self) -> bool {
        self.primary_key_columns.is_empty() && self.attribute_columns.is_empty()
    }

    pub fn attribute(&self, name: &str) -> Option<&ColumnValue> {
        self.attribute_columns
            .iter()
            .find(|col| col.name == name)
            .map(|col| &col.value)
    }

    pub fn primary_key(&self, name: &str) -> Option<&ColumnValue> {
        self.primary_key_columns
            .iter()
            .find(|col| col.name == name)
            .map(|col| &col.value)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityUnit {
    pub read: i32,
    pub write: i32,
}

impl CapacityUnit {
    pub fn new(read: i32, write: i32) -> Self {
        Self { read, write }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedThroughput {
    pub capacity_unit: CapacityUnit,
}

impl ReservedThroughput {
    pub fn new(read: i32, write: i32) -> Self {
        Self {
            capacity_unit: CapacityUnit::new(read, write),
        }
    }
}

/// Service-maintained throughput state; the client only reads it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservedThroughputDetails {
    pub capacity_unit: CapacityUnit,
    pub last_increase_time: i64,
    pub last_decrease_time: Option<i64>,
    pub number_of_decreases_today: i32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumedCapacity {
    pub capacity_unit: CapacityUnit,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RowExistenceExpectation {
    #[default]
    Ignore,
    ExpectExist,
    ExpectNotExist,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    pub row_existence: RowExistenceExpectation,
}

impl Condition {
    pub fn new(row_existence: RowExistenceExpectation) -> Self {
        Self { row_existence }
    }

    pub fn ignore() -> Self {
        Self::new(RowExistenceExpectation::Ignore)
    }

    pub fn expect_exist() -> Self {
        Self::new(RowExistenceExpectation::ExpectExist)
    }

    pub fn expect_not_exist() -> Self {
        Self::new(RowExistenceExpectation::ExpectNotExist)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationType {
    Put,
    Delete,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnUpdate {
    pub operation: OperationType,
    pub name: String,
    pub value: Option<ColumnValue>,
}

impl ColumnUpdate {
    pub fn put(name: impl Into<String>, value: impl Into<ColumnValue>) -> Self {
        Self {
            operation: OperationType::Put,
            name: name.into(),
            value: Some(value.into()),
        }
    }

    pub fn delete(name: impl Into<String>) -> Self {
        Self {
            operation: OperationType::Delete,
            name: name.into(),
            value: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

/// The service's own `{code, message}` error record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceErrorRecord {
    pub code: String,
    pub message: String,
}

// Request-side aggregates

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchGetRowItem {
    pub primary_keys: Vec<Vec<Column>>,
    pub columns_to_get: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PutRowItem {
    pub condition: Condition,
    pub primary_key: Vec<Column>,
    pub attribute_columns: Vec<Column>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRowItem {
    pub condition: Condition,
    pub primary_key: Vec<Column>,
    pub columns_to_put: Vec<Column>,
    pub columns_to_delete: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteRowItem {
    pub condition: Condition,
    pub primary_key: Vec<Column>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchWriteRowItem {
    pub put_rows: Vec<PutRowItem>,
    pub update_rows: Vec<UpdateRowItem>,
    pub delete_rows: Vec<DeleteRowItem>,
}

/// Arguments of a single-page range scan.
#[derive(Debug, Clone, PartialEq)]
pub struct GetRangeRequest {
    pub table_name: String,
    pub direction: Direction,
    pub inclusive_start_primary_key: Vec<Column>,
    pub exclusive_end_primary_key: Vec<Column>,
    pub columns_to_get: Vec<String>,
    pub limit: Option<i32>,
}

// Responses

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CreateTableResponse {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeleteTableResponse {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListTableResponse {
    pub table_names: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeTableResponse {
    pub table_meta: TableMeta,
    pub reserved_throughput_details: ReservedThroughputDetails,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpdateTableResponse {
    pub reserved_throughput_details: ReservedThroughputDetails,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetRowResponse {
    pub consumed: ConsumedCapacity,
    /// `None` when the row does not exist, and also when it exists but
    /// none of the requested `columns_to_get` are present. The service
    /// answers both cases with the same empty row.
    pub row: Option<Row>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PutRowResponse {
    pub consumed: ConsumedCapacity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateRowResponse {
    pub consumed: ConsumedCapacity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteRowResponse {
    pub consumed: ConsumedCapacity,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowInBatchGetRowResponse {
    pub is_ok: bool,
    pub error: Option<ServiceErrorRecord>,
    pub consumed: Option<ConsumedCapacity>,
    /// `None` for a missing row or an empty projection, as in
    /// [`GetRowResponse::row`].
    pub row: Option<Row>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableInBatchGetRowResponse {
    pub table_name: String,
    pub rows: Vec<RowInBatchGetRowResponse>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchGetRowResponse {
    pub tables: Vec<TableInBatchGetRowResponse>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowInBatchWriteRowResponse {
    pub is_ok: bool,
    pub error: Option<ServiceErrorRecord>,
    pub consumed: Option<ConsumedCapacity>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableInBatchWriteRowResponse {
    pub table_name: String,
    pub put_rows: Vec<RowInBatchWriteRowResponse>,
    pub update_rows: Vec<RowInBatchWriteRowResponse>,
    pub delete_rows: Vec<RowInBatchWriteRowResponse>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchWriteRowResponse {
    pub tables: Vec<TableInBatchWriteRowResponse>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct GetRangeResponse {
    pub consumed: ConsumedCapacity,
    /// Empty when the scan reached the end bound.
    pub next_start_primary_key: Vec<Column>,
    pub rows: Vec<Row>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn untyped_values_infer_their_tag() {
        assert_eq!(ColumnValue::from_untyped(&7i32).unwrap(), ColumnValue::Integer(7));
        assert_eq!(ColumnValue::from_untyped(&-3i64).unwrap(), ColumnValue::Integer(-3));
        assert_eq!(ColumnValue::from_untyped(&9u8).unwrap(), ColumnValue::Integer(9));
        assert_eq!(
            ColumnValue::from_untyped(&"alice").unwrap(),
            ColumnValue::String("alice".into())
        );
        assert_eq!(
            ColumnValue::from_untyped(&String::from("bob")).unwrap(),
            ColumnValue::String("bob".into())
        );
        assert_eq!(ColumnValue::from_untyped(&1.5f32).unwrap(), ColumnValue::Double(1.5));
        assert_eq!(ColumnValue::from_untyped(&true).unwrap(), ColumnValue::Boolean(true));
        assert_eq!(
            ColumnValue::from_untyped(&vec![1u8, 2, 3]).unwrap(),
            ColumnValue::Binary(vec![1, 2, 3])
        );
    }

    #[test]
    fn untyped_integer_widths_and_byte_slices() {
        assert_eq!(ColumnValue::from_untyped(&-300i16).unwrap(), ColumnValue::Integer(-300));
        assert_eq!(ColumnValue::from_untyped(&-12isize).unwrap(), ColumnValue::Integer(-12));
        assert_eq!(ColumnValue::from_untyped(&42usize).unwrap(), ColumnValue::Integer(42));
        assert_eq!(
            ColumnValue::from_untyped(&9_223_372_036_854_775_807u64).unwrap(),
            ColumnValue::Integer(i64::MAX)
        );
        assert_eq!(ColumnValue::from_untyped(&2.25f64).unwrap(), ColumnValue::Double(2.25));

        let bytes: &'static [u8] = &[4, 5];
        assert_eq!(
            ColumnValue::from_untyped(&bytes).unwrap(),
            ColumnValue::Binary(vec![4, 5])
        );
    }

    #[test]
    fn untyped_values_outside_the_set_are_rejected() {
        let err = ColumnValue::from_untyped(&'c').unwrap_err();
        assert!(matches!(err, Error::UnsupportedValueType(_)));
        let err = ColumnValue::from_untyped(&vec![1i32]).unwrap_err();
        assert!(matches!(err, Error::UnsupportedValueType(_)));
        let err = ColumnValue::from_untyped(&u64::MAX).unwrap_err();
        assert!(matches!(err, Error::UnsupportedValueType(_)));
    }

    #[test]
    fn json_values_map_to_column_values() {
        let json = serde_json::json!({
            "gid": 1,
            "score": 2.5,
            "name": "alice",
            "active": false
        });
        let columns = try_columns_from_json(json.as_object().unwrap()).unwrap();
        assert_eq!(columns.len(), 4);
        assert!(columns.contains(&Column::new("gid", 1i64)));
        assert!(columns.contains(&Column::new("score", 2.5f64)));
        assert!(columns.contains(&Column::new("name", "alice")));
        assert!(columns.contains(&Column::new("active", false)));

        let json = serde_json::json!({ "tags": ["a"] });
        let err = try_columns_from_json(json.as_object().unwrap()).unwrap_err();
        assert!(matches!(err, Error::UnsupportedValueType(msg) if msg.contains("tags")));
    }

    #[test]
    fn columns_from_mapping_yields_one_column_per_entry() {
        let mapping: HashMap<&str, ColumnValue> = HashMap::from([
            ("gid", ColumnValue::Integer(1)),
            ("uid", ColumnValue::Integer(100)),
        ]);
        let mut names: Vec<String> = columns_from_mapping(mapping)
            .into_iter()
            .map(|col| col.name)
            .collect();
        names.sort();
        assert_eq!(names, vec!["gid".to_string(), "uid".to_string()]);

        let ordered = columns_from_mapping([("b", 2i64), ("a", 1i64)]);
        assert_eq!(ordered[0], Column::new("b", 2i64));
        assert_eq!(ordered[1], Column::new("a", 1i64));
    }

    #[test]
    fn column_type_names_parse_back() {
        for t in ColumnType::ALL {
            assert_eq!(t.as_str().parse::<ColumnType>().unwrap(), t);
        }
        assert!("TEXT".parse::<ColumnType>().is_err());
    }
}
