use crate::transport::Transport;
use async_trait::async_trait;
use ots::decoder;
use ots::encoder::{self, encode_body};
use ots::metadata::{
    CapacityUnit, Column, ColumnType, ColumnUpdate, ColumnValue, Direction, OperationType,
    RowExistenceExpectation, TableMeta,
};
use ots::protocol::{
    AUTH_FAILED_CODE, Credentials, HEADER_AUTHORIZATION, HEADER_DATE, Operation, Protocol,
    RawResponse, SignedRequest, format_date,
};
use ots::wire;
use ots::{Error, Result};
use prost::Message;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Faults the mock applies to its next response.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MockFault {
    /// Authorization header signed with the wrong key.
    BadSignature,
    /// Body altered after the checksum was computed.
    CorruptBody,
    /// Date header one hour in the past.
    StaleDate,
}

/// In-memory OTS service speaking the signed protobuf protocol.
///
/// Requests are checked against the service's credentials; tables and rows
/// live in ordered maps so range reads behave like the real service.
#[derive(Clone, Debug)]
pub struct MockOts {
    protocol: Protocol,
    inner: Arc<Mutex<MockOtsState>>,
}

#[derive(Debug, Default)]
struct MockOtsState {
    next_request_id: u64,
    tables: BTreeMap<String, MockTable>,
    requests: Vec<Operation>,
    faults: Vec<MockFault>,
}

#[derive(Debug)]
struct MockTable {
    meta: TableMeta,
    capacity_unit: CapacityUnit,
    last_increase_time: i64,
    rows: BTreeMap<Vec<KeyPart>, StoredRow>,
}

/// Primary key cell ordered the way the service orders rows.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum KeyPart {
    InfMin,
    Integer(i64),
    String(String),
    Boolean(bool),
    Binary(Vec<u8>),
    InfMax,
}

#[derive(Clone, Debug)]
struct StoredRow {
    primary_key: Vec<Column>,
    attributes: BTreeMap<String, ColumnValue>,
}

#[derive(Debug)]
struct MockFailure {
    status: u16,
    code: &'static str,
    message: String,
}

type Outcome<T> = std::result::Result<T, MockFailure>;

impl MockFailure {
    fn new(status: u16, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::new(400, "OTSParameterInvalid", message)
    }

    fn table_missing() -> Self {
        Self::new(404, "OTSObjectNotExist", "Requested table does not exist.")
    }

    fn condition_failed() -> Self {
        Self::new(403, "OTSConditionCheckFail", "Condition check failed.")
    }

    fn to_wire(&self) -> wire::Error {
        wire::Error {
            code: self.code.to_string(),
            message: Some(self.message.clone()),
        }
    }
}

impl From<Error> for MockFailure {
    fn from(err: Error) -> Self {
        MockFailure::invalid_parameter(err.to_string())
    }
}

fn decode_request<M: Message + Default>(body: &[u8]) -> Outcome<M> {
    M::decode(body).map_err(|err| MockFailure::invalid_parameter(err.to_string()))
}

fn consumed(read: i32, write: i32) -> Option<wire::ConsumedCapacity> {
    Some(wire::ConsumedCapacity {
        capacity_unit: Some(wire::CapacityUnit {
            read: Some(read),
            write: Some(write),
        }),
    })
}

fn check_condition(expectation: RowExistenceExpectation, exists: bool) -> Outcome<()> {
    match (expectation, exists) {
        (RowExistenceExpectation::ExpectExist, false)
        | (RowExistenceExpectation::ExpectNotExist, true) => Err(MockFailure::condition_failed()),
        _ => Ok(()),
    }
}

fn row_key(
    meta: &TableMeta,
    primary_key: &[Column],
    allow_infinite: bool,
) -> Outcome<Vec<KeyPart>> {
    if primary_key.len() != meta.primary_key.len() {
        return Err(MockFailure::new(
            400,
            "OTSInvalidPK",
            format!(
                "primary key has {} columns, table {} declares {}",
                primary_key.len(),
                meta.table_name,
                meta.primary_key.len()
            ),
        ));
    }
    primary_key
        .iter()
        .zip(&meta.primary_key)
        .map(|(column, schema)| {
            if column.name != schema.name {
                return Err(MockFailure::new(
                    400,
                    "OTSInvalidPK",
                    format!("expected primary key column {}, got {}", schema.name, column.name),
                ));
            }
            match (&column.value, schema.column_type) {
                (ColumnValue::InfMin, _) if allow_infinite => Ok(KeyPart::InfMin),
                (ColumnValue::InfMax, _) if allow_infinite => Ok(KeyPart::InfMax),
                (ColumnValue::Integer(v), ColumnType::Integer) => Ok(KeyPart::Integer(*v)),
                (ColumnValue::String(v), ColumnType::String) => Ok(KeyPart::String(v.clone())),
                (ColumnValue::Boolean(v), ColumnType::Boolean) => Ok(KeyPart::Boolean(*v)),
                (ColumnValue::Binary(v), ColumnType::Binary) => Ok(KeyPart::Binary(v.clone())),
                (value, expected) => Err(MockFailure::new(
                    400,
                    "OTSInvalidPK",
                    format!(
                        "primary key column {} is {}, table declares {expected}",
                        column.name,
                        value.column_type()
                    ),
                )),
            }
        })
        .collect()
}

impl StoredRow {
    fn to_wire(&self, columns_to_get: &[String]) -> Result<wire::Row> {
        let wanted =
            |name: &str| columns_to_get.is_empty() || columns_to_get.iter().any(|c| c == name);
        let primary_key: Vec<Column> = self
            .primary_key
            .iter()
            .filter(|column| wanted(&column.name))
            .cloned()
            .collect();
        let attributes: Vec<Column> = self
            .attributes
            .iter()
            .filter(|(name, _)| wanted(name))
            .map(|(name, value)| Column::new(name.clone(), value.clone()))
            .collect();
        Ok(wire::Row {
            primary_key_columns: encoder::columns_to_wire(&primary_key)?,
            attribute_columns: encoder::columns_to_wire(&attributes)?,
        })
    }
}

impl MockOtsState {
    fn allocate_request_id(&mut self) -> String {
        self.next_request_id += 1;
        format!("mock-{:08}", self.next_request_id)
    }

    fn table(&self, name: &str) -> Outcome<&MockTable> {
        self.tables.get(name).ok_or_else(MockFailure::table_missing)
    }

    fn table_mut(&mut self, name: &str) -> Outcome<&mut MockTable> {
        self.tables.get_mut(name).ok_or_else(MockFailure::table_missing)
    }

    fn handle(&mut self, operation: Operation, body: &[u8], now: i64) -> Outcome<Vec<u8>> {
        let response = match operation {
            Operation::ListTable => encode_body(&wire::ListTableResponse {
                table_names: self.tables.keys().cloned().collect(),
            }),
            Operation::CreateTable => {
                self.create_table(decode_request(body)?, now)?;
                encode_body(&wire::CreateTableResponse {})
            }
            Operation::DeleteTable => {
                let request: wire::DeleteTableRequest = decode_request(body)?;
                self.tables
                    .remove(&request.table_name)
                    .ok_or_else(MockFailure::table_missing)?;
                encode_body(&wire::DeleteTableResponse {})
            }
            Operation::DescribeTable => {
                let request: wire::DescribeTableRequest = decode_request(body)?;
                encode_body(&self.describe_table(&request.table_name)?)
            }
            Operation::UpdateTable => {
                let request: wire::UpdateTableRequest = decode_request(body)?;
                encode_body(&self.update_table(request, now)?)
            }
            Operation::GetRow => {
                let request: wire::GetRowRequest = decode_request(body)?;
                let primary_key = decoder::columns_from_wire(request.primary_key)?;
                let row =
                    self.get_row(&request.table_name, &primary_key, &request.columns_to_get)?;
                encode_body(&wire::GetRowResponse {
                    consumed: consumed(1, 0),
                    row: Some(row.unwrap_or_default()),
                })
            }
            Operation::PutRow => {
                let request: wire::PutRowRequest = decode_request(body)?;
                self.put_row(
                    &request.table_name,
                    request.condition,
                    request.primary_key,
                    request.attribute_columns,
                )?;
                encode_body(&wire::PutRowResponse {
                    consumed: consumed(0, 1),
                })
            }
            Operation::UpdateRow => {
                let request: wire::UpdateRowRequest = decode_request(body)?;
                self.update_row(
                    &request.table_name,
                    request.condition,
                    request.primary_key,
                    request.attribute_columns,
                )?;
                encode_body(&wire::UpdateRowResponse {
                    consumed: consumed(0, 1),
                })
            }
            Operation::DeleteRow => {
                let request: wire::DeleteRowRequest = decode_request(body)?;
                self.delete_row(&request.table_name, request.condition, request.primary_key)?;
                encode_body(&wire::DeleteRowResponse {
                    consumed: consumed(0, 1),
                })
            }
            Operation::BatchGetRow => encode_body(&self.batch_get_row(decode_request(body)?)),
            Operation::BatchWriteRow => encode_body(&self.batch_write_row(decode_request(body)?)),
            Operation::GetRange => encode_body(&self.get_range(decode_request(body)?)?),
        };
        Ok(response)
    }

    fn create_table(&mut self, request: wire::CreateTableRequest, now: i64) -> Outcome<()> {
        let meta = request
            .table_meta
            .ok_or_else(|| MockFailure::invalid_parameter("table_meta is required"))?;
        let meta = decoder::table_meta_from_wire(meta)?;
        if meta.primary_key.is_empty() {
            return Err(MockFailure::invalid_parameter("primary key schema is empty"));
        }
        if self.tables.contains_key(&meta.table_name) {
            return Err(MockFailure::new(
                409,
                "OTSObjectAlreadyExist",
                "Requested table already exists.",
            ));
        }
        let capacity_unit = request
            .reserved_throughput
            .and_then(|throughput| throughput.capacity_unit)
            .map(decoder::capacity_unit_from_wire)
            .unwrap_or_default();
        self.tables.insert(
            meta.table_name.clone(),
            MockTable {
                meta,
                capacity_unit,
                last_increase_time: now,
                rows: BTreeMap::new(),
            },
        );
        Ok(())
    }

    fn details(table: &MockTable) -> wire::ReservedThroughputDetails {
        wire::ReservedThroughputDetails {
            capacity_unit: Some(encoder::capacity_unit_to_wire(&table.capacity_unit)),
            last_increase_time: table.last_increase_time,
            last_decrease_time: None,
            number_of_decreases_today: 0,
        }
    }

    fn describe_table(&self, table_name: &str) -> Outcome<wire::DescribeTableResponse> {
        let table = self.table(table_name)?;
        let primary_key = table
            .meta
            .primary_key
            .iter()
            .map(encoder::column_schema_to_wire)
            .collect::<Result<Vec<_>>>()?;
        Ok(wire::DescribeTableResponse {
            table_meta: Some(wire::TableMeta {
                table_name: table.meta.table_name.clone(),
                primary_key,
            }),
            reserved_throughput_details: Some(Self::details(table)),
        })
    }

    fn update_table(
        &mut self,
        request: wire::UpdateTableRequest,
        now: i64,
    ) -> Outcome<wire::UpdateTableResponse> {
        let table = self.table_mut(&request.table_name)?;
        if let Some(unit) = request
            .reserved_throughput
            .and_then(|throughput| throughput.capacity_unit)
        {
            if let Some(read) = unit.read {
                table.capacity_unit.read = read;
            }
            if let Some(write) = unit.write {
                table.capacity_unit.write = write;
            }
            table.last_increase_time = now;
        }
        Ok(wire::UpdateTableResponse {
            reserved_throughput_details: Some(Self::details(table)),
        })
    }

    fn get_row(
        &self,
        table_name: &str,
        primary_key: &[Column],
        columns_to_get: &[String],
    ) -> Outcome<Option<wire::Row>> {
        let table = self.table(table_name)?;
        let key = row_key(&table.meta, primary_key, false)?;
        match table.rows.get(&key) {
            Some(row) => Ok(Some(row.to_wire(columns_to_get)?)),
            None => Ok(None),
        }
    }

    fn put_row(
        &mut self,
        table_name: &str,
        condition: Option<wire::Condition>,
        primary_key: Vec<wire::Column>,
        attribute_columns: Vec<wire::Column>,
    ) -> Outcome<()> {
        let condition = decoder::condition_from_wire(condition.unwrap_or_default())?;
        let primary_key = decoder::columns_from_wire(primary_key)?;
        let attributes = decoder::columns_from_wire(attribute_columns)?;
        let table = self.table_mut(table_name)?;
        let key = row_key(&table.meta, &primary_key, false)?;
        check_condition(condition.row_existence, table.rows.contains_key(&key))?;
        table.rows.insert(
            key,
            StoredRow {
                primary_key,
                attributes: attributes
                    .into_iter()
                    .map(|column| (column.name, column.value))
                    .collect(),
            },
        );
        Ok(())
    }

    fn update_row(
        &mut self,
        table_name: &str,
        condition: Option<wire::Condition>,
        primary_key: Vec<wire::Column>,
        updates: Vec<wire::ColumnUpdate>,
    ) -> Outcome<()> {
        let condition = decoder::condition_from_wire(condition.unwrap_or_default())?;
        let primary_key = decoder::columns_from_wire(primary_key)?;
        let updates = updates
            .into_iter()
            .map(decoder::column_update_from_wire)
            .collect::<Result<Vec<ColumnUpdate>>>()?;
        let table = self.table_mut(table_name)?;
        let key = row_key(&table.meta, &primary_key, false)?;
        check_condition(condition.row_existence, table.rows.contains_key(&key))?;
        let row = table.rows.entry(key).or_insert_with(|| StoredRow {
            primary_key,
            attributes: BTreeMap::new(),
        });
        for update in updates {
            match (update.operation, update.value) {
                (OperationType::Put, Some(value)) => {
                    row.attributes.insert(update.name, value);
                }
                _ => {
                    row.attributes.remove(&update.name);
                }
            }
        }
        Ok(())
    }

    fn delete_row(
        &mut self,
        table_name: &str,
        condition: Option<wire::Condition>,
        primary_key: Vec<wire::Column>,
    ) -> Outcome<()> {
        let condition = decoder::condition_from_wire(condition.unwrap_or_default())?;
        let primary_key = decoder::columns_from_wire(primary_key)?;
        let table = self.table_mut(table_name)?;
        let key = row_key(&table.meta, &primary_key, false)?;
        check_condition(condition.row_existence, table.rows.contains_key(&key))?;
        table.rows.remove(&key);
        Ok(())
    }

    fn batch_get_row(&self, request: wire::BatchGetRowRequest) -> wire::BatchGetRowResponse {
        let tables = request
            .tables
            .into_iter()
            .map(|table| {
                let rows = table
                    .rows
                    .into_iter()
                    .map(|row| {
                        let outcome = decoder::columns_from_wire(row.primary_key)
                            .map_err(MockFailure::from)
                            .and_then(|primary_key| {
                                self.get_row(&table.table_name, &primary_key, &table.columns_to_get)
                            });
                        match outcome {
                            Ok(found) => wire::RowInBatchGetRowResponse {
                                is_ok: true,
                                error: None,
                                consumed: consumed(1, 0),
                                row: Some(found.unwrap_or_default()),
                            },
                            Err(failure) => wire::RowInBatchGetRowResponse {
                                is_ok: false,
                                error: Some(failure.to_wire()),
                                consumed: None,
                                row: None,
                            },
                        }
                    })
                    .collect();
                wire::TableInBatchGetRowResponse {
                    table_name: table.table_name,
                    rows,
                }
            })
            .collect();
        wire::BatchGetRowResponse { tables }
    }

    fn batch_write_row(
        &mut self,
        request: wire::BatchWriteRowRequest,
    ) -> wire::BatchWriteRowResponse {
        fn status(outcome: Outcome<()>) -> wire::RowInBatchWriteRowResponse {
            match outcome {
                Ok(()) => wire::RowInBatchWriteRowResponse {
                    is_ok: true,
                    error: None,
                    consumed: consumed(0, 1),
                },
                Err(failure) => wire::RowInBatchWriteRowResponse {
                    is_ok: false,
                    error: Some(failure.to_wire()),
                    consumed: None,
                },
            }
        }

        let mut tables = Vec::with_capacity(request.tables.len());
        for table in request.tables {
            let name = table.table_name;
            let put_rows = table
                .put_rows
                .into_iter()
                .map(|row| {
                    status(self.put_row(
                        &name,
                        row.condition,
                        row.primary_key,
                        row.attribute_columns,
                    ))
                })
                .collect();
            let update_rows = table
                .update_rows
                .into_iter()
                .map(|row| {
                    status(self.update_row(
                        &name,
                        row.condition,
                        row.primary_key,
                        row.attribute_columns,
                    ))
                })
                .collect();
            let delete_rows = table
                .delete_rows
                .into_iter()
                .map(|row| status(self.delete_row(&name, row.condition, row.primary_key)))
                .collect();
            tables.push(wire::TableInBatchWriteRowResponse {
                table_name: name,
                put_rows,
                update_rows,
                delete_rows,
            });
        }
        wire::BatchWriteRowResponse { tables }
    }

    fn get_range(&self, request: wire::GetRangeRequest) -> Outcome<wire::GetRangeResponse> {
        let table = self.table(&request.table_name)?;
        let direction = decoder::direction_from_wire(request.direction)?;
        let start = row_key(
            &table.meta,
            &decoder::columns_from_wire(request.inclusive_start_primary_key)?,
            true,
        )?;
        let end = row_key(
            &table.meta,
            &decoder::columns_from_wire(request.exclusive_end_primary_key)?,
            true,
        )?;
        let page = match request.limit {
            Some(limit) if limit <= 0 => {
                return Err(MockFailure::invalid_parameter("limit must be positive"));
            }
            Some(limit) => limit as usize,
            None => usize::MAX,
        };

        let matching: Vec<&StoredRow> = match direction {
            Direction::Forward => table
                .rows
                .range(start..)
                .take_while(|(key, _)| **key < end)
                .map(|(_, row)| row)
                .collect(),
            Direction::Backward => table
                .rows
                .range(..=start)
                .rev()
                .take_while(|(key, _)| **key > end)
                .map(|(_, row)| row)
                .collect(),
        };

        let rows = matching
            .iter()
            .take(page)
            .map(|row| row.to_wire(&request.columns_to_get))
            .collect::<Result<Vec<_>>>()?;
        let next_start_primary_key = match matching.get(page) {
            Some(row) => encoder::columns_to_wire(&row.primary_key)?,
            None => Vec::new(),
        };
        let read = i32::try_from(rows.len()).unwrap_or(i32::MAX).max(1);
        Ok(wire::GetRangeResponse {
            consumed: consumed(read, 0),
            next_start_primary_key,
            rows,
        })
    }
}

impl MockOts {
    pub fn new(credentials: Credentials) -> Self {
        Self::with_protocol(Protocol::new(credentials))
    }

    /// Signs and verifies with `protocol`, including its clock.
    pub fn with_protocol(protocol: Protocol) -> Self {
        Self {
            protocol,
            inner: Arc::new(Mutex::new(MockOtsState::default())),
        }
    }

    /// Operations received so far, including rejected ones.
    pub fn requests(&self) -> Result<Vec<Operation>> {
        let state = self
            .inner
            .lock()
            .map_err(|_| Error::Transport("mock backend mutex poisoned".to_string()))?;
        Ok(state.requests.clone())
    }

    /// Queues a fault for the next response.
    pub fn inject_fault(&self, fault: MockFault) -> Result<()> {
        let mut state = self
            .inner
            .lock()
            .map_err(|_| Error::Transport("mock backend mutex poisoned".to_string()))?;
        state.faults.push(fault);
        Ok(())
    }

    fn apply_fault(&self, fault: MockFault, response: &mut RawResponse) {
        match fault {
            MockFault::BadSignature => {
                let forged = format!(
                    "OTS {}:AAAAAAAAAAAAAAAAAAAAAAAAAAA=",
                    self.protocol.credentials().access_key_id
                );
                response
                    .headers
                    .insert(HEADER_AUTHORIZATION.to_string(), forged);
            }
            MockFault::CorruptBody => response.body.push(0),
            MockFault::StaleDate => {
                let stale = self.protocol.now() - chrono::Duration::hours(1);
                response
                    .headers
                    .insert(HEADER_DATE.to_string(), format_date(stale));
            }
        }
    }
}

#[async_trait]
impl Transport for MockOts {
    async fn send(&self, request: SignedRequest) -> Result<RawResponse> {
        let operation_name = request.url.rsplit('/').next().unwrap_or_default();
        let now = self.protocol.now().timestamp();

        let mut state = self
            .inner
            .lock()
            .map_err(|_| Error::Transport("mock backend mutex poisoned".to_string()))?;
        let request_id = state.allocate_request_id();

        let outcome = match self
            .protocol
            .verify_request(operation_name, &request.headers, &request.body)
        {
            Ok(operation) => {
                state.requests.push(operation);
                state.handle(operation, &request.body, now)
            }
            Err(Error::UnsupportedOperation(name)) => Err(MockFailure::new(
                400,
                "OTSUnsupportOperation",
                format!("Unsupported operation: '{name}'."),
            )),
            Err(err) => Err(MockFailure::new(403, AUTH_FAILED_CODE, err.to_string())),
        };

        let (status, body) = match outcome {
            Ok(body) => (200, body),
            Err(failure) => (failure.status, encode_body(&failure.to_wire())),
        };
        debug!(operation = operation_name, status, request_id = %request_id, "mock_ots_request");

        // Responses to unknown operations are signed as ListTable; a client
        // never gets that far because it refuses to sign them.
        let signing_operation = Operation::parse(operation_name)
            .map(Operation::as_str)
            .unwrap_or(Operation::ListTable.as_str());
        let headers = self
            .protocol
            .response_headers(signing_operation, &request_id, &body)?;
        let mut response = RawResponse::new(status, headers, body);
        if !state.faults.is_empty() {
            let fault = state.faults.remove(0);
            self.apply_fault(fault, &mut response);
        }
        Ok(response)
    }
}
