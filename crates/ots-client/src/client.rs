use crate::config::OtsConfig;
use crate::transport::{ReqwestTransport, Transport};
use ots::decoder;
use ots::encoder::{self, encode_body};
use ots::metadata::{
    BatchGetRowItem, BatchGetRowResponse, BatchWriteRowItem, BatchWriteRowResponse, Column,
    Condition, CreateTableResponse, DeleteRowResponse, DeleteTableResponse, DescribeTableResponse,
    GetRangeRequest, GetRangeResponse, GetRowResponse, ListTableResponse, PutRowResponse,
    ReservedThroughput, TableMeta, UpdateRowResponse, UpdateTableResponse,
};
use ots::protocol::{Operation, Protocol};
use ots::Result;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Async client for one OTS instance.
///
/// Each call encodes its request, signs it, sends it through the transport
/// and verifies the response before decoding it. The client keeps no state
/// between calls and is cheap to clone.
#[derive(Clone, Debug)]
pub struct OtsClient<T = ReqwestTransport> {
    protocol: Protocol,
    transport: T,
}

impl OtsClient<ReqwestTransport> {
    pub fn connect(config: &OtsConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::new(
            Protocol::new(config.credentials()),
            ReqwestTransport::new(),
        ))
    }

    pub fn from_env() -> Result<Self> {
        Self::connect(&OtsConfig::from_env()?)
    }
}

impl<T> OtsClient<T> {
    pub fn new(protocol: Protocol, transport: T) -> Self {
        Self {
            protocol,
            transport,
        }
    }

    pub fn protocol(&self) -> &Protocol {
        &self.protocol
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn into_shared(self) -> OtsClient<Arc<T>> {
        OtsClient {
            protocol: self.protocol,
            transport: Arc::new(self.transport),
        }
    }
}

impl<T: Transport> OtsClient<T> {
    async fn dispatch(&self, operation: Operation, body: Vec<u8>) -> Result<Vec<u8>> {
        let started = Instant::now();
        let request = self.protocol.sign_request(operation.as_str(), body)?;
        let response = self.transport.send(request).await.inspect_err(|err| {
            warn!(operation = %operation, error = %err, "ots_transport_failed");
        })?;

        debug!(
            operation = %operation,
            status = response.status,
            request_id = %response.request_id(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "ots_response_received"
        );
        self.protocol.verify_response(operation.as_str(), &response)?;
        Ok(response.body)
    }

    pub async fn list_table(&self) -> Result<ListTableResponse> {
        let body = encode_body(&encoder::encode_list_table());
        let data = self.dispatch(Operation::ListTable, body).await?;
        decoder::decode_list_table(&data)
    }

    pub async fn create_table(
        &self,
        table_meta: &TableMeta,
        reserved_throughput: &ReservedThroughput,
    ) -> Result<CreateTableResponse> {
        let request = encoder::encode_create_table(
            &table_meta.table_name,
            &table_meta.primary_key,
            reserved_throughput,
        )?;
        let data = self
            .dispatch(Operation::CreateTable, encode_body(&request))
            .await?;
        decoder::decode_create_table(&data)
    }

    pub async fn delete_table(&self, table_name: &str) -> Result<DeleteTableResponse> {
        let request = encoder::encode_delete_table(table_name)?;
        let data = self
            .dispatch(Operation::DeleteTable, encode_body(&request))
            .await?;
        decoder::decode_delete_table(&data)
    }

    pub async fn describe_table(&self, table_name: &str) -> Result<DescribeTableResponse> {
        let request = encoder::encode_describe_table(table_name)?;
        let data = self
            .dispatch(Operation::DescribeTable, encode_body(&request))
            .await?;
        decoder::decode_describe_table(&data)
    }

    pub async fn update_table(
        &self,
        table_name: &str,
        reserved_throughput: &ReservedThroughput,
    ) -> Result<UpdateTableResponse> {
        let request = encoder::encode_update_table(table_name, reserved_throughput)?;
        let data = self
            .dispatch(Operation::UpdateTable, encode_body(&request))
            .await?;
        decoder::decode_update_table(&data)
    }

    /// `row` in the response is `None` when no row exists under `primary_key`.
    pub async fn get_row(
        &self,
        table_name: &str,
        primary_key: &[Column],
        columns_to_get: &[String],
    ) -> Result<GetRowResponse> {
        let request = encoder::encode_get_row(table_name, primary_key, columns_to_get)?;
        let data = self
            .dispatch(Operation::GetRow, encode_body(&request))
            .await?;
        decoder::decode_get_row(&data)
    }

    pub async fn put_row(
        &self,
        table_name: &str,
        condition: &Condition,
        primary_key: &[Column],
        attribute_columns: &[Column],
    ) -> Result<PutRowResponse> {
        let request =
            encoder::encode_put_row(table_name, condition, primary_key, attribute_columns)?;
        let data = self
            .dispatch(Operation::PutRow, encode_body(&request))
            .await?;
        decoder::decode_put_row(&data)
    }

    pub async fn update_row(
        &self,
        table_name: &str,
        condition: &Condition,
        primary_key: &[Column],
        columns_to_put: &[Column],
        columns_to_delete: &[String],
    ) -> Result<UpdateRowResponse> {
        let request = encoder::encode_update_row(
            table_name,
            condition,
            primary_key,
            columns_to_put,
            columns_to_delete,
        )?;
        let data = self
            .dispatch(Operation::UpdateRow, encode_body(&request))
            .await?;
        decoder::decode_update_row(&data)
    }

    pub async fn delete_row(
        &self,
        table_name: &str,
        condition: &Condition,
        primary_key: &[Column],
    ) -> Result<DeleteRowResponse> {
        let request = encoder::encode_delete_row(table_name, condition, primary_key)?;
        let data = self
            .dispatch(Operation::DeleteRow, encode_body(&request))
            .await?;
        decoder::decode_delete_row(&data)
    }

    /// Tables in the response follow the order of `items`; rows within a
    /// table follow the order of that table's primary keys.
    pub async fn batch_get_row<K: AsRef<str>>(
        &self,
        items: &[(K, BatchGetRowItem)],
    ) -> Result<BatchGetRowResponse>
    where
        K: Sync,
    {
        let request =
            encoder::encode_batch_get_row(items.iter().map(|(name, item)| (name.as_ref(), item)))?;
        let data = self
            .dispatch(Operation::BatchGetRow, encode_body(&request))
            .await?;
        decoder::decode_batch_get_row(&data)
    }

    pub async fn batch_write_row<K: AsRef<str>>(
        &self,
        items: &[(K, BatchWriteRowItem)],
    ) -> Result<BatchWriteRowResponse>
    where
        K: Sync,
    {
        let request = encoder::encode_batch_write_row(
            items.iter().map(|(name, item)| (name.as_ref(), item)),
        )?;
        let data = self
            .dispatch(Operation::BatchWriteRow, encode_body(&request))
            .await?;
        decoder::decode_batch_write_row(&data)
    }

    /// Reads a single page. Continue from `next_start_primary_key` when it is
    /// not empty.
    pub async fn get_range(&self, request: &GetRangeRequest) -> Result<GetRangeResponse> {
        let request = encoder::encode_get_range(request)?;
        let data = self
            .dispatch(Operation::GetRange, encode_body(&request))
            .await?;
        decoder::decode_get_range(&data)
    }
}
