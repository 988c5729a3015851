#![doc = r#"
Async Tablestore (OTS) client.

Operation mapping:

| Client method | OTS API | Request body | Response body |
| --- | --- | --- | --- |
| `OtsClient::list_table` | `ListTable` | `ListTableRequest` | `ListTableResponse` |
| `OtsClient::create_table` | `CreateTable` | `CreateTableRequest` | `CreateTableResponse` |
| `OtsClient::delete_table` | `DeleteTable` | `DeleteTableRequest` | `DeleteTableResponse` |
| `OtsClient::describe_table` | `DescribeTable` | `DescribeTableRequest` | `DescribeTableResponse` |
| `OtsClient::update_table` | `UpdateTable` | `UpdateTableRequest` | `UpdateTableResponse` |
| `OtsClient::get_row` | `GetRow` | `GetRowRequest` | `GetRowResponse` |
| `OtsClient::put_row` | `PutRow` | `PutRowRequest` | `PutRowResponse` |
| `OtsClient::update_row` | `UpdateRow` | `UpdateRowRequest` | `UpdateRowResponse` |
| `OtsClient::delete_row` | `DeleteRow` | `DeleteRowRequest` | `DeleteRowResponse` |
| `OtsClient::batch_get_row` | `BatchGetRow` | `BatchGetRowRequest` | `BatchGetRowResponse` |
| `OtsClient::batch_write_row` | `BatchWriteRow` | `BatchWriteRowRequest` | `BatchWriteRowResponse` |
| `OtsClient::get_range` | `GetRange` | `GetRangeRequest` | `GetRangeResponse` |

Implementation notes:
- Every call is a single signed `POST`; there is no retry or pagination loop.
- Responses are verified (checksum, date, signature) before the body is decoded.
- `MockOts` implements `Transport` in memory and is used by the integration tests.
"#]

pub mod client;
pub mod config;
pub mod testing;
pub mod transport;

pub use client::OtsClient;
pub use config::OtsConfig;
pub use testing::{MockFault, MockOts};
pub use transport::{ReqwestTransport, Transport};
