use ots::metadata::{
    BatchGetRowItem, BatchWriteRowItem, Column, ColumnSchema, ColumnType, ColumnValue, Condition,
    DeleteRowItem, Direction, GetRangeRequest, PutRowItem, ReservedThroughput, TableMeta,
    UpdateRowItem, columns_from_mapping,
};
use ots::protocol::{AUTH_FAILED_CODE, Credentials, Operation, Protocol};
use ots::{Error, is_service_error};
use ots_client::{MockFault, MockOts, OtsClient, OtsConfig};

fn credentials() -> Credentials {
    Credentials::new("http://mock.ots.local", "AK", "SK", "sample")
}

fn harness() -> (MockOts, OtsClient<MockOts>) {
    let mock = MockOts::new(credentials());
    let client = OtsClient::new(Protocol::new(credentials()), mock.clone());
    (mock, client)
}

fn users_meta() -> TableMeta {
    TableMeta {
        table_name: "users".to_string(),
        primary_key: vec![
            ColumnSchema::new("gid", ColumnType::Integer),
            ColumnSchema::new("uid", ColumnType::Integer),
        ],
    }
}

fn pk(gid: i64, uid: i64) -> Vec<Column> {
    columns_from_mapping([("gid", gid), ("uid", uid)])
}

async fn create_users(client: &OtsClient<MockOts>) {
    client
        .create_table(&users_meta(), &ReservedThroughput::new(10, 10))
        .await
        .expect("create table should succeed");
}

#[tokio::test(flavor = "current_thread")]
async fn table_lifecycle_against_mock() {
    let (_, client) = harness();
    create_users(&client).await;

    let listed = client.list_table().await.expect("list table should succeed");
    assert_eq!(listed.table_names, vec!["users".to_string()]);

    let described = client
        .describe_table("users")
        .await
        .expect("describe table should succeed");
    assert_eq!(described.table_meta, users_meta());
    assert_eq!(described.reserved_throughput_details.capacity_unit.read, 10);

    let updated = client
        .update_table("users", &ReservedThroughput::new(20, 5))
        .await
        .expect("update table should succeed");
    assert_eq!(updated.reserved_throughput_details.capacity_unit.read, 20);
    assert_eq!(updated.reserved_throughput_details.capacity_unit.write, 5);

    let err = client
        .create_table(&users_meta(), &ReservedThroughput::new(10, 10))
        .await
        .expect_err("duplicate create should fail");
    assert!(err.is_service_error("OTSObjectAlreadyExist"));

    client
        .delete_table("users")
        .await
        .expect("delete table should succeed");
    let err = client
        .describe_table("users")
        .await
        .expect_err("describe of a dropped table should fail");
    assert!(is_service_error(&err, "OTSObjectNotExist"));
    assert_eq!(err.status(), Some(404));
}

#[tokio::test(flavor = "current_thread")]
async fn single_row_operations_against_mock() {
    let (_, client) = harness();
    create_users(&client).await;

    let put = client
        .put_row(
            "users",
            &Condition::expect_not_exist(),
            &pk(1, 100),
            &[Column::new("name", "alice"), Column::new("age", 30i64)],
        )
        .await
        .expect("put row should succeed");
    assert_eq!(put.consumed.capacity_unit.write, 1);

    let got = client
        .get_row("users", &pk(1, 100), &[])
        .await
        .expect("get row should succeed");
    let row = got.row.expect("row should exist");
    assert_eq!(row.attribute("name"), Some(&ColumnValue::from("alice")));
    assert_eq!(row.primary_key("uid"), Some(&ColumnValue::Integer(100)));

    let err = client
        .put_row("users", &Condition::expect_not_exist(), &pk(1, 100), &[])
        .await
        .expect_err("conditional put should fail on an existing row");
    assert!(err.is_service_error("OTSConditionCheckFail"));
    assert_eq!(err.status(), Some(403));

    client
        .update_row(
            "users",
            &Condition::expect_exist(),
            &pk(1, 100),
            &[Column::new("email", "alice@example.com")],
            &["age".to_string()],
        )
        .await
        .expect("update row should succeed");
    let row = client
        .get_row("users", &pk(1, 100), &["email".to_string(), "age".to_string()])
        .await
        .expect("get row should succeed")
        .row
        .expect("row should exist");
    assert_eq!(row.attribute("email"), Some(&ColumnValue::from("alice@example.com")));
    assert_eq!(row.attribute("age"), None);
    assert_eq!(row.attribute("name"), None);

    let projected_away = client
        .get_row("users", &pk(1, 100), &["nickname".to_string()])
        .await
        .expect("get row should succeed");
    assert!(projected_away.row.is_none());

    client
        .delete_row("users", &Condition::ignore(), &pk(1, 100))
        .await
        .expect("delete row should succeed");
    let got = client
        .get_row("users", &pk(1, 100), &[])
        .await
        .expect("get row should succeed");
    assert!(got.row.is_none());
    assert_eq!(got.consumed.capacity_unit.read, 1);
}

#[tokio::test(flavor = "current_thread")]
async fn batch_get_keeps_tables_and_keys_aligned() {
    let (_, client) = harness();
    create_users(&client).await;
    let orders = TableMeta {
        table_name: "orders".to_string(),
        primary_key: vec![ColumnSchema::new("order_id", ColumnType::String)],
    };
    client
        .create_table(&orders, &ReservedThroughput::new(1, 1))
        .await
        .expect("create orders should succeed");

    for uid in [1, 2] {
        client
            .put_row(
                "users",
                &Condition::ignore(),
                &pk(1, uid),
                &[Column::new("uid_copy", uid)],
            )
            .await
            .expect("put user should succeed");
    }
    client
        .put_row(
            "orders",
            &Condition::ignore(),
            &[Column::new("order_id", "o-1")],
            &[Column::new("total", 12.5)],
        )
        .await
        .expect("put order should succeed");

    let items = vec![
        (
            "users".to_string(),
            BatchGetRowItem {
                primary_keys: vec![pk(1, 2), pk(1, 1)],
                columns_to_get: Vec::new(),
            },
        ),
        (
            "orders".to_string(),
            BatchGetRowItem {
                primary_keys: vec![
                    vec![Column::new("order_id", "o-1")],
                    vec![Column::new("order_id", "o-404")],
                ],
                columns_to_get: Vec::new(),
            },
        ),
        (
            "missing".to_string(),
            BatchGetRowItem {
                primary_keys: vec![vec![Column::new("id", 1i64)]],
                columns_to_get: Vec::new(),
            },
        ),
    ];
    let response = client
        .batch_get_row(&items)
        .await
        .expect("batch get should succeed");

    let names: Vec<&str> = response
        .tables
        .iter()
        .map(|table| table.table_name.as_str())
        .collect();
    assert_eq!(names, ["users", "orders", "missing"]);

    let users = &response.tables[0].rows;
    assert_eq!(users.len(), 2);
    for (row, expected_uid) in users.iter().zip([2i64, 1]) {
        assert!(row.is_ok);
        let found = row.row.as_ref().expect("user row should exist");
        assert_eq!(found.primary_key("uid"), Some(&ColumnValue::Integer(expected_uid)));
    }

    let orders = &response.tables[1].rows;
    assert_eq!(
        orders[0].row.as_ref().and_then(|row| row.attribute("total")),
        Some(&ColumnValue::Double(12.5))
    );
    assert!(orders[1].is_ok);
    assert!(orders[1].row.is_none());

    let missing = &response.tables[2].rows[0];
    assert!(!missing.is_ok);
    assert_eq!(
        missing.error.as_ref().map(|err| err.code.as_str()),
        Some("OTSObjectNotExist")
    );
}

#[tokio::test(flavor = "current_thread")]
async fn batch_write_reports_per_row_status() {
    let (_, client) = harness();
    create_users(&client).await;
    client
        .put_row("users", &Condition::ignore(), &pk(1, 1), &[Column::new("v", 1i64)])
        .await
        .expect("seed put should succeed");

    let items = vec![(
        "users",
        BatchWriteRowItem {
            put_rows: vec![
                PutRowItem {
                    condition: Condition::expect_not_exist(),
                    primary_key: pk(1, 2),
                    attribute_columns: vec![Column::new("v", 2i64)],
                },
                PutRowItem {
                    condition: Condition::expect_not_exist(),
                    primary_key: pk(1, 1),
                    attribute_columns: Vec::new(),
                },
            ],
            update_rows: vec![UpdateRowItem {
                condition: Condition::expect_exist(),
                primary_key: pk(1, 1),
                columns_to_put: vec![Column::new("w", true)],
                columns_to_delete: vec!["v".to_string()],
            }],
            delete_rows: vec![DeleteRowItem {
                condition: Condition::expect_exist(),
                primary_key: pk(9, 9),
            }],
        },
    )];
    let response = client
        .batch_write_row(&items)
        .await
        .expect("batch write should succeed");

    let table = &response.tables[0];
    assert_eq!(table.table_name, "users");
    assert!(table.put_rows[0].is_ok);
    assert!(!table.put_rows[1].is_ok);
    assert_eq!(
        table.put_rows[1].error.as_ref().map(|err| err.code.as_str()),
        Some("OTSConditionCheckFail")
    );
    assert!(table.update_rows[0].is_ok);
    assert!(!table.delete_rows[0].is_ok);

    let row = client
        .get_row("users", &pk(1, 1), &[])
        .await
        .expect("get row should succeed")
        .row
        .expect("row should exist");
    assert_eq!(row.attribute("w"), Some(&ColumnValue::Boolean(true)));
    assert_eq!(row.attribute("v"), None);
}

#[tokio::test(flavor = "current_thread")]
async fn get_range_pages_forward_and_backward() {
    let (_, client) = harness();
    create_users(&client).await;
    for uid in 1..=5 {
        client
            .put_row("users", &Condition::ignore(), &pk(1, uid), &[])
            .await
            .expect("put row should succeed");
    }

    let forward = GetRangeRequest {
        table_name: "users".to_string(),
        direction: Direction::Forward,
        inclusive_start_primary_key: vec![
            Column::new("gid", 1i64),
            Column::new("uid", ColumnValue::InfMin),
        ],
        exclusive_end_primary_key: vec![
            Column::new("gid", 1i64),
            Column::new("uid", ColumnValue::InfMax),
        ],
        columns_to_get: Vec::new(),
        limit: Some(2),
    };
    let page = client.get_range(&forward).await.expect("range should succeed");
    let uids: Vec<i64> = page
        .rows
        .iter()
        .filter_map(|row| row.primary_key("uid").and_then(ColumnValue::as_i64))
        .collect();
    assert_eq!(uids, [1, 2]);
    assert_eq!(page.next_start_primary_key, pk(1, 3));

    let rest = client
        .get_range(&GetRangeRequest {
            inclusive_start_primary_key: page.next_start_primary_key.clone(),
            limit: None,
            ..forward.clone()
        })
        .await
        .expect("second page should succeed");
    assert_eq!(rest.rows.len(), 3);
    assert!(rest.next_start_primary_key.is_empty());

    let backward = client
        .get_range(&GetRangeRequest {
            direction: Direction::Backward,
            inclusive_start_primary_key: pk(1, 4),
            exclusive_end_primary_key: pk(1, 1),
            limit: None,
            ..forward
        })
        .await
        .expect("backward range should succeed");
    let uids: Vec<i64> = backward
        .rows
        .iter()
        .filter_map(|row| row.primary_key("uid").and_then(ColumnValue::as_i64))
        .collect();
    assert_eq!(uids, [4, 3, 2]);
}

#[tokio::test(flavor = "current_thread")]
async fn tampered_responses_are_rejected() {
    let (mock, client) = harness();

    mock.inject_fault(MockFault::BadSignature)
        .expect("fault should queue");
    let err = client.list_table().await.expect_err("forged signature");
    assert!(matches!(err, Error::InvalidAuthorization(_)));

    mock.inject_fault(MockFault::CorruptBody)
        .expect("fault should queue");
    let err = client.list_table().await.expect_err("corrupt body");
    assert!(matches!(err, Error::ChecksumMismatch));

    mock.inject_fault(MockFault::StaleDate)
        .expect("fault should queue");
    let err = client.list_table().await.expect_err("stale date");
    assert!(matches!(err, Error::ClockSkewExceeded { .. }));

    client
        .list_table()
        .await
        .expect("untampered response should verify");
}

#[tokio::test(flavor = "current_thread")]
async fn wrong_secret_is_reported_by_the_service() {
    let mock = MockOts::new(credentials());
    let mut wrong = credentials();
    wrong.access_key_secret = "not-the-secret".to_string();
    let client = OtsClient::new(Protocol::new(wrong), mock.clone());

    let err = client.list_table().await.expect_err("signature should be rejected");
    assert!(err.is_service_error(AUTH_FAILED_CODE));
    assert_eq!(err.status(), Some(403));
    assert!(
        mock.requests()
            .expect("request log should be readable")
            .is_empty()
    );
}

#[tokio::test(flavor = "current_thread")]
async fn invalid_input_never_reaches_the_service() {
    let (mock, client) = harness();
    let err = client
        .get_row("", &pk(1, 1), &[])
        .await
        .expect_err("empty table name should fail");
    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(err.is_client_error());

    let err = client
        .put_row("users", &Condition::ignore(), &[], &[])
        .await
        .expect_err("empty primary key should fail");
    assert!(matches!(err, Error::InvalidInput(_)));

    client.list_table().await.expect("list table should succeed");
    assert_eq!(
        mock.requests().expect("request log should be readable"),
        vec![Operation::ListTable]
    );
}

#[tokio::test(flavor = "current_thread")]
#[ignore = "live test; requires OTS_ENDPOINT, OTS_ACCESS_KEY_ID, OTS_ACCESS_KEY_SECRET and OTS_INSTANCE_NAME"]
async fn live_list_table_against_configured_instance() {
    let config = OtsConfig::from_env().expect("OTS_* variables should be set");
    let client = OtsClient::connect(&config).expect("config should be valid");
    client
        .list_table()
        .await
        .expect("list table should succeed against a live instance");
}
