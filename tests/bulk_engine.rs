use std::sync::Arc;

use sqlbulk::drivers::{InMemoryTestDriver, InMemoryTestResponseBuilder};
use sqlbulk::{
    bulk_execute, bulk_get_count, bulk_get_rows, bulk_insert, BulkClient, BulkExecuteStatement,
    Database, SqlBulkError, SqlValue, Statement, Template, COUNT_COLUMN,
};

fn int_values(values: &[i32]) -> Vec<SqlValue> {
    values.iter().map(|&v| SqlValue::Int32(v)).collect()
}

fn in_clause_statement(fixed: &[i32], bulk: &[i32]) -> BulkExecuteStatement {
    BulkExecuteStatement {
        text: "STATEMENT ?,?,? IN (?)".to_string(),
        fixed_parameters: int_values(fixed),
        bulk_parameters: int_values(bulk),
        bulk_position: 3,
    }
}

#[tokio::test]
async fn test_execute_does_nothing_without_bulk_parameters() {
    let database = InMemoryTestDriver::new().with_max_variable_number(10);

    let statement = in_clause_statement(&[1, 2, 3], &[]);
    bulk_execute(&database, &statement).await.unwrap();

    database.assert_query_count(0);
}

#[tokio::test]
async fn test_execute_fails_without_placeholders() {
    let database = InMemoryTestDriver::new().with_max_variable_number(10);

    let statement = BulkExecuteStatement {
        text: "STATEMENT".to_string(),
        fixed_parameters: int_values(&[1, 2, 3]),
        bulk_parameters: int_values(&[4, 5, 6]),
        bulk_position: 3,
    };
    let err = bulk_execute(&database, &statement).await.unwrap_err();

    match err {
        SqlBulkError::PlaceholderMismatch { expected, actual } => {
            assert_eq!(expected, 4);
            assert_eq!(actual, 0);
        }
        _ => panic!("Expected PlaceholderMismatch error"),
    }
    database.assert_query_count(0);
}

#[tokio::test]
async fn test_execute_fails_on_placeholder_count_mismatch() {
    let database = InMemoryTestDriver::new().with_max_variable_number(10);

    let statement = BulkExecuteStatement {
        text: "STATEMENT IN (?)".to_string(),
        fixed_parameters: int_values(&[1, 2, 3]),
        bulk_parameters: int_values(&[4, 5, 6]),
        bulk_position: 3,
    };
    let err = bulk_execute(&database, &statement).await.unwrap_err();

    assert!(matches!(err, SqlBulkError::PlaceholderMismatch { .. }));
    database.assert_query_count(0);
}

#[tokio::test]
async fn test_execute_single_chunk() {
    let database = InMemoryTestDriver::new().with_max_variable_number(10);

    let statement = in_clause_statement(&[1, 2, 3], &[4, 5, 6]);
    bulk_execute(&database, &statement).await.unwrap();

    database.assert_query_count(1);
    database.assert_last_query(
        "STATEMENT ?,?,? IN (?,?,?)",
        &int_values(&[1, 2, 3, 4, 5, 6]),
    );
}

#[tokio::test]
async fn test_execute_splits_into_chunks() {
    let database = InMemoryTestDriver::new().with_max_variable_number(10);

    // 3 fixed parameters against a ceiling of 10 leaves room for 7 bulk
    // values per dispatch.
    let statement = in_clause_statement(&[1, 2, 3], &[4, 5, 6, 7, 8, 9, 10, 11, 12]);
    bulk_execute(&database, &statement).await.unwrap();

    database.assert_query_count(2);
    database.assert_query(
        0,
        "STATEMENT ?,?,? IN (?,?,?,?,?,?,?)",
        &int_values(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10]),
    );
    database.assert_query(1, "STATEMENT ?,?,? IN (?,?)", &int_values(&[1, 2, 3, 11, 12]));
}

#[tokio::test]
async fn test_execute_does_not_modify_the_input() {
    let database = InMemoryTestDriver::new().with_max_variable_number(10);

    let statement = in_clause_statement(&[1, 2, 3], &[4, 5, 6, 7, 8, 9, 10, 11, 12]);
    bulk_execute(&database, &statement).await.unwrap();

    assert_eq!(statement.fixed_parameters, int_values(&[1, 2, 3]));
    assert_eq!(
        statement.bulk_parameters,
        int_values(&[4, 5, 6, 7, 8, 9, 10, 11, 12])
    );
}

#[tokio::test]
async fn test_execute_reinterleaves_fixed_parameters_around_bulk_slot() {
    let database = InMemoryTestDriver::new().with_max_variable_number(10);

    let statement = Template::new()
        .text("UPDATE t SET a = ")
        .value(100)
        .text(" WHERE id IN (")
        .values([1, 2, 3, 4, 5, 6, 7, 8, 9, 10])
        .text(") AND b = ")
        .value(200)
        .compile()
        .unwrap()
        .bulk_execute()
        .unwrap();

    bulk_execute(&database, &statement).await.unwrap();

    // 2 fixed parameters leave room for 8 bulk values per dispatch; the
    // trailing fixed parameter stays after the chunk in each dispatch.
    database.assert_query_count(2);
    database.assert_query(
        0,
        "UPDATE t SET a = ? WHERE id IN (?,?,?,?,?,?,?,?) AND b = ?",
        &int_values(&[100, 1, 2, 3, 4, 5, 6, 7, 8, 200]),
    );
    database.assert_query(
        1,
        "UPDATE t SET a = ? WHERE id IN (?,?) AND b = ?",
        &int_values(&[100, 9, 10, 200]),
    );
}

#[tokio::test]
async fn test_execute_fails_fast_when_fixed_parameters_fill_the_ceiling() {
    let database = InMemoryTestDriver::new().with_max_variable_number(3);

    let statement = in_clause_statement(&[1, 2, 3], &[4, 5, 6]);
    let err = bulk_execute(&database, &statement).await.unwrap_err();

    match err {
        SqlBulkError::ChunkCapacity {
            max_variables,
            required,
        } => {
            assert_eq!(max_variables, 3);
            assert_eq!(required, 4);
        }
        _ => panic!("Expected ChunkCapacity error"),
    }
    database.assert_query_count(0);
}

#[tokio::test]
async fn test_get_rows_concatenates_chunk_results_in_order() {
    let database = InMemoryTestDriver::new()
        .with_max_variable_number(10)
        .with_responses([
            InMemoryTestResponseBuilder::new()
                .columns(&["id"])
                .row(&["1"])
                .row(&["2"])
                .build(),
            InMemoryTestResponseBuilder::new()
                .columns(&["id"])
                .row(&["3"])
                .build(),
        ]);

    // 13 bulk values against chunk size 7 makes two dispatches.
    let statement = in_clause_statement(
        &[1, 2, 3],
        &[4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16],
    );
    let rows = bulk_get_rows(&database, &statement).await.unwrap();

    database.assert_query_count(2);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].get("id").unwrap(), "1");
    assert_eq!(rows[1].get("id").unwrap(), "2");
    assert_eq!(rows[2].get("id").unwrap(), "3");
}

#[tokio::test]
async fn test_get_rows_propagates_chunk_failure() {
    let database = InMemoryTestDriver::new()
        .with_max_variable_number(10)
        .with_response(
            InMemoryTestResponseBuilder::new()
                .columns(&["id"])
                .row(&["1"])
                .build(),
        )
        .with_failure("constraint violation");

    let statement = in_clause_statement(
        &[1, 2, 3],
        &[4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16],
    );
    let err = bulk_get_rows(&database, &statement).await.unwrap_err();

    match err {
        SqlBulkError::Dispatch(message) => assert_eq!(message, "constraint violation"),
        _ => panic!("Expected Dispatch error"),
    }
}

#[tokio::test]
async fn test_get_count_sums_chunk_counts() {
    let database = InMemoryTestDriver::new()
        .with_max_variable_number(10)
        .with_responses([
            InMemoryTestResponseBuilder::new()
                .columns(&[COUNT_COLUMN])
                .row(&["5"])
                .build(),
            InMemoryTestResponseBuilder::new()
                .columns(&[COUNT_COLUMN])
                .row(&["2"])
                .build(),
        ]);

    let statement = in_clause_statement(
        &[1, 2, 3],
        &[4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16],
    );
    let count = bulk_get_count(&database, &statement).await.unwrap();

    database.assert_query_count(2);
    assert_eq!(count, 7);
}

#[tokio::test]
async fn test_get_count_treats_missing_rows_as_zero() {
    let database = InMemoryTestDriver::new()
        .with_max_variable_number(10)
        .with_responses([
            InMemoryTestResponseBuilder::new()
                .columns(&[COUNT_COLUMN])
                .row(&["5"])
                .build(),
            InMemoryTestResponseBuilder::new().build(),
        ]);

    let statement = in_clause_statement(
        &[1, 2, 3],
        &[4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15, 16],
    );
    let count = bulk_get_count(&database, &statement).await.unwrap();

    assert_eq!(count, 5);
}

#[derive(Clone, PartialEq, Debug)]
struct Data {
    prop_a: i32,
    prop_b: i32,
    prop_c: i32,
}

fn test_data() -> Vec<Data> {
    vec![
        Data {
            prop_a: 1,
            prop_b: 2,
            prop_c: 3,
        },
        Data {
            prop_a: 4,
            prop_b: 5,
            prop_c: 6,
        },
        Data {
            prop_a: 7,
            prop_b: 8,
            prop_c: 9,
        },
        Data {
            prop_a: 10,
            prop_b: 11,
            prop_c: 12,
        },
    ]
}

fn insert_statement(text: &str) -> sqlbulk::BulkInsertStatement<Data> {
    sqlbulk::BulkInsertStatement::new(text, |data: &Data| {
        vec![
            data.prop_a.into(),
            data.prop_b.into(),
            data.prop_c.into(),
        ]
    })
}

#[tokio::test]
async fn test_insert_does_nothing_without_rows() {
    let database = InMemoryTestDriver::new().with_max_variable_number(10);

    let statement = insert_statement("STATEMENT VALUES (?)");
    bulk_insert(&database, &[], &statement).await.unwrap();

    database.assert_query_count(0);
}

#[tokio::test]
async fn test_insert_fails_without_placeholders() {
    let database = InMemoryTestDriver::new().with_max_variable_number(10);

    let statement = insert_statement("STATEMENT VALUES");
    let err = bulk_insert(&database, &test_data(), &statement)
        .await
        .unwrap_err();

    assert!(matches!(err, SqlBulkError::PlaceholderMismatch { .. }));
    database.assert_query_count(0);
}

#[tokio::test]
async fn test_insert_fails_on_extra_placeholders() {
    let database = InMemoryTestDriver::new().with_max_variable_number(10);

    let statement = insert_statement("STATEMENT ? VALUES (?)");
    let err = bulk_insert(&database, &test_data(), &statement)
        .await
        .unwrap_err();

    assert!(matches!(err, SqlBulkError::PlaceholderMismatch { .. }));
    database.assert_query_count(0);
}

#[tokio::test]
async fn test_insert_single_row() {
    let database = InMemoryTestDriver::new().with_max_variable_number(10);

    let statement = insert_statement("STATEMENT VALUES (?)");
    bulk_insert(&database, &test_data()[..1], &statement)
        .await
        .unwrap();

    database.assert_query_count(1);
    database.assert_last_query("STATEMENT VALUES (?,?,?)", &int_values(&[1, 2, 3]));
}

#[tokio::test]
async fn test_insert_single_chunk() {
    let database = InMemoryTestDriver::new().with_max_variable_number(10);

    // Arity 3 against a ceiling of 10 fits 3 rows per dispatch.
    let statement = insert_statement("STATEMENT VALUES (?)");
    bulk_insert(&database, &test_data()[..3], &statement)
        .await
        .unwrap();

    database.assert_query_count(1);
    database.assert_last_query(
        "STATEMENT VALUES (?,?,?),(?,?,?),(?,?,?)",
        &int_values(&[1, 2, 3, 4, 5, 6, 7, 8, 9]),
    );
}

#[tokio::test]
async fn test_insert_splits_into_chunks() {
    let database = InMemoryTestDriver::new().with_max_variable_number(10);

    let statement = insert_statement("STATEMENT VALUES (?)");
    bulk_insert(&database, &test_data(), &statement).await.unwrap();

    database.assert_query_count(2);
    database.assert_query(
        0,
        "STATEMENT VALUES (?,?,?),(?,?,?),(?,?,?)",
        &int_values(&[1, 2, 3, 4, 5, 6, 7, 8, 9]),
    );
    database.assert_query(1, "STATEMENT VALUES (?,?,?)", &int_values(&[10, 11, 12]));
}

#[tokio::test]
async fn test_insert_does_not_modify_the_rows() {
    let database = InMemoryTestDriver::new().with_max_variable_number(10);

    let rows = test_data();
    let statement = insert_statement("STATEMENT VALUES (?)");
    bulk_insert(&database, &rows, &statement).await.unwrap();

    assert_eq!(rows, test_data());
}

#[tokio::test]
async fn test_insert_fails_when_arity_exceeds_the_ceiling() {
    let database = InMemoryTestDriver::new().with_max_variable_number(2);

    let statement = insert_statement("STATEMENT VALUES (?)");
    let err = bulk_insert(&database, &test_data(), &statement)
        .await
        .unwrap_err();

    assert!(matches!(err, SqlBulkError::ChunkCapacity { .. }));
    database.assert_query_count(0);
}

#[tokio::test]
async fn test_client_dispatches_compiled_template() {
    let in_memory_test_driver = Arc::new(
        InMemoryTestDriver::new()
            .with_max_variable_number(10)
            .with_response(
                InMemoryTestResponseBuilder::new()
                    .columns(&["name"])
                    .row(&["Alice"])
                    .build(),
            ),
    );
    let database: Arc<dyn Database> = Arc::clone(&in_memory_test_driver) as Arc<dyn Database>;
    let client = BulkClient::with_database(database);

    let statement = Template::new()
        .text("SELECT name FROM users WHERE tenant = ")
        .value(7)
        .text(" AND id IN (")
        .values([1, 2, 3])
        .text(")")
        .compile()
        .unwrap();

    let rows = match statement {
        Statement::BulkExecute(bulk) => client.get_rows(&bulk).await.unwrap(),
        Statement::Plain(_) => panic!("Expected the bulk execute shape"),
    };

    in_memory_test_driver.assert_last_query(
        "SELECT name FROM users WHERE tenant = ? AND id IN (?,?,?)",
        &int_values(&[7, 1, 2, 3]),
    );
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].get("name").unwrap(), "Alice");
}

#[tokio::test]
async fn test_client_inserts_through_insert_template() {
    let in_memory_test_driver =
        Arc::new(InMemoryTestDriver::new().with_max_variable_number(10));
    let database: Arc<dyn Database> = Arc::clone(&in_memory_test_driver) as Arc<dyn Database>;
    let client = BulkClient::with_database(database);

    let statement = Template::new()
        .text("INSERT INTO the_table (a, b, c) VALUES (")
        .rows(|data: &Data| {
            vec![
                data.prop_a.into(),
                data.prop_b.into(),
                data.prop_c.into(),
            ]
        })
        .text(")")
        .compile()
        .unwrap();

    client.insert(&test_data(), &statement).await.unwrap();

    in_memory_test_driver.assert_query_count(2);
    in_memory_test_driver.assert_query(
        0,
        "INSERT INTO the_table (a, b, c) VALUES (?,?,?),(?,?,?),(?,?,?)",
        &int_values(&[1, 2, 3, 4, 5, 6, 7, 8, 9]),
    );
    in_memory_test_driver.assert_query(
        1,
        "INSERT INTO the_table (a, b, c) VALUES (?,?,?)",
        &int_values(&[10, 11, 12]),
    );
}
