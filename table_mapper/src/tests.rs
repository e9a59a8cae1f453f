//! Mapper behavior tests

#[cfg(test)]
mod tests {
    use crate::test_support::{row, RecordingExecutor};
    use crate::{
        ColumnSet, MapperError, MapperFilter, NoTransforms, Row, RowTransforms, TableBinding,
        TableMapper, UniformTableMapper,
    };
    use serde::{Deserialize, Serialize};
    use serde_json::{json, Value};
    use sql_builder::{BuildError, ColumnType, Placeholder, SortOrder};

    fn users_binding() -> TableBinding {
        TableBinding::builder("users")
            .columns(["id", "handle", "name", "email"])
            .key_columns(["id"])
            .build()
            .unwrap()
    }

    fn users(executor: &RecordingExecutor) -> TableMapper<NoTransforms> {
        TableMapper::new(executor.clone(), users_binding())
    }

    // ========================================
    // Select
    // ========================================

    #[tokio::test]
    async fn test_select_by_fields_returns_rows_in_order() {
        let executor = RecordingExecutor::new();
        executor.respond_rows(vec![
            json!({"id": 1, "name": "Sue", "handle": "s1"}),
            json!({"id": 2, "name": "Sue", "handle": "s2"}),
        ]);

        let rows = users(&executor)
            .select(json!({"name": "Sue"}))
            .unwrap()
            .return_all()
            .await
            .unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["handle"], json!("s1"));
        assert_eq!(rows[1]["handle"], json!("s2"));

        let statement = executor.last();
        assert_eq!(
            statement.sql(),
            "SELECT to_jsonb(r) AS row FROM (SELECT * FROM users WHERE name = $1) AS r"
        );
        assert_eq!(statement.values(), &[json!("Sue")]);
    }

    #[tokio::test]
    async fn test_select_one_without_match_is_none() {
        let executor = RecordingExecutor::new();
        let found = users(&executor)
            .select(json!(1))
            .unwrap()
            .return_one()
            .await
            .unwrap();

        assert!(found.is_none());
        assert_eq!(
            executor.last().sql(),
            "SELECT to_jsonb(r) AS row FROM (SELECT * FROM users WHERE id = $1 LIMIT 1) AS r"
        );
    }

    #[tokio::test]
    async fn test_select_modify_and_aliased_columns() {
        let executor = RecordingExecutor::new();
        let binding = TableBinding::builder("users")
            .key_columns(["id"])
            .selected_columns(vec!["id", "name as full_name"])
            .build()
            .unwrap();
        let mapper = TableMapper::new(executor.clone(), binding);

        mapper
            .select(MapperFilter::All)
            .unwrap()
            .modify(|query| query.order_by("id", SortOrder::Desc).limit(2))
            .return_one()
            .await
            .unwrap();

        assert_eq!(
            executor.last().sql(),
            "SELECT to_jsonb(r) AS row FROM (SELECT id, name AS full_name FROM users ORDER BY id DESC LIMIT 2) AS r"
        );
    }

    // ========================================
    // Insert
    // ========================================

    #[tokio::test]
    async fn test_insert_returns_key_columns_by_default() {
        let executor = RecordingExecutor::new();
        executor.respond_rows(vec![json!({"id": 1})]);

        let values = row(json!({"name": "Sue", "handle": "s1", "email": "a@b.com"}));
        let returned = users(&executor)
            .insert()
            .return_one(&values)
            .await
            .unwrap();

        assert_eq!(returned, Some(row(json!({"id": 1}))));
        let statement = executor.last();
        assert_eq!(
            statement.sql(),
            "WITH r AS (INSERT INTO users (email, handle, name) VALUES ($1, $2, $3) RETURNING id) SELECT to_jsonb(r) AS row FROM r"
        );
        assert_eq!(
            statement.values(),
            &[json!("a@b.com"), json!("s1"), json!("Sue")]
        );
    }

    #[tokio::test]
    async fn test_insert_without_return_columns_returns_nothing() {
        let executor = RecordingExecutor::new();
        let binding = TableBinding::builder("users")
            .key_columns(["id"])
            .insert_return_columns(ColumnSet::none())
            .build()
            .unwrap();
        let mapper = TableMapper::new(executor.clone(), binding);

        let values = row(json!({"name": "Sue", "handle": "s1"}));
        let returned = mapper.insert().return_one(&values).await.unwrap();
        let all = mapper.insert().return_all(&[values]).await.unwrap();

        assert!(returned.is_none());
        assert!(all.is_empty());
        for statement in executor.statements() {
            assert!(!statement.returns_rows());
            assert!(!statement.sql().contains("RETURNING"));
        }
    }

    #[tokio::test]
    async fn test_insert_many_in_order() {
        let executor = RecordingExecutor::new();
        executor.respond_rows(vec![json!({"id": 1}), json!({"id": 2})]);

        let objects = vec![
            row(json!({"name": "Sue", "handle": "s1"})),
            row(json!({"name": "Ann", "handle": "a1", "email": "a@b.com"})),
        ];
        let returned = users(&executor).insert().return_all(&objects).await.unwrap();

        assert_eq!(returned, vec![row(json!({"id": 1})), row(json!({"id": 2}))]);
        assert_eq!(
            executor.last().sql(),
            "WITH r AS (INSERT INTO users (handle, name, email) VALUES ($1, $2, DEFAULT), ($3, $4, $5) RETURNING id) SELECT to_jsonb(r) AS row FROM r"
        );
    }

    #[tokio::test]
    async fn test_insert_nothing_issues_no_statement() {
        let executor = RecordingExecutor::new();
        let mapper = users(&executor);

        assert!(mapper.insert().run(&[]).await.unwrap());
        assert!(mapper.insert().return_all(&[]).await.unwrap().is_empty());
        assert!(executor.statements().is_empty());
    }

    #[tokio::test]
    async fn test_subset_insert_requires_listed_columns() {
        let executor = RecordingExecutor::new();
        let mapper = users(&executor);

        let err = mapper
            .insert()
            .columns(["name", "email"])
            .run(&[row(json!({"name": "Sue", "handle": "s1"}))])
            .await
            .unwrap_err();

        assert!(matches!(err, MapperError::MissingColumn { ref column } if column == "email"));
        assert_eq!(err.to_string(), "column 'email' missing from values object");
        assert!(executor.statements().is_empty());
    }

    #[tokio::test]
    async fn test_subset_insert_drops_unlisted_fields() {
        let executor = RecordingExecutor::new();
        users(&executor)
            .insert()
            .columns(["name", "email"])
            .run(&[row(json!({"name": "Sue", "handle": "s1", "email": null}))])
            .await
            .unwrap();

        let statement = executor.last();
        assert_eq!(
            statement.sql(),
            "INSERT INTO users (email, name) VALUES ($1, $2)"
        );
        assert_eq!(statement.values(), &[Value::Null, json!("Sue")]);
    }

    // ========================================
    // Update and delete
    // ========================================

    #[tokio::test]
    async fn test_update_without_match() {
        let executor = RecordingExecutor::new();
        let mapper = users(&executor);
        let values = row(json!({"email": "new@b.com"}));
        let query = mapper.update(json!({"id": 1})).unwrap();

        assert!(query.return_all(&values).await.unwrap().is_empty());
        assert!(query.return_one(&values).await.unwrap().is_none());
        assert!(!query.run(&values).await.unwrap());

        let statements = executor.statements();
        assert_eq!(
            statements[0].sql(),
            "WITH r AS (UPDATE users SET email = $1 WHERE id = $2 RETURNING id) SELECT to_jsonb(r) AS row FROM r"
        );
        assert_eq!(statements[0].values(), &[json!("new@b.com"), json!(1)]);
        assert_eq!(statements[2].sql(), "UPDATE users SET email = $1 WHERE id = $2");
    }

    #[tokio::test]
    async fn test_update_count_and_modify() {
        let executor = RecordingExecutor::new();
        executor.respond_count(2);

        let count = users(&executor)
            .update(MapperFilter::binary("name", "=", json!("Sue")))
            .unwrap()
            .modify(|query| query.increment("visits", json!(1)))
            .return_count(&row(json!({"email": "x@y.z"})))
            .await
            .unwrap();

        assert_eq!(count, 2);
        assert_eq!(
            executor.last().sql(),
            "UPDATE users SET visits = visits + $1, email = $2 WHERE name = $3"
        );
    }

    #[tokio::test]
    async fn test_delete_run_and_count() {
        let executor = RecordingExecutor::new();
        executor.respond_count(1);
        executor.respond_count(0);
        let mapper = users(&executor);

        assert!(mapper.delete(json!(1)).unwrap().run().await.unwrap());
        assert_eq!(
            mapper
                .delete(json!({"handle": ["s1", "s2"]}))
                .unwrap()
                .return_count()
                .await
                .unwrap(),
            0
        );

        let statements = executor.statements();
        assert_eq!(statements[0].sql(), "DELETE FROM users WHERE id = $1");
        assert_eq!(
            statements[1].sql(),
            "DELETE FROM users WHERE handle IN ($1, $2)"
        );
    }

    #[tokio::test]
    async fn test_by_key_without_key_columns_is_rejected() {
        let executor = RecordingExecutor::new();
        let mapper = TableMapper::new(
            executor.clone(),
            TableBinding::builder("log_lines").build().unwrap(),
        );

        assert!(matches!(
            mapper.delete(json!([1])),
            Err(MapperError::Configuration(_))
        ));
        assert!(matches!(
            users(&executor).select(json!([1, 2])),
            Err(MapperError::Configuration(_))
        ));
        assert!(executor.statements().is_empty());
    }

    #[tokio::test]
    async fn test_unresolved_parameter_outside_compiled_query() {
        let executor = RecordingExecutor::new();
        let err = users(&executor)
            .select(MapperFilter::callback(|eb| eb.eq("handle", eb.param("handle"))))
            .unwrap()
            .return_all()
            .await
            .unwrap_err();

        assert!(matches!(err, MapperError::Build(_)));
        assert!(executor.statements().is_empty());
    }

    // ========================================
    // Compiling queries
    // ========================================

    #[tokio::test]
    async fn test_compiling_select_compiles_once() {
        let executor = RecordingExecutor::new();
        let query = users(&executor)
            .select(MapperFilter::callback(|eb| eb.eq("handle", eb.param("handle"))))
            .unwrap()
            .compile();

        assert!(!query.is_compiled());
        assert!(!query.builder_released());

        query.return_all(&row(json!({"handle": "s1"}))).await.unwrap();
        assert!(query.is_compiled());
        assert!(query.builder_released());

        query.return_all(&row(json!({"handle": "s2"}))).await.unwrap();
        query.return_one(&row(json!({"handle": "s3"}))).await.unwrap();

        let statements = executor.statements();
        assert_eq!(statements[0].sql(), statements[1].sql());
        assert_eq!(statements[0].values(), &[json!("s1")]);
        assert_eq!(statements[1].values(), &[json!("s2")]);
        assert!(statements[2].sql().contains("LIMIT 1"));

        let err = query.return_all(&Row::new()).await.unwrap_err();
        assert!(matches!(err, MapperError::MissingParameter { ref name } if name == "handle"));
    }

    #[tokio::test]
    async fn test_compiling_insert_with_subset() {
        let executor = RecordingExecutor::new();
        executor.respond_rows(vec![json!({"id": 1})]);
        executor.respond_rows(vec![json!({"id": 2})]);

        let query = users(&executor)
            .insert()
            .columns(["name", "handle"])
            .compile();

        let first = query
            .return_one(&row(json!({"name": "Sue", "handle": "s1", "email": "a@b.com"})))
            .await
            .unwrap();
        let second = query
            .return_one(&row(json!({"name": "Ann", "handle": "a1"})))
            .await
            .unwrap();

        assert_eq!(first, Some(row(json!({"id": 1}))));
        assert_eq!(second, Some(row(json!({"id": 2}))));

        let statements = executor.statements();
        assert_eq!(
            statements[0].sql(),
            "WITH r AS (INSERT INTO users (name, handle) VALUES ($1, $2) RETURNING id) SELECT to_jsonb(r) AS row FROM r"
        );
        assert_eq!(statements[1].sql(), statements[0].sql());
        assert_eq!(statements[1].values(), &[json!("Ann"), json!("a1")]);

        let err = query
            .run(&row(json!({"name": "Bo"})))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "column 'handle' missing from values object");
    }

    #[tokio::test]
    async fn test_compiling_insert_varies_first_object_columns() {
        let executor = RecordingExecutor::new();
        let query = users(&executor).insert().compile();

        query
            .run(&row(json!({"handle": "s1", "name": "Sue"})))
            .await
            .unwrap();
        query
            .run(&row(json!({"handle": "s2", "name": "Ann", "email": "ignored@b.com"})))
            .await
            .unwrap();

        let statements = executor.statements();
        assert_eq!(
            statements[1].sql(),
            "INSERT INTO users (handle, name) VALUES ($1, $2)"
        );
        assert_eq!(statements[1].values(), &[json!("s2"), json!("Ann")]);

        let err = query.run(&row(json!({"handle": "s3"}))).await.unwrap_err();
        assert!(matches!(err, MapperError::MissingColumn { ref column } if column == "name"));
    }

    #[tokio::test]
    async fn test_compiling_update_numbers_values_before_params() {
        let executor = RecordingExecutor::new();
        executor.respond_count(1);
        executor.respond_count(0);

        let query = users(&executor)
            .update(MapperFilter::callback(|eb| eb.eq("id", eb.param("id"))))
            .unwrap()
            .columns(["email"])
            .compile();

        let params = row(json!({"id": 1}));
        assert!(query
            .run(&params, &row(json!({"email": "new@b.com"})))
            .await
            .unwrap());
        assert!(!query
            .run(&row(json!({"id": 2})), &row(json!({"email": "other@b.com"})))
            .await
            .unwrap());

        let statements = executor.statements();
        assert_eq!(statements[0].sql(), "UPDATE users SET email = $1 WHERE id = $2");
        assert_eq!(statements[0].values(), &[json!("new@b.com"), json!(1)]);
        assert_eq!(statements[1].values(), &[json!("other@b.com"), json!(2)]);

        let none = query
            .return_one(&params, &row(json!({"email": "x@b.com"})))
            .await
            .unwrap();
        assert!(none.is_none());
    }

    #[tokio::test]
    async fn test_compiling_delete_with_named_parameter() {
        let executor = RecordingExecutor::new();
        executor.respond_count(3);

        let query = users(&executor)
            .delete(MapperFilter::binary("id", ">", Placeholder::param("min")))
            .unwrap()
            .compile();

        assert_eq!(query.return_count(&row(json!({"min": 10}))).await.unwrap(), 3);
        assert_eq!(executor.last().sql(), "DELETE FROM users WHERE id > $1");
        assert!(matches!(
            query.run(&Row::new()).await,
            Err(MapperError::MissingParameter { .. })
        ));
    }

    #[tokio::test]
    async fn test_compiled_null_in_equality_is_rejected() {
        let executor = RecordingExecutor::new();
        let query = users(&executor)
            .select(MapperFilter::callback(|eb| eb.eq("handle", eb.param("handle"))))
            .unwrap()
            .compile();

        let err = query
            .return_all(&row(json!({"handle": null})))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            MapperError::Build(BuildError::NullComparison(ref placeholder))
                if *placeholder == Placeholder::param("handle")
        ));
        assert!(executor.statements().is_empty());

        let literal = users(&executor)
            .select(json!({"email": null}))
            .unwrap()
            .return_all()
            .await;
        assert!(literal.is_ok());
        assert_eq!(
            executor.last().sql(),
            "SELECT to_jsonb(r) AS row FROM (SELECT * FROM users WHERE email IS NULL) AS r"
        );
    }

    #[tokio::test]
    async fn test_compiled_insert_binds_null_values() {
        let executor = RecordingExecutor::new();
        let query = users(&executor).insert().columns(["handle", "email"]).compile();

        query
            .run(&row(json!({"handle": "s1", "email": "a@b.com"})))
            .await
            .unwrap();
        query
            .run(&row(json!({"handle": "s2", "email": null})))
            .await
            .unwrap();

        let statements = executor.statements();
        assert_eq!(statements[0].sql(), statements[1].sql());
        assert_eq!(statements[1].values(), &[json!("s2"), Value::Null]);
    }

    // ========================================
    // Declared column types
    // ========================================

    fn accounts_binding() -> TableBinding {
        TableBinding::builder("accounts")
            .key_columns(["id"])
            .column_type("id", ColumnType::Integer)
            .column_type("owner_id", ColumnType::Uuid)
            .column_type("opened_at", ColumnType::Timestamptz)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_declared_types_cast_mapper_parameters() {
        let executor = RecordingExecutor::new();
        let accounts = TableMapper::new(executor.clone(), accounts_binding());
        let owner = "5f0c8a43-6a8b-4f3e-9a51-0d6a3c1b2e7f";

        accounts
            .insert()
            .run(&[row(json!({"owner_id": owner, "label": "main"}))])
            .await
            .unwrap();
        assert_eq!(
            executor.last().sql(),
            "INSERT INTO accounts (label, owner_id) VALUES ($1, $2::uuid)"
        );
        let typed: Vec<_> = executor
            .last()
            .typed_values()
            .map(|(value, column_type)| (value.clone(), column_type.cloned()))
            .collect();
        assert_eq!(
            typed,
            vec![(json!("main"), None), (json!(owner), Some(ColumnType::Uuid))]
        );

        accounts
            .select(json!({"opened_at": "2024-01-02T03:04:05Z", "label": "main"}))
            .unwrap()
            .return_all()
            .await
            .unwrap();
        assert_eq!(
            executor.last().sql(),
            "SELECT to_jsonb(r) AS row FROM (SELECT * FROM accounts WHERE label = $1 AND opened_at = $2::timestamptz) AS r"
        );

        accounts
            .update(json!(4))
            .unwrap()
            .run(&row(json!({"opened_at": null})))
            .await
            .unwrap();
        assert_eq!(
            executor.last().sql(),
            "UPDATE accounts SET opened_at = $1::timestamptz WHERE id = $2::int4"
        );
        assert_eq!(executor.last().values(), &[Value::Null, json!(4)]);

        accounts.delete(json!(4)).unwrap().run().await.unwrap();
        assert_eq!(executor.last().sql(), "DELETE FROM accounts WHERE id = $1::int4");
    }

    #[tokio::test]
    async fn test_undeclared_strings_stay_text() {
        let executor = RecordingExecutor::new();
        users(&executor)
            .select(json!({"handle": "5f0c8a43-6a8b-4f3e-9a51-0d6a3c1b2e7f"}))
            .unwrap()
            .return_all()
            .await
            .unwrap();

        let statement = executor.last();
        assert!(statement.sql().ends_with("WHERE handle = $1) AS r"));
        assert!(statement.typed_values().all(|(_, column_type)| column_type.is_none()));
    }

    // ========================================
    // Transforms
    // ========================================

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct User {
        id: i64,
        handle: String,
        name: String,
        email: Option<String>,
    }

    #[derive(Debug, Clone, Serialize)]
    struct NewUser {
        handle: String,
        name: String,
        email: Option<String>,
    }

    struct UserTransforms;

    impl RowTransforms for UserTransforms {
        type Selected = User;
        type Insertable = NewUser;
        type Updating = Row;
        type InsertReturn = User;
        type UpdateReturn = Row;
        type Count = i64;

        fn insert_return_transform(
            &self,
            source: &NewUser,
            returns: Row,
        ) -> Result<User, MapperError> {
            let id = returns
                .get("id")
                .and_then(Value::as_i64)
                .ok_or_else(|| MapperError::Transform("insert returned no id".to_string()))?;
            Ok(User {
                id,
                handle: source.handle.clone(),
                name: source.name.clone(),
                email: source.email.clone(),
            })
        }
    }

    #[tokio::test]
    async fn test_transforms_round_trip() {
        let executor = RecordingExecutor::new();
        executor.respond_rows(vec![json!({"id": 7})]);
        executor.respond_rows(vec![
            json!({"id": 7, "handle": "s1", "name": "Sue", "email": null}),
        ]);
        executor.respond_count(1);

        let base = users(&executor);
        let mapper = base.with_transforms(UserTransforms);
        assert!(std::ptr::eq(base.binding(), mapper.binding()));

        let inserted = mapper
            .insert()
            .return_one(&NewUser {
                handle: "s1".to_string(),
                name: "Sue".to_string(),
                email: None,
            })
            .await
            .unwrap()
            .unwrap();
        let selected = mapper
            .select(json!(inserted.id))
            .unwrap()
            .return_one()
            .await
            .unwrap();
        let count: i64 = mapper.delete(json!(7)).unwrap().return_count().await.unwrap();

        assert_eq!(selected, Some(inserted));
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_for_transaction_rebinds_executor() {
        let pool = RecordingExecutor::new();
        let tx = RecordingExecutor::new();

        let mapper = users(&pool);
        let bound = mapper.for_transaction(tx.clone());
        bound.delete(json!(1)).unwrap().run().await.unwrap();

        assert!(pool.statements().is_empty());
        assert_eq!(tx.statements().len(), 1);
    }

    // ========================================
    // Uniform mapper
    // ========================================

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Account {
        id: Option<i64>,
        handle: String,
        name: String,
    }

    fn accounts(executor: &RecordingExecutor) -> UniformTableMapper<Account> {
        let binding = TableBinding::builder("accounts")
            .key_columns(["id"])
            .build()
            .unwrap();
        UniformTableMapper::new(executor.clone(), binding, |value| {
            value
                .as_object()
                .is_some_and(|object| object.contains_key("handle") && object.contains_key("name"))
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_uniform_filter_dispatch() {
        let executor = RecordingExecutor::new();
        let mapper = accounts(&executor);

        let filter = mapper
            .filter_for(json!({"id": 5, "handle": "h", "name": "n"}))
            .unwrap();
        assert!(matches!(filter, MapperFilter::KeyTuple(ref values) if values == &vec![json!(5)]));

        let filter = mapper.filter_for(json!({"name": "n"})).unwrap();
        assert!(matches!(filter, MapperFilter::Fields(_)));
    }

    #[tokio::test]
    async fn test_uniform_insert_and_update_objects() {
        let executor = RecordingExecutor::new();
        executor.respond_rows(vec![json!({"id": 3})]);
        executor.respond_count(1);
        let mapper = accounts(&executor);

        let stored = mapper
            .insert_returning(&Account {
                id: None,
                handle: "s1".to_string(),
                name: "Sue".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(stored.id, Some(3));
        assert_eq!(stored.handle, "s1");

        let renamed = Account {
            name: "Susan".to_string(),
            ..stored
        };
        assert!(mapper.update_object(&renamed).await.unwrap());
        assert!(mapper.update_object_returning(&renamed).await.unwrap().is_none());

        let statements = executor.statements();
        assert_eq!(
            statements[0].sql(),
            "WITH r AS (INSERT INTO accounts (handle, name) VALUES ($1, $2) RETURNING id) SELECT to_jsonb(r) AS row FROM r"
        );
        assert_eq!(
            statements[1].sql(),
            "UPDATE accounts SET handle = $1, name = $2 WHERE id = $3"
        );
        assert_eq!(
            statements[1].values(),
            &[json!("s1"), json!("Susan"), json!(3)]
        );
    }

    #[tokio::test]
    async fn test_uniform_mapper_requires_key_columns() {
        let result = UniformTableMapper::<Account>::new(
            RecordingExecutor::new(),
            TableBinding::builder("accounts").build().unwrap(),
            |_| true,
        );
        assert!(matches!(result, Err(MapperError::Configuration(_))));
    }
}
