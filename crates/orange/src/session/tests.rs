//! Rendering tests. SQL is compared with `$n` placeholders: argument values travel in
//! `params`, never inside the statement text.

use super::*;
use crate::Record;
use crate::schema::Field;
use crate::value::Kind;
use std::sync::Mutex;

#[derive(Record, Debug, Default, Clone, PartialEq)]
struct Golangster {
    id: i64,
    name: String,
}

#[derive(Record, Debug, Default, Clone, PartialEq)]
struct BlogPost {
    #[orange(sql = "post_id")]
    id: i32,
    #[orange(sql = "heading,notnull")]
    title: String,
    published: bool,
    #[orange(skip)]
    cache: Vec<u8>,
}

#[derive(Record, Default)]
struct TwoKeys {
    id: i64,
    #[orange(sql = "ID")]
    other: i64,
}

fn session() -> Session {
    let db = Session::new(Config::new()).unwrap();
    db.register::<Golangster>().unwrap();
    db
}

#[test]
fn unknown_dialect() {
    let err = Session::new(Config::new().dialect("oracle")).unwrap_err();
    assert!(matches!(err, OrmError::UnsupportedDialect(_)));
}

#[test]
fn register_mangles_names() {
    let db = session();
    let table = db.register::<BlogPost>().unwrap();
    assert_eq!(table.name, "blog_post");
    assert_eq!(table.columns(), vec!["post_id", "heading", "published"]);
    assert_eq!(db.table::<Golangster>().unwrap().name, "golangster");
    assert_eq!(db.registry().len(), 2);
}

#[test]
fn select_registered_table() {
    let q = session().select::<Golangster>().build_query().unwrap();
    assert_eq!(q.sql, "SELECT * FROM golangster;");
    assert!(q.params.is_empty());
}

#[test]
fn select_unregistered_table() {
    let err = session().select::<BlogPost>().build_query().unwrap_err();
    assert!(err.is_unregistered());
}

#[test]
fn where_record_trails_select() {
    let q = session()
        .filter(&Golangster {
            name: "x".into(),
            ..Default::default()
        })
        .select::<Golangster>()
        .build_query()
        .unwrap();
    assert_eq!(q.sql, "SELECT * FROM golangster WHERE name = $1;");
    assert_eq!(q.params, vec![Value::Text("x".into())]);
}

#[test]
fn where_record_joins_with_and() {
    let q = session()
        .select::<Golangster>()
        .filter(&Golangster {
            id: 2,
            name: "gernest".into(),
        })
        .build_query()
        .unwrap();
    assert_eq!(q.sql, "SELECT * FROM golangster WHERE id = $1 AND name = $2;");
    assert_eq!(q.params, vec![Value::BigInt(2), Value::Text("gernest".into())]);
}

#[test]
fn where_zero_record_adds_nothing() {
    let q = session()
        .select::<Golangster>()
        .filter(&Golangster::default())
        .build_query()
        .unwrap();
    assert_eq!(q.sql, "SELECT * FROM golangster;");
}

#[test]
fn where_record_of_unregistered_type_uses_loader() {
    let q = session()
        .filter(&BlogPost {
            title: "hello".into(),
            ..Default::default()
        })
        .build_query()
        .unwrap();
    assert_eq!(q.sql, "WHERE heading = $1;");
}

#[test]
fn count_rewrites_select() {
    let q = session().select::<Golangster>().count("*").build_query().unwrap();
    assert_eq!(q.sql, "SELECT COUNT(*) FROM golangster;");

    let q = session().count("id").select::<Golangster>().build_query().unwrap();
    assert_eq!(q.sql, "SELECT COUNT(id) FROM golangster;");
}

#[test]
fn count_without_select() {
    let q = session().count("*").build_query().unwrap();
    assert_eq!(q.sql, "SELECT COUNT(*);");
}

#[test]
fn count_drops_column_list_arguments() {
    let q = session()
        .select_sql("coalesce(name, ?) FROM golangster", [Value::from("none")])
        .filter_sql("id > ?", [Value::from(10i64)])
        .count("*")
        .build_query()
        .unwrap();
    assert_eq!(q.sql, "SELECT COUNT(*) FROM golangster WHERE id > $1;");
    assert_eq!(q.params, vec![Value::BigInt(10)]);
}

#[test]
fn count_ignores_from_inside_identifiers() {
    let q = session()
        .select_sql("date_from FROM golangster", [])
        .count("*")
        .build_query()
        .unwrap();
    assert_eq!(q.sql, "SELECT COUNT(*) FROM golangster;");

    let q = session()
        .select_sql("fromage, name from golangster", [])
        .count("*")
        .build_query()
        .unwrap();
    assert_eq!(q.sql, "SELECT COUNT(*) from golangster;");
}

#[test]
fn quoted_question_mark_is_not_a_marker() {
    let q = session()
        .select::<Golangster>()
        .filter_sql("name = '?' OR name = ?", [Value::from("x")])
        .build_query()
        .unwrap();
    assert_eq!(
        q.sql,
        "SELECT * FROM golangster WHERE name = '?' OR name = $1;"
    );
    assert_eq!(q.params, vec![Value::Text("x".into())]);

    let q = session()
        .select::<Golangster>()
        .filter_sql("name = '?'", [])
        .build_query()
        .unwrap();
    assert!(q.params.is_empty());
}

#[test]
fn fixed_clause_order() {
    let q = session()
        .limit(10)
        .offset(20)
        .filter_sql("name = ?", [Value::from("x")])
        .select::<Golangster>()
        .build_query()
        .unwrap();
    assert_eq!(
        q.sql,
        "SELECT * FROM golangster WHERE name = $1 OFFSET 20 LIMIT 10;"
    );
}

#[test]
fn placeholders_number_across_clauses() {
    let q = session()
        .select_sql("name, ? AS tag FROM golangster", [Value::from("t")])
        .filter_sql("id = ? OR name = ?", [Value::from(1i64), Value::from("x")])
        .build_query()
        .unwrap();
    assert_eq!(
        q.sql,
        "SELECT name, $1 AS tag FROM golangster WHERE id = $2 OR name = $3;"
    );
    assert_eq!(q.params.len(), 3);
}

#[test]
fn marker_argument_mismatch() {
    let err = session()
        .select::<Golangster>()
        .filter_sql("id = ? AND name = ?", [Value::from(1i64)])
        .build_query()
        .unwrap_err();
    assert!(matches!(err, OrmError::Validation(_)));
}

#[test]
fn repeated_clause_replaces() {
    let q = session()
        .select::<Golangster>()
        .limit(1)
        .limit(5)
        .filter_sql("id = 1", [])
        .filter_sql("id = 2", [])
        .build_query()
        .unwrap();
    assert_eq!(q.sql, "SELECT * FROM golangster WHERE id = 2 LIMIT 5;");
}

#[test]
fn chains_do_not_leak_between_branches() {
    let base = session().select::<Golangster>();
    let limited = base.limit(3);
    let counted = base.count("*");

    assert_eq!(base.build_query().unwrap().sql, "SELECT * FROM golangster;");
    assert_eq!(
        limited.build_query().unwrap().sql,
        "SELECT * FROM golangster LIMIT 3;"
    );
    assert_eq!(
        counted.build_query().unwrap().sql,
        "SELECT COUNT(*) FROM golangster;"
    );
    assert!(base.fresh().clauses().is_empty());
}

#[test]
fn registration_is_shared_across_branches() {
    let db = session();
    let branch = db.limit(1);
    db.register::<BlogPost>().unwrap();
    let q = branch.select::<BlogPost>().build_query().unwrap();
    assert_eq!(q.sql, "SELECT * FROM blog_post LIMIT 1;");
}

#[test]
fn custom_loader_is_used() {
    let loader: crate::schema::LoadFn = Arc::new(|info: &RecordInfo| {
        let fields = info
            .fields
            .iter()
            .map(|d| Field::new(d.name, d.kind).with_column_name(d.name.to_uppercase()))
            .collect();
        Ok(Table::new(format!("tbl_{}", info.type_name.to_lowercase()), fields))
    });
    let db = Session::new(Config::new().load_fn(loader)).unwrap();
    db.register::<Golangster>().unwrap();

    let q = db
        .select::<Golangster>()
        .filter(&Golangster {
            id: 1,
            ..Default::default()
        })
        .build_query()
        .unwrap();
    assert_eq!(q.sql, "SELECT * FROM tbl_golangster WHERE ID = $1;");
}

#[test]
fn create_statement() {
    let q = session()
        .create_query(&Golangster {
            id: 2,
            name: "gernest".into(),
        })
        .unwrap();
    assert_eq!(q.sql, "INSERT INTO golangster (id, name) VALUES ($1, $2);");
    assert_eq!(q.params, vec![Value::BigInt(2), Value::Text("gernest".into())]);
}

#[test]
fn create_skips_zero_fields() {
    let q = session()
        .create_query(&Golangster {
            name: "gernest".into(),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(q.sql, "INSERT INTO golangster (name) VALUES ($1);");

    let q = session().create_query(&Golangster::default()).unwrap();
    assert_eq!(q.sql, "INSERT INTO golangster DEFAULT VALUES;");
}

#[test]
fn update_statement_keys_on_id() {
    let q = session()
        .update_query(&Golangster {
            id: 2,
            name: "x".into(),
        })
        .unwrap();
    assert_eq!(q.sql, "UPDATE golangster SET name = $1 WHERE id = $2;");
    assert_eq!(q.params, vec![Value::Text("x".into()), Value::BigInt(2)]);
}

#[test]
fn update_needs_an_id_like_column() {
    // `post_id` is an ordinary column, so nothing identifies the row.
    let err = session()
        .update_query(&BlogPost {
            id: 4,
            title: "t".into(),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, OrmError::Validation(_)));
}

#[test]
fn update_errors() {
    let db = session();
    let err = db
        .update_query(&Golangster {
            name: "x".into(),
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, OrmError::Validation(_)));

    let err = db
        .update_query(&Golangster {
            id: 1,
            ..Default::default()
        })
        .unwrap_err();
    assert!(matches!(err, OrmError::Validation(_)));
}

#[test]
fn update_with_two_id_columns() {
    // `id` and `ID` are both id-like.
    let err = session().update_query(&TwoKeys { id: 1, other: 2 }).unwrap_err();
    assert!(matches!(err, OrmError::InvalidModel(_)));
}

#[test]
fn update_with_two_id_columns_from_custom_loader() {
    let loader: crate::schema::LoadFn = Arc::new(|_: &RecordInfo| {
        Ok(Table::new(
            "golangster",
            vec![
                Field::new("id", Kind::BigInt),
                Field::new("name", Kind::Text).with_column_name("Id"),
            ],
        ))
    });
    let db = Session::new(Config::new().load_fn(loader)).unwrap();
    let err = db
        .update_query(&Golangster {
            id: 1,
            name: "x".into(),
        })
        .unwrap_err();
    assert!(matches!(err, OrmError::InvalidModel(_)));
}

#[test]
fn ignored_fields_stay_out_of_writes() {
    let q = session()
        .create_query(&BlogPost {
            title: "t".into(),
            cache: vec![9],
            ..Default::default()
        })
        .unwrap();
    assert_eq!(q.sql, "INSERT INTO blog_post (heading) VALUES ($1);");
}

#[tokio::test]
async fn drop_unregistered_table_executes_nothing() {
    struct NoClient;

    impl GenericClient for NoClient {
        async fn query(&self, _: &str, _: &[&(dyn ToSql + Sync)]) -> OrmResult<Vec<Row>> {
            panic!("no statement expected");
        }

        async fn execute(&self, _: &str, _: &[&(dyn ToSql + Sync)]) -> OrmResult<u64> {
            panic!("no statement expected");
        }
    }

    let err = session().drop_table::<BlogPost>(&NoClient).await.unwrap_err();
    assert!(err.is_unregistered());

    let err = session()
        .update(&NoClient, &Golangster::default())
        .await
        .unwrap_err();
    assert!(matches!(err, OrmError::Validation(_)));
}

/// Records every statement; `execute` fails once `fail_at` statements have run.
#[derive(Default)]
struct RecordingClient {
    statements: Mutex<Vec<String>>,
    fail_at: Option<usize>,
}

impl RecordingClient {
    fn failing_at(n: usize) -> Self {
        Self {
            fail_at: Some(n),
            ..Default::default()
        }
    }

    fn statements(&self) -> Vec<String> {
        self.statements.lock().unwrap().clone()
    }
}

impl GenericClient for RecordingClient {
    async fn query(&self, sql: &str, _: &[&(dyn ToSql + Sync)]) -> OrmResult<Vec<Row>> {
        self.statements.lock().unwrap().push(sql.to_string());
        Ok(Vec::new())
    }

    async fn execute(&self, sql: &str, _: &[&(dyn ToSql + Sync)]) -> OrmResult<u64> {
        let mut statements = self.statements.lock().unwrap();
        let failing = self.fail_at == Some(statements.len());
        statements.push(sql.to_string());
        if failing {
            return Err(OrmError::Connection("connection reset".to_string()));
        }
        Ok(0)
    }
}

#[tokio::test]
async fn automigrate_creates_tables_in_order() {
    let db = session();
    db.register::<BlogPost>().unwrap();
    let client = RecordingClient::default();

    db.automigrate(&client).await.unwrap();
    assert_eq!(
        client.statements(),
        vec![
            "CREATE TABLE IF NOT EXISTS blog_post (post_id integer,heading text,published boolean);",
            "CREATE TABLE IF NOT EXISTS golangster (id bigserial,name text);",
        ]
    );
}

#[tokio::test]
async fn automigrate_stops_at_first_failure() {
    let db = session();
    db.register::<BlogPost>().unwrap();
    let client = RecordingClient::failing_at(0);

    let err = db.automigrate(&client).await.unwrap_err();
    assert!(matches!(err, OrmError::Connection(_)));
    assert_eq!(client.statements().len(), 1);
    assert!(client.statements()[0].contains("blog_post"));
}

#[tokio::test]
async fn automigrate_unsupported_type_executes_nothing() {
    let db = session();
    db.registry().register(
        "Attachment",
        Table::new(
            "attachment",
            vec![
                Field::new("id", Kind::BigInt),
                Field::new("blob", Kind::Unsupported),
            ],
        ),
    );
    let client = RecordingClient::default();

    let err = db.automigrate(&client).await.unwrap_err();
    assert!(matches!(err, OrmError::UnsupportedType { field, .. } if field == "blob"));
    assert!(client.statements().is_empty());
}

#[tokio::test]
async fn bind_into_record_missing_a_table_field() {
    let loader: crate::schema::LoadFn = Arc::new(|_: &RecordInfo| {
        Ok(Table::new(
            "golangster",
            vec![
                Field::new("id", Kind::BigInt),
                Field::new("name", Kind::Text),
                Field::new("nickname", Kind::Text),
            ],
        ))
    });
    let db = Session::new(Config::new().load_fn(loader)).unwrap();
    db.register::<Golangster>().unwrap();
    let client = RecordingClient::default();

    let mut dest = Golangster {
        id: 9,
        name: "kept".into(),
    };
    let err = db
        .select::<Golangster>()
        .bind(&client, &mut dest)
        .await
        .unwrap_err();
    assert!(matches!(err, OrmError::InvalidTarget(ref msg) if msg.contains("nickname")));
    assert!(client.statements().is_empty());
    assert_eq!(dest.name, "kept");

    let table = db.table::<Golangster>().unwrap();
    assert!(check_target::<Golangster>(&table).is_err());
    assert!(check_target::<Golangster>(&load_table(&Golangster::info()).unwrap()).is_ok());
}

#[tokio::test]
async fn bind_with_no_rows_is_scan_error() {
    let client = RecordingClient::default();
    let mut dest = Golangster::default();
    let err = session()
        .find(&client, &mut dest)
        .await
        .unwrap_err();
    assert!(err.is_scan());
    assert_eq!(client.statements(), vec!["SELECT * FROM golangster;"]);
}
