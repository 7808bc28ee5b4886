use super::*;
use crate::database::{Database, Dialect, Quoter};
use crate::error::DbError;
use crate::expr::Expression;
use crate::ident::Ident;
use crate::param::Binding;
use crate::query::{Query, QueryKind, Statement};
use crate::value::Value;

const DB: &Dialect = &Dialect::Standard;

#[test]
fn test_select_columns_where() {
    let mut q = Select::new();
    q.select(["id", "name"]).from("users").where_("id", "=", 5);
    assert_eq!(
        q.compile(DB).unwrap(),
        r#"SELECT "id", "name" FROM "users" WHERE "id" = 5"#
    );
}

#[test]
fn test_select_star_when_no_columns() {
    let mut q = Select::new();
    q.from("users");
    assert_eq!(q.to_sql(DB).unwrap(), r#"SELECT * FROM "users""#);
}

#[test]
fn test_select_deduplicates_columns_and_tables() {
    let mut q = Select::new();
    q.select(["id", "id", "name"]).from("users").from("users");
    assert_eq!(q.to_sql(DB).unwrap(), r#"SELECT "id", "name" FROM "users""#);
}

#[test]
fn test_select_distinct_and_aliases() {
    let mut q = Select::new();
    q.distinct(true)
        .select([("u.name", "n")])
        .from(("users", "u"));
    assert_eq!(
        q.to_sql(DB).unwrap(),
        r#"SELECT DISTINCT "u"."name" AS "n" FROM "users" AS "u""#
    );
}

#[test]
fn test_columns_replaces_select_list() {
    let mut q = Select::new();
    q.select(["a", "b"]).columns(["c"]).from("t");
    assert_eq!(q.to_sql(DB).unwrap(), r#"SELECT "c" FROM "t""#);
}

#[test]
fn test_where_group() {
    let mut q = Select::new();
    q.from("t")
        .where_open()
        .where_("a", "=", 1)
        .or_where("b", "=", 2)
        .where_close();
    assert_eq!(
        q.to_sql(DB).unwrap(),
        r#"SELECT * FROM "t" WHERE ("a" = 1 OR "b" = 2)"#
    );
}

#[test]
fn test_where_close_empty_drops_group() {
    let mut q = Select::new();
    q.from("t")
        .where_("a", "=", 1)
        .and_where_open()
        .where_close_empty();
    assert_eq!(q.to_sql(DB).unwrap(), r#"SELECT * FROM "t" WHERE "a" = 1"#);

    let mut q = Select::new();
    q.from("t").where_open().where_close_empty();
    assert_eq!(q.to_sql(DB).unwrap(), r#"SELECT * FROM "t""#);
}

#[test]
fn test_where_in_empty_list() {
    let mut q = Select::new();
    q.from("t").where_("id", "in", Vec::<i64>::new());
    assert_eq!(
        q.to_sql(DB).unwrap(),
        r#"SELECT * FROM "t" WHERE "id" IN (NULL)"#
    );
}

#[test]
fn test_where_in_list_and_between() {
    let mut q = Select::new();
    q.from("t")
        .where_("id", "IN", vec![1, 2, 3])
        .and_where("age", "BETWEEN", (18, 65));
    assert_eq!(
        q.to_sql(DB).unwrap(),
        r#"SELECT * FROM "t" WHERE "id" IN (1, 2, 3) AND "age" BETWEEN 18 AND 65"#
    );
}

#[test]
fn test_where_pair_column() {
    let mut q = Select::new();
    q.from("t").where_(("a", "b"), "=", 1);
    assert_eq!(q.compile(DB).unwrap(), r#"SELECT * FROM "t" WHERE "a" = 1"#);

    let prefixed = Quoter::new(Dialect::Standard).with_prefix("app_");
    let mut q = Select::new();
    q.from("users").having(("users.id", "uid"), ">", 0);
    assert_eq!(
        q.compile(&prefixed).unwrap(),
        r#"SELECT * FROM "app_users" HAVING "users"."id" > 0"#
    );
}

#[test]
fn test_where_null() {
    let mut q = Select::new();
    q.from("t")
        .where_("deleted_at", "=", Value::Null)
        .and_where("email", "!=", None::<String>);
    assert_eq!(
        q.to_sql(DB).unwrap(),
        r#"SELECT * FROM "t" WHERE "deleted_at" IS NULL AND "email" IS NOT NULL"#
    );
}

#[test]
fn test_where_subquery_value() {
    let mut sub = Select::new();
    sub.select(["user_id"]).from("orders");
    let mut q = Select::new();
    q.from("users").where_("id", "IN", sub);
    assert_eq!(
        q.to_sql(DB).unwrap(),
        r#"SELECT * FROM "users" WHERE "id" IN (SELECT "user_id" FROM "orders")"#
    );
}

#[test]
fn test_join_left_on() {
    let mut q = Select::new();
    q.from("a").join("b", "LEFT").on("a.id", "=", "b.a_id").unwrap();
    assert_eq!(
        q.to_sql(DB).unwrap(),
        r#"SELECT * FROM "a" LEFT JOIN "b" ON ("a"."id" = "b"."a_id")"#
    );
}

#[test]
fn test_on_targets_last_join() {
    let mut q = Select::new();
    q.from("a")
        .join("b", None)
        .using(["id"])
        .unwrap()
        .inner_join("c")
        .on("b.c_id", "=", "c.id")
        .unwrap();
    assert_eq!(
        q.to_sql(DB).unwrap(),
        r#"SELECT * FROM "a" JOIN "b" USING ("id") INNER JOIN "c" ON ("b"."c_id" = "c"."id")"#
    );
}

#[test]
fn test_join_on_and_using_fails() {
    let mut q = Select::new();
    q.from("a").join("b", "LEFT").on("a.id", "=", "b.a_id").unwrap();
    let err = q.using(["id"]).unwrap_err();
    assert!(matches!(err, DbError::IncompatibleJoinConditions));
}

#[test]
fn test_on_without_join_fails() {
    let mut q = Select::new();
    assert!(matches!(q.on("a", "=", "b"), Err(DbError::NoJoin)));
}

#[test]
fn test_group_having_order_limit_offset() {
    let mut q = Select::new();
    q.select([Ident::from("user_id"), Ident::from((Expression::new("COUNT(*)"), "n"))])
        .from("orders")
        .where_("status", "=", "paid")
        .group_by(["user_id"])
        .having(Ident::alias("n"), ">", 2)
        .order_by("n", "desc")
        .limit(10)
        .offset(20);
    assert_eq!(
        q.to_sql(DB).unwrap(),
        r#"SELECT "user_id", COUNT(*) AS "n" FROM "orders" WHERE "status" = 'paid' GROUP BY "user_id" HAVING "n" > 2 ORDER BY "n" DESC LIMIT 10 OFFSET 20"#
    );
}

#[test]
fn test_having_groups() {
    let mut q = Select::new();
    q.from("t")
        .group_by(["a"])
        .having_open()
        .having("x", "=", 1)
        .or_having("y", "=", 2)
        .having_close()
        .and_having_open()
        .having_close_empty();
    assert_eq!(
        q.to_sql(DB).unwrap(),
        r#"SELECT * FROM "t" GROUP BY "a" HAVING ("x" = 1 OR "y" = 2)"#
    );
}

#[test]
fn test_order_by_invalid_direction() {
    let mut q = Select::new();
    q.from("t").order_by("a", "up");
    assert!(matches!(
        q.compile(DB),
        Err(DbError::InvalidSortDirection(d)) if d == "UP"
    ));
}

#[test]
fn test_order_by_direction_case_insensitive() {
    for direction in ["asc", "Asc", "DESC", "desc"] {
        let mut q = Select::new();
        q.from("t").order_by("a", direction);
        assert!(q.to_sql(DB).is_ok(), "direction {direction}");
    }
}

#[test]
fn test_union() {
    let mut other = Select::new();
    other.select(["id"]).from("b");
    let mut q = Select::new();
    q.select(["id"])
        .from("a")
        .union(other, false)
        .unwrap()
        .union("c", true)
        .unwrap();
    assert_eq!(
        q.to_sql(DB).unwrap(),
        r#"(SELECT "id" FROM "a") UNION (SELECT "id" FROM "b") UNION ALL (SELECT * FROM "c")"#
    );
}

#[test]
fn test_union_rejects_non_select_query() {
    let mut q = Select::new();
    let err = q
        .union(Query::raw("DELETE FROM t"), false)
        .unwrap_err();
    assert!(matches!(err, DbError::UnionArgumentInvalid(QueryKind::Delete)));
}

#[test]
fn test_compile_is_idempotent() {
    let mut q = Select::new();
    q.select(["a"]).from("t").where_("a", ">", 1).order_by("a", None);
    let first = q.compile(DB).unwrap();
    let second = q.compile(DB).unwrap();
    assert_eq!(first, second);
    assert_eq!(q.last_sql(), Some(first.as_str()));
}

#[test]
fn test_reset_clears_state() {
    let mut q = Select::new();
    q.select(["a"]).from("t").where_("a", "=", ":a").param(":a", 1);
    q.compile(DB).unwrap();
    q.reset();
    assert_eq!(q.last_sql(), None);
    assert!(q.params().is_empty());
    assert_eq!(q.to_sql(DB).unwrap(), "SELECT *");
}

#[test]
fn test_placeholders_are_substituted_last() {
    let mut q = Select::new();
    q.from("users")
        .where_("name", "=", ":name")
        .and_where("role", "=", ":unregistered")
        .param(":name", "O'Brien");
    assert_eq!(
        q.to_sql(DB).unwrap(),
        r#"SELECT * FROM "users" WHERE "name" = 'O''Brien' AND "role" = ':unregistered'"#
    );
}

#[test]
fn test_bound_param_read_at_compile_time() {
    let limit = Binding::new(1);
    let mut q = Select::new();
    q.from("t").where_("n", ">", ":min").bind(":min", &limit);
    limit.set(42);
    assert_eq!(
        q.to_sql(DB).unwrap(),
        r#"SELECT * FROM "t" WHERE "n" > 42"#
    );
}

#[test]
fn test_table_prefix() {
    let quoter = Quoter::new(Dialect::Standard).with_prefix("app_");
    let db: &dyn Database = &quoter;
    let mut q = Select::new();
    q.select(["users.id"])
        .from("users")
        .join("roles", "LEFT")
        .on("users.role_id", "=", "roles.id")
        .unwrap();
    assert_eq!(
        q.to_sql(db).unwrap(),
        r#"SELECT "app_users"."id" FROM "app_users" LEFT JOIN "app_roles" ON ("app_users"."role_id" = "app_roles"."id")"#
    );
}

#[test]
fn test_mysql_dialect() {
    let mut q = Select::new();
    q.from("t").where_("name", "=", "it's");
    assert_eq!(
        q.to_sql(&Dialect::MySql).unwrap(),
        r"SELECT * FROM `t` WHERE `name` = 'it\'s'"
    );
}

// ==================== INSERT ====================

#[test]
fn test_insert_values() {
    let mut q = Insert::new("t");
    q.columns(["a", "b"]).values([1, 2]).unwrap();
    assert_eq!(
        q.compile(DB).unwrap(),
        r#"INSERT INTO "t" ("a", "b") VALUES (1, 2)"#
    );
}

#[test]
fn test_insert_multiple_rows_and_placeholders() {
    let mut q = Insert::new("t");
    q.columns(["a", "b"])
        .values([Value::from(1), Value::from("x")])
        .unwrap()
        .values([Value::from(":a"), Value::Null])
        .unwrap();
    q.param(":a", 9);
    assert_eq!(
        q.to_sql(DB).unwrap(),
        r#"INSERT INTO "t" ("a", "b") VALUES (1, 'x'), (9, NULL)"#
    );
}

#[test]
fn test_insert_select() {
    let mut source = Select::new();
    source.select(["a", "b"]).from("s");
    let mut q = Insert::new("t");
    q.columns(["a", "b"]).select(source).unwrap();
    assert_eq!(
        q.to_sql(DB).unwrap(),
        r#"INSERT INTO "t" ("a", "b") SELECT "a", "b" FROM "s""#
    );
}

#[test]
fn test_insert_rejects_alias() {
    let mut q = Insert::default();
    assert!(matches!(
        q.table(("t", "x")),
        Err(DbError::TableAliasNotAllowed)
    ));
}

#[test]
fn test_insert_value_sources_are_exclusive() {
    let mut q = Insert::new("t");
    q.select(Query::raw("SELECT 1")).unwrap();
    assert!(matches!(
        q.values([1]),
        Err(DbError::IncompatibleValueSource)
    ));

    let mut q = Insert::new("t");
    q.values([1]).unwrap();
    assert!(matches!(
        q.select(Select::new()),
        Err(DbError::IncompatibleValueSource)
    ));
}

#[test]
fn test_insert_select_requires_select_query() {
    let mut q = Insert::new("t");
    let err = q.select(Query::raw("UPDATE x SET a = 1")).unwrap_err();
    assert!(matches!(err, DbError::NonSelectSubquery(QueryKind::Update)));
}

#[test]
fn test_insert_without_table_fails() {
    let mut q = Insert::new("t");
    q.values([1]).unwrap();
    q.reset();
    assert!(matches!(
        q.to_sql(DB),
        Err(DbError::MissingTable(QueryKind::Insert))
    ));
}

// ==================== UPDATE / DELETE ====================

#[test]
fn test_update_set_where() {
    let mut q = Update::new("t");
    q.set([("a", 1)]).where_("id", "=", 5);
    assert_eq!(
        q.compile(DB).unwrap(),
        r#"UPDATE "t" SET "a" = 1 WHERE "id" = 5"#
    );
}

#[test]
fn test_update_repeated_column_keeps_first_position() {
    let mut q = Update::new("t");
    q.value("a", 1).value("b", 2).value("a", 3);
    assert_eq!(q.to_sql(DB).unwrap(), r#"UPDATE "t" SET "a" = 3, "b" = 2"#);
}

#[test]
fn test_update_expression_order_limit() {
    let mut q = Update::new("counters");
    q.value("n", Expression::new("n + :step").param(":step", 1))
        .where_("id", "=", 1)
        .order_by("id", "ASC")
        .limit(1);
    assert_eq!(
        q.to_sql(DB).unwrap(),
        r#"UPDATE "counters" SET "n" = n + 1 WHERE "id" = 1 ORDER BY "id" ASC LIMIT 1"#
    );
}

#[test]
fn test_delete() {
    let mut q = Delete::new("sessions");
    q.where_("expires", "<", 100).or_where("user_id", "IS", Value::Null).limit(50);
    assert_eq!(
        q.to_sql(DB).unwrap(),
        r#"DELETE FROM "sessions" WHERE "expires" < 100 OR "user_id" IS NULL LIMIT 50"#
    );
}

#[test]
fn test_delete_without_where() {
    let q = Delete::new("t");
    assert_eq!(q.to_sql(DB).unwrap(), r#"DELETE FROM "t""#);
}
