//! Compilation through the public API.

use dbkit::prelude::*;
use dbkit::{Quoter, Select};

#[test]
fn documented_scenarios() {
    let db = &Dialect::Standard;

    let mut q = select(["id", "name"]);
    q.from("users").where_("id", "=", 5);
    assert_eq!(
        q.compile(db).unwrap(),
        r#"SELECT "id", "name" FROM "users" WHERE "id" = 5"#
    );

    let mut q = insert("t", ["a", "b"]);
    q.values([1, 2]).unwrap();
    assert_eq!(
        q.compile(db).unwrap(),
        r#"INSERT INTO "t" ("a", "b") VALUES (1, 2)"#
    );

    let mut q = update("t");
    q.set([("a", 1)]).where_("id", "=", 5);
    assert_eq!(
        q.compile(db).unwrap(),
        r#"UPDATE "t" SET "a" = 1 WHERE "id" = 5"#
    );
}

#[test]
fn nested_subqueries_keep_their_own_params() {
    let db = &Dialect::Standard;

    let mut active = Select::new();
    active
        .select(["user_id"])
        .from("sessions")
        .where_("expires_at", ">", ":now")
        .param(":now", "2024-01-01");

    let mut q = select(["name"]);
    q.from("users")
        .where_("id", "IN", active)
        .and_where("role", "=", ":role")
        .param(":role", "admin");

    assert_eq!(
        q.to_sql(db).unwrap(),
        r#"SELECT "name" FROM "users" WHERE "id" IN (SELECT "user_id" FROM "sessions" WHERE "expires_at" > '2024-01-01') AND "role" = 'admin'"#
    );
}

#[test]
fn expressions_in_columns_and_values() {
    let db = &Dialect::Standard;
    let mut q = select([Ident::from((expr("COUNT(*)"), "total"))]);
    q.from("orders")
        .where_("created_at", ">", expr("NOW() - INTERVAL :days").param(":days", "7 days"));
    assert_eq!(
        q.to_sql(db).unwrap(),
        r#"SELECT COUNT(*) AS "total" FROM "orders" WHERE "created_at" > NOW() - INTERVAL '7 days'"#
    );
}

#[test]
fn bindings_follow_the_cell() {
    let db = &Dialect::Standard;
    let id = Binding::new(1);
    let mut q = select(Vec::<&str>::new());
    q.from("users").where_("id", "=", ":id").bind(":id", &id);

    let first = q.to_sql(db).unwrap();
    id.set(2);
    let second = q.to_sql(db).unwrap();
    assert!(first.ends_with(r#""id" = 1"#));
    assert!(second.ends_with(r#""id" = 2"#));
}

#[test]
fn prefixed_mysql_quoting() {
    let quoter = Quoter::new(Dialect::MySql).with_prefix("wp_");
    let db: &dyn Database = &quoter;
    let mut q = delete("posts");
    q.where_("posts.author", "=", "o'neil").order_by("id", "desc").limit(1);
    assert_eq!(
        q.to_sql(db).unwrap(),
        r"DELETE FROM `wp_posts` WHERE `wp_posts`.`author` = 'o\'neil' ORDER BY `id` DESC LIMIT 1"
    );
}

#[test]
fn raw_query_kind_and_substitution() {
    let mut q = raw("SELECT * FROM users WHERE id = :id AND idx = :idx");
    q.parameters([(":id", 1), (":idx", 2)]);
    assert_eq!(q.kind(), QueryKind::Select);
    assert_eq!(
        q.compile(&Dialect::Standard).unwrap(),
        "SELECT * FROM users WHERE id = 1 AND idx = 2"
    );
}
