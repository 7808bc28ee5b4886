//! Query builder tour (no database required).
//!
//! Run with: cargo run --example query_builder -p dbkit

use dbkit::prelude::*;
use dbkit::{Quoter, Select};

fn main() -> DbResult<()> {
    let db = &Dialect::Standard;

    // SELECT with nested conditions, grouping and paging
    let mut q = select(["u.id", "u.name"]);
    q.column((expr("COUNT(o.id)"), "orders"))
        .from(("users", "u"))
        .left_join(("orders", "o"))
        .on("o.user_id", "=", "u.id")?
        .where_("u.deleted_at", "=", Value::Null)
        .and_where_open()
        .where_("u.role", "=", "admin")
        .or_where("u.id", "IN", vec![1, 2, 3])
        .where_close()
        .group_by(["u.id", "u.name"])
        .having(Ident::alias("orders"), ">", 0)
        .order_by("u.name", "ASC")
        .limit(20)
        .offset(40);
    println!("{}\n", q.compile(db)?);

    // UNION
    let mut archived = Select::new();
    archived.select(["id", "name"]).from("archived_users");
    let mut q = select(["id", "name"]);
    q.from("users").union(archived, true)?;
    println!("{}\n", q.compile(db)?);

    // INSERT ... VALUES and INSERT ... SELECT
    let mut q = insert("users", ["name", "email", "active"]);
    q.values([Value::from("ann"), Value::from("ann@example.com"), Value::from(true)])?
        .values([Value::from("bob"), Value::Null, Value::from(false)])?;
    println!("{}\n", q.compile(db)?);

    let mut source = Select::new();
    source
        .select(["name", "email"])
        .from("signups")
        .where_("confirmed", "=", true);
    let mut q = insert("users", ["name", "email"]);
    q.select(source)?;
    println!("{}\n", q.compile(db)?);

    // UPDATE with an expression and a placeholder
    let mut q = update("users");
    q.value("login_count", expr("login_count + 1"))
        .value("seen_at", ":now")
        .where_("id", "=", 1)
        .param(":now", expr("NOW()"));
    println!("{}\n", q.compile(db)?);

    // DELETE against MySQL quoting with a table prefix
    let mysql = Quoter::new(Dialect::MySql).with_prefix("app_");
    let mut q = delete("sessions");
    q.where_("sessions.expires_at", "<", expr("NOW()")).limit(100);
    println!("{}\n", q.compile(&mysql)?);

    // Bound parameters are read at compile time
    let min_id = Binding::new(10);
    let mut q = select(["id"]);
    q.from("users").where_("id", ">=", ":min").bind(":min", &min_id);
    println!("{}", q.compile(db)?);
    min_id.set(500);
    println!("{}", q.compile(db)?);

    // Errors surface where the mistake is made
    let mut q = select(Vec::<&str>::new());
    q.from("a").join("b", None).using(["id"])?;
    if let Err(e) = q.on("a.id", "=", "b.id") {
        println!("\nrejected: {e}");
    }

    Ok(())
}
