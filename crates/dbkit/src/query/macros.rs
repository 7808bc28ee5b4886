/// Generate the parameter, result-shape, caching and compile methods shared by
/// every statement type.
///
/// The implementing struct must have the fields `params: Params`,
/// `options: ExecOptions` and `last_sql: Option<String>`, and implement
/// [`Statement`](crate::query::Statement).
///
/// Usage:
/// ```ignore
/// impl Select {
///     impl_query_methods!();
/// }
/// ```
macro_rules! impl_query_methods {
    () => {
        /// Set the value of a named placeholder (e.g. `":id"`).
        pub fn param(
            &mut self,
            key: impl Into<String>,
            value: impl Into<$crate::value::Value>,
        ) -> &mut Self {
            self.params.set(key, value);
            self
        }

        /// Bind a named placeholder to a shared cell, read at compile time.
        pub fn bind(&mut self, key: impl Into<String>, binding: &$crate::param::Binding) -> &mut Self {
            self.params.bind(key, binding);
            self
        }

        /// Set multiple placeholder values.
        pub fn parameters<K, V>(&mut self, params: impl IntoIterator<Item = (K, V)>) -> &mut Self
        where
            K: Into<String>,
            V: Into<$crate::value::Value>,
        {
            for (key, value) in params {
                self.params.set(key, value);
            }
            self
        }

        /// Cache SELECT results for `lifetime` (requires a connection with a result cache).
        pub fn cached(&mut self, lifetime: std::time::Duration) -> &mut Self {
            self.options.lifetime = Some(lifetime);
            self
        }

        /// Bypass cached results (fresh results are still stored).
        pub fn force_execute(&mut self, force: bool) -> &mut Self {
            self.options.force_execute = force;
            self
        }

        /// Return rows as column/value maps.
        pub fn as_assoc(&mut self) -> &mut Self {
            self.options.shape = $crate::query::ResultShape::Assoc;
            self
        }

        /// Return rows intended for typed mapping (see [`ResultSet::rows_as`](crate::ResultSet::rows_as)).
        pub fn as_object(&mut self) -> &mut Self {
            self.options.shape = $crate::query::ResultShape::Object;
            self
        }

        /// Compile to SQL, remembering the result as [`last_sql`](Self::last_sql).
        pub fn compile(
            &mut self,
            db: &dyn $crate::database::Database,
        ) -> $crate::error::DbResult<String> {
            let sql = <Self as $crate::query::Statement>::to_sql(self, db)?;
            self.last_sql = Some(sql.clone());
            Ok(sql)
        }

        /// The SQL produced by the most recent [`compile`](Self::compile).
        pub fn last_sql(&self) -> Option<&str> {
            self.last_sql.as_deref()
        }
    };
}

pub(crate) use impl_query_methods;
