//! MariaDB bootstrap SQL
//!
//! The bootstrap script is assembled from quoted parts rather than
//! interpolated raw, so database, user, and password values can never
//! break out of their syntactic position. Every statement uses
//! IF NOT EXISTS (or is naturally idempotent) - the script is safe to
//! run on every provisioning pass.

use devforge_core::types::MariadbConfig;

/// Builder for the idempotent database/user bootstrap script
pub struct MariadbBootstrap {
    database: String,
    user: String,
    password: String,
}

impl MariadbBootstrap {
    pub fn new(config: &MariadbConfig) -> Self {
        Self {
            database: config.database.clone(),
            user: config.user.clone(),
            password: config.password.clone(),
        }
    }

    /// Render the full bootstrap script
    pub fn render(&self) -> String {
        let db = quote_identifier(&self.database);
        let user = quote_literal(&self.user);
        let password = quote_literal(&self.password);
        let host = quote_literal("localhost");

        let mut sql = String::new();
        sql.push_str(&format!(
            "CREATE DATABASE IF NOT EXISTS {} CHARACTER SET utf8mb4 COLLATE utf8mb4_unicode_ci;\n",
            db
        ));
        sql.push_str(&format!(
            "CREATE USER IF NOT EXISTS {}@{} IDENTIFIED BY {};\n",
            user, host, password
        ));
        // CREATE USER IF NOT EXISTS leaves an existing password alone;
        // ALTER USER keeps it converged with the configuration.
        sql.push_str(&format!(
            "ALTER USER {}@{} IDENTIFIED BY {};\n",
            user, host, password
        ));
        sql.push_str(&format!(
            "GRANT ALL PRIVILEGES ON {}.* TO {}@{};\n",
            db, user, host
        ));
        sql.push_str("FLUSH PRIVILEGES;\n");
        sql
    }
}

/// Backtick-quote an identifier, doubling embedded backticks
fn quote_identifier(s: &str) -> String {
    format!("`{}`", s.replace('`', "``"))
}

/// Single-quote a string literal, escaping backslashes and quotes
fn quote_literal(s: &str) -> String {
    format!("'{}'", s.replace('\\', "\\\\").replace('\'', "\\'"))
}
