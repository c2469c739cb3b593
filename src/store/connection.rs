use crate::error::Result;
use log::debug;
use rusqlite::Connection;

// Embed migrations from the migrations directory
refinery::embed_migrations!("migrations");

/// Opens the SQLite file (or `:memory:`) and brings its schema up to date
pub fn init_connection(db_path: &str) -> Result<Connection> {
    let mut conn = Connection::open(db_path)?;

    let report = migrations::runner().run(&mut conn)?;
    debug!(
        "Migrations completed successfully for {} ({} applied)",
        db_path,
        report.applied_migrations().len()
    );

    Ok(conn)
}
