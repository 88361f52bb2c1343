use rusqlite::Connection;

/// Opens a live destination connection from a descriptor.
///
/// Driver selection and descriptor normalization belong to the implementor.
pub trait Connector {
    fn connect(&self, descriptor: &str) -> rusqlite::Result<Connection>;
}

impl<F> Connector for F
where
    F: Fn(&str) -> rusqlite::Result<Connection>,
{
    fn connect(&self, descriptor: &str) -> rusqlite::Result<Connection> {
        self(descriptor)
    }
}

/// SQLite connector: the descriptor is a database file path or `:memory:`.
/// Foreign key enforcement is switched on for every connection.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteConnector;

impl Connector for SqliteConnector {
    fn connect(&self, descriptor: &str) -> rusqlite::Result<Connection> {
        let conn = if descriptor == ":memory:" {
            Connection::open_in_memory()?
        } else {
            Connection::open(descriptor)?
        };
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(conn)
    }
}
