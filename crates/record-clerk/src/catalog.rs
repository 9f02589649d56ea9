//! The music store catalog, a read-only SQLite database.

use std::fmt::{self, Display};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use rusqlite::types::ToSql;
use rusqlite::{Connection, OpenFlags};
use tokio::task::{JoinError, spawn_blocking};

pub use rusqlite::types::Value as SqlValue;

/// The text of a query result without rows.
pub const NO_ROWS: &str = "No rows matched the query.";

/// Errors from loading or querying the catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The database rejected a statement.
    #[error("database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// The SQL script could not be read.
    #[error("failed to read the catalog: {0}")]
    Io(#[from] std::io::Error),
    /// The SQL script could not be downloaded.
    #[error("failed to fetch the catalog: {0}")]
    Fetch(#[from] reqwest::Error),
    /// A query panicked while holding the connection.
    #[error("the catalog connection is poisoned")]
    Poisoned,
    /// A query task was cancelled or panicked.
    #[error("catalog query aborted: {0}")]
    Join(#[from] JoinError),
}

/// Where the catalog is loaded from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CatalogSource {
    /// An SQL script served over HTTP(S).
    Url(String),
    /// An SQL script on disk.
    Script(PathBuf),
    /// An existing SQLite database file.
    Database(PathBuf),
}

impl CatalogSource {
    /// Interprets a location, which is either an `http(s)` URL, a `.sql`
    /// script path, or a database file path.
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://")
        {
            return CatalogSource::Url(location.to_owned());
        }
        let path = PathBuf::from(location);
        let is_script = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("sql"));
        if is_script {
            CatalogSource::Script(path)
        } else {
            CatalogSource::Database(path)
        }
    }
}

impl Display for CatalogSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogSource::Url(url) => write!(f, "{url}"),
            CatalogSource::Script(path) | CatalogSource::Database(path) => {
                write!(f, "{}", path.display())
            }
        }
    }
}

/// A handle to the catalog database.
///
/// Clones share the same connection. Queries run on the blocking thread
/// pool, one at a time.
#[derive(Clone)]
pub struct Catalog {
    conn: Arc<Mutex<Connection>>,
}

impl Catalog {
    /// Creates an in-memory catalog populated by an SQL script.
    pub fn from_sql_script(script: &str) -> Result<Self, CatalogError> {
        let conn = Connection::open_in_memory()?;
        // Some dumps start with a byte order mark.
        conn.execute_batch(script.trim_start_matches('\u{feff}'))?;
        Self::with_connection(conn)
    }

    /// Creates an in-memory catalog populated by an SQL script file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let script = fs::read_to_string(path)?;
        Self::from_sql_script(&script)
    }

    /// Downloads an SQL script and creates an in-memory catalog from it.
    pub async fn fetch(url: &str) -> Result<Self, CatalogError> {
        debug!("fetching the catalog from {url}");
        let script = reqwest::get(url)
            .await?
            .error_for_status()?
            .text()
            .await?;
        debug!("fetched {} bytes of SQL", script.len());
        spawn_blocking(move || Self::from_sql_script(&script)).await?
    }

    /// Opens an existing database file in read-only mode.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, CatalogError> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        Self::with_connection(conn)
    }

    /// Loads the catalog from any supported source.
    pub async fn load(source: &CatalogSource) -> Result<Self, CatalogError> {
        info!("loading the catalog from {source}");
        match source {
            CatalogSource::Url(url) => Self::fetch(url).await,
            CatalogSource::Script(path) => {
                let path = path.clone();
                spawn_blocking(move || Self::from_file(path)).await?
            }
            CatalogSource::Database(path) => Self::open(path),
        }
    }

    fn with_connection(conn: Connection) -> Result<Self, CatalogError> {
        conn.pragma_update(None, "query_only", true)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Runs a query with named parameters and collects all rows.
    pub async fn query<S: Into<String>>(
        &self,
        sql: S,
        params: Vec<(&'static str, SqlValue)>,
    ) -> Result<Rows, CatalogError> {
        let sql = sql.into();
        let conn = Arc::clone(&self.conn);
        spawn_blocking(move || -> Result<Rows, CatalogError> {
            let conn = conn.lock().map_err(|_| CatalogError::Poisoned)?;
            trace!("running query: {sql}");
            Ok(run_query(&conn, &sql, &params)?)
        })
        .await?
    }
}

fn run_query(
    conn: &Connection,
    sql: &str,
    params: &[(&'static str, SqlValue)],
) -> Result<Rows, rusqlite::Error> {
    let mut stmt = conn.prepare_cached(sql)?;
    let columns: Vec<String> =
        stmt.column_names().into_iter().map(str::to_owned).collect();
    let params: Vec<(&str, &dyn ToSql)> = params
        .iter()
        .map(|(name, value)| (*name, value as &dyn ToSql))
        .collect();

    let mut rows = stmt.query(params.as_slice())?;
    let mut values = vec![];
    while let Some(row) = rows.next()? {
        let row = (0..columns.len())
            .map(|idx| row.get::<_, SqlValue>(idx))
            .collect::<Result<Vec<_>, _>>()?;
        values.push(row);
    }
    Ok(Rows { columns, values })
}

/// The result of a query.
///
/// Renders as one line per row, with every value labelled by its column,
/// or as [`NO_ROWS`] if there is none.
#[derive(Clone, Debug, PartialEq)]
pub struct Rows {
    /// The column labels.
    pub columns: Vec<String>,
    /// The rows, each with one value per column.
    pub values: Vec<Vec<SqlValue>>,
}

impl Rows {
    /// Returns the number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if there are no rows.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Display for Rows {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.values.is_empty() {
            return f.write_str(NO_ROWS);
        }
        for (row_idx, row) in self.values.iter().enumerate() {
            if row_idx > 0 {
                f.write_str("\n")?;
            }
            let labelled = self.columns.iter().zip(row);
            for (idx, (column, value)) in labelled.enumerate() {
                if idx > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{column}: ")?;
                write_value(f, value)?;
            }
        }
        Ok(())
    }
}

fn write_value(f: &mut fmt::Formatter<'_>, value: &SqlValue) -> fmt::Result {
    match value {
        SqlValue::Null => f.write_str("NULL"),
        SqlValue::Integer(value) => write!(f, "{value}"),
        SqlValue::Real(value) => write!(f, "{value}"),
        SqlValue::Text(value) => f.write_str(value),
        SqlValue::Blob(value) => write!(f, "<{} bytes>", value.len()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCRIPT: &str = include_str!("../fixtures/mini_chinook.sql");

    #[tokio::test]
    async fn test_query() {
        let catalog = Catalog::from_sql_script(SCRIPT).unwrap();
        let rows = catalog
            .query(
                "SELECT Name, Composer, UnitPrice FROM Track \
                 WHERE AlbumId = :album ORDER BY TrackId",
                vec![(":album", SqlValue::Integer(185))],
            )
            .await
            .unwrap();

        assert_eq!(rows.columns, ["Name", "Composer", "UnitPrice"]);
        assert_eq!(rows.len(), 2);
        assert_eq!(
            rows.to_string(),
            "Name: Bohemian Rhapsody, Composer: Mercury, Freddie, \
             UnitPrice: 0.99\n\
             Name: Under Pressure, Composer: Queen & David Bowie, \
             UnitPrice: 0.99"
        );
    }

    #[tokio::test]
    async fn test_null_and_empty() {
        let catalog = Catalog::from_sql_script(SCRIPT).unwrap();
        let rows = catalog
            .query(
                "SELECT Composer FROM Track WHERE TrackId = :id",
                vec![(":id", SqlValue::Integer(2))],
            )
            .await
            .unwrap();
        assert_eq!(rows.to_string(), "Composer: NULL");

        let rows = catalog
            .query(
                "SELECT Name FROM Artist WHERE Name = :name",
                vec![(":name", SqlValue::Text("ABBA".to_owned()))],
            )
            .await
            .unwrap();
        assert!(rows.is_empty());
        assert_eq!(rows.columns, ["Name"]);
        assert_eq!(rows.to_string(), NO_ROWS);
    }

    #[tokio::test]
    async fn test_read_only() {
        let catalog = Catalog::from_sql_script(SCRIPT).unwrap();
        let err = catalog
            .query("DELETE FROM Artist", vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, CatalogError::Sqlite(_)));

        let err = catalog
            .query("SELECT * FROM Genre", vec![])
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no such table"));
    }

    #[tokio::test]
    async fn test_load_from_files() {
        let dir = tempfile::tempdir().unwrap();
        let script_path = dir.path().join("chinook.sql");
        fs::write(&script_path, SCRIPT).unwrap();

        let source = CatalogSource::parse(script_path.to_str().unwrap());
        assert_eq!(source, CatalogSource::Script(script_path.clone()));
        let catalog = Catalog::load(&source).await.unwrap();
        let rows = catalog
            .query("SELECT COUNT(*) AS Count FROM Artist", vec![])
            .await
            .unwrap();
        assert_eq!(rows.to_string(), "Count: 3");

        let db_path = dir.path().join("chinook.db");
        let conn = Connection::open(&db_path).unwrap();
        conn.execute_batch(SCRIPT).unwrap();
        drop(conn);

        let source = CatalogSource::parse(db_path.to_str().unwrap());
        assert_eq!(source, CatalogSource::Database(db_path));
        let catalog = Catalog::load(&source).await.unwrap();
        let rows = catalog
            .query("SELECT Title FROM Album WHERE AlbumId = 2", vec![])
            .await
            .unwrap();
        assert_eq!(rows.to_string(), "Title: Balls to the Wall");
    }

    #[test]
    fn test_parse_source() {
        assert_eq!(
            CatalogSource::parse("https://example.com/Chinook.sql"),
            CatalogSource::Url("https://example.com/Chinook.sql".to_owned())
        );
        assert_eq!(
            CatalogSource::parse("data/Chinook.SQL"),
            CatalogSource::Script(PathBuf::from("data/Chinook.SQL"))
        );
        assert_eq!(
            CatalogSource::parse("chinook.sqlite"),
            CatalogSource::Database(PathBuf::from("chinook.sqlite"))
        );
    }
}
