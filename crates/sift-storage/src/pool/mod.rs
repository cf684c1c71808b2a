//! Connection pool managing the single writer and the read connections.

pub mod pragmas;
pub mod read_pool;
pub mod write_connection;

use std::path::{Path, PathBuf};

use sift_core::errors::SiftResult;

pub use read_pool::ReadPool;
pub use write_connection::WriteConnection;

/// The single write connection plus the read connection pool.
pub struct ConnectionPool {
    pub writer: WriteConnection,
    pub readers: ReadPool,
    pub db_path: Option<PathBuf>,
}

impl ConnectionPool {
    /// Open a pool for the given database file.
    pub fn open(path: &Path, read_pool_size: usize) -> SiftResult<Self> {
        let writer = WriteConnection::open(path)?;
        let readers = ReadPool::open(path, read_pool_size)?;
        Ok(Self {
            writer,
            readers,
            db_path: Some(path.to_path_buf()),
        })
    }

    /// Open an in-memory pool (for testing). The readers are isolated
    /// databases in this mode; callers must route reads through the writer.
    pub fn open_in_memory() -> SiftResult<Self> {
        let writer = WriteConnection::open_in_memory()?;
        let readers = ReadPool::open_in_memory(1)?;
        Ok(Self {
            writer,
            readers,
            db_path: None,
        })
    }
}
