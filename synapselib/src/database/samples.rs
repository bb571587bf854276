use std::path::Path;

use rusqlite::Connection;

use crate::prelude::*;

use super::{pack_floats, unpack_floats};

#[derive(Debug)]
/// SQLite database for storing training samples.
pub struct Database {
    connection: Connection
}

impl Database {
    /// Open training samples database with given cache size.
    /// Negative number means sqlite pages (1024 bytes), positive - bytes.
    pub fn open(path: impl AsRef<Path>, cache_size: i64) -> anyhow::Result<Self> {
        let connection = Connection::open(path)?;

        connection.execute(&format!("PRAGMA cache_size = {cache_size};"), ())?;

        connection.execute_batch("
            CREATE TABLE IF NOT EXISTS samples (
                id      INTEGER NOT NULL,
                inputs  BLOB NOT NULL,
                desired BLOB NOT NULL,

                PRIMARY KEY (id)
            );
        ")?;

        Ok(Self {
            connection
        })
    }

    /// Insert training sample to the database.
    ///
    /// Return id of the inserted sample.
    pub fn insert(&self, sample: &TrainingSample) -> anyhow::Result<i64> {
        self.connection.prepare_cached("INSERT INTO samples (inputs, desired) VALUES (?1, ?2)")?
            .execute([
                pack_floats(&sample.inputs),
                pack_floats(&sample.desired)
            ])?;

        Ok(self.connection.last_insert_rowid())
    }

    /// Iterate over all the samples stored in the database and push
    /// them into the given callback.
    ///
    /// Return amount of read samples.
    pub fn for_each(&self, mut callback: impl FnMut(i64, TrainingSample) -> anyhow::Result<()>) -> anyhow::Result<u64> {
        let mut read = 0;

        self.connection.prepare_cached("SELECT id, inputs, desired FROM samples ORDER BY id ASC")?
            .query_map((), |row| {
                let id      = row.get::<_, i64>(0)?;
                let inputs  = row.get::<_, Vec<u8>>(1)?;
                let desired = row.get::<_, Vec<u8>>(2)?;

                Ok((id, inputs, desired))
            })?
            .map(|row| -> anyhow::Result<_> {
                let (id, inputs, desired) = row?;

                Ok((id, unpack_floats(&inputs)?, unpack_floats(&desired)?))
            })
            .try_for_each(|row| {
                let (id, inputs, desired) = row?;

                read += 1;

                callback(id, TrainingSample::new(inputs, desired))
            })
            .map(|_| read)
    }
}

#[test]
fn test_samples_database() -> anyhow::Result<()> {
    let _ = std::fs::remove_file("samples_database.db");

    let db = Database::open("samples_database.db", 4096)?;

    db.insert(&TrainingSample::new(vec![0.0, 0.0], vec![0.0]))?;
    db.insert(&TrainingSample::new(vec![0.0, 1.0], vec![1.0]))?;
    db.insert(&TrainingSample::new(vec![1.0, 0.0], vec![1.0]))?;

    let read = db.for_each(|id, sample| {
        assert_eq!(sample.inputs.len(), 2);
        assert_eq!(sample.desired[0], if id == 1 { 0.0 } else { 1.0 });

        Ok(())
    })?;

    assert_eq!(read, 3);

    let _ = std::fs::remove_file("samples_database.db");

    Ok(())
}
