use std::path::Path;

use rusqlite::Connection;

use crate::prelude::*;

use super::{pack_floats, unpack_floats};

#[derive(Debug)]
/// SQLite database for storing networks under unique names.
///
/// Live weights and biases are persisted; staged updates and
/// memoization state are sweep-local and never stored.
pub struct Database {
    connection: Connection
}

impl Database {
    /// Open networks database with given cache size.
    /// Negative number means sqlite pages (1024 bytes), positive - bytes.
    pub fn open(path: impl AsRef<Path>, cache_size: i64) -> anyhow::Result<Self> {
        let connection = Connection::open(path)?;

        connection.execute(&format!("PRAGMA cache_size = {cache_size};"), ())?;

        connection.execute_batch("
            CREATE TABLE IF NOT EXISTS networks (
                id   INTEGER NOT NULL,
                name TEXT UNIQUE NOT NULL,

                PRIMARY KEY (id)
            );

            CREATE INDEX IF NOT EXISTS idx_networks_name ON networks (name);

            CREATE TABLE IF NOT EXISTS layers (
                network_id INTEGER NOT NULL,
                layer      INTEGER NOT NULL,
                size       INTEGER NOT NULL,

                PRIMARY KEY (network_id, layer),
                FOREIGN KEY (network_id) REFERENCES networks (id)
            );

            CREATE TABLE IF NOT EXISTS neurons (
                network_id INTEGER NOT NULL,
                layer      INTEGER NOT NULL,
                position   INTEGER NOT NULL,
                bias       REAL NOT NULL,
                weights    BLOB NOT NULL,

                PRIMARY KEY (network_id, layer, position),
                FOREIGN KEY (network_id) REFERENCES networks (id)
            );
        ")?;

        Ok(Self {
            connection
        })
    }

    /// Query id of the network stored under the given name.
    ///
    /// Guaranteed to return `Ok(None)` if no network is stored.
    pub fn query_network(&self, name: impl AsRef<str>) -> anyhow::Result<Option<i64>> {
        let id = self.connection.prepare_cached("SELECT id FROM networks WHERE name = ?1")?
            .query_row([name.as_ref()], |row| row.get::<_, i64>(0));

        match id {
            Ok(id) => Ok(Some(id)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(err) => anyhow::bail!(err)
        }
    }

    /// Save the network under the given name, replacing the previously
    /// stored network if there was one.
    ///
    /// Return id of the stored network.
    pub fn save_network(&self, name: impl AsRef<str>, network: &Network) -> anyhow::Result<i64> {
        let id = match self.query_network(name.as_ref())? {
            Some(id) => {
                self.connection.prepare_cached("DELETE FROM layers WHERE network_id = ?1")?
                    .execute([id])?;

                self.connection.prepare_cached("DELETE FROM neurons WHERE network_id = ?1")?
                    .execute([id])?;

                id
            }

            None => {
                self.connection.prepare_cached("INSERT INTO networks (name) VALUES (?1)")?
                    .execute([name.as_ref()])?;

                self.connection.last_insert_rowid()
            }
        };

        let layer_sizes = network.layer_sizes();

        for (layer, size) in layer_sizes.iter().enumerate() {
            self.connection.prepare_cached("INSERT INTO layers (network_id, layer, size) VALUES (?1, ?2, ?3)")?
                .execute((id, layer as i64, *size as i64))?;
        }

        for layer in 1..layer_sizes.len() {
            for (position, neuron) in network.neurons(layer).iter().enumerate() {
                if let Some(neuron) = neuron.as_weighted() {
                    self.connection.prepare_cached("INSERT INTO neurons (network_id, layer, position, bias, weights) VALUES (?1, ?2, ?3, ?4, ?5)")?
                        .execute((
                            id,
                            layer as i64,
                            position as i64,
                            neuron.bias(),
                            pack_floats(neuron.weights())
                        ))?;
                }
            }
        }

        Ok(id)
    }

    /// Load the network stored under the given name.
    ///
    /// Guaranteed to return `Ok(None)` if no network is stored.
    pub fn load_network(&self, name: impl AsRef<str>) -> anyhow::Result<Option<Network>> {
        let Some(id) = self.query_network(name.as_ref())? else {
            return Ok(None);
        };

        let layer_sizes = self.connection.prepare_cached("SELECT size FROM layers WHERE network_id = ?1 ORDER BY layer ASC")?
            .query_map([id], |row| row.get::<_, i64>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        if layer_sizes.len() < 2 {
            anyhow::bail!("network \"{}\" has a broken layers record", name.as_ref());
        }

        let mut weighted_layers = Vec::with_capacity(layer_sizes.len() - 1);

        for layer in 1..layer_sizes.len() {
            let neurons = self.connection.prepare_cached("SELECT bias, weights FROM neurons WHERE network_id = ?1 AND layer = ?2 ORDER BY position ASC")?
                .query_map((id, layer as i64), |row| {
                    let bias    = row.get::<_, f64>(0)?;
                    let weights = row.get::<_, Vec<u8>>(1)?;

                    Ok((bias, weights))
                })?
                .map(|row| -> anyhow::Result<_> {
                    let (bias, weights) = row?;

                    Ok(WeightedNeuron::from_parts(unpack_floats(&weights)?, bias))
                })
                .collect::<Result<Vec<_>, _>>()?;

            weighted_layers.push(neurons);
        }

        let network = Network::from_layers(layer_sizes[0] as usize, weighted_layers)?;

        Ok(Some(network))
    }
}

#[test]
fn test_networks_database() -> anyhow::Result<()> {
    let _ = std::fs::remove_file("networks_database.db");

    let db = Database::open("networks_database.db", 4096)?;

    let mut rng = fastrand::Rng::with_seed(7);

    let network = Network::random(&[2, 3, 1], &mut rng)?;

    assert_eq!(db.load_network("gates")?, None);

    db.save_network("gates", &network)?;

    let Some(loaded) = db.load_network("gates")? else {
        anyhow::bail!("saved network not found");
    };

    assert_eq!(loaded, network);

    // Saving under the same name replaces the stored network.
    let replacement = Network::random(&[2, 2], &mut rng)?;

    db.save_network("gates", &replacement)?;

    let Some(loaded) = db.load_network("gates")? else {
        anyhow::bail!("replaced network not found");
    };

    assert_eq!(loaded, replacement);
    assert_eq!(loaded.layer_sizes(), [2, 2]);

    let _ = std::fs::remove_file("networks_database.db");

    Ok(())
}
