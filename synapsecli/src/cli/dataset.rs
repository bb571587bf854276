use std::path::PathBuf;

use clap::Parser;
use colorful::Colorful;
use serde::Deserialize;

use synapselib::prelude::*;

#[derive(Deserialize)]
/// JSON record of one training sample.
struct SampleRecord {
    inputs: Vec<f64>,
    desired: Vec<f64>
}

#[derive(Parser)]
pub enum DatasetCli {
    /// Create new dataset of training samples.
    Create,

    /// Insert training samples from a JSON file into the dataset.
    ///
    /// The file must contain an array of objects with "inputs" and
    /// "desired" arrays of floats.
    Insert {
        #[arg(long)]
        /// Path to the JSON file with samples.
        samples: PathBuf
    },

    /// Print all the samples stored in the dataset.
    Show
}

impl DatasetCli {
    #[inline]
    pub fn execute(self, path: PathBuf, cache_size: i64) -> anyhow::Result<()> {
        match self {
            Self::Create => {
                match SamplesDatabase::open(&path, cache_size) {
                    Ok(_) => {
                        let path = path.canonicalize().unwrap_or(path);

                        println!("{}", format!("🚀 Dataset created in {path:?}").green());
                        println!("{} {} command will create new dataset automatically if needed", "📖 Note:".blue(), "`dataset insert`".yellow());
                    }

                    Err(err) => eprintln!("{}", format!("🧯 Failed to create dataset: {err}").red())
                }
            }

            Self::Insert { samples } => {
                let database = path.canonicalize().unwrap_or(path);

                println!("⏳ Opening dataset in {database:?}...");

                match SamplesDatabase::open(&database, cache_size) {
                    Ok(database) => {
                        let samples = samples.canonicalize().unwrap_or(samples);

                        println!("⏳ Reading samples from {samples:?}...");

                        match std::fs::read_to_string(samples) {
                            Ok(samples) => {
                                match serde_json::from_str::<Vec<SampleRecord>>(&samples) {
                                    Ok(records) => {
                                        let mut inserted = 0;

                                        let result = records.into_iter().try_for_each(|record| {
                                            database.insert(&TrainingSample::new(record.inputs, record.desired))?;

                                            inserted += 1;

                                            Ok::<_, anyhow::Error>(())
                                        });

                                        match result {
                                            Ok(()) => println!("{}", format!("✅ Inserted {inserted} samples").green()),
                                            Err(err) => eprintln!("{}", format!("🧯 Failed to insert sample: {err}").red())
                                        }
                                    }

                                    Err(err) => eprintln!("{}", format!("🧯 Failed to parse samples file: {err}").red())
                                }
                            }

                            Err(err) => eprintln!("{}", format!("🧯 Failed to read samples file: {err}").red())
                        }
                    }

                    Err(err) => eprintln!("{}", format!("🧯 Failed to open dataset: {err}").red())
                }
            }

            Self::Show => {
                let database = path.canonicalize().unwrap_or(path);

                match SamplesDatabase::open(&database, cache_size) {
                    Ok(database) => {
                        let result = database.for_each(|id, sample| {
                            println!("{} {:?} -> {:?}", format!("№{id}").yellow(), sample.inputs, sample.desired);

                            Ok(())
                        });

                        match result {
                            Ok(read) => println!("{}", format!("✅ {read} samples read").green()),
                            Err(err) => eprintln!("{}", format!("🧯 Failed to read samples: {err}").red())
                        }
                    }

                    Err(err) => eprintln!("{}", format!("🧯 Failed to open dataset: {err}").red())
                }
            }
        }

        Ok(())
    }
}
