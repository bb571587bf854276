use std::path::PathBuf;

use clap::Parser;
use colorful::Colorful;

use synapselib::prelude::*;

#[derive(Parser)]
pub enum NetworkCli {
    /// Create new randomly initialized network.
    Create {
        #[arg(long, short)]
        /// Name the network is stored under.
        name: String,

        #[arg(long, num_args = 2..)]
        /// Sizes of the network's layers: inputs first, outputs last.
        layers: Vec<usize>,

        #[arg(long)]
        /// Seed of the weights generator. Random if not set.
        seed: Option<u64>
    },

    /// Train a stored network on a dataset of samples.
    Train {
        #[arg(long, short)]
        /// Name the network is stored under.
        name: String,

        #[arg(long)]
        /// Path to the samples dataset database.
        dataset: PathBuf,

        #[arg(long, default_value_t = 0.1)]
        /// Initial gradient descent step size.
        step_size: f64,

        #[arg(long, default_value_t = 0.1)]
        /// Mean squared error under which training stops.
        error_threshold: f64,

        #[arg(long, default_value_t = 10000)]
        /// Maximal amount of epochs to run.
        max_epochs: u32,

        #[arg(long)]
        /// Keep the step size fixed instead of adapting it between epochs.
        fixed_step: bool
    },

    /// Compute the outputs of a stored network for the given inputs.
    Run {
        #[arg(long, short)]
        /// Name the network is stored under.
        name: String,

        #[arg(long, num_args = 1.., allow_negative_numbers = true)]
        /// Input values, one per input neuron.
        inputs: Vec<f64>
    },

    /// Measure the mean squared error of a stored network over a
    /// dataset of samples.
    Test {
        #[arg(long, short)]
        /// Name the network is stored under.
        name: String,

        #[arg(long)]
        /// Path to the samples dataset database.
        dataset: PathBuf
    }
}

impl NetworkCli {
    #[inline]
    pub fn execute(self, path: PathBuf, cache_size: i64) -> anyhow::Result<()> {
        let database = path.canonicalize().unwrap_or(path);

        println!("⏳ Opening networks database in {database:?}...");

        let database = match NetworksDatabase::open(&database, cache_size) {
            Ok(database) => database,
            Err(err) => {
                eprintln!("{}", format!("🧯 Failed to open networks database: {err}").red());

                return Ok(());
            }
        };

        match self {
            Self::Create { name, layers, seed } => {
                let mut rng = match seed {
                    Some(seed) => fastrand::Rng::with_seed(seed),
                    None => fastrand::Rng::new()
                };

                let network = match Network::random(&layers, &mut rng) {
                    Ok(network) => network,
                    Err(err) => {
                        eprintln!("{}", format!("🧯 Failed to create network: {err}").red());

                        return Ok(());
                    }
                };

                let parameters = layers.windows(2)
                    .map(|sizes| (sizes[0] + 1) * sizes[1])
                    .sum::<usize>();

                match database.save_network(&name, &network) {
                    Ok(_) => {
                        println!("{}", format!("🚀 Network \"{name}\" created").green());
                        println!("      Layers: {}", format!("{layers:?}").yellow());
                        println!("  Parameters: {}", format!("{parameters}").yellow());
                    }

                    Err(err) => eprintln!("{}", format!("🧯 Failed to save network: {err}").red())
                }
            }

            Self::Train { name, dataset, step_size, error_threshold, max_epochs, fixed_step } => {
                let mut network = match database.load_network(&name) {
                    Ok(Some(network)) => network,

                    Ok(None) => {
                        eprintln!("{}", format!("🧯 Network \"{name}\" is not stored in the database").red());

                        return Ok(());
                    }

                    Err(err) => {
                        eprintln!("{}", format!("🧯 Failed to load network: {err}").red());

                        return Ok(());
                    }
                };

                let samples = match read_samples(dataset, cache_size) {
                    Ok(samples) => samples,
                    Err(err) => {
                        eprintln!("{}", format!("🧯 Failed to read samples dataset: {err}").red());

                        return Ok(());
                    }
                };

                println!("⏳ Training on {} samples...", samples.len());

                let trainer = Trainer::default()
                    .with_step_size(step_size)
                    .with_error_threshold(error_threshold)
                    .with_max_epochs(max_epochs)
                    .with_adaptive_step(!fixed_step);

                let now = std::time::Instant::now();

                match trainer.train(&mut network, &samples) {
                    Ok(report) => {
                        match report.outcome {
                            TrainOutcome::Converged => println!("{}", format!("✅ Converged in {} epochs", report.epochs).green()),
                            TrainOutcome::MaxEpochsReached => println!("{} stopped at the cap of {} epochs", "📖 Note:".blue(), report.epochs)
                        }

                        println!("  Epoch error: {}", format!("{:.8}", report.error).yellow());
                        println!("      Elapsed: {} seconds", now.elapsed().as_secs());

                        match database.save_network(&name, &network) {
                            Ok(_) => println!("{}", format!("🚀 Network \"{name}\" updated").green()),
                            Err(err) => eprintln!("{}", format!("🧯 Failed to save trained network: {err}").red())
                        }
                    }

                    Err(err) => eprintln!("{}", format!("🧯 Failed to train network: {err}").red())
                }
            }

            Self::Run { name, inputs } => {
                let mut network = match database.load_network(&name) {
                    Ok(Some(network)) => network,

                    Ok(None) => {
                        eprintln!("{}", format!("🧯 Network \"{name}\" is not stored in the database").red());

                        return Ok(());
                    }

                    Err(err) => {
                        eprintln!("{}", format!("🧯 Failed to load network: {err}").red());

                        return Ok(());
                    }
                };

                network.reset();

                match network.compute(&inputs) {
                    Ok(outputs) => println!("{} {outputs:?}", "✅ Outputs:".green()),
                    Err(err) => eprintln!("{}", format!("🧯 Failed to compute outputs: {err}").red())
                }
            }

            Self::Test { name, dataset } => {
                let mut network = match database.load_network(&name) {
                    Ok(Some(network)) => network,

                    Ok(None) => {
                        eprintln!("{}", format!("🧯 Network \"{name}\" is not stored in the database").red());

                        return Ok(());
                    }

                    Err(err) => {
                        eprintln!("{}", format!("🧯 Failed to load network: {err}").red());

                        return Ok(());
                    }
                };

                let samples = match read_samples(dataset, cache_size) {
                    Ok(samples) => samples,
                    Err(err) => {
                        eprintln!("{}", format!("🧯 Failed to read samples dataset: {err}").red());

                        return Ok(());
                    }
                };

                if samples.is_empty() {
                    println!("{} dataset is empty, nothing to measure", "📖 Note:".blue());

                    return Ok(());
                }

                let mut error = 0.0;

                for sample in &samples {
                    network.reset();

                    match network.compute(&sample.inputs) {
                        Ok(outputs) => error += distance_squared(&outputs, &sample.desired),

                        Err(err) => {
                            eprintln!("{}", format!("🧯 Failed to compute outputs: {err}").red());

                            return Ok(());
                        }
                    }
                }

                println!("  Mean squared error: {}", format!("{:.8}", error / samples.len() as f64).yellow());
            }
        }

        Ok(())
    }
}

/// Read all the samples of a dataset database into memory.
fn read_samples(dataset: PathBuf, cache_size: i64) -> anyhow::Result<Vec<TrainingSample>> {
    let dataset = dataset.canonicalize().unwrap_or(dataset);

    println!("⏳ Opening samples dataset in {dataset:?}...");

    let dataset = SamplesDatabase::open(&dataset, cache_size)?;

    let mut samples = Vec::new();

    dataset.for_each(|_, sample| {
        samples.push(sample);

        Ok(())
    })?;

    Ok(samples)
}
