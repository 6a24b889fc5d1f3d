use std::env;

use config::{Config as RawConfig, ConfigError, Environment, File};

/// Tunables the runtime core honours.
///
/// Kept as runtime values rather than `const`s so tests can exercise small
/// pools, queues and cast limits without recompiling.
#[derive(Clone, Debug)]
pub struct Config {
    /// Number of worker threads in the pool.
    pub pool_size: usize,
    /// Per-actor mailbox ring capacity.
    pub actor_queue_limit: usize,
    /// Maximum number of actors ever created across the system's lifetime.
    pub cast_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            pool_size: num_cpus(),
            actor_queue_limit: 16,
            cast_limit: 1024,
        }
    }
}

impl Config {
    /// Load defaults, then overlay a TOML file (named by `CACTI_CONF`, default
    /// `config/cacti.toml`) and `CACTI_*` environment variables: defaults,
    /// then file, then environment.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("CACTI_CONF").unwrap_or_else(|_| "config/cacti.toml".into());
        let defaults = Config::default();

        let raw = RawConfig::builder()
            .set_default("pool_size", defaults.pool_size as i64)?
            .set_default("actor_queue_limit", defaults.actor_queue_limit as i64)?
            .set_default("cast_limit", defaults.cast_limit as i64)?
            .add_source(File::with_name(&path).required(false))
            .add_source(Environment::with_prefix("CACTI"))
            .build()?;

        Ok(Config {
            pool_size: raw.get_int("pool_size")? as usize,
            actor_queue_limit: raw.get_int("actor_queue_limit")? as usize,
            cast_limit: raw.get_int("cast_limit")? as usize,
        })
    }
}

// config's own `num_cpus`-style default without pulling the crate in just for
// one call site: fall back to a sane constant when the OS can't say.
fn num_cpus() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4)
}
