use std::sync::Arc;

use clap::{
    Parser,
    ValueEnum,
};

use crate::hasher::{
    Crc32Hasher,
    SharedHasher,
    SipHasher32,
};

#[derive(Debug, Parser, Clone)]
pub struct SentryConfig {
    #[arg(long = "sentry-dsn", env = "SENTRY_DSN", default_value = "")]
    pub dsn: String,

    #[arg(long = "sentry-sample-rate", env = "SENTRY_SAMPLE_RATE", default_value = "0.0")]
    pub sample_rate: f32,
}

#[derive(Copy, Clone, ValueEnum, Debug, PartialEq, Eq)]
pub enum HasherKind {
    Crc32,
    Sip,
}

impl HasherKind {
    pub fn build(self) -> SharedHasher {
        match self {
            HasherKind::Crc32 => Arc::new(Crc32Hasher),
            HasherKind::Sip => Arc::new(SipHasher32),
        }
    }
}

#[derive(Debug, Parser, Clone)]
pub struct PlacementConfig {
    #[arg(long, env = "DUALRING_HASHER", value_enum, default_value_t = HasherKind::Crc32)]
    pub hasher: HasherKind,

    /// Node identifiers, comma separated.
    #[arg(long, env = "DUALRING_NODES", value_delimiter = ',')]
    pub nodes: Vec<String>,

    /// Key identifiers, comma separated.
    #[arg(long, env = "DUALRING_KEYS", value_delimiter = ',')]
    pub keys: Vec<String>,

    /// Number of random keys to generate on top of `--keys`.
    #[arg(long, env = "DUALRING_RANDOM_KEYS", default_value_t = 0)]
    pub random_keys: usize,
}
