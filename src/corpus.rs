use crate::config::RunConfig;
use crate::error::ConfigError;

/// The fixed pool of seed strings every produced value is copied from.
///
/// Each entry derives from its index: the index is printed zero-padded to at
/// least four digits, the token is repeated until it reaches the nominal
/// length, and the result is cut one byte short of nominal. The short cut is
/// a long-standing quirk of the harness and the byte accounting downstream
/// depends on the actual produced length, so it stays.
///
/// Entries are pairwise distinct whenever the four-digit token survives the
/// cut, which holds for nominal lengths of five and up.
pub struct Corpus {
    entries: Vec<Box<str>>,
}

impl Corpus {
    /// Builds the pool described by `config`. Runs once, before the engine
    /// starts; the result is never mutated afterwards.
    pub fn generate(config: &RunConfig) -> Result<Corpus, ConfigError> {
        config.validate()?;

        let entry_len = config.entry_len();
        let mut entries = Vec::with_capacity(config.string_count);

        for index in 0..config.string_count {
            let token = format!("{index:04}");

            let mut entry = String::with_capacity(config.string_length + token.len());
            while entry.len() < config.string_length {
                entry.push_str(&token);
            }
            entry.truncate(entry_len);

            entries.push(entry.into_boxed_str());
        }

        Ok(Corpus { entries })
    }

    /// The entry the `produced`-th value copies from. Cycles through the
    /// whole pool as the count grows.
    pub fn entry(&self, produced: u64) -> &str {
        &self.entries[(produced % self.entries.len() as u64) as usize]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Actual byte length shared by every entry.
    pub fn entry_len(&self) -> usize {
        self.entries.first().map_or(0, |entry| entry.len())
    }
}
