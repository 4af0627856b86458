use clap::{Args, Parser, Subcommand};
use core::time::Duration;
use ferrofactor::{
    DEFAULT_BLOCK_SIZE, Error, Method, PrimeFileGenerator, Strategy, codec::RECORD_SIZE,
    primes::{DEFAULT_CHANNEL_CAPACITY, MAX_LIMIT},
};
use std::path::PathBuf;

/// Command line interface for the `ferrofactor` binary.
///
/// Every option may also be supplied through an environment variable (or a
/// `.env` file in the working directory).
#[derive(Parser, Debug, Clone)]
#[command(
    name = "ferrofactor",
    version,
    about = "Factor random 64 bit numbers into their primes"
)]
pub struct CliArgs {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Factor random 64 bit numbers into their primes until the timeout
    /// expires.
    Factor(FactorArgs),
    /// Generate a binary file of primes for the disk-assisted method.
    Generate(GenerateArgs),
}

#[derive(Args, Debug, Clone)]
pub struct FactorArgs {
    /// Prime factoring method: `direct` or `disk-assisted`.
    ///
    /// Environment variable: `FACTOR_METHOD`
    #[arg(short, long, env = "FACTOR_METHOD", default_value_t = String::from("direct"))]
    pub method: String,

    /// Shift random inputs right by this many bits.
    ///
    /// Larger shifts produce smaller, cheaper numbers. Must be at most 63.
    ///
    /// Environment variable: `FACTOR_SHIFT`
    #[arg(short, long, env = "FACTOR_SHIFT", default_value_t = 16)]
    pub shift: u32,

    /// Number of seconds to keep issuing new numbers.
    ///
    /// Environment variable: `FACTOR_TIMEOUT`
    #[arg(short, long, env = "FACTOR_TIMEOUT", default_value_t = 1)]
    pub timeout: u64,

    /// Timeout in milliseconds. Takes precedence over `--timeout` when set.
    ///
    /// Environment variable: `FACTOR_TIMEOUT_MS`
    #[arg(long, env = "FACTOR_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Maximum number of numbers factored at the same time.
    ///
    /// Defaults to the number of logical CPUs.
    ///
    /// Environment variable: `FACTOR_CONCURRENCY`
    #[arg(short, long, env = "FACTOR_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Prime file consulted by the disk-assisted method.
    ///
    /// Environment variable: `PRIMES_PATH`
    #[arg(short, long, env = "PRIMES_PATH", default_value = "primes.bin")]
    pub primes: PathBuf,

    /// Bytes read from the prime file per refill. Must be a multiple of 8.
    ///
    /// Environment variable: `PRIMES_BLOCK_SIZE`
    #[arg(long, env = "PRIMES_BLOCK_SIZE", default_value_t = DEFAULT_BLOCK_SIZE)]
    pub block_size: usize,

    /// Capacity of the buffer between workers and the result printer.
    ///
    /// Environment variable: `RESULT_BUFFER_SIZE`
    #[arg(long, env = "RESULT_BUFFER_SIZE", default_value_t = 8)]
    pub result_buffer_size: usize,

    /// Seed for the random number source. Omit for a fresh seed per run.
    ///
    /// Environment variable: `FACTOR_SEED`
    #[arg(long, env = "FACTOR_SEED")]
    pub seed: Option<u64>,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Output binary file.
    ///
    /// Environment variable: `PRIMES_OUTPUT`
    #[arg(short, long, env = "PRIMES_OUTPUT", default_value = "primes.bin")]
    pub output: PathBuf,

    /// Write every prime below 2^limit.
    ///
    /// Environment variable: `PRIMES_LIMIT`
    #[arg(short, long, env = "PRIMES_LIMIT", default_value_t = 16)]
    pub limit: u32,

    /// Primes buffered between the scanner and the file writer.
    ///
    /// Environment variable: `PRIMES_CHANNEL_CAPACITY`
    #[arg(long, env = "PRIMES_CHANNEL_CAPACITY", default_value_t = DEFAULT_CHANNEL_CAPACITY)]
    pub channel_capacity: usize,
}

/// Validated settings for a factoring run.
#[derive(Debug, Clone)]
pub struct BenchConfig {
    pub strategy: Strategy,
    pub shift: u32,
    pub timeout: Duration,
    pub concurrency: usize,
    pub result_buffer_size: usize,
    pub seed: Option<u64>,
}

impl BenchConfig {
    /// Settings for `strategy` with the CLI defaults.
    pub fn new(strategy: Strategy) -> Self {
        Self {
            strategy,
            shift: 16,
            timeout: Duration::from_secs(1),
            concurrency: num_cpus::get(),
            result_buffer_size: 8,
            seed: None,
        }
    }
}

impl TryFrom<FactorArgs> for BenchConfig {
    type Error = anyhow::Error;

    fn try_from(args: FactorArgs) -> Result<Self, Self::Error> {
        let method: Method = args.method.parse()?;

        if args.shift > 63 {
            return Err(Error::InvalidShift { shift: args.shift }.into());
        }

        let concurrency = args.concurrency.unwrap_or_else(num_cpus::get);
        if concurrency == 0 {
            return Err(Error::InvalidConcurrency.into());
        }

        if args.block_size == 0 || args.block_size % RECORD_SIZE != 0 {
            return Err(Error::InvalidBlockSize {
                size: args.block_size,
            }
            .into());
        }

        if args.result_buffer_size == 0 {
            return Err(Error::InvalidResultBufferSize.into());
        }

        let timeout = match args.timeout_ms {
            Some(ms) => Duration::from_millis(ms),
            None => Duration::from_secs(args.timeout),
        };

        Ok(Self {
            strategy: Strategy::new(method, args.primes, args.block_size),
            shift: args.shift,
            timeout,
            concurrency,
            result_buffer_size: args.result_buffer_size,
            seed: args.seed,
        })
    }
}

/// Validated settings for prime file generation.
#[derive(Debug, Clone)]
pub struct GenerateConfig {
    pub output: PathBuf,
    pub limit: u32,
    pub channel_capacity: usize,
}

impl GenerateConfig {
    pub fn generator(&self) -> PrimeFileGenerator {
        PrimeFileGenerator::new(&self.output, self.limit)
            .with_channel_capacity(self.channel_capacity)
    }
}

impl TryFrom<GenerateArgs> for GenerateConfig {
    type Error = anyhow::Error;

    fn try_from(args: GenerateArgs) -> Result<Self, Self::Error> {
        if args.limit == 0 || args.limit > MAX_LIMIT {
            return Err(Error::InvalidLimit {
                limit: args.limit,
                max: MAX_LIMIT,
            }
            .into());
        }

        Ok(Self {
            output: args.output,
            limit: args.limit,
            channel_capacity: args.channel_capacity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn factor_args(extra: &[&str]) -> FactorArgs {
        let argv = ["ferrofactor", "factor"].iter().chain(extra);
        match CliArgs::try_parse_from(argv).unwrap().command {
            Command::Factor(args) => args,
            Command::Generate(_) => panic!("expected factor subcommand"),
        }
    }

    fn generate_args(extra: &[&str]) -> GenerateArgs {
        let argv = ["ferrofactor", "generate"].iter().chain(extra);
        match CliArgs::try_parse_from(argv).unwrap().command {
            Command::Generate(args) => args,
            Command::Factor(_) => panic!("expected generate subcommand"),
        }
    }

    fn config_error(extra: &[&str]) -> Error {
        BenchConfig::try_from(factor_args(extra))
            .unwrap_err()
            .downcast::<Error>()
            .unwrap()
    }

    #[test]
    fn factor_flags_are_parsed() {
        let config = BenchConfig::try_from(factor_args(&[
            "-m",
            "disk-assisted",
            "-s",
            "32",
            "-t",
            "3",
            "-c",
            "4",
            "--primes",
            "/tmp/p.bin",
            "--block-size",
            "4096",
            "--seed",
            "7",
        ]))
        .unwrap();

        assert_eq!(config.strategy.method(), Method::DiskAssisted);
        assert_eq!(config.shift, 32);
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.seed, Some(7));
        match config.strategy {
            Strategy::DiskAssisted(disk) => {
                assert_eq!(disk.path(), std::path::Path::new("/tmp/p.bin"));
                assert_eq!(disk.block_size(), 4096);
            }
            Strategy::Direct(_) => panic!("expected disk-assisted strategy"),
        }
    }

    #[test]
    fn timeout_ms_overrides_seconds() {
        let config =
            BenchConfig::try_from(factor_args(&["-t", "9", "--timeout-ms", "250"])).unwrap();
        assert_eq!(config.timeout, Duration::from_millis(250));
    }

    #[test]
    fn unknown_method_is_rejected() {
        assert!(matches!(
            config_error(&["-m", "pollard-rho"]),
            Error::UnknownMethod { name } if name == "pollard-rho"
        ));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        assert!(matches!(
            config_error(&["-s", "64"]),
            Error::InvalidShift { shift: 64 }
        ));
        assert!(matches!(
            config_error(&["-c", "0"]),
            Error::InvalidConcurrency
        ));
        assert!(matches!(
            config_error(&["--block-size", "100"]),
            Error::InvalidBlockSize { size: 100 }
        ));
        assert!(matches!(
            config_error(&["--result-buffer-size", "0"]),
            Error::InvalidResultBufferSize
        ));
    }

    #[test]
    fn generate_flags_are_parsed() {
        let config =
            GenerateConfig::try_from(generate_args(&["-o", "/tmp/out.bin", "-l", "20"])).unwrap();
        assert_eq!(config.output, PathBuf::from("/tmp/out.bin"));
        assert_eq!(config.limit, 20);
        assert_eq!(config.generator().limit(), 20);

        for limit in ["0", "57"] {
            let err = GenerateConfig::try_from(generate_args(&["-l", limit])).unwrap_err();
            assert!(matches!(
                err.downcast_ref::<Error>(),
                Some(Error::InvalidLimit { .. })
            ));
        }
    }
}
