/*
 * Command Line Module
 *
 * Parses the driver's command line into Settings. `-h` stays clap's help
 * flag, so headless mode is only available as `--headless`.
 */

use clap::Parser;

use crate::settings::Settings;

#[derive(Parser, Debug)]
#[command(name = "pals", version, about = "Parallel agent life simulation")]
pub struct Cli {
    /// Starting number of agents
    #[arg(long = "start-n", default_value_t = 1024 * 1024)]
    pub start_agents: usize,

    /// Maximum number of agents
    #[arg(long = "max-n", default_value_t = 1024 * 1024 * 2)]
    pub max_agents: usize,

    /// Seed for the RNG
    #[arg(short, long, default_value_t = 123456)]
    pub seed: u64,

    /// Number of worker threads (0 lets the pool decide)
    #[arg(short, long, default_value_t = 1)]
    pub threads: usize,

    /// Number of iterations to simulate
    #[arg(short, long, default_value_t = 1000)]
    pub iterations: u64,

    /// Run the simulation without the visualization
    #[arg(long)]
    pub headless: bool,

    /// Show debug information
    #[arg(long)]
    pub debug: bool,
}

impl Cli {
    pub fn into_settings(self) -> Settings {
        Settings {
            start_agents: self.start_agents,
            max_agents: self.max_agents,
            seed: self.seed,
            threads: self.threads,
            iterations: self.iterations,
            headless: self.headless,
            debug: self.debug,
        }
    }
}
