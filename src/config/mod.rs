pub mod cli;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_args::CliConfig;

#[cfg(feature = "cli")]
mod cli_args {
    use crate::adapters::pacing::{DEFAULT_DELAY_MS, MAX_DELAY_MS};
    use crate::adapters::scryfall::{DEFAULT_API_BASE, DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
    use crate::core::ConfigProvider;
    use crate::utils::error::Result;
    use crate::utils::validation::{self, Validate, RECORD_FILE_EXTENSIONS};
    use clap::Parser;
    use serde::{Deserialize, Serialize};
    use std::time::Duration;

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "card-image-etl")]
    #[command(about = "Add Scryfall image URLs to a list of trading cards")]
    pub struct CliConfig {
        /// Card list to read (.json or .csv), relative to --base-dir
        #[arg(long, default_value = "cards.json")]
        pub input: String,

        /// Where to write the enriched list (.json or .csv), relative to --base-dir
        #[arg(long, default_value = "cards_with_images.json")]
        pub output: String,

        #[arg(long, default_value = ".")]
        pub base_dir: String,

        #[arg(long, default_value = DEFAULT_API_BASE)]
        pub api_base: String,

        /// Pause after every lookup, in milliseconds
        #[arg(long, default_value_t = DEFAULT_DELAY_MS)]
        pub delay_ms: u64,

        #[arg(long, default_value_t = DEFAULT_TIMEOUT_SECS)]
        pub timeout_secs: u64,

        #[arg(long, default_value = DEFAULT_USER_AGENT)]
        pub user_agent: String,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Log CPU and memory usage per phase")]
        pub monitor: bool,
    }

    impl ConfigProvider for CliConfig {
        fn api_base(&self) -> &str {
            &self.api_base
        }

        fn input_path(&self) -> &str {
            &self.input
        }

        fn output_path(&self) -> &str {
            &self.output
        }

        fn request_delay(&self) -> Duration {
            Duration::from_millis(self.delay_ms)
        }

        fn request_timeout(&self) -> Duration {
            Duration::from_secs(self.timeout_secs)
        }

        fn user_agent(&self) -> &str {
            &self.user_agent
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_url("api_base", &self.api_base)?;
            validation::validate_path("input", &self.input)?;
            validation::validate_path("output", &self.output)?;
            validation::validate_path("base_dir", &self.base_dir)?;
            validation::validate_file_extension("input", &self.input, RECORD_FILE_EXTENSIONS)?;
            validation::validate_file_extension("output", &self.output, RECORD_FILE_EXTENSIONS)?;
            validation::validate_range("delay_ms", self.delay_ms, 0, MAX_DELAY_MS)?;
            validation::validate_positive_number("timeout_secs", self.timeout_secs, 1)?;
            validation::validate_non_empty_string("user_agent", &self.user_agent)?;
            Ok(())
        }
    }

}
