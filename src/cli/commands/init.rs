//! Init command implementation
//!
//! Writes a sample `shroud.toml`.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "shroud.toml")]
    pub output: String,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2); // Configuration error exit code
        }

        match fs::write(&self.output, SAMPLE_CONFIG) {
            Ok(_) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Put secrets in a .env file (SHROUD_API_KEY, SHROUD_HASH_SALT)");
                println!("  3. Validate configuration: shroud validate-config");
                println!("  4. Anonymize a document: shroud anonymize contract.txt -o contract.anon.txt");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {}", e);
                Ok(5) // Fatal error exit code
            }
        }
    }
}

/// Sample configuration written by `shroud init`
pub const SAMPLE_CONFIG: &str = r#"# Shroud Configuration File
# Reversible anonymization for documents sent to language models

[application]
log_level = "info"
dry_run = false

[anonymizer]
language = "en"
# Empty means every supported label
entities = []
score_threshold = 0.0
# Fixed seed makes fake values reproducible across runs
faker_seed = 42
add_default_faker_operators = true
mapping_path = "./mapping/anonymization_mapping.json"
presets = ["polish_id", "time", "legal_terms"]
# pattern_library = "./patterns/custom.toml"

# Inline recognizer
# [[anonymizer.recognizers]]
# entity = "EMPLOYEE_ID"
# patterns = [{ name = "employee_id", regex = '\bEMP-\d{6}\b', score = 0.8 }]
# deny_list = ["EMP-000000"]

# Operators by label; "default" applies when nothing else does
[anonymizer.operators.PHONE_NUMBER]
type = "mask"
masking_char = "*"
chars_to_mask = 12
from_end = true

# [anonymizer.operators.US_SSN]
# type = "hash"
# salt = "${SHROUD_HASH_SALT}"
# hash_type = "sha256"

# [anonymizer.operators.default]
# type = "replace"
# new_value = "<REDACTED>"

[anonymizer.audit]
enabled = false
log_path = "./audit/anonymization.log"
json_format = true

[pipeline]
# endpoint = "https://models.example.com/v1/answer"
# api_key = "${SHROUD_API_KEY}"
model_id = "anthropic.claude-3-5-sonnet-20240620-v1:0"
chunk_size = 1000
chunk_overlap = 100
top_k = 4
timeout_seconds = 60
max_retries = 3
response_pointer = "/completion"

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#;
