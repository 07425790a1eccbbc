//! Keygen command - mints an API key
//!
//! Prints the full key (shown exactly once), the display prefix, and the
//! hash to store. The raw key is never persisted or logged by the gateway;
//! handing it to the caller is this command's whole job.

use anyhow::bail;
use clap::Args;

use crate::domain::credential::Environment;
use crate::infrastructure::auth::generate_key;

#[derive(Debug, Args)]
pub struct KeygenArgs {
    /// Key environment: `live` or `test`
    #[arg(long, default_value = "test")]
    pub environment: String,
}

pub async fn run(args: KeygenArgs) -> anyhow::Result<()> {
    let environment = match args.environment.as_str() {
        "live" => Environment::Live,
        "test" => Environment::Test,
        other => bail!("Unknown environment '{}', expected 'live' or 'test'", other),
    };

    let generated = generate_key(environment);

    println!("key:    {}", generated.key);
    println!("prefix: {}", generated.prefix);
    println!("hash:   {}", generated.hash);

    Ok(())
}
