use anyhow::Result;
use recipes::cli;

// Main function
#[tokio::main]
async fn main() -> Result<()> {
    // Start the program
    let action = cli::start()?;

    // Handle the action
    action.execute().await?;

    cli::telemetry::shutdown_tracer();

    Ok(())
}
