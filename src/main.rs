use anyhow::Result;
use tracing::debug;

use prompt_polish::{logging, signal, App, Config, InputHandler, OllamaClient};

#[tokio::main]
async fn main() -> Result<()> {
    logging::init();
    let interrupt = signal::ctrl_c().await;

    // Missing key or an unusable HTTP client ends the process with status 1
    let config = Config::from_env()?;
    debug!(base_url = %config.base_url, model = %config.model, "loaded configuration");

    let client = OllamaClient::new(&config)?;
    let mut app = App::new(client, config.model.as_str());

    let mut stdout = std::io::stdout();
    app.print_banner(&mut stdout)?;

    let mut input = InputHandler::stdin();
    let exit = app.run(&mut input, &mut stdout, interrupt).await?;
    debug!(?exit, turns = app.conversation().len() / 2, "chat loop finished");

    Ok(())
}
