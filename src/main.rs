use std::{io, path::Path};

use {anyhow::Result, log::info};

use consult::{
    config::Config,
    console::Console,
    responder::{ChatClient, ResponseService},
};

fn main() -> Result<()> {
    env_logger::init();
    info!("Starting service");

    let config_path = Config::path_from_env();
    let config = Config::load(Path::new(&config_path))?;
    info!(
        "Using model {} at {}",
        config.completion.model, config.completion.endpoint
    );

    let api_key = config.completion.load_api_key();
    let api_key_env = config.completion.api_key_env.clone();
    let service = ResponseService::new(ChatClient::new(config.completion, api_key));

    Console::new(&service, &api_key_env).run(io::stdin().lock(), io::stdout().lock())
}
