//! airob-probe: check the configured completion endpoint
//!
//! Reads settings from the environment, runs the connection probe and
//! prints the result as JSON. Exit code 1 on bad configuration, 2 when
//! the probe reports an error.

use log::{error, info};

#[tokio::main]
async fn main()
{   env_logger::init();

    let settings = match airob::Settings::from_env()
    {   Ok(s) => s
      , Err(e) => {
          error!("{}", e);
          eprintln!("{}", e);
          std::process::exit(1);
        }
    };

    let client = airob::CompletionClient::new(settings.endpoint.clone());
    info!("Probing {}", client.url());

    let result = airob::service::test_connection(&client).await;
    match serde_json::to_string_pretty(&result)
    {   Ok(json) => println!("{}", json)
      , Err(e) => error!("Failed to render probe result: {}", e)
    }

    if !result.is_success()
    {   std::process::exit(2);
    }
}
