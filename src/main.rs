// Entrypoint for the uploader.
// - Keeps `main` small: set up logging, create the API client and hand it
//   to the UI loop.
// - Logs go to stderr and are off below `error` unless `RUST_LOG` says
//   otherwise, so they do not tear through the progress bar.

use tracing_subscriber::EnvFilter;
use zenfolio_uploader::{api::ZenfolioClient, ui::main_menu};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error")))
        .with_writer(std::io::stderr)
        .init();

    // Endpoint and agent come from `ZENFOLIO_API_URL` / `ZENFOLIO_USER_AGENT`
    // or the built-in defaults. See `config::Settings::from_env`.
    let api = ZenfolioClient::from_env()?;

    // Blocks until the user exits.
    main_menu(api)?;
    Ok(())
}
