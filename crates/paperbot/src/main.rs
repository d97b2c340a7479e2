use std::sync::Arc;

use paperbot_convertapi::ConvertApiClient;
use paperbot_core::{
    config::Config,
    ports::{GifFinder, SlideConverter},
};
use paperbot_tenor::TenorClient;

#[tokio::main]
async fn main() -> Result<(), paperbot_core::Error> {
    paperbot_core::logging::init("paperbot")?;

    let cfg = Arc::new(Config::load()?);

    let converter: Option<Arc<dyn SlideConverter>> = cfg
        .convertapi_secret
        .as_ref()
        .map(|secret| Arc::new(ConvertApiClient::new(secret.clone())) as Arc<dyn SlideConverter>);

    let gif: Option<Arc<dyn GifFinder>> = cfg
        .tenor_api_key
        .as_ref()
        .map(|key| Arc::new(TenorClient::new(key.clone())) as Arc<dyn GifFinder>);

    paperbot_telegram::router::run_polling(cfg, converter, gif)
        .await
        .map_err(|e| paperbot_core::Error::External(format!("telegram bot failed: {e}")))?;

    Ok(())
}
