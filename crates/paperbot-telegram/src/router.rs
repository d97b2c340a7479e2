use std::sync::Arc;

use teloxide::{dispatching::Dispatcher, dptree, prelude::*};

use tracing::info;

use paperbot_core::{
    config::Config,
    messaging::{paced::PacedMessenger, port::MessagingPort},
    pipeline::PipelineDeps,
    ports::{GifFinder, SlideConverter},
    raster::PdfRasterizer,
};

use crate::handlers;
use crate::TelegramMessenger;

#[derive(Clone)]
pub struct AppState {
    pub cfg: Arc<Config>,
    pub deps: Arc<PipelineDeps>,
    pub gif: Option<Arc<dyn GifFinder>>,
}

pub async fn run_polling(
    cfg: Arc<Config>,
    converter: Option<Arc<dyn SlideConverter>>,
    gif: Option<Arc<dyn GifFinder>>,
) -> anyhow::Result<()> {
    let bot = Bot::new(cfg.telegram_bot_token.clone());

    // Liveness check before accepting updates; a bad token fails startup.
    let me = bot
        .get_me()
        .await
        .map_err(|e| anyhow::anyhow!("bot liveness check failed: {e}"))?;
    info!("paperbot started: @{}", me.username());
    info!("temp dir: {}", cfg.temp_dir.display());
    if converter.is_none() {
        info!("CONVERTAPI_SECRET not set; PDF to PPTX conversion disabled");
    }
    if gif.is_none() {
        info!("TENOR_API_KEY not set; GIF search disabled");
    }

    // Wrap the raw messenger so multi-page deliveries are spaced out instead
    // of tripping Telegram's per-chat rate limits.
    let raw_messenger: Arc<dyn MessagingPort> = Arc::new(TelegramMessenger::new(bot.clone()));
    let messenger: Arc<dyn MessagingPort> =
        Arc::new(PacedMessenger::new(raw_messenger, cfg.upload_delay));

    let deps = Arc::new(PipelineDeps {
        messenger,
        converter,
        rasterizer: Arc::new(PdfRasterizer::new(cfg.raster_tool_path.clone())),
        http: reqwest::Client::new(),
        temp_dir: cfg.temp_dir.clone(),
        output_dir: cfg.output_dir.clone(),
    });

    let state = Arc::new(AppState {
        cfg: cfg.clone(),
        deps,
        gif,
    });

    let handler = dptree::entry().branch(Update::filter_message().endpoint(handlers::handle_message));

    Dispatcher::builder(bot, handler)
        .dependencies(dptree::deps![state])
        .build()
        .dispatch()
        .await;

    Ok(())
}
