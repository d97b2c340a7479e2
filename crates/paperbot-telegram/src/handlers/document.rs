use std::{path::Path, sync::Arc};

use teloxide::{net::Download, prelude::*};

use tracing::error;

use paperbot_core::{
    domain::ChatId,
    pipeline::{is_pdf_mime, run_file_pipeline, trigger_mode, ConversionMode},
    tempfiles::TempFile,
};

use crate::router::AppState;

async fn download_document(
    bot: &Bot,
    doc: &teloxide::types::Document,
    dest: &Path,
) -> anyhow::Result<()> {
    let file = bot.get_file(doc.file.id.clone()).await?;
    let mut dst = tokio::fs::File::create(dest).await?;
    bot.download_file(&file.path, &mut dst).await?;
    Ok(())
}

/// Passive conversion: a document whose caption contains a trigger phrase.
///
/// Telegram delivers multi-file uploads as one message per file, so each
/// attachment is validated and processed independently; one file's failure
/// never blocks its siblings.
pub async fn handle_document(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let Some(doc) = msg.document() else {
        return Ok(());
    };
    let Some(caption) = msg.caption() else {
        return Ok(());
    };
    let Some(mode) = trigger_mode(caption) else {
        return Ok(());
    };

    // Mime gate: only PDFs are processed; everything else gets a per-file
    // reply.
    let mime = doc.mime_type.as_ref().map(|m| m.essence_str().to_string());
    if !is_pdf_mime(mime.as_deref()) {
        let _ = bot
            .send_message(
                msg.chat.id,
                format!(
                    "❌ Conversion not supported for file type: {}",
                    mime.as_deref().unwrap_or("unknown")
                ),
            )
            .await;
        return Ok(());
    }

    if mode == ConversionMode::Slides && state.deps.converter.is_none() {
        let _ = bot
            .send_message(
                msg.chat.id,
                "⚠️ PDF to PPTX conversion is not configured. Set CONVERTAPI_SECRET in .env",
            )
            .await;
        return Ok(());
    }

    let _ = bot.send_message(msg.chat.id, "Processing your PDF file!").await;

    // Scoped temp input: removed when this handler returns, success or
    // failure.
    let temp = TempFile::reserve(&state.cfg.temp_dir, "temp", "pdf");
    if let Err(e) = download_document(&bot, doc, temp.path()).await {
        error!("failed to download document: {e}");
        let _ = bot
            .send_message(
                msg.chat.id,
                format!(
                    "❌ Failed to download the file: {}",
                    e.to_string().chars().take(100).collect::<String>()
                ),
            )
            .await;
        return Ok(());
    }

    match run_file_pipeline(&state.deps, ChatId(msg.chat.id.0), temp.path(), mode).await {
        Ok(()) => {
            let done = match mode {
                ConversionMode::Slides => "✅ PDF converted to PPTX successfully!",
                ConversionMode::Images => "✅ PDF converted to images successfully!",
            };
            let _ = bot.send_message(msg.chat.id, done).await;
        }
        Err(e) => {
            error!("document pipeline failed: {e}");
            let _ = bot.send_message(msg.chat.id, e.user_message()).await;
        }
    }

    Ok(())
}
