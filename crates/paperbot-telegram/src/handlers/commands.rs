use std::sync::Arc;

use teloxide::prelude::*;

use tracing::error;

use paperbot_core::domain::ChatId;
use paperbot_core::pipeline::{
    check_pdf_url, command_mode, run_url_pipeline, ConversionMode, UrlCheck,
};

use crate::router::AppState;

const CONVERT_USAGE: &str = "Please send a PDF file or share a valid PDF URL, and I'll convert it for you.\n\nYou can:\n• Send a PDF file with the caption \"convert to pptx\" or \"convert to images\"\n• Share a valid PDF URL (e.g., https://example.com/file.pdf)";

const INVALID_INPUT: &str =
    "❌ Invalid input. Please provide a valid PDF URL or send a file for conversion.";

const NOT_A_PDF_URL: &str = "❌ The provided URL does not point to a valid PDF file. Please provide a URL ending with `.pdf`.";

fn parse_command(text: &str) -> (String, String) {
    // Telegram may send `/cmd@botname arg1 ...`
    let mut parts = text.trim().splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or("").trim();
    let rest = parts.next().unwrap_or("").trim().to_string();

    let cmd = first
        .trim_start_matches('/')
        .split('@')
        .next()
        .unwrap_or("")
        .to_lowercase();

    (cmd, rest)
}

pub async fn handle_command(bot: Bot, msg: Message, state: Arc<AppState>) -> ResponseResult<()> {
    let text = msg.text().unwrap_or("");
    let (cmd, args) = parse_command(text);

    match cmd.as_str() {
        "convertpdf" => convert_pdf(bot, msg, state, &args).await,
        "creategif" => create_gif(bot, msg, state, &args).await,
        "testbot" => test_bot(bot, msg).await,
        _ => {
            let _ = bot
                .send_message(
                    msg.chat.id,
                    "Unknown command. Available: /convertpdf, /creategif, /testbot",
                )
                .await;
            Ok(())
        }
    }
}

async fn convert_pdf(
    bot: Bot,
    msg: Message,
    state: Arc<AppState>,
    args: &str,
) -> ResponseResult<()> {
    let url = match check_pdf_url(args) {
        UrlCheck::Empty => {
            let _ = bot.send_message(msg.chat.id, CONVERT_USAGE).await;
            return Ok(());
        }
        UrlCheck::NoUrl => {
            let _ = bot.send_message(msg.chat.id, INVALID_INPUT).await;
            return Ok(());
        }
        UrlCheck::NotPdf(_) => {
            let _ = bot.send_message(msg.chat.id, NOT_A_PDF_URL).await;
            return Ok(());
        }
        UrlCheck::Pdf(url) => url,
    };

    let mode = command_mode(args);
    if mode == ConversionMode::Slides && state.deps.converter.is_none() {
        let _ = bot
            .send_message(
                msg.chat.id,
                "⚠️ PDF to PPTX conversion is not configured. Set CONVERTAPI_SECRET in .env",
            )
            .await;
        return Ok(());
    }

    let _ = bot
        .send_message(
            msg.chat.id,
            format!("Processing the PDF from the provided URL: {url}"),
        )
        .await;

    match run_url_pipeline(&state.deps, ChatId(msg.chat.id.0), &url, mode).await {
        Ok(()) => {
            let _ = bot
                .send_message(msg.chat.id, "✅ PDF conversion complete!")
                .await;
        }
        Err(e) => {
            error!("convertpdf pipeline failed for {url}: {e}");
            let _ = bot.send_message(msg.chat.id, e.user_message()).await;
        }
    }

    Ok(())
}

async fn create_gif(
    bot: Bot,
    msg: Message,
    state: Arc<AppState>,
    args: &str,
) -> ResponseResult<()> {
    let query = args.trim();
    if query.is_empty() {
        let _ = bot
            .send_message(msg.chat.id, "Usage: /creategif <search terms>")
            .await;
        return Ok(());
    }

    let Some(gif) = &state.gif else {
        let _ = bot
            .send_message(
                msg.chat.id,
                "⚠️ GIF search is not configured. Set TENOR_API_KEY in .env",
            )
            .await;
        return Ok(());
    };

    match gif.find_gif(query).await {
        Ok(Some(url)) => {
            let _ = bot
                .send_message(msg.chat.id, format!("Here's a GIF for \"{query}\"\n{url}"))
                .await;
        }
        Ok(None) => {
            let _ = bot
                .send_message(msg.chat.id, format!("Sorry, no GIFs found for \"{query}\"."))
                .await;
        }
        Err(e) => {
            error!("creategif search failed for {query:?}: {e}");
            let _ = bot.send_message(msg.chat.id, e.user_message()).await;
        }
    }

    Ok(())
}

async fn test_bot(bot: Bot, msg: Message) -> ResponseResult<()> {
    let who = msg
        .from()
        .map(|u| match &u.username {
            Some(name) => format!("@{name}"),
            None => u.id.to_string(),
        })
        .unwrap_or_else(|| "unknown".to_string());

    let _ = bot
        .send_message(
            msg.chat.id,
            format!("Hello! I'm working properly. Command received from {who}"),
        )
        .await;

    Ok(())
}
