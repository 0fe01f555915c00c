use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use stridecoach::bot::CoachBot;
use stridecoach::config;
use stridecoach::generator::DeepSeekGenerator;
use stridecoach::storage::SupabaseStore;
use stridecoach::telegram::BotApi;

#[tokio::main]
async fn main() -> Result<()> {
    // .env first so the filter and config both see it.
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cfg = config::load_or_default().context("failed to load configuration")?;
    cfg.require_transport()?;
    if cfg.generator.api_key.trim().is_empty() {
        warn!("DEEPSEEK_API_KEY is not set; onboarding will run but plan generation will fail");
    }

    let http = reqwest::Client::new();
    let api = BotApi::new(http.clone(), &cfg.telegram.bot_token);

    let me = api.get_me().await.context("bot token verification failed")?;
    info!(
        bot = %me.username.as_deref().unwrap_or("unknown"),
        "bot authenticated"
    );

    // Polling and webhooks are mutually exclusive on the Bot API side.
    if let Err(err) = api.delete_webhook().await {
        warn!(error = %err, "failed to delete webhook, continuing");
    }

    let generator = DeepSeekGenerator::new(http.clone(), cfg.generator.clone());
    let store = SupabaseStore::new(http, &cfg.storage);
    let mut bot = CoachBot::new(generator, store);

    info!("polling for updates");
    run_poll_loop(&api, &mut bot, cfg.telegram.poll_timeout_secs).await
}

async fn run_poll_loop(
    api: &BotApi,
    bot: &mut CoachBot<DeepSeekGenerator, SupabaseStore>,
    poll_timeout_secs: u64,
) -> Result<()> {
    let mut offset: i64 = 0;
    loop {
        let updates = match api.get_updates(offset, poll_timeout_secs).await {
            Ok(updates) => updates,
            Err(err) => {
                warn!(error = %err, "poll failed, retrying");
                tokio::time::sleep(Duration::from_secs(5)).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.update_id + 1);
            if let Err(err) = handle_update(api, bot, update).await {
                // One bad update must not take the loop down.
                error!(error = %err, "update handling failed");
            }
        }
    }
}

async fn handle_update(
    api: &BotApi,
    bot: &mut CoachBot<DeepSeekGenerator, SupabaseStore>,
    update: stridecoach::telegram::Update,
) -> Result<()> {
    if let Some(message) = update.message {
        let Some(text) = message.text.as_deref() else {
            return Ok(());
        };
        let Some(from) = message.from.as_ref() else {
            return Ok(());
        };
        let chat_id = message.chat.id;
        info!(chat_id, user_id = from.id, "incoming message");
        let replies = bot.handle_message(chat_id, from, text).await;
        for reply in replies {
            api.send_message(chat_id, &reply.text, reply.keyboard.as_ref())
                .await?;
        }
        return Ok(());
    }

    if let Some(query) = update.callback_query {
        // Acknowledge first so the client stops its spinner even if the
        // flow below produces no reply.
        api.answer_callback_query(&query.id, None).await?;
        let Some(data) = query.data.as_deref() else {
            return Ok(());
        };
        let Some(chat_id) = query.message.as_ref().map(|m| m.chat.id) else {
            return Ok(());
        };
        info!(chat_id, user_id = query.from.id, data, "incoming callback");
        let replies = bot.handle_callback(chat_id, &query.from, data).await;
        for reply in replies {
            api.send_message(chat_id, &reply.text, reply.keyboard.as_ref())
                .await?;
        }
    }

    Ok(())
}
