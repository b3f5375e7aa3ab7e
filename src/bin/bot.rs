use anyhow::Result;
use dotenvy::dotenv;
use log::{error, info};

use cloudy::{callback, Bot, Command, Config, OptionType, SlashOption};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv().ok();

    let config = Config::from_env()?;

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.log_level))
        .init();

    info!("Starting cloudy...");

    let mut bot = Bot::new(config);

    bot.command(
        Command::builder(callback("hello", &["droplet", "name"], |droplet, args| async move {
            let name = args.get_str("name").unwrap_or("stranger").to_string();
            droplet.respond(format!("👋 Hello, {name}!")).await?;
            anyhow::Ok(())
        }))
        .description("Say hello")
        .option(
            "name",
            SlashOption::new()
                .description("Who to greet")
                .kind(OptionType::String)
                .required(false),
        ),
    )?;

    bot.command(
        Command::builder(callback("ping", &["droplet"], |droplet, _| async move {
            droplet.respond("🏓 Pong!").await?;
            anyhow::Ok(())
        }))
        .description("Check that the bot is alive"),
    )?;

    // Ctrl+C stops the bot gracefully
    let stop = bot.stop_handle();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => stop.stop("Interrupted"),
            Err(e) => error!("Failed to listen for Ctrl+C: {e}"),
        }
    });

    bot.run().await?;
    info!("Bot stopped");
    Ok(())
}
