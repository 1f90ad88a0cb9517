use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use log::info;
use poise::serenity_prelude as serenity;
use tokio::sync::RwLock;

use crate::clock::TokioClock;
use crate::config::WheelConfig;
use crate::driver::SpinDriver;
use crate::error::WheelError;
use crate::presenter::{display_name, render_names, ChannelPresenter, LinkAdGate};
use crate::roulette::EntropySource;
use crate::session::WheelSession;

type Context<'a> = poise::Context<'a, Data, anyhow::Error>;

// One wheel per channel, created on first use and dropped with the channel.
pub struct Data {
    pub config: Arc<WheelConfig>,
    pub wheels: RwLock<HashMap<serenity::ChannelId, Arc<SpinDriver>>>,
}

impl Data {
    pub fn new(config: Arc<WheelConfig>) -> Self {
        Self {
            config,
            wheels: RwLock::new(HashMap::new()),
        }
    }

    async fn wheel(&self, ctx: Context<'_>) -> Arc<SpinDriver> {
        let channel_id = ctx.channel_id();
        if let Some(wheel) = self.wheels.read().await.get(&channel_id) {
            return wheel.clone();
        }

        let mut wheels = self.wheels.write().await;
        wheels
            .entry(channel_id)
            .or_insert_with(|| {
                info!("creating wheel for channel {channel_id}");
                let timing = self.config.timing();
                let session = WheelSession::new(
                    timing.spin_duration,
                    Box::new(EntropySource::new()),
                    Arc::new(TokioClock::new()),
                );
                let ad_gate = LinkAdGate::new(
                    ctx.serenity_context().http.clone(),
                    channel_id,
                    self.config.ad_url.clone(),
                );
                Arc::new(SpinDriver::new(session, Arc::new(ad_gate), timing))
            })
            .clone()
    }
}

/// Puts a name on this channel's wheel
#[poise::command(slash_command, guild_only)]
async fn add_name(
    ctx: Context<'_>,
    #[description = "Name to add"] name: String,
) -> Result<()> {
    let wheel = ctx.data().wheel(ctx).await;
    let outcome = wheel.session().lock().await.add_participant(&name);
    match outcome {
        Ok(added) => {
            ctx.say(format!("Added **{}** to the wheel.", display_name(&added)))
                .await?
        }
        Err(WheelError::DuplicateName(name)) => {
            ctx.say(format!("**{}** is already on the wheel.", display_name(&name)))
                .await?
        }
        Err(err) => ctx.say(format!("Couldn't add that name: {err}.")).await?,
    };
    Ok(())
}

/// Takes a name off the wheel by its position in /names
#[poise::command(slash_command, guild_only)]
async fn remove_name(
    ctx: Context<'_>,
    #[description = "Position of the name, starting at 1"] position: u32,
) -> Result<()> {
    let wheel = ctx.data().wheel(ctx).await;
    let outcome = {
        let mut session = wheel.session().lock().await;
        match (position as usize).checked_sub(1) {
            Some(index) => session.remove_participant(index),
            None => Err(WheelError::NoSuchParticipant {
                index: 0,
                len: session.participants().len(),
            }),
        }
    };
    match outcome {
        Ok(removed) => {
            ctx.say(format!("Removed **{}** from the wheel.", display_name(&removed)))
                .await?
        }
        Err(WheelError::NoSuchParticipant { len, .. }) => {
            ctx.say(format!("There is no name at position {position}; the wheel has {len}."))
                .await?
        }
        Err(err) => ctx.say(format!("Couldn't remove that name: {err}.")).await?,
    };
    Ok(())
}

/// Lists the names on this channel's wheel
#[poise::command(slash_command, guild_only)]
async fn names(ctx: Context<'_>) -> Result<()> {
    let wheel = ctx.data().wheel(ctx).await;
    let names = wheel.session().lock().await.participants().names().to_vec();
    ctx.say(render_names(&names)).await?;
    Ok(())
}

/// Spins the wheel and picks a winner
#[poise::command(slash_command, guild_only)]
async fn spin(ctx: Context<'_>) -> Result<()> {
    let wheel = ctx.data().wheel(ctx).await;
    // Ad delay plus animation outlasts the interaction's reply window.
    ctx.defer().await?;

    let presenter = ChannelPresenter::new(ctx.serenity_context().http.clone(), ctx.channel_id());
    match wheel.on_spin_requested(&presenter).await {
        Ok(report) => {
            ctx.say(format!(
                "Spin #{} is done: **{}** takes it!",
                report.spin_number,
                display_name(&report.winner)
            ))
            .await?
        }
        Err(err) => ctx.say(format!("Can't spin right now: {err}.")).await?,
    };
    Ok(())
}

async fn event_handler(
    _ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, Data, anyhow::Error>,
    data: &Data,
) -> Result<()> {
    match event {
        serenity::FullEvent::Ready { data_about_bot, .. } => {
            info!("logged in as {}", data_about_bot.user.name);
        }
        serenity::FullEvent::ChannelDelete { channel, .. } => {
            if data.wheels.write().await.remove(&channel.id).is_some() {
                info!("dropped wheel for deleted channel {}", channel.id);
            }
        }
        _ => {}
    }
    Ok(())
}

pub async fn start(config: WheelConfig) -> Result<()> {
    let token = std::env::var("DISCORD_TOKEN").context("missing DISCORD_TOKEN")?;
    let intents = serenity::GatewayIntents::non_privileged();
    let config = Arc::new(config);

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![add_name(), remove_name(), names(), spin()],
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, _ready, framework| {
            let config = Arc::clone(&config);
            Box::pin(async move {
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                Ok(Data::new(config))
            })
        })
        .build();

    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .context("failed to create Discord client")?;
    client.start().await.context("Discord client stopped")?;
    Ok(())
}
