use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use serenity::{CreateMessage, EditMessage};
use tokio::sync::Mutex;

use crate::driver::{AdGate, Presenter};
use crate::session::Frame;

const PROGRESS_CELLS: usize = 12;
/// Discord rejects message bodies longer than this.
pub const MESSAGE_LIMIT: usize = 2000;
/// Longest name shown before it is cut with an ellipsis.
pub const NAME_WIDTH: usize = 32;
// Room kept free for the "... and N more" trailer.
const ELISION_RESERVE: usize = 32;

/// Shortens a name to `NAME_WIDTH` characters for display.
pub fn display_name(name: &str) -> String {
    if name.chars().count() <= NAME_WIDTH {
        return name.to_string();
    }
    let cut: String = name.chars().take(NAME_WIDTH - 1).collect();
    format!("{cut}…")
}

/// Joins `lines` under `header`, dropping trailing lines that would push the
/// body past `MESSAGE_LIMIT` bytes. The line at `keep` is never dropped.
fn fit_message(header: String, lines: &[String], keep: Option<usize>) -> String {
    let mut pending = keep
        .and_then(|index| lines.get(index))
        .map_or(0, |line| line.len() + 1);
    let mut body = header;
    let mut hidden = 0;
    for (index, line) in lines.iter().enumerate() {
        if Some(index) == keep {
            body.push('\n');
            body.push_str(line);
            pending = 0;
        } else if hidden == 0
            && body.len() + 1 + line.len() + pending + ELISION_RESERVE <= MESSAGE_LIMIT
        {
            body.push('\n');
            body.push_str(line);
        } else {
            hidden += 1;
        }
    }
    if hidden > 0 {
        body.push_str(&format!("\n… and {hidden} more"));
    }
    body
}

/// Draws one frame of the wheel as a message body.
pub fn render_frame_text(names: &[String], frame: &Frame) -> String {
    let filled = ((frame.progress * PROGRESS_CELLS as f64).round() as usize).min(PROGRESS_CELLS);
    let bar = format!(
        "{}{}",
        "█".repeat(filled),
        "░".repeat(PROGRESS_CELLS - filled)
    );
    let header = if frame.progress >= 1.0 {
        "🛑 **The wheel stopped!**".to_string()
    } else {
        format!("🎡 **Spinning...** `{bar}`")
    };

    let lines: Vec<String> = names
        .iter()
        .enumerate()
        .map(|(index, name)| {
            if index == frame.pointer_index {
                format!("👉 **{}**", display_name(name))
            } else {
                format!("▫️ {}", display_name(name))
            }
        })
        .collect();
    fit_message(header, &lines, Some(frame.pointer_index))
}

/// Numbered list of the names, positions starting at 1.
pub fn render_names(names: &[String]) -> String {
    if names.is_empty() {
        return "The wheel is empty. Add names with `/add_name`.".to_string();
    }
    let header = format!("🎡 **{} on the wheel**", names.len());
    let lines: Vec<String> = names
        .iter()
        .enumerate()
        .map(|(index, name)| format!("`{}.` {}", index + 1, display_name(name)))
        .collect();
    fit_message(header, &lines, None)
}

pub fn render_winner(name: &str) -> String {
    format!("🎉🎊 **{}** wins! 🎊🎉", display_name(name))
}

/// Shows the spin as a single message that is edited on every frame.
pub struct ChannelPresenter {
    http: Arc<serenity::Http>,
    channel_id: serenity::ChannelId,
    message: Mutex<Option<serenity::MessageId>>,
}

impl ChannelPresenter {
    pub fn new(http: Arc<serenity::Http>, channel_id: serenity::ChannelId) -> Self {
        Self {
            http,
            channel_id,
            message: Mutex::new(None),
        }
    }
}

#[async_trait]
impl Presenter for ChannelPresenter {
    async fn render_frame(&self, names: &[String], frame: &Frame) -> Result<()> {
        let content = render_frame_text(names, frame);
        let mut message = self.message.lock().await;
        match *message {
            Some(message_id) => {
                self.channel_id
                    .edit_message(&self.http, message_id, EditMessage::new().content(content))
                    .await?;
            }
            None => {
                let sent = self.channel_id.say(&self.http, content).await?;
                *message = Some(sent.id);
            }
        }
        Ok(())
    }

    async fn winner_resolved(&self, name: &str) -> Result<()> {
        let content = render_winner(name);
        self.channel_id
            .send_message(&self.http, CreateMessage::new().content(content))
            .await?;
        Ok(())
    }
}

/// Posts the sponsor link into the channel the wheel lives in.
pub struct LinkAdGate {
    http: Arc<serenity::Http>,
    channel_id: serenity::ChannelId,
    url: String,
}

impl LinkAdGate {
    pub fn new(http: Arc<serenity::Http>, channel_id: serenity::ChannelId, url: String) -> Self {
        Self {
            http,
            channel_id,
            url,
        }
    }
}

#[async_trait]
impl AdGate for LinkAdGate {
    async fn open(&self) -> Result<()> {
        let content = format!("📣 This spin is brought to you by our sponsor: {}", self.url);
        self.channel_id
            .send_message(&self.http, CreateMessage::new().content(content))
            .await?;
        Ok(())
    }
}
