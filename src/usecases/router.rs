//! Command router: maps chat triggers to handlers wrapped in their filter chains,
//! and turns admin posts into bus events.
//!
//! The trigger table is built once; the command listing for `/help` and for the
//! platform's command menu is derived from it.

use crate::domain::{BotCommand, ChatMessage, CommandEvent, DomainError, PhotoEvent, TextEvent};
use crate::ports::ChatPlatform;
use crate::pubsub::Bus;
use crate::usecases::album::AlbumSender;
use crate::usecases::filters::{self, CommandHandler, Filter};
use crate::usecases::handlers::send_error;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tracing::{debug, info};

pub const WELCOME_TEXT: &str =
    "Thanks for using the bot! You can type /help command to know what can I do";

/// What a chat message can trigger.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Named command including the leading slash, e.g. `/start`.
    Command(String),
    Photo,
    Text,
}

impl Trigger {
    pub fn command(name: &str) -> Self {
        Trigger::Command(format!("/{}", name.trim_start_matches('/')))
    }

    /// Resolve the trigger for an incoming message.
    pub fn for_message(msg: &ChatMessage) -> Option<Self> {
        if msg.photo.is_some() {
            return Some(Trigger::Photo);
        }
        let text = msg.text.trim_start();
        if let Some(rest) = text.strip_prefix('/') {
            let word = rest.split_whitespace().next().unwrap_or_default();
            // `/stop@my_bot` addresses this bot explicitly.
            let name = word.split('@').next().unwrap_or_default();
            return Some(Trigger::command(name));
        }
        if text.is_empty() {
            return None;
        }
        Some(Trigger::Text)
    }
}

#[derive(Debug, Clone)]
pub struct RouterConfig {
    pub admins: HashSet<i64>,
}

struct RouteInfo {
    name: String,
    help: &'static str,
    admin_only: bool,
}

/// Shared state reached by every handler.
struct RouterCore {
    chat: Arc<dyn ChatPlatform>,
    bus: Arc<Bus>,
    admins: Arc<HashSet<i64>>,
    albums: AlbumSender,
    listing: Vec<RouteInfo>,
}

pub struct CommandRouter {
    core: Arc<RouterCore>,
    dispatch: HashMap<Trigger, CommandHandler>,
}

impl CommandRouter {
    pub fn new(
        config: RouterConfig,
        chat: Arc<dyn ChatPlatform>,
        bus: Arc<Bus>,
        albums: AlbumSender,
    ) -> Self {
        let admins = Arc::new(config.admins);
        let private: Filter = filters::only_private();
        let admin: Filter = filters::only_admins(Arc::clone(&admins));

        struct Route {
            trigger: Trigger,
            help: &'static str,
            admin_only: bool,
            filters: Vec<Filter>,
            action: Action,
        }

        let routes = vec![
            Route {
                trigger: Trigger::command("start"),
                help: "Start a conversation with the bot",
                admin_only: false,
                filters: vec![Arc::clone(&private)],
                action: Action::Start,
            },
            Route {
                trigger: Trigger::command("help"),
                help: "Show help",
                admin_only: false,
                filters: vec![Arc::clone(&private)],
                action: Action::Help,
            },
            Route {
                trigger: Trigger::command("stop"),
                help: "Stop notifications for all handlers or specific handler",
                admin_only: true,
                filters: vec![Arc::clone(&private), Arc::clone(&admin)],
                action: Action::Stop,
            },
            Route {
                trigger: Trigger::Photo,
                help: "",
                admin_only: false,
                filters: vec![Arc::clone(&private), Arc::clone(&admin)],
                action: Action::Photo,
            },
            Route {
                trigger: Trigger::Text,
                help: "",
                admin_only: false,
                filters: vec![Arc::clone(&private), Arc::clone(&admin)],
                action: Action::Text,
            },
        ];

        let mut listing: Vec<RouteInfo> = routes
            .iter()
            .filter(|r| !r.help.trim().is_empty())
            .filter_map(|r| match &r.trigger {
                Trigger::Command(c) => Some(RouteInfo {
                    name: c.trim_start_matches('/').to_string(),
                    help: r.help,
                    admin_only: r.admin_only,
                }),
                _ => None,
            })
            .collect();
        listing.sort_by(|a, b| a.name.cmp(&b.name));

        let core = Arc::new(RouterCore {
            chat,
            bus,
            admins,
            albums,
            listing,
        });

        let dispatch = routes
            .into_iter()
            .map(|route| {
                let core = Arc::clone(&core);
                let action = route.action;
                let inner = filters::handler(move |msg| {
                    let core = Arc::clone(&core);
                    async move { core.run(action, msg).await }
                });
                (route.trigger, filters::apply(inner, &route.filters))
            })
            .collect();

        Self { core, dispatch }
    }

    /// Register the public command menu with the chat platform.
    pub async fn start(&self) -> Result<(), DomainError> {
        let commands = self.commands(false);
        self.core.chat.set_commands(&commands).await?;
        info!(count = commands.len(), "bot commands registered");
        Ok(())
    }

    /// Sorted command listing; admin-only entries only when `include_admin`.
    pub fn commands(&self, include_admin: bool) -> Vec<BotCommand> {
        self.core.commands(include_admin)
    }

    pub fn triggers(&self) -> impl Iterator<Item = &Trigger> {
        self.dispatch.keys()
    }

    /// Run the filtered handler registered for `trigger`.
    pub async fn dispatch(&self, trigger: &Trigger, msg: ChatMessage) -> Result<(), DomainError> {
        match self.dispatch.get(trigger) {
            Some(exec) => exec(msg).await,
            None => {
                debug!(?trigger, "no handler registered");
                Ok(())
            }
        }
    }

    /// Resolve the trigger for `msg` and dispatch it.
    pub async fn handle(&self, msg: ChatMessage) -> Result<(), DomainError> {
        match Trigger::for_message(&msg) {
            Some(trigger) => self.dispatch(&trigger, msg).await,
            None => Ok(()),
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Action {
    Start,
    Help,
    Stop,
    Photo,
    Text,
}

impl RouterCore {
    async fn run(&self, action: Action, msg: ChatMessage) -> Result<(), DomainError> {
        match action {
            Action::Start => self.handle_start(msg).await,
            Action::Help => self.handle_help(msg).await,
            Action::Stop => self.handle_stop(msg),
            Action::Photo => self.handle_photo(msg).await,
            Action::Text => self.handle_text(msg),
        }
    }

    fn commands(&self, include_admin: bool) -> Vec<BotCommand> {
        self.listing
            .iter()
            .filter(|r| include_admin || !r.admin_only)
            .map(|r| BotCommand {
                text: r.name.clone(),
                description: r.help.to_string(),
            })
            .collect()
    }

    fn is_admin(&self, sender_id: &str) -> bool {
        filters::parse_sender(sender_id)
            .map(|id| self.admins.contains(&id))
            .unwrap_or(false)
    }

    async fn handle_start(&self, msg: ChatMessage) -> Result<(), DomainError> {
        let to = filters::parse_sender(&msg.sender_id)?;
        self.chat.send_text(to, WELCOME_TEXT).await
    }

    async fn handle_help(&self, msg: ChatMessage) -> Result<(), DomainError> {
        let to = filters::parse_sender(&msg.sender_id)?;
        let help: String = self
            .commands(self.is_admin(&msg.sender_id))
            .iter()
            .map(|c| format!("/{} - {}\n", c.text, c.description))
            .collect();
        self.chat.send_text(to, &help).await
    }

    fn handle_stop(&self, msg: ChatMessage) -> Result<(), DomainError> {
        let event = CommandEvent::stop(msg.payload.trim());
        info!(handler = %event.handler, "stop notifications requested");
        if let Err(e) = self.bus.publish_event(&event) {
            send_error(&self.bus, &e);
        }
        Ok(())
    }

    async fn handle_photo(&self, msg: ChatMessage) -> Result<(), DomainError> {
        let Some(photo) = msg.photo.as_ref() else {
            return Ok(());
        };
        let caption = photo.caption.trim();
        let in_album = msg.album_id.as_deref().is_some_and(|id| !id.is_empty());

        if caption.is_empty() && !in_album {
            return Ok(());
        }
        if in_album {
            self.albums.submit(msg);
            return Ok(());
        }

        let content = match self.chat.get_file(&photo.file_id).await {
            Ok(content) => content,
            Err(e) => {
                send_error(&self.bus, &e);
                return Ok(());
            }
        };

        let event = PhotoEvent {
            caption: caption.to_string(),
            file_id: photo.file_id.clone(),
            file_url: photo.file_url.clone(),
            file_size: photo.file_size,
            file_content: content,
        };
        if let Err(e) = self.bus.publish_event(&event) {
            send_error(&self.bus, &e);
        }
        Ok(())
    }

    fn handle_text(&self, msg: ChatMessage) -> Result<(), DomainError> {
        let text = msg.text.trim();
        if text.is_empty() {
            return Ok(());
        }
        if let Err(e) = self.bus.publish_event(&TextEvent {
            text: text.to_string(),
        }) {
            send_error(&self.bus, &e);
        }
        Ok(())
    }
}
