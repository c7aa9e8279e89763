//! Huddle join command: a headless terminal participant
//!
//! Reads commands from stdin and prints the room whenever it changes.
//!
//! ```text
//! /name Ann cat     set display name and avatar
//! /move 50 60       drag the avatar to a point
//! /up /down /left /right
//! /who              print the room now
//! /quit
//! anything else     chat
//! ```

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use huddle_client::{ConnectionManager, SessionClient};
use huddle_core::{ArrowKey, AvatarKind, LocalView, Participant, Point};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, info};

use crate::config::ConfigLoader;

/// Arguments for the join command
#[derive(Debug, Args)]
pub struct JoinArgs {
    /// Origin of the hub (e.g. http://127.0.0.1:8080)
    #[arg(long)]
    pub origin: Option<String>,

    /// Display name to set once connected
    #[arg(short, long)]
    pub name: Option<String>,

    /// Avatar to use with --name
    #[arg(short, long, default_value = "ghost")]
    pub avatar: String,
}

/// One line of terminal input
#[derive(Debug, Clone, PartialEq)]
pub enum JoinCommand {
    Chat(String),
    Profile { name: String, avatar: AvatarKind },
    MoveTo(Point),
    Step(ArrowKey),
    Who,
    Quit,
}

/// Parse a line of input; `Err` carries a usage hint
pub fn parse_line(line: &str) -> Result<Option<JoinCommand>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let Some(command) = line.strip_prefix('/') else {
        return Ok(Some(JoinCommand::Chat(line.to_string())));
    };

    let mut words = command.split_whitespace();
    let verb = words.next().unwrap_or_default();
    let rest: Vec<&str> = words.collect();

    let parsed = match verb {
        "name" => {
            let Some((avatar, name)) = rest.split_last().filter(|_| rest.len() >= 2) else {
                return Err("usage: /name <name> <avatar>".to_string());
            };
            let avatar = AvatarKind::parse(avatar).ok_or_else(|| {
                let all: Vec<&str> = AvatarKind::ALL.iter().map(AvatarKind::as_str).collect();
                format!("unknown avatar, pick one of: {}", all.join(", "))
            })?;
            JoinCommand::Profile {
                name: name.join(" "),
                avatar,
            }
        }
        "move" => match rest.as_slice() {
            [x, y] => {
                let x: f64 = x.parse().map_err(|_| "usage: /move <x> <y>".to_string())?;
                let y: f64 = y.parse().map_err(|_| "usage: /move <x> <y>".to_string())?;
                JoinCommand::MoveTo(Point::new(x, y))
            }
            _ => return Err("usage: /move <x> <y>".to_string()),
        },
        "who" => JoinCommand::Who,
        "quit" | "exit" => JoinCommand::Quit,
        other => match ArrowKey::parse(other) {
            Some(key) => JoinCommand::Step(key),
            None => return Err(format!("unknown command /{}", other)),
        },
    };
    Ok(Some(parsed))
}

/// Render the room as one line per participant, sorted by id
pub fn render_room(view: &LocalView, now: Instant) -> String {
    if !view.is_connected() {
        return "(disconnected, waiting to reconnect)".to_string();
    }
    let mut lines: Vec<String> = view
        .snapshot()
        .sorted()
        .into_iter()
        .map(|p| render_participant(view, p, now))
        .collect();
    if lines.is_empty() {
        lines.push("(empty room)".to_string());
    }
    lines.join("\n")
}

fn render_participant(view: &LocalView, participant: &Participant, now: Instant) -> String {
    let marker = if view.is_me(&participant.id) { '*' } else { ' ' };
    let name = if participant.name.is_empty() {
        short_id(&participant.id)
    } else {
        participant.name.as_str()
    };
    let mut line = format!(
        "{} {} ({}) @ {:.0},{:.0}",
        marker, name, participant.sprite_type, participant.x, participant.y
    );
    if let Some(message) = view.visible_message(&participant.id, now) {
        line.push_str(&format!("  \"{}\"", message));
    }
    line
}

fn short_id(id: &str) -> &str {
    id.get(..8).unwrap_or(id)
}

/// Run the join command
pub async fn run(args: JoinArgs) -> Result<()> {
    let config = ConfigLoader::load()?;
    let origin = args.origin.unwrap_or(config.client.origin.clone());
    let manager = ConnectionManager::from_origin(&origin, config.client.reconnect_config())
        .with_context(|| format!("Cannot join {}", origin))?;
    info!("Joining room at {}", manager.url());

    let profile = match args.name {
        Some(name) => Some((
            name,
            AvatarKind::parse(&args.avatar)
                .with_context(|| format!("Unknown avatar {:?}", args.avatar))?,
        )),
        None => None,
    };

    let mut session = SessionClient::new(manager, config.room.bounds());
    let mut updates = session.subscribe();
    let disposer = session.connect();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut identity: Option<String> = None;
    let mut last_render = String::new();

    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = updates.borrow_and_update().clone();

                // Every connection is a fresh participant; restate the profile.
                if view.own_id() != identity.as_deref() {
                    identity = view.own_id().map(str::to_owned);
                    if identity.is_some()
                        && let Some((name, avatar)) = &profile
                    {
                        session.submit_profile(name, *avatar);
                    }
                }

                let rendered = render_room(&view, Instant::now());
                if rendered != last_render {
                    println!("{}\n", rendered);
                    last_render = rendered;
                }
            }
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read stdin")? else {
                    break;
                };
                match parse_line(&line) {
                    Ok(Some(JoinCommand::Quit)) => break,
                    Ok(Some(command)) => apply(&mut session, command),
                    Ok(None) => {}
                    Err(hint) => eprintln!("{}", hint),
                }
            }
            _ = tokio::signal::ctrl_c() => break,
        }
    }

    disposer.dispose();
    info!("Left the room");
    Ok(())
}

fn apply(session: &mut SessionClient, command: JoinCommand) {
    let sent = match command {
        JoinCommand::Chat(text) => session.submit_chat(&text),
        JoinCommand::Profile { name, avatar } => session.submit_profile(&name, avatar),
        JoinCommand::Step(key) => session.arrow_key(key),
        JoinCommand::MoveTo(target) => drag_to(session, target),
        JoinCommand::Who => {
            println!("{}\n", render_room(&session.view(), Instant::now()));
            true
        }
        JoinCommand::Quit => true,
    };
    if !sent {
        eprintln!("not sent (not connected yet?)");
    }
    debug!(sent, "applied command");
}

/// Drag the local avatar from where the hub last put it to `target`
fn drag_to(session: &mut SessionClient, target: Point) -> bool {
    let Some(start) = session.view().me().map(Participant::position) else {
        return false;
    };
    if !session.pointer_down(Point::new(start.x + 1.0, start.y + 1.0)) {
        return false;
    }
    let sent = session.pointer_move(target);
    session.pointer_up();
    sent
}
