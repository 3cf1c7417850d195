//! Line-oriented terminal front end.
//!
//! Purely presentation: every line becomes one controller command, and the
//! controller's projections are printed back.

use std::fmt;

use chrono::Local;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::api::{AuthMode, Message};
use crate::interaction::InteractionController;

const HELP_LOGGED_OUT: &str = "\
Commands:
  /login <username> <password>     log in to an existing account
  /register <username> <password>  create an account
  /quit                            exit";

const HELP_LOGGED_IN: &str = "\
Type a message and press Enter to send it.
Commands:
  /refresh  reload the conversation
  /logout   forget this login
  /quit     exit";

/// One parsed input line.
#[derive(Clone, PartialEq, Eq)]
pub enum Command {
    Auth {
        mode: AuthMode,
        username: String,
        password: String,
    },
    Logout,
    Refresh,
    Help,
    Quit,
    Say(String),
    Empty,
    Unknown(String),
}

impl fmt::Debug for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Auth { mode, username, .. } => f
                .debug_struct("Auth")
                .field("mode", mode)
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Logout => f.write_str("Logout"),
            Self::Refresh => f.write_str("Refresh"),
            Self::Help => f.write_str("Help"),
            Self::Quit => f.write_str("Quit"),
            Self::Say(text) => f.debug_tuple("Say").field(text).finish(),
            Self::Empty => f.write_str("Empty"),
            Self::Unknown(verb) => f.debug_tuple("Unknown").field(verb).finish(),
        }
    }
}

impl Command {
    /// Parse a raw input line. Missing credential words come through as empty
    /// strings so the controller reports them the same way a form would.
    #[must_use]
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return Self::Empty;
        }
        if !trimmed.starts_with('/') {
            return Self::Say(line.to_string());
        }

        let mut words = trimmed.split_whitespace();
        let verb = words.next().unwrap_or_default();
        let mut auth = |mode| Self::Auth {
            mode,
            username: words.next().unwrap_or_default().to_string(),
            password: words.next().unwrap_or_default().to_string(),
        };
        match verb {
            "/login" => auth(AuthMode::Login),
            "/register" => auth(AuthMode::Register),
            "/logout" => Self::Logout,
            "/refresh" => Self::Refresh,
            "/help" => Self::Help,
            "/quit" | "/exit" => Self::Quit,
            other => Self::Unknown(other.to_string()),
        }
    }
}

/// `[HH:MM:SS] You: text`, with the time in the local zone when the server
/// timestamp can be parsed.
#[must_use]
pub fn render_message(message: &Message) -> String {
    let who = if message.is_from_user() { "You" } else { "AI" };
    match message.timestamp() {
        Some(ts) => format!(
            "[{}] {who}: {}",
            ts.with_timezone(&Local).format("%H:%M:%S"),
            message.text
        ),
        None => format!("{who}: {}", message.text),
    }
}

/// Prints only what changed since the last call. The history is replaced
/// wholesale, so anything that is not a pure extension is reprinted in full.
#[derive(Debug, Default)]
struct Transcript {
    shown: Vec<Message>,
}

impl Transcript {
    fn update(&mut self, current: Vec<Message>) {
        let fresh = if current.starts_with(&self.shown) {
            &current[self.shown.len()..]
        } else {
            println!("--- conversation ---");
            &current[..]
        };
        for message in fresh {
            println!("{}", render_message(message));
        }
        self.shown = current;
    }

    fn reset(&mut self) {
        self.shown.clear();
    }
}

fn print_banner(chat: &InteractionController, transcript: &mut Transcript) {
    match chat.session() {
        Some(session) => {
            println!("Logged in as {}", session.display_name());
            let messages = chat.messages();
            if messages.is_empty() {
                println!("Start the conversation by typing a message.");
            }
            transcript.update(messages);
        }
        None => {
            println!("Login or register to continue.");
            println!("{HELP_LOGGED_OUT}");
        }
    }
}

fn print_error(chat: &InteractionController) {
    if let Some(error) = chat.ui_state().error_message {
        eprintln!("! {error}");
    }
}

/// Run the REPL until `/quit` or end of input.
pub async fn run(chat: InteractionController) -> std::io::Result<()> {
    let mut transcript = Transcript::default();

    chat.start().await;
    print_banner(&chat, &mut transcript);
    print_error(&chat);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match Command::parse(&line) {
            Command::Empty => continue,
            Command::Quit => break,
            Command::Help => {
                let help = if chat.is_logged_in() { HELP_LOGGED_IN } else { HELP_LOGGED_OUT };
                println!("{help}");
            }
            Command::Unknown(verb) => eprintln!("Unknown command {verb}, try /help"),
            Command::Auth {
                mode,
                username,
                password,
            } => {
                chat.submit_credentials(mode, &username, &password).await;
                if chat.is_logged_in() {
                    transcript.reset();
                    print_banner(&chat, &mut transcript);
                }
            }
            Command::Logout => {
                chat.logout();
                transcript.reset();
                print_banner(&chat, &mut transcript);
            }
            Command::Refresh => {
                chat.refresh_history().await;
                transcript.update(chat.messages());
            }
            Command::Say(text) => {
                if !chat.is_logged_in() {
                    println!("{HELP_LOGGED_OUT}");
                    continue;
                }
                chat.set_input(text);
                println!("Thinking...");
                chat.submit_input().await;
                transcript.update(chat.messages());
            }
        }
        print_error(&chat);
    }
    Ok(())
}
