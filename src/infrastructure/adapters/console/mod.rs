//! Console adapter for development/testing
//!
//! Reads `<address>: <message>` lines from stdin. Lines without an address
//! come from the configured console user as direct messages.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::{mpsc, Mutex};

use crate::application::errors::BotError;
use crate::application::messaging::MessageParser;
use crate::domain::entities::{Address, InboundMessage};
use crate::domain::traits::Transport;

const INPUT_BUFFER: usize = 64;

/// Console transport for local development
///
/// The stdin reader owns the only sender, so input ends once stdin closes.
pub struct ConsoleAdapter {
    parser: MessageParser,
    console_user: Address,
    stdin_input: Mutex<Option<mpsc::Sender<String>>>,
    lines: Mutex<mpsc::Receiver<String>>,
}

impl ConsoleAdapter {
    pub fn new(parser: MessageParser, console_user: Address) -> Self {
        let (input, lines) = mpsc::channel(INPUT_BUFFER);
        Self {
            parser,
            console_user,
            stdin_input: Mutex::new(Some(input)),
            lines: Mutex::new(lines),
        }
    }

    /// Adapter fed from the returned sender instead of stdin. Input ends
    /// when every clone of the sender is dropped.
    pub fn scripted(parser: MessageParser, console_user: Address) -> (Self, mpsc::Sender<String>) {
        let (input, lines) = mpsc::channel(INPUT_BUFFER);
        let adapter = Self {
            parser,
            console_user,
            stdin_input: Mutex::new(None),
            lines: Mutex::new(lines),
        };
        (adapter, input)
    }

    fn parse(&self, line: &str) -> InboundMessage {
        match self.parser.parse_line(line) {
            Ok(message) => message,
            Err(e) => {
                tracing::debug!("Treating line as console input ({})", e);
                self.parser.parse(self.console_user.clone(), line)
            }
        }
    }
}

#[async_trait]
impl Transport for ConsoleAdapter {
    async fn connect(&self) -> Result<(), BotError> {
        tracing::info!("Starting console transport (dev mode) as {}", self.console_user);
        let Some(input) = self.stdin_input.lock().await.take() else {
            return Ok(());
        };

        tokio::spawn(async move {
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) => {
                        if input.send(line).await.is_err() {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("Failed to read stdin: {}", e);
                        break;
                    }
                }
            }
        });
        Ok(())
    }

    async fn send_message(&self, destination: &Address, body: &str) -> Result<(), BotError> {
        if body.trim().is_empty() {
            tracing::debug!("[BOT -> {}] (keepalive)", destination);
        } else {
            println!("[BOT -> {}] {}", destination, body);
        }
        Ok(())
    }

    async fn join_room(&self, room: &Address, nickname: &str) -> Result<(), BotError> {
        println!("[BOT] joined {} as {}", room, nickname);
        Ok(())
    }

    async fn recv(&self) -> Result<Option<InboundMessage>, BotError> {
        let mut lines = self.lines.lock().await;
        loop {
            let Some(line) = lines.recv().await else {
                return Ok(None);
            };
            if line.trim() == "/quit" {
                return Ok(None);
            }
            if line.trim().is_empty() {
                continue;
            }
            return Ok(Some(self.parse(&line)));
        }
    }
}
