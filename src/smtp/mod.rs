//! SMTP server implementation

pub mod address;
pub mod commands;
pub mod connection;
pub mod error;
pub mod reader;
pub mod reply;
pub mod server;
pub mod session;

pub use address::{Address, AddressError};
pub use commands::{Action, Command, CommandHandler};
pub use connection::Connection;
pub use error::SmtpError;
pub use reader::{LineReader, MessageCollector};
pub use reply::Reply;
pub use server::{SmtpServer, handle_client};
pub use session::{SmtpSession, SmtpState};
