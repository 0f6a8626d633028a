use lettre::message::{Mailbox, Message};
use lettre::{SmtpTransport, Transport};
use std::error::Error;
use std::net::TcpListener;
use std::sync::Arc;
use std::thread;
use tinymta::delivery::DnsError;
use tinymta::{ServerConfig, SmtpServer};

#[test]
fn basic_lettre_send() -> Result<(), Box<dyn Error>> {
    let dir = tempfile::tempdir()?;
    let listener = TcpListener::bind("127.0.0.1:0")?;
    let port = listener.local_addr()?.port();

    let config = ServerConfig::new("localhost").with_mailbox_dir(dir.path());
    let no_mx = |domain: &str| -> Result<String, DnsError> {
        Err(DnsError::NoMailExchanger(domain.to_string()))
    };
    let server = SmtpServer::new(config, Arc::new(no_mx));

    thread::spawn(move || {
        server
            .start_with_listener(listener)
            .expect("server start failed")
    });

    let message = Message::builder()
        .from("Hanako <hanako@example.com>".parse::<Mailbox>()?)
        .to("Tarou <tarou@localhost>".parse::<Mailbox>()?)
        .subject("Greetings")
        .body("Hello from lettre".to_owned())?;

    let mailer = SmtpTransport::builder_dangerous("127.0.0.1")
        .port(port)
        .build();

    let response = mailer.send(&message)?;
    assert!(response.is_positive());

    let mailbox = std::fs::read_to_string(dir.path().join("tarou"))?;
    assert!(mailbox.starts_with("From hanako@example.com "));
    assert!(mailbox.contains("Subject: Greetings"));
    assert!(mailbox.contains("Hello from lettre"));

    Ok(())
}
