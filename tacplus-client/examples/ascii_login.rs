use std::io::{self, BufRead, Write};

use tokio::net::TcpStream;
use tokio_util::compat::TokioAsyncReadCompatExt;

use tacplus_client::client::{ClientConfigBuilder, PromptKind, SessionContextBuilder};
use tacplus_client::{
    Argument, AuthenticationMethod, AuthenticationService, AuthenticationType, Connection,
};

/// Asks on the terminal for whatever the server prompts for.
fn console_prompt(prompt: &str, no_echo: bool, kind: PromptKind) -> Option<String> {
    let prompt = if prompt.is_empty() {
        match kind {
            PromptKind::User => "Username: ",
            PromptKind::Password => "Password: ",
            PromptKind::Data => "> ",
        }
    } else {
        prompt
    };

    print!("{prompt}");
    if no_echo {
        // a real client would turn off terminal echo here
        print!("(input will be visible) ");
    }
    io::stdout().flush().ok()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line).ok()?;
    Some(line.trim_end_matches(|c: char| c == '\r' || c == '\n').to_owned())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // NOTE: this assumes you have a TACACS+ server running already
    let server = std::env::var("TACACS_SERVER").unwrap_or(String::from("localhost:5555"));
    let secret = std::env::var("TACACS_SECRET")
        .unwrap_or(String::from("this shouldn't be hardcoded"));

    // tokio has its own AsyncRead/AsyncWrite traits, so we need a compatibility shim
    let stream = TcpStream::connect(server).await?.compat();
    let config = ClientConfigBuilder::new().secret(secret).build();

    let (connection, dispatcher) = Connection::new(stream, config);
    tokio::spawn(dispatcher.run());

    let context = SessionContextBuilder::new()
        .port("example")
        .prompt(console_prompt)
        .build();

    let response = connection.session(context).authenticate_ascii().await?;
    if !response.passed() {
        println!("Authentication failed. Full response: {response:?}");
        return Ok(());
    }
    println!("Authentication successful!");

    let user = console_prompt("Authorize as user: ", false, PromptKind::User).unwrap_or_default();
    let authorization = connection
        .session(SessionContextBuilder::new().port("example").build())
        .authorize(
            &user,
            AuthenticationMethod::TacacsPlus,
            AuthenticationType::Ascii,
            AuthenticationService::Login,
            vec![Argument::parse("service=shell"), Argument::parse("cmd*")],
        )
        .await?;

    if authorization.passed() {
        println!("Authorized with arguments:");
        for argument in &authorization.arguments {
            println!("  {argument}");
        }
    } else {
        println!("Authorization denied: {}", authorization.server_message);
    }

    connection.close().await?;
    Ok(())
}
