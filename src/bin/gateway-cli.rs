//! Management CLI and test client for the WebSocket gateway.

use std::time::Duration;

use clap::{Parser, Subcommand};
use futures_util::{SinkExt, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use serde_json::Value;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::{Error as WsError, Message};

#[derive(Parser)]
#[command(name = "gateway-cli")]
#[command(about = "Management CLI for the WebSocket gateway", long_about = None)]
struct Cli {
    /// Admin API base URL.
    #[arg(short, long, default_value = "http://localhost:8081")]
    url: String,

    /// Admin API key.
    #[arg(short, long, default_value = "")]
    key: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check gateway status
    Status,
    /// List connected clients
    Clients,
    /// Disconnect a client by id
    Disconnect { client_id: String },
    /// Connect as a client and send a message every interval
    Connect {
        /// Gateway WebSocket URL.
        #[arg(long, default_value = "ws://localhost:8080")]
        ws_url: String,
        /// Identity to request via ?clientId=
        #[arg(long)]
        client_id: Option<String>,
        /// JWT sent as `Authorization: Bearer <token>`
        #[arg(long, conflicts_with = "basic")]
        token: Option<String>,
        /// Pre-encoded credential sent as `Authorization: Basic <credential>`
        #[arg(long)]
        basic: Option<String>,
        #[arg(long, default_value_t = 1000)]
        interval_ms: u64,
        /// Stop after this many messages (runs until closed when omitted).
        #[arg(long)]
        count: Option<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let request = match cli.command {
        Commands::Status => client.get(format!("{}/admin/status", cli.url)),
        Commands::Clients => client.get(format!("{}/admin/clients", cli.url)),
        Commands::Disconnect { client_id } => {
            client.delete(format!("{}/admin/clients/{}", cli.url, client_id))
        }
        Commands::Connect {
            ws_url,
            client_id,
            token,
            basic,
            interval_ms,
            count,
        } => {
            let authorization = token
                .map(|t| format!("Bearer {t}"))
                .or_else(|| basic.map(|b| format!("Basic {b}")));
            return run_client(ws_url, client_id, authorization, interval_ms, count).await;
        }
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {}", cli.key))?,
    );

    print_response(request.headers(headers).send().await?).await
}

async fn run_client(
    ws_url: String,
    client_id: Option<String>,
    authorization: Option<String>,
    interval_ms: u64,
    count: Option<u64>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut url = url::Url::parse(&ws_url)?;
    if let Some(id) = client_id {
        url.query_pairs_mut().append_pair("clientId", &id);
    }

    let mut request = url.as_str().into_client_request()?;
    if let Some(value) = authorization {
        request
            .headers_mut()
            .insert(AUTHORIZATION, HeaderValue::from_str(&value)?);
    }

    let (socket, _) = match tokio_tungstenite::connect_async(request).await {
        Ok(connected) => connected,
        Err(WsError::Http(response)) => {
            let body = response
                .body()
                .as_deref()
                .map(|b| String::from_utf8_lossy(b).into_owned())
                .unwrap_or_default();
            eprintln!("Handshake rejected: {} {}", response.status(), body);
            std::process::exit(1);
        }
        Err(e) => return Err(e.into()),
    };
    println!("Connected to {url}");

    let (mut sink, mut stream) = socket.split();
    let mut ticker = tokio::time::interval(Duration::from_millis(interval_ms));
    let mut sent = 0u64;

    loop {
        tokio::select! {
            _ = ticker.tick(), if count.map_or(true, |limit| sent < limit) => {
                sent += 1;
                let text = format!("Message from client {sent}");
                println!("Sending: {text}");
                sink.send(Message::Text(text.into())).await?;
                if count == Some(sent) {
                    sink.send(Message::Close(None)).await?;
                }
            }
            frame = stream.next() => match frame {
                Some(Ok(Message::Text(text))) => println!("Received: {}", text.as_str()),
                Some(Ok(Message::Binary(data))) => println!("Received {} bytes", data.len()),
                Some(Ok(Message::Close(frame))) => {
                    match frame {
                        Some(frame) => println!("Connection closed. Code: {}, Reason: {}", u16::from(frame.code), frame.reason.as_str()),
                        None => println!("Connection closed."),
                    }
                    break;
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    eprintln!("WebSocket error: {e}");
                    break;
                }
                None => break,
            }
        }
    }

    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: Admin API returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("{}", text);
        }
        std::process::exit(1);
    }

    if status == reqwest::StatusCode::NO_CONTENT {
        println!("OK");
        return Ok(());
    }

    let body: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(())
}
