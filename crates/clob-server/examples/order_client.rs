//! Interactive line client for the gateway.
//!
//! Reads JSON request lines from stdin, sends them, and prints whatever
//! events come back. Example session:
//!
//! ```text
//! {"action":"submit","order":{"id":1,"symbol":"BTC-USD","side":"sell","type":"limit","quantity":"5","price":"100"}}
//! {"action":"submit","order":{"id":2,"symbol":"BTC-USD","side":"buy","type":"limit","quantity":"3","price":"101"}}
//! {"action":"depth","symbol":"BTC-USD","levels":5}
//! ```

use std::env;
use std::error::Error;
use std::io::{self, Write};
use std::time::Duration;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio::time::timeout;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let addr = env::var("CLOB_CLIENT_ADDR").unwrap_or_else(|_| "127.0.0.1:9000".to_string());

    println!("Connecting to {addr}...");
    let stream = TcpStream::connect(&addr).await?;
    println!("Connected. Type one JSON request per line; 'quit' to leave.\n");

    let (read_half, mut write_half) = stream.into_split();
    let mut responses = BufReader::new(read_half).lines();
    let stdin = io::stdin();

    loop {
        print!(">> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.read_line(&mut line)? == 0 {
            println!("\nEOF on stdin, exiting client.");
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            break;
        }

        write_half.write_all(trimmed.as_bytes()).await?;
        write_half.write_all(b"\n").await?;

        // Print every event that arrives shortly after; a lull means the
        // command is done.
        loop {
            match timeout(Duration::from_millis(200), responses.next_line()).await {
                Ok(Ok(Some(event))) => println!("<< {event}"),
                Ok(Ok(None)) => {
                    println!("Server closed the connection.");
                    return Ok(());
                }
                Ok(Err(err)) => {
                    eprintln!("Read error: {err}");
                    return Ok(());
                }
                Err(_) => break,
            }
        }
    }

    Ok(())
}
