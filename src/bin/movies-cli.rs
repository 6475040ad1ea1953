use clap::{Parser, Subcommand};
use futures_util::StreamExt;
use reactive_movies::domain::MovieInfo;
use serde_json::Value;

#[derive(Parser)]
#[command(name = "movies-cli")]
#[command(about = "Client for the reactive movie services", long_about = None)]
struct Cli {
    /// Base URL of the service to talk to
    #[arg(short, long, default_value = "http://localhost:8080")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a movie info (movie-info service)
    Add {
        name: String,
        year: i32,
        /// Cast member; repeat for several
        #[arg(long)]
        cast: Vec<String>,
        /// ISO-8601 release date
        #[arg(long)]
        release_date: Option<String>,
    },
    /// Fetch a movie with its reviews (movies service)
    Get { id: String },
    /// Follow a live NDJSON stream
    Watch {
        #[arg(long, default_value = "/v1/movieinfos/stream")]
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();
    let base = cli.url.trim_end_matches('/');

    match cli.command {
        Commands::Add {
            name,
            year,
            cast,
            release_date,
        } => {
            let info = MovieInfo {
                cast,
                release_date,
                ..MovieInfo::new(&name, year)
            };
            let res = client.post(format!("{base}/v1/movieinfos")).json(&info).send().await?;
            print_response(res).await?;
        }
        Commands::Get { id } => {
            let res = client.get(format!("{base}/v1/movies/{id}")).send().await?;
            print_response(res).await?;
        }
        Commands::Watch { path } => {
            let res = client.get(format!("{base}{path}")).send().await?;
            if !res.status().is_success() {
                return print_response(res).await;
            }

            let mut body = res.bytes_stream();
            let mut pending = Vec::new();
            while let Some(chunk) = body.next().await {
                pending.extend_from_slice(&chunk?);
                while let Some(end) = pending.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = pending.drain(..=end).collect();
                    print_line(&line[..end])?;
                }
            }
            if !pending.is_empty() {
                print_line(&pending)?;
            }
        }
    }

    Ok(())
}

fn print_line(line: &[u8]) -> Result<(), Box<dyn std::error::Error>> {
    if line.iter().all(u8::is_ascii_whitespace) {
        return Ok(());
    }
    let json: Value = serde_json::from_slice(line)?;
    println!("{}", serde_json::to_string(&json)?);
    Ok(())
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: service returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
