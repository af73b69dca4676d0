use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};

use contact_card::http::handlers::feed::FeedRecord;
use contact_card::http::{X_REQUESTED_WITH, XML_HTTP_REQUEST};

#[derive(Parser)]
#[command(name = "contact-cli")]
#[command(about = "Command line client for the contact card service", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:8000")]
    url: String,

    /// Bearer token; omitted requests are anonymous.
    #[arg(short, long)]
    key: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the unseen count and the newest logged requests
    Feed,
    /// Fetch the profile page (clears the unseen count when signed in)
    Profile,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    let mut headers = HeaderMap::new();
    if let Some(key) = &cli.key {
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", key))?,
        );
    }

    match cli.command {
        Commands::Feed => {
            headers.insert(X_REQUESTED_WITH, HeaderValue::from_static(XML_HTTP_REQUEST));
            let res = client
                .get(format!("{}/request/ajax", cli.url))
                .headers(headers)
                .send()
                .await?;
            if !res.status().is_success() {
                return report_failure(res).await;
            }

            let (unseen, records): (u64, String) = res.json().await?;
            let records: Vec<FeedRecord> = serde_json::from_str(&records)?;
            println!("unseen: {}", unseen);
            for record in records {
                let fields = record.fields;
                let marker = if fields.new_request == 1 { "*" } else { " " };
                let user = fields.user.map(|u| u.to_string()).unwrap_or_else(|| "-".into());
                println!(
                    "{} {:>6} {} {:<7} {} (user {})",
                    marker, record.pk, fields.date, fields.method, fields.path, user
                );
            }
        }
        Commands::Profile => {
            let res = client
                .get(format!("{}/", cli.url))
                .headers(headers)
                .send()
                .await?;
            if !res.status().is_success() {
                return report_failure(res).await;
            }
            println!("{}", res.text().await?);
        }
    }

    Ok(())
}

async fn report_failure(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Error: server returned status {}", res.status());
    if let Ok(text) = res.text().await {
        eprintln!("Response: {}", text);
    }
    Ok(())
}
