use clap::{Parser, Subcommand};
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, SET_COOKIE};
use serde_json::Value;

const SESSION_COOKIE: &str = "admin-auth-token";

#[derive(Parser)]
#[command(name = "edge-cli")]
#[command(about = "Management CLI for the site edge layer", long_about = None)]
struct Cli {
    #[arg(short, long, default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and print the session token
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    /// Clear the session cookie
    Logout,
    /// Show whether a token is currently accepted
    Session {
        #[arg(long)]
        token: String,
    },
    /// Show which environment variables the edge layer sees
    Env,
    /// Ask the origin to refresh a path on its next request
    Revalidate {
        #[arg(long)]
        token: String,
        #[arg(long)]
        path: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let client = reqwest::Client::new();

    match cli.command {
        Commands::Login { username, password } => {
            let res = client
                .post(format!("{}/api/admin/login", cli.url))
                .json(&serde_json::json!({ "username": username, "password": password }))
                .send()
                .await?;

            let token = res
                .headers()
                .get_all(SET_COOKIE)
                .iter()
                .filter_map(|v| v.to_str().ok())
                .find_map(|v| v.strip_prefix(&format!("{}=", SESSION_COOKIE)).map(str::to_string))
                .and_then(|rest| rest.split(';').next().map(str::to_string));

            if let Some(token) = token {
                println!("{}", token);
            }
            print_response(res).await?;
        }
        Commands::Logout => {
            let res = client
                .post(format!("{}/api/admin/logout", cli.url))
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Session { token } => {
            let res = client
                .get(format!("{}/api/admin/session", cli.url))
                .headers(session_headers(&token)?)
                .send()
                .await?;
            print_response(res).await?;
        }
        Commands::Env => {
            let res = client.get(format!("{}/api/debug-env", cli.url)).send().await?;
            print_response(res).await?;
        }
        Commands::Revalidate { token, path } => {
            let res = client
                .post(format!("{}/api/revalidate", cli.url))
                .query(&[("path", path)])
                .headers(session_headers(&token)?)
                .send()
                .await?;
            print_response(res).await?;
        }
    }

    Ok(())
}

fn session_headers(token: &str) -> Result<HeaderMap, Box<dyn std::error::Error>> {
    let mut headers = HeaderMap::new();
    headers.insert(
        COOKIE,
        HeaderValue::from_str(&format!("{}={}", SESSION_COOKIE, token))?,
    );
    Ok(headers)
}

async fn print_response(res: reqwest::Response) -> Result<(), Box<dyn std::error::Error>> {
    let status = res.status();
    if !status.is_success() {
        eprintln!("Error: edge returned status {}", status);
        if let Ok(text) = res.text().await {
            eprintln!("Response: {}", text);
        }
        return Ok(());
    }

    let json: Value = res.json().await?;
    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
