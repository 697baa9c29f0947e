use std::io::Write;

use roster_client::UserApiClient;
use roster_ui::{ConsoleConfig, UserSession};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "Type a name and press Enter to add it. :refresh reloads the list, :quit exits.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration from environment variables
    dotenvy::dotenv().ok();
    let config = ConsoleConfig::from_env()?;

    roster_client::tracing::init_tracing(&config.env);

    let client = UserApiClient::new(&config.api_url, config.request_timeout())?;
    println!("User Management");
    println!("The users API is expected at {}", config.api_url);
    println!("{HELP}");

    // Mounting runs the one automatic fetch.
    let session = UserSession::mount(client).await;
    render(&session)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        match line.trim() {
            ":quit" | ":q" => break,
            ":refresh" | ":r" => {
                if let Err(err) = session.refresh().await {
                    tracing::debug!(error = %err, "Refresh failed");
                }
            }
            ":help" | ":h" => println!("{HELP}"),
            _ => {
                session.set_draft(line.as_str());
                if let Err(err) = session.submit_draft().await {
                    tracing::debug!(error = %err, "Submit failed");
                }
            }
        }

        render(&session)?;
    }

    Ok(())
}

fn render(session: &UserSession) -> std::io::Result<()> {
    let mut stdout = std::io::stdout().lock();

    writeln!(stdout, "\nUsers")?;
    write!(stdout, "{}", session.view())?;
    write!(stdout, "add user> ")?;
    stdout.flush()
}
