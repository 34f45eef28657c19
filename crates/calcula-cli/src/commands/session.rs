use super::Client;
use super::render::{print_error, print_snapshot};
use anyhow::Result;
use calcula_core::session::SessionIdRepository;
use calcula_infrastructure::{CalculaPaths, TomlSessionIdRepository};
use colored::Colorize;

/// Prints the stored session id. Works offline.
pub async fn id(paths: &CalculaPaths) -> Result<()> {
    match TomlSessionIdRepository::new(paths)?.load().await? {
        Some(id) => println!("{}", id),
        None => println!("{}", "No session yet. Run `calcula new` or `calcula join <ID>`.".bright_black()),
    }
    Ok(())
}

pub async fn new(client: &Client) -> Result<()> {
    client.ctx.identity.hydrate().await;
    client.ctx.identity.reset_session().await;
    let id = client.session().await?;
    println!("{} {}", "Started session".green(), id);
    Ok(())
}

pub async fn join(client: &Client, id: &str) -> Result<()> {
    client.ctx.identity.hydrate().await;
    let id = client.ctx.identity.join_session(id).await?;
    println!("{} {}", "Joined session".green(), id);
    Ok(())
}

pub async fn show(client: &Client) -> Result<()> {
    let id = client.session().await?;
    let snapshot = client.load(&id).await?;
    print_snapshot(&snapshot);
    Ok(())
}

/// Follows the session until Ctrl-C, reprinting whenever it changes.
pub async fn watch(client: &Client) -> Result<()> {
    client.session().await?;
    let mut state = client.ctx.poller.subscribe();
    let follow = client.ctx.start().await;

    let mut last_error: Option<String> = None;
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = state.borrow_and_update().clone();
                if current.loading {
                    continue;
                }
                if current.error != last_error {
                    if let Some(error) = &current.error {
                        print_error(&format!("Update failed: {}", error));
                    }
                    last_error = current.error.clone();
                }
                if current.error.is_none()
                    && let Some(data) = &current.data
                {
                    println!();
                    print_snapshot(data);
                }
            }
        }
    }

    follow.abort();
    Ok(())
}
