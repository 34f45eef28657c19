use super::Client;
use anyhow::{Context, Result, bail};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use calcula_application::{NO_PHOTO_NOTICE, PhotoLoad};
use colored::Colorize;
use std::path::Path;

pub async fn show(client: &Client, price_id: &str, out: Option<&Path>) -> Result<()> {
    let id = client.session().await?;
    let snapshot = client.load(&id).await?;
    let item = snapshot
        .find_price(price_id)
        .with_context(|| format!("No price {} in session {}", price_id, id))?;

    match client.ctx.photos.open(&id, item).await? {
        PhotoLoad::Shown(photo) => match out {
            Some(path) => {
                let bytes = decode_data_uri(&photo.uri)?;
                tokio::fs::write(path, &bytes)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                println!(
                    "{} {} ({}, {} bytes)",
                    "Saved".green(),
                    path.display(),
                    photo.content_type,
                    bytes.len()
                );
            }
            None => println!("{}", photo.uri),
        },
        PhotoLoad::Missing => println!("{}", NO_PHOTO_NOTICE.bright_black()),
        PhotoLoad::Superseded => {}
    }
    Ok(())
}

fn decode_data_uri(uri: &str) -> Result<Vec<u8>> {
    let Some((header, payload)) = uri.strip_prefix("data:").and_then(|rest| rest.split_once(',')) else {
        bail!("Not a data URI");
    };
    if !header.ends_with(";base64") {
        bail!("Data URI is not base64 encoded");
    }
    BASE64
        .decode(payload)
        .context("Photo payload is not valid base64")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_data_uri() {
        assert_eq!(decode_data_uri("data:image/png;base64,aGk=").unwrap(), b"hi");
        assert!(decode_data_uri("https://example.com/a.png").is_err());
        assert!(decode_data_uri("data:text/plain,hi").is_err());
    }
}
