use super::Client;
use super::render::print_snapshot;
use anyhow::{Context, Result, bail};
use calcula_core::capture::CaptureOutcome;
use calcula_core::price::PriceForm;
use calcula_infrastructure::photo_file;
use colored::Colorize;
use std::path::Path;

pub async fn add(client: &Client, name: String, quantity: String, value: String) -> Result<()> {
    let form = PriceForm {
        name,
        quantity,
        value,
    };
    // validate before creating a session for nothing
    form.validate()?;

    let id = client.session().await?;
    client.load(&id).await?;
    let snapshot = client.ctx.mutations.create_price(&id, &form).await?;
    print_snapshot(&snapshot);
    Ok(())
}

pub async fn edit(
    client: &Client,
    price_id: &str,
    name: Option<String>,
    quantity: Option<String>,
    value: Option<String>,
) -> Result<()> {
    let id = client.session().await?;
    let current = client.load(&id).await?;
    let item = current
        .find_price(price_id)
        .with_context(|| format!("No price {} in session {}", price_id, id))?;

    let form = apply_overrides(PriceForm::for_edit(item), name, quantity, value);
    let snapshot = client
        .ctx
        .mutations
        .update_price(&id, price_id, &form)
        .await?;
    print_snapshot(&snapshot);
    Ok(())
}

pub async fn delete(client: &Client, price_id: &str) -> Result<()> {
    let id = client.session().await?;
    client.load(&id).await?;

    let result = client.ctx.mutations.delete_price(&id, price_id).await;
    if let Some(snapshot) = client.current() {
        print_snapshot(&snapshot);
    }
    result?;
    println!("{} {}", "Deleted".green(), price_id);
    Ok(())
}

pub async fn upload(client: &Client, file: Option<&Path>, quantity: u32) -> Result<()> {
    let photo = match capture_file(file) {
        CaptureOutcome::Ok(photo) => photo,
        CaptureOutcome::Cancelled => {
            println!("{}", "No image selected.".bright_black());
            return Ok(());
        }
        CaptureOutcome::Failed { reason } => bail!(reason),
    };
    let upload = photo_file::load_captured(&photo, quantity).await?;
    let id = client.session().await?;
    client.load(&id).await?;

    println!("{}", "Sending image...".bright_black());
    let snapshot = client.ctx.mutations.upload_photo(&id, upload).await?;
    print_snapshot(&snapshot);
    Ok(())
}

/// Turns the command-line file into a capture outcome, the way a camera or
/// picker would report it.
fn capture_file(file: Option<&Path>) -> CaptureOutcome {
    let Some(path) = file else {
        return CaptureOutcome::Cancelled;
    };
    if !path.is_file() {
        return CaptureOutcome::Failed {
            reason: format!("No image at {}", path.display()),
        };
    }
    CaptureOutcome::from_uri(path.to_string_lossy())
}

/// Fields given on the command line replace the prefilled ones.
fn apply_overrides(
    mut form: PriceForm,
    name: Option<String>,
    quantity: Option<String>,
    value: Option<String>,
) -> PriceForm {
    if let Some(name) = name {
        form.name = name;
    }
    if let Some(quantity) = quantity {
        form.quantity = quantity;
    }
    if let Some(value) = value {
        form.value = value;
    }
    form
}
