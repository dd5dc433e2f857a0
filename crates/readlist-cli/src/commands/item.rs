//! Saved page command handlers

use anyhow::{bail, Context, Result};
use clap::Args;

use readlist_core::{CollectionStore, Config, ReadingList, SaveOutcome, Status};

use crate::metadata::fetch_title;
use crate::output::{short_id, Output};
use crate::prompt::confirm;

#[derive(Args, Debug)]
pub struct AddArgs {
    /// URL to save
    pub url: String,
    /// Page title (fetched from the page if omitted)
    #[arg(short = 'T', long)]
    pub title: Option<String>,
    /// Reading status (unread, reading, read)
    #[arg(short, long, default_value = "unread")]
    pub status: Status,
    /// Comment to attach
    #[arg(short, long, default_value = "")]
    pub comment: String,
    /// Don't fetch the page title
    #[arg(long)]
    pub no_fetch: bool,
    /// Update the page without asking if the URL is already saved
    #[arg(short, long)]
    pub yes: bool,
}

/// Save a page, or refresh it if the URL is already saved
///
/// Refreshing an existing page needs confirmation or `--yes`.
pub async fn add<S: CollectionStore>(
    list: &ReadingList<S>,
    config: &Config,
    args: AddArgs,
    output: &Output,
) -> Result<()> {
    if !args.yes {
        if let Some(existing) = list.find_by_url(&args.url)? {
            if !output.should_prompt() {
                bail!(
                    "Page already saved as {}. Pass --yes to update it.",
                    existing.id
                );
            }
            println!(
                "Already saved: {} - {}",
                short_id(&existing.id),
                existing.title
            );
            if !confirm("Update it?")? {
                println!("Cancelled.");
                return Ok(());
            }
        }
    }

    let fetched;
    let title = match args.title.as_deref() {
        Some(title) => Some(title),
        None if should_fetch(config, &args) => {
            fetched = fetch_title(args.url.trim()).await;
            fetched.as_deref()
        }
        None => None,
    };

    let outcome = list
        .save(&args.url, title, args.status, &args.comment)
        .context("Failed to save page")?;

    match &outcome {
        SaveOutcome::Added(record) => output.success(&format!("Saved page: {}", record.id)),
        SaveOutcome::Updated(record) => {
            output.success(&format!("Already saved, updated: {}", record.id))
        }
    }
    output.print_record(outcome.record());

    Ok(())
}

fn should_fetch(config: &Config, args: &AddArgs) -> bool {
    config.fetch_titles && !args.no_fetch && !args.url.trim().is_empty()
}

/// List saved pages, newest first
pub fn list<S: CollectionStore>(
    list: &ReadingList<S>,
    status: Option<Status>,
    output: &Output,
) -> Result<()> {
    let records = list.list(status)?;
    output.print_records(&records);
    Ok(())
}

/// Show a single saved page
pub fn show<S: CollectionStore>(list: &ReadingList<S>, id: &str, output: &Output) -> Result<()> {
    let id = list.resolve_id(id)?;
    let record = list.get(&id)?;
    output.print_record(&record);
    Ok(())
}

/// Change the reading status of a page
pub fn set_status<S: CollectionStore>(
    list: &ReadingList<S>,
    id: &str,
    status: Status,
    output: &Output,
) -> Result<()> {
    let id = list.resolve_id(id)?;
    let record = list
        .update_status(&id, status)
        .context("Failed to update status")?;

    output.success(&format!("Marked {} as {}", short_id(&record.id), status));
    Ok(())
}

/// Replace the comment on a page
pub fn comment<S: CollectionStore>(
    list: &ReadingList<S>,
    id: &str,
    text: &str,
    output: &Output,
) -> Result<()> {
    let id = list.resolve_id(id)?;
    let record = list
        .update_comment(&id, text)
        .context("Failed to update comment")?;

    if record.comment.is_empty() {
        output.success(&format!("Cleared comment on {}", short_id(&record.id)));
    } else {
        output.success(&format!("Updated comment on {}", short_id(&record.id)));
    }
    Ok(())
}

/// Delete a saved page
pub fn delete<S: CollectionStore>(
    list: &ReadingList<S>,
    id: &str,
    yes: bool,
    output: &Output,
) -> Result<()> {
    let id = list.resolve_id(id)?;
    let record = list.get(&id)?;

    if !yes && output.should_prompt() {
        println!("Delete page: {} - {}", short_id(&record.id), record.title);
        if !confirm("Are you sure?")? {
            println!("Cancelled.");
            return Ok(());
        }
    }

    list.delete(&id).context("Failed to delete page")?;

    output.success(&format!("Deleted page: {}", id));
    Ok(())
}

/// Open a saved page in the default browser
pub fn open<S: CollectionStore>(list: &ReadingList<S>, id: &str, output: &Output) -> Result<()> {
    let id = list.resolve_id(id)?;
    let record = list.get(&id)?;

    open::that(&record.url).with_context(|| format!("Failed to open {}", record.url))?;

    output.success(&format!("Opened {}", record.url));
    Ok(())
}
