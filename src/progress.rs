use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};

pub fn create_progress_bar(total_items: usize) -> Result<ProgressBar> {
    let style = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} items ({eta})")
        .context("Invalid progress bar template")?
        .progress_chars("#>-");

    let pb = ProgressBar::new(total_items as u64);
    pb.set_style(style);
    Ok(pb)
}
