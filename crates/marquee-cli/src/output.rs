use anyhow::Context;
use chrono::NaiveDate;
use marquee_core::models::{ActiveBanner, BannerListing, BannerWithStatus};
use serde::Serialize;

use crate::truncate_string;

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

fn date_or_dash(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

pub fn print_listing_table(listing: &BannerListing) {
    println!("\n=== Banners ===\n");
    println!(
        "Total: {} (active {}, scheduled {}, expired {})",
        listing.counts.total(),
        listing.counts.active,
        listing.counts.scheduled,
        listing.counts.expired
    );

    if listing.banners.is_empty() {
        println!("\nNo banners found.");
        return;
    }

    println!(
        "\n{:<36} {:<9} {:<30} {:<10} {:<10} {:>19}",
        "ID", "Status", "Title", "Start", "End", "Created At"
    );
    println!("{}", "-".repeat(120));

    for item in &listing.banners {
        let banner = &item.banner;
        println!(
            "{:<36} {:<9} {:<30} {:<10} {:<10} {:>19}",
            banner.id,
            item.status.to_string(),
            truncate_string(banner.title.as_deref().unwrap_or("(untitled)"), 30),
            date_or_dash(banner.start_date),
            date_or_dash(banner.end_date),
            banner.created_at.format("%Y-%m-%d %H:%M:%S")
        );
    }
    println!();
}

pub fn print_active_table(banners: &[ActiveBanner]) {
    println!("\n=== Live on storefront: {} ===\n", banners.len());
    for banner in banners {
        println!(
            "{}  {}  {}",
            banner.id,
            truncate_string(banner.title.as_deref().unwrap_or("(untitled)"), 30),
            banner.url
        );
    }
    println!();
}

pub fn print_banner_detail(item: &BannerWithStatus) {
    let banner = &item.banner;
    println!("ID:         {}", banner.id);
    println!("Status:     {}", item.status);
    println!("Title:      {}", banner.title.as_deref().unwrap_or("-"));
    println!("Alt text:   {}", banner.alt_text.as_deref().unwrap_or("-"));
    println!("Start date: {}", date_or_dash(banner.start_date));
    println!("End date:   {}", date_or_dash(banner.end_date));
    println!("URL:        {}", banner.remote_url);
    println!("Created at: {}", banner.created_at.to_rfc3339());
}
