use anyhow::Result;

use crate::{
    data::{
        SettingsStore,
        models::{Settings, format_timestamp},
    },
    transport::Messenger,
};

pub async fn execute(messenger: &dyn Messenger) -> Result<String> {
    let settings = SettingsStore::new(messenger).load().await?;
    Ok(build_description(&settings))
}

fn build_description(settings: &Settings) -> String {
    let mut description = String::new();

    if settings.feeds.is_empty() {
        description.push_str("No RSS feeds configured in the pinned settings.\n");
    }

    for (i, (name, url)) in settings.feeds.iter().enumerate() {
        description.push_str(&format!(
            "{}. {} → {} ({})\n",
            i + 1,
            name,
            url,
            extract_domain(url)
        ));
    }

    description.push_str(&format!(
        "\nTotal: {} feeds configured | Last scan: {}",
        settings.feeds.len(),
        format_timestamp(&settings.last_scan)
    ));
    description
}

fn extract_domain(url: &str) -> String {
    if let Ok(parsed_url) = url::Url::parse(url) {
        parsed_url.host_str().unwrap_or("Unknown").to_string()
    } else {
        "Unknown".to_string()
    }
}
