use dialoguer::{theme::ColorfulTheme, Confirm};
use nnd_common::{JobMode, Site};
use nnd_extractors::prelude::*;
use owo_colors::OwoColorize;

/// Parses a site name, refusing the sites that only take links.
pub fn validate_tag_site(s: &str) -> Result<Site, String> {
    let site: Site = s.parse()?;

    if site.mode() != JobMode::Tags {
        return Err(format!(
            "{site} downloads from links, use the `url` command instead"
        ));
    }

    Ok(site)
}

/// Asks before starting a job without tags.
pub fn confirm_empty_query(site: Site) -> Result<bool, dialoguer::Error> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(format!(
            "An empty query downloads {} from {}. Continue?",
            "every post".bold().red(),
            site.to_string().bold().blue()
        ))
        .default(false)
        .wait_for_newline(true)
        .interact()
}

/// Capabilities of the adapter behind `site`.
pub fn site_features(site: Site) -> ExtractorFeatures {
    match site {
        Site::E621 | Site::E6ai | Site::E926 => E6Adapter::features(),
        Site::Rule34 => Rule34Adapter::features(),
        Site::Furbooru => FurbooruAdapter::features(),
        Site::Luscious => LusciousAdapter::features(),
        Site::Yiffer => YifferAdapter::features(),
        Site::Multporn => MultpornAdapter::features(),
    }
}
