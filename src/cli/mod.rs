use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{bail, Result};
use log::warn;
use nnd_common::{JobMode, Site};
use nnd_core::job::JobSpec;

use self::extra::{confirm_empty_query, validate_tag_site};

pub(crate) mod extra;

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Search and download posts with tags
    Tags(TagJobs),
    /// Download whole albums and comics from their link
    Url(UrlJobs),
}

#[derive(Debug, Args)]
pub struct TagJobs {
    /// Site to search
    #[clap(short, long, value_parser = validate_tag_site)]
    pub site: Site,

    /// Stop after this many pages
    #[clap(short, long, value_name = "PAGES", value_parser(clap::value_parser!(u16).range(1..)), help_heading = "DOWNLOAD")]
    pub max_pages: Option<u16>,

    /// Tag queries, one job per query. Quote queries with more than one tag.
    ///
    /// An empty query downloads every post of the site.
    #[clap(value_parser, value_name = "QUERY")]
    pub queries: Vec<String>,
}

#[derive(Debug, Args)]
pub struct UrlJobs {
    /// Site of the links. Guessed from each link when not set.
    #[clap(short, long)]
    pub site: Option<Site>,

    /// Album or comic links, one job per link
    #[clap(value_parser, required = true, value_name = "URL")]
    pub urls: Vec<String>,
}

#[derive(Parser, Debug)]
#[clap(name = "NN-Downloader", author, version, about, long_about = None)]
pub struct Cli {
    #[clap(subcommand)]
    pub mode: Option<Commands>,

    /// Print all available sites and exit
    #[clap(long, global = true)]
    pub sites: bool,

    /// Config file to use. Created with defaults if it doesn't exist.
    #[clap(
        long,
        env = "NND_CONFIG",
        value_name = "FILE",
        default_value = "config.json",
        help_heading = "GENERAL",
        global = true
    )]
    pub config: PathBuf,

    /// Where to save files (If the path doesn't exist, it will be created.)
    #[clap(
        short = 'o',
        value_name = "PATH",
        default_value = "media",
        help_heading = "SAVE",
        global = true
    )]
    pub output: PathBuf,

    /// Folder holding the per-site lists of already downloaded ids
    #[clap(
        long,
        value_name = "PATH",
        default_value = "db",
        help_heading = "SAVE",
        global = true
    )]
    pub db: PathBuf,

    /// Send requests through this proxy. Can be repeated to rotate between proxies.
    ///
    /// Only used when `proxies` is enabled in the config file.
    #[clap(long = "proxy", value_name = "URL", help_heading = "DOWNLOAD", global = true)]
    pub proxies: Vec<String>,

    /// Download files again even if their id was already downloaded in a previous run
    #[clap(
        long,
        value_parser,
        default_value_t = false,
        help_heading = "DOWNLOAD",
        global = true
    )]
    pub no_dedup: bool,
}

impl Cli {
    /// Turns the command line into the jobs to submit, in order.
    pub fn jobs(&self) -> Result<Vec<JobSpec>> {
        match &self.mode {
            Some(Commands::Tags(args)) => {
                let mut queries = args.queries.clone();
                if queries.is_empty() {
                    queries.push(String::new());
                }

                if queries.iter().any(|q| q.trim().is_empty()) && !confirm_empty_query(args.site)? {
                    queries.retain(|q| !q.trim().is_empty());
                }

                Ok(queries
                    .into_iter()
                    .map(|q| JobSpec::new(args.site, q).with_max_pages(args.max_pages))
                    .collect())
            }
            Some(Commands::Url(args)) => args
                .urls
                .iter()
                .map(|url| {
                    let guessed = Site::from_url(url);
                    let Some(site) = args.site.or(guessed) else {
                        bail!("Could not tell which site {url} belongs to, use --site");
                    };
                    if let Some(other) = guessed.filter(|g| *g != site) {
                        warn!("{url} looks like a {other} link, downloading it as {site} anyway");
                    }
                    if site.mode() != JobMode::Url {
                        bail!("{site} searches by tags, use the `tags` command instead");
                    }
                    Ok(JobSpec::new(site, url.trim()))
                })
                .collect(),
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
mod test {
    use clap::Parser;
    use nnd_common::{JobMode, Site};

    use super::Cli;

    #[test]
    fn tag_jobs() {
        let cli = Cli::parse_from(["nn-downloader", "tags", "-s", "E621", "-m", "2", "wolf solo", "fox"]);
        let jobs = cli.jobs().unwrap();

        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].site, Site::E621);
        assert_eq!(jobs[0].query, "wolf solo");
        assert_eq!(jobs[1].max_pages, Some(2));
    }

    #[test]
    fn url_jobs_guess_their_site() {
        let cli = Cli::parse_from([
            "nn-downloader",
            "-o",
            "out",
            "url",
            "https://yiffer.xyz/Some_Comic",
            "https://multporn.net/comics/some_comic",
        ]);
        let jobs = cli.jobs().unwrap();

        assert_eq!(cli.output.to_str(), Some("out"));
        assert_eq!(jobs[0].site, Site::Yiffer);
        assert_eq!(jobs[1].site, Site::Multporn);
        assert_eq!(jobs[1].mode, JobMode::Url);

        let cli = Cli::parse_from(["nn-downloader", "url", "https://example.com/x"]);
        assert!(cli.jobs().is_err());

        let cli = Cli::parse_from(["nn-downloader", "url", "-s", "e621", "https://e621.net/posts/1"]);
        assert!(cli.jobs().is_err());
    }

    #[test]
    fn explicit_site_wins_over_the_link() {
        let cli = Cli::parse_from([
            "nn-downloader",
            "url",
            "-s",
            "luscious",
            "https://yiffer.xyz/Some_Comic",
        ]);
        let jobs = cli.jobs().unwrap();

        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].site, Site::Luscious);
    }

    #[test]
    fn url_sites_are_not_tag_sites() {
        assert!(Cli::try_parse_from(["nn-downloader", "tags", "-s", "yiffer", "x"]).is_err());
    }
}
