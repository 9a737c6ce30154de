use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use nnd_common::sanitize::sanitize_folder_name;

pub mod downloader;
pub mod engine;
pub mod error;
pub mod job;
pub mod progress;
pub mod queue;
pub mod seen;

/// Title used for tag jobs without any tag.
pub const EMPTY_QUERY_TITLE: &str = "all";

/// Folder of a single job: `<root>/<dd-mm-YYYY_HH-MM-SS>_<title>`, sanitized.
#[inline]
pub fn job_output_dir(root: &Path, title: &str, started: DateTime<Local>) -> PathBuf {
    let title = match title.trim() {
        "" => EMPTY_QUERY_TITLE,
        t => t,
    };

    let name = format!("{} {}", started.format("%d-%m-%Y_%H-%M-%S"), title);

    root.join(sanitize_folder_name(&name))
}

#[cfg(test)]
mod test {
    use std::path::Path;

    use chrono::{Local, TimeZone};

    use super::job_output_dir;

    #[test]
    fn output_dir_names() {
        let at = Local.with_ymd_and_hms(2024, 3, 9, 7, 5, 1).unwrap();

        assert_eq!(
            job_output_dir(Path::new("media"), "wolf solo", at),
            Path::new("media").join("09-03-2024_07-05-01_wolf_solo")
        );
        assert_eq!(
            job_output_dir(Path::new("media"), "  ", at),
            Path::new("media").join("09-03-2024_07-05-01_all")
        );
        assert_eq!(
            job_output_dir(Path::new("media"), "rating:safe <3", at),
            Path::new("media").join("09-03-2024_07-05-01_ratingsafe_3")
        );
    }
}
