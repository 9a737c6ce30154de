use bitflags::bitflags;

bitflags! {
    /// What a site adapter is able to do, used by the front end to validate jobs.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ExtractorFeatures: u8 {
        /// Searches by a tag query.
        const TagSearch = 0b0000_0001;
        /// Downloads a single album or comic from its link.
        const UrlDownload = 0b0000_0010;
        /// Pages through results one request at a time.
        const Paginated = 0b0000_0100;
        /// Sends user credentials along with its requests.
        const Auth = 0b0000_1000;
        /// Reports the upstream page limit as a hard stop.
        const HardLimit = 0b0001_0000;
    }
}
