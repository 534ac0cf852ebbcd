pub mod hosts {

    pub const ANN: &str = "www.animenewsnetwork.com";

    pub const MAL: &str = "myanimelist.net";

    pub const MU: &str = "www.mangaupdates.com";
}

pub mod defaults {

    pub const PAGE_DELAY_MS: u64 = 1000;

    pub const REQUEST_TIMEOUT_SECONDS: u64 = 30;

    pub const MAX_PAGES: usize = 50;

    pub const MAX_CONSECUTIVE_EMPTY_PAGES: usize = 3;

    pub const SIMILARITY_THRESHOLD: f64 = 0.78;

    pub const ANN_LISTING_LIMIT: usize = 100;
}

pub mod limits {

    /// Rows per page on the MAL search listing.
    pub const MAL_PAGE_SIZE: usize = 20;
}
