//! Query parameters for the user listing.
//!
//! [`QueryParams`] doubles as the cache key for fetched pages and as the
//! view state mirrored into the browser-style URL query string.

use std::fmt;
use std::str::FromStr;

use url::form_urlencoded;

use crate::error::ModelError;
use crate::user::UserStatus;

pub const DEFAULT_PAGE: u32 = 1;
pub const DEFAULT_PAGE_SIZE: u32 = 10;

pub const PAGE_KEY: &str = "page";
pub const PAGE_SIZE_KEY: &str = "pageSize";
pub const STATUS_KEY: &str = "status";
pub const QUERY_KEY: &str = "query";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum StatusFilter {
    #[default]
    All,
    Active,
    Inactive,
}

impl StatusFilter {
    pub fn all() -> &'static [StatusFilter] {
        &[StatusFilter::All, StatusFilter::Active, StatusFilter::Inactive]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::All => "all",
            StatusFilter::Active => "active",
            StatusFilter::Inactive => "inactive",
        }
    }

    /// Whether a user with `status` passes this filter.
    pub fn matches(&self, status: UserStatus) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Active => status == UserStatus::Active,
            StatusFilter::Inactive => status == UserStatus::Inactive,
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatusFilter {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(StatusFilter::All),
            "active" => Ok(StatusFilter::Active),
            "inactive" => Ok(StatusFilter::Inactive),
            other => Err(ModelError::InvalidStatus(other.to_string())),
        }
    }
}

/// Pagination half of the view state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pagination {
    /// 1-based page index
    pub page: u32,
    pub page_size: u32,
}

impl Pagination {
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_PAGE_SIZE)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryParams {
    pub page: u32,
    pub page_size: u32,
    pub query: String,
    pub status: StatusFilter,
}

impl Default for QueryParams {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            query: String::new(),
            status: StatusFilter::All,
        }
    }
}

impl QueryParams {
    pub fn new(
        pagination: Pagination,
        query: impl Into<String>,
        status: StatusFilter,
    ) -> Self {
        Self {
            page: pagination.page,
            page_size: pagination.page_size,
            query: query.into(),
            status,
        }
    }

    pub fn pagination(&self) -> Pagination {
        Pagination::new(self.page, self.page_size)
    }

    /// Parse view state out of a URL query string (with or without a
    /// leading `?`). Missing or malformed values fall back to defaults.
    pub fn from_url_query(raw: &str, default_page_size: u32) -> Self {
        let raw = raw.strip_prefix('?').unwrap_or(raw);
        let mut params = Self {
            page_size: default_page_size.max(1),
            ..Self::default()
        };

        for (key, value) in form_urlencoded::parse(raw.as_bytes()) {
            match key.as_ref() {
                PAGE_KEY => {
                    params.page = parse_positive(&value).unwrap_or(DEFAULT_PAGE)
                }
                PAGE_SIZE_KEY => {
                    params.page_size = parse_positive(&value)
                        .unwrap_or(default_page_size.max(1))
                }
                STATUS_KEY => {
                    params.status = value.parse().unwrap_or_default()
                }
                QUERY_KEY => params.query = value.into_owned(),
                _ => {}
            }
        }

        params
    }

    /// Serialize into a minimal URL query string. `page` is always written;
    /// the other keys only when they differ from their defaults.
    pub fn to_url_query(&self, default_page_size: u32) -> String {
        let mut serializer = form_urlencoded::Serializer::new(String::new());
        serializer.append_pair(PAGE_KEY, &self.page.to_string());
        if self.page_size != default_page_size {
            serializer
                .append_pair(PAGE_SIZE_KEY, &self.page_size.to_string());
        }
        if self.status != StatusFilter::All {
            serializer.append_pair(STATUS_KEY, self.status.as_str());
        }
        if !self.query.is_empty() {
            serializer.append_pair(QUERY_KEY, &self.query);
        }
        serializer.finish()
    }

    /// Query pairs sent to `GET /api/users`. Every key is always present.
    pub fn api_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            (PAGE_KEY, self.page.to_string()),
            (PAGE_SIZE_KEY, self.page_size.to_string()),
            (QUERY_KEY, self.query.clone()),
            (STATUS_KEY, self.status.as_str().to_string()),
        ]
    }
}

fn parse_positive(raw: &str) -> Option<u32> {
    raw.trim().parse::<u32>().ok().filter(|value| *value >= 1)
}
