//! Pagination passed through the service untouched and interpreted by stores.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use strum::{Display, EnumString};
use utoipa::{IntoParams, ToSchema};

use crate::error::{PostError, PostResult};

pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;
/// Largest row offset Postgres accepts (`OFFSET` is a bigint).
pub const MAX_OFFSET: u64 = i64::MAX as u64;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, ToSchema,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

/// A requested ordering. Stores ignore properties they do not know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sort {
    pub property: String,
    pub direction: SortDirection,
}

impl FromStr for Sort {
    type Err = PostError;

    /// Parses `property` or `property,asc|desc`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.splitn(2, ',').map(str::trim);
        let property = parts.next().unwrap_or_default();
        if property.is_empty() {
            return Err(PostError::Validation("sort property is empty".to_string()));
        }

        let direction = match parts.next() {
            None | Some("") => SortDirection::Asc,
            Some(dir) => dir
                .parse()
                .map_err(|_| PostError::Validation(format!("unknown sort direction '{dir}'")))?,
        };

        Ok(Self {
            property: property.to_string(),
            direction,
        })
    }
}

/// Sortable columns shared by posts, comments and notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    Title,
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    /// Accepts camelCase and snake_case names. Unknown names yield `None`.
    pub fn from_property(property: &str) -> Option<Self> {
        match property {
            "id" => Some(Self::Id),
            "title" => Some(Self::Title),
            "createdAt" | "created_at" => Some(Self::CreatedAt),
            "updatedAt" | "updated_at" => Some(Self::UpdatedAt),
            _ => None,
        }
    }
}

impl Sort {
    pub fn field(&self) -> Option<SortField> {
        SortField::from_property(&self.property)
    }
}

/// Zero-based page number, page size and optional sort.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageSpec {
    pub page: u64,
    pub size: u64,
    pub sort: Option<Sort>,
}

impl PageSpec {
    pub fn new(page: u64, size: u64) -> PostResult<Self> {
        if !(1..=MAX_PAGE_SIZE).contains(&size) {
            return Err(PostError::Validation(format!(
                "page size must be between 1 and {MAX_PAGE_SIZE}"
            )));
        }
        let spec = Self {
            page,
            size,
            sort: None,
        };
        spec.checked_offset()?;
        Ok(spec)
    }

    pub fn with_sort(mut self, sort: Sort) -> Self {
        self.sort = Some(sort);
        self
    }

    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size)
    }

    /// Row offset of the first item, rejected once it leaves the bigint range.
    pub fn checked_offset(&self) -> PostResult<u64> {
        self.page
            .checked_mul(self.size)
            .filter(|offset| *offset <= MAX_OFFSET)
            .ok_or_else(|| PostError::Validation(format!("page {} is out of range", self.page)))
    }
}

impl Default for PageSpec {
    fn default() -> Self {
        Self {
            page: 0,
            size: DEFAULT_PAGE_SIZE,
            sort: None,
        }
    }
}

/// Query-string form of [`PageSpec`]: `?page=0&size=20&sort=createdAt,desc`.
#[derive(Debug, Default, Clone, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageParams {
    /// Zero-based page number
    pub page: Option<u64>,
    /// Page size (1-100, default 20)
    pub size: Option<u64>,
    /// `property[,asc|desc]`
    pub sort: Option<String>,
}

impl TryFrom<PageParams> for PageSpec {
    type Error = PostError;

    fn try_from(params: PageParams) -> Result<Self, Self::Error> {
        let spec = PageSpec::new(
            params.page.unwrap_or(0),
            params.size.unwrap_or(DEFAULT_PAGE_SIZE),
        )?;

        match params.sort.as_deref().map(str::trim) {
            None | Some("") => Ok(spec),
            Some(raw) => Ok(spec.with_sort(raw.parse()?)),
        }
    }
}

/// One page of results plus totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_elements: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, spec: &PageSpec, total_elements: u64) -> Self {
        Self {
            content,
            page: spec.page,
            size: spec.size,
            total_elements,
            total_pages: total_elements.div_ceil(spec.size.max(1)),
        }
    }

    pub fn empty(spec: &PageSpec) -> Self {
        Self::new(Vec::new(), spec, 0)
    }

    /// Slices an already ordered collection.
    pub fn from_ordered(items: Vec<T>, spec: &PageSpec) -> Self {
        let total = items.len() as u64;
        let content = items
            .into_iter()
            .skip(spec.offset() as usize)
            .take(spec.size as usize)
            .collect();
        Self::new(content, spec, total)
    }

    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            content: self.content.into_iter().map(f).collect(),
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        }
    }

    pub fn try_map<U, E>(self, f: impl FnMut(T) -> Result<U, E>) -> Result<Page<U>, E> {
        Ok(Page {
            content: self.content.into_iter().map(f).collect::<Result<_, _>>()?,
            page: self.page,
            size: self.size,
            total_elements: self.total_elements,
            total_pages: self.total_pages,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}
