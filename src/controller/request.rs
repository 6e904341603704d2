//! Read requests, temporal ranges and paging

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::resource::Resource;
use crate::schema::PropertyId;

/// Time range qualifying a time-series property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemporalInfo {
    /// Range start
    pub start_time: DateTime<Utc>,
    /// Range end; open-ended when absent
    pub end_time: Option<DateTime<Utc>>,
    /// Sampling step in seconds
    pub step: Option<u64>,
}

impl TemporalInfo {
    pub fn new(start_time: DateTime<Utc>, end_time: Option<DateTime<Utc>>, step: Option<u64>) -> Self {
        Self {
            start_time,
            end_time,
            step,
        }
    }

    /// Builds a range from epoch seconds.
    ///
    /// Returns `None` if a timestamp is out of range.
    pub fn from_epoch_seconds(start: i64, end: Option<i64>, step: Option<u64>) -> Option<Self> {
        let start_time = DateTime::<Utc>::from_timestamp(start, 0)?;
        let end_time = match end {
            Some(end) => Some(DateTime::<Utc>::from_timestamp(end, 0)?),
            None => None,
        };
        Some(Self::new(start_time, end_time, step))
    }
}

/// Properties requested from a controller.
///
/// An empty property set requests every property.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    property_ids: BTreeSet<PropertyId>,
    temporal_info: BTreeMap<PropertyId, TemporalInfo>,
}

impl Request {
    pub fn new(
        property_ids: BTreeSet<PropertyId>,
        temporal_info: BTreeMap<PropertyId, TemporalInfo>,
    ) -> Self {
        Self {
            property_ids,
            temporal_info,
        }
    }

    /// Request for every property
    pub fn all() -> Self {
        Self::default()
    }

    pub fn property_ids(&self) -> &BTreeSet<PropertyId> {
        &self.property_ids
    }

    pub fn is_all_properties(&self) -> bool {
        self.property_ids.is_empty()
    }

    /// Time range requested for a property
    pub fn temporal_info(&self, id: &PropertyId) -> Option<&TemporalInfo> {
        self.temporal_info.get(id)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_all_properties() {
            return write!(f, "Request(properties=*)");
        }
        let ids: Vec<&str> = self.property_ids.iter().map(PropertyId::as_str).collect();
        write!(f, "Request(properties=[{}]", ids.join(", "))?;
        if !self.temporal_info.is_empty() {
            write!(f, ", temporal={}", self.temporal_info.len())?;
        }
        write!(f, ")")
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// One sort key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortField {
    pub property_id: PropertyId,
    pub order: SortOrder,
}

/// Ordered list of sort keys; earlier keys take precedence
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SortRequest {
    pub fields: Vec<SortField>,
}

impl SortRequest {
    pub fn asc(mut self, id: impl Into<PropertyId>) -> Self {
        self.fields.push(SortField {
            property_id: id.into(),
            order: SortOrder::Asc,
        });
        self
    }

    pub fn desc(mut self, id: impl Into<PropertyId>) -> Self {
        self.fields.push(SortField {
            property_id: id.into(),
            order: SortOrder::Desc,
        });
        self
    }
}

/// Where a page starts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StartingPoint {
    /// First row
    Beginning,
    /// Last page
    End,
    /// Offset counted from the first row
    OffsetStart(usize),
    /// Offset counted back from the last row
    OffsetEnd(usize),
}

/// Bounded slice request
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRequest {
    pub starting_point: StartingPoint,
    pub page_size: usize,
    #[serde(default)]
    pub sort: Option<SortRequest>,
}

impl PageRequest {
    /// First `page_size` rows
    pub fn first(page_size: usize) -> Self {
        Self {
            starting_point: StartingPoint::Beginning,
            page_size,
            sort: None,
        }
    }

    /// `page_size` rows starting at `offset`
    pub fn at_offset(offset: usize, page_size: usize) -> Self {
        Self {
            starting_point: StartingPoint::OffsetStart(offset),
            page_size,
            sort: None,
        }
    }

    pub fn with_sort(mut self, sort: SortRequest) -> Self {
        self.sort = Some(sort);
        self
    }
}

/// One page of resources plus total-count metadata
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse {
    /// Rows of the page in order
    pub resources: Vec<Resource>,
    /// Offset of the first row within the full result
    pub offset: usize,
    /// Number of rows across all pages
    pub total_count: usize,
}
