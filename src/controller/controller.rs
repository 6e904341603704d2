//! The cluster controller boundary
//!
//! Query execution reads every resource through this trait. Implementations
//! own storage; this crate only supplies requests and predicates.

use std::sync::Arc;

use super::errors::ControllerResult;
use super::request::{PageRequest, PageResponse, Request, StartingPoint};
use super::sorter::ResourceSorter;
use crate::predicate::{Predicate, PredicateFilter};
use crate::resource::Resource;
use crate::schema::{ResourceType, Schema};

/// Data provider consulted by queries.
///
/// `get_iterable` and `get_page` receive the rows previously returned by
/// `get_resources` as seeds and narrow them further; the default methods do
/// so in memory.
pub trait ClusterController: Send + Sync {
    /// Schema of a resource type
    fn schema(&self, resource_type: &ResourceType) -> Arc<Schema>;

    /// Fetches every resource of `resource_type` matching `predicate`
    fn get_resources(
        &self,
        resource_type: &ResourceType,
        request: &Request,
        predicate: Option<&Predicate>,
    ) -> ControllerResult<Vec<Resource>>;

    /// Seeds matching `predicate`, in seed order
    fn get_iterable(
        &self,
        _resource_type: &ResourceType,
        seeds: &[Resource],
        _request: &Request,
        predicate: Option<&Predicate>,
    ) -> ControllerResult<Vec<Resource>> {
        Ok(seeds
            .iter()
            .filter(|r| PredicateFilter::matches(r, predicate))
            .cloned()
            .collect())
    }

    /// One page of the seeds matching `predicate`
    fn get_page(
        &self,
        resource_type: &ResourceType,
        seeds: &[Resource],
        request: &Request,
        predicate: Option<&Predicate>,
        page_request: &PageRequest,
    ) -> ControllerResult<PageResponse> {
        let mut matching = self.get_iterable(resource_type, seeds, request, predicate)?;
        if let Some(sort) = &page_request.sort {
            ResourceSorter::sort(&mut matching, sort);
        }
        Ok(select_page(matching, page_request))
    }
}

/// Cuts one page out of an ordered result
pub fn select_page(resources: Vec<Resource>, page_request: &PageRequest) -> PageResponse {
    let total_count = resources.len();
    let page_size = page_request.page_size;

    let offset = match page_request.starting_point {
        StartingPoint::Beginning => 0,
        StartingPoint::End => total_count.saturating_sub(page_size),
        StartingPoint::OffsetStart(offset) => offset.min(total_count),
        StartingPoint::OffsetEnd(offset) => total_count
            .saturating_sub(offset)
            .saturating_sub(page_size),
    };
    let end = match page_request.starting_point {
        StartingPoint::OffsetEnd(offset) => total_count.saturating_sub(offset),
        _ => offset.saturating_add(page_size).min(total_count),
    };

    PageResponse {
        resources: resources
            .into_iter()
            .skip(offset)
            .take(end.saturating_sub(offset))
            .collect(),
        offset,
        total_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hosts(n: usize) -> Vec<Resource> {
        (1..=n)
            .map(|i| Resource::new("Host").with_property("Hosts/host_name", format!("h{}", i)))
            .collect()
    }

    fn names(page: &PageResponse) -> Vec<String> {
        page.resources
            .iter()
            .filter_map(|r| r.property_string(&"Hosts/host_name".into()))
            .collect()
    }

    #[test]
    fn test_select_page_from_beginning() {
        let page = select_page(hosts(5), &PageRequest::first(2));
        assert_eq!(names(&page), vec!["h1", "h2"]);
        assert_eq!(page.offset, 0);
        assert_eq!(page.total_count, 5);
    }

    #[test]
    fn test_select_page_at_offset() {
        let page = select_page(hosts(5), &PageRequest::at_offset(3, 4));
        assert_eq!(names(&page), vec!["h4", "h5"]);
        assert_eq!(page.offset, 3);

        let past_end = select_page(hosts(5), &PageRequest::at_offset(9, 2));
        assert!(past_end.resources.is_empty());
        assert_eq!(past_end.total_count, 5);
    }

    #[test]
    fn test_select_page_from_end() {
        let request = PageRequest {
            starting_point: StartingPoint::End,
            page_size: 2,
            sort: None,
        };
        let page = select_page(hosts(5), &request);
        assert_eq!(names(&page), vec!["h4", "h5"]);
        assert_eq!(page.offset, 3);

        let request = PageRequest {
            starting_point: StartingPoint::OffsetEnd(1),
            page_size: 2,
            sort: None,
        };
        let page = select_page(hosts(5), &request);
        assert_eq!(names(&page), vec!["h3", "h4"]);
    }
}
