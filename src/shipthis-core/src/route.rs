//! API path templates.
//!
//! Every endpoint the client talks to is a [`Route`] variant. Identifiers are
//! substituted as path segments, so each one is checked before it is used.

use std::fmt;

use crate::error::ValidationError;

/// HTTP verbs used by the Shipthis API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Get => "GET",
            Verb::Post => "POST",
            Verb::Put => "PUT",
            Verb::Patch => "PATCH",
            Verb::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route<'a> {
    /// `user-auth/info`
    UserInfo,
    /// `incollection/{collection}`
    Collection { collection: &'a str },
    /// `incollection/{collection}/{id}`
    Item { collection: &'a str, id: &'a str },
    /// `incollection_group_edit/{collection}`
    GroupEdit { collection: &'a str },
    /// `incollection/create-reference-linked-field/{collection}/{id}`
    ReferenceLinkedField { collection: &'a str, id: &'a str },
    /// `incollection/workflow/{id}`
    Workflow { id: &'a str },
    /// `workflow/{collection}/job_status/{id}`
    JobStatus { collection: &'a str, id: &'a str },
    /// `workflow/{collection}/{workflow_id}/{id}`
    WorkflowAction {
        collection: &'a str,
        workflow_id: &'a str,
        id: &'a str,
    },
    /// `workflow/{collection}/{workflow_id}/{id}/{target_state}`
    SecondaryWorkflowAction {
        collection: &'a str,
        workflow_id: &'a str,
        id: &'a str,
        target_state: &'a str,
    },
    /// `report-view/{report}`
    ReportView { report: &'a str },
    /// `thirdparty/currency`
    ExchangeRate,
    /// `autocomplete-reference/{reference}`
    Autocomplete { reference: &'a str },
    /// `thirdparty/search-place-autocomplete`
    PlaceSearch,
    /// `thirdparty/select-google-place`
    PlaceDetails,
    /// `conversation`
    Conversation,
}

impl Route<'_> {
    /// Render the path relative to the API root, checking every substituted segment
    pub fn path(&self) -> Result<String, ValidationError> {
        let path = match *self {
            Route::UserInfo => "user-auth/info".to_string(),
            Route::Collection { collection } => {
                format!("incollection/{}", segment("collection", collection)?)
            }
            Route::Item { collection, id } => format!(
                "incollection/{}/{}",
                segment("collection", collection)?,
                segment("document id", id)?
            ),
            Route::GroupEdit { collection } => format!(
                "incollection_group_edit/{}",
                segment("collection", collection)?
            ),
            Route::ReferenceLinkedField { collection, id } => format!(
                "incollection/create-reference-linked-field/{}/{}",
                segment("collection", collection)?,
                segment("document id", id)?
            ),
            Route::Workflow { id } => {
                format!("incollection/workflow/{}", segment("workflow id", id)?)
            }
            Route::JobStatus { collection, id } => format!(
                "workflow/{}/job_status/{}",
                segment("collection", collection)?,
                segment("document id", id)?
            ),
            Route::WorkflowAction {
                collection,
                workflow_id,
                id,
            } => format!(
                "workflow/{}/{}/{}",
                segment("collection", collection)?,
                segment("workflow id", workflow_id)?,
                segment("document id", id)?
            ),
            Route::SecondaryWorkflowAction {
                collection,
                workflow_id,
                id,
                target_state,
            } => format!(
                "workflow/{}/{}/{}/{}",
                segment("collection", collection)?,
                segment("workflow id", workflow_id)?,
                segment("document id", id)?,
                segment("target state", target_state)?
            ),
            Route::ReportView { report } => {
                format!("report-view/{}", segment("report name", report)?)
            }
            Route::ExchangeRate => "thirdparty/currency".to_string(),
            Route::Autocomplete { reference } => format!(
                "autocomplete-reference/{}",
                segment("reference name", reference)?
            ),
            Route::PlaceSearch => "thirdparty/search-place-autocomplete".to_string(),
            Route::PlaceDetails => "thirdparty/select-google-place".to_string(),
            Route::Conversation => "conversation".to_string(),
        };
        Ok(path)
    }
}

fn segment<'s>(field: &'static str, value: &'s str) -> Result<&'s str, ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptySegment { field });
    }
    if value.contains(['/', '?', '#']) {
        return Err(ValidationError::InvalidSegment {
            field,
            value: value.to_string(),
        });
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_item_path() {
        let route = Route::Item {
            collection: "fcl_load",
            id: "68a4f906743189ad061429a7",
        };
        assert_eq!(
            route.path().unwrap(),
            "incollection/fcl_load/68a4f906743189ad061429a7"
        );
    }

    #[test]
    fn test_workflow_paths() {
        let primary = Route::WorkflowAction {
            collection: "pickup_delivery",
            workflow_id: "job_status",
            id: "68a4f906743189ad061429a7",
        };
        assert_eq!(
            primary.path().unwrap(),
            "workflow/pickup_delivery/job_status/68a4f906743189ad061429a7"
        );

        let secondary = Route::SecondaryWorkflowAction {
            collection: "pickup_delivery",
            workflow_id: "driver_status",
            id: "67ed10859b7cf551a19f813e",
            target_state: "to_pick_up",
        };
        assert_eq!(
            secondary.path().unwrap(),
            "workflow/pickup_delivery/driver_status/67ed10859b7cf551a19f813e/to_pick_up"
        );
    }

    #[test]
    fn test_fixed_paths() {
        assert_eq!(Route::UserInfo.path().unwrap(), "user-auth/info");
        assert_eq!(Route::ExchangeRate.path().unwrap(), "thirdparty/currency");
        assert_eq!(Route::Conversation.path().unwrap(), "conversation");
        assert_eq!(
            Route::GroupEdit { collection: "customer" }.path().unwrap(),
            "incollection_group_edit/customer"
        );
    }

    #[test]
    fn test_empty_segment_rejected() {
        let err = Route::Item {
            collection: "sea_shipment",
            id: "",
        }
        .path()
        .unwrap_err();
        assert_eq!(err, ValidationError::EmptySegment { field: "document id" });
    }

    #[test]
    fn test_reserved_characters_rejected() {
        for bad in ["a/b", "a?b=1", "a#frag"] {
            let err = Route::Collection { collection: bad }.path().unwrap_err();
            assert!(matches!(err, ValidationError::InvalidSegment { field: "collection", .. }));
        }
    }

    #[test]
    fn test_verb_display() {
        assert_eq!(Verb::Patch.to_string(), "PATCH");
        assert_eq!(Verb::Delete.as_str(), "DELETE");
    }
}
