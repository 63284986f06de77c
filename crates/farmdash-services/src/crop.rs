//! Crop types.

use serde::{Deserialize, Serialize};

use crate::store::Resource;

/// A crop tracked on the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Crop {
    pub id: String,
    pub name: String,
    pub variety: String,
}

/// Request to create a crop. Missing fields default to empty strings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropCreateRequest {
    pub name: String,
    pub variety: String,
}

/// Request to update an existing crop (partial update).
///
/// Unknown keys, `id` included, are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CropUpdateRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variety: Option<String>,
}

impl Resource for Crop {
    type Draft = CropCreateRequest;
    type Patch = CropUpdateRequest;

    fn from_draft(id: String, draft: CropCreateRequest) -> Self {
        Self {
            id,
            name: draft.name,
            variety: draft.variety,
        }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn apply_patch(&mut self, patch: CropUpdateRequest) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(variety) = patch.variety {
            self.variety = variety;
        }
    }
}
