use serde::{Deserialize, Serialize};

const NO_NAME: &str = "No name available";

/// A folder as described by the public folder API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FolderInfo {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub parent_folders: Vec<FolderRef>,
    #[serde(default)]
    pub child_folders: Vec<FolderRef>,
}

/// Parent or child entry of a [FolderInfo].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderRef {
    pub id: serde_json::Value,
    #[serde(default)]
    pub name: Option<String>,
}

impl FolderRef {
    /// The folder id as a string, whether the API sent a number or a string.
    pub fn id_string(&self) -> String {
        match &self.id {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }

    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(NO_NAME)
    }
}

impl FolderInfo {
    pub fn name(&self) -> &str {
        self.name.as_deref().unwrap_or(NO_NAME)
    }

    /// `(id, name)` pairs for the collections form, one per child folder.
    pub fn subfolder_choices(&self) -> Vec<(String, String)> {
        self.child_folders
            .iter()
            .map(|child| (child.id_string(), child.name().to_string()))
            .collect()
    }
}
