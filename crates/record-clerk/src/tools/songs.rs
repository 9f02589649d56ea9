use record_clerk_core::tool::{Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

use super::{BuiltinTool, contains_pattern, run_query};
use crate::catalog::Catalog;

const SQL: &str = "SELECT * FROM Track WHERE Name LIKE :song_title;";

#[derive(Deserialize, JsonSchema)]
pub struct CheckForSongsParameters {
    #[schemars(description = "The song title, or a part of it.")]
    song_title: String,
}

/// A tool for finding songs by title.
pub struct CheckForSongsTool {
    catalog: Catalog,
    parameter_schema: Value,
}

impl CheckForSongsTool {
    /// Creates a new tool querying `catalog`.
    #[inline]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            parameter_schema: schema_for!(CheckForSongsParameters).to_value(),
        }
    }
}

impl Tool for CheckForSongsTool {
    type Input = CheckForSongsParameters;

    fn name(&self) -> &str {
        BuiltinTool::CheckForSongs.name()
    }

    fn description(&self) -> &str {
        "Check if a song exists by its name."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let pattern = contains_pattern(&input.song_title);
        let params = vec![(":song_title", pattern)];
        run_query(self.catalog.clone(), SQL, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::tests::catalog;

    #[tokio::test]
    async fn test_check_for_songs() {
        let tool = CheckForSongsTool::new(catalog());

        let result = tool
            .execute(CheckForSongsParameters {
                song_title: "shark".to_owned(),
            })
            .await
            .unwrap();
        assert!(result.starts_with("TrackId: 3, Name: Fast As a Shark"));
        assert!(result.contains("Milliseconds: 230619"));
    }
}
