use record_clerk_core::tool::{Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

use super::{BuiltinTool, contains_pattern, run_query};
use crate::catalog::Catalog;

const SQL: &str = "
SELECT Album.Title, Artist.Name
FROM Album
JOIN Artist ON Album.ArtistId = Artist.ArtistId
WHERE Artist.Name LIKE :artist;";

#[derive(Deserialize, JsonSchema)]
pub struct AlbumsByArtistParameters {
    #[schemars(description = "The artist name, or a part of it.")]
    artist: String,
}

/// A tool for listing the albums of an artist.
pub struct AlbumsByArtistTool {
    catalog: Catalog,
    parameter_schema: Value,
}

impl AlbumsByArtistTool {
    /// Creates a new tool querying `catalog`.
    #[inline]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            parameter_schema: schema_for!(AlbumsByArtistParameters).to_value(),
        }
    }
}

impl Tool for AlbumsByArtistTool {
    type Input = AlbumsByArtistParameters;

    fn name(&self) -> &str {
        BuiltinTool::AlbumsByArtist.name()
    }

    fn description(&self) -> &str {
        "Get albums by an artist."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let params = vec![(":artist", contains_pattern(&input.artist))];
        run_query(self.catalog.clone(), SQL, params)
    }
}
