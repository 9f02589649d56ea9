use record_clerk_core::tool::{Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

use super::{BuiltinTool, contains_pattern, run_query};
use crate::catalog::Catalog;

const SQL: &str = "
SELECT Track.Name AS SongName, Artist.Name AS ArtistName
FROM Album
LEFT JOIN Artist ON Album.ArtistId = Artist.ArtistId
LEFT JOIN Track ON Track.AlbumId = Album.AlbumId
WHERE Artist.Name LIKE :artist;";

#[derive(Deserialize, JsonSchema)]
pub struct TracksByArtistParameters {
    #[schemars(description = "The artist name, or a part of it.")]
    artist: String,
}

/// A tool for listing the songs of an artist.
pub struct TracksByArtistTool {
    catalog: Catalog,
    parameter_schema: Value,
}

impl TracksByArtistTool {
    /// Creates a new tool querying `catalog`.
    #[inline]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            parameter_schema: schema_for!(TracksByArtistParameters).to_value(),
        }
    }
}

impl Tool for TracksByArtistTool {
    type Input = TracksByArtistParameters;

    fn name(&self) -> &str {
        BuiltinTool::TracksByArtist.name()
    }

    fn description(&self) -> &str {
        "Get songs by an artist (or similar artists)."
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
