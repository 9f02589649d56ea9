//! The built-in tools that look up the music store catalog.

mod albums;
mod customer;
mod songs;
mod tracks;

use std::fmt::{self, Display};

use record_clerk_core::AgentBuilder;
use record_clerk_core::tool::{Error as ToolError, ToolResult};

pub use albums::AlbumsByArtistTool;
pub use customer::CustomerInfoTool;
pub use songs::CheckForSongsTool;
pub use tracks::TracksByArtistTool;

use crate::catalog::{Catalog, SqlValue};

/// The closed set of built-in tools.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BuiltinTool {
    /// Albums of an artist.
    AlbumsByArtist,
    /// Songs of an artist.
    TracksByArtist,
    /// Songs by title.
    CheckForSongs,
    /// Purchase history of a customer.
    CustomerInfo,
}

impl BuiltinTool {
    /// All built-in tools, in the order they are offered to the model.
    pub const ALL: [BuiltinTool; 4] = [
        BuiltinTool::AlbumsByArtist,
        BuiltinTool::TracksByArtist,
        BuiltinTool::CheckForSongs,
        BuiltinTool::CustomerInfo,
    ];

    /// Returns the name the model calls the tool by.
    pub fn name(self) -> &'static str {
        match self {
            BuiltinTool::AlbumsByArtist => "get_albums_by_artist",
            BuiltinTool::TracksByArtist => "get_tracks_by_artist",
            BuiltinTool::CheckForSongs => "check_for_songs",
            BuiltinTool::CustomerInfo => "get_customer_info",
        }
    }

    /// Resolves a tool name.
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tool| tool.name() == name)
    }
}

impl Display for BuiltinTool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Registers all built-in tools, backed by `catalog`.
pub fn register_builtin_tools(
    builder: AgentBuilder,
    catalog: &Catalog,
) -> AgentBuilder {
    builder
        .with_tool(AlbumsByArtistTool::new(catalog.clone()))
        .with_tool(TracksByArtistTool::new(catalog.clone()))
        .with_tool(CheckForSongsTool::new(catalog.clone()))
        .with_tool(CustomerInfoTool::new(catalog.clone()))
}

/// Wraps a pattern for a `LIKE` match anywhere in the text.
fn contains_pattern(text: &str) -> SqlValue {
    SqlValue::Text(format!("%{text}%"))
}

async fn run_query(
    catalog: Catalog,
    sql: &'static str,
    params: Vec<(&'static str, SqlValue)>,
) -> ToolResult {
    match catalog.query(sql, params).await {
        Ok(rows) => {
            debug!("query returned {} row(s)", rows.len());
            Ok(rows.to_string())
        }
        Err(err) => {
            Err(ToolError::execution_error().with_reason(err.to_string()))
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn catalog() -> Catalog {
        Catalog::from_sql_script(include_str!("../../fixtures/mini_chinook.sql"))
            .unwrap()
    }

    #[test]
    fn test_builtin_names() {
        for tool in BuiltinTool::ALL {
            assert_eq!(BuiltinTool::from_name(tool.name()), Some(tool));
        }
        assert_eq!(
            BuiltinTool::from_name("check_for_songs"),
            Some(BuiltinTool::CheckForSongs)
        );
        assert_eq!(BuiltinTool::from_name("play_song"), None);
        assert_eq!(
            BuiltinTool::CustomerInfo.to_string(),
            "get_customer_info"
        );
    }
}
