use record_clerk_core::tool::{Tool, ToolResult};
use schemars::{JsonSchema, schema_for};
use serde::Deserialize;
use serde_json::Value;

use super::{BuiltinTool, run_query};
use crate::catalog::{Catalog, SqlValue};

const SQL: &str = "
SELECT
    Customer.FirstName AS first_name,
    Customer.LastName AS last_name,
    Track.Name AS song_title,
    Artist.Name AS artist_name,
    Album.Title AS album_title
FROM Customer
LEFT JOIN Invoice ON Invoice.CustomerId = Customer.CustomerId
LEFT JOIN InvoiceLine ON InvoiceLine.InvoiceId = Invoice.InvoiceId
LEFT JOIN Track ON Track.TrackId = InvoiceLine.TrackId
LEFT JOIN Album ON Album.AlbumId = Track.AlbumId
LEFT JOIN Artist ON Artist.ArtistId = Album.ArtistId
WHERE Customer.FirstName = :first_name AND Customer.LastName = :last_name;";

#[derive(Deserialize, JsonSchema)]
pub struct CustomerInfoParameters {
    #[schemars(description = "The customer's first name.")]
    first_name: String,
    #[schemars(description = "The customer's last name.")]
    last_name: String,
}

/// A tool for looking up a customer and their purchase history.
pub struct CustomerInfoTool {
    catalog: Catalog,
    parameter_schema: Value,
}

impl CustomerInfoTool {
    /// Creates a new tool querying `catalog`.
    #[inline]
    pub fn new(catalog: Catalog) -> Self {
        Self {
            catalog,
            parameter_schema: schema_for!(CustomerInfoParameters).to_value(),
        }
    }
}

impl Tool for CustomerInfoTool {
    type Input = CustomerInfoParameters;

    fn name(&self) -> &str {
        BuiltinTool::CustomerInfo.name()
    }

    fn description(&self) -> &str {
        "Return basic customer information and song list purchase history."
    }

    fn parameter_schema(&self) -> &Value {
        &self.parameter_schema
    }

    fn execute(
        &self,
        input: Self::Input,
    ) -> impl Future<Output = ToolResult> + Send + 'static {
        let params = vec![
            (":first_name", SqlValue::Text(input.first_name)),
            (":last_name", SqlValue::Text(input.last_name)),
        ];
        run_query(self.catalog.clone(), SQL, params)
    }
}
