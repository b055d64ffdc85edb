//! Notion API client and the payout → page-properties mapping.

pub mod api;
pub mod properties;

pub use api::{CreatedPage, NotionApi, NotionApiError, NOTION_VERSION};
pub use properties::payout_properties;
