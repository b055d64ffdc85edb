//! Client for the Supabase REST (PostgREST) data endpoint.

pub mod api;

pub use api::{Filter, SupabaseApi, SupabaseApiError};
