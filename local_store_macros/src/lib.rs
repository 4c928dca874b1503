mod entity;

use proc_macro::TokenStream;

// ============================================================================
// #[derive(Entity)] derive macro
// ============================================================================

/// Derive macro for the `Entity` trait.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, Entity)]
/// #[entity(collection = "notes")]
/// struct Note {
///     #[entity(primary_key)]
///     pub note_id: u64,
///     pub title: String,
///     pub body: Option<String>,
/// }
/// ```
///
/// - `#[entity(collection = "...")]` sets the collection name.
///   If omitted, defaults to snake_case struct name + "s".
/// - `#[entity(primary_key)]` marks the field used as the primary key.
///   If omitted, defaults to a field named `id`.
///
/// The field's type becomes `Entity::Key`.
#[proc_macro_derive(Entity, attributes(entity))]
pub fn derive_entity(input: TokenStream) -> TokenStream {
    entity::derive_entity(input)
}
