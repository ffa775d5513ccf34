/// UI rendering module
///
/// This module contains:
/// - The pagination control model (pagination.rs)
/// - Markup templates for the grid, promoted row and detail view (render.rs)

pub mod pagination;
pub mod render;
